use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    AbiFetch(String),
    #[error("Operation cancelled by user")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Prompt error: {0}")]
    Prompt(String),
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
    #[error("Template registration error: {0}")]
    TemplateRegistration(#[from] handlebars::TemplateError),
}

impl WizardError {
    pub fn validation(message: impl Into<String>) -> Self {
        WizardError::Validation(message.into())
    }

    pub fn abi_fetch(message: impl Into<String>) -> Self {
        WizardError::AbiFetch(message.into())
    }

    /// Errors raised for conditions the user can act on. These are reported
    /// with their message only; everything else is treated as unexpected.
    pub fn is_known(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_) | WizardError::AbiFetch(_) | WizardError::Cancelled
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            WizardError::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<WizardError> for String {
    fn from(error: WizardError) -> Self {
        error.to_string()
    }
}

pub type Result<T, E = WizardError> = std::result::Result<T, E>;
