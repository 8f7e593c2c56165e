//! Handlebars templates for the generated project files.

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

pub const MANIFEST_TEMPLATE: &str = "subgraph.yaml";
pub const SCHEMA_TEMPLATE: &str = "schema.graphql";
pub const MAPPING_HEADER_TEMPLATE: &str = "mappings/common_header.ts";
pub const MAPPING_AUTO_TEMPLATE: &str = "mappings/mapping_auto.ts";
pub const MAPPING_STUB_TEMPLATE: &str = "mappings/mapping_stub.ts";
pub const README_TEMPLATE: &str = "README.md";

const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    (MANIFEST_TEMPLATE, include_str!("templates/subgraph.yaml.hbs")),
    (SCHEMA_TEMPLATE, include_str!("templates/schema.graphql.hbs")),
    (
        MAPPING_HEADER_TEMPLATE,
        include_str!("templates/common_header.ts.hbs"),
    ),
    (
        MAPPING_AUTO_TEMPLATE,
        include_str!("templates/mapping_auto.ts.hbs"),
    ),
    (
        MAPPING_STUB_TEMPLATE,
        include_str!("templates/mapping_stub.ts.hbs"),
    ),
    (README_TEMPLATE, include_str!("templates/README.md.hbs")),
];

/// Renders named templates with a serializable context.
///
/// One renderer is built per generation run and handed to every builder.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with all built-in templates registered
    pub fn new() -> Result<Self> {
        Ok(Self {
            handlebars: Self::builtin_registry()?,
        })
    }

    fn builtin_registry() -> Result<Handlebars<'static>> {
        let mut handlebars = Handlebars::new();
        // Output is YAML, GraphQL and TypeScript, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in BUILTIN_TEMPLATES {
            handlebars.register_template_string(name, source)?;
        }
        Ok(handlebars)
    }

    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!("Rendering template {}", template_name);
        Ok(self.handlebars.render(template_name, context)?)
    }

    /// Replace a built-in template, or add a new one, for this renderer only
    pub fn register_override(&mut self, template_name: &str, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(template_name, source)?;
        Ok(())
    }

    /// Drop every override and rebuild the built-in registry
    pub fn reset(&mut self) -> Result<()> {
        self.handlebars = Self::builtin_registry()?;
        Ok(())
    }

    /// Get list of available templates
    pub fn available_templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }
}
