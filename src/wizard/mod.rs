//! Interactive configuration flow, used when no CLI flags are given.

mod prompts;
mod terminal;

pub use prompts::{LinePrompter, Prompt};
pub use terminal::TerminalPrompter;

use crate::abi::{load_abi_from_file, load_abi_from_paste, write_abi_to_file, Abi, ExplorerClient};
use crate::config::{
    save_config, validate_address, validate_call_handler_signature, Complexity, ContractConfig,
    EntityRelationship, MappingsMode, RelationType, SubgraphConfig, TemplateConfig,
    CONFIG_FILE_NAME,
};
use crate::error::{Result, WizardError};
use crate::generator::generate_subgraph_project;
use crate::network::supported_network_names;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::info;

lazy_static! {
    static ref SUBGRAPH_NAME_PATTERN: Regex = Regex::new(r"^[a-z][a-z0-9\-]*$").unwrap();
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").unwrap();
}

const DEFAULT_NETWORK: &str = "ethereum";
const PASTE_END_MARKER: &str = "END";
const IDENTIFIER_HINT: &str = "Use letters, numbers, and underscores. Must start with a letter.";

type Check = std::result::Result<(), String>;

fn check_subgraph_name(name: &str) -> Check {
    if SUBGRAPH_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err("Invalid name. Use lowercase letters, numbers, and hyphens. Must start with a letter.".to_string())
    }
}

fn check_identifier(value: &str) -> Check {
    if IDENTIFIER_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(format!("Invalid name '{}'. {}", value, IDENTIFIER_HINT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbiSource {
    File,
    Paste,
    Explorer,
}

impl AbiSource {
    fn label(&self) -> &'static str {
        match self {
            AbiSource::File => "Local file",
            AbiSource::Paste => "Paste JSON",
            AbiSource::Explorer => "Fetch from explorer",
        }
    }
}

/// Result of a completed wizard run
#[derive(Debug)]
pub struct WizardOutcome {
    pub config: SubgraphConfig,
    pub config_path: PathBuf,
}

pub struct Wizard<'p, P> {
    prompter: &'p mut P,
    explorer: ExplorerClient,
}

impl<'p, P: Prompt> Wizard<'p, P> {
    pub fn new(prompter: &'p mut P, explorer: ExplorerClient) -> Self {
        Self { prompter, explorer }
    }

    /// Collect a config, validate it, write its ABIs and save it under the
    /// chosen output directory
    pub fn run(&mut self) -> Result<WizardOutcome> {
        let p = &mut *self.prompter;
        p.say(format!("\n{}", "=".repeat(60)))?;
        p.say("  Subgraph Wizard - Interactive Configuration")?;
        p.say("=".repeat(60))?;
        p.say("\nThis wizard will help you create a subgraph configuration.")?;
        p.say("Press Ctrl+C (or Ctrl+D) at any time to cancel.\n")?;

        let name = p.ask_string(
            "Subgraph name (lowercase, e.g., my-token-subgraph)",
            None,
            check_subgraph_name,
        )?;

        let networks = supported_network_names();
        let default_network = networks
            .iter()
            .position(|n| *n == DEFAULT_NETWORK)
            .unwrap_or_default();
        let network = networks[p.ask_choice("Select target network", &networks, default_network)?];

        let output_dir = p.ask_string("Output directory", Some(&name), |_| Ok(()))?;

        p.say("\nComplexity level determines which indexing features are available:")?;
        p.say("  - basic: Index events only (recommended for most use cases)")?;
        p.say("  - intermediate: Events + call handlers + block handlers")?;
        p.say("  - advanced: All features + dynamic data sources (templates) + entity relationships")?;
        let tiers: Vec<&str> = Complexity::ALL.iter().map(Complexity::as_str).collect();
        let complexity = Complexity::ALL[p.ask_choice("Select complexity level", &tiers, 0)?];

        p.say("\nMapping mode determines how event handlers are generated:")?;
        p.say("  - auto: Fully functional handlers that save event data to entities")?;
        p.say("  - stub: Handler skeletons with TODO comments for custom logic")?;
        let mappings_mode = match p.ask_choice("Select mapping mode", &["auto", "stub"], 0)? {
            0 => MappingsMode::Auto,
            _ => MappingsMode::Stub,
        };

        let mut abis = BTreeMap::new();
        let contracts = self.collect_contracts(network, complexity, &mut abis)?;

        let mut builder = SubgraphConfig::builder()
            .name(&name)
            .network(network)
            .output_dir(&output_dir)
            .mappings_mode(mappings_mode)
            .complexity(complexity);
        for contract in &contracts {
            builder = builder.add_contract(contract.clone());
        }

        let mut template_abis = Vec::new();
        if complexity.has_templates() {
            let names: Vec<String> = contracts.iter().map(|c| c.name.clone()).collect();
            for (template, abi) in self.collect_templates(&names)? {
                template_abis.push((template.abi_path.clone(), abi));
                builder = builder.add_template(template);
            }
            for relationship in self.collect_relationships()? {
                builder = builder.add_relationship(relationship);
            }
        }

        let p = &mut *self.prompter;
        p.say("\nValidating configuration...")?;
        let config = match builder.build() {
            Ok(config) => config,
            Err(e) => {
                p.say(format!("\nValidation failed: {}", e))?;
                return Err(e);
            }
        };
        p.say("Configuration is valid")?;

        let root = PathBuf::from(&output_dir);
        let abis_dir = root.join("abis");
        p.say(format!("\nCreating project structure in: {}", root.display()))?;
        for contract in &config.contracts {
            if let Some(abi) = abis.get(&contract.name) {
                let path = abis_dir.join(&contract.abi_path);
                write_abi_to_file(abi, &path)?;
                p.say(format!("  Wrote ABI: {}", path.display()))?;
            }
        }
        for (abi_path, abi) in &template_abis {
            let path = abis_dir.join(abi_path);
            write_abi_to_file(abi, &path)?;
            p.say(format!("  Wrote template ABI: {}", path.display()))?;
        }

        let config_path = root.join(CONFIG_FILE_NAME);
        save_config(&config, &config_path)?;
        p.say(format!("  Saved config: {}", config_path.display()))?;
        print_summary(p, &config)?;

        Ok(WizardOutcome {
            config,
            config_path,
        })
    }

    fn collect_contracts(
        &mut self,
        network: &str,
        complexity: Complexity,
        abis: &mut BTreeMap<String, Abi>,
    ) -> Result<Vec<ContractConfig>> {
        let p = &mut *self.prompter;
        p.say(format!("\n{}", "-".repeat(40)))?;
        p.say("Contract Configuration")?;
        p.say("-".repeat(40))?;
        p.say("\nYou'll now add contracts to index. At least one is required.")?;

        let mut contracts: Vec<ContractConfig> = Vec::new();
        loop {
            let contract = self.collect_contract(&contracts, complexity)?;
            let sources = [AbiSource::File, AbiSource::Paste, AbiSource::Explorer];
            match self.acquire_abi(&contract.name, &sources, Some((network, contract.address.as_str()))) {
                Ok(abi) => {
                    abis.insert(contract.name.clone(), abi);
                    self.prompter.say(format!(
                        "\nAdded contract: {} ({})",
                        contract.name, contract.address
                    ))?;
                    contracts.push(contract);
                }
                Err(e @ (WizardError::Validation(_) | WizardError::AbiFetch(_))) => {
                    self.prompter.say(format!("\nFailed to get ABI: {}", e))?;
                    if !self.prompter.ask_yes_no("Skip this contract and continue?", false)? {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }

            if !contracts.is_empty() && !self.prompter.ask_yes_no("\nAdd another contract?", false)? {
                return Ok(contracts);
            }
        }
    }

    fn collect_contract(&mut self, existing: &[ContractConfig], complexity: Complexity) -> Result<ContractConfig> {
        let p = &mut *self.prompter;
        p.say("\n--- Contract Configuration ---")?;

        let names: HashSet<&str> = existing.iter().map(|c| c.name.as_str()).collect();
        let name = p.ask_string("Contract name (e.g., MyToken)", None, |value| {
            check_identifier(value)?;
            if names.contains(value) {
                return Err(format!(
                    "A contract named '{}' already exists. Please choose a different name.",
                    value
                ));
            }
            Ok(())
        })?;

        let addresses: HashSet<String> = existing.iter().map(|c| c.address.to_lowercase()).collect();
        let address = p.ask_string("Contract address (0x...)", None, |value| {
            validate_address(value, &name).map_err(String::from)?;
            if addresses.contains(&value.to_lowercase()) {
                return Err(format!(
                    "Address {} is already being indexed. Please use a different address.",
                    value
                ));
            }
            Ok(())
        })?;

        let start_block = p.ask_int("Start block (block number to start indexing from)", Some(0), 0)?;
        let abi_path = format!("{}.json", name);
        let mut contract = ContractConfig::new(&name, address, start_block, abi_path);

        if complexity.has_handlers() {
            p.say("\n--- Advanced Handler Options ---")?;
            if let Some(handlers) = ask_call_handlers(p, &name, "this contract")? {
                contract = contract.with_call_handlers(handlers);
            }
            let block_handler =
                p.ask_yes_no("Enable block handler for this contract? (indexes every block)", false)?;
            contract = contract.with_block_handler(block_handler);
        }

        Ok(contract)
    }

    fn collect_templates(&mut self, contract_names: &[String]) -> Result<Vec<(TemplateConfig, Abi)>> {
        let p = &mut *self.prompter;
        p.say(format!("\n{}", "-".repeat(40)))?;
        p.say("Dynamic Data Source Templates")?;
        p.say("-".repeat(40))?;
        p.say("\nTemplates index contracts created at runtime, e.g. pairs created by a factory.")?;

        let mut templates: Vec<(TemplateConfig, Abi)> = Vec::new();
        if !p.ask_yes_no("\nDo you want to add dynamic data source templates?", false)? {
            return Ok(templates);
        }

        loop {
            let template = self.collect_template(&templates, contract_names)?;
            self.prompter
                .say(format!("\nProvide ABI for template '{}':", template.name))?;
            // Templates have no fixed address, so the explorer is not offered
            match self.acquire_abi(&template.name, &[AbiSource::File, AbiSource::Paste], None) {
                Ok(abi) => {
                    self.prompter.say(format!(
                        "\nAdded template: {} (created by {}.{})",
                        template.name, template.source_contract, template.source_event
                    ))?;
                    templates.push((template, abi));
                }
                Err(e @ (WizardError::Validation(_) | WizardError::AbiFetch(_))) => {
                    self.prompter.say(format!("\nFailed to get ABI: {}", e))?;
                    if !self.prompter.ask_yes_no("Skip this template and continue?", false)? {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }

            if !self.prompter.ask_yes_no("\nAdd another template?", false)? {
                return Ok(templates);
            }
        }
    }

    fn collect_template(
        &mut self,
        existing: &[(TemplateConfig, Abi)],
        contract_names: &[String],
    ) -> Result<TemplateConfig> {
        let p = &mut *self.prompter;
        p.say("\n--- Template Configuration ---")?;

        let names: HashSet<&str> = existing.iter().map(|(t, _)| t.name.as_str()).collect();
        let name = p.ask_string("Template name (e.g., Pair, Pool, Vault)", None, |value| {
            check_identifier(value)?;
            if names.contains(value) {
                return Err(format!(
                    "A template named '{}' already exists. Please choose a different name.",
                    value
                ));
            }
            if contract_names.iter().any(|c| c == value) {
                return Err(format!(
                    "'{}' is already used by a contract. Template names must differ from contract names.",
                    value
                ));
            }
            Ok(())
        })?;

        let default_abi = format!("{}.json", name);
        let abi_path = p.ask_string(
            &format!("ABI filename for {}", name),
            Some(&default_abi),
            |_| Ok(()),
        )?;

        let source_contract = contract_names[p.ask_choice(
            &format!("Which contract creates {} instances?", name),
            contract_names,
            0,
        )?]
        .clone();
        let source_event = p.ask_string(
            &format!("Event that signals a new {} (e.g., PairCreated)", name),
            None,
            check_identifier,
        )?;

        let mut event_handlers = p.ask_string_list(
            &format!("\nWhich events should be indexed from {} instances?", name),
            "event name",
            check_identifier,
        )?;
        if event_handlers.is_empty() {
            p.say("At least one event handler is required. Adding 'Transfer' as default.")?;
            event_handlers.push("Transfer".to_string());
        }

        let mut template = TemplateConfig::new(&name, abi_path, source_contract, source_event, event_handlers);
        template.call_handlers = ask_call_handlers(p, &format!("template:{}", name), &name)?;
        template.block_handler = p.ask_yes_no(&format!("Enable block handler for {} instances?", name), false)?;
        Ok(template)
    }

    fn collect_relationships(&mut self) -> Result<Vec<EntityRelationship>> {
        let p = &mut *self.prompter;
        p.say(format!("\n{}", "-".repeat(40)))?;
        p.say("Entity Relationships")?;
        p.say("-".repeat(40))?;

        let mut relationships = Vec::new();
        if !p.ask_yes_no("\nDo you want to define entity relationships?", false)? {
            return Ok(relationships);
        }

        loop {
            let from_entity = p.ask_string(
                "Source entity name (entity that will have the field)",
                None,
                check_identifier,
            )?;
            let to_entity = p.ask_string(
                "Target entity name (entity being referenced)",
                None,
                check_identifier,
            )?;
            let default_field = lower_first(&to_entity);
            let field_name = p.ask_string(
                &format!("Field name on {}", from_entity),
                Some(&default_field),
                check_identifier,
            )?;
            let relation_type = RelationType::VALID[p.ask_choice(
                "Select relationship type",
                &RelationType::VALID,
                RelationType::VALID.iter().position(|t| *t == "one_to_one").unwrap_or_default(),
            )?];

            let mut relationship = EntityRelationship::new(&from_entity, &to_entity, relation_type, &field_name);
            if p.ask_yes_no(&format!("Is {} derived from a reverse lookup?", field_name), false)? {
                let derived = p.ask_string(
                    &format!("Field on {} that references back to {}", to_entity, from_entity),
                    None,
                    check_identifier,
                )?;
                relationship = relationship.derived_from(derived);
            }

            p.say(format!(
                "\nAdded relationship: {}.{} -> {} ({})",
                from_entity, field_name, to_entity, relation_type
            ))?;
            relationships.push(relationship);

            if !p.ask_yes_no("\nAdd another relationship?", false)? {
                return Ok(relationships);
            }
        }
    }

    /// `target` is the `(network, address)` used for explorer fetches
    fn acquire_abi(&mut self, name: &str, sources: &[AbiSource], target: Option<(&str, &str)>) -> Result<Abi> {
        let labels: Vec<&str> = sources.iter().map(AbiSource::label).collect();
        let source = sources[self
            .prompter
            .ask_choice(&format!("How would you like to provide the ABI for '{}'?", name), &labels, 0)?];

        match (source, target) {
            (AbiSource::Explorer, Some((network, address))) => {
                self.prompter
                    .say(format!("\nFetching ABI from {} explorer for {}...", network, address))?;
                let abi = self.explorer.fetch_abi(network, address)?;
                info!("Fetched ABI with {} entries", abi.len());
                Ok(abi)
            }
            (AbiSource::Paste, _) => self.abi_from_paste(),
            _ => self.abi_from_file(),
        }
    }

    fn abi_from_file(&mut self) -> Result<Abi> {
        loop {
            let path = self.prompter.ask_string("Enter path to ABI JSON file", None, |_| Ok(()))?;
            match load_abi_from_file(&expand_home(&path)) {
                Ok(abi) => {
                    info!("Loaded ABI with {} entries", abi.len());
                    return Ok(abi);
                }
                Err(e) => {
                    self.prompter.say(format!("Error: {}", e))?;
                    if !self.prompter.ask_yes_no("Try another file?", true)? {
                        return Err(e);
                    }
                }
            }
        }
    }

    fn abi_from_paste(&mut self) -> Result<Abi> {
        loop {
            self.prompter.say("\nPaste your ABI JSON below:")?;
            let text = self.prompter.read_multiline(PASTE_END_MARKER)?;
            match load_abi_from_paste(&text) {
                Ok(abi) => {
                    info!("Parsed ABI with {} entries", abi.len());
                    return Ok(abi);
                }
                Err(e) => {
                    self.prompter.say(format!("Error: {}", e))?;
                    if !self.prompter.ask_yes_no("Try pasting again?", true)? {
                        return Err(e);
                    }
                }
            }
        }
    }
}

fn ask_call_handlers<P: Prompt>(
    p: &mut P,
    owner: &str,
    subject: &str,
) -> Result<Option<Vec<String>>> {
    if !p.ask_yes_no(&format!("Enable call handlers for {}?", subject), false)? {
        return Ok(None);
    }
    p.say("Example signatures: transfer(address,uint256), approve(address,uint256)")?;
    let handlers = p.ask_string_list("Enter function signatures to index:", "signature", |value| {
        validate_call_handler_signature(value, owner).map_err(String::from)
    })?;

    if handlers.is_empty() {
        p.say("No call handlers added.")?;
        Ok(None)
    } else {
        Ok(Some(handlers))
    }
}

fn print_summary<P: Prompt>(p: &mut P, config: &SubgraphConfig) -> Result<()> {
    p.say(format!("\n{}", "=".repeat(60)))?;
    p.say("  Configuration Complete!")?;
    p.say("=".repeat(60))?;
    p.say(format!("\nSubgraph: {}", config.name))?;
    p.say(format!("Network: {}", config.network))?;
    p.say(format!("Complexity: {}", config.complexity))?;
    p.say(format!("Contracts: {}", config.contracts.len()))?;
    p.say(format!("Mapping mode: {}", config.mappings_mode))?;
    p.say(format!("Output: {}", config.output_dir.display()))?;

    for template in config.active_templates() {
        p.say(format!(
            "Template: {} (from {}.{})",
            template.name, template.source_contract, template.source_event
        ))?;
    }
    for r in config.active_relationships() {
        p.say(format!(
            "Relationship: {}.{} -> {} ({})",
            r.from_entity, r.field_name, r.to_entity, r.relation_type.as_str()
        ))?;
    }
    Ok(())
}

fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => "reference".to_string(),
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => Path::new(&home).join(rest),
        _ => PathBuf::from(path),
    }
}

/// Run the wizard on stdin, then offer to generate the project. A terminal
/// gets interactive prompts; piped input is read line by line.
pub fn run_wizard() -> Result<()> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        run_and_generate(&mut TerminalPrompter::new())
    } else {
        run_and_generate(&mut LinePrompter::new(stdin.lock(), io::stdout()))
    }
}

fn run_and_generate<P: Prompt>(prompter: &mut P) -> Result<()> {
    let outcome = Wizard::new(prompter, ExplorerClient::new()).run()?;
    if prompter.ask_yes_no("\nGenerate the subgraph project now?", true)? {
        generate_subgraph_project(&outcome.config, false)?;
    } else {
        prompter.say(format!(
            "\nTo generate later, run:\n  subgraph-wizard --config {} --generate",
            outcome.config_path.display()
        ))?;
    }
    Ok(())
}
