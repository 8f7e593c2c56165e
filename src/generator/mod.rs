use crate::abi::{load_abi_from_file, AbiMap};
use crate::config::SubgraphConfig;
use crate::error::Result;
use crate::fs_utils::safe_write;
use crate::templating::TemplateRenderer;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

mod layout;
mod manifest;
mod mappings;
mod package_json;
mod readme;
mod schema;
mod sources;

pub use layout::{prepare_project_structure, ProjectPaths};
pub use manifest::render_subgraph_yaml;
pub use mappings::{render_all_mappings, MappingGenerator};
pub use package_json::{render_package_json, sanitize_package_name};
pub use readme::render_readme;
pub use schema::render_schema;

const DRY_RUN_PREVIEW_CHARS: usize = 200;

/// A rendered file and where it belongs in the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

impl Artifact {
    fn new(path: PathBuf, content: String) -> Self {
        Self { path, content }
    }
}

pub struct ProjectGenerator<'a> {
    config: &'a SubgraphConfig,
    renderer: &'a TemplateRenderer,
}

impl<'a> ProjectGenerator<'a> {
    pub fn new(config: &'a SubgraphConfig, renderer: &'a TemplateRenderer) -> Self {
        Self { config, renderer }
    }

    /// Render every project file in write order: manifest, schema,
    /// mappings, package.json, README
    pub fn render_all(&self, abis: &AbiMap) -> Result<Vec<Artifact>> {
        let paths = ProjectPaths::new(&self.config.output_dir);
        let mut artifacts = vec![
            Artifact::new(
                paths.root_dir.join("subgraph.yaml"),
                render_subgraph_yaml(self.config, abis, self.renderer)?,
            ),
            Artifact::new(
                paths.root_dir.join("schema.graphql"),
                render_schema(self.config, abis, self.renderer)?,
            ),
        ];

        for (name, content) in render_all_mappings(self.config, abis, self.renderer)? {
            artifacts.push(Artifact::new(paths.mapping_file(&name), content));
        }

        artifacts.push(Artifact::new(
            paths.root_dir.join("package.json"),
            render_package_json(self.config)?,
        ));
        artifacts.push(Artifact::new(
            paths.root_dir.join("README.md"),
            render_readme(self.config, abis, self.renderer)?,
        ));

        Ok(artifacts)
    }

    pub fn generate(&self, dry_run: bool) -> Result<()> {
        let config = self.config;
        let prefix = if dry_run { "[DRY RUN] " } else { "" };
        info!("{}Starting subgraph generation for: {}", prefix, config.name);
        info!("{}Output directory: {}", prefix, config.output_dir.display());
        info!("{}Network: {}", prefix, config.network);
        info!("{}Mappings mode: {}", prefix, config.mappings_mode);
        info!("{}Contracts: {}", prefix, config.contracts.len());

        let paths = if dry_run {
            let paths = ProjectPaths::new(&config.output_dir);
            for dir in [&paths.abis_dir, &paths.src_dir, &paths.mappings_dir] {
                info!("[DRY RUN] Would create: {}", dir.display());
            }
            paths
        } else {
            prepare_project_structure(&config.output_dir)?
        };

        let abis = load_abi_map(config, &paths.abis_dir);
        if abis.is_empty() {
            info!("{}No ABIs found, using placeholder entities and handlers", prefix);
        } else {
            info!("{}Loaded ABIs for {} data sources", prefix, abis.len());
        }

        for artifact in self.render_all(&abis)? {
            if dry_run {
                log_dry_run(&artifact);
            } else {
                safe_write(&artifact.path, &artifact.content)?;
                info!("Generated: {}", artifact.path.display());
            }
        }

        if dry_run {
            info!("[DRY RUN] Generation preview complete. No files were written.");
        } else {
            info!("Subgraph generation complete: {}", paths.root_dir.display());
            info!("Next steps:");
            info!("  1. cd {}", paths.root_dir.display());
            info!("  2. npm install  (or yarn)");
            info!("  3. npm run codegen");
            info!("  4. npm run build");
        }
        Ok(())
    }
}

fn log_dry_run(artifact: &Artifact) {
    info!(
        "[DRY RUN] Would write: {} ({} bytes)",
        artifact.path.display(),
        artifact.content.len()
    );
    debug!("[DRY RUN] Preview: {}", dry_run_preview(&artifact.content));
}

/// First characters of `content` on one line, with `...` when truncated
fn dry_run_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(DRY_RUN_PREVIEW_CHARS).collect();
    if content.chars().nth(DRY_RUN_PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}

/// Load ABIs for every contract, and every template of an advanced config,
/// from `abis_dir`. Missing or unreadable files fall back to placeholders.
pub fn load_abi_map(config: &SubgraphConfig, abis_dir: &Path) -> AbiMap {
    let sources = config
        .contracts
        .iter()
        .map(|c| (c.name.as_str(), c.abi_path.as_str()))
        .chain(
            config
                .active_templates()
                .iter()
                .map(|t| (t.name.as_str(), t.abi_path.as_str())),
        );

    let mut abis = AbiMap::new();
    for (name, abi_path) in sources {
        let path = abis_dir.join(abi_path);
        if !path.exists() {
            debug!("ABI file not found for {}: {}", name, path.display());
            continue;
        }
        match load_abi_from_file(&path) {
            Ok(abi) => {
                info!("Loaded ABI for {} from {}", name, path.display());
                abis.insert(name.to_string(), abi);
            }
            Err(e) => warn!("Failed to load ABI for {}: {}", name, e),
        }
    }
    abis
}

/// Generate the full project described by `config` under its output
/// directory. With `dry_run`, log what would be written and touch nothing.
pub fn generate_subgraph_project(config: &SubgraphConfig, dry_run: bool) -> Result<()> {
    let renderer = TemplateRenderer::new()?;
    ProjectGenerator::new(config, &renderer).generate(dry_run)
}
