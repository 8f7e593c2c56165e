use crate::error::Result;
use crate::fs_utils::ensure_dir;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directories of a generated subgraph project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root_dir: PathBuf,
    pub abis_dir: PathBuf,
    pub src_dir: PathBuf,
    pub mappings_dir: PathBuf,
}

impl ProjectPaths {
    pub fn new(root_dir: &Path) -> Self {
        let src_dir = root_dir.join("src");
        Self {
            root_dir: root_dir.to_path_buf(),
            abis_dir: root_dir.join("abis"),
            mappings_dir: src_dir.join("mappings"),
            src_dir,
        }
    }

    pub fn mapping_file(&self, source_name: &str) -> PathBuf {
        self.mappings_dir.join(format!("{}.ts", source_name))
    }
}

/// Create `<root>/abis` and `<root>/src/mappings`
pub fn prepare_project_structure(root_dir: &Path) -> Result<ProjectPaths> {
    let paths = ProjectPaths::new(root_dir);
    info!("Preparing project structure in: {}", root_dir.display());

    for dir in [&paths.root_dir, &paths.abis_dir, &paths.src_dir, &paths.mappings_dir] {
        ensure_dir(dir)?;
        debug!("Created directory {}", dir.display());
    }

    Ok(paths)
}
