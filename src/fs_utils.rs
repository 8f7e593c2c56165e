use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Create `path` and any missing parents
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        debug!("Creating directory: {}", path.display());
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `content` to a temp file next to `path`, then rename it into
/// place. Readers never observe a half-written file; the temp file is
/// removed if anything fails before the rename.
pub fn safe_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!("Wrote file: {}", path.display());
    Ok(())
}
