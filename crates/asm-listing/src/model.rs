use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub text: String,
}

pub fn load_source(path: &Path) -> Result<Source> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Source { name, text })
}

/// A single file, or every file of a directory in name order.
pub fn load_sources(path: &Path) -> Result<Vec<Source>> {
    if !path.is_dir() {
        return Ok(vec![load_source(path)?]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).with_context(|| format!("listing {}", path.display()))? {
        let p = entry?.path();
        if p.is_file() {
            files.push(p);
        }
    }
    anyhow::ensure!(!files.is_empty(), "no source files in {}", path.display());
    files.sort();
    files.iter().map(|p| load_source(p)).collect()
}
