use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use asm_interp::{interpret_with, MachineConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run pseudo-assembly programs and print their output"
)]
struct Opts {
    /// Abort a program after this many executed instructions
    #[arg(long)]
    max_steps: Option<u64>,
    /// Machine configuration as JSON (flags take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Source files, or directories whose files are run in name order
    #[arg(value_name = "SOURCE", required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let mut cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<MachineConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => MachineConfig::default(),
    };
    if opts.max_steps.is_some() {
        cfg.max_steps = opts.max_steps;
    }

    let mut sources = Vec::new();
    for input in &opts.inputs {
        collect_sources(input, &mut sources)?;
    }

    let mut failed = 0usize;
    for path in &sources {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        match interpret_with(&text, cfg) {
            // absent output prints as an empty line
            Ok(output) => println!("{}", output.unwrap_or_default()),
            Err(err) => {
                error!(path = %path.display(), %err, "program failed");
                eprintln!("{}: {err}", path.display());
                failed += 1;
            }
        }
    }

    anyhow::ensure!(failed == 0, "{failed} of {} programs failed", sources.len());
    Ok(())
}

fn collect_sources(input: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !input.is_dir() {
        out.push(input.to_path_buf());
        return Ok(());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input).with_context(|| format!("listing {}", input.display()))? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    out.extend(files);
    Ok(())
}
