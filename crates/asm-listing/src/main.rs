use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use std::fmt::Write as _;
use std::path::Path;

use asm_interp::listing::fmt_listing;
use asm_interp::{assemble, parse, Instruction};

use asm_listing::{load_sources, Report, Source};

#[derive(Parser, Debug)]
#[command(author, version, about = "Listing and control-flow report for pseudo-assembly programs", long_about=None)]
struct Cli {
    /// Source file, or a directory of source files
    #[arg(value_name = "SOURCE")]
    input: String,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE", global = true)]
    out: Option<String>,
    /// Subcommand
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the program with instruction addresses
    List {
        /// Show the parsed program before label resolution
        #[arg(long)]
        raw: bool,
    },
    /// Report control-flow edges, subroutines and unreachable code
    Analyze,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ListingOut<'a> {
    name: &'a str,
    instructions: &'a [Instruction],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sources = load_sources(Path::new(&cli.input))?;

    let rendered = match cli.cmd {
        Command::List { raw } => list(&sources, raw, cli.format)?,
        Command::Analyze => analyze(&sources, cli.format)?,
    };

    match &cli.out {
        Some(path) => std::fs::write(path, rendered).with_context(|| format!("writing {path}"))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn list(sources: &[Source], raw: bool, format: OutputFormat) -> Result<String> {
    let mut programs = Vec::new();
    for src in sources {
        let instructions = if raw {
            parse(&src.text)
        } else {
            assemble(&src.text)
                .with_context(|| format!("resolving {}", src.name))?
                .into_instructions()
        };
        programs.push((src.name.as_str(), instructions));
    }

    match format {
        OutputFormat::Json => {
            let out: Vec<_> = programs
                .iter()
                .map(|(name, instructions)| ListingOut { name: *name, instructions: instructions.as_slice() })
                .collect();
            Ok(serde_json::to_string_pretty(&out)? + "\n")
        }
        OutputFormat::Text => {
            let mut s = String::new();
            for (name, instructions) in &programs {
                if sources.len() > 1 {
                    writeln!(s, "== {name}")?;
                }
                s.push_str(&fmt_listing(instructions));
            }
            Ok(s)
        }
    }
}

fn analyze(sources: &[Source], format: OutputFormat) -> Result<String> {
    let mut reports = Vec::new();
    for src in sources {
        let program = assemble(&src.text).with_context(|| format!("resolving {}", src.name))?;
        reports.push(Report::new(&src.name, &program));
    }

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&reports)? + "\n");
    }

    let mut s = String::new();
    for r in &reports {
        writeln!(s, "== {}", r.name)?;
        for line in &r.lines {
            let mark = if line.reachable { ' ' } else { '!' };
            let sub = if r.analysis.subroutines.contains(&line.addr) { "sub " } else { "    " };
            writeln!(s, "{mark} {sub}{:>4}:  {}", line.addr, line.text)?;
        }
        writeln!(s, "edges:")?;
        for e in &r.analysis.edges {
            writeln!(s, "  {:>4} -> {:<4} {:?}", e.from, e.to, e.kind)?;
        }
        let unreachable: Vec<String> = r.unreachable().map(|a| a.to_string()).collect();
        if !unreachable.is_empty() {
            writeln!(s, "unreachable: {}", unreachable.join(", "))?;
        }
        if !r.analysis.opaque.is_empty() {
            let opaque: Vec<String> = r.analysis.opaque.iter().map(|a| a.to_string()).collect();
            writeln!(s, "opaque: {}", opaque.join(", "))?;
        }
    }
    Ok(s)
}
