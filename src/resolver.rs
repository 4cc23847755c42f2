use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::instruction::{Instruction, Program};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unresolved label `{label}` referenced by `{mnemonic}` at instruction {index}")]
    UnresolvedLabel {
        label: String,
        mnemonic: String,
        index: usize,
    },
    #[error("`{mnemonic}` at instruction {index} has no jump target")]
    MissingTarget { mnemonic: String, index: usize },
}

/// Replace symbolic jump targets with instruction indices and drop label
/// definitions.
///
/// `requires_address` names the mnemonics whose first parameter is a jump
/// target. A target resolves to the index, in the returned program, of the
/// first instruction following its label. Targets may also be literal
/// indices. Label names compare case-insensitively and the first definition
/// of a name wins.
pub fn resolve(
    instructions: Vec<Instruction>,
    requires_address: &HashSet<&str>,
) -> Result<Program, ResolveError> {
    // Pass 1: label -> index in the label-free sequence
    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut index = 0usize;
    for ins in &instructions {
        match ins.label_name() {
            Some(name) => {
                labels.entry(name.to_lowercase()).or_insert(index);
            }
            None => index += 1,
        }
    }
    let len = index;

    if labels.is_empty() {
        check_targets(&instructions, requires_address, len)?;
        return Ok(Program::from_resolved(instructions));
    }

    // Pass 2: drop labels, rewrite targets
    let mut out = Vec::with_capacity(len);
    for ins in instructions {
        if ins.is_label() {
            continue;
        }
        let index = out.len();
        if !requires_address.contains(ins.name.as_str()) {
            out.push(ins);
            continue;
        }
        let target = target_of(&ins, index)?;
        match labels.get(&target.to_lowercase()) {
            Some(&addr) => {
                debug!(label = target, addr, index, "resolved jump target");
                let rewritten = ins.with_target(addr.to_string());
                out.push(rewritten);
            }
            None => {
                literal_target(&ins, target, index, len)?;
                out.push(ins);
            }
        }
    }
    Ok(Program::from_resolved(out))
}

fn check_targets(
    instructions: &[Instruction],
    requires_address: &HashSet<&str>,
    len: usize,
) -> Result<(), ResolveError> {
    for (index, ins) in instructions.iter().enumerate() {
        if requires_address.contains(ins.name.as_str()) {
            let target = target_of(ins, index)?;
            literal_target(ins, target, index, len)?;
        }
    }
    Ok(())
}

fn target_of(ins: &Instruction, index: usize) -> Result<&str, ResolveError> {
    ins.param(0)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ResolveError::MissingTarget {
            mnemonic: ins.name.clone(),
            index,
        })
}

// A target that names no label must already be an index; `len` itself is
// allowed and falls through.
fn literal_target(
    ins: &Instruction,
    target: &str,
    index: usize,
    len: usize,
) -> Result<usize, ResolveError> {
    match target.parse::<usize>() {
        Ok(addr) if addr <= len => Ok(addr),
        _ => Err(ResolveError::UnresolvedLabel {
            label: target.to_string(),
            mnemonic: ins.name.clone(),
            index,
        }),
    }
}
