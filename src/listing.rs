use crate::instruction::Instruction;
use crate::instructions::{Operands, Registry};

pub fn fmt_instruction(ins: &Instruction) -> String {
    let Some(desc) = Registry::shared().lookup(&ins.name) else {
        return if ins.is_label() {
            ins.name.clone()
        } else {
            format!("{ins}  ; unknown")
        };
    };
    match desc.operands {
        Operands::Addr => match ins.param(0) {
            Some(t) if t.parse::<usize>().is_ok() => format!("{} @{}", ins.name, t),
            _ => ins.to_string(),
        },
        Operands::ValOffset => match (ins.param(0), ins.param(1)) {
            (Some(x), Some(off)) if !off.starts_with('-') => format!("{} {}, +{}", ins.name, x, off),
            _ => ins.to_string(),
        },
        _ => ins.to_string(),
    }
}

/// One line per instruction, prefixed by its address. Labels (in an
/// unresolved sequence) are printed flush left without an address.
pub fn fmt_listing(instructions: &[Instruction]) -> String {
    let width = instructions.len().max(1).to_string().len();
    let mut out = String::new();
    let mut addr = 0usize;
    for ins in instructions {
        if ins.is_label() {
            out.push_str(&ins.name);
        } else {
            out.push_str(&format!("{addr:>width$}:  {}", fmt_instruction(ins)));
            addr += 1;
        }
        out.push('\n');
    }
    out
}
