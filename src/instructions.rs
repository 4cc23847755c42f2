use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Mov,
    Inc,
    Dec,
    Add,
    Sub,
    Mul,
    Div,
    Jmp,
    Cmp,
    Je,
    Jne,
    Jg,
    Jge,
    Jl,
    Jle,
    Jnz,
    Call,
    Ret,
    Msg,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    Reg,
    RegVal,
    ValVal,
    /// First parameter is a jump target rewritten by the label resolver.
    Addr,
    /// Value and a relative offset; the offset is never label-resolved.
    ValOffset,
    Variadic,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub operands: Operands,
}

impl InstrDesc {
    pub fn requires_address(&self) -> bool {
        self.operands == Operands::Addr
    }
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc { op: Op::Mov, mnemonic: "mov", operands: Operands::RegVal },
    InstrDesc { op: Op::Inc, mnemonic: "inc", operands: Operands::Reg },
    InstrDesc { op: Op::Dec, mnemonic: "dec", operands: Operands::Reg },
    InstrDesc { op: Op::Add, mnemonic: "add", operands: Operands::RegVal },
    InstrDesc { op: Op::Sub, mnemonic: "sub", operands: Operands::RegVal },
    InstrDesc { op: Op::Mul, mnemonic: "mul", operands: Operands::RegVal },
    InstrDesc { op: Op::Div, mnemonic: "div", operands: Operands::RegVal },
    InstrDesc { op: Op::Jmp, mnemonic: "jmp", operands: Operands::Addr },
    InstrDesc { op: Op::Cmp, mnemonic: "cmp", operands: Operands::ValVal },
    InstrDesc { op: Op::Je, mnemonic: "je", operands: Operands::Addr },
    InstrDesc { op: Op::Jne, mnemonic: "jne", operands: Operands::Addr },
    InstrDesc { op: Op::Jg, mnemonic: "jg", operands: Operands::Addr },
    InstrDesc { op: Op::Jge, mnemonic: "jge", operands: Operands::Addr },
    InstrDesc { op: Op::Jl, mnemonic: "jl", operands: Operands::Addr },
    InstrDesc { op: Op::Jle, mnemonic: "jle", operands: Operands::Addr },
    InstrDesc { op: Op::Jnz, mnemonic: "jnz", operands: Operands::ValOffset },
    InstrDesc { op: Op::Call, mnemonic: "call", operands: Operands::Addr },
    InstrDesc { op: Op::Ret, mnemonic: "ret", operands: Operands::None },
    InstrDesc { op: Op::Msg, mnemonic: "msg", operands: Operands::Variadic },
    InstrDesc { op: Op::End, mnemonic: "end", operands: Operands::None },
];

/// Read-only mnemonic table shared by every run.
#[derive(Debug)]
pub struct Registry {
    table: &'static [InstrDesc],
    requires_address: HashSet<&'static str>,
}

impl Registry {
    pub fn new(table: &'static [InstrDesc]) -> Self {
        let requires_address = table
            .iter()
            .filter(|d| d.requires_address())
            .map(|d| d.mnemonic)
            .collect();
        Self {
            table,
            requires_address,
        }
    }

    /// The built-in instruction set, constructed once.
    pub fn shared() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| Registry::new(TABLE))
    }

    pub fn lookup(&self, mnemonic: &str) -> Option<&InstrDesc> {
        self.table.iter().find(|d| d.mnemonic == mnemonic)
    }

    /// Mnemonics whose first parameter is a jump target.
    pub fn requires_address(&self) -> &HashSet<&'static str> {
        &self.requires_address
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrDesc> {
        self.table.iter()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new(TABLE)
    }
}
