use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use asm_interp::instructions::{Op, Registry};
use asm_interp::listing::fmt_instruction;
use asm_interp::Instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Fallthrough,
    Branch,
    CondBranch,
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub reachable: BTreeSet<usize>,
    pub edges: Vec<Edge>,
    /// Targets of `call`.
    pub subroutines: BTreeSet<usize>,
    pub rets: BTreeSet<usize>,
    pub ends: BTreeSet<usize>,
    /// Addresses whose successor cannot be known statically
    /// (unknown mnemonic, register offset, out-of-range target).
    pub opaque: BTreeSet<usize>,
}

/// Walk a resolved program from address 0. A `call` is assumed to return to
/// the following instruction; `ret` successors are not followed.
pub fn analyze(program: &[Instruction]) -> Analysis {
    let registry = Registry::shared();
    let len = program.len();
    let mut a = Analysis::default();
    let mut queue: VecDeque<usize> = VecDeque::new();
    if len > 0 {
        queue.push_back(0);
    }

    while let Some(pc) = queue.pop_front() {
        if !a.reachable.insert(pc) {
            continue;
        }
        let ins = &program[pc];
        let ft = pc + 1;
        let Some(desc) = registry.lookup(&ins.name) else {
            a.opaque.insert(pc);
            continue;
        };
        let mut succ = |a: &mut Analysis, to: usize, kind: EdgeKind| {
            a.edges.push(Edge { from: pc, to, kind });
            if to < len {
                queue.push_back(to);
            }
        };
        match desc.op {
            Op::Jmp => match target(ins) {
                Some(t) => succ(&mut a, t, EdgeKind::Branch),
                None => {
                    a.opaque.insert(pc);
                }
            },
            Op::Je | Op::Jne | Op::Jg | Op::Jge | Op::Jl | Op::Jle => {
                match target(ins) {
                    Some(t) => succ(&mut a, t, EdgeKind::CondBranch),
                    None => {
                        a.opaque.insert(pc);
                    }
                }
                succ(&mut a, ft, EdgeKind::Fallthrough);
            }
            Op::Jnz => {
                // same width the engine reads operands with
                let off = ins.param(1).and_then(|o| o.parse::<i32>().ok());
                match off.and_then(|o| (pc as i64).checked_add(i64::from(o))) {
                    Some(t) if t >= 0 => succ(&mut a, t as usize, EdgeKind::CondBranch),
                    _ => {
                        a.opaque.insert(pc);
                    }
                }
                succ(&mut a, ft, EdgeKind::Fallthrough);
            }
            Op::Call => {
                match target(ins) {
                    Some(t) => {
                        a.subroutines.insert(t);
                        succ(&mut a, t, EdgeKind::Call);
                    }
                    None => {
                        a.opaque.insert(pc);
                    }
                }
                succ(&mut a, ft, EdgeKind::Fallthrough);
            }
            Op::Ret => {
                a.rets.insert(pc);
            }
            Op::End => {
                a.ends.insert(pc);
            }
            _ => succ(&mut a, ft, EdgeKind::Fallthrough),
        }
    }
    a
}

fn target(ins: &Instruction) -> Option<usize> {
    ins.param(0).and_then(|t| t.parse().ok())
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub addr: usize,
    pub text: String,
    pub reachable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub name: String,
    pub lines: Vec<Line>,
    #[serde(flatten)]
    pub analysis: Analysis,
}

impl Report {
    pub fn new(name: impl Into<String>, program: &[Instruction]) -> Self {
        let analysis = analyze(program);
        let lines = program
            .iter()
            .enumerate()
            .map(|(addr, ins)| Line {
                addr,
                text: fmt_instruction(ins),
                reachable: analysis.reachable.contains(&addr),
            })
            .collect();
        Self {
            name: name.into(),
            lines,
            analysis,
        }
    }

    /// Addresses never reached from the entry point.
    pub fn unreachable(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().filter(|l| !l.reachable).map(|l| l.addr)
    }
}
