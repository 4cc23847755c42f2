use std::cmp::Ordering;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::exec::{Executor, Flow, IntExecutor};
use crate::instruction::Instruction;
use crate::instructions::Registry;
use crate::registers::Registers;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Abort a run with `Trap::StepLimit` after this many instructions.
    pub max_steps: Option<u64>,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psw: u8 {
const Z = 1 << 0; // last cmp: equal
const N = 1 << 1; // last cmp: less
}
}

impl Psw {
    pub fn from_ordering(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => Psw::N,
            Ordering::Equal => Psw::Z,
            Ordering::Greater => Psw::empty(),
        }
    }

    /// The comparison flag as -1, 0 or 1.
    pub fn flag(self) -> i32 {
        if self.contains(Psw::Z) {
            0
        } else if self.contains(Psw::N) {
            -1
        } else {
            1
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    #[error("unknown register `{name}`")]
    UnknownRegister { name: String },
    #[error("unknown instruction `{name}` at {address}")]
    UnknownInstruction { name: String, address: usize },
    #[error("ret without call at {address}")]
    CallStackUnderflow { address: usize },
    #[error("division by zero at {address}")]
    DivisionByZero { address: usize },
    #[error("`{literal}` is neither an integer nor a register")]
    MalformedNumericLiteral { literal: String },
    #[error("`{mnemonic}` is missing operand {index}")]
    MissingOperand { mnemonic: &'static str, index: usize },
    #[error("jump from {from} to {target} leaves the program")]
    AddressOutOfRange { from: usize, target: i64 },
    #[error("step limit of {limit} exceeded")]
    StepLimit { limit: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Running,
    /// `end` executed; the `msg` output is the run's result.
    HaltedByEnd,
    /// Pointer ran past the last instruction; output is discarded.
    HaltedByFallthrough,
}

/// Per-run machine state. Each concurrent run needs its own `Machine`; the
/// instruction registry is shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub(crate) ip: usize,
    pub(crate) psw: Psw,
    pub(crate) regs: Registers,
    pub(crate) call_stack: Vec<usize>,
    pub(crate) output: Option<String>,
    cfg: MachineConfig,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(MachineConfig::default())
    }
}

impl Machine {
    pub fn new(cfg: MachineConfig) -> Self {
        Self {
            ip: 0,
            psw: Psw::Z,
            regs: Registers::new(),
            call_stack: Vec::new(),
            output: None,
            cfg,
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.cfg
    }

    /// Back to the initial state: pointer 0, flag 0, no registers, empty
    /// call stack, no output.
    pub fn reset(&mut self) {
        self.ip = 0;
        self.psw = Psw::Z;
        self.regs.clear();
        self.call_stack.clear();
        self.output = None;
    }

    pub fn pointer(&self) -> usize {
        self.ip
    }

    pub fn compare_flag(&self) -> i32 {
        self.psw.flag()
    }

    pub fn register(&self, name: &str) -> Option<i32> {
        self.regs.get(name)
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Execute the instruction at the pointer and move the pointer on.
    pub fn step<X: Executor>(
        &mut self,
        program: &[Instruction],
        registry: &Registry,
        exec: &X,
    ) -> Result<State, Trap> {
        let address = self.ip;
        let Some(ins) = program.get(address) else {
            return Ok(State::HaltedByFallthrough);
        };
        let desc = registry
            .lookup(&ins.name)
            .ok_or_else(|| Trap::UnknownInstruction {
                name: ins.name.clone(),
                address,
            })?;
        trace!(address, %ins, "step");

        match exec.exec(self, ins, desc.op)? {
            Flow::Next => self.ip = address + 1,
            Flow::Jump(target) => self.ip = target,
            Flow::End => return Ok(State::HaltedByEnd),
        }

        if self.ip >= program.len() {
            Ok(State::HaltedByFallthrough)
        } else {
            Ok(State::Running)
        }
    }

    /// Run a resolved program from a fresh state with the built-in
    /// instruction set. Returns the `msg` output only if the program reached
    /// `end`. The state is reset afterwards whatever the outcome.
    pub fn run(&mut self, program: &[Instruction]) -> Result<Option<String>, Trap> {
        self.run_with(program, Registry::shared(), &IntExecutor)
    }

    pub fn run_with<X: Executor>(
        &mut self,
        program: &[Instruction],
        registry: &Registry,
        exec: &X,
    ) -> Result<Option<String>, Trap> {
        self.reset();
        let result = self.run_loop(program, registry, exec);
        let output = self.output.take();
        self.reset();

        match result {
            Ok(State::HaltedByEnd) => {
                debug!(output = output.as_deref(), "halted by end");
                Ok(output)
            }
            Ok(state) => {
                debug!(?state, "halted without end, output discarded");
                Ok(None)
            }
            Err(trap) => {
                warn!(%trap, "run aborted");
                Err(trap)
            }
        }
    }

    fn run_loop<X: Executor>(
        &mut self,
        program: &[Instruction],
        registry: &Registry,
        exec: &X,
    ) -> Result<State, Trap> {
        let mut steps = 0u64;
        loop {
            if let Some(limit) = self.cfg.max_steps {
                if steps >= limit {
                    return Err(Trap::StepLimit { limit });
                }
            }
            steps += 1;
            match self.step(program, registry, exec)? {
                State::Running => {}
                halted => return Ok(halted),
            }
        }
    }
}
