pub mod exec;
pub mod instruction;
pub mod instructions;
pub mod listing;
pub mod machine;
pub mod parser;
pub mod registers;
pub mod resolver;

pub use instruction::{Instruction, Program};
pub use instructions::Registry;
pub use machine::{Machine, MachineConfig, State, Trap};
pub use parser::parse;
pub use resolver::{resolve, ResolveError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Trap(#[from] Trap),
}

/// Parse and label-resolve `source` against the built-in instruction set.
pub fn assemble(source: &str) -> Result<Program, ResolveError> {
    resolve(parse(source), Registry::shared().requires_address())
}

/// Parse, resolve and run `source` on a fresh machine.
pub fn interpret(source: &str) -> Result<Option<String>, Error> {
    interpret_with(source, MachineConfig::default())
}

/// [`interpret`] with a custom [`MachineConfig`].
pub fn interpret_with(source: &str, cfg: MachineConfig) -> Result<Option<String>, Error> {
    let program = assemble(source)?;
    Ok(Machine::new(cfg).run(&program)?)
}
