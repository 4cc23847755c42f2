use std::fmt;

use serde::{Deserialize, Serialize};

/// One parsed source line: a lowercased mnemonic (or `label:`) and its
/// trimmed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub name: String,
    pub params: Vec<String>,
}

impl Instruction {
    pub fn new<N, I, S>(name: N, params: I) -> Self
    where
        N: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            params: params
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .collect(),
        }
    }

    /// A label definition (`name:`) rather than an executable mnemonic.
    pub fn is_label(&self) -> bool {
        self.name.ends_with(':')
    }

    /// Label name without the trailing colon.
    pub fn label_name(&self) -> Option<&str> {
        self.name.strip_suffix(':')
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Copy of this instruction with the first parameter replaced.
    pub fn with_target(&self, target: impl Into<String>) -> Self {
        let mut params = self.params.clone();
        match params.first_mut() {
            Some(first) => *first = target.into(),
            None => params.push(target.into()),
        }
        Self {
            name: self.name.clone(),
            params,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, self.params.join(", "))
        }
    }
}

/// A resolved instruction sequence: no label definitions remain and every
/// jump target is a numeric index into the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub(crate) fn from_resolved(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl std::ops::Deref for Program {
    type Target = [Instruction];

    fn deref(&self) -> &[Instruction] {
        &self.instructions
    }
}
