use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::machine::Trap;

/// Named 32-bit registers, created on first write. Names are
/// case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    regs: BTreeMap<String, i32>,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, name: &str) -> Result<i32, Trap> {
        self.regs
            .get(&key(name))
            .copied()
            .ok_or_else(|| Trap::UnknownRegister { name: key(name) })
    }

    pub fn write(&mut self, name: &str, val: i32) {
        self.regs.insert(key(name), val);
    }

    /// Apply `f` to an existing register. Reading an unset register is an
    /// error, never an implicit zero.
    pub fn modify(
        &mut self,
        name: &str,
        f: impl FnOnce(i32) -> Result<i32, Trap>,
    ) -> Result<i32, Trap> {
        let k = key(name);
        let slot = self
            .regs
            .get_mut(&k)
            .ok_or(Trap::UnknownRegister { name: k })?;
        *slot = f(*slot)?;
        Ok(*slot)
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.regs.get(&key(name)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    pub fn clear(&mut self) {
        self.regs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.regs.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}
