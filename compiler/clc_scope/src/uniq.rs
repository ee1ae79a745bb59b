//! The compilation-wide uniqueness counter.
//!
//! Fresh SSA ids, block labels, and internal-name disambiguation suffixes
//! all come from here. This is the one piece of state that must survive
//! [`crate::Stack::shadow`] and the loop engine's stack snapshot/restore
//! (§5 of the design notes): those operations roll back *bindings*, never
//! the counter, or two loops in the same function could mint colliding SSA
//! ids.

use clc_ir::ir::{Label, SsaId};

#[derive(Debug, Default)]
pub struct Uniq {
    next_ssa: u32,
    next_label: u32,
    next_suffix: u32,
}

impl Uniq {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_ssa(&mut self) -> SsaId {
        let id = SsaId::new(self.next_ssa);
        self.next_ssa += 1;
        id
    }

    pub fn fresh_label(&mut self) -> Label {
        let id = Label::new(self.next_label);
        self.next_label += 1;
        id
    }

    /// A fresh disambiguation integer for `InternalName::with_suffix`, and
    /// for lifted-lambda numbering (`lambda{k}`).
    pub fn fresh_suffix(&mut self) -> u32 {
        let id = self.next_suffix;
        self.next_suffix += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_monotonic_and_independent() {
        let mut u = Uniq::new();
        assert_eq!(u.fresh_ssa().to_string(), "%0");
        assert_eq!(u.fresh_ssa().to_string(), "%1");
        assert_eq!(u.fresh_label().to_string(), "L0");
        assert_eq!(u.fresh_ssa().to_string(), "%2");
        assert_eq!(u.fresh_suffix(), 0);
        assert_eq!(u.fresh_suffix(), 1);
    }
}
