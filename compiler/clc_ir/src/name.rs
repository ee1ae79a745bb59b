//! Internal names: the bytes used for a symbol in the emitted IR.

use std::fmt;

/// A stable identifier used for a symbol in the emitted IR.
///
/// For locals subject to SSA rewriting, the internal name includes a
/// disambiguating integer suffix (`source_name ++ fresh_int`, see
/// `clc_scope::Stack::put`); for everything else it is simply the source
/// name (or a compiler-synthesized name, e.g. `lambda0`).
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct InternalName(Box<str>);

impl InternalName {
    /// Build an internal name directly from already-unique text.
    #[must_use]
    pub fn new(s: impl Into<Box<str>>) -> Self {
        InternalName(s.into())
    }

    /// Build an SSA-disambiguated internal name: `source_name ++ suffix`.
    #[must_use]
    pub fn with_suffix(source_name: &str, suffix: u32) -> Self {
        InternalName(format!("{source_name}.{suffix}").into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for InternalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InternalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InternalName {
    fn from(s: &str) -> Self {
        InternalName(s.into())
    }
}

impl From<String> for InternalName {
    fn from(s: String) -> Self {
        InternalName(s.into())
    }
}
