//! The closed set of diagnostics this compiler core can produce.
//!
//! Resolution accumulates [`Diagnostic`]s into a `Vec` and keeps going;
//! lowering is fail-fast and returns the first one it hits.

mod error_code;

pub use error_code::ErrorCode;

use clc_ir::Pos;
use thiserror::Error;

/// A diagnostic produced by resolution or lowering.
///
/// This is a closed set: every construct this core rejects maps to exactly
/// one of these variants, never a catch-all "internal error" string.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum Diagnostic {
    #[error("{pos}: cannot find `{name}` in this scope")]
    LookupFailure { name: String, pos: Pos },

    #[error("{pos}: `{name}` is not a class")]
    NotAClass { name: String, pos: Pos },

    #[error("{pos}: `{name}` is not a function")]
    NotAFunction { name: String, pos: Pos },

    #[error("{pos}: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        pos: Pos,
    },

    #[error("{pos}: expected {expected} argument(s), found {found}")]
    WrongNumberOfArguments {
        expected: usize,
        found: usize,
        pos: Pos,
    },

    #[error("{pos}: function returns `{expected}`, but this returns `{found}`")]
    WrongReturnType {
        expected: String,
        found: String,
        pos: Pos,
    },

    #[error("{pos}: `{name}` names a class, which cannot be used here")]
    MisuseOfClass { name: String, pos: Pos },

    #[error("{pos}: `{construct}` is not supported")]
    Unsupported { construct: String, pos: Pos },
}

impl Diagnostic {
    /// The stable [`ErrorCode`] identifying this diagnostic's shape,
    /// independent of its interpolated message.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Diagnostic::LookupFailure { .. } => ErrorCode::E2001,
            Diagnostic::NotAClass { .. } => ErrorCode::E2002,
            Diagnostic::NotAFunction { .. } => ErrorCode::E2003,
            Diagnostic::TypeMismatch { .. } => ErrorCode::E4001,
            Diagnostic::WrongNumberOfArguments { .. } => ErrorCode::E4002,
            Diagnostic::WrongReturnType { .. } => ErrorCode::E4003,
            Diagnostic::MisuseOfClass { .. } => ErrorCode::E4004,
            Diagnostic::Unsupported { .. } => ErrorCode::E4005,
        }
    }

    #[must_use]
    pub fn pos(&self) -> Pos {
        match self {
            Diagnostic::LookupFailure { pos, .. }
            | Diagnostic::NotAClass { pos, .. }
            | Diagnostic::NotAFunction { pos, .. }
            | Diagnostic::TypeMismatch { pos, .. }
            | Diagnostic::WrongNumberOfArguments { pos, .. }
            | Diagnostic::WrongReturnType { pos, .. }
            | Diagnostic::MisuseOfClass { pos, .. }
            | Diagnostic::Unsupported { pos, .. } => *pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_phase_consistent_with_diagnostic_kind() {
        let resolve_diag = Diagnostic::LookupFailure {
            name: "x".into(),
            pos: Pos::new(0),
        };
        assert!(resolve_diag.code().is_resolve_error());

        let lower_diag = Diagnostic::TypeMismatch {
            expected: "int".into(),
            found: "bool".into(),
            pos: Pos::new(0),
        };
        assert!(lower_diag.code().is_lower_error());
    }

    #[test]
    fn display_includes_position() {
        let diag = Diagnostic::Unsupported {
            construct: "index expression".into(),
            pos: Pos::new(12),
        };
        assert!(diag.to_string().contains("index expression"));
    }
}
