//! Stack-growth guard for deeply recursive AST traversal.
//!
//! Expression and statement lowering recurse structurally over the input
//! AST, which has no depth bound. Rather than rely on the platform default
//! stack size, recursive entry points wrap themselves in
//! [`ensure_sufficient_stack`], which grows the stack on demand.
//!
//! # Platform support
//!
//! - **Native targets**: uses the `stacker` crate to grow the stack when needed.
//! - **WASM targets**: no-op passthrough (WASM manages its own stack).

/// Minimum stack space to keep available (64KB red zone) before growing.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 64 * 1024;

/// Stack space to allocate when growing (1MB per growth).
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// Wrap recursive descents (expression lowering, statement lowering, the
/// syntactic writes-set walk) with this so deeply nested source programs
/// don't overflow the stack.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_recursion_returns_correct_result() {
        fn factorial(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n <= 1 { 1 } else { n * factorial(n - 1) })
        }
        assert_eq!(factorial(10), 3_628_800);
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        fn deep(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { deep(n - 1) + 1 })
        }
        assert_eq!(deep(200_000), 200_000);
    }
}
