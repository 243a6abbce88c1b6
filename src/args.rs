//! Argument composition shared by the executor and checker adapters.

/// Concatenate call-specific arguments with an adapter's fixed extras.
///
/// Call arguments keep their positions and the extras follow in the order they
/// were captured at construction. Loop-managed context (value or error,
/// history, attempt number) is always passed after the composed sequence, so
/// the context tail stays in the same position no matter how many extras an
/// adapter carries.
pub(crate) fn compose<A: Clone>(call_args: &[A], extra: &[A]) -> Vec<A> {
    let mut composed = Vec::with_capacity(call_args.len() + extra.len());
    composed.extend_from_slice(call_args);
    composed.extend_from_slice(extra);
    composed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_args_come_first() {
        let composed = compose(&["a", "b"], &["x", "y", "z"]);
        assert_eq!(composed, vec!["a", "b", "x", "y", "z"]);
    }

    #[test]
    fn empty_extras_leave_call_args_untouched() {
        let composed = compose(&[1, 2, 3], &[]);
        assert_eq!(composed, vec![1, 2, 3]);
    }

    #[test]
    fn empty_call_args_yield_only_extras() {
        let composed = compose::<i32>(&[], &[7]);
        assert_eq!(composed, vec![7]);
    }

    #[test]
    fn both_empty_is_empty() {
        let composed = compose::<String>(&[], &[]);
        assert!(composed.is_empty());
    }
}
