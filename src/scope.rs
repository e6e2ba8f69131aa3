//! Verb-loop scope resolution
//!
//! While the parser walks a recipe's method statements it keeps a stack of
//! the loops that are open at that point. Closing a loop patches the three
//! step kinds involved with their relative jump distances:
//!
//! * the `VerbBegin` gets a forward offset to its `UntilVerbed`,
//! * the `UntilVerbed` gets the same offset, negated,
//! * every `SetAside` in between gets a forward offset to the `UntilVerbed`.

use crate::model::MethodStep;
use crate::span::Span;

/// A loop whose `UntilVerbed` has not been seen yet
#[derive(Debug)]
struct OpenScope {
    /// Lemma of the opening verb, as written
    verb: String,
    /// Participle that closes this loop, lowercase
    expected: String,
    verb_span: Span,
    /// Index of the `VerbBegin` in the method list
    begin: usize,
    /// Indices of `SetAside` steps directly inside this loop
    breaks: Vec<usize>,
}

/// Scope stack of a single recipe's method list
///
/// Ephemeral parsing state; must be [`finish`](ScopeTracker::finish)ed empty
/// for the recipe to be valid.
#[derive(Debug, Default)]
pub(crate) struct ScopeTracker {
    stack: Vec<OpenScope>,
}

/// Why an `Until` statement failed to close a loop
#[derive(Debug, PartialEq)]
pub(crate) enum CloseError {
    /// No loop is open
    Unmatched,
    /// The participle does not inflect the innermost open verb
    Mismatch {
        verb: String,
        verb_span: Span,
        expected: String,
    },
}

impl ScopeTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Record a `VerbBegin` at `begin`, closable by `expected`
    pub(crate) fn open(&mut self, verb: String, expected: String, verb_span: Span, begin: usize) {
        self.stack.push(OpenScope {
            verb,
            expected,
            verb_span,
            begin,
            breaks: Vec::new(),
        });
    }

    /// Record a `SetAside` at `idx`. Fails outside of any loop.
    pub(crate) fn set_aside(&mut self, idx: usize) -> Result<(), ()> {
        match self.stack.last_mut() {
            Some(scope) => {
                scope.breaks.push(idx);
                Ok(())
            }
            None => Err(()),
        }
    }

    /// Close the innermost loop with the `UntilVerbed` at `end`, patching
    /// jump offsets into `method`.
    ///
    /// On a participle mismatch the scope is popped anyway so a single bad
    /// closure does not also report every outer loop as unclosed.
    pub(crate) fn close(
        &mut self,
        participle: &str,
        end: usize,
        method: &mut [MethodStep],
    ) -> Result<(), CloseError> {
        let scope = self.stack.pop().ok_or(CloseError::Unmatched)?;
        if participle.to_lowercase() != scope.expected {
            return Err(CloseError::Mismatch {
                verb: scope.verb,
                verb_span: scope.verb_span,
                expected: scope.expected,
            });
        }

        let distance = (end - scope.begin) as isize;
        method[scope.begin].jump_offset = distance;
        method[end].jump_offset = -distance;
        for brk in scope.breaks {
            method[brk].jump_offset = (end - brk) as isize;
        }
        Ok(())
    }

    /// End of the recipe's method list. Returns the loops left open, if any.
    pub(crate) fn finish(&mut self) -> Vec<(String, Span)> {
        self.stack
            .drain(..)
            .map(|s| (s.verb, s.verb_span))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MethodStepKind;

    fn steps(n: usize) -> Vec<MethodStep> {
        (0..n)
            .map(|i| MethodStep::new(MethodStepKind::Clean, Span::pos(i)))
            .collect()
    }

    #[test]
    fn offsets() {
        let mut method = steps(6);
        let mut scopes = ScopeTracker::new();
        scopes.open("Bake".into(), "baked".into(), Span::pos(1), 1);
        scopes.set_aside(3).unwrap();
        scopes.close("baked", 5, &mut method).unwrap();
        assert!(scopes.is_empty());
        assert_eq!(method[1].jump_offset, 4);
        assert_eq!(method[5].jump_offset, -4);
        assert_eq!(method[3].jump_offset, 2);
    }

    #[test]
    fn nested() {
        let mut method = steps(8);
        let mut scopes = ScopeTracker::new();
        scopes.open("Bake".into(), "baked".into(), Span::pos(0), 0);
        scopes.open("Sift".into(), "sifted".into(), Span::pos(2), 2);
        scopes.close("sifted", 4, &mut method).unwrap();
        scopes.close("baked", 7, &mut method).unwrap();
        assert_eq!(method[2].jump_offset, 2);
        assert_eq!(method[4].jump_offset, -2);
        assert_eq!(method[0].jump_offset, 7);
        assert_eq!(method[7].jump_offset, -7);
    }

    #[test]
    fn mismatch() {
        let mut method = steps(3);
        let mut scopes = ScopeTracker::new();
        scopes.open("Sift".into(), "sifted".into(), Span::pos(0), 0);
        let err = scopes.close("baked", 2, &mut method).unwrap_err();
        assert!(matches!(err, CloseError::Mismatch { .. }));
        // popped regardless
        assert!(scopes.is_empty());
    }

    #[test]
    fn unmatched_close_and_break() {
        let mut method = steps(2);
        let mut scopes = ScopeTracker::new();
        assert_eq!(
            scopes.close("baked", 1, &mut method),
            Err(CloseError::Unmatched)
        );
        assert!(scopes.set_aside(0).is_err());
    }

    #[test]
    fn unclosed_reported() {
        let mut scopes = ScopeTracker::new();
        scopes.open("Bake".into(), "baked".into(), Span::pos(4), 0);
        let open = scopes.finish();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].0, "Bake");
    }
}
