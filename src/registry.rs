//! Registry of active consolidation patterns
//!
//! The registry owns the patterns the engine may apply and reports the window
//! bounds they imply: the smallest and largest `atomic_operation_count` among
//! active patterns. An empty registry reports `None` for both bounds, which the
//! engine treats as "pass the log through unchanged".
//!
//! # Matching Policy
//!
//! Patterns are grouped by atomic count. A window of length `n` is offered only
//! to the patterns whose count is `n`, in registration order, and the first one
//! that consolidates the window wins.

use crate::error::Result;
use crate::operation::{Operation, OperationKind, ReadWrite};
use crate::pattern::{builtin_pattern, Consolidable};
use std::collections::BTreeMap;

/// Window bounds and match function consumed by the consolidation engine
pub trait PatternMatcher {
    /// Smallest atomic count among active patterns, `None` when none are active
    fn minimum_window_size(&self) -> Option<usize>;

    /// Largest atomic count among active patterns, `None` when none are active
    fn maximum_window_size(&self) -> Option<usize>;

    /// Try every applicable pattern against `window`
    fn try_match(&self, window: &[ReadWrite]) -> Option<Operation>;
}

/// Active consolidation patterns grouped by atomic operation count
///
/// # Example Usage
/// ```
/// use tracefold::operation::OperationKind;
/// use tracefold::registry::{PatternMatcher, PatternRegistry};
///
/// let mut registry = PatternRegistry::new();
/// assert_eq!(registry.minimum_window_size(), None);
///
/// registry.register_kind(OperationKind::Swap)?;
/// assert_eq!(registry.minimum_window_size(), Some(4));
/// assert_eq!(registry.list_active(), vec![OperationKind::Swap]);
/// # Ok::<(), tracefold::error::ConsolidationError>(())
/// ```
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: BTreeMap<usize, Vec<Box<dyn Consolidable>>>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern
    ///
    /// A pattern with the same kind and atomic count replaces the existing one
    /// and keeps its position in the trial order.
    pub fn register(&mut self, pattern: Box<dyn Consolidable>) {
        let bucket = self
            .patterns
            .entry(pattern.atomic_operation_count())
            .or_default();

        match bucket.iter().position(|p| p.kind() == pattern.kind()) {
            Some(i) => bucket[i] = pattern,
            None => bucket.push(pattern),
        }
    }

    /// Add the built-in pattern for `kind`
    ///
    /// # Errors
    /// Unsupported kinds are rejected and the registry is left unchanged.
    pub fn register_kind(&mut self, kind: OperationKind) -> Result<()> {
        let pattern = builtin_pattern(kind)?;
        self.register(pattern);
        Ok(())
    }

    /// Remove every pattern of `kind` consuming `atomic_operation_count` operations
    ///
    /// Returns the number of patterns removed. Window bounds follow the
    /// remaining patterns.
    pub fn unregister(&mut self, kind: OperationKind, atomic_operation_count: usize) -> usize {
        let Some(bucket) = self.patterns.get_mut(&atomic_operation_count) else {
            return 0;
        };

        let before = bucket.len();
        bucket.retain(|p| p.kind() != kind);
        let removed = before - bucket.len();

        if bucket.is_empty() {
            self.patterns.remove(&atomic_operation_count);
        }
        removed
    }

    /// Kinds of active patterns, by ascending atomic count then registration order
    pub fn list_active(&self) -> Vec<OperationKind> {
        self.patterns
            .values()
            .flat_map(|bucket| bucket.iter().map(|p| p.kind()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }
}

impl PatternMatcher for PatternRegistry {
    fn minimum_window_size(&self) -> Option<usize> {
        self.patterns.keys().next().copied()
    }

    fn maximum_window_size(&self) -> Option<usize> {
        self.patterns.keys().next_back().copied()
    }

    fn try_match(&self, window: &[ReadWrite]) -> Option<Operation> {
        self.patterns
            .get(&window.len())?
            .iter()
            .find_map(|pattern| pattern.try_consolidate(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Address, ReadOp, WriteOp};

    /// Read of a cell followed by a write of the same value elsewhere: a copy
    #[derive(Debug)]
    struct CopyPattern;

    impl Consolidable for CopyPattern {
        fn kind(&self) -> OperationKind {
            OperationKind::Write
        }

        fn atomic_operation_count(&self) -> usize {
            2
        }

        fn try_consolidate(&self, window: &[ReadWrite]) -> Option<Operation> {
            let [ReadWrite::Read(r), ReadWrite::Write(w)] = window else {
                return None;
            };
            if r.value != w.value || r.source == w.target {
                return None;
            }
            Some(Operation::Write(WriteOp {
                source: Some(r.source.clone()),
                target: w.target.clone(),
                value: w.value.clone(),
            }))
        }
    }

    fn read(name: &str, value: f64) -> ReadWrite {
        ReadWrite::Read(ReadOp {
            source: Address::new(name),
            value: Some(vec![value]),
        })
    }

    fn write(name: &str, value: f64) -> ReadWrite {
        ReadWrite::Write(WriteOp {
            source: None,
            target: Address::new(name),
            value: Some(vec![value]),
        })
    }

    #[test]
    fn test_empty_registry_has_no_bounds() {
        let registry = PatternRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.minimum_window_size(), None);
        assert_eq!(registry.maximum_window_size(), None);
        assert!(registry.try_match(&[read("a", 1.0)]).is_none());
    }

    #[test]
    fn test_register_swap_sets_bounds() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        assert_eq!(registry.minimum_window_size(), Some(4));
        assert_eq!(registry.maximum_window_size(), Some(4));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_unsupported_kind_leaves_registry_unchanged() {
        let mut registry = PatternRegistry::new();
        assert!(registry.register_kind(OperationKind::Message).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_same_kind_twice_replaces() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        registry.register_kind(OperationKind::Swap).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mixed_sizes_bounds_and_listing() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        registry.register(Box::new(CopyPattern));

        assert_eq!(registry.minimum_window_size(), Some(2));
        assert_eq!(registry.maximum_window_size(), Some(4));
        assert_eq!(
            registry.list_active(),
            vec![OperationKind::Write, OperationKind::Swap]
        );
    }

    #[test]
    fn test_unregister_recomputes_bounds() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        registry.register(Box::new(CopyPattern));

        assert_eq!(registry.unregister(OperationKind::Swap, 4), 1);
        assert_eq!(registry.minimum_window_size(), Some(2));
        assert_eq!(registry.maximum_window_size(), Some(2));

        assert_eq!(registry.unregister(OperationKind::Write, 2), 1);
        assert_eq!(registry.minimum_window_size(), None);
        assert_eq!(registry.maximum_window_size(), None);
    }

    #[test]
    fn test_unregister_wrong_count_removes_nothing() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        assert_eq!(registry.unregister(OperationKind::Swap, 3), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_try_match_only_offers_window_to_same_size_patterns() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        registry.register(Box::new(CopyPattern));

        let copy = vec![read("a", 1.0), write("b", 1.0)];
        assert_eq!(
            registry.try_match(&copy),
            Some(Operation::Write(WriteOp {
                source: Some(Address::new("a")),
                target: Address::new("b"),
                value: Some(vec![1.0]),
            }))
        );

        let swap = vec![read("x", 1.0), read("y", 2.0), write("x", 2.0), write("y", 1.0)];
        assert!(matches!(registry.try_match(&swap), Some(Operation::Swap(_))));

        let three = vec![read("a", 1.0), write("b", 1.0), read("c", 0.0)];
        assert!(registry.try_match(&three).is_none());
    }

    #[test]
    fn test_clear() {
        let mut registry = PatternRegistry::new();
        registry.register_kind(OperationKind::Swap).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.list_active().is_empty());
    }
}
