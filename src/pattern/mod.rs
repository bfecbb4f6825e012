// Consolidable patterns
//
// A pattern recognizes a fixed-size run of scalar reads and writes and
// synthesizes the higher-level operation it represents. Patterns are
// capability objects keyed by kind; the registry only knows them through
// the `Consolidable` trait, so new shapes can be added without touching
// the engine.

mod swap;

pub use swap::SwapPattern;

use crate::error::{ConsolidationError, Result};
use crate::operation::{Operation, OperationKind, ReadWrite};
use std::fmt::Debug;

/// A structural pattern over a window of scalar reads and writes
pub trait Consolidable: Debug + Send + Sync {
    /// Kind of the operation this pattern synthesizes
    fn kind(&self) -> OperationKind;

    /// Number of scalar read/write operations the pattern consumes
    fn atomic_operation_count(&self) -> usize;

    /// Attempt to consolidate `window` into a single operation
    ///
    /// Returns `None` when the window does not have the pattern's shape,
    /// including when its length differs from [`Self::atomic_operation_count`].
    fn try_consolidate(&self, window: &[ReadWrite]) -> Option<Operation>;
}

/// Construct the built-in pattern for `kind`
///
/// # Errors
/// Returns [`ConsolidationError::UnsupportedPattern`] for kinds that have no
/// built-in pattern.
pub fn builtin_pattern(kind: OperationKind) -> Result<Box<dyn Consolidable>> {
    match kind {
        OperationKind::Swap => Ok(Box::new(SwapPattern)),
        other => Err(ConsolidationError::UnsupportedPattern { kind: other }),
    }
}
