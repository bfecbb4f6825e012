//! Sliding-window consolidation engine
//!
//! Rewrites an operation log by replacing runs of scalar reads and writes that
//! match a registered pattern with the single higher-level operation the pattern
//! synthesizes. Everything else passes through in its original order.
//!
//! # Algorithm
//!
//! ```text
//! pending: [r(x) msg r(y) w(x) w(y) r(z) ...]      window: []     output: []
//!
//! fill     pull until |window| == min             (messages go straight to output,
//!                                                   batch writes flush the window)
//! match    try_match(window); on success emit it and clear the window,
//!          otherwise pull one more and retry while |window| <= max
//! slide    no match up to max: commit the oldest window element to output,
//!          give the newest elements back to the front of pending until
//!          |window| == min, then fill again
//! drain    pending exhausted: append whatever is left in the window
//! ```
//!
//! Every branch either consumes a pending operation or commits one permanently,
//! so the loop always terminates.
//!
//! # Example
//!
//! ```
//! use tracefold::engine::ConsolidationEngine;
//! use tracefold::operation::{Address, Operation, OperationKind};
//!
//! # fn main() -> Result<(), tracefold::error::ConsolidationError> {
//! let mut engine = ConsolidationEngine::new();
//! engine.add_pattern(OperationKind::Swap)?;
//!
//! let (x, y) = (Address::new("x"), Address::new("y"));
//! let log = vec![
//!     Operation::read(x.clone(), 1.0),
//!     Operation::read(y.clone(), 2.0),
//!     Operation::write(x, 2.0),
//!     Operation::write(y, 1.0),
//! ];
//!
//! let consolidated = engine.interpret(&log)?;
//! assert_eq!(consolidated.len(), 1);
//! assert_eq!(consolidated[0].kind(), OperationKind::Swap);
//! # Ok(())
//! # }
//! ```

mod stats;

pub use stats::{Consolidation, ConsolidationStats};

use crate::error::Result;
use crate::operation::{Classified, Operation, OperationKind, ReadWrite};
use crate::pattern::{builtin_pattern, Consolidable};
use crate::registry::{PatternMatcher, PatternRegistry};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Consolidates operation logs using the patterns of its matcher
///
/// The engine keeps no working state between calls: every [`interpret`] call
/// builds its own queue, window, and output. The matcher is the only
/// persistent state and is changed only through the registration methods.
///
/// [`interpret`]: ConsolidationEngine::interpret
#[derive(Debug, Default)]
pub struct ConsolidationEngine<M = PatternRegistry> {
    matcher: M,
}

impl ConsolidationEngine<PatternRegistry> {
    /// Engine with an empty pattern registry (identity transform)
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the built-in pattern for `kind`
    ///
    /// # Errors
    /// Kinds without a built-in pattern are rejected; the registry is unchanged.
    pub fn add_pattern(&mut self, kind: OperationKind) -> Result<()> {
        self.matcher.register_kind(kind).inspect_err(|e| {
            warn!("Rejected pattern registration: {}", e);
        })?;
        debug!("Pattern '{}' activated", kind);
        Ok(())
    }

    /// Deactivate the built-in pattern for `kind`
    ///
    /// Returns the number of patterns removed (0 when it was not active).
    ///
    /// # Errors
    /// Kinds without a built-in pattern are rejected; the registry is unchanged.
    pub fn remove_pattern(&mut self, kind: OperationKind) -> Result<usize> {
        let pattern = builtin_pattern(kind).inspect_err(|e| {
            warn!("Rejected pattern removal: {}", e);
        })?;
        let removed = self
            .matcher
            .unregister(kind, pattern.atomic_operation_count());
        debug!("Pattern '{}' deactivated ({} removed)", kind, removed);
        Ok(removed)
    }

    /// Activate a custom pattern
    pub fn register_pattern(&mut self, pattern: Box<dyn Consolidable>) {
        debug!(
            "Pattern '{}' registered ({} atomic operations)",
            pattern.kind(),
            pattern.atomic_operation_count()
        );
        self.matcher.register(pattern);
    }

    pub fn list_active_pattern_kinds(&self) -> Vec<OperationKind> {
        self.matcher.list_active()
    }
}

impl<M: PatternMatcher> ConsolidationEngine<M> {
    /// Engine driven by an arbitrary pattern matcher
    pub fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn matcher_mut(&mut self) -> &mut M {
        &mut self.matcher
    }

    /// Consolidate `input` into a new operation log
    ///
    /// `input` is never modified. With no active patterns the output equals the input.
    ///
    /// # Errors
    /// Returns [`ConsolidationError::MalformedOperation`] when a write's payload
    /// length cannot be determined.
    ///
    /// # Panics
    /// Panics when the matcher reports inconsistent window bounds
    /// (`max < min`, or only one bound present).
    ///
    /// [`ConsolidationError::MalformedOperation`]: crate::error::ConsolidationError::MalformedOperation
    pub fn interpret(&self, input: &[Operation]) -> Result<Vec<Operation>> {
        self.interpret_with_stats(input).map(|c| c.operations)
    }

    /// Like [`interpret`](Self::interpret), also reporting what the engine did
    pub fn interpret_with_stats(&self, input: &[Operation]) -> Result<Consolidation> {
        let mut stats = ConsolidationStats {
            input_len: input.len(),
            ..ConsolidationStats::default()
        };

        let Some(bounds) = self.window_bounds() else {
            debug!("No active patterns, passing {} operations through", input.len());
            stats.output_len = input.len();
            return Ok(Consolidation {
                operations: input.to_vec(),
                stats,
            });
        };

        let mut ws = WorkingSet::new(input);

        'outer: while !ws.pending.is_empty() || !ws.window.is_empty() {
            // Fill
            while ws.window.len() < bounds.min {
                if !ws.pull(&mut stats)? {
                    break 'outer;
                }
            }

            // Match, expanding one operation at a time
            while ws.window.len() <= bounds.max {
                if ws.window.len() < bounds.min {
                    // A flush during expansion emptied the window
                    continue 'outer;
                }

                stats.match_attempts += 1;
                trace!("Trying window of {} operations", ws.window.len());
                if let Some(consolidated) = self.matcher.try_match(&ws.window.ops) {
                    debug!(
                        "Consolidated {} operations into {}",
                        ws.window.len(),
                        consolidated
                    );
                    stats.consolidated += 1;
                    stats.absorbed += ws.window.len();
                    ws.output.push(consolidated);
                    ws.window.clear();
                    continue 'outer;
                }

                if !ws.pull(&mut stats)? {
                    break 'outer;
                }
            }

            // Slide: the oldest operation is not part of any pattern
            if let Some(oldest) = ws.window.pop_oldest() {
                trace!("Committing {:?}", oldest);
                ws.output.push(oldest.into());
                stats.committed += 1;
            }
            while ws.window.len() > bounds.min {
                if let Some((position, newest)) = ws.window.pop_newest() {
                    ws.pending.push_front((position, newest.into()));
                }
            }
        }

        ws.flush_window();
        stats.output_len = ws.output.len();
        debug!(
            "Consolidated {} operations into {} ({} patterns matched)",
            stats.input_len, stats.output_len, stats.consolidated
        );

        Ok(Consolidation {
            operations: ws.output,
            stats,
        })
    }

    fn window_bounds(&self) -> Option<WindowBounds> {
        let min = self.matcher.minimum_window_size();
        let max = self.matcher.maximum_window_size();
        match (min, max) {
            (None, None) => None,
            (Some(min), Some(max)) => {
                assert!(
                    min <= max,
                    "pattern matcher reports maximum window size {} below minimum {}",
                    max,
                    min
                );
                // An empty window can never be consolidated
                if max == 0 {
                    return None;
                }
                Some(WindowBounds {
                    min: min.max(1),
                    max,
                })
            }
            (min, max) => panic!(
                "pattern matcher reports inconsistent window bounds: min={:?}, max={:?}",
                min, max
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowBounds {
    min: usize,
    max: usize,
}

/// Scalar reads and writes under consideration, with their input positions
#[derive(Debug, Default)]
struct Window {
    ops: Vec<ReadWrite>,
    positions: Vec<usize>,
}

impl Window {
    fn len(&self) -> usize {
        self.ops.len()
    }

    fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    fn push(&mut self, position: usize, op: ReadWrite) {
        self.ops.push(op);
        self.positions.push(position);
    }

    fn pop_oldest(&mut self) -> Option<ReadWrite> {
        if self.ops.is_empty() {
            return None;
        }
        self.positions.remove(0);
        Some(self.ops.remove(0))
    }

    fn pop_newest(&mut self) -> Option<(usize, ReadWrite)> {
        Some((self.positions.pop()?, self.ops.pop()?))
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.positions.clear();
    }

    fn drain(&mut self) -> impl Iterator<Item = ReadWrite> + '_ {
        self.positions.clear();
        self.ops.drain(..)
    }
}

/// Per-call state: pending queue, window, and output
struct WorkingSet {
    pending: VecDeque<(usize, Operation)>,
    window: Window,
    output: Vec<Operation>,
}

impl WorkingSet {
    fn new(input: &[Operation]) -> Self {
        Self {
            pending: input.iter().cloned().enumerate().collect(),
            window: Window::default(),
            output: Vec::with_capacity(input.len()),
        }
    }

    /// Pull operations until one scalar read/write joins the window
    ///
    /// Messages go straight to the output. Operations that cannot take part in
    /// a pattern flush the window first. Returns `false` once pending is exhausted.
    fn pull(&mut self, stats: &mut ConsolidationStats) -> Result<bool> {
        while let Some((position, op)) = self.pending.pop_front() {
            match op.classify(position)? {
                Classified::Message(op) => {
                    stats.messages += 1;
                    self.output.push(op);
                }
                Classified::Standalone(op) => {
                    if !self.window.is_empty() {
                        trace!("Flushing window of {} before {}", self.window.len(), op);
                        stats.flushes += 1;
                        self.flush_window();
                    }
                    self.output.push(op);
                }
                Classified::Scalar(rw) => {
                    self.window.push(position, rw);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn flush_window(&mut self) {
        let flushed = self.window.drain().map(Operation::from);
        self.output.extend(flushed);
    }
}
