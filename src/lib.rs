//! Tracefold - sliding-window consolidation of operation logs
//!
//! This library rewrites ordered logs of low-level reads and writes into
//! higher-level operations: runs that structurally match a registered pattern
//! (for example the read-read-write-write quartet of a swap) are replaced by a
//! single synthesized operation, while everything else keeps its order.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod json_trace;
pub mod operation;
pub mod pattern;
pub mod registry;

pub use engine::{Consolidation, ConsolidationEngine, ConsolidationStats};
pub use error::{ConsolidationError, Result};
pub use operation::{Address, Operation, OperationKind};
pub use registry::{PatternMatcher, PatternRegistry};
