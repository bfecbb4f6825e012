use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters describing one consolidation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationStats {
    /// Operations in the input log
    pub input_len: usize,

    /// Operations in the output log
    pub output_len: usize,

    /// Synthesized operations emitted
    pub consolidated: usize,

    /// Scalar reads/writes absorbed into synthesized operations
    pub absorbed: usize,

    /// Window elements committed verbatim by a slide
    pub committed: usize,

    /// Non-empty windows flushed by batch writes and other kinds
    pub flushes: usize,

    /// Messages passed through
    pub messages: usize,

    /// Calls made to the pattern matcher
    pub match_attempts: usize,
}

impl ConsolidationStats {
    /// Input length over output length; 1.0 for an empty log
    pub fn compression_ratio(&self) -> f64 {
        if self.output_len == 0 {
            return 1.0;
        }
        self.input_len as f64 / self.output_len as f64
    }
}

impl fmt::Display for ConsolidationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "operations in:     {}", self.input_len)?;
        writeln!(f, "operations out:    {}", self.output_len)?;
        writeln!(
            f,
            "consolidated:      {} ({} operations absorbed)",
            self.consolidated, self.absorbed
        )?;
        writeln!(f, "slide commits:     {}", self.committed)?;
        writeln!(f, "window flushes:    {}", self.flushes)?;
        writeln!(f, "messages:          {}", self.messages)?;
        writeln!(f, "match attempts:    {}", self.match_attempts)?;
        write!(f, "compression ratio: {:.2}x", self.compression_ratio())
    }
}

/// Consolidated operation log together with run statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub operations: Vec<Operation>,
    pub stats: ConsolidationStats,
}
