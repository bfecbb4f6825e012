//! Operation log model
//!
//! An operation log is an ordered sequence of [`Operation`]s: reads and writes
//! against addressable storage, opaque messages, and synthesized higher-level
//! operations such as [`Operation::Swap`]. Only scalar reads and writes may take
//! part in a consolidation window; [`Operation::classify`] decides where every
//! other operation goes.
//!
//! # JSON Representation
//!
//! ```json
//! {"operation": "read", "source": {"identifier": "a", "index": [0]}, "value": [3.0]}
//! {"operation": "write", "target": {"identifier": "a", "index": [1]}, "value": [7.0]}
//! {"operation": "message", "text": "sorting started"}
//! ```

use crate::error::{ConsolidationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An addressable storage cell: a named variable, optionally indexed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Address {
    /// Variable identifier (e.g., "a", "tmp")
    pub identifier: String,

    /// Index path into the variable; empty for plain variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index: Vec<usize>,
}

impl Address {
    /// Plain (unindexed) variable
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            index: Vec::new(),
        }
    }

    /// Indexed cell, e.g. `a[3]` or `m[1][2]`
    pub fn indexed(identifier: impl Into<String>, index: impl Into<Vec<usize>>) -> Self {
        Self {
            identifier: identifier.into(),
            index: index.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        for i in &self.index {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}

/// Operation kind tag
///
/// Deserializes through [`FromStr`], so names are case-insensitive everywhere
/// a kind is read (CLI flags and config files alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OperationKind {
    Read,
    Write,
    Message,
    Swap,
    Remove,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Read,
        OperationKind::Write,
        OperationKind::Message,
        OperationKind::Swap,
        OperationKind::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
            OperationKind::Message => "message",
            OperationKind::Swap => "swap",
            OperationKind::Remove => "remove",
        }
    }

    /// Number of scalar read/write operations a composite kind stands for
    ///
    /// `None` for kinds that are never produced by consolidation.
    pub fn atomic_operation_count(&self) -> Option<usize> {
        match self {
            OperationKind::Swap => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ConsolidationError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| ConsolidationError::UnknownKind(s.to_string()))
    }
}

impl TryFrom<String> for OperationKind {
    type Error = ConsolidationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Read of a storage cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct ReadOp {
    pub source: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<f64>>,
}

/// Write to a storage cell, optionally copied from another cell
///
/// `value` is `None` when the payload length cannot be determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct WriteOp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Address>,
    pub target: Address,
    #[serde(default)]
    pub value: Option<Vec<f64>>,
}

/// Exchange of two storage cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct SwapOp {
    pub first: Address,
    pub second: Address,
    /// Values of `first` and `second` before the exchange, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<[f64; 2]>,
}

/// One event in an operation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(tag = "operation", rename_all = "lowercase")]
#[non_exhaustive]
pub enum Operation {
    Read(ReadOp),
    Write(WriteOp),
    Message { text: String },
    Swap(SwapOp),
    Remove { target: Address },
}

impl Operation {
    /// Scalar read with a known value
    pub fn read(source: Address, value: f64) -> Self {
        Operation::Read(ReadOp {
            source,
            value: Some(vec![value]),
        })
    }

    /// Scalar write with a known value
    pub fn write(target: Address, value: f64) -> Self {
        Operation::Write(WriteOp {
            source: None,
            target,
            value: Some(vec![value]),
        })
    }

    /// Write carrying several values at once; never enters a window
    pub fn batch_write(target: Address, values: Vec<f64>) -> Self {
        Operation::Write(WriteOp {
            source: None,
            target,
            value: Some(values),
        })
    }

    pub fn message(text: impl Into<String>) -> Self {
        Operation::Message { text: text.into() }
    }

    pub fn remove(target: Address) -> Self {
        Operation::Remove { target }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Read(_) => OperationKind::Read,
            Operation::Write(_) => OperationKind::Write,
            Operation::Message { .. } => OperationKind::Message,
            Operation::Swap(_) => OperationKind::Swap,
            Operation::Remove { .. } => OperationKind::Remove,
        }
    }

    pub fn is_read_or_write(&self) -> bool {
        matches!(self, Operation::Read(_) | Operation::Write(_))
    }

    /// Length of a write's value payload
    ///
    /// `None` for non-write operations and for writes whose payload is unknown.
    pub fn payload_len(&self) -> Option<usize> {
        match self {
            Operation::Write(write) => write.value.as_ref().map(Vec::len),
            _ => None,
        }
    }

    /// How many elementary operations this operation stands for
    pub fn elementary_count(&self) -> usize {
        self.kind().atomic_operation_count().unwrap_or(1)
    }

    /// Decide how the engine must treat this operation
    ///
    /// `position` is the operation's index in the input log, used for error reporting.
    ///
    /// # Errors
    /// Returns [`ConsolidationError::MalformedOperation`] for a write whose payload
    /// length cannot be determined.
    pub fn classify(self, position: usize) -> Result<Classified> {
        match self {
            Operation::Message { .. } => Ok(Classified::Message(self)),
            Operation::Read(read) => Ok(Classified::Scalar(ReadWrite::Read(read))),
            Operation::Write(write) => {
                let payload_len = write.value.as_ref().map(Vec::len);
                match payload_len {
                    None => Err(ConsolidationError::MalformedOperation {
                        position,
                        reason: format!("payload length of write to {} is unknown", write.target),
                    }),
                    Some(len) if len > 1 => Ok(Classified::Standalone(Operation::Write(write))),
                    Some(_) => Ok(Classified::Scalar(ReadWrite::Write(write))),
                }
            }
            other => Ok(Classified::Standalone(other)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read(read) => write!(f, "read({})", read.source),
            Operation::Write(write) => match &write.source {
                Some(source) => write!(f, "write({} -> {})", source, write.target),
                None => write!(f, "write({})", write.target),
            },
            Operation::Message { text } => write!(f, "message({:?})", text),
            Operation::Swap(swap) => write!(f, "swap({}, {})", swap.first, swap.second),
            Operation::Remove { target } => write!(f, "remove({})", target),
        }
    }
}

/// Outcome of classifying one operation pulled from the pending queue
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Passes straight to the output without touching the window
    Message(Operation),
    /// Cannot take part in any pattern; flushes the window
    Standalone(Operation),
    /// Scalar read or write that grows the window by one
    Scalar(ReadWrite),
}

/// A scalar read or write: the only element a consolidation window holds
#[derive(Debug, Clone, PartialEq)]
pub enum ReadWrite {
    Read(ReadOp),
    Write(WriteOp),
}

impl ReadWrite {
    /// Source cell for reads, target cell for writes
    pub fn address(&self) -> &Address {
        match self {
            ReadWrite::Read(read) => &read.source,
            ReadWrite::Write(write) => &write.target,
        }
    }

    /// First payload value, if known
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            ReadWrite::Read(read) => read.value.as_ref(),
            ReadWrite::Write(write) => write.value.as_ref(),
        };
        value.and_then(|v| v.first().copied())
    }

    pub fn as_read(&self) -> Option<&ReadOp> {
        match self {
            ReadWrite::Read(read) => Some(read),
            ReadWrite::Write(_) => None,
        }
    }

    pub fn as_write(&self) -> Option<&WriteOp> {
        match self {
            ReadWrite::Write(write) => Some(write),
            ReadWrite::Read(_) => None,
        }
    }
}

impl From<ReadWrite> for Operation {
    fn from(rw: ReadWrite) -> Self {
        match rw {
            ReadWrite::Read(read) => Operation::Read(read),
            ReadWrite::Write(write) => Operation::Write(write),
        }
    }
}
