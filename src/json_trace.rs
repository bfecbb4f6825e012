//! JSON operation logs
//!
//! An operation log is a JSON array of operations (see [`crate::operation`]).
//! Both the input read by the CLI and the consolidated output use this format.

use crate::operation::Operation;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Parse an operation log from a JSON string
pub fn parse_trace(content: &str) -> Result<Vec<Operation>> {
    serde_json::from_str(content).context("Failed to parse operation log")
}

/// Read an operation log from a JSON file
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<Operation>> {
    let content = fs::read_to_string(path.as_ref()).with_context(|| {
        format!("Failed to read operation log: {}", path.as_ref().display())
    })?;
    parse_trace(&content)
}

/// Write an operation log as JSON, followed by a newline
pub fn write_trace<W: Write>(mut writer: W, operations: &[Operation], pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, operations)?;
    } else {
        serde_json::to_writer(&mut writer, operations)?;
    }
    writeln!(writer)?;
    writer.flush().context("Failed to flush operation log")?;
    Ok(())
}
