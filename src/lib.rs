// json2metrics - Command-line host for the JSON to metric converter
//
// Reads one payload (or one object per line), converts it with
// json2metrics-core and writes every record as a JSON line.

use anyhow::{bail, Context, Result};
use json2metrics_config::{InputMode, RuntimeConfig};
use json2metrics_core::{Converter, MetricRecord};
use std::io::{Read, Write};
use tracing::{debug, info};

mod init;

pub use init::init_tracing;

/// Counts reported after a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub input_bytes: usize,
    pub records: usize,
}

/// Convert everything readable from `input` and write the records to `output`.
///
/// Fails on the first conversion error; nothing is written in buffer mode when
/// the payload is rejected.
pub fn run<R, W>(config: &RuntimeConfig, input: R, mut output: W) -> Result<RunSummary>
where
    R: Read,
    W: Write,
{
    let converter =
        Converter::new(config.converter.clone()).context("Failed to build converter")?;
    let payload = read_limited(input, config.input.max_input_bytes)?;

    let records = match config.input.mode {
        InputMode::Buffer => converter
            .parse(&payload)
            .context("Failed to convert JSON payload")?,
        InputMode::Lines => convert_lines(&converter, &payload)?,
    };

    for record in &records {
        write_record(&mut output, record)?;
    }
    output.flush().context("Failed to flush output")?;

    let summary = RunSummary {
        input_bytes: payload.len(),
        records: records.len(),
    };
    info!(
        mode = %config.input.mode,
        input_bytes = summary.input_bytes,
        records = summary.records,
        "conversion complete"
    );
    Ok(summary)
}

fn read_limited<R: Read>(input: R, max_bytes: usize) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    // One extra byte tells an exact-size payload apart from an oversized one
    input
        .take((max_bytes as u64).saturating_add(1))
        .read_to_end(&mut payload)
        .context("Failed to read input")?;

    if payload.len() > max_bytes {
        bail!(
            "Input exceeds limit of {} bytes (raise input.max_input_bytes or JSON2METRICS_MAX_INPUT_BYTES)",
            max_bytes
        );
    }
    Ok(payload)
}

fn convert_lines(converter: &Converter, payload: &[u8]) -> Result<Vec<MetricRecord>> {
    let text = std::str::from_utf8(payload).context("Line input is not valid UTF-8")?;

    let mut records = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let record = converter
            .parse_line(line)
            .with_context(|| format!("Failed to convert line {}", line_num + 1))?;
        debug!(line = line_num + 1, name = record.name(), "converted line");
        records.push(record);
    }
    Ok(records)
}

fn write_record<W: Write>(output: &mut W, record: &MetricRecord) -> Result<()> {
    serde_json::to_writer(&mut *output, record).context("Failed to serialize record")?;
    output.write_all(b"\n").context("Failed to write output")?;
    Ok(())
}
