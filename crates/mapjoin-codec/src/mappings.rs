//! Conversion between `mappings` strings and [`MappingTable`]s.
//!
//! A running accumulator `(genCol, srcIdx, srcLine, srcCol, nameIdx)` turns
//! per-field deltas into absolute values. `genCol` restarts at zero on every
//! generated line; the other four fields carry across line boundaries for
//! the whole table.

use mapjoin_types::{Line, MappingTable, Segment};
use tracing::trace;

use crate::error::{CodecError, CodecResult};
use crate::vlq::{decode_vlq, encode_vlq};

const SEGMENT_SEPARATOR: u8 = b',';
const LINE_SEPARATOR: u8 = b';';
const MAX_FIELDS: usize = 5;

/// Running accumulator shared by the decoder and encoder.
#[derive(Clone, Copy, Debug, Default)]
struct Accumulator {
    fields: [i64; MAX_FIELDS],
}

impl Accumulator {
    fn reset_generated_column(&mut self) {
        self.fields[0] = 0;
    }
}

/// Decode a `mappings` string into a table.
///
/// The result always has at least one line; the empty string decodes to a
/// single empty line. Segment order is preserved exactly as encountered.
pub fn decode(encoded: &str) -> CodecResult<MappingTable> {
    let bytes = encoded.as_bytes();
    let mut acc = Accumulator::default();
    let mut table = MappingTable::new();
    let mut line: Line = Vec::new();
    let mut fields: Vec<i32> = Vec::with_capacity(MAX_FIELDS);
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            SEGMENT_SEPARATOR => {
                flush_segment(&mut fields, &mut line, table.len())?;
                pos += 1;
            }
            LINE_SEPARATOR => {
                flush_segment(&mut fields, &mut line, table.len())?;
                table.push_line(std::mem::take(&mut line));
                acc.reset_generated_column();
                pos += 1;
            }
            _ => {
                let start = pos;
                let delta = decode_vlq(encoded, &mut pos)?;
                let slot = fields.len();
                if slot >= MAX_FIELDS {
                    return Err(CodecError::InvalidSegmentLength {
                        line: table.len(),
                        fields: slot + 1,
                    });
                }
                acc.fields[slot] += delta;
                let value = i32::try_from(acc.fields[slot])
                    .map_err(|_| CodecError::ValueOutOfRange { offset: start })?;
                fields.push(value);
            }
        }
    }

    flush_segment(&mut fields, &mut line, table.len())?;
    table.push_line(line);
    trace!(lines = table.len(), segments = table.segment_count(), "decoded mappings");
    Ok(table)
}

fn flush_segment(fields: &mut Vec<i32>, line: &mut Line, line_no: usize) -> CodecResult<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let segment = Segment::from_fields(fields).map_err(|_| CodecError::InvalidSegmentLength {
        line: line_no,
        fields: fields.len(),
    })?;
    line.push(segment);
    fields.clear();
    Ok(())
}

/// Encode a table into a `mappings` string.
///
/// Lines are joined by `;` (an empty line contributes nothing but its
/// separator) and segments within a line by `,`.
pub fn encode(table: &MappingTable) -> String {
    let mut acc = Accumulator::default();
    let mut out = String::with_capacity(table.segment_count() * 8);

    for (i, line) in table.lines().iter().enumerate() {
        if i > 0 {
            out.push(LINE_SEPARATOR as char);
        }
        acc.reset_generated_column();

        for (j, segment) in line.iter().enumerate() {
            if j > 0 {
                out.push(SEGMENT_SEPARATOR as char);
            }
            for (slot, value) in segment.fields().into_iter().enumerate() {
                let value = i64::from(value);
                encode_vlq(value - acc.fields[slot], &mut out);
                acc.fields[slot] = value;
            }
        }
    }

    out
}
