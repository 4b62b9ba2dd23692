//! Cross-file rebasing of mapping tables.
//!
//! Every input map is encoded on its own, starting from a zeroed
//! accumulator. When the per-file `mappings` fragments are joined with `;`,
//! a decoder does not reset its source accumulators between fragments, so
//! fragment *i+1* is read on top of whatever fragment *i* left behind. To
//! splice correctly, each file's source fields are rewritten as offsets from
//! the previous file's final position before the file is re-encoded.

use mapjoin_codec::{CodecError, CodecResult};
use mapjoin_types::MappingTable;

/// Baseline threaded from one merged file to the next.
///
/// After a file is rebased, the carry holds the position a decoder of the
/// consolidated `mappings` will have accumulated at the end of that file's
/// fragment: the consolidated index of its source, plus the file's own
/// (pre-rebase) last source line and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeCarry {
    pub source_index: i32,
    pub source_line: i32,
    pub source_column: i32,
}

impl MergeCarry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebase `table` in place against this carry, then advance the carry.
    ///
    /// `target_index` is the position of this file's source in the
    /// consolidated `sources` list. Every segment with a source position gets
    /// `sourceIndex = target_index - carry.source_index` (1 for every file
    /// after the first, 0 for the first) and has the carried line and column
    /// subtracted. Generated-only segments are untouched.
    ///
    /// If the table has no source segment the carry is left as it is: a
    /// decoder's source accumulators do not move across such a fragment.
    ///
    /// Fails with [`CodecError::RebaseOutOfRange`] if an offset source line
    /// or column does not fit in `i32`; the carry is not advanced then.
    pub fn rebase(&mut self, table: &mut MappingTable, target_index: i32) -> CodecResult<()> {
        let base = *self;
        let last = table.last_source_segment().and_then(|seg| seg.source());
        let index_delta = target_index - base.source_index;

        for (line_no, line) in table.lines_mut().iter_mut().enumerate() {
            for segment in line.iter_mut() {
                let Some((_, src_line, src_column)) = segment.source() else {
                    continue;
                };
                let (Some(src_line), Some(src_column)) = (
                    src_line.checked_sub(base.source_line),
                    src_column.checked_sub(base.source_column),
                ) else {
                    return Err(CodecError::RebaseOutOfRange { line: line_no });
                };
                segment.set_source(index_delta, src_line, src_column);
                // Names are not carried into the merged map; its `names` is
                // empty, so 5-field segments become 4-field ones here.
                *segment = segment.without_name();
            }
        }

        if let Some((_, line, column)) = last {
            *self = Self {
                source_index: target_index,
                source_line: line,
                source_column: column,
            };
        }
        Ok(())
    }
}
