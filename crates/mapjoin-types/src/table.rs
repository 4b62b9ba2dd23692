use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Segments of one generated line, in the order they were encountered.
///
/// Lines are never re-sorted by generated column.
pub type Line = Vec<Segment>;

/// Structured form of a `mappings` string.
///
/// The index of each [`Line`] is its generated line number. An empty line
/// still occupies its slot so that line numbers stay aligned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable(Vec<Line>);

impl MappingTable {
    /// Create an empty table with no lines.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap an existing list of lines.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self(lines)
    }

    pub fn lines(&self) -> &[Line] {
        &self.0
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.0
    }

    pub fn push_line(&mut self, line: Line) {
        self.0.push(line);
    }

    /// Number of generated lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of segments across all lines.
    pub fn segment_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// The last segment carrying a source position, in table order.
    pub fn last_source_segment(&self) -> Option<&Segment> {
        self.0
            .iter()
            .rev()
            .flat_map(|line| line.iter().rev())
            .find(|seg| seg.has_source())
    }

    /// Mutable access to the lines, indexed by generated line number.
    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.0
    }
}

impl From<Vec<Line>> for MappingTable {
    fn from(lines: Vec<Line>) -> Self {
        Self(lines)
    }
}
