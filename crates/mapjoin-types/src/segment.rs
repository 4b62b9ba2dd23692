use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// One mapped position within a generated line.
///
/// A segment carries 1, 4 or 5 fields in fixed order: the generated column,
/// then optionally the source index, source line and source column, then
/// optionally the name index. Values are absolute (already accumulated), not
/// deltas. They are signed because a rebased segment may hold a negative
/// offset relative to a carried baseline.
///
/// Serialized as a flat integer array (`[col]`, `[col, src, line, col]` or
/// `[col, src, line, col, name]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub enum Segment {
    /// Generated position with no original counterpart.
    GeneratedOnly { generated_column: i32 },
    /// Generated position tied to an original source position.
    WithSource {
        generated_column: i32,
        source_index: i32,
        source_line: i32,
        source_column: i32,
    },
    /// Generated position tied to an original source position and a symbol name.
    WithSourceAndName {
        generated_column: i32,
        source_index: i32,
        source_line: i32,
        source_column: i32,
        name_index: i32,
    },
}

impl Segment {
    /// Build a segment from its raw field list.
    pub fn from_fields(fields: &[i32]) -> TypeResult<Self> {
        match *fields {
            [generated_column] => Ok(Self::GeneratedOnly { generated_column }),
            [generated_column, source_index, source_line, source_column] => Ok(Self::WithSource {
                generated_column,
                source_index,
                source_line,
                source_column,
            }),
            [generated_column, source_index, source_line, source_column, name_index] => {
                Ok(Self::WithSourceAndName {
                    generated_column,
                    source_index,
                    source_line,
                    source_column,
                    name_index,
                })
            }
            _ => Err(TypeError::InvalidFieldCount(fields.len())),
        }
    }

    /// The raw field list, in encoding order.
    pub fn fields(&self) -> Vec<i32> {
        match *self {
            Self::GeneratedOnly { generated_column } => vec![generated_column],
            Self::WithSource {
                generated_column,
                source_index,
                source_line,
                source_column,
            } => vec![generated_column, source_index, source_line, source_column],
            Self::WithSourceAndName {
                generated_column,
                source_index,
                source_line,
                source_column,
                name_index,
            } => vec![
                generated_column,
                source_index,
                source_line,
                source_column,
                name_index,
            ],
        }
    }

    /// Number of fields this segment carries (1, 4 or 5).
    pub fn field_count(&self) -> usize {
        match self {
            Self::GeneratedOnly { .. } => 1,
            Self::WithSource { .. } => 4,
            Self::WithSourceAndName { .. } => 5,
        }
    }

    pub fn generated_column(&self) -> i32 {
        match *self {
            Self::GeneratedOnly { generated_column }
            | Self::WithSource { generated_column, .. }
            | Self::WithSourceAndName { generated_column, .. } => generated_column,
        }
    }

    /// Source position as `(source_index, source_line, source_column)`.
    pub fn source(&self) -> Option<(i32, i32, i32)> {
        match *self {
            Self::GeneratedOnly { .. } => None,
            Self::WithSource {
                source_index,
                source_line,
                source_column,
                ..
            }
            | Self::WithSourceAndName {
                source_index,
                source_line,
                source_column,
                ..
            } => Some((source_index, source_line, source_column)),
        }
    }

    pub fn name_index(&self) -> Option<i32> {
        match *self {
            Self::WithSourceAndName { name_index, .. } => Some(name_index),
            _ => None,
        }
    }

    /// Returns `true` if the segment references an original source position.
    pub fn has_source(&self) -> bool {
        self.source().is_some()
    }

    /// Replace the source position, keeping the generated column and name.
    ///
    /// A no-op on [`Segment::GeneratedOnly`].
    pub fn set_source(&mut self, index: i32, line: i32, column: i32) {
        match self {
            Self::GeneratedOnly { .. } => {}
            Self::WithSource {
                source_index,
                source_line,
                source_column,
                ..
            }
            | Self::WithSourceAndName {
                source_index,
                source_line,
                source_column,
                ..
            } => {
                *source_index = index;
                *source_line = line;
                *source_column = column;
            }
        }
    }

    /// Drop the name index, turning a named segment into a plain source segment.
    pub fn without_name(self) -> Self {
        match self {
            Self::WithSourceAndName {
                generated_column,
                source_index,
                source_line,
                source_column,
                ..
            } => Self::WithSource {
                generated_column,
                source_index,
                source_line,
                source_column,
            },
            other => other,
        }
    }
}

impl TryFrom<Vec<i32>> for Segment {
    type Error = TypeError;

    fn try_from(fields: Vec<i32>) -> Result<Self, Self::Error> {
        Self::from_fields(&fields)
    }
}

impl From<Segment> for Vec<i32> {
    fn from(segment: Segment) -> Self {
        segment.fields()
    }
}
