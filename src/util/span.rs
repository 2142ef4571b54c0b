//! Source location tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position (line, column, and byte offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    /// Line number (1-indexed, 0 when the producer gave no line info)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset from start of file
    pub offset: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset: 0,
        }
    }

    /// Create a new position with offset
    #[inline]
    pub fn with_offset(
        line: usize,
        column: usize,
        offset: usize,
    ) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Create a position that only knows its byte offset
    #[inline]
    pub fn at_offset(offset: usize) -> Self {
        Self {
            line: 0,
            column: 0,
            offset,
        }
    }

    /// Create a dummy position
    #[inline]
    pub fn dummy() -> Self {
        Self {
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    /// Whether line/column information is present
    #[inline]
    pub fn has_line_info(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.has_line_info() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}", self.offset)
        }
    }
}

/// Source span (start position to end position)
///
/// 反序列化时兼容 ESTree 的三种位置格式：`start`/`end` 偏移、`range` 数组和 `loc` 行列信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawSpan")]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self {
        Self { start, end }
    }

    /// Create a span from a byte range
    #[inline]
    pub fn from_offsets(
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            start: Position::at_offset(start),
            end: Position::at_offset(end),
        }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self {
            start: Position::dummy(),
            end: Position::dummy(),
        }
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0 && self.start.offset == 0 && self.end.offset == 0
    }

    /// Get the source text length
    #[inline]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Check if span is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Whether `other` lies completely inside this span
    #[inline]
    pub fn contains(
        &self,
        other: &Span,
    ) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

/// ESTree 中的行列位置（列从 0 开始）
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawLineColumn {
    line: usize,
    column: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawLocation {
    start: RawLineColumn,
    end: RawLineColumn,
}

/// 原始位置信息，字段均可缺省
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct RawSpan {
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    range: Option<(usize, usize)>,
    #[serde(default)]
    loc: Option<RawLocation>,
}

impl From<RawSpan> for Span {
    fn from(raw: RawSpan) -> Self {
        let (start, end) = match (raw.start, raw.end, raw.range) {
            (Some(start), Some(end), _) => (start, end),
            (_, _, Some(range)) => range,
            _ => (0, 0),
        };
        match raw.loc {
            Some(loc) => Span {
                start: Position::with_offset(loc.start.line, loc.start.column + 1, start),
                end: Position::with_offset(loc.end.line, loc.end.column + 1, end),
            },
            None => Span::from_offsets(start, end),
        }
    }
}

#[cfg(test)]
mod tests;
