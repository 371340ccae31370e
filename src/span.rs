use serde::{Deserialize, Serialize};

/// Source region: byte offsets plus the 1-based line/column of `start`.
///
/// Spans exist for diagnostics only. Two AST nodes that differ only in their
/// spans compare equal (see the `PartialEq` impl on [`Spanned`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Offset-only span; line/column are filled in by [`LineIndex::locate`].
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, line: 0, column: 0 }
    }

    pub fn with_position(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    /// Span covering `self` through `other`, positioned at `self`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A value annotated with its source span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self { node, span: Span::dummy() }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned { node: f(self.node), span: self.span }
    }
}

// Structural equality: spans never participate.
impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

/// Maps byte offsets to 1-based line/column positions for a single source.
pub struct LineIndex<'a> {
    source: &'a str,
    /// Byte offset of the start of each line. line_starts[0] == 0 always.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { source, line_starts }
    }

    /// 1-based (line, column); the column counts chars, not bytes.
    pub fn position(&self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count());
        (line as u32 + 1, column as u32 + 1)
    }

    /// Fill in line/column for an offset-only span.
    pub fn locate(&self, span: Span) -> Span {
        let (line, column) = self.position(span.start);
        Span { line, column, ..span }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
