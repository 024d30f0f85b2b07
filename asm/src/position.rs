use std::fmt;

/// Zero-based line and column in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodePosition {
    pub line: usize,
    pub column: usize,
}

impl CodePosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Inclusive source range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CodePositionInterval {
    pub start: CodePosition,
    pub end: CodePosition,
}

impl CodePositionInterval {
    pub fn new(start: CodePosition, end: CodePosition) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Range on a single line.
    pub fn line(line: usize, start: usize, end: usize) -> Self {
        Self::new(CodePosition::new(line, start), CodePosition::new(line, end))
    }

    /// Smallest interval covering both.
    pub fn unite(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for CodePositionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Source text together with where it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PositionedString {
    pub string: String,
    pub position: CodePositionInterval,
}

impl PositionedString {
    pub fn new(string: &str, position: CodePositionInterval) -> Self {
        Self {
            string: string.to_string(),
            position,
        }
    }

    /// String without a meaningful position, for generated text.
    pub fn unpositioned(string: &str) -> Self {
        Self::new(string, CodePositionInterval::default())
    }

    pub fn as_str(&self) -> &str {
        &self.string
    }

    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }

    pub fn with_string(&self, string: String) -> Self {
        Self {
            string,
            position: self.position,
        }
    }
}

impl fmt::Display for PositionedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.string)
    }
}
