use crate::position::CodePositionInterval;
use color_print::cprintln;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown section: `{0}`")]
    UnknownSection(String),

    #[error("Section `{0}`: section alignment {1} is not a multiple of data alignment {2}")]
    SectionAlignment(String, usize, usize),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("Syntax Error: {0}")]
    Syntax(String),

    #[error("Exceeded maximum number of replace runs.")]
    ReplaceRounds(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Arch(#[from] rvarch::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "info"),
        }
    }
}

/// A diagnostic attached to a source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub severity: Severity,
    pub position: CodePositionInterval,
    pub message: String,
}

impl CompileError {
    /// Print the message, the location and the offending line, rustc style.
    /// `lines` is the source split into lines.
    pub fn print_diag(&self, lines: &[String]) {
        match self.severity {
            Severity::Error => cprintln!("<red,bold>error</>: {}", self.message),
            Severity::Warning => cprintln!("<yellow,bold>warning</>: {}", self.message),
            Severity::Information => cprintln!("<blue,bold>info</>: {}", self.message),
        }

        let line_num = self.position.start.line + 1;
        cprintln!("     <blue>--></> <underline>{}</>", self.position);
        cprintln!("      <blue>|</>");

        let line_content = lines
            .get(self.position.start.line)
            .map(|s| s.as_str())
            .unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", line_num, line_content);
        cprintln!("      <blue>|</>");
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.position)
    }
}

/// Everything one compilation attempt has to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileErrorList {
    errors: Vec<CompileError>,
}

impl CompileErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, position: CodePositionInterval, message: &str) {
        self.errors.push(CompileError {
            severity,
            position,
            message: message.to_string(),
        });
    }

    pub fn add_error(&mut self, position: CodePositionInterval, message: &str) {
        self.push(Severity::Error, position, message);
    }

    pub fn add_warning(&mut self, position: CodePositionInterval, message: &str) {
        self.push(Severity::Warning, position, message);
    }

    pub fn add_information(&mut self, position: CodePositionInterval, message: &str) {
        self.push(Severity::Information, position, message);
    }

    pub fn append(&mut self, other: CompileErrorList) {
        self.errors.extend(other.errors);
    }

    /// Any entry at all, warnings included.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.errors.iter().filter(|e| e.severity == severity).count()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompileError> {
        self.errors.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub fn print_diag(&self, lines: &[String]) {
        for error in &self.errors {
            error.print_diag(lines);
        }
    }
}

impl<'a> IntoIterator for &'a CompileErrorList {
    type Item = &'a CompileError;
    type IntoIter = std::slice::Iter<'a, CompileError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list() {
        let mut list = CompileErrorList::new();
        list.add_warning(CodePositionInterval::default(), "Reserving 0 bytes");
        assert!(!list.has_errors());
        list.add_error(CodePositionInterval::line(3, 0, 4), "Section name missing!");
        assert!(list.has_errors());
        list.add_information(CodePositionInterval::line(3, 0, 4), "Section switched to data");
        assert_eq!(list.count(Severity::Warning), 1);
        assert_eq!(list.count(Severity::Information), 1);
        assert_eq!(list.len(), 3);
        assert_eq!(
            list.messages(),
            vec!["Reserving 0 bytes", "Section name missing!", "Section switched to data"]
        );
        assert_eq!(list.errors()[2].to_string(), "info: Section switched to data (4:1)");
        assert_eq!(
            list.errors()[1].to_string(),
            "error: Section name missing! (4:1)"
        );
    }
}
