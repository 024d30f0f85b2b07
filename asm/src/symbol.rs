use crate::{position::PositionedString, scan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolBehavior {
    /// Fixed text, takes part in cycle detection.
    Static,
    /// Resolved per use site, never a graph edge.
    Dynamic,
}

/// A named value: a label or a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: PositionedString,
    value: PositionedString,
    behavior: SymbolBehavior,
}

impl Symbol {
    pub fn new(name: PositionedString, value: PositionedString, behavior: SymbolBehavior) -> Self {
        let name = name.with_string(name.string.trim().to_string());
        Self {
            name,
            value,
            behavior,
        }
    }

    pub fn name(&self) -> &PositionedString {
        &self.name
    }

    pub fn value(&self) -> &PositionedString {
        &self.value
    }

    pub fn behavior(&self) -> SymbolBehavior {
        self.behavior
    }

    pub fn name_valid(&self) -> bool {
        scan::is_identifier(self.name.as_str())
    }

    /// Whether `text` mentions this symbol as a whole word. Symbols with an
    /// invalid name never match.
    pub fn occurs_in(&self, text: &str) -> bool {
        self.name_valid() && scan::contains_word(text, self.name.as_str())
    }

    pub fn with_value(&self, value: String) -> Self {
        Self {
            name: self.name.clone(),
            value: self.value.with_string(value),
            behavior: self.behavior,
        }
    }
}
