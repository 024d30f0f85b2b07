use crate::{
    error::Error,
    graph::SymbolGraphEvaluation,
    scan,
    symbol::{Symbol, SymbolBehavior},
};
use std::{collections::HashMap, rc::Rc};
use tracing::warn;

pub const DEFAULT_MAX_ROUNDS: usize = 64;

/// Value text for a dynamic symbol at one use site.
pub type DynamicResolver<'a> = Box<dyn Fn(&Symbol) -> String + 'a>;

/// Textual substitution of symbol names, repeated to a fixed point. The
/// symbol table is shared by every replacer derived through `with_dynamic`.
pub struct SymbolReplacer<'a> {
    symbols: Rc<HashMap<String, Symbol>>,
    resolver: DynamicResolver<'a>,
    max_rounds: usize,
}

impl<'a> SymbolReplacer<'a> {
    /// Dynamic symbols resolve to their raw value.
    pub fn new(symbols: &[Symbol], max_rounds: usize) -> Self {
        Self::with_resolver(symbols, Box::new(|s: &Symbol| s.value().string.clone()), max_rounds)
    }

    pub fn with_resolver(symbols: &[Symbol], resolver: DynamicResolver<'a>, max_rounds: usize) -> Self {
        let symbols: HashMap<_, _> = symbols
            .iter()
            .map(|s| (s.name().string.clone(), s.clone()))
            .collect();
        Self {
            symbols: Rc::new(symbols),
            resolver,
            max_rounds,
        }
    }

    pub fn from_evaluation(evaluation: &SymbolGraphEvaluation, max_rounds: usize) -> Self {
        Self::new(evaluation.symbols(), max_rounds)
    }

    /// Same symbols, different dynamic resolver.
    pub fn with_dynamic<'b>(&self, resolver: DynamicResolver<'b>) -> SymbolReplacer<'b> {
        SymbolReplacer {
            symbols: Rc::clone(&self.symbols),
            resolver,
            max_rounds: self.max_rounds,
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    fn replace_once(&self, text: &str) -> String {
        scan::replace_words(text, |name| {
            self.symbols.get(name).map(|symbol| match symbol.behavior() {
                SymbolBehavior::Dynamic => (self.resolver)(symbol),
                SymbolBehavior::Static => symbol.value().string.clone(),
            })
        })
    }

    /// Substitute until nothing changes. Fails with the untouched input if
    /// that takes more than the round limit.
    pub fn replace(&self, text: &str) -> Result<String, Error> {
        let mut current = text.to_string();
        for _ in 0..self.max_rounds {
            let next = self.replace_once(&current);
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        warn!(text, rounds = self.max_rounds, "symbol replacement did not converge");
        Err(Error::ReplaceRounds(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::SymbolGraph, position::PositionedString};

    fn sym(name: &str, value: &str, behavior: SymbolBehavior) -> Symbol {
        Symbol::new(
            PositionedString::unpositioned(name),
            PositionedString::unpositioned(value),
            behavior,
        )
    }

    #[test]
    fn test_fixed_point() {
        let symbols = [
            sym("A", "(B+1)", SymbolBehavior::Static),
            sym("B", "(C*2)", SymbolBehavior::Static),
            sym("C", "3", SymbolBehavior::Static),
        ];
        let r = SymbolReplacer::new(&symbols, 8);
        assert_eq!(r.replace("A-B").unwrap(), "((3*2)+1)-(3*2)");
        assert_eq!(r.replace("x1, 0x10").unwrap(), "x1, 0x10");
    }

    #[test]
    fn test_idempotent() {
        let mut g = SymbolGraph::new();
        g.add_node(sym("N", "(M+1)", SymbolBehavior::Static));
        g.add_node(sym("M", "5", SymbolBehavior::Static));
        let r = SymbolReplacer::from_evaluation(&g.evaluate(), DEFAULT_MAX_ROUNDS);
        let once = r.replace("N*2").unwrap();
        assert_eq!(once, "(5+1)*2");
        assert_eq!(r.replace(&once).unwrap(), once);
    }

    #[test]
    fn test_dynamic() {
        let symbols = [sym("L", "16", SymbolBehavior::Dynamic)];
        let r = SymbolReplacer::with_resolver(&symbols, Box::new(|s: &Symbol| format!("<{}>", s.value())), 4);
        assert_eq!(r.replace("L").unwrap(), "<16>");
        assert_eq!(SymbolReplacer::new(&symbols, 4).replace("L").unwrap(), "16");

        let base = SymbolReplacer::new(&symbols, 4);
        let derived = base.with_dynamic(Box::new(|s: &Symbol| format!("[{}]", s.value())));
        assert!(Rc::ptr_eq(&base.symbols, &derived.symbols));
        assert_eq!(derived.replace("L").unwrap(), "[16]");
        assert_eq!(base.replace("L").unwrap(), "16");
    }

    #[test]
    fn test_exhausted() {
        let symbols = [sym("A", "A", SymbolBehavior::Dynamic)];
        let r = SymbolReplacer::with_resolver(&symbols, Box::new(|_: &Symbol| "A+A".to_string()), 3);
        assert!(matches!(r.replace("A"), Err(Error::ReplaceRounds(text)) if text == "A"));
    }
}
