use super::OperationBase;
use crate::{
    allocator::{MemoryAllocator, SectionTracker},
    error::CompileErrorList,
    expr,
    graph::SymbolGraph,
    position::PositionedString,
    replacer::SymbolReplacer,
    symbol::{Symbol, SymbolBehavior},
};

/// `equ name, value`
#[derive(Debug, Clone)]
pub struct ConstantDirective {
    pub base: OperationBase,
    constant: Option<(PositionedString, PositionedString)>,
}

impl ConstantDirective {
    pub fn new(base: OperationBase, args: &[PositionedString], errors: &mut CompileErrorList) -> Self {
        let constant = match args {
            [] => {
                errors.add_error(base.position, "Missing constant name.");
                None
            }
            [name] => {
                errors.add_error(
                    name.position.unite(&base.name.position),
                    "Missing constant value.",
                );
                None
            }
            [name, value] => Some((name.clone(), value.clone())),
            _ => {
                errors.add_error(
                    base.position,
                    "Malformed constant directive, too many operands provided.",
                );
                None
            }
        };
        Self { base, constant }
    }

    pub fn precompile(&self, graph: &mut SymbolGraph) {
        if let Some((name, value)) = &self.constant {
            let value = value.with_string(format!("({})", value.as_str()));
            graph.add_node(Symbol::new(name.clone(), value, SymbolBehavior::Static));
        }
    }

    /// Evaluates the value once so a malformed constant is reported where
    /// it is defined.
    pub fn execute(&self, replacer: &SymbolReplacer, errors: &mut CompileErrorList) {
        let Some((_, value)) = &self.constant else {
            return;
        };
        let result = replacer
            .replace(value.as_str())
            .and_then(|text| expr::compile(&text));
        if let Err(err) = result {
            errors.add_error(value.position, &err.to_string());
        }
    }
}

/// `section name`
#[derive(Debug, Clone)]
pub struct SectionDirective {
    pub base: OperationBase,
    args: Vec<PositionedString>,
}

impl SectionDirective {
    pub fn new(base: OperationBase, args: &[PositionedString]) -> Self {
        Self {
            base,
            args: args.to_vec(),
        }
    }

    pub fn allocate_memory(
        &self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        tracker: &mut SectionTracker,
    ) {
        let Some(name) = self.args.first() else {
            errors.add_error(self.base.position, "Section name missing!");
            return;
        };
        let name = name.as_str().trim();
        if !allocator.has_section(name) {
            errors.add_error(self.base.position, "Specified section non-existent!");
            return;
        }
        tracker.section = name.to_string();
    }
}
