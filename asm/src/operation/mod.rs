//! Parsed statements and what each of them does in every compiler phase.

pub mod data;
pub mod directive;
pub mod factory;
pub mod instruction;
pub mod macros;

pub use data::{MemoryDefinitionDirective, MemoryReservationDirective};
pub use directive::{ConstantDirective, SectionDirective};
pub use factory::{create_directive, create_instruction};
pub use instruction::Instruction;
pub use macros::{MacroDirective, MacroEndDirective, MacroInstruction, MacroTable};

use crate::{
    allocator::{MemoryAllocator, SectionTracker},
    error::CompileErrorList,
    generator::SyntaxTreeGenerator,
    graph::SymbolGraph,
    output::FinalCommand,
    position::{CodePositionInterval, PositionedString},
    replacer::SymbolReplacer,
    symbol::{Symbol, SymbolBehavior},
};
use rvarch::MemoryAccess;

/// Where the representator puts an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    /// Wherever the current output is.
    Keep,
    /// Becomes the current output.
    This,
    /// Closes the current output and goes back to the main list.
    Main,
}

/// Data every operation carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationBase {
    pub position: CodePositionInterval,
    pub labels: Vec<PositionedString>,
    pub name: PositionedString,
}

impl OperationBase {
    pub fn new(
        position: CodePositionInterval,
        labels: Vec<PositionedString>,
        name: PositionedString,
    ) -> Self {
        Self {
            position,
            labels,
            name,
        }
    }

    /// One symbol per label, all holding `address`.
    pub(crate) fn insert_labels(&self, graph: &mut SymbolGraph, address: usize, behavior: SymbolBehavior) {
        for label in &self.labels {
            let value = PositionedString::new(&address.to_string(), label.position);
            graph.add_node(Symbol::new(label.clone(), value, behavior));
        }
    }
}

#[derive(Debug, Clone)]
pub enum Operation {
    Instruction(Instruction),
    MacroCall(MacroInstruction),
    Macro(MacroDirective),
    MacroEnd(MacroEndDirective),
    Constant(ConstantDirective),
    Section(SectionDirective),
    Definition(MemoryDefinitionDirective),
    Reservation(MemoryReservationDirective),
}

impl Operation {
    pub fn base(&self) -> &OperationBase {
        match self {
            Operation::Instruction(op) => &op.base,
            Operation::MacroCall(op) => &op.base,
            Operation::Macro(op) => &op.base,
            Operation::MacroEnd(op) => &op.base,
            Operation::Constant(op) => &op.base,
            Operation::Section(op) => &op.base,
            Operation::Definition(op) => &op.base,
            Operation::Reservation(op) => &op.base,
        }
    }

    pub fn position(&self) -> CodePositionInterval {
        self.base().position
    }

    pub fn name(&self) -> &str {
        self.base().name.as_str()
    }

    pub fn target_selector(&self) -> TargetSelector {
        match self {
            Operation::Macro(_) => TargetSelector::This,
            Operation::MacroEnd(_) => TargetSelector::Main,
            _ => TargetSelector::Keep,
        }
    }

    /// Registers macros and constants.
    pub fn precompile(
        &self,
        errors: &mut CompileErrorList,
        table: &mut MacroTable,
        graph: &mut SymbolGraph,
    ) {
        match self {
            Operation::Macro(op) => op.precompile(errors, table),
            Operation::Constant(op) => op.precompile(graph),
            _ => {}
        }
    }

    pub fn allocate_memory(
        &mut self,
        generator: &SyntaxTreeGenerator,
        errors: &mut CompileErrorList,
        allocator: &mut MemoryAllocator,
        tracker: &mut SectionTracker,
    ) {
        match self {
            Operation::Instruction(op) => op.allocate_memory(generator, errors, allocator, tracker),
            Operation::MacroCall(op) => op.allocate_memory(generator, errors, allocator, tracker),
            Operation::Section(op) => op.allocate_memory(errors, allocator, tracker),
            Operation::Definition(op) => op.allocate_memory(errors, allocator, tracker),
            Operation::Reservation(op) => op.allocate_memory(errors, allocator, tracker),
            Operation::Macro(_) | Operation::MacroEnd(_) | Operation::Constant(_) => {}
        }
    }

    /// Resolves addresses and turns labels into symbols.
    pub fn enhance_symbol_table(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        graph: &mut SymbolGraph,
    ) {
        match self {
            Operation::Instruction(op) => op.enhance_symbol_table(errors, allocator, graph),
            Operation::MacroCall(op) => op.enhance_symbol_table(errors, allocator, graph),
            Operation::Definition(op) => op.enhance_symbol_table(errors, allocator, graph),
            Operation::Reservation(op) => op.enhance_symbol_table(errors, allocator, graph),
            _ => {}
        }
    }

    pub fn execute(
        &self,
        generator: &SyntaxTreeGenerator,
        replacer: &SymbolReplacer,
        errors: &mut CompileErrorList,
        commands: &mut Vec<FinalCommand>,
        access: &mut dyn MemoryAccess,
    ) {
        match self {
            Operation::Instruction(op) => op.execute(generator, replacer, errors, commands),
            Operation::MacroCall(op) => op.execute(generator, replacer, errors, commands, access),
            Operation::Constant(op) => op.execute(replacer, errors),
            Operation::Definition(op) => op.execute(generator, replacer, errors, access),
            Operation::Reservation(op) => op.execute(generator, errors, access),
            Operation::Macro(_) | Operation::MacroEnd(_) | Operation::Section(_) => {}
        }
    }

    /// Source text of the instructions this operation stands for.
    pub fn to_source(&self) -> String {
        match self {
            Operation::Instruction(op) => op.to_source(),
            Operation::MacroCall(op) => op.to_source(),
            _ => String::new(),
        }
    }
}

/// Cells of `byte_size` bits needed for `bits`.
pub(crate) fn cells(bits: usize, byte_size: usize) -> usize {
    bits.div_ceil(byte_size.max(1))
}
