use crate::{
    allocator::SectionTracker,
    config::TransformationParameters,
    error::CompileErrorList,
    graph::{SymbolGraph, SymbolGraphEvaluation},
    operation::{macros, MacroDirective, MacroTable, Operation, TargetSelector},
    output::{FinalRepresentation, MacroInformation},
    position::{CodePosition, CodePositionInterval},
    replacer::SymbolReplacer,
};
use rvarch::MemoryAccess;
use tracing::debug;

const ALIGNMENT_NOTE: &str = "(please note: because of aligning memory, the first value might be \
                              actually bigger than the memory allocated)";

/// Collects the parsed operations of one program and compiles them.
#[derive(Debug, Clone, Default)]
pub struct IntermediateRepresentator {
    commands: Vec<Operation>,
    /// Macro whose body is being collected.
    current_output: Option<MacroDirective>,
    errors: CompileErrorList,
}

impl IntermediateRepresentator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Operation] {
        &self.commands
    }

    pub fn insert_command(&mut self, op: Operation) {
        match op.target_selector() {
            TargetSelector::This => {
                if self.current_output.is_some() {
                    self.errors
                        .add_error(op.position(), "Error, nested macros are not supported.");
                    return;
                }
                if let Operation::Macro(directive) = op {
                    self.current_output = Some(directive);
                }
            }
            TargetSelector::Main => match self.current_output.take() {
                Some(directive) => self.commands.push(Operation::Macro(directive)),
                None => self
                    .errors
                    .add_error(op.position(), "The start directive of the macro is missing."),
            },
            TargetSelector::Keep => match &mut self.current_output {
                Some(directive) => directive.insert(op),
                None => self.commands.push(op),
            },
        }
    }

    /// Runs every phase over the whole program. Symbol and capacity
    /// problems stop before any command is built.
    pub fn transform(
        &self,
        parameters: &TransformationParameters,
        parsing_errors: CompileErrorList,
        access: &mut dyn MemoryAccess,
    ) -> FinalRepresentation {
        let mut errors = parsing_errors;
        errors.append(self.errors.clone());

        if let Some(open) = &self.current_output {
            errors.add_error(
                open.base.position,
                "Macro not closed. Missing a macro end directive?",
            );
            return FinalRepresentation::failed(errors);
        }

        let generator = parameters.generator();
        let mut allocator = match parameters.allocator() {
            Ok(allocator) => allocator,
            Err(err) => {
                errors.add_error(CodePositionInterval::default(), &err.to_string());
                return FinalRepresentation::failed(errors);
            }
        };
        let mut graph = SymbolGraph::new();
        let mut table = MacroTable::new();

        debug!(operations = self.commands.len(), "precompile");
        for op in &self.commands {
            op.precompile(&mut errors, &mut table, &mut graph);
        }

        debug!(macros = table.len(), "expand macros");
        let mut stack = vec![];
        let mut operations: Vec<Operation> = self
            .commands
            .iter()
            .cloned()
            .filter_map(|op| macros::expand(op, &table, &mut stack, &mut errors))
            .collect();
        let macro_information = operations
            .iter()
            .filter_map(|op| match op {
                Operation::MacroCall(call) => Some(MacroInformation {
                    position: call.base.position,
                    code: call.to_source(),
                }),
                _ => None,
            })
            .collect();

        debug!("allocate memory");
        let memory_size = access.get_memory_size();
        let mut tracker = SectionTracker::default();
        let mut first_exceeding = None;
        for op in operations.iter_mut() {
            op.allocate_memory(&generator, &mut errors, &mut allocator, &mut tracker);
            if first_exceeding.is_none() && allocator.estimate_size() > memory_size {
                first_exceeding = Some(op.position());
            }
        }
        let allocated = allocator.calculate_positions();

        debug!(allocated, "enhance symbol table");
        for op in operations.iter_mut() {
            op.enhance_symbol_table(&mut errors, &allocator, &mut graph);
        }
        let evaluation = graph.evaluate();
        if !evaluation.valid() {
            report_symbol_errors(&evaluation, &mut errors);
            return FinalRepresentation::failed(errors);
        }

        if allocated > memory_size {
            match first_exceeding {
                Some(position) => errors.add_error(
                    position,
                    &format!(
                        "From this operation on, including it, there is too much memory \
                         allocated in total: {allocated} requested, maximum is {memory_size} \
                         {ALIGNMENT_NOTE}"
                    ),
                ),
                None => errors.add_error(
                    CodePositionInterval::new(CodePosition::new(0, 0), CodePosition::new(0, 2)),
                    &format!(
                        "Too much memory allocated: {allocated} requested, maximum is \
                         {memory_size} {ALIGNMENT_NOTE}"
                    ),
                ),
            }
            return FinalRepresentation::failed(errors);
        }

        debug!("execute");
        let replacer = SymbolReplacer::from_evaluation(&evaluation, parameters.max_replace_rounds);
        let mut commands = vec![];
        for op in &operations {
            op.execute(&generator, &replacer, &mut errors, &mut commands, access);
        }

        FinalRepresentation {
            commands,
            errors,
            macro_information,
        }
    }
}

fn report_symbol_errors(evaluation: &SymbolGraphEvaluation, errors: &mut CompileErrorList) {
    let symbols = evaluation.symbols();

    for &i in evaluation.invalid_names() {
        let name = symbols[i].name();
        errors.add_error(
            name.position,
            &format!("The name '{name}' is not a valid name for a constant, label etc."),
        );
    }

    for group in evaluation.duplicates() {
        for &i in group {
            let name = symbols[i].name();
            errors.add_error(
                name.position,
                &format!("The name '{name}' exists more than once in the program"),
            );
        }
    }

    let cycle = evaluation.sample_cycle();
    if let Some((_, members)) = cycle.split_last() {
        let chain: String = cycle
            .iter()
            .map(|&i| format!("'{}' -> ", symbols[i].name()))
            .collect();
        for &i in members {
            let name = symbols[i].name();
            errors.add_error(
                name.position,
                &format!("Symbol '{name}' is part of an infinite reference cycle, going like {chain}..."),
            );
        }
    }
}
