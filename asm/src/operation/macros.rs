use super::{instruction::Instruction, Operation, OperationBase};
use crate::{
    allocator::{MemoryAllocator, SectionTracker},
    error::CompileErrorList,
    generator::SyntaxTreeGenerator,
    graph::SymbolGraph,
    output::FinalCommand,
    position::PositionedString,
    replacer::SymbolReplacer,
    symbol::SymbolBehavior,
};
use indexmap::IndexMap;
use rvarch::MemoryAccess;

/// A registered macro: parameters with optional defaults and a body of
/// instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    name: String,
    parameters: Vec<(String, Option<String>)>,
    body: Vec<Instruction>,
}

impl Macro {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments a call has to supply.
    pub fn min_arguments(&self) -> usize {
        self.parameters.iter().filter(|(_, d)| d.is_none()).count()
    }

    pub fn max_arguments(&self) -> usize {
        self.parameters.len()
    }

    /// Body with the arguments of one call substituted.
    pub fn instantiate(&self, arguments: &[PositionedString]) -> Vec<Instruction> {
        self.body
            .iter()
            .map(|inst| inst.with_arguments(&self.parameters, arguments))
            .collect()
    }
}

/// Macros by name and argument count.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: IndexMap<(String, usize), Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one entry per accepted argument count. Nothing is inserted
    /// if any of them is taken.
    pub fn insert(&mut self, m: Macro) -> bool {
        let counts = m.min_arguments()..=m.max_arguments();
        if counts
            .clone()
            .any(|n| self.macros.contains_key(&(m.name.clone(), n)))
        {
            return false;
        }
        for n in counts {
            self.macros.insert((m.name.clone(), n), m.clone());
        }
        true
    }

    pub fn get(&self, name: &str, arguments: usize) -> Option<&Macro> {
        self.macros.get(&(name.to_string(), arguments))
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

// ----------------------------------------------------------------------------

/// `macro name, param, param=default`; the body follows until `endm`.
#[derive(Debug, Clone)]
pub struct MacroDirective {
    pub base: OperationBase,
    macro_name: Option<PositionedString>,
    parameters: Vec<(String, Option<String>)>,
    body: Vec<Operation>,
}

impl MacroDirective {
    pub fn new(base: OperationBase, args: &[PositionedString], errors: &mut CompileErrorList) -> Self {
        let macro_name = args.first().filter(|name| !name.as_str().trim().is_empty()).map(
            |name| name.with_string(name.as_str().trim().to_string()),
        );

        let mut parameters = vec![];
        let mut seen_default = false;
        for arg in args.iter().skip(1) {
            let (name, default) = match arg.as_str().split_once('=') {
                Some((name, default)) => (name.trim(), Some(default.trim())),
                None => (arg.as_str().trim(), None),
            };
            if name.is_empty() || default.is_some_and(|d| d.is_empty()) {
                errors.add_error(arg.position, "Malformed macro argument list.");
                continue;
            }
            if default.is_some() {
                seen_default = true;
            } else if seen_default {
                errors.add_error(
                    arg.position,
                    "Default macro argument values have to be placed last.",
                );
            }
            parameters.push((name.to_string(), default.map(|d| d.to_string())));
        }

        Self {
            base,
            macro_name,
            parameters,
            body: vec![],
        }
    }

    pub fn insert(&mut self, op: Operation) {
        self.body.push(op);
    }

    pub fn body(&self) -> &[Operation] {
        &self.body
    }

    pub fn precompile(&self, errors: &mut CompileErrorList, table: &mut MacroTable) {
        let Some(name) = &self.macro_name else {
            errors.add_error(self.base.position, "Missing macro name.");
            return;
        };

        let mut body = vec![];
        for op in &self.body {
            match op {
                Operation::Instruction(inst) => body.push(inst.clone()),
                other => errors.add_error(
                    other.position(),
                    &format!("Macro contains unsupported instruction '{}'.", other.name()),
                ),
            }
        }

        let m = Macro {
            name: name.string.clone(),
            parameters: self.parameters.clone(),
            body,
        };
        if !table.insert(m) {
            errors.add_error(name.position, &format!("Macro '{}' already exists.", name));
        }
    }
}

/// `endm`.
#[derive(Debug, Clone)]
pub struct MacroEndDirective {
    pub base: OperationBase,
}

// ----------------------------------------------------------------------------

/// A macro call replaced by its expanded body.
#[derive(Debug, Clone)]
pub struct MacroInstruction {
    pub base: OperationBase,
    operations: Vec<Operation>,
}

impl MacroInstruction {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Address of the first placed instruction, nested calls included.
    pub fn first_address(&self) -> Option<usize> {
        self.operations.iter().find_map(|op| match op {
            Operation::Instruction(inst) => inst.address(),
            Operation::MacroCall(call) => call.first_address(),
            _ => None,
        })
    }

    pub fn allocate_memory(
        &mut self,
        generator: &SyntaxTreeGenerator,
        errors: &mut CompileErrorList,
        allocator: &mut MemoryAllocator,
        tracker: &mut SectionTracker,
    ) {
        for op in self.operations.iter_mut() {
            op.allocate_memory(generator, errors, allocator, tracker);
        }
    }

    pub fn enhance_symbol_table(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        graph: &mut SymbolGraph,
    ) {
        for op in self.operations.iter_mut() {
            op.enhance_symbol_table(errors, allocator, graph);
        }
        if self.base.labels.is_empty() {
            return;
        }
        match self.first_address() {
            Some(address) => self.base.insert_labels(graph, address, SymbolBehavior::Dynamic),
            None => {
                let position = self
                    .base
                    .labels
                    .iter()
                    .map(|l| l.position)
                    .reduce(|a, b| a.unite(&b))
                    .unwrap_or(self.base.position);
                errors.add_error(position, "Labels cannot point to macros without instructions!");
            }
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
        for op in &self.operations {
            op.execute(generator, replacer, errors, commands, access);
        }
    }

    pub fn to_source(&self) -> String {
        self.operations.iter().map(|op| op.to_source()).collect()
    }
}

/// Replace macro calls in `op` by their expansion, recursively. `stack`
/// holds the calls being expanded; re-entering one of them is reported and
/// the call dropped.
pub fn expand(
    op: Operation,
    table: &MacroTable,
    stack: &mut Vec<(String, usize)>,
    errors: &mut CompileErrorList,
) -> Option<Operation> {
    let Operation::Instruction(call) = op else {
        return Some(op);
    };
    let key = (call.base.name.string.clone(), call.operands().len());
    let Some(m) = table.get(&key.0, key.1) else {
        return Some(Operation::Instruction(call));
    };
    if stack.contains(&key) {
        errors.add_error(call.base.position, "Cyclic macro call detected.");
        return None;
    }

    stack.push(key);
    let operations = m
        .instantiate(call.operands())
        .into_iter()
        .filter_map(|inst| expand(Operation::Instruction(inst), table, stack, errors))
        .collect();
    stack.pop();

    Some(Operation::MacroCall(MacroInstruction {
        base: call.base,
        operations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::CodePositionInterval;

    fn ps(s: &str) -> PositionedString {
        PositionedString::unpositioned(s)
    }

    fn base(name: &str) -> OperationBase {
        OperationBase::new(CodePositionInterval::default(), vec![], ps(name))
    }

    fn inst(name: &str, operands: &[&str]) -> Operation {
        Operation::Instruction(Instruction::new(
            base(name),
            operands.iter().map(|o| ps(o)).collect(),
        ))
    }

    fn directive(args: &[&str], errors: &mut CompileErrorList) -> MacroDirective {
        let args: Vec<_> = args.iter().map(|a| ps(a)).collect();
        MacroDirective::new(base("macro"), &args, errors)
    }

    #[test]
    fn test_parameters() {
        let mut errors = CompileErrorList::new();
        let d = directive(&["inc", "r", "n=1"], &mut errors);
        assert!(errors.is_empty());
        let mut table = MacroTable::new();
        d.precompile(&mut errors, &mut table);
        assert_eq!(table.len(), 2);
        assert!(table.get("inc", 1).is_some());
        assert!(table.get("inc", 2).is_some());
        assert!(table.get("inc", 0).is_none());

        d.precompile(&mut errors, &mut table);
        assert_eq!(errors.messages(), vec!["Macro 'inc' already exists."]);
    }

    #[test]
    fn test_malformed() {
        let mut errors = CompileErrorList::new();
        directive(&["m", "a=1", "b"], &mut errors);
        directive(&["m", "=1"], &mut errors);
        directive(&["m", "a="], &mut errors);
        assert_eq!(
            errors.messages(),
            vec![
                "Default macro argument values have to be placed last.",
                "Malformed macro argument list.",
                "Malformed macro argument list.",
            ]
        );

        let mut errors = CompileErrorList::new();
        let mut table = MacroTable::new();
        directive(&[], &mut errors).precompile(&mut errors, &mut table);
        assert_eq!(errors.messages(), vec!["Missing macro name."]);
    }

    #[test]
    fn test_expand() {
        let mut errors = CompileErrorList::new();
        let mut table = MacroTable::new();

        let mut twice = directive(&["twice", "r"], &mut errors);
        twice.insert(inst("once", &["\\r"]));
        twice.insert(inst("once", &["\\r"]));
        twice.precompile(&mut errors, &mut table);

        let mut once = directive(&["once", "r"], &mut errors);
        once.insert(inst("addi", &["\\r", "\\r", "1"]));
        once.precompile(&mut errors, &mut table);

        let expanded = expand(inst("twice", &["x3"]), &table, &mut vec![], &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(expanded.to_source(), "addi x3, x3, 1\naddi x3, x3, 1\n");

        // Wrong arity is a plain instruction.
        let plain = expand(inst("twice", &[]), &table, &mut vec![], &mut errors).unwrap();
        assert!(matches!(plain, Operation::Instruction(_)));
    }

    #[test]
    fn test_cyclic() {
        let mut errors = CompileErrorList::new();
        let mut table = MacroTable::new();
        let mut a = directive(&["a"], &mut errors);
        a.insert(inst("b", &[]));
        a.precompile(&mut errors, &mut table);
        let mut b = directive(&["b"], &mut errors);
        b.insert(inst("a", &[]));
        b.precompile(&mut errors, &mut table);

        let expanded = expand(inst("a", &[]), &table, &mut vec![], &mut errors).unwrap();
        assert_eq!(errors.messages(), vec!["Cyclic macro call detected."]);
        assert_eq!(expanded.to_source(), "");
    }
}
