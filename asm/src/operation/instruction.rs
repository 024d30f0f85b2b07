use super::{cells, OperationBase};
use crate::{
    allocator::{MemoryAllocator, RelativeMemoryPosition, SectionTracker},
    error::CompileErrorList,
    generator::SyntaxTreeGenerator,
    graph::SymbolGraph,
    output::FinalCommand,
    position::PositionedString,
    replacer::SymbolReplacer,
    scan,
    symbol::{Symbol, SymbolBehavior},
};
use rvarch::BitValue;

/// A mnemonic with its operands in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub base: OperationBase,
    operands: Vec<PositionedString>,
    relative: Option<RelativeMemoryPosition>,
    address: Option<usize>,
}

impl Instruction {
    pub fn new(base: OperationBase, operands: Vec<PositionedString>) -> Self {
        Self {
            base,
            operands,
            relative: None,
            address: None,
        }
    }

    pub fn operands(&self) -> &[PositionedString] {
        &self.operands
    }

    /// Absolute address, once the symbol table has been built.
    pub fn address(&self) -> Option<usize> {
        self.address
    }

    /// Copy with every `\parameter` in the operands replaced. Missing
    /// arguments fall back to the parameter default.
    pub(crate) fn with_arguments(
        &self,
        parameters: &[(String, Option<String>)],
        arguments: &[PositionedString],
    ) -> Self {
        let operands = self
            .operands
            .iter()
            .map(|operand| {
                let text = parameters.iter().enumerate().fold(
                    operand.string.clone(),
                    |text, (i, (name, default))| {
                        let value = arguments
                            .get(i)
                            .map(|a| a.as_str())
                            .or(default.as_deref())
                            .unwrap_or("");
                        scan::replace_parameter(&text, name, value)
                    },
                );
                operand.with_string(text)
            })
            .collect();
        Self::new(self.base.clone(), operands)
    }

    pub fn allocate_memory(
        &mut self,
        generator: &SyntaxTreeGenerator,
        errors: &mut CompileErrorList,
        allocator: &mut MemoryAllocator,
        tracker: &SectionTracker,
    ) {
        if tracker.section != "text" {
            errors.add_error(
                self.base.position,
                "Tried to define an instruction in not the text section.",
            );
            return;
        }
        let factory = generator.factory();
        let Some(bits) = factory.instruction_length(self.base.name.as_str()) else {
            return;
        };
        let size = cells(bits, factory.architecture().byte_size);
        match allocator.allocate_relative("text", size) {
            Ok(relative) => self.relative = Some(relative),
            Err(err) => errors.add_error(self.base.position, &err.to_string()),
        }
    }

    pub fn enhance_symbol_table(
        &mut self,
        errors: &mut CompileErrorList,
        allocator: &MemoryAllocator,
        graph: &mut SymbolGraph,
    ) {
        if let Some(relative) = &self.relative {
            match allocator.absolute_position(relative) {
                Ok(address) => self.address = Some(address),
                Err(err) => errors.add_error(self.base.position, &err.to_string()),
            }
        }
        self.base
            .insert_labels(graph, self.address.unwrap_or(0), SymbolBehavior::Dynamic);
    }

    pub fn execute(
        &self,
        generator: &SyntaxTreeGenerator,
        replacer: &SymbolReplacer,
        errors: &mut CompileErrorList,
        commands: &mut Vec<FinalCommand>,
    ) {
        let factory = generator.factory();
        let mnemonic = self.base.name.as_str();
        // Known mnemonic without an address: placement already failed.
        if self.address.is_none() && factory.instruction_length(mnemonic).is_some() {
            return;
        }

        let address = self.address.unwrap_or(0);
        let here = BitValue::from_u64(address as u64, 64);
        let resolver = replacer.with_dynamic(Box::new(move |symbol: &Symbol| {
            match symbol.value().as_str().parse::<u64>() {
                Ok(label) => factory
                    .label_to_immediate(&BitValue::from_u64(label, 64), mnemonic, &here)
                    .to_i64()
                    .to_string(),
                Err(_) => symbol.value().string.clone(),
            }
        }));

        let operands: Vec<String> = self
            .operands
            .iter()
            .map(|operand| match resolver.replace(operand.as_str()) {
                Ok(text) => text,
                Err(err) => {
                    errors.add_error(operand.position, &err.to_string());
                    operand.string.clone()
                }
            })
            .collect();

        if let Some(node) = generator.transform_command(mnemonic, &operands, self.base.position, errors) {
            commands.push(FinalCommand {
                node,
                position: self.base.position,
                address,
            });
        }
    }

    /// `name op, op, op` plus a newline.
    pub fn to_source(&self) -> String {
        let operands: Vec<&str> = self.operands.iter().map(|o| o.as_str()).collect();
        if operands.is_empty() {
            format!("{}\n", self.base.name)
        } else {
            format!("{} {}\n", self.base.name, operands.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::CodePositionInterval;

    fn inst(name: &str, operands: &[&str]) -> Instruction {
        Instruction::new(
            OperationBase::new(
                CodePositionInterval::default(),
                vec![],
                PositionedString::unpositioned(name),
            ),
            operands.iter().map(|o| PositionedString::unpositioned(o)).collect(),
        )
    }

    #[test]
    fn test_with_arguments() {
        let body = inst("addi", &["\\rd", "\\rd", "\\n+\\n"]);
        let params = vec![("rd".to_string(), None), ("n".to_string(), Some("1".to_string()))];

        let call = body.with_arguments(&params, &[PositionedString::unpositioned("x5")]);
        assert_eq!(call.to_source(), "addi x5, x5, 1+1\n");

        let call = body.with_arguments(
            &params,
            &[PositionedString::unpositioned("a0"), PositionedString::unpositioned("3")],
        );
        assert_eq!(call.to_source(), "addi a0, a0, 3+3\n");
        assert_eq!(inst("nop", &[]).to_source(), "nop\n");
    }
}
