use crate::{
    error::{CompileErrorList, Error},
    expr,
    position::CodePositionInterval,
};
use rvarch::{BitValue, InstructionNode, Node, NodeFactoryCollection};

/// Turns symbol-free operand text into tree nodes.
#[derive(Debug, Clone)]
pub struct SyntaxTreeGenerator {
    factory: NodeFactoryCollection,
}

impl SyntaxTreeGenerator {
    pub fn new(factory: NodeFactoryCollection) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &NodeFactoryCollection {
        &self.factory
    }

    /// Register for a leading letter, 64-bit immediate otherwise.
    pub fn transform_operand(&self, operand: &str) -> Result<Node, String> {
        let text = operand.trim();
        let Some(head) = text.chars().next() else {
            return Err(format!("Invalid argument: '{operand}'"));
        };
        if head.is_ascii_alphabetic() {
            if let Some(reg) = self.factory.create_register_node(text) {
                return Ok(reg);
            }
        }
        if head == '"' {
            return Err(format!("String literals are not valid operands: {text}"));
        }
        match expr::compile(text) {
            Ok(value) => Ok(self.factory.create_immediate_node(BitValue::from_i64(value, 64))),
            Err(Error::UnknownSymbol(name)) if name == text => {
                Err(format!("Invalid argument: '{operand}'"))
            }
            Err(err) => Err(err.to_string()),
        }
    }

    /// Validated instruction node, or `None` with the reasons in `errors`.
    pub fn transform_command(
        &self,
        mnemonic: &str,
        operands: &[String],
        position: CodePositionInterval,
        errors: &mut CompileErrorList,
    ) -> Option<InstructionNode> {
        let Some(mut node) = self.factory.create_instruction_node(mnemonic) else {
            errors.add_error(position, &format!("Unknown operation: {mnemonic}"));
            return None;
        };

        let mut ok = true;
        for operand in operands {
            match self.transform_operand(operand) {
                Ok(child) => node.add_child(child),
                Err(message) => {
                    errors.add_error(position, &message);
                    ok = false;
                }
            }
        }
        if !ok {
            return None;
        }

        match node.validate() {
            Ok(()) => Some(node),
            Err(err) => {
                errors.add_error(position, &format!("Invalid operation ('{mnemonic}'): {err}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvarch::{Architecture, Reg};

    fn generator() -> SyntaxTreeGenerator {
        SyntaxTreeGenerator::new(NodeFactoryCollection::new(Architecture::rv32im()))
    }

    #[test]
    fn test_operand() {
        let g = generator();
        assert_eq!(g.transform_operand(" sp ").unwrap(), Node::Register(Reg::X2));
        assert_eq!(
            g.transform_operand("(4+4)*-1").unwrap(),
            Node::Immediate(BitValue::from_i64(-8, 64))
        );
        assert_eq!(g.transform_operand("").unwrap_err(), "Invalid argument: ''");
        assert_eq!(g.transform_operand("foo").unwrap_err(), "Invalid argument: 'foo'");
        assert_eq!(g.transform_operand("1/0").unwrap_err(), "Division by zero");
        assert!(g.transform_operand("\"s\"").is_err());
    }

    #[test]
    fn test_command() {
        let g = generator();
        let mut errors = CompileErrorList::new();
        let pos = CodePositionInterval::default();
        let ops = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let node = g.transform_command("ADDI", &ops(&["x1", "x0", "4"]), pos, &mut errors);
        assert_eq!(node.unwrap().to_string(), "addi x1, x0, 4");
        assert!(errors.is_empty());

        assert!(g.transform_command("addi", &ops(&["x1", "x0", "4096"]), pos, &mut errors).is_none());
        assert!(g.transform_command("frob", &ops(&["x1"]), pos, &mut errors).is_none());
        assert!(g.transform_command("add", &ops(&["x1", "", "x2"]), pos, &mut errors).is_none());
        assert_eq!(
            errors.messages(),
            vec![
                "Invalid operation ('addi'): The immediate value of this instruction must be representable by 12 bits",
                "Unknown operation: frob",
                "Invalid argument: ''",
            ]
        );
    }
}
