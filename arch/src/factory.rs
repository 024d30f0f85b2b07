use crate::{
    bits::BitValue,
    isa::Architecture,
    node::{InstructionNode, Node},
    op::OpKind,
    reg::Reg,
};
use tracing::debug;

/// Builds syntax-tree nodes for one target architecture.
#[derive(Debug, Clone)]
pub struct NodeFactoryCollection {
    arch: Architecture,
}

impl NodeFactoryCollection {
    pub fn new(arch: Architecture) -> Self {
        Self { arch }
    }

    pub fn architecture(&self) -> &Architecture {
        &self.arch
    }

    /// Empty instruction node for `mnemonic`, case-insensitive. `None` when
    /// the mnemonic is unknown or not part of this architecture.
    pub fn create_instruction_node(&self, mnemonic: &str) -> Option<InstructionNode> {
        let op = OpKind::parse(mnemonic).ok()?;
        if !self.arch.supports(op) {
            debug!("{} is not available on {}", op, self.arch.name);
            return None;
        }
        Some(InstructionNode::new(op, self.arch.xlen))
    }

    /// Register node for `x0`..`x31` and the ABI names. `pc` is not an
    /// operand and is rejected.
    pub fn create_register_node(&self, name: &str) -> Option<Node> {
        match Reg::parse(name) {
            Ok(reg) if reg.is_general() => Some(Node::Register(reg)),
            _ => None,
        }
    }

    pub fn create_immediate_node(&self, value: BitValue) -> Node {
        Node::Immediate(value)
    }

    /// Immediate a label stands for in an operand of `mnemonic` placed at
    /// `address`: a 2-byte-unit offset for pc-relative instructions, the
    /// absolute address otherwise.
    pub fn label_to_immediate(
        &self,
        label: &BitValue,
        mnemonic: &str,
        address: &BitValue,
    ) -> BitValue {
        match OpKind::parse(mnemonic) {
            Ok(op) if op.is_address_relative() => {
                let offset = (label.to_i64() - address.to_i64()) / 2;
                BitValue::from_i64(offset, 64)
            }
            _ => label.clone(),
        }
    }

    /// Encoded length in bits.
    pub fn instruction_length(&self, mnemonic: &str) -> Option<usize> {
        self.arch.instruction_length(mnemonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{isa::Xlen, node::NodeType};

    #[test]
    fn test_create() {
        let factory = NodeFactoryCollection::new(Architecture::rv32i());
        let add = factory.create_instruction_node("ADD").unwrap();
        assert_eq!(add.op(), OpKind::ADD);
        assert_eq!(add.xlen(), Xlen::Rv32);
        assert!(factory.create_instruction_node("mul").is_none());
        assert!(factory.create_instruction_node("hoge").is_none());

        let reg = factory.create_register_node("a0").unwrap();
        assert_eq!(reg, Node::Register(Reg::X10));
        assert!(factory.create_register_node("pc").is_none());
        assert!(factory.create_register_node("q1").is_none());

        let imm = factory.create_immediate_node(BitValue::from_u64(3, 64));
        assert_eq!(imm.node_type(), NodeType::Immediate);
        assert_eq!(factory.instruction_length("sw"), Some(32));
    }

    #[test]
    fn test_label_to_immediate() {
        let factory = NodeFactoryCollection::new(Architecture::rv64im());
        let label = BitValue::from_u64(0x10, 64);
        let here = BitValue::from_u64(0x20, 64);
        assert_eq!(
            factory.label_to_immediate(&label, "beq", &here).to_i64(),
            -8
        );
        assert_eq!(factory.label_to_immediate(&label, "JAL", &here).to_i64(), -8);
        assert_eq!(factory.label_to_immediate(&label, "jalr", &here), label);
        assert_eq!(factory.label_to_immediate(&label, "lw", &here), label);
    }
}
