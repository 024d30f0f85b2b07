pub mod access;
pub mod alu;
pub mod bits;
pub mod encode;
pub mod error;
pub mod factory;
pub mod isa;
pub mod muldiv;
pub mod node;
pub mod op;
pub mod reg;

pub use access::{Machine, MemoryAccess};
pub use bits::BitValue;
pub use error::Error;
pub use factory::NodeFactoryCollection;
pub use isa::{Architecture, Extension, Xlen};
pub use node::{InstructionNode, Invalid, Node, NodeType, ValidationResult};
pub use op::OpKind;
pub use reg::Reg;
