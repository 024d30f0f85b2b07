pub mod allocator;
pub mod config;
pub mod error;
pub mod expr;
pub mod generator;
pub mod graph;
pub mod operation;
pub mod output;
pub mod position;
pub mod replacer;
pub mod representator;
pub mod scan;
pub mod symbol;

pub use allocator::{MemoryAllocator, RelativeMemoryPosition, SectionDefinition, SectionTracker};
pub use config::TransformationParameters;
pub use error::{CompileError, CompileErrorList, Error, Severity};
pub use generator::SyntaxTreeGenerator;
pub use graph::{SymbolGraph, SymbolGraphEvaluation};
pub use operation::{create_directive, create_instruction, Operation};
pub use output::{FinalCommand, FinalRepresentation, MacroInformation};
pub use position::{CodePosition, CodePositionInterval, PositionedString};
pub use replacer::SymbolReplacer;
pub use representator::IntermediateRepresentator;
pub use symbol::{Symbol, SymbolBehavior};
