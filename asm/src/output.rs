use crate::{error::CompileErrorList, position::CodePositionInterval};
use rvarch::{BitValue, InstructionNode, Invalid, MemoryAccess};
use std::collections::HashMap;

/// One executable instruction and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalCommand {
    pub node: InstructionNode,
    pub position: CodePositionInterval,
    pub address: usize,
}

/// Expanded text of one macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInformation {
    pub position: CodePositionInterval,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct FinalRepresentation {
    pub commands: Vec<FinalCommand>,
    pub errors: CompileErrorList,
    pub macro_information: Vec<MacroInformation>,
}

impl FinalRepresentation {
    /// No commands, only the diagnostics.
    pub fn failed(errors: CompileErrorList) -> Self {
        Self {
            errors,
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    /// Address to index into `commands`.
    pub fn create_mapping(&self) -> HashMap<usize, usize> {
        self.commands
            .iter()
            .enumerate()
            .map(|(i, command)| (command.address, i))
            .collect()
    }

    pub fn command_at(&self, address: usize) -> Option<&FinalCommand> {
        self.commands.iter().find(|c| c.address == address)
    }

    /// Run the command at `pc`. `None` once `pc` leaves the program.
    pub fn step(&self, access: &mut dyn MemoryAccess) -> Result<Option<BitValue>, Invalid> {
        let pc = access.get_register_value("pc")?.to_u64() as usize;
        match self.command_at(pc) {
            Some(command) => Ok(Some(command.node.step(access)?)),
            None => Ok(None),
        }
    }

    /// Encoded program as `(address, word)` pairs.
    pub fn machine_code(&self) -> Result<Vec<(usize, BitValue)>, Invalid> {
        self.commands
            .iter()
            .map(|c| Ok((c.address, c.node.assemble()?)))
            .collect()
    }
}
