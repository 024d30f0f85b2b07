use crate::{error::Error, op::OpKind};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Xlen {
    #[default]
    Rv32,
    Rv64,
}

impl Xlen {
    pub fn bits(&self) -> u32 {
        match self {
            Xlen::Rv32 => 32,
            Xlen::Rv64 => 64,
        }
    }

    pub fn mask(&self) -> u64 {
        match self {
            Xlen::Rv32 => 0xFFFF_FFFF,
            Xlen::Rv64 => u64::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
pub enum Extension {
    /// Base integer instruction set.
    I,
    /// Integer multiplication and division.
    M,
}

fn default_byte_size() -> usize {
    8
}

/// Target description the assembler and the instruction nodes are built
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub name: String,
    pub xlen: Xlen,
    pub extensions: Vec<Extension>,
    /// Bits per addressable memory cell.
    #[serde(default = "default_byte_size")]
    pub byte_size: usize,
}

impl Architecture {
    pub fn new(name: &str, xlen: Xlen) -> Self {
        Self {
            name: name.to_string(),
            xlen,
            extensions: vec![Extension::I],
            byte_size: default_byte_size(),
        }
    }

    pub fn extension(mut self, extension: Extension) -> Self {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
        self
    }

    pub fn rv32i() -> Self {
        Self::new("rv32i", Xlen::Rv32)
    }

    pub fn rv32im() -> Self {
        Self::new("rv32im", Xlen::Rv32).extension(Extension::M)
    }

    pub fn rv64i() -> Self {
        Self::new("rv64i", Xlen::Rv64)
    }

    pub fn rv64im() -> Self {
        Self::new("rv64im", Xlen::Rv64).extension(Extension::M)
    }

    /// Native word width in bits.
    pub fn word_size(&self) -> usize {
        self.xlen.bits() as usize
    }

    pub fn word_bytes(&self) -> usize {
        self.word_size() / self.byte_size
    }

    pub fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    pub fn supports(&self, op: OpKind) -> bool {
        self.has_extension(op.extension()) && (!op.rv64_only() || self.xlen == Xlen::Rv64)
    }

    /// Encoded length in bits, `None` for mnemonics this target lacks.
    pub fn instruction_length(&self, mnemonic: &str) -> Option<usize> {
        let op = OpKind::parse(mnemonic).ok()?;
        self.supports(op).then(|| op.length())
    }
}

impl Architecture {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        let arch: Self = serde_json::from_str(json)?;
        if arch.byte_size == 0 || arch.word_size() % arch.byte_size != 0 {
            return Err(Error::Config(format!(
                "byte size {} does not divide word size {}",
                arch.byte_size,
                arch.word_size()
            )));
        }
        Ok(arch)
    }
}
