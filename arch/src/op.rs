use crate::{alu::ALU, isa::Extension};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum OpKind {
    // RV32I / RV64I
    ADD,
    ADDI,
    SUB,
    AND,
    ANDI,
    OR,
    ORI,
    XOR,
    XORI,
    SLL,
    SLLI,
    SRL,
    SRLI,
    SRA,
    SRAI,
    SLT,
    SLTI,
    SLTU,
    SLTIU,
    LUI,
    AUIPC,
    LB,
    LBU,
    LH,
    LHU,
    LW,
    SB,
    SH,
    SW,
    BEQ,
    BNE,
    BLT,
    BGE,
    BLTU,
    BGEU,
    JAL,
    JALR,
    // RV64I only
    LWU,
    LD,
    SD,
    ADDW,
    ADDIW,
    SUBW,
    SLLW,
    SLLIW,
    SRLW,
    SRLIW,
    SRAW,
    SRAIW,
    // M
    MUL,
    MULH,
    MULHU,
    MULHSU,
    DIV,
    DIVU,
    REM,
    REMU,
    // M, RV64 only
    MULW,
    DIVW,
    DIVUW,
    REMW,
    REMUW,
}

impl OpKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().parse::<Self>() {
            Ok(a) => Ok(a),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Ge,
    Ltu,
    Geu,
}

/// What an instruction does, independent of its spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer { alu: ALU, imm: bool, word: bool },
    Load { bytes: usize, signed: bool },
    Store { bytes: usize },
    Branch(Cond),
    Jal,
    Jalr,
    Lui,
    Auipc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    RD,
    RS1,
    RS2,
    IMM,
}

/// Range an immediate operand must fit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imm {
    /// Two's complement with the given width.
    Signed(usize),
    /// Either signed or unsigned with the given width.
    Either(usize),
    /// Shift amount, below the operation width.
    Shamt,
}

impl OpKind {
    pub fn kind(&self) -> Kind {
        use OpKind::*;
        macro_rules! reg {
            ($alu:ident) => {
                Kind::Integer { alu: ALU::$alu, imm: false, word: false }
            };
            ($alu:ident, word) => {
                Kind::Integer { alu: ALU::$alu, imm: false, word: true }
            };
        }
        macro_rules! imm {
            ($alu:ident) => {
                Kind::Integer { alu: ALU::$alu, imm: true, word: false }
            };
            ($alu:ident, word) => {
                Kind::Integer { alu: ALU::$alu, imm: true, word: true }
            };
        }
        match self {
            ADD => reg!(Add),
            ADDI => imm!(Add),
            SUB => reg!(Sub),
            AND => reg!(And),
            ANDI => imm!(And),
            OR => reg!(Or),
            ORI => imm!(Or),
            XOR => reg!(Xor),
            XORI => imm!(Xor),
            SLL => reg!(Sll),
            SLLI => imm!(Sll),
            SRL => reg!(Srl),
            SRLI => imm!(Srl),
            SRA => reg!(Sra),
            SRAI => imm!(Sra),
            SLT => reg!(Slt),
            SLTI => imm!(Slt),
            SLTU => reg!(Sltu),
            SLTIU => imm!(Sltu),
            LUI => Kind::Lui,
            AUIPC => Kind::Auipc,
            LB => Kind::Load { bytes: 1, signed: true },
            LBU => Kind::Load { bytes: 1, signed: false },
            LH => Kind::Load { bytes: 2, signed: true },
            LHU => Kind::Load { bytes: 2, signed: false },
            LW => Kind::Load { bytes: 4, signed: true },
            LWU => Kind::Load { bytes: 4, signed: false },
            LD => Kind::Load { bytes: 8, signed: true },
            SB => Kind::Store { bytes: 1 },
            SH => Kind::Store { bytes: 2 },
            SW => Kind::Store { bytes: 4 },
            SD => Kind::Store { bytes: 8 },
            BEQ => Kind::Branch(Cond::Eq),
            BNE => Kind::Branch(Cond::Ne),
            BLT => Kind::Branch(Cond::Lt),
            BGE => Kind::Branch(Cond::Ge),
            BLTU => Kind::Branch(Cond::Ltu),
            BGEU => Kind::Branch(Cond::Geu),
            JAL => Kind::Jal,
            JALR => Kind::Jalr,
            ADDW => reg!(Add, word),
            ADDIW => imm!(Add, word),
            SUBW => reg!(Sub, word),
            SLLW => reg!(Sll, word),
            SLLIW => imm!(Sll, word),
            SRLW => reg!(Srl, word),
            SRLIW => imm!(Srl, word),
            SRAW => reg!(Sra, word),
            SRAIW => imm!(Sra, word),
            MUL => reg!(Mul),
            MULH => reg!(Mulh),
            MULHU => reg!(Mulhu),
            MULHSU => reg!(Mulhsu),
            DIV => reg!(Div),
            DIVU => reg!(Divu),
            REM => reg!(Rem),
            REMU => reg!(Remu),
            MULW => reg!(Mul, word),
            DIVW => reg!(Div, word),
            DIVUW => reg!(Divu, word),
            REMW => reg!(Rem, word),
            REMUW => reg!(Remu, word),
        }
    }

    /// Operand layout in source order.
    pub fn arg_field(&self) -> Vec<Arg> {
        match self.kind() {
            Kind::Integer { imm: false, .. } => vec![Arg::RD, Arg::RS1, Arg::RS2],
            Kind::Integer { imm: true, .. } => vec![Arg::RD, Arg::RS1, Arg::IMM],
            Kind::Load { .. } => vec![Arg::RD, Arg::RS1, Arg::IMM],
            // base, source, offset
            Kind::Store { .. } => vec![Arg::RS1, Arg::RS2, Arg::IMM],
            Kind::Branch(_) => vec![Arg::RS1, Arg::RS2, Arg::IMM],
            Kind::Jal => vec![Arg::RD, Arg::IMM],
            Kind::Jalr => vec![Arg::RD, Arg::RS1, Arg::IMM],
            Kind::Lui | Kind::Auipc => vec![Arg::RD, Arg::IMM],
        }
    }

    pub fn imm(&self) -> Option<Imm> {
        match self.kind() {
            Kind::Integer { imm: false, .. } => None,
            Kind::Integer { alu: ALU::Sll | ALU::Srl | ALU::Sra, .. } => Some(Imm::Shamt),
            Kind::Integer { .. } => Some(Imm::Signed(12)),
            Kind::Load { .. } | Kind::Store { .. } | Kind::Jalr => Some(Imm::Signed(12)),
            Kind::Branch(_) => Some(Imm::Signed(12)),
            Kind::Jal => Some(Imm::Signed(20)),
            Kind::Lui | Kind::Auipc => Some(Imm::Either(20)),
        }
    }

    pub fn extension(&self) -> Extension {
        match self.kind() {
            Kind::Integer { alu, .. } if alu.is_muldiv() => Extension::M,
            _ => Extension::I,
        }
    }

    pub fn rv64_only(&self) -> bool {
        use OpKind::*;
        match self.kind() {
            Kind::Integer { word, .. } => word,
            _ => matches!(self, LWU | LD | SD),
        }
    }

    /// Encoded length in bits.
    pub fn length(&self) -> usize {
        32
    }

    /// Whether label operands are turned into pc-relative offsets.
    pub fn is_address_relative(&self) -> bool {
        matches!(self.kind(), Kind::Branch(_) | Kind::Jal)
    }
}
