use crate::op::{Cond, Imm, Kind, OpKind};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    Load = 0b0000011,
    OpImm = 0b0010011,
    Auipc = 0b0010111,
    OpImm32 = 0b0011011,
    Store = 0b0100011,
    Op = 0b0110011,
    Lui = 0b0110111,
    Op32 = 0b0111011,
    Branch = 0b1100011,
    Jalr = 0b1100111,
    Jal = 0b1101111,
}

/// Register numbers and immediate of one instruction. The immediate of
/// branches and `jal` is counted in 2-byte units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fields {
    pub rd: u32,
    pub rs1: u32,
    pub rs2: u32,
    pub imm: i64,
}

// ----------------------------------------------------------------------------

fn enc_r(opcode: OpCode, rd: u32, f3: u32, rs1: u32, rs2: u32, f7: u32) -> u32 {
    (u8::from(opcode) as u32)
        | (rd & 0x1F) << 7
        | (f3 & 0x7) << 12
        | (rs1 & 0x1F) << 15
        | (rs2 & 0x1F) << 20
        | (f7 & 0x7F) << 25
}

fn enc_i(opcode: OpCode, rd: u32, f3: u32, rs1: u32, imm: i64) -> u32 {
    (u8::from(opcode) as u32)
        | (rd & 0x1F) << 7
        | (f3 & 0x7) << 12
        | (rs1 & 0x1F) << 15
        | (imm as u32 & 0xFFF) << 20
}

fn enc_s(opcode: OpCode, f3: u32, rs1: u32, rs2: u32, imm: i64) -> u32 {
    let imm = imm as u32;
    (u8::from(opcode) as u32)
        | (imm & 0x1F) << 7
        | (f3 & 0x7) << 12
        | (rs1 & 0x1F) << 15
        | (rs2 & 0x1F) << 20
        | (imm >> 5 & 0x7F) << 25
}

fn enc_b(opcode: OpCode, f3: u32, rs1: u32, rs2: u32, imm: i64) -> u32 {
    let off = (imm << 1) as u32;
    (u8::from(opcode) as u32)
        | (off >> 11 & 0x1) << 7
        | (off >> 1 & 0xF) << 8
        | (f3 & 0x7) << 12
        | (rs1 & 0x1F) << 15
        | (rs2 & 0x1F) << 20
        | (off >> 5 & 0x3F) << 25
        | (off >> 12 & 0x1) << 31
}

fn enc_u(opcode: OpCode, rd: u32, imm: i64) -> u32 {
    (u8::from(opcode) as u32) | (rd & 0x1F) << 7 | (imm as u32 & 0xF_FFFF) << 12
}

fn enc_j(opcode: OpCode, rd: u32, imm: i64) -> u32 {
    let off = (imm << 1) as u32;
    (u8::from(opcode) as u32)
        | (rd & 0x1F) << 7
        | (off >> 12 & 0xFF) << 12
        | (off >> 11 & 0x1) << 20
        | (off >> 1 & 0x3FF) << 21
        | (off >> 20 & 0x1) << 31
}

// ----------------------------------------------------------------------------

/// `(funct3, funct7)`; funct7 is zero where the format has none.
fn funct(op: OpKind) -> (u32, u32) {
    use OpKind::*;
    match op {
        ADD | ADDI | ADDW | ADDIW => (0, 0),
        SUB | SUBW => (0, 0x20),
        SLL | SLLI | SLLW | SLLIW => (1, 0),
        SLT | SLTI => (2, 0),
        SLTU | SLTIU => (3, 0),
        XOR | XORI => (4, 0),
        SRL | SRLI | SRLW | SRLIW => (5, 0),
        SRA | SRAI | SRAW | SRAIW => (5, 0x20),
        OR | ORI => (6, 0),
        AND | ANDI => (7, 0),
        MUL | MULW => (0, 1),
        MULH => (1, 1),
        MULHSU => (2, 1),
        MULHU => (3, 1),
        DIV | DIVW => (4, 1),
        DIVU | DIVUW => (5, 1),
        REM | REMW => (6, 1),
        REMU | REMUW => (7, 1),
        LB | SB => (0, 0),
        LH | SH => (1, 0),
        LW | SW => (2, 0),
        LD | SD => (3, 0),
        LBU => (4, 0),
        LHU => (5, 0),
        LWU => (6, 0),
        JALR => (0, 0),
        BEQ | BNE | BLT | BGE | BLTU | BGEU | JAL | LUI | AUIPC => (0, 0),
    }
}

fn branch_funct(cond: Cond) -> u32 {
    match cond {
        Cond::Eq => 0,
        Cond::Ne => 1,
        Cond::Lt => 4,
        Cond::Ge => 5,
        Cond::Ltu => 6,
        Cond::Geu => 7,
    }
}

pub fn opcode(op: OpKind) -> OpCode {
    match op.kind() {
        Kind::Integer { imm: false, word: false, .. } => OpCode::Op,
        Kind::Integer { imm: false, word: true, .. } => OpCode::Op32,
        Kind::Integer { imm: true, word: false, .. } => OpCode::OpImm,
        Kind::Integer { imm: true, word: true, .. } => OpCode::OpImm32,
        Kind::Load { .. } => OpCode::Load,
        Kind::Store { .. } => OpCode::Store,
        Kind::Branch(_) => OpCode::Branch,
        Kind::Jal => OpCode::Jal,
        Kind::Jalr => OpCode::Jalr,
        Kind::Lui => OpCode::Lui,
        Kind::Auipc => OpCode::Auipc,
    }
}

/// 32-bit machine word for `op` with the given operand fields.
pub fn encode(op: OpKind, f: Fields) -> u32 {
    let code = opcode(op);
    let (f3, f7) = funct(op);
    match op.kind() {
        Kind::Integer { imm: false, .. } => enc_r(code, f.rd, f3, f.rs1, f.rs2, f7),
        Kind::Integer { imm: true, .. } if op.imm() == Some(Imm::Shamt) => {
            enc_i(code, f.rd, f3, f.rs1, (f7 as i64) << 5 | (f.imm & 0x3F))
        }
        Kind::Integer { imm: true, .. } | Kind::Load { .. } | Kind::Jalr => {
            enc_i(code, f.rd, f3, f.rs1, f.imm)
        }
        Kind::Store { .. } => enc_s(code, f3, f.rs1, f.rs2, f.imm),
        Kind::Branch(cond) => enc_b(code, branch_funct(cond), f.rs1, f.rs2, f.imm),
        Kind::Jal => enc_j(code, f.rd, f.imm),
        Kind::Lui | Kind::Auipc => enc_u(code, f.rd, f.imm),
    }
}

// ----------------------------------------------------------------------------
