use crate::{
    access::MemoryAccess,
    alu::{self, valu, valu_word},
    bits::BitValue,
    encode::{encode, Fields},
    error::Error,
    isa::Xlen,
    op::{Arg, Cond, Imm, Kind, OpKind},
    reg::Reg,
};
use color_print::cformat;
use std::fmt;
use tracing::trace;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Invalid {
    #[error("This instruction must have exactly {0} operands")]
    Count(usize),

    #[error("This instruction must have {0} as operands")]
    Operands(String),

    #[error("The register `{0}` cannot be used as an operand")]
    Register(Reg),

    #[error("The immediate value of this instruction must be representable by {0} bits")]
    Width(usize),

    #[error("The shift amount of this instruction must be less than {0}")]
    Shamt(u32),

    #[error("The memory area you are trying to access is out of range (area: [{0},{1}])")]
    OutOfRange(usize, usize),

    #[error("The memory area you are trying to access is protected (area: [{0},{1}])")]
    Protected(usize, usize),

    #[error("Branch offset would invalidate program counter")]
    ProgramCounter,

    #[error(transparent)]
    Access(#[from] Error),
}

pub type ValidationResult = Result<(), Invalid>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Instruction,
    Register,
    Immediate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Instruction(InstructionNode),
    Register(Reg),
    Immediate(BitValue),
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Instruction(_) => NodeType::Instruction,
            Node::Register(_) => NodeType::Register,
            Node::Immediate(_) => NodeType::Immediate,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        match self {
            Node::Instruction(inst) => inst.validate(),
            Node::Register(reg) if !reg.is_general() => Err(Invalid::Register(*reg)),
            _ => Ok(()),
        }
    }

    /// Current value of an operand. Instructions are not operands.
    pub fn get_value(&self, access: &dyn MemoryAccess) -> Result<BitValue, Error> {
        match self {
            Node::Register(reg) => access.get_register_value(&reg.to_string()),
            Node::Immediate(value) => Ok(value.clone()),
            Node::Instruction(inst) => Err(Error::Operand(inst.to_string())),
        }
    }

    pub fn assemble(&self) -> Result<BitValue, Invalid> {
        match self {
            Node::Instruction(inst) => inst.assemble(),
            Node::Register(reg) => Ok(BitValue::from_u64(reg.index() as u64, 5)),
            Node::Immediate(value) => Ok(value.clone()),
        }
    }

    pub fn cformat(&self) -> String {
        match self {
            Node::Instruction(inst) => inst.cformat(),
            Node::Register(reg) => cformat!("<b>{}</>", reg),
            Node::Immediate(value) => cformat!("<y>{}</>", value.to_i64()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Instruction(inst) => write!(f, "{}", inst),
            Node::Register(reg) => write!(f, "{}", reg),
            Node::Immediate(value) => write!(f, "{}", value.to_i64()),
        }
    }
}

// ----------------------------------------------------------------------------

/// One instruction with its operands in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionNode {
    op: OpKind,
    xlen: Xlen,
    children: Vec<Node>,
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn describe(args: &[Arg]) -> String {
    let regs = args.iter().filter(|a| **a != Arg::IMM).count();
    let imms = args.len() - regs;
    if imms == 0 {
        plural(regs, "register")
    } else {
        format!("{} and {}", plural(regs, "register"), plural(imms, "immediate"))
    }
}

fn taken(cond: Cond, a: u64, b: u64, width: u32) -> bool {
    let (sa, sb) = (alu::signed(a, width), alu::signed(b, width));
    match cond {
        Cond::Eq => a == b,
        Cond::Ne => a != b,
        Cond::Lt => sa < sb,
        Cond::Ge => sa >= sb,
        Cond::Ltu => a < b,
        Cond::Geu => a >= b,
    }
}

/// `imm << 12`, sign-extended from bit 31.
fn upper(imm: u64) -> u64 {
    ((imm as u32) << 12) as i32 as i64 as u64
}

impl InstructionNode {
    pub fn new(op: OpKind, xlen: Xlen) -> Self {
        Self {
            op,
            xlen,
            children: vec![],
        }
    }

    pub fn op(&self) -> OpKind {
        self.op
    }

    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Width the operation computes in: 32 for the `*w` forms.
    fn op_width(&self) -> u32 {
        match self.op.kind() {
            Kind::Integer { word: true, .. } => 32,
            _ => self.xlen.bits(),
        }
    }

    /// Structural check, independent of machine state.
    pub fn validate(&self) -> ValidationResult {
        let args = self.op.arg_field();
        if self.children.len() != args.len() {
            return Err(Invalid::Count(args.len()));
        }
        for child in &self.children {
            child.validate()?;
        }
        let shape = args.iter().zip(&self.children).all(|(arg, child)| {
            let expect = match arg {
                Arg::IMM => NodeType::Immediate,
                _ => NodeType::Register,
            };
            child.node_type() == expect
        });
        if !shape {
            return Err(Invalid::Operands(describe(&args)));
        }
        self.validate_immediate()
    }

    fn validate_immediate(&self) -> ValidationResult {
        let (Some(imm), Some(Node::Immediate(value))) = (self.op.imm(), self.children.last())
        else {
            return Ok(());
        };
        match imm {
            Imm::Signed(bits) if value.occupies_more_bits_than(bits) => Err(Invalid::Width(bits)),
            Imm::Either(bits)
                if value.occupies_more_bits_than(bits)
                    && value.occupies_more_unsigned_bits_than(bits) =>
            {
                Err(Invalid::Width(bits))
            }
            Imm::Shamt => {
                let width = self.op_width();
                if value.occupies_more_unsigned_bits_than(width.trailing_zeros() as usize) {
                    Err(Invalid::Shamt(width))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    fn reg(&self, index: usize) -> Result<Reg, Error> {
        match self.children.get(index) {
            Some(Node::Register(reg)) => Ok(*reg),
            Some(other) => Err(Error::Operand(other.to_string())),
            None => Err(Error::Operand(format!("#{index}"))),
        }
    }

    /// Registers read unsigned, immediates sign-extended.
    fn operand(&self, index: usize, access: &dyn MemoryAccess) -> Result<u64, Error> {
        match self.children.get(index) {
            Some(Node::Immediate(value)) => Ok(value.to_i64() as u64),
            Some(node) => Ok(node.get_value(access)?.to_u64()),
            None => Err(Error::Operand(format!("#{index}"))),
        }
    }

    fn write(&self, access: &mut dyn MemoryAccess, reg: Reg, value: u64) -> Result<(), Error> {
        let value = BitValue::from_u64(value & self.xlen.mask(), self.xlen.bits() as usize);
        access.set_register_value(&reg.to_string(), value)
    }

    fn pc(access: &dyn MemoryAccess) -> Result<u64, Error> {
        Ok(access.get_register_value("pc")?.to_u64())
    }

    /// Base register plus offset, wrapped to XLEN.
    fn address(&self, base: usize, access: &dyn MemoryAccess) -> Result<u64, Error> {
        let base = self.operand(base, access)?;
        let offset = self.operand(2, access)?;
        Ok(base.wrapping_add(offset) & self.xlen.mask())
    }

    /// Branch and `jal` destination, unwrapped so range checks can see it.
    fn target(&self, pc: u64, access: &dyn MemoryAccess) -> Result<i128, Error> {
        let offset = self.operand(self.children.len().saturating_sub(1), access)? as i64;
        Ok(pc as i128 + offset as i128 * 2)
    }

    fn check_area(
        &self,
        address: u64,
        bytes: usize,
        write: bool,
        access: &dyn MemoryAccess,
    ) -> ValidationResult {
        let address = address as usize;
        let last = address.saturating_add(bytes - 1);
        if address.saturating_add(bytes) > access.get_memory_size() {
            return Err(Invalid::OutOfRange(address, last));
        }
        if write && access.is_memory_protected_at(address, bytes) {
            return Err(Invalid::Protected(address, last));
        }
        Ok(())
    }

    /// Checks that depend on the current machine state.
    pub fn validate_runtime(&self, access: &dyn MemoryAccess) -> ValidationResult {
        match self.op.kind() {
            Kind::Load { bytes, .. } => {
                self.check_area(self.address(1, access)?, bytes, false, access)
            }
            Kind::Store { bytes } => self.check_area(self.address(0, access)?, bytes, true, access),
            Kind::Branch(_) | Kind::Jal => {
                let target = self.target(Self::pc(access)?, access)?;
                if target < 0 || target >= 1i128 << self.xlen.bits() {
                    return Err(Invalid::ProgramCounter);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Executes the instruction and returns the address of the next one.
    /// Does not move `pc` itself.
    pub fn evaluate(&self, access: &mut dyn MemoryAccess) -> Result<BitValue, Error> {
        let width = self.xlen.bits();
        let pc = Self::pc(access)?;
        let link = pc.wrapping_add(4);
        let mut next = link;

        match self.op.kind() {
            Kind::Integer { alu, word, .. } => {
                let a = self.operand(1, access)?;
                let b = self.operand(2, access)?;
                let result = if word {
                    valu_word(alu, a, b)
                } else {
                    valu(alu, a, b, width)
                };
                self.write(access, self.reg(0)?, result)?;
            }
            Kind::Load { bytes, signed } => {
                let address = self.address(1, access)?;
                let raw = access.get_memory_value_at(address as usize, bytes)?;
                let value = if signed {
                    raw.sign_extend(width as usize)
                } else {
                    raw.zero_extend(width as usize)
                };
                self.write(access, self.reg(0)?, value.to_u64())?;
            }
            Kind::Store { bytes } => {
                let address = self.address(0, access)?;
                let value = BitValue::from_u64(self.operand(1, access)?, bytes * 8);
                access.put_memory_value_at(address as usize, &value)?;
            }
            Kind::Branch(cond) => {
                let a = self.operand(0, access)?;
                let b = self.operand(1, access)?;
                if taken(cond, a, b, width) {
                    next = self.target(pc, access)? as u64;
                }
            }
            Kind::Jal => {
                next = self.target(pc, access)? as u64;
                self.write(access, self.reg(0)?, link)?;
            }
            Kind::Jalr => {
                next = self.operand(1, access)?.wrapping_add(self.operand(2, access)?) & !1;
                self.write(access, self.reg(0)?, link)?;
            }
            Kind::Lui => {
                let value = upper(self.operand(1, access)?);
                self.write(access, self.reg(0)?, value)?;
            }
            Kind::Auipc => {
                let value = pc.wrapping_add(upper(self.operand(1, access)?));
                self.write(access, self.reg(0)?, value)?;
            }
        }

        Ok(BitValue::from_u64(next & self.xlen.mask(), width as usize))
    }

    /// Runtime validation, evaluation and the `pc` update in one go.
    pub fn step(&self, access: &mut dyn MemoryAccess) -> Result<BitValue, Invalid> {
        self.validate_runtime(access)?;
        let next = self.evaluate(access)?;
        trace!(next = %next, "{}", self);
        access.set_register_value("pc", next.clone())?;
        Ok(next)
    }

    /// 32-bit machine word.
    pub fn assemble(&self) -> Result<BitValue, Invalid> {
        self.validate()?;
        let mut fields = Fields::default();
        for (arg, child) in self.op.arg_field().iter().zip(&self.children) {
            match (arg, child) {
                (Arg::RD, Node::Register(reg)) => fields.rd = reg.index(),
                (Arg::RS1, Node::Register(reg)) => fields.rs1 = reg.index(),
                (Arg::RS2, Node::Register(reg)) => fields.rs2 = reg.index(),
                (Arg::IMM, Node::Immediate(value)) => fields.imm = value.to_i64(),
                _ => {}
            }
        }
        Ok(BitValue::from_u64(encode(self.op, fields) as u64, 32))
    }

    pub fn cformat(&self) -> String {
        let args = self
            .children
            .iter()
            .map(|c| c.cformat())
            .collect::<Vec<_>>()
            .join(", ");
        cformat!("<r>{:<7}</>{}", self.op.to_string(), args)
    }
}

impl fmt::Display for InstructionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        for (i, child) in self.children.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{child}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{access::Machine, isa::Architecture};

    macro_rules! r {
        ($reg:ident) => {
            Node::Register(Reg::$reg)
        };
    }

    macro_rules! i {
        ($value:expr) => {
            Node::Immediate(BitValue::from_i64($value, 64))
        };
    }

    fn inst(op: OpKind, xlen: Xlen, children: Vec<Node>) -> InstructionNode {
        children
            .into_iter()
            .fold(InstructionNode::new(op, xlen), |n, c| n.child(c))
    }

    fn machine(xlen: Xlen) -> Machine {
        let arch = match xlen {
            Xlen::Rv32 => Architecture::rv32im(),
            Xlen::Rv64 => Architecture::rv64im(),
        };
        Machine::new(&arch, 64).protect(48..64)
    }

    /// Runs one instruction from `pc = 8` after seeding registers, then
    /// checks registers and the next pc.
    macro_rules! test_inst {
        ($($name:ident: $xlen:ident $op:ident [$($arg:expr),*]
            with [$(($sr:ident, $sv:expr)),*]
            => [$(($er:ident, $ev:expr)),*] next $next:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let mut m = machine(Xlen::$xlen);
                    m.set_reg(Reg::PC, 8);
                    $(m.set_reg(Reg::$sr, $sv as u64);)*
                    let node = inst(OpKind::$op, Xlen::$xlen, vec![$($arg),*]);
                    node.validate().unwrap();
                    let next = node.step(&mut m).unwrap();
                    $(assert_eq!(m.reg(Reg::$er), $ev as u64, "{}", stringify!($er));)*
                    assert_eq!(next.to_u64(), $next);
                    assert_eq!(m.pc(), $next);
                }
            )*
        };
    }

    test_inst! {
        addi: Rv32 ADDI [r!(X1), r!(X0), i!(4)] with [] => [(X1, 4)] next 12,
        addi_neg: Rv32 ADDI [r!(X1), r!(X0), i!(-1)] with [] => [(X1, 0xFFFF_FFFFu32)] next 12,
        sub_wrap: Rv32 SUB [r!(X3), r!(X1), r!(X2)] with [(X1, 1), (X2, 2)] => [(X3, 0xFFFF_FFFFu32)] next 12,
        slt: Rv32 SLT [r!(X3), r!(X1), r!(X2)] with [(X1, 0xFFFF_FFFFu32), (X2, 0)] => [(X3, 1)] next 12,
        sltiu: Rv32 SLTIU [r!(X3), r!(X1), i!(-1)] with [(X1, 5)] => [(X3, 1)] next 12,
        srai: Rv32 SRAI [r!(X3), r!(X1), i!(4)] with [(X1, 0x8000_0000u32)] => [(X3, 0xF800_0000u32)] next 12,
        mulh: Rv32 MULH [r!(X3), r!(X1), r!(X2)] with [(X1, 0xFFFF_FFFEu32), (X2, 3)] => [(X3, 0xFFFF_FFFFu32)] next 12,
        mulhu: Rv32 MULHU [r!(X3), r!(X1), r!(X2)] with [(X1, 0xFFFF_FFFFu32), (X2, 0xFFFF_FFFFu32)] => [(X3, 0xFFFF_FFFEu32)] next 12,
        divu_zero: Rv32 DIVU [r!(X3), r!(X1), r!(X0)] with [(X1, 9)] => [(X3, 0xFFFF_FFFFu32)] next 12,
        rem_zero: Rv32 REM [r!(X3), r!(X1), r!(X0)] with [(X1, 9)] => [(X3, 9)] next 12,
        addw: Rv64 ADDW [r!(X3), r!(X1), r!(X2)] with [(X1, 0x7FFF_FFFFu32), (X2, 1)] => [(X3, 0xFFFF_FFFF_8000_0000u64)] next 12,
        mulw: Rv64 MULW [r!(X3), r!(X1), r!(X2)] with [(X1, 0x1_0001_0000u64), (X2, 0x8000)] => [(X3, 0xFFFF_FFFF_8000_0000u64)] next 12,
        divw_zero: Rv64 DIVW [r!(X3), r!(X1), r!(X0)] with [(X1, 7)] => [(X3, u64::MAX)] next 12,
        divuw_zero: Rv64 DIVUW [r!(X3), r!(X1), r!(X0)] with [(X1, 7)] => [(X3, u64::MAX)] next 12,
        remw_zero: Rv64 REMW [r!(X3), r!(X1), r!(X0)] with [(X1, 0x1234_5678_8000_0001u64)] => [(X3, 0xFFFF_FFFF_8000_0001u64)] next 12,
        remuw_zero: Rv64 REMUW [r!(X3), r!(X1), r!(X0)] with [(X1, 0x1234_5678_8000_0001u64)] => [(X3, 0xFFFF_FFFF_8000_0001u64)] next 12,
        divw_overflow: Rv64 DIVW [r!(X3), r!(X1), r!(X2)] with [(X1, 0x8000_0000u32), (X2, u64::MAX)] => [(X3, 0xFFFF_FFFF_8000_0000u64)] next 12,
        remw_overflow: Rv64 REMW [r!(X3), r!(X1), r!(X2)] with [(X1, 0x8000_0000u32), (X2, u64::MAX)] => [(X3, 0)] next 12,
        divuw_sign: Rv64 DIVUW [r!(X3), r!(X1), r!(X2)] with [(X1, 0xFFFF_FFFEu32), (X2, 1)] => [(X3, 0xFFFF_FFFF_FFFF_FFFEu64)] next 12,
        remuw_sign: Rv64 REMUW [r!(X3), r!(X1), r!(X2)] with [(X1, 0x8000_0001u32), (X2, 0xFFFF_FFFFu32)] => [(X3, 0xFFFF_FFFF_8000_0001u64)] next 12,
        sraiw: Rv64 SRAIW [r!(X3), r!(X1), i!(31)] with [(X1, 0x8000_0000u32)] => [(X3, u64::MAX)] next 12,
        write_x0: Rv32 ADDI [r!(X0), r!(X0), i!(7)] with [] => [(X0, 0)] next 12,
        beq_taken: Rv32 BEQ [r!(X1), r!(X2), i!(-4)] with [(X1, 3), (X2, 3)] => [] next 0,
        beq_not_taken: Rv32 BEQ [r!(X1), r!(X2), i!(-4)] with [(X1, 3), (X2, 4)] => [] next 12,
        blt_signed: Rv32 BLT [r!(X1), r!(X2), i!(8)] with [(X1, 0xFFFF_FFFFu32), (X2, 0)] => [] next 24,
        bgeu_unsigned: Rv32 BGEU [r!(X1), r!(X2), i!(8)] with [(X1, 0xFFFF_FFFFu32), (X2, 0)] => [] next 24,
        jal: Rv32 JAL [r!(X1), i!(4)] with [] => [(X1, 12)] next 16,
        jalr: Rv32 JALR [r!(X1), r!(X1), i!(1)] with [(X1, 33)] => [(X1, 12)] next 34,
        lui: Rv32 LUI [r!(X1), i!(0xFFFFF)] with [] => [(X1, 0xFFFF_F000u32)] next 12,
        lui_rv64: Rv64 LUI [r!(X1), i!(0x80000)] with [] => [(X1, 0xFFFF_FFFF_8000_0000u64)] next 12,
        auipc: Rv32 AUIPC [r!(X1), i!(1)] with [] => [(X1, 0x1008)] next 12,
    }

    #[test]
    fn test_load_store() {
        let mut m = machine(Xlen::Rv32);
        m.set_reg(Reg::X1, 0xFFFF_FF80);
        m.set_reg(Reg::X2, 16);
        let sw = inst(OpKind::SW, Xlen::Rv32, vec![r!(X2), r!(X1), i!(4)]);
        sw.step(&mut m).unwrap();
        assert_eq!(&m.memory()[20..24], &[0x80, 0xFF, 0xFF, 0xFF]);

        let lb = inst(OpKind::LB, Xlen::Rv32, vec![r!(X3), r!(X2), i!(4)]);
        lb.step(&mut m).unwrap();
        assert_eq!(m.reg(Reg::X3), 0xFFFF_FF80);

        let lbu = inst(OpKind::LBU, Xlen::Rv32, vec![r!(X3), r!(X2), i!(4)]);
        lbu.step(&mut m).unwrap();
        assert_eq!(m.reg(Reg::X3), 0x80);

        let lhu = inst(OpKind::LHU, Xlen::Rv32, vec![r!(X3), r!(X2), i!(5)]);
        lhu.step(&mut m).unwrap();
        assert_eq!(m.reg(Reg::X3), 0xFFFF);

        let sb = inst(OpKind::SB, Xlen::Rv32, vec![r!(X2), r!(X1), i!(-16)]);
        sb.step(&mut m).unwrap();
        assert_eq!(m.memory()[0], 0x80);
        assert_eq!(m.memory()[1], 0);
    }

    #[test]
    fn test_runtime() {
        let mut m = machine(Xlen::Rv32);
        m.set_reg(Reg::X2, 60);
        let lw = inst(OpKind::LW, Xlen::Rv32, vec![r!(X1), r!(X2), i!(2)]);
        assert_eq!(lw.validate_runtime(&m), Err(Invalid::OutOfRange(62, 65)));
        assert_eq!(
            lw.validate_runtime(&m).unwrap_err().to_string(),
            "The memory area you are trying to access is out of range (area: [62,65])"
        );

        let sw = inst(OpKind::SW, Xlen::Rv32, vec![r!(X2), r!(X1), i!(-12)]);
        assert_eq!(sw.validate_runtime(&m), Err(Invalid::Protected(48, 51)));
        let lw = inst(OpKind::LW, Xlen::Rv32, vec![r!(X1), r!(X2), i!(-12)]);
        assert_eq!(lw.validate_runtime(&m), Ok(()));

        let beq = inst(OpKind::BEQ, Xlen::Rv32, vec![r!(X0), r!(X0), i!(-8)]);
        m.set_reg(Reg::PC, 8);
        assert_eq!(beq.validate_runtime(&m), Err(Invalid::ProgramCounter));
        assert!(beq.step(&mut m).is_err());
        assert_eq!(m.pc(), 8);
    }

    #[test]
    fn test_wrapped_address() {
        let mut m = machine(Xlen::Rv64);
        let ld = inst(OpKind::LD, Xlen::Rv64, vec![r!(X1), r!(X0), i!(-4)]);
        assert!(matches!(ld.evaluate(&mut m), Err(Error::OutOfBounds(..))));
        assert!(matches!(ld.step(&mut m), Err(Invalid::OutOfRange(..))));
        let sd = inst(OpKind::SD, Xlen::Rv64, vec![r!(X0), r!(X0), i!(-4)]);
        assert!(matches!(sd.evaluate(&mut m), Err(Error::OutOfBounds(..))));
        assert_eq!(m.pc(), 0);
    }

    #[test]
    fn test_validate() {
        let x = Xlen::Rv32;
        assert_eq!(
            inst(OpKind::ADD, x, vec![r!(X1), r!(X2)]).validate(),
            Err(Invalid::Count(3))
        );
        let err = inst(OpKind::ADDI, x, vec![r!(X1), r!(X2), r!(X3)])
            .validate()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "This instruction must have 2 registers and 1 immediate as operands"
        );
        assert_eq!(
            inst(OpKind::LUI, x, vec![i!(1), i!(1)]).validate(),
            Err(Invalid::Operands("1 register and 1 immediate".into()))
        );
        assert_eq!(
            inst(OpKind::ADDI, x, vec![r!(X1), r!(X2), i!(2048)]).validate(),
            Err(Invalid::Width(12))
        );
        assert_eq!(
            inst(OpKind::ADDI, x, vec![r!(X1), r!(X2), i!(-2048)]).validate(),
            Ok(())
        );
        assert_eq!(
            inst(OpKind::LUI, x, vec![r!(X1), i!(0xFFFFF)]).validate(),
            Ok(())
        );
        assert_eq!(
            inst(OpKind::LUI, x, vec![r!(X1), i!(0x100000)]).validate(),
            Err(Invalid::Width(20))
        );
        assert_eq!(
            inst(OpKind::SLLI, x, vec![r!(X1), r!(X2), i!(32)]).validate(),
            Err(Invalid::Shamt(32))
        );
        assert_eq!(
            inst(OpKind::SLLI, Xlen::Rv64, vec![r!(X1), r!(X2), i!(32)]).validate(),
            Ok(())
        );
        assert_eq!(
            inst(OpKind::SLLIW, Xlen::Rv64, vec![r!(X1), r!(X2), i!(32)]).validate(),
            Err(Invalid::Shamt(32))
        );
        assert_eq!(
            inst(OpKind::ADD, x, vec![r!(PC), r!(X1), r!(X2)]).validate(),
            Err(Invalid::Register(Reg::PC))
        );
        let nested = Node::Instruction(inst(OpKind::ADD, x, vec![]));
        assert!(inst(OpKind::ADDI, x, vec![r!(X1), r!(X1), nested])
            .validate()
            .is_err());
    }

    #[test]
    fn test_assemble_display() {
        let addi = inst(OpKind::ADDI, Xlen::Rv32, vec![r!(X1), r!(X0), i!(4)]);
        assert_eq!(addi.assemble().unwrap().to_u64(), 0x0040_0093);
        assert_eq!(addi.to_string(), "addi x1, x0, 4");
        assert!(addi.cformat().contains("addi"));
        let bad = inst(OpKind::ADDI, Xlen::Rv32, vec![r!(X1)]);
        assert!(bad.assemble().is_err());
        assert_eq!(r!(X5).assemble().unwrap().to_u64(), 5);
    }
}
