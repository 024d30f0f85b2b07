use crate::muldiv;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, FromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum ALU {
    #[default]
    Add,
    Sub,
    And,
    Or,
    Xor,
    Sll,
    Srl,
    Sra,
    Slt,
    Sltu,
    Mul,
    Mulh,
    Mulhsu,
    Mulhu,
    Div,
    Divu,
    Rem,
    Remu,
}

impl ALU {
    pub fn is_muldiv(&self) -> bool {
        u8::from(*self) >= u8::from(ALU::Mul)
    }
}

macro_rules! boo {
    ($cond:expr) => {
        if $cond {
            1
        } else {
            0
        }
    };
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Reinterprets the low `width` bits of `a` as a signed number.
pub fn signed(a: u64, width: u32) -> i64 {
    let shift = 64 - width;
    ((a << shift) as i64) >> shift
}

/// Computes `op` on `width`-bit operands. Operands are truncated to `width`
/// bits first and the result is masked the same way.
pub fn valu<T: Into<ALU>>(op: T, a: u64, b: u64, width: u32) -> u64 {
    use ALU::*;
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    let shamt = (b & (width as u64 - 1)) as u32;
    let r = match op.into() {
        Add => a.wrapping_add(b),
        Sub => a.wrapping_sub(b),
        And => a & b,
        Or => a | b,
        Xor => a ^ b,
        Sll => a << shamt,
        Srl => a >> shamt,
        Sra => (signed(a, width) >> shamt) as u64,
        Slt => boo!(signed(a, width) < signed(b, width)),
        Sltu => boo!(a < b),
        Mul => a.wrapping_mul(b),
        Mulh => muldiv::mulh(a, b, width),
        Mulhsu => muldiv::mulhsu(a, b, width),
        Mulhu => muldiv::mulhu(a, b, width),
        Div => muldiv::div(a, b, width),
        Divu => muldiv::divu(a, b, width),
        Rem => muldiv::rem(a, b, width),
        Remu => muldiv::remu(a, b, width),
    };
    r & m
}

/// The `*w` forms of RV64: compute on the low 32 bits, then sign-extend the
/// 32-bit result to 64 bits.
pub fn valu_word<T: Into<ALU>>(op: T, a: u64, b: u64) -> u64 {
    signed(valu(op, a, b, 32), 32) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_alu {
        ($($name:ident: $op:ident($a:expr, $b:expr, $w:expr) => $expect:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(valu(ALU::$op, $a, $b, $w), $expect);
                }
            )*
        };
    }

    test_alu! {
        add_wraps: Add(0xFFFF_FFFF, 1, 32) => 0,
        add_64: Add(0xFFFF_FFFF, 1, 64) => 0x1_0000_0000,
        sub_wraps: Sub(0, 1, 32) => 0xFFFF_FFFF,
        sll_masks_shamt: Sll(1, 33, 32) => 2,
        sll_64: Sll(1, 33, 64) => 1 << 33,
        srl_logical: Srl(0x8000_0000, 31, 32) => 1,
        sra_arith: Sra(0x8000_0000, 31, 32) => 0xFFFF_FFFF,
        slt_signed: Slt(0xFFFF_FFFF, 0, 32) => 1,
        sltu_unsigned: Sltu(0xFFFF_FFFF, 0, 32) => 0,
        mul_low: Mul(0x1_0000, 0x1_0000, 32) => 0,
        div_zero: Div(7, 0, 32) => 0xFFFF_FFFF,
        rem_zero: Rem(7, 0, 32) => 7,
        div_overflow: Div(0x8000_0000, 0xFFFF_FFFF, 32) => 0x8000_0000,
    }

    macro_rules! test_alu_word {
        ($($name:ident: $op:ident($a:expr, $b:expr) => $expect:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(valu_word(ALU::$op, $a, $b), $expect);
                }
            )*
        };
    }

    test_alu_word! {
        mulw_sign: Mul(0x1_0001_0000, 0x8000) => 0xFFFF_FFFF_8000_0000,
        mulw_negative: Mul(u64::MAX, 2) => 0xFFFF_FFFF_FFFF_FFFE,
        divw_zero: Div(7, 0) => u64::MAX,
        divuw_zero: Divu(7, 0) => u64::MAX,
        remw_zero: Rem(0x1234_5678_8000_0001, 0) => 0xFFFF_FFFF_8000_0001,
        remuw_zero: Remu(0x1234_5678_8000_0001, 0) => 0xFFFF_FFFF_8000_0001,
        divw_overflow: Div(0x8000_0000, u64::MAX) => 0xFFFF_FFFF_8000_0000,
        remw_overflow: Rem(0x8000_0000, u64::MAX) => 0,
        divuw_sign: Divu(0xFFFF_FFFE, 1) => 0xFFFF_FFFF_FFFF_FFFE,
        remuw_sign: Remu(0x8000_0001, 0xFFFF_FFFF) => 0xFFFF_FFFF_8000_0001,
    }

    #[test]
    fn test_word() {
        assert_eq!(valu_word(ALU::Add, 0x7FFF_FFFF, 1), 0xFFFF_FFFF_8000_0000);
        assert_eq!(valu_word(ALU::Sll, 1, 31), 0xFFFF_FFFF_8000_0000);
        assert_eq!(valu_word(ALU::Srl, 0xFFFF_FFFF_0000_0010, 4), 1);
        assert_eq!(valu_word(ALU::Divu, 0xFFFF_FFFF, 1), u64::MAX);
    }

    #[test]
    fn test_class() {
        assert!(ALU::Remu.is_muldiv());
        assert!(!ALU::Sltu.is_muldiv());
        assert_eq!(ALU::from(0u8), ALU::Add);
    }
}
