//! Multiply and divide on `width`-bit operands held in `u64`.
//!
//! The upper half of a product is built from four half-width cross products
//! so that a 64-bit multiply never needs a 128-bit intermediate.

use crate::alu::signed;

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

fn negative(a: u64, width: u32) -> bool {
    (a >> (width - 1)) & 1 == 1
}

fn magnitude(a: u64, width: u32) -> u64 {
    if negative(a, width) {
        a.wrapping_neg() & mask(width)
    } else {
        a
    }
}

/// Upper half of the unsigned `2 * width`-bit product.
pub fn mulhu(a: u64, b: u64, width: u32) -> u64 {
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    let h = width / 2;
    let hm = mask(h);
    let (al, ah) = (a & hm, a >> h);
    let (bl, bh) = (b & hm, b >> h);

    let albl = al * bl;
    let albh = al * bh;
    let ahbl = ah * bl;
    let ahbh = ah * bh;

    let carry = ((albl >> h) + (albh & hm) + (ahbl & hm)) >> h;
    ahbh.wrapping_add(albh >> h)
        .wrapping_add(ahbl >> h)
        .wrapping_add(carry)
        & m
}

/// Negates the double-width value `hi:lo` and returns the new upper half.
fn negate_high(hi: u64, lo: u64, width: u32) -> u64 {
    let carry = (lo & mask(width) == 0) as u64;
    (!hi).wrapping_add(carry) & mask(width)
}

fn mulh_signed(a: u64, b: u64, width: u32, a_signed: bool, b_signed: bool) -> u64 {
    let sa = a_signed && negative(a, width);
    let sb = b_signed && negative(b, width);
    let ua = if a_signed { magnitude(a, width) } else { a & mask(width) };
    let ub = if b_signed { magnitude(b, width) } else { b & mask(width) };
    let hi = mulhu(ua, ub, width);
    if sa != sb {
        negate_high(hi, ua.wrapping_mul(ub), width)
    } else {
        hi
    }
}

pub fn mulh(a: u64, b: u64, width: u32) -> u64 {
    mulh_signed(a, b, width, true, true)
}

/// `a` signed, `b` unsigned.
pub fn mulhsu(a: u64, b: u64, width: u32) -> u64 {
    mulh_signed(a, b, width, true, false)
}

pub fn div(a: u64, b: u64, width: u32) -> u64 {
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    if b == 0 {
        return m;
    }
    let (sa, sb) = (signed(a, width), signed(b, width));
    if sb == -1 && a == 1 << (width - 1) {
        return a;
    }
    (sa / sb) as u64 & m
}

pub fn divu(a: u64, b: u64, width: u32) -> u64 {
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    if b == 0 {
        return m;
    }
    a / b
}

pub fn rem(a: u64, b: u64, width: u32) -> u64 {
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    if b == 0 {
        return a;
    }
    let (sa, sb) = (signed(a, width), signed(b, width));
    if sb == -1 && a == 1 << (width - 1) {
        return 0;
    }
    (sa % sb) as u64 & m
}

pub fn remu(a: u64, b: u64, width: u32) -> u64 {
    let m = mask(width);
    let (a, b) = (a & m, b & m);
    if b == 0 {
        return a;
    }
    a % b
}
