use bimap::BiMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    #[default]
    X0,
    X1,
    X2,
    X3,
    X4,
    X5,
    X6,
    X7,
    X8,
    X9,
    X10,
    X11,
    X12,
    X13,
    X14,
    X15,
    X16,
    X17,
    X18,
    X19,
    X20,
    X21,
    X22,
    X23,
    X24,
    X25,
    X26,
    X27,
    X28,
    X29,
    X30,
    X31,
    PC,
}

static ABI_NAMES: Lazy<BiMap<&'static str, Reg>> = Lazy::new(|| {
    use Reg::*;
    let mut map = BiMap::new();
    for (name, reg) in [
        ("zero", X0),
        ("ra", X1),
        ("sp", X2),
        ("gp", X3),
        ("tp", X4),
        ("t0", X5),
        ("t1", X6),
        ("t2", X7),
        ("s0", X8),
        ("s1", X9),
        ("a0", X10),
        ("a1", X11),
        ("a2", X12),
        ("a3", X13),
        ("a4", X14),
        ("a5", X15),
        ("a6", X16),
        ("a7", X17),
        ("s2", X18),
        ("s3", X19),
        ("s4", X20),
        ("s5", X21),
        ("s6", X22),
        ("s7", X23),
        ("s8", X24),
        ("s9", X25),
        ("s10", X26),
        ("s11", X27),
        ("t3", X28),
        ("t4", X29),
        ("t5", X30),
        ("t6", X31),
    ] {
        map.insert(name, reg);
    }
    map
});

impl Reg {
    /// Accepts `x0`..`x31`, ABI names and `fp`, case-insensitive.
    pub fn parse(s: &str) -> Result<Self, String> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "fp" {
            return Ok(Reg::X8);
        }
        if let Some(reg) = ABI_NAMES.get_by_left(lower.as_str()) {
            return Ok(*reg);
        }
        match lower.parse::<Self>() {
            Ok(reg) => Ok(reg),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn abi_name(&self) -> &'static str {
        ABI_NAMES.get_by_right(self).copied().unwrap_or("pc")
    }

    /// Register number as used in instruction encodings.
    pub fn index(&self) -> u32 {
        u8::from(*self) as u32
    }

    pub fn is_general(&self) -> bool {
        *self != Reg::PC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Reg::parse("x0"), Ok(Reg::X0));
        assert_eq!(Reg::parse("X31"), Ok(Reg::X31));
        assert_eq!(Reg::parse("zero"), Ok(Reg::X0));
        assert_eq!(Reg::parse("t0"), Ok(Reg::X5));
        assert_eq!(Reg::parse("fp"), Ok(Reg::X8));
        assert_eq!(Reg::parse("pc"), Ok(Reg::PC));
        assert!(Reg::parse("x32").is_err());
        assert!(Reg::parse("hoge").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(Reg::X10.to_string(), "x10");
        assert_eq!(Reg::X10.abi_name(), "a0");
        assert_eq!(Reg::X31.index(), 31);
        assert_eq!(Reg::try_from(2u8).ok(), Some(Reg::X2));
    }
}
