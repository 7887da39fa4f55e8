//! Calculator mode and number system, and the context that carries both
//! through tokenizing, parsing and evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calculator mode. Decides which operators and functions an expression may
/// use and whether numbers are reals or fixed-width integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Basic,
    Scientific,
    Financial,
    Programming,
}

/// Radix used for integer literals and integer results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberSystem {
    #[default]
    Decimal,
    Octal,
    Hexadecimal,
    Binary,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Scientific => "scientific",
            Mode::Financial => "financial",
            Mode::Programming => "programming",
        }
    }

    /// Programming mode works on fixed-width integers, others on reals
    pub fn is_integer(self) -> bool {
        self == Mode::Programming
    }
}

impl NumberSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberSystem::Decimal => "decimal",
            NumberSystem::Octal => "octal",
            NumberSystem::Hexadecimal => "hexadecimal",
            NumberSystem::Binary => "binary",
        }
    }

    pub fn radix(self) -> u32 {
        match self {
            NumberSystem::Decimal => 10,
            NumberSystem::Octal => 8,
            NumberSystem::Hexadecimal => 16,
            NumberSystem::Binary => 2,
        }
    }

    pub fn from_radix(radix: u32) -> Option<Self> {
        match radix {
            10 => Some(NumberSystem::Decimal),
            8 => Some(NumberSystem::Octal),
            16 => Some(NumberSystem::Hexadecimal),
            2 => Some(NumberSystem::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for NumberSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Mode::Basic),
            "scientific" => Ok(Mode::Scientific),
            "financial" => Ok(Mode::Financial),
            "programming" => Ok(Mode::Programming),
            other => Err(format!("Unknown mode '{}'", other)),
        }
    }
}

impl FromStr for NumberSystem {
    type Err = String;

    /// Accepts both names (`hexadecimal`, `hex`) and radix numbers (`16`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decimal" | "dec" | "10" => Ok(NumberSystem::Decimal),
            "octal" | "oct" | "8" => Ok(NumberSystem::Octal),
            "hexadecimal" | "hex" | "16" => Ok(NumberSystem::Hexadecimal),
            "binary" | "bin" | "2" => Ok(NumberSystem::Binary),
            other => Err(format!("Unknown number system '{}'", other)),
        }
    }
}

/// Mode and number system of one calculation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub mode: Mode,
    pub number_system: NumberSystem,
}

impl Context {
    pub fn new(mode: Mode, number_system: NumberSystem) -> Self {
        Context { mode, number_system }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Programming".parse::<Mode>(), Ok(Mode::Programming));
        assert!("engineering".parse::<Mode>().is_err());
        assert_eq!("hex".parse::<NumberSystem>(), Ok(NumberSystem::Hexadecimal));
        assert_eq!("2".parse::<NumberSystem>(), Ok(NumberSystem::Binary));
        assert!("base64".parse::<NumberSystem>().is_err());
    }

    #[test]
    fn test_radix() {
        for ns in [
            NumberSystem::Decimal,
            NumberSystem::Octal,
            NumberSystem::Hexadecimal,
            NumberSystem::Binary,
        ] {
            assert_eq!(NumberSystem::from_radix(ns.radix()), Some(ns));
        }
        assert_eq!(NumberSystem::from_radix(3), None);
    }

    #[test]
    fn test_serde_names() {
        let s = serde_json::to_string(&Mode::Scientific).unwrap();
        assert_eq!(s, "\"scientific\"");
        let ns: NumberSystem = serde_json::from_str("\"octal\"").unwrap();
        assert_eq!(ns, NumberSystem::Octal);
    }
}
