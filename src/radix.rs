//! Exact conversion of integer literals between bases 2, 8, 10 and 16.
//!
//! Values go through an arbitrary-precision `BigInt`, so no literal is too
//! long to convert. A leading sign is part of decimal notation; the other
//! bases are unsigned by convention and never use two's complement. Negative
//! values are still rendered sign-magnitude (`-FF`) and that form is read
//! back, so decimal -> hex -> decimal round-trips for every integer. Keep in
//! mind that `FFFFFFFF` converts to `4294967295` here, while in programming
//! mode the same literal is the register value `-1`.

use num_bigint::{BigInt, Sign};
use num_traits::{Num, Zero};

use crate::context::NumberSystem;
use crate::errors::*;

const SUPPORTED: [u32; 4] = [2, 8, 10, 16];

fn check_base(base: u32) -> CalcResult<()> {
    if SUPPORTED.contains(&base) {
        Ok(())
    } else {
        Err(CalcError::unsupported_base(base))
    }
}

/// Resolves a base given by name (`hexadecimal`, `hex`) or by number (`16`)
pub fn base_from_name(name: &str) -> CalcResult<u32> {
    match name.parse::<NumberSystem>() {
        Ok(ns) => Ok(ns.radix()),
        Err(..) => Err(CalcError::unsupported_base(format!("'{}'", name))),
    }
}

// strips the prefix that names `base`; `0b` is not stripped for hex
// since `b` is a hex digit there
fn strip_prefix(s: &str, base: u32) -> &str {
    let prefix = match base {
        16 => ["0x", "0X"],
        8 => ["0o", "0O"],
        2 => ["0b", "0B"],
        _ => return s,
    };
    for p in prefix.iter() {
        if let Some(rest) = s.strip_prefix(p) {
            return rest;
        }
    }
    s
}

/// Parses an integer literal written in `base`
pub fn parse_integer(text: &str, base: u32) -> CalcResult<BigInt> {
    check_base(base)?;
    let s: String = text.trim().chars().filter(|c| *c != '_').collect();
    if s.is_empty() {
        return Ok(BigInt::zero());
    }

    let (negative, digits) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        if base != 10 {
            return Err(CalcError::bad_digits(text, base));
        }
        (false, rest)
    } else {
        (false, s.as_str())
    };
    let digits = strip_prefix(digits, base);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(base)) {
        return Err(CalcError::bad_digits(text, base));
    }
    let magnitude = match BigInt::from_str_radix(digits, base) {
        Ok(i) => i,
        Err(..) => return Err(CalcError::bad_digits(text, base)),
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// Renders an integer in `base` with uppercase hex digits and no prefix
pub fn format_integer(value: &BigInt, base: u32) -> CalcResult<String> {
    check_base(base)?;
    let digits = value.magnitude().to_str_radix(base).to_uppercase();
    if value.sign() == Sign::Minus {
        Ok(format!("-{}", digits))
    } else {
        Ok(digits)
    }
}

/// Converts an integer literal between bases. Output is canonical: no
/// leading zeros, `0` for zero and for empty input.
pub fn convert(text: &str, from_base: u32, to_base: u32) -> CalcResult<String> {
    check_base(from_base)?;
    check_base(to_base)?;
    let value = parse_integer(text, from_base)?;
    format_integer(&value, to_base)
}
