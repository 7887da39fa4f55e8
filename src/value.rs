use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;

use crate::context::NumberSystem;
use crate::errors::*;

/// Width in bits of the programming mode register
pub const INT_WIDTH: u32 = 32;

/// The largest argument `factorial` accepts before the result stops being
/// representable as a finite `f64`
pub const MAX_FACTORIAL: u32 = 170;

/// Evaluation result: a real number or a fixed-width two's-complement integer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EvalValue {
    Real(f64),
    Integer(i32),
}

/// Formats a real with at most `digits` significant digits, trimming
/// trailing zeros. Switches to exponent notation when the exponent is
/// below -4 or not less than `digits`.
pub fn format_real(g: f64, digits: usize) -> String {
    if g == 0.0 {
        return "0".to_string();
    }
    if !g.is_finite() {
        return format!("{}", g);
    }
    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, g);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => match e.parse::<i32>() {
            Ok(e) => (m.to_string(), e),
            Err(..) => return sci,
        },
        None => return sci,
    };

    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(&mantissa), sign, exp.abs());
    }
    let decimals = (digits as i32 - 1 - exp).max(0) as usize;
    let fixed = trim_zeros(&format!("{:.*}", decimals, g));
    if fixed == "-0" {
        return "0".to_string();
    }
    fixed
}

fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Shortest text that parses back to the same `f64`
pub fn format_f64(g: f64) -> String {
    let mut buf = dtoa::Buffer::new();
    buf.format(g).to_string()
}

/// Renders the register bit pattern in a number system. Decimal is signed;
/// other radices show the unsigned 32-bit pattern, hexadecimal padded to
/// whole bytes.
pub fn format_integer(i: i32, ns: NumberSystem) -> String {
    let bits = i as u32;
    match ns {
        NumberSystem::Decimal => format!("{}", i),
        NumberSystem::Hexadecimal => {
            let s = format!("{:X}", bits);
            if s.len() % 2 == 1 {
                format!("0{}", s)
            } else {
                s
            }
        }
        NumberSystem::Octal => format!("{:o}", bits),
        NumberSystem::Binary => format!("{:b}", bits),
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalValue::Real(g) => write!(f, "{}", format_f64(*g)),
            EvalValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

/// Rejects NaN and infinite results of real operations
pub(crate) fn checked_real(g: f64, what: &str) -> CalcResult<EvalValue> {
    if g.is_nan() {
        return Err(CalcError::domain(format!("{} is undefined for the given argument", what)));
    }
    if g.is_infinite() {
        return Err(CalcError::overflow(format!("{} result is too large", what)));
    }
    Ok(EvalValue::Real(g))
}

fn parse_big(text: &str, radix: u32) -> CalcResult<BigInt> {
    match BigInt::parse_bytes(text.as_bytes(), radix) {
        Some(i) => Ok(i),
        None => Err(CalcError::domain(format!("'{}' is not an integer", text))),
    }
}

macro_rules! real_op {
    ($id:ident, $name:expr, |$a:ident, $b:ident| $body:expr) => {
        pub fn $id(self, rhs: EvalValue) -> CalcResult<EvalValue> {
            match (self, rhs) {
                (EvalValue::Real($a), EvalValue::Real($b)) => checked_real($body, $name),
                (EvalValue::Integer(..), EvalValue::Integer(..)) => self.int_op(rhs, stringify!($id)),
                _ => Err(CalcError::domain(format!("{}: mixed real and integer operands", $name))),
            }
        }
    };
}

macro_rules! bitwise_op {
    ($id:ident, $op:tt) => {
        pub fn $id(self, rhs: EvalValue) -> CalcResult<EvalValue> {
            match (self, rhs) {
                (EvalValue::Integer(i1), EvalValue::Integer(i2)) => Ok(EvalValue::Integer(i1 $op i2)),
                _ => Err(CalcError::domain(format!("{} supports only integers", stringify!($id)))),
            }
        }
    };
}

impl EvalValue {
    /// Converts a literal to a real number
    pub fn real_from_literal(text: &str, radix: u32) -> CalcResult<EvalValue> {
        if radix == 10 {
            return match text.parse::<f64>() {
                Ok(g) => checked_real(g, "literal"),
                Err(..) => Err(CalcError::domain(format!("Failed to convert '{}' to float", text))),
            };
        }
        let i = parse_big(text, radix)?;
        match i.to_f64() {
            Some(g) => checked_real(g, "literal"),
            None => Err(CalcError::overflow(format!("Literal '{}' is too large", text))),
        }
    }

    /// Converts a literal to the register bit pattern. Any value that fits
    /// in `INT_WIDTH` bits is accepted, so `FFFFFFFF` is `-1`.
    pub fn integer_from_literal(text: &str, radix: u32) -> CalcResult<EvalValue> {
        let i = parse_big(text, radix)?;
        match i.to_u32() {
            Some(u) => Ok(EvalValue::Integer(u as i32)),
            None => Err(CalcError::overflow(format!(
                "Literal '{}' does not fit in {} bits",
                text, INT_WIDTH
            ))),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            EvalValue::Real(g) => g.is_zero(),
            EvalValue::Integer(i) => *i == 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            EvalValue::Real(g) => *g,
            EvalValue::Integer(i) => f64::from(*i),
        }
    }

    /// Text for the result field of a calculation
    pub fn format(&self, ns: NumberSystem, digits: usize) -> String {
        match self {
            EvalValue::Real(g) => format_real(*g, digits),
            EvalValue::Integer(i) => format_integer(*i, ns),
        }
    }

    // integer arithmetic wraps around at INT_WIDTH bits
    fn int_op(self, rhs: EvalValue, op: &str) -> CalcResult<EvalValue> {
        let (a, b) = match (self, rhs) {
            (EvalValue::Integer(a), EvalValue::Integer(b)) => (a, b),
            _ => return Err(CalcError::domain(format!("{} supports only integers", op))),
        };
        let v = match op {
            "add" => a.wrapping_add(b),
            "sub" => a.wrapping_sub(b),
            "mul" => a.wrapping_mul(b),
            "div" => {
                if b == 0 {
                    return Err(CalcError::divide_by_zero(a));
                }
                a.wrapping_div(b)
            }
            "rem" => {
                if b == 0 {
                    return Err(CalcError::divide_by_zero(a));
                }
                a.wrapping_rem(b)
            }
            "power" => {
                if b < 0 {
                    return Err(CalcError::domain("Negative exponent in integer power"));
                }
                a.wrapping_pow(b as u32)
            }
            _ => return Err(CalcError::domain(format!("Invalid integer operator '{}'", op))),
        };
        Ok(EvalValue::Integer(v))
    }

    real_op!(add, "addition", |a, b| a + b);
    real_op!(sub, "subtraction", |a, b| a - b);
    real_op!(mul, "multiplication", |a, b| a * b);
    real_op!(power, "power", |a, b| a.powf(b));

    pub fn div(self, rhs: EvalValue) -> CalcResult<EvalValue> {
        if let (EvalValue::Real(a), EvalValue::Real(b)) = (self, rhs) {
            if b.is_zero() {
                return Err(CalcError::divide_by_zero(format_f64(a)));
            }
            return checked_real(a / b, "division");
        }
        self.int_op(rhs, "div")
    }

    /// Real remainder is floored: it takes the sign of the divisor, so
    /// `-7 % 3` is `2`. Integer remainder truncates like the division.
    pub fn rem(self, rhs: EvalValue) -> CalcResult<EvalValue> {
        if let (EvalValue::Real(a), EvalValue::Real(b)) = (self, rhs) {
            if b.is_zero() {
                return Err(CalcError::divide_by_zero(format_f64(a)));
            }
            let m = a % b;
            let m = if m != 0.0 && (m < 0.0) != (b < 0.0) { m + b } else { m };
            return checked_real(m, "modulo");
        }
        self.int_op(rhs, "rem")
    }

    pub fn negate(self) -> CalcResult<EvalValue> {
        match self {
            EvalValue::Real(g) => Ok(EvalValue::Real(-g)),
            EvalValue::Integer(i) => Ok(EvalValue::Integer(i.wrapping_neg())),
        }
    }

    bitwise_op!(bit_and, &);
    bitwise_op!(bit_or, |);
    bitwise_op!(bit_xor, ^);

    pub fn bit_not(self) -> CalcResult<EvalValue> {
        match self {
            EvalValue::Integer(i) => Ok(EvalValue::Integer(!i)),
            _ => Err(CalcError::domain("bitwise not supports only integers")),
        }
    }

    /// Logical shifts of the register bit pattern. Shifting by the register
    /// width or more clears it.
    pub fn bit_shl(self, rhs: EvalValue) -> CalcResult<EvalValue> {
        self.shift(rhs, true)
    }

    pub fn bit_shr(self, rhs: EvalValue) -> CalcResult<EvalValue> {
        self.shift(rhs, false)
    }

    fn shift(self, rhs: EvalValue, left: bool) -> CalcResult<EvalValue> {
        let (a, n) = match (self, rhs) {
            (EvalValue::Integer(a), EvalValue::Integer(n)) => (a as u32, n),
            _ => return Err(CalcError::domain("bit shift supports only integers")),
        };
        if n < 0 {
            return Err(CalcError::domain(format!("Cannot shift by negative amount {}", n)));
        }
        let n = n as u32;
        let bits = if n >= INT_WIDTH {
            0
        } else if left {
            a << n
        } else {
            a >> n
        };
        Ok(EvalValue::Integer(bits as i32))
    }

    /// Factorial of a non-negative integer, computed with a loop
    pub fn fact(self) -> CalcResult<EvalValue> {
        let g = self.as_f64();
        if g < 0.0 || g.fract() != 0.0 {
            return Err(CalcError::domain(format!(
                "factorial is defined only for non-negative integers, got {}",
                format_f64(g)
            )));
        }
        if g > f64::from(MAX_FACTORIAL) {
            return Err(CalcError::overflow(format!(
                "factorial argument {} exceeds {}",
                format_f64(g),
                MAX_FACTORIAL
            )));
        }
        let n = g as u32;
        let mut res = 1.0f64;
        for i in 2..=n {
            res *= f64::from(i);
        }
        Ok(EvalValue::Real(res))
    }
}
