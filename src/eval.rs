use std::f64::consts::{E, PI};

use crate::ast::*;
use crate::context::{Context, Mode, NumberSystem};
use crate::errors::*;
use crate::parse::parse_str;
use crate::value::{checked_real, EvalValue};

/// Walks an expression tree. Programming mode produces `Integer` values,
/// every other mode `Real` ones. The number system only affects how the
/// result is rendered later: literals already carry their radix.
pub fn evaluate(node: &Node, mode: Mode, _number_system: NumberSystem) -> CalcResult<EvalValue> {
    eval_node(node, mode)
}

/// Tokenizes, parses and evaluates an expression
pub fn eval_str(text: &str, ctx: Context) -> CalcResult<EvalValue> {
    let node = parse_str(text, ctx)?;
    evaluate(&node, ctx.mode, ctx.number_system)
}

fn eval_node(node: &Node, mode: Mode) -> CalcResult<EvalValue> {
    match node {
        Node::Literal(n) => {
            if mode.is_integer() {
                EvalValue::integer_from_literal(&n.text, n.radix)
            } else {
                EvalValue::real_from_literal(&n.text, n.radix)
            }
        }
        Node::UnaryOp(op, child) => {
            let v = eval_node(child, mode)?;
            match op {
                UnaryOp::Neg => v.negate(),
                UnaryOp::Not => v.bit_not(),
            }
        }
        Node::BinaryOp(op, left, right) => {
            let l = eval_node(left, mode)?;
            let r = eval_node(right, mode)?;
            match op {
                BinaryOp::Add => l.add(r),
                BinaryOp::Sub => l.sub(r),
                BinaryOp::Mul => l.mul(r),
                BinaryOp::Div => l.div(r),
                BinaryOp::Rem => l.rem(r),
                BinaryOp::Pow => l.power(r),
                BinaryOp::Shl => l.bit_shl(r),
                BinaryOp::Shr => l.bit_shr(r),
                BinaryOp::And => l.bit_and(r),
                BinaryOp::Xor => l.bit_xor(r),
                BinaryOp::Or => l.bit_or(r),
            }
        }
        Node::Call(name, args) => {
            let mut vals = Vec::with_capacity(args.len());
            for a in args {
                vals.push(eval_node(a, mode)?);
            }
            call(name, &vals, mode)
        }
    }
}

fn real_arg(name: &str, args: &[EvalValue], idx: usize) -> CalcResult<f64> {
    match args.get(idx) {
        Some(EvalValue::Real(g)) => Ok(*g),
        Some(EvalValue::Integer(..)) => Err(CalcError::domain(format!(
            "Function '{}' is not supported for integers",
            name
        ))),
        None => Err(CalcError::domain(format!("Function '{}' requires an argument", name))),
    }
}

fn call(name: &str, args: &[EvalValue], mode: Mode) -> CalcResult<EvalValue> {
    // constants and functions exist only for real valued modes
    if mode.is_integer() {
        return Err(CalcError::unresolved(name));
    }
    if args.is_empty() {
        return match name {
            "pi" => Ok(EvalValue::Real(PI)),
            "e" => Ok(EvalValue::Real(E)),
            _ => Err(CalcError::unresolved(name)),
        };
    }

    let x = real_arg(name, args, 0)?;
    match name {
        "sin" => checked_real(x.sin(), name),
        "cos" => checked_real(x.cos(), name),
        "tan" => checked_real(x.tan(), name),
        "asin" => checked_real(x.asin(), name),
        "acos" => checked_real(x.acos(), name),
        "atan" => checked_real(x.atan(), name),
        "sqrt" => {
            if x < 0.0 {
                return Err(CalcError::domain(format!("sqrt of negative number {}", x)));
            }
            checked_real(x.sqrt(), name)
        }
        "ln" | "log" => {
            if x <= 0.0 {
                return Err(CalcError::domain(format!("{} of non-positive number {}", name, x)));
            }
            let g = if name == "ln" { x.ln() } else { x.log10() };
            checked_real(g, name)
        }
        "exp" => checked_real(x.exp(), name),
        "abs" => Ok(EvalValue::Real(x.abs())),
        "round" => Ok(EvalValue::Real(x.round())),
        "factorial" => EvalValue::Real(x).fact(),
        "pow" => {
            let y = real_arg(name, args, 1)?;
            EvalValue::Real(x).power(EvalValue::Real(y))
        }
        _ => Err(CalcError::unresolved(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(text: &str, mode: Mode, ns: NumberSystem) -> CalcResult<String> {
        eval_str(text, Context::new(mode, ns)).map(|v| v.format(ns, 10))
    }

    fn sci(text: &str) -> CalcResult<String> {
        calc(text, Mode::Scientific, NumberSystem::Decimal)
    }

    fn kind(r: CalcResult<String>) -> Option<EvalErrorKind> {
        r.err().and_then(|e| e.eval_kind())
    }

    #[test]
    fn test_basic() {
        let exprs = [
            ("2+2", "4"),
            ("10*5", "50"),
            ("15/3", "5"),
            ("100-25", "75"),
            ("2**3", "8"),
            ("(10+5)*2", "30"),
            ("7 % 3", "1"),
            ("-7 % 3", "2"),
            ("7 % -3", "-2"),
            ("1/3", "0.3333333333"),
            ("-2**2", "4"),
            ("2**3**2", "512"),
            ("2^10", "1024"),
        ];
        for (expr, res) in exprs.iter() {
            assert_eq!(calc(expr, Mode::Basic, NumberSystem::Decimal), Ok(res.to_string()), "{}", expr);
        }
    }

    #[test]
    fn test_scientific() {
        assert_eq!(sci("2**10"), Ok("1024".to_string()));
        assert_eq!(sci("sin(pi / 2)"), Ok("1".to_string()));
        assert_eq!(sci("cos(0) + tan(0)"), Ok("1".to_string()));
        assert_eq!(sci("sqrt(16)"), Ok("4".to_string()));
        assert_eq!(sci("log(1000)"), Ok("3".to_string()));
        assert_eq!(sci("ln(e)"), Ok("1".to_string()));
        assert_eq!(sci("exp(0)"), Ok("1".to_string()));
        assert_eq!(sci("factorial(5)"), Ok("120".to_string()));
        assert_eq!(sci("pow(2, 0.5)"), Ok("1.414213562".to_string()));
        assert_eq!(sci("abs(-3.5) + round(2.5)"), Ok("6.5".to_string()));
        assert_eq!(sci("asin(1) * 2"), Ok("3.141592654".to_string()));
        assert_eq!(sci("pi"), Ok("3.141592654".to_string()));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(kind(calc("5/0", Mode::Basic, NumberSystem::Decimal)), Some(EvalErrorKind::DivideByZero));
        assert_eq!(kind(sci("sqrt(-4)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("ln(0)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("log(-1)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("asin(2)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("factorial(-1)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("factorial(1.5)")), Some(EvalErrorKind::DomainError));
        assert_eq!(kind(sci("factorial(171)")), Some(EvalErrorKind::Overflow));
        assert_eq!(kind(sci("exp(1000)")), Some(EvalErrorKind::Overflow));
        assert_eq!(kind(sci("foo + 1")), Some(EvalErrorKind::UnresolvedSymbol));
        assert_eq!(kind(sci("bar(1)")), Some(EvalErrorKind::UnresolvedSymbol));
    }

    #[test]
    fn test_programming() {
        let hex = |s: &str| calc(s, Mode::Programming, NumberSystem::Hexadecimal);
        assert_eq!(hex("FF AND 0F"), Ok("0F".to_string()));
        assert_eq!(hex("F0 OR 0F"), Ok("FF".to_string()));
        assert_eq!(hex("FF XOR 0F"), Ok("F0".to_string()));
        assert_eq!(hex("NOT 0"), Ok("FFFFFFFF".to_string()));
        assert_eq!(hex("1 << 8"), Ok("0100".to_string()));
        assert_eq!(hex("FFFFFFFF + 1"), Ok("00".to_string()));
        assert_eq!(hex("A * A"), Ok("64".to_string()));
        assert_eq!(hex("1 OR 2 AND 3"), Ok("03".to_string()));
        assert_eq!(hex("e"), Ok("0E".to_string()));
        assert_eq!(kind(hex("1 / 0")), Some(EvalErrorKind::DivideByZero));
        assert_eq!(kind(hex("100000000")), Some(EvalErrorKind::Overflow));
        assert_eq!(kind(hex("x")), Some(EvalErrorKind::UnresolvedSymbol));

        let dec = |s: &str| calc(s, Mode::Programming, NumberSystem::Decimal);
        assert_eq!(dec("7 / 2"), Ok("3".to_string()));
        assert_eq!(dec("2147483647 + 1"), Ok("-2147483648".to_string()));
        assert_eq!(dec("-5 >> 1"), Ok("2147483645".to_string()));
        assert_eq!(kind(dec("1.5 + 1")), Some(EvalErrorKind::DomainError));

        assert_eq!(calc("17 + 1", Mode::Programming, NumberSystem::Octal), Ok("20".to_string()));
        assert_eq!(calc("101 XOR 11", Mode::Programming, NumberSystem::Binary), Ok("110".to_string()));
    }

    #[test]
    fn test_financial_mode_is_plain_arithmetic() {
        let fin = |s: &str| calc(s, Mode::Financial, NumberSystem::Decimal);
        assert_eq!(fin("1000 * (1 + 0.05 / 12) ** 12"), Ok("1051.161898".to_string()));
        assert!(matches!(fin("sqrt(4)"), Err(CalcError::Syntax { .. })));
    }

    #[test]
    fn test_real_mode_with_radix() {
        // literals keep their radix even when the mode is real valued
        assert_eq!(
            calc("ff / 2", Mode::Scientific, NumberSystem::Hexadecimal),
            Ok("127.5".to_string())
        );
    }
}
