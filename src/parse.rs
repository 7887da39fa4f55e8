use crate::ast::*;
use crate::context::{Context, Mode};
use crate::errors::*;
use crate::lexer::{tokenize, Operator, Token, TokenKind};
use crate::stack::Stack;

pub use crate::stack::MAX_DEPTH;

/// Functions and constants are real-valued and available only in these modes
fn names_allowed(mode: Mode) -> bool {
    matches!(mode, Mode::Basic | Mode::Scientific)
}

fn binary_op(op: Operator) -> Option<BinaryOp> {
    let b = match op {
        Operator::Plus => BinaryOp::Add,
        Operator::Minus => BinaryOp::Sub,
        Operator::Star => BinaryOp::Mul,
        Operator::Slash => BinaryOp::Div,
        Operator::Percent => BinaryOp::Rem,
        Operator::Power => BinaryOp::Pow,
        Operator::Shl => BinaryOp::Shl,
        Operator::Shr => BinaryOp::Shr,
        Operator::And => BinaryOp::And,
        Operator::Or => BinaryOp::Or,
        Operator::Xor => BinaryOp::Xor,
        Operator::Not => return None,
    };
    Some(b)
}

fn check_operator_mode(op: Operator, token: &Token, mode: Mode) -> CalcResult<()> {
    if op.is_bitwise() && !mode.is_integer() {
        return Err(CalcError::syntax(
            token.position,
            format!("Bitwise operator {:?} is only available in programming mode", op),
        ));
    }
    Ok(())
}

fn unexpected(token: &Token) -> CalcError {
    let what = match &token.kind {
        TokenKind::Number { text, .. } => format!("number '{}'", text),
        TokenKind::Identifier(name) => format!("name '{}'", name),
        TokenKind::Operator(op) => format!("operator {:?}", op),
        TokenKind::LeftParen => "'(': implicit multiplication is not supported".to_string(),
        TokenKind::RightParen => "')'".to_string(),
        TokenKind::Comma => "','".to_string(),
    };
    CalcError::syntax(token.position, format!("Unexpected {}", what))
}

/// Builds an expression tree from tokens, validating every operator and
/// name against `mode`.
///
/// Operators (starting from highest priority):
/// * unary `-`, unary `+`, `NOT` (`~`)
/// * function application
/// * `**` (`^`) - right associative
/// * `*`, `/`, `%`
/// * `+`, `-`
/// * `<<`, `>>`
/// * `AND` (`&`)
/// * `XOR`
/// * `OR` (`|`)
pub fn parse(tokens: &[Token], mode: Mode) -> CalcResult<Node> {
    let mut stk = Stack::new();
    // false right after a value or a closing bracket
    let mut expect_operand = true;
    let mut last_open = false;
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        match &token.kind {
            TokenKind::Number { text, radix } => {
                if !expect_operand {
                    return Err(unexpected(token));
                }
                stk.push_value(Node::literal(text, *radix));
                expect_operand = false;
            }
            TokenKind::Identifier(name) => {
                if !expect_operand {
                    return Err(unexpected(token));
                }
                let low = name.to_lowercase();
                let is_call = matches!(iter.peek(), Some(t) if t.kind == TokenKind::LeftParen);
                if let Some(arity) = Stack::func_arity(&low) {
                    if !names_allowed(mode) {
                        return Err(CalcError::syntax(
                            token.position,
                            format!("Function '{}' is not available in {} mode", low, mode),
                        ));
                    }
                    if !is_call {
                        return Err(CalcError::syntax(
                            token.end(),
                            format!("Function '{}' requires an argument in brackets", low),
                        ));
                    }
                    stk.push_func(&low, Some(arity), token.position);
                } else if Stack::is_const(&low) {
                    if !names_allowed(mode) {
                        return Err(CalcError::syntax(
                            token.position,
                            format!("Constant '{}' is not available in {} mode", low, mode),
                        ));
                    }
                    stk.push_value(Node::Call(low, Vec::new()));
                    expect_operand = false;
                } else if is_call {
                    // unknown function: resolved (and rejected) by the evaluator
                    stk.push_func(name, None, token.position);
                } else {
                    stk.push_value(Node::Call(name.clone(), Vec::new()));
                    expect_operand = false;
                }
            }
            TokenKind::LeftParen => {
                if !expect_operand {
                    return Err(unexpected(token));
                }
                stk.open_bracket(token.position);
            }
            TokenKind::RightParen => {
                if expect_operand {
                    if !(last_open && stk.in_call()) {
                        return Err(CalcError::syntax(token.position, "Missing operand before ')'"));
                    }
                    stk.close_bracket(token.position, true)?;
                } else {
                    stk.close_bracket(token.position, false)?;
                }
                expect_operand = false;
            }
            TokenKind::Comma => {
                if expect_operand {
                    return Err(CalcError::syntax(token.position, "Missing function argument"));
                }
                stk.arg_separator(token.position)?;
                expect_operand = true;
            }
            TokenKind::Operator(op) => {
                check_operator_mode(*op, token, mode)?;
                if expect_operand {
                    match op {
                        Operator::Minus => stk.push_prefix(UnaryOp::Neg, token.position),
                        Operator::Not => stk.push_prefix(UnaryOp::Not, token.position),
                        Operator::Plus => {}
                        _ => {
                            return Err(CalcError::syntax(
                                token.position,
                                format!("Missing operand before operator {:?}", op),
                            ))
                        }
                    }
                } else {
                    match binary_op(*op) {
                        Some(b) => stk.push_infix(b, token.position)?,
                        None => return Err(unexpected(token)),
                    }
                    expect_operand = true;
                }
            }
        }
        last_open = token.kind == TokenKind::LeftParen;
    }

    let end = tokens.last().map(|t| t.end()).unwrap_or(0);
    if expect_operand {
        if tokens.is_empty() {
            return Err(CalcError::syntax(0, "Nothing to calculate"));
        }
        return Err(CalcError::syntax(end, "Missing operand at the end of expression"));
    }
    stk.finish(end)
}

/// Tokenizes and parses an expression in the given context
pub fn parse_str(text: &str, ctx: Context) -> CalcResult<Node> {
    let tokens = tokenize(text, ctx.number_system)?;
    parse(&tokens, ctx.mode)
}
