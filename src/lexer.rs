use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;

use crate::context::NumberSystem;
use crate::errors::*;

#[derive(Parser)]
#[grammar = "calc.pest"]
struct CalcLexer;

/// Operators as they appear in the source text. Symbolic and keyword
/// spellings of the same operator map to one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `**` or `^`
    Power,
    Shl,
    Shr,
    /// `AND` or `&`
    And,
    /// `OR` or `|`
    Or,
    Xor,
    /// `NOT` or `~`
    Not,
}

impl Operator {
    fn from_symbol(s: &str) -> Option<Operator> {
        let op = match s.to_uppercase().as_str() {
            "+" => Operator::Plus,
            "-" => Operator::Minus,
            "*" => Operator::Star,
            "/" => Operator::Slash,
            "%" => Operator::Percent,
            "**" | "^" => Operator::Power,
            "<<" => Operator::Shl,
            ">>" => Operator::Shr,
            "&" | "AND" => Operator::And,
            "|" | "OR" => Operator::Or,
            "XOR" => Operator::Xor,
            "~" | "NOT" => Operator::Not,
            _ => return None,
        };
        Some(op)
    }

    /// Bit-level operators are valid only in programming mode
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Operator::Shl | Operator::Shr | Operator::And | Operator::Or | Operator::Xor | Operator::Not
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Literal digits, validated against `radix` by the grammar
    Number { text: String, radix: u32 },
    Operator(Operator),
    Identifier(String),
    LeftParen,
    RightParen,
    Comma,
}

/// A lexical token, its byte offset in the expression and its length
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize, len: usize) -> Self {
        Token { kind, position, len }
    }

    pub fn end(&self) -> usize {
        self.position + self.len
    }
}

/// Splits an expression into tokens. Which characters are digits depends on
/// `number_system`; in hexadecimal `A`..`F` (and so `e`) are digits.
pub fn tokenize(text: &str, number_system: NumberSystem) -> CalcResult<Vec<Token>> {
    let rule = match number_system {
        NumberSystem::Decimal => Rule::dec_tokens,
        NumberSystem::Hexadecimal => Rule::hex_tokens,
        NumberSystem::Octal => Rule::oct_tokens,
        NumberSystem::Binary => Rule::bin_tokens,
    };
    let radix = number_system.radix();

    let mut pairs = match CalcLexer::parse(rule, text) {
        Ok(p) => p,
        Err(e) => {
            let position = match e.location {
                InputLocation::Pos(p) => p,
                InputLocation::Span((p, _)) => p,
            };
            let found = match text.get(position..).and_then(|s| s.chars().next()) {
                Some(c) => c.to_string(),
                None => "end of input".to_string(),
            };
            return Err(CalcError::lex(position, found));
        }
    };

    let mut tokens = Vec::new();
    let root = match pairs.next() {
        Some(r) => r,
        None => return Ok(tokens),
    };
    for pair in root.into_inner() {
        if let Some(token) = to_token(pair, radix)? {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

fn to_token(pair: Pair<Rule>, radix: u32) -> CalcResult<Option<Token>> {
    let position = pair.as_span().start();
    let text = pair.as_str();
    let kind = match pair.as_rule() {
        Rule::dec_number | Rule::hex_number | Rule::oct_number | Rule::bin_number => TokenKind::Number {
            text: text.to_string(),
            radix,
        },
        Rule::keyword | Rule::operator => match Operator::from_symbol(text) {
            Some(op) => TokenKind::Operator(op),
            None => return Err(CalcError::lex(position, text)),
        },
        Rule::ident => TokenKind::Identifier(text.to_string()),
        Rule::open_b => TokenKind::LeftParen,
        Rule::close_b => TokenKind::RightParen,
        Rule::arg_sep => TokenKind::Comma,
        Rule::EOI => return Ok(None),
        _ => return Err(CalcError::lex(position, text)),
    };
    Ok(Some(Token::new(kind, position, text.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str, ns: NumberSystem) -> Vec<TokenKind> {
        tokenize(text, ns).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn num(text: &str, radix: u32) -> TokenKind {
        TokenKind::Number {
            text: text.to_string(),
            radix,
        }
    }

    #[test]
    fn test_decimal() {
        assert_eq!(
            kinds(" 2 ** 10 - 1.5e3", NumberSystem::Decimal),
            vec![
                num("2", 10),
                TokenKind::Operator(Operator::Power),
                num("10", 10),
                TokenKind::Operator(Operator::Minus),
                num("1.5e3", 10),
            ]
        );
        assert_eq!(
            kinds("sqrt(.5, pi)", NumberSystem::Decimal),
            vec![
                TokenKind::Identifier("sqrt".to_string()),
                TokenKind::LeftParen,
                num(".5", 10),
                TokenKind::Comma,
                TokenKind::Identifier("pi".to_string()),
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn test_longest_match() {
        assert_eq!(
            kinds("1<<2>>3^4", NumberSystem::Decimal),
            vec![
                num("1", 10),
                TokenKind::Operator(Operator::Shl),
                num("2", 10),
                TokenKind::Operator(Operator::Shr),
                num("3", 10),
                TokenKind::Operator(Operator::Power),
                num("4", 10),
            ]
        );
        // keywords are whole words only
        assert_eq!(
            kinds("orange or xor", NumberSystem::Decimal),
            vec![
                TokenKind::Identifier("orange".to_string()),
                TokenKind::Operator(Operator::Or),
                TokenKind::Operator(Operator::Xor),
            ]
        );
    }

    #[test]
    fn test_hexadecimal() {
        assert_eq!(
            kinds("FF AND 0f", NumberSystem::Hexadecimal),
            vec![
                num("FF", 16),
                TokenKind::Operator(Operator::And),
                num("0f", 16),
            ]
        );
        // `e` is a digit, `exp` is a name
        assert_eq!(
            kinds("e + exp", NumberSystem::Hexadecimal),
            vec![
                num("e", 16),
                TokenKind::Operator(Operator::Plus),
                TokenKind::Identifier("exp".to_string()),
            ]
        );
        assert_eq!(
            kinds("FF", NumberSystem::Decimal),
            vec![TokenKind::Identifier("FF".to_string())]
        );
    }

    #[test]
    fn test_octal_binary() {
        assert_eq!(
            kinds("17 | 1", NumberSystem::Octal),
            vec![num("17", 8), TokenKind::Operator(Operator::Or), num("1", 8)]
        );
        assert_eq!(
            kinds("~101", NumberSystem::Binary),
            vec![TokenKind::Operator(Operator::Not), num("101", 2)]
        );
        match tokenize("1 + 78", NumberSystem::Octal) {
            Err(CalcError::Lex { position, .. }) => assert!(position >= 4),
            other => panic!("unexpected {:?}", other),
        }
        assert!(tokenize("12", NumberSystem::Binary).is_err());
    }

    #[test]
    fn test_errors() {
        assert_eq!(tokenize("2 $ 3", NumberSystem::Decimal), Err(CalcError::lex(2, "$")));
        assert_eq!(tokenize("1.5", NumberSystem::Hexadecimal), Err(CalcError::lex(1, ".")));
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("10 +  pi", NumberSystem::Decimal).unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 6]);
        assert!(tokenize("   ", NumberSystem::Decimal).unwrap().is_empty());
    }
}
