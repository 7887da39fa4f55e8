use std::fmt;

/// Result of any engine operation
pub type CalcResult<T> = Result<T, CalcError>;

/// Reasons an expression tree fails to evaluate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    DivideByZero,
    DomainError,
    Overflow,
    UnresolvedSymbol,
}

/// Reasons a radix conversion fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionErrorKind {
    ParseError,
    UnsupportedBase,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalErrorKind::DivideByZero => write!(f, "DivideByZero"),
            EvalErrorKind::DomainError => write!(f, "DomainError"),
            EvalErrorKind::Overflow => write!(f, "Overflow"),
            EvalErrorKind::UnresolvedSymbol => write!(f, "UnresolvedSymbol"),
        }
    }
}

impl fmt::Display for ConversionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConversionErrorKind::ParseError => write!(f, "ParseError"),
            ConversionErrorKind::UnsupportedBase => write!(f, "UnsupportedBase"),
        }
    }
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CalcError {
    #[error("Unrecognized character '{found}' at position {position}")]
    Lex { position: usize, found: String },

    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("{message}")]
    Eval { kind: EvalErrorKind, message: String },

    #[error("Conversion error: {message}")]
    Conversion { kind: ConversionErrorKind, message: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl CalcError {
    pub fn lex(position: usize, found: impl Into<String>) -> Self {
        CalcError::Lex {
            position,
            found: found.into(),
        }
    }

    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        CalcError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn divide_by_zero(what: impl fmt::Display) -> Self {
        CalcError::Eval {
            kind: EvalErrorKind::DivideByZero,
            message: format!("'{}' divided by zero", what),
        }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        CalcError::Eval {
            kind: EvalErrorKind::DomainError,
            message: message.into(),
        }
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        CalcError::Eval {
            kind: EvalErrorKind::Overflow,
            message: message.into(),
        }
    }

    pub fn unresolved(name: &str) -> Self {
        CalcError::Eval {
            kind: EvalErrorKind::UnresolvedSymbol,
            message: format!("Symbol '{}' not found", name),
        }
    }

    pub fn bad_digits(text: &str, base: u32) -> Self {
        CalcError::Conversion {
            kind: ConversionErrorKind::ParseError,
            message: format!("'{}' is not a valid base {} number", text, base),
        }
    }

    pub fn unsupported_base(base: impl fmt::Display) -> Self {
        CalcError::Conversion {
            kind: ConversionErrorKind::UnsupportedBase,
            message: format!("Unsupported base: {}", base),
        }
    }

    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        CalcError::InvalidParameters(message.into())
    }

    /// Returns the evaluation error kind, if this is an evaluation error
    pub fn eval_kind(&self) -> Option<EvalErrorKind> {
        match self {
            CalcError::Eval { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Stable error name reported to callers next to the message
    pub fn kind_name(&self) -> String {
        match self {
            CalcError::Lex { .. } => "LexError".to_string(),
            CalcError::Syntax { .. } => "SyntaxError".to_string(),
            CalcError::Eval { kind, .. } => kind.to_string(),
            CalcError::Conversion { kind, .. } => kind.to_string(),
            CalcError::InvalidParameters(..) => "InvalidParameters".to_string(),
        }
    }
}
