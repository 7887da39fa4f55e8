//! # Multi-mode calculator engine
//!
//! The engine evaluates text expressions in one of four modes and keeps a
//! per-session history of everything it calculated. The mode and the number
//! system travel together as a `Context`:
//! * `basic` and `scientific` - real numbers (`f64`), functions and constants
//! * `financial` - real-number arithmetic only; the formulas are separate
//!   operations (see below)
//! * `programming` - 32-bit two's-complement integers, wrapping arithmetic,
//!   and bitwise operators
//!
//! Literals are read in the number system of the request: in hexadecimal
//! `FF`, `a0`, and even `e` are numbers. Results of programming mode are shown
//! in the same number system; negative values print as their unsigned 32-bit
//! pattern outside decimal (`-1` is `FFFFFFFF`).
//!
//! The list of supported functions (basic and scientific modes):
//! * trigonometric functions (including inverted ones): sin, cos, tan, asin, acos, atan
//! * square root: sqrt
//! * exponent, logarithms: exp, ln, log (base 10)
//! * absolute value and rounding: abs, round
//! * factorial of an integer from 0 to 170: factorial
//! * power: pow(x, y)
//!
//! Operators (starting from highest priority):
//! * `-`, `+`, `NOT` (`~`) - unary operators
//! * `**` (`^`) - power, right associative
//! * `*`, `/`, `%` - multiplication, division, remainder
//! * `+`, `-` - addition, subtraction
//! * `<<`, `>>` - logical shifts (programming mode)
//! * `AND` (`&`) - bitwise AND (programming mode)
//! * `XOR` - bitwise XOR (programming mode)
//! * `OR` (`|`) - bitwise OR (programming mode)
//!
//! Expressions may nest at most `parse::MAX_DEPTH` (500) operators or calls
//! deep; parentheses do not count. Deeper input is a syntax error.
//!
//! Predefined constants:
//! * `pi` - 3.14159...
//! * `e` - 2.71828...
//!
//! Besides expressions the engine converts integers between bases 2, 8, 10,
//! and 16 with arbitrary precision, and computes compound interest, loan
//! payments, and present values. `router` exposes all operations as JSON
//! requests.
//!
//! ```
//! use rclc_engine::{CalculationRequest, Engine, Mode, NumberSystem};
//!
//! let engine = Engine::default();
//! let req = CalculationRequest::new("FF AND 0F", Mode::Programming, NumberSystem::Hexadecimal);
//! assert_eq!(engine.calculate(&req).formatted_result, "0F");
//! ```

#[macro_use]
extern crate pest_derive;

pub mod ast;
pub mod config;
pub mod context;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod financial;
pub mod history;
pub mod lexer;
pub mod parse;
pub mod radix;
pub mod router;
mod stack;
pub mod value;

pub use config::EngineConfig;
pub use context::{Context, Mode, NumberSystem};
pub use engine::{CalculationRequest, CalculationResult, Engine};
pub use errors::{CalcError, CalcResult, ConversionErrorKind, EvalErrorKind};
pub use history::{HistoryEntry, HistoryFilter, HistoryStore};
pub use value::EvalValue;
