use std::collections::HashMap;

use crate::ast::*;
use crate::errors::*;

use lazy_static::lazy_static;

#[derive(Clone, Debug)]
enum Entry {
    Prefix(UnaryOp, usize),
    Infix(BinaryOp, i32, bool, usize),
    // bracket position and number of argument separators seen inside it
    OpenB(usize, usize),
    // name, arity (None for unknown names) and position
    Func(String, Option<usize>, usize),
}

/// Operator-precedence stack that turns an infix token sequence into a tree.
/// Operators wait in `queue` until an operator of lower priority (or a
/// closing bracket) arrives; then they are reduced with their operands from
/// `output` into a single node.
pub(crate) struct Stack {
    queue: Vec<Entry>,
    // nodes with their depth
    output: Vec<(Node, usize)>,
}

const PRI_PREFIX: i32 = 20;

/// Deepest expression tree the parser builds. Evaluation walks the tree
/// recursively, so deeper input is rejected as a syntax error.
pub const MAX_DEPTH: usize = 500;

lazy_static! {
    /// Builtin functions and the number of arguments they take
    static ref STD_FUNCS: HashMap<&'static str, usize> = [
        ("sin", 1),
        ("cos", 1),
        ("tan", 1),
        ("asin", 1),
        ("acos", 1),
        ("atan", 1),
        ("sqrt", 1),
        ("ln", 1),
        ("log", 1),
        ("exp", 1),
        ("abs", 1),
        ("round", 1),
        ("factorial", 1),
        ("pow", 2),
    ]
    .iter()
    .cloned()
    .collect();
}

const SEPARATOR_OUTSIDE_CALL: &str = "Argument separator outside of function call";

pub(crate) const CONSTANTS: [&str; 2] = ["pi", "e"];

impl Stack {
    /// Priority and right associativity of binary operators
    pub(crate) fn priority(op: BinaryOp) -> (i32, bool) {
        match op {
            BinaryOp::Pow => (17, true),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => (12, false),
            BinaryOp::Add | BinaryOp::Sub => (8, false),
            BinaryOp::Shl | BinaryOp::Shr => (6, false),
            BinaryOp::And => (5, false),
            BinaryOp::Xor => (4, false),
            BinaryOp::Or => (3, false),
        }
    }

    /// Number of arguments of a builtin function, `None` for other names
    pub(crate) fn func_arity(name: &str) -> Option<usize> {
        STD_FUNCS.get(name).copied()
    }

    pub(crate) fn is_const(name: &str) -> bool {
        CONSTANTS.contains(&name)
    }

    fn pop_operand(&mut self, pos: usize) -> CalcResult<(Node, usize)> {
        match self.output.pop() {
            Some(n) => Ok(n),
            None => Err(CalcError::syntax(pos, "Missing operand")),
        }
    }

    fn push_node(&mut self, node: Node, depth: usize, pos: usize) -> CalcResult<()> {
        if depth > MAX_DEPTH {
            return Err(CalcError::syntax(
                pos,
                format!("Expression is nested deeper than {} levels", MAX_DEPTH),
            ));
        }
        self.output.push((node, depth));
        Ok(())
    }

    // build a node from an operator and its operands on top of the output
    fn reduce(&mut self, e: Entry) -> CalcResult<()> {
        match e {
            Entry::Prefix(op, pos) => {
                let (child, d) = self.pop_operand(pos)?;
                self.push_node(Node::unary(op, child), d + 1, pos)?;
            }
            Entry::Infix(op, _, _, pos) => {
                let (right, dr) = self.pop_operand(pos)?;
                let (left, dl) = self.pop_operand(pos)?;
                self.push_node(Node::binary(op, left, right), dl.max(dr) + 1, pos)?;
            }
            Entry::OpenB(pos, _) => {
                return Err(CalcError::syntax(pos, "Closing bracket not found"));
            }
            Entry::Func(name, _, pos) => {
                return Err(CalcError::syntax(pos, format!("Closing bracket for function '{}' not found", name)));
            }
        }
        Ok(())
    }

    // reduce operators from the queue while the top operator in the
    // queue has greater priority (or equal one for left-associative)
    fn pop_while_priority(&mut self, priority: i32) -> CalcResult<()> {
        while let Some(e) = self.queue.pop() {
            let higher = match &e {
                Entry::Prefix(..) => PRI_PREFIX > priority,
                Entry::Infix(_, p, right, _) => *p > priority || (*p == priority && !*right),
                _ => false,
            };
            if !higher {
                self.queue.push(e);
                return Ok(());
            }
            self.reduce(e)?;
        }
        Ok(())
    }

    // reduce operators until the first open bracket and return the bracket
    fn pop_until_bracket(&mut self, pos: usize) -> CalcResult<(usize, usize)> {
        loop {
            match self.queue.pop() {
                None => return Err(CalcError::syntax(pos, "Mismatched closing bracket")),
                Some(Entry::OpenB(open, commas)) => return Ok((open, commas)),
                Some(e @ Entry::Func(..)) => {
                    self.queue.push(e);
                    return Err(CalcError::syntax(pos, "Mismatched closing bracket"));
                }
                Some(e) => self.reduce(e)?,
            }
        }
    }

    // ------------ PUBLIC -----------------

    pub(crate) fn new() -> Self {
        Stack {
            queue: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Pushes a leaf: a literal or a bare name
    pub(crate) fn push_value(&mut self, node: Node) {
        self.output.push((node, 1));
    }

    pub(crate) fn push_prefix(&mut self, op: UnaryOp, pos: usize) {
        self.queue.push(Entry::Prefix(op, pos));
    }

    pub(crate) fn push_infix(&mut self, op: BinaryOp, pos: usize) -> CalcResult<()> {
        let (pri, right_assoc) = Stack::priority(op);
        self.pop_while_priority(pri)?;
        self.queue.push(Entry::Infix(op, pri, right_assoc, pos));
        Ok(())
    }

    /// Pushes a function name; it must be followed by an open bracket
    pub(crate) fn push_func(&mut self, name: &str, arity: Option<usize>, pos: usize) {
        self.queue.push(Entry::Func(name.to_owned(), arity, pos));
    }

    pub(crate) fn open_bracket(&mut self, pos: usize) {
        self.queue.push(Entry::OpenB(pos, 0));
    }

    /// Returns true if the innermost open bracket starts a function call
    pub(crate) fn in_call(&self) -> bool {
        let len = self.queue.len();
        len >= 2
            && matches!(self.queue[len - 1], Entry::OpenB(..))
            && matches!(self.queue[len - 2], Entry::Func(..))
    }

    pub(crate) fn arg_separator(&mut self, pos: usize) -> CalcResult<()> {
        if !self.queue.iter().any(|e| matches!(e, Entry::OpenB(..))) {
            return Err(CalcError::syntax(pos, SEPARATOR_OUTSIDE_CALL));
        }
        let (open, commas) = self.pop_until_bracket(pos)?;
        self.queue.push(Entry::OpenB(open, commas + 1));
        if !self.in_call() {
            return Err(CalcError::syntax(pos, SEPARATOR_OUTSIDE_CALL));
        }
        Ok(())
    }

    /// Closes the innermost bracket. `empty` is set for `f()`
    pub(crate) fn close_bracket(&mut self, pos: usize, empty: bool) -> CalcResult<()> {
        let (_, commas) = self.pop_until_bracket(pos)?;
        let (name, arity, fpos) = match self.queue.last() {
            Some(Entry::Func(name, arity, fpos)) => (name.clone(), *arity, *fpos),
            _ => {
                if empty {
                    return Err(CalcError::syntax(pos, "Empty brackets"));
                }
                return Ok(());
            }
        };
        self.queue.pop();

        let argc = if empty { 0 } else { commas + 1 };
        if let Some(n) = arity {
            if n != argc {
                let plural = if n == 1 { "" } else { "s" };
                return Err(CalcError::syntax(
                    fpos,
                    format!("Function '{}' requires {} argument{}, {} given", name, n, plural, argc),
                ));
            }
        }
        if self.output.len() < argc {
            return Err(CalcError::syntax(pos, format!("Function '{}' requires an argument", name)));
        }
        let args = self.output.split_off(self.output.len() - argc);
        let depth = args.iter().map(|(_, d)| *d).max().unwrap_or(0) + 1;
        let args = args.into_iter().map(|(n, _)| n).collect();
        self.push_node(Node::Call(name, args), depth, fpos)
    }

    /// Reduces everything left in the queue. Must be called only after the
    /// expression ends
    pub(crate) fn finish(mut self, end: usize) -> CalcResult<Node> {
        while let Some(e) = self.queue.pop() {
            self.reduce(e)?;
        }
        let node = match self.output.pop() {
            Some((n, _)) => n,
            None => return Err(CalcError::syntax(end, "Nothing to calculate")),
        };
        if !self.output.is_empty() {
            return Err(CalcError::syntax(end, "Too many numbers"));
        }
        Ok(node)
    }
}
