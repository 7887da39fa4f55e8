use std::fmt;

/// Unparsed number literal. Conversion to a value is left to the evaluator
/// since it depends on the mode: a real in basic/scientific/financial, a
/// fixed-width integer in programming mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub text: String,
    pub radix: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

/// Expression tree. Children are owned, so the tree cannot contain cycles.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Literal(Number),
    UnaryOp(UnaryOp, Box<Node>),
    BinaryOp(BinaryOp, Box<Node>, Box<Node>),
    /// Function call; constants and other bare names have no arguments
    Call(String, Vec<Node>),
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "NOT ",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "AND",
            BinaryOp::Xor => "XOR",
            BinaryOp::Or => "OR",
        }
    }
}

impl Node {
    pub fn literal(text: &str, radix: u32) -> Node {
        Node::Literal(Number {
            text: text.to_string(),
            radix,
        })
    }

    pub fn unary(op: UnaryOp, child: Node) -> Node {
        Node::UnaryOp(op, Box::new(child))
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::BinaryOp(op, Box::new(left), Box::new(right))
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Node::Literal(..) => 1,
            Node::UnaryOp(_, child) => 1 + child.size(),
            Node::BinaryOp(_, l, r) => 1 + l.size() + r.size(),
            Node::Call(_, args) => 1 + args.iter().map(Node::size).sum::<usize>(),
        }
    }
}

/// Fully parenthesised form, e.g. `(1 OR (2 AND 3))`
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Literal(n) => write!(f, "{}", n.text),
            Node::UnaryOp(op, child) => write!(f, "({}{})", op.symbol(), child),
            Node::BinaryOp(op, l, r) => write!(f, "({} {} {})", l, op.symbol(), r),
            Node::Call(name, args) => {
                if args.is_empty() {
                    return write!(f, "{}", name);
                }
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
