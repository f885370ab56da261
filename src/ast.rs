#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq, // ==
    Ne, // !=
    Gt, // >
    Ge, // >=
    Lt, // <
    Le, // <=
}

impl CompareOp {
    /// Longest spellings first so `>=` is never read as `>`.
    pub const ALL: [(&'static str, CompareOp); 6] = [
        ("==", CompareOp::Eq),
        ("!=", CompareOp::Ne),
        (">=", CompareOp::Ge),
        ("<=", CompareOp::Le),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Str(String), // 'quoted'
    Bool(bool),
    Null,
    Number(f64),
    Path(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Blank expression; always false.
    Empty,
    Compare {
        left: String, // always a path
        op: CompareOp,
        right: Operand,
    },
    /// Bare path checked for truthiness.
    Exists(String),
    /// Looked like a comparison but did not parse as one; checked for
    /// truthiness like `Exists`.
    Malformed(String),
}
