//! Abstract Syntax Tree node types for condition expressions

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not, // !
    Neg, // -
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,      // &&
    Or,       // ||
    StrictEq, // ===
    StrictNe, // !==
    Eq,       // ==
    Ne,       // !=
    Lt,       // <
    Lte,      // <=
    Gt,       // >
    Gte,      // >=
    Add,      // +
    Sub,      // -
    Mul,      // *
    Div,      // /
    Mod,      // %
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    LitBool {
        v: bool,
    },
    LitNum {
        v: f64,
    },
    LitStr {
        v: String,
    },
    LitNull,
    /// Context variable reference
    Ident {
        name: String,
    },
    /// `object.property`
    Member {
        object: Box<Expr>,
        property: String,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}
