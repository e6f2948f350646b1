//! Binding expression AST.
//!
//! The parser produces raw trees (`Identifier`, strict `Member`); the compiler
//! rewrites them into their evaluable form (`ScopeRef`, null-safe `Member`,
//! nested `Filter` applications) before interpreting them.

use lien_carton::{CompactString, SmallVec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `-x`
    Negate,
    /// `+x`
    Plus,
}

/// Binary operators, including the short-circuiting logical ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    And,
    Or,
}

impl BinaryOp {
    /// Binding power used by the precedence-climbing parser
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::StrictEq | Self::StrictNotEq => 3,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Rem => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNotEq => "!==",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Property part of a member access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    /// `a.name`
    Named(CompactString),
    /// `a[expr]`
    Computed(Box<Expr>),
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value (`1`, `'x'`, `true`, `null`)
    Literal(Value),
    /// Bare identifier as written in the source
    Identifier(CompactString),
    /// Identifier qualified against the scope chain
    ScopeRef(CompactString),
    /// `this`: the binding's scope itself
    This,
    /// Member access. `null_safe` accesses yield `null` on a missing object
    /// instead of failing.
    Member {
        object: Box<Expr>,
        property: Property,
        null_safe: bool,
    },
    /// `[a, b]`
    Array(Vec<Expr>),
    /// `{key: value}`
    Object(Vec<(CompactString, Expr)>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `test ? consequent : alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    /// Filter applied to an input: `name(input, args...)`
    Filter {
        name: CompactString,
        input: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Source that failed to parse; evaluating it fails
    Invalid {
        expression: CompactString,
        message: CompactString,
    },
}

impl Expr {
    pub fn member(object: Expr, name: &str) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Property::Named(CompactString::new(name)),
            null_safe: false,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// The dotted path this expression spells out, if it is nothing but
    /// identifiers joined by `.`.
    pub fn as_path(&self) -> Option<Path> {
        fn collect(expr: &Expr, out: &mut Path) -> bool {
            match expr {
                Expr::Identifier(name) | Expr::ScopeRef(name) => {
                    out.segments.push(name.clone());
                    true
                }
                Expr::Member {
                    object,
                    property: Property::Named(name),
                    ..
                } => {
                    if !collect(object, out) {
                        return false;
                    }
                    out.segments.push(name.clone());
                    true
                }
                _ => false,
            }
        }

        let mut path = Path::default();
        collect(self, &mut path).then_some(path)
    }
}

/// A filter invocation as written: `name:arg1:arg2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCall {
    pub name: CompactString,
    pub args: Vec<Expr>,
}

/// A full binding expression: head expression plus filter chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Original source text
    pub source: CompactString,
    /// The path expression before the first `|`
    pub head: Expr,
    /// Filters, applied left to right
    pub filters: Vec<FilterCall>,
}

/// A dotted assignable path (`user.profile.name`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub segments: SmallVec<[CompactString; 4]>,
}

impl Path {
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .map(|s| CompactString::new(s.trim()))
                .collect(),
        }
    }

    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Parsed `repeat` clause: `[key,] value in collection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatClause {
    /// Name bound to the entry key, when two variables are declared
    pub key_name: Option<CompactString>,
    /// Name bound to the entry value
    pub value_name: CompactString,
    /// Collection expression source
    pub collection: CompactString,
}
