use std::{
    fmt::Display,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a variable-referencing expression node.
///
/// Unique across every parser in the process. The resolver records binding
/// distances under this id and the interpreter looks them up again, so two
/// textually identical references stay distinct even when they come from
/// different parsers feeding one interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    pub(crate) fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    Print {
        expression: Expression,
        line: usize,
    },
    Assert {
        expression: Expression,
        line: usize,
    },
    VarDeclaration {
        name: String,
        initializer: Option<Expression>,
        line: usize,
    },
    FunctionDeclaration(Rc<FunctionDecl>),
    Block(Vec<Statement>),
    If(Expression, Box<Statement>, Option<Box<Statement>>),
    While(Expression, Box<Statement>),
    Return {
        value: Option<Expression>,
        line: usize,
    },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Grouping(Box<Expression>),
    Unary {
        operator: UnaryOperator,
        right: Box<Expression>,
        line: usize,
    },
    Binary {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
        line: usize,
    },
    Logical {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
    },
    Variable {
        id: ExprId,
        name: String,
        line: usize,
    },
    Assign {
        id: ExprId,
        name: String,
        value: Box<Expression>,
        line: usize,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Prefix S-expression form, e.g. `(+ (+ 1 2) 3)`.
impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Grouping(expr) => write!(f, "(group {})", expr),
            Expression::Unary {
                operator, right, ..
            } => write!(f, "({} {})", operator, right),
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", operator, left, right),
            Expression::Logical {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", operator, left, right),
            Expression::Variable { name, .. } => write!(f, "{}", name),
            Expression::Assign { name, value, .. } => write!(f, "(= {} {})", name, value),
            Expression::Call {
                callee, arguments, ..
            } => {
                write!(f, "(call {}", callee)?;
                for argument in arguments {
                    write!(f, " {}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{}", s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfixOperator::Equal => write!(f, "=="),
            InfixOperator::NotEqual => write!(f, "!="),
            InfixOperator::LessThan => write!(f, "<"),
            InfixOperator::LessThanOrEqual => write!(f, "<="),
            InfixOperator::GreaterThan => write!(f, ">"),
            InfixOperator::GreaterThanOrEqual => write!(f, ">="),
            InfixOperator::Plus => write!(f, "+"),
            InfixOperator::Minus => write!(f, "-"),
            InfixOperator::Multiply => write!(f, "*"),
            InfixOperator::Divide => write!(f, "/"),
        }
    }
}

impl Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "and"),
            LogicalOperator::Or => write!(f, "or"),
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}
