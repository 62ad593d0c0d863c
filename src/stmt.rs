use std::rc::Rc;

use crate::expr::Expr;
use crate::token::Token;

/// Parameters and body shared by named functions and lambdas.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// `None` for lambdas.
    pub name: Option<Token>,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    /// Executed in the call's environment, without an extra block scope.
    pub body: Vec<Stmt>,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`crate::parser::Parser::parse`].
///
/// `for` loops do not appear here: the parser lowers them to `Block`/`While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement; the keyword is kept to anchor output failures.
    Print { keyword: Token, value: Expr },

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Named function declaration: `"fun" IDENT "(" params? ")" block`.
    Function {
        name: Token,
        declaration: Rc<FunctionDecl>,
    },

    /// `return` statement.  Absent value ⇒ `nil`.
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
}
