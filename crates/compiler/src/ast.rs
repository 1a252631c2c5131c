//! Abstract syntax tree for Patito
//!
//! One variant per tagged tuple the grammar produces, matching the shapes
//! named in the external AST contract: `programa`, `vars`, `funcs`, `func`,
//! `cuerpo`, and the statement/expression tags. Exhaustive matching on these
//! enums is what replaces the tag-dispatch chains of the source this was
//! ported from.

/// Source-level type name, as spelled in a `vars`/parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Entero,
    Flotante,
    Nula,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Entero => "entero",
            TypeName::Flotante => "flotante",
            TypeName::Nula => "nula",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub names: Vec<String>,
    pub ty: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` means the function declares `nula` (void).
    pub ret: Option<TypeName>,
    pub vars: Vec<VarDecl>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub vars: Vec<VarDecl>,
    pub funcs: Vec<FuncDef>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintItem {
    Expr(Expr),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { name: String, expr: Expr },
    Print { items: Vec<PrintItem> },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    Call { name: String, args: Vec<Expr> },
    Return { expr: Option<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpSym {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
}

impl BinOpSym {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOpSym::Add => "+",
            BinOpSym::Sub => "-",
            BinOpSym::Mul => "*",
            BinOpSym::Div => "/",
            BinOpSym::Lt => "<",
            BinOpSym::Gt => ">",
            BinOpSym::Le => "<=",
            BinOpSym::Ge => ">=",
            BinOpSym::Eq => "==",
            BinOpSym::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpSym {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    Id(String),
    Bin {
        op: BinOpSym,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Relational comparisons are their own variant, as in the source
    /// grammar, even though they share `BinOpSym` with arithmetic — the
    /// cube does not care which variant produced the operator.
    Rel {
        op: BinOpSym,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOpSym, expr: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_round_trips_through_debug() {
        let program = Program {
            name: "P".to_string(),
            vars: vec![VarDecl {
                names: vec!["x".to_string()],
                ty: TypeName::Entero,
            }],
            funcs: vec![],
            body: vec![Stmt::Assign {
                name: "x".to_string(),
                expr: Expr::IntLit(1),
            }],
        };
        let dumped = format!("{program:?}");
        assert!(dumped.contains("IntLit(1)"));
    }
}
