//! Recursive-descent parser for Patito
//!
//! One token of lookahead, `Result`-based error propagation throughout (no
//! panics on malformed input). The grammar extends the fragment in
//! `examples/original_source/patito/parser.py` — whose `funcs` rule never
//! actually parsed a function body — with full function definitions:
//! parameters, return type, a local `vars` block and a body, per the
//! external AST contract.

use crate::ast::{BinOpSym, Expr, FuncDef, Param, PrintItem, Program, Stmt, TypeName, UnaryOpSym, VarDecl};
use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source).map_err(|e| ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        })?;
        Ok(Parser { tokens, pos: 0 })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        let tok = self.peek();
        ParseError {
            message: message.into(),
            line: tok.line,
            column: tok.column,
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if &self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.err(format!("expected {kind}, found {}", self.peek().kind)))
        }
    }

    fn expect_id(&mut self) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Id(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.err(format!("expected identifier, found {other}"))),
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Parse a full program: `programa ID ; vars funcs inicio body fin`.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(&TokenKind::Programa)?;
        let name = self.expect_id()?;
        self.expect(&TokenKind::Semicolon)?;
        let vars = self.parse_vars_block()?;
        let funcs = self.parse_funcs_block()?;
        self.expect(&TokenKind::Inicio)?;
        let body = self.parse_body(&[TokenKind::Fin])?;
        self.expect(&TokenKind::Fin)?;
        Ok(Program {
            name,
            vars,
            funcs,
            body,
        })
    }

    fn parse_type(&mut self) -> Result<TypeName, ParseError> {
        let ty = match &self.peek().kind {
            TokenKind::Entero => TypeName::Entero,
            TokenKind::Flotante => TypeName::Flotante,
            TokenKind::Nula => TypeName::Nula,
            other => return Err(self.err(format!("expected a type name, found {other}"))),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_vars_block(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        if !self.at(&TokenKind::Vars) {
            return Ok(Vec::new());
        }
        self.advance();
        self.expect(&TokenKind::Colon)?;
        let mut decls = Vec::new();
        while matches!(self.peek().kind, TokenKind::Id(_)) {
            decls.push(self.parse_var_decl()?);
        }
        Ok(decls)
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let mut names = vec![self.expect_id()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_id()?);
        }
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(VarDecl { names, ty })
    }

    fn parse_funcs_block(&mut self) -> Result<Vec<FuncDef>, ParseError> {
        if self.at(&TokenKind::Funcs) {
            self.advance();
            self.expect(&TokenKind::Colon)?;
        }
        let mut funcs = Vec::new();
        while self.at(&TokenKind::Func) {
            funcs.push(self.parse_func_def()?);
        }
        Ok(funcs)
    }

    fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        self.expect(&TokenKind::Func)?;
        let name = self.expect_id()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            params.push(self.parse_param()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                params.push(self.parse_param()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let ret_ty = self.parse_type()?;
        let ret = match ret_ty {
            TypeName::Nula => None,
            other => Some(other),
        };
        let vars = self.parse_vars_block()?;
        self.expect(&TokenKind::Inicio)?;
        let body = self.parse_body(&[TokenKind::Fin])?;
        self.expect(&TokenKind::Fin)?;
        if self.at(&TokenKind::Finf) {
            self.advance();
        }
        Ok(FuncDef {
            name,
            params,
            ret,
            vars,
            body,
        })
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let name = self.expect_id()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param { name, ty })
    }

    fn parse_body(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        while !terminators.contains(&self.peek().kind) && !self.at(&TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_braced_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let body = self.parse_body(&[TokenKind::RBrace])?;
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match &self.peek().kind {
            TokenKind::Escribe => self.parse_print(),
            TokenKind::Si => self.parse_if(),
            TokenKind::Mientras => self.parse_while(),
            TokenKind::Ret => self.parse_return(),
            TokenKind::Id(_) => self.parse_assign_or_call(),
            other => Err(self.err(format!("unexpected token {other} in statement position"))),
        }
    }

    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Escribe)?;
        self.expect(&TokenKind::LParen)?;
        let mut items = vec![self.parse_print_item()?];
        while self.at(&TokenKind::Comma) {
            self.advance();
            items.push(self.parse_print_item()?);
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Print { items })
    }

    fn parse_print_item(&mut self) -> Result<PrintItem, ParseError> {
        if let TokenKind::StrLit(s) = &self.peek().kind {
            let s = s.clone();
            self.advance();
            return Ok(PrintItem::Str(s));
        }
        Ok(PrintItem::Expr(self.parse_expr()?))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Si)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let then_body = self.parse_braced_body()?;
        let else_body = if self.at(&TokenKind::Sino) {
            self.advance();
            Some(self.parse_braced_body()?)
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Mientras)?;
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Haz)?;
        let body = self.parse_braced_body()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&TokenKind::Ret)?;
        let expr = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Return { expr })
    }

    fn parse_assign_or_call(&mut self) -> Result<Stmt, ParseError> {
        let name = self.expect_id()?;
        if self.at(&TokenKind::LParen) {
            let args = self.parse_call_args()?;
            self.expect(&TokenKind::Semicolon)?;
            return Ok(Stmt::Call { name, args });
        }
        self.expect(&TokenKind::Igual)?;
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Assign { name, expr })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.at(&TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    // expr := rel
    // rel  := arith ( relop arith )?
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_arith()?;
        let relop = match &self.peek().kind {
            TokenKind::Eq => Some(BinOpSym::Eq),
            TokenKind::Neq => Some(BinOpSym::Ne),
            TokenKind::Lt => Some(BinOpSym::Lt),
            TokenKind::Gt => Some(BinOpSym::Gt),
            TokenKind::Le => Some(BinOpSym::Le),
            TokenKind::Ge => Some(BinOpSym::Ge),
            _ => None,
        };
        let Some(op) = relop else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_arith()?;
        Ok(Expr::Rel {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Mas => BinOpSym::Add,
                TokenKind::Menos => BinOpSym::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Bin {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match &self.peek().kind {
                TokenKind::Mult => BinOpSym::Mul,
                TokenKind::Div => BinOpSym::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Bin {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.peek().kind {
            TokenKind::Mas => Some(UnaryOpSym::Plus),
            TokenKind::Menos => Some(UnaryOpSym::Minus),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::IntLit(v) => {
                self.advance();
                Ok(Expr::IntLit(v))
            }
            TokenKind::FloatLit(v) => {
                self.advance();
                Ok(Expr::FloatLit(v))
            }
            TokenKind::StrLit(s) => {
                self.advance();
                Ok(Expr::StrLit(s))
            }
            TokenKind::Id(name) => {
                self.advance();
                if self.at(&TokenKind::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Id(name))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            other => Err(self.err(format!("expected an expression, found {other}"))),
        }
    }
}

/// Parse a complete Patito program from source text.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_program_without_vars_block() {
        // Declaration-checking is a semantic concern, not a parse-time one;
        // the parser accepts `x` here even though nothing declared it.
        let program = parse("programa P; inicio x = 1; fin").unwrap();
        assert!(program.vars.is_empty());
        assert_eq!(program.body.len(), 1);
    }

    #[test]
    fn parses_program_with_vars_and_print() {
        let program = parse(
            r#"programa P;
            vars: x: entero;
            inicio
              x = 2 + 3 * 4;
              escribe(x);
            fin"#,
        )
        .unwrap();
        assert_eq!(program.name, "P");
        assert_eq!(program.vars.len(), 1);
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn parses_function_with_params_and_return() {
        let program = parse(
            r#"programa P;
            funcs:
              func suma(a: entero, b: entero): entero
              vars:
              inicio
                ret a + b;
              fin
            inicio
              escribe(suma(2, 3));
            fin"#,
        )
        .unwrap();
        assert_eq!(program.funcs.len(), 1);
        let f = &program.funcs[0];
        assert_eq!(f.name, "suma");
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.ret, Some(TypeName::Entero));
    }

    #[test]
    fn parses_if_else_and_while() {
        let program = parse(
            r#"programa P;
            vars: x: entero;
            inicio
              si (x > 0) { escribe("pos"); } sino { escribe("neg"); }
              mientras (x < 3) haz { x = x + 1; }
            fin"#,
        )
        .unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn precedence_multiplies_before_adding() {
        let program = parse("programa P; vars: x: entero; inicio x = 2 + 3 * 4; fin").unwrap();
        match &program.body[0] {
            Stmt::Assign { expr, .. } => match expr {
                Expr::Bin { op: BinOpSym::Add, right, .. } => {
                    assert!(matches!(**right, Expr::Bin { op: BinOpSym::Mul, .. }));
                }
                other => panic!("expected top-level addition, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_binary() {
        let program = parse("programa P; vars: x: entero; inicio x = -1 + 2; fin").unwrap();
        match &program.body[0] {
            Stmt::Assign { expr, .. } => {
                assert!(matches!(expr, Expr::Bin { op: BinOpSym::Add, .. }));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn malformed_program_is_a_parse_error_not_a_panic() {
        assert!(parse("programa P inicio fin").is_err());
    }
}
