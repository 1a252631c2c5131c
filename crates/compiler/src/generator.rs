//! Quadruple generator
//!
//! A single pass over the AST that does type-checking and code generation
//! together, mirroring `QuadGenerator` in
//! `examples/original_source/patito/semantico.py`. Functions are
//! predeclared so forward calls resolve; the initial `GOTO` to `main` is
//! emitted as a placeholder and patched once the real entry point is known;
//! calls to not-yet-generated functions register a pending fixup patched
//! once generation finishes.

use crate::ast::{BinOpSym, Expr, FuncDef, Program, PrintItem, Stmt, TypeName, UnaryOpSym, VarDecl};
use crate::error::SemanticError;
use crate::symtable::{FuncDirectory, VarInfo, VarTable};
use patito_core::address::ConstValue;
use patito_core::quad::{BinOp, Op, QuadIndex, Quadruple, UnaryOp};
use patito_core::{Segment, SemanticCube, Type, VirtualAddress, VirtualMemory};
use std::collections::HashMap;

/// Everything the driver needs to print the virtual-address/function/
/// constant tables and to hand the quadruple stream to the machine.
#[derive(Debug)]
pub struct Generated {
    pub quads: Vec<Quadruple>,
    pub global_vars: VarTable,
    pub funcs: FuncDirectory,
    pub memory: VirtualMemory,
    pub main_temp_usage: HashMap<Type, i64>,
}

fn to_core_type(name: TypeName) -> Option<Type> {
    match name {
        TypeName::Entero => Some(Type::Int),
        TypeName::Flotante => Some(Type::Float),
        TypeName::Nula => None,
    }
}

struct Generator {
    memory: VirtualMemory,
    global_vars: VarTable,
    funcs: FuncDirectory,
    current_vars: VarTable,
    current_func: Option<String>,
    quads: Vec<Quadruple>,
    pending_gosubs: HashMap<String, Vec<QuadIndex>>,
    operand_stack: Vec<VirtualAddress>,
    type_stack: Vec<Type>,
    /// Tracked for parity with the three-stack shunting algorithm this was
    /// ported from; the grammar has no operator precedence ambiguity left
    /// to resolve at generation time, so nothing is ever pushed onto it.
    operator_stack: Vec<BinOp>,
}

impl Generator {
    fn new() -> Self {
        Generator {
            memory: VirtualMemory::new(),
            global_vars: VarTable::new(),
            funcs: FuncDirectory::new(),
            current_vars: VarTable::new(),
            current_func: None,
            quads: Vec::new(),
            pending_gosubs: HashMap::new(),
            operand_stack: Vec::new(),
            type_stack: Vec::new(),
            operator_stack: Vec::new(),
        }
    }

    fn reset_stacks(&mut self) {
        self.operand_stack.clear();
        self.type_stack.clear();
        self.operator_stack.clear();
    }

    fn lookup_var(&self, name: &str) -> Option<&VarInfo> {
        if self.current_func.is_some() {
            if let Some(v) = self.current_vars.lookup(name) {
                return Some(v);
            }
        }
        self.global_vars.lookup(name)
    }

    fn declare_vars_block(&mut self, decls: &[VarDecl]) -> Result<(), SemanticError> {
        let in_function = self.current_func.is_some();
        let segment = if in_function { Segment::Local } else { Segment::Global };
        for decl in decls {
            let Some(ty) = to_core_type(decl.ty) else {
                return Err(SemanticError("type 'nula' is not valid for a variable".to_string()));
            };
            for name in &decl.names {
                let addr = self.memory.alloc_var(ty, segment)?;
                if in_function {
                    self.current_vars.declare(name, ty, addr)?;
                } else {
                    self.global_vars.declare(name, ty, addr)?;
                }
            }
        }
        Ok(())
    }

    fn predeclare_funcs(&mut self, funcs: &[FuncDef]) -> Result<(), SemanticError> {
        for func in funcs {
            let ret_type = func.ret.and_then(to_core_type);
            let param_types: Vec<Type> = func
                .params
                .iter()
                .map(|p| to_core_type(p.ty).unwrap_or(Type::Void))
                .collect();
            if param_types.iter().any(|&t| t == Type::Void) {
                return Err(SemanticError("a parameter cannot have type 'nula'".to_string()));
            }
            self.funcs.declare(&func.name, ret_type, param_types)?;
        }
        Ok(())
    }

    fn generate(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.predeclare_funcs(&program.funcs)?;
        self.declare_vars_block(&program.vars)?;

        self.quads.push(Quadruple::new(Op::Goto { target: 0 }));
        let jump_main_idx = 0;

        for func in &program.funcs {
            self.gen_func(func)?;
        }

        self.memory.reset_locals();
        self.current_vars = VarTable::new();
        self.current_func = None;
        let main_start = self.quads.len();
        self.quads[jump_main_idx] = Quadruple::new(Op::Goto { target: main_start });

        for stmt in &program.body {
            self.gen_stmt(stmt)?;
        }

        self.patch_pending_gosubs()?;
        Ok(())
    }

    fn patch_pending_gosubs(&mut self) -> Result<(), SemanticError> {
        for (name, indices) in self.pending_gosubs.drain() {
            let start_quad = self
                .funcs
                .get(&name)
                .and_then(|f| f.start_quad)
                .ok_or_else(|| SemanticError(format!("function '{name}' called but never defined")))?;
            for idx in indices {
                if let Op::Gosub { entry, .. } = &mut self.quads[idx].op {
                    *entry = start_quad;
                }
            }
        }
        Ok(())
    }

    fn gen_func(&mut self, func: &FuncDef) -> Result<(), SemanticError> {
        let sig = self
            .funcs
            .get(&func.name)
            .cloned()
            .ok_or_else(|| SemanticError(format!("function '{}' not declared", func.name)))?;

        self.memory.reset_locals();
        self.current_func = Some(func.name.clone());
        self.current_vars = VarTable::new();

        let ret_addr = match sig.ret_type {
            Some(ret_ty) => Some(self.memory.alloc_var(ret_ty, Segment::Global)?),
            None => None,
        };
        self.funcs.get_mut(&func.name).expect("predeclared above").ret_addr = ret_addr;

        let mut params = Vec::with_capacity(func.params.len());
        for (param, &expected_ty) in func.params.iter().zip(sig.param_types.iter()) {
            let ty = to_core_type(param.ty)
                .ok_or_else(|| SemanticError(format!("parameter '{}' cannot have type 'nula'", param.name)))?;
            if ty != expected_ty {
                return Err(SemanticError(format!(
                    "parameter '{}' type does not match the function signature",
                    param.name
                )));
            }
            let addr = self.memory.alloc_var(ty, Segment::Local)?;
            self.current_vars.declare(&param.name, ty, addr)?;
            params.push(VarInfo {
                name: param.name.clone(),
                ty,
                addr,
            });
        }

        self.declare_vars_block(&func.vars)?;

        // Recorded before the body is walked, matching `semantico.py`'s
        // `_gen_func` (sets `finfo.start_quad` before generating the body),
        // so a direct-recursive call resolves its own entry immediately
        // instead of going through `pending_gosubs`.
        let start_quad = self.quads.len();
        self.funcs.get_mut(&func.name).expect("predeclared above").start_quad = Some(start_quad);

        for stmt in &func.body {
            self.gen_stmt(stmt)?;
        }
        let locals_count = self.memory.usage(Segment::Local);
        let temps_count = self.memory.usage(Segment::Temp);
        self.quads.push(Quadruple::new(Op::EndFunc));

        let info = self.funcs.get_mut(&func.name).expect("predeclared above");
        info.vars = std::mem::take(&mut self.current_vars);
        info.params = params;
        info.locals_count = locals_count;
        info.temps_count = temps_count;

        self.current_func = None;
        self.current_vars = VarTable::new();
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Assign { name, expr } => {
                let vinfo = self
                    .lookup_var(name)
                    .cloned()
                    .ok_or_else(|| SemanticError(format!("variable '{name}' not declared")))?;
                self.reset_stacks();
                let (res, t) = self.gen_expr(expr)?;
                if !Type::assign_ok(vinfo.ty, t) {
                    return Err(SemanticError(format!(
                        "incompatible types in assignment to '{name}': {} := {t}",
                        vinfo.ty
                    )));
                }
                self.quads.push(Quadruple::new(Op::Assign { src: res, dst: vinfo.addr }));
                Ok(())
            }
            Stmt::Print { items } => {
                for item in items {
                    match item {
                        PrintItem::Str(s) => {
                            let addr = self.memory.alloc_const(ConstValue::Str(s.clone()), Type::String)?;
                            self.quads.push(Quadruple::new(Op::Print { addr }));
                        }
                        PrintItem::Expr(expr) => {
                            self.reset_stacks();
                            let (res, _) = self.gen_expr(expr)?;
                            self.quads.push(Quadruple::new(Op::Print { addr: res }));
                        }
                    }
                }
                Ok(())
            }
            Stmt::Call { name, args } => {
                self.emit_call(name, args, false)?;
                Ok(())
            }
            Stmt::Return { expr } => self.emit_return(expr.as_ref()),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => self.gen_if(cond, then_body, else_body.as_deref()),
            Stmt::While { cond, body } => self.gen_while(cond, body),
        }
    }

    fn gen_if(
        &mut self,
        cond: &Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> Result<(), SemanticError> {
        self.reset_stacks();
        let (cond_addr, cond_ty) = self.gen_expr(cond)?;
        if cond_ty != Type::Bool {
            return Err(SemanticError("the condition of 'si' must be bool".to_string()));
        }
        self.quads.push(Quadruple::new(Op::GotoFalse {
            cond: cond_addr,
            target: 0,
        }));
        let gotof_idx = self.quads.len() - 1;

        for stmt in then_body {
            self.gen_stmt(stmt)?;
        }

        if let Some(else_body) = else_body {
            self.quads.push(Quadruple::new(Op::Goto { target: 0 }));
            let end_idx = self.quads.len() - 1;
            self.patch_goto_false(gotof_idx, self.quads.len());
            for stmt in else_body {
                self.gen_stmt(stmt)?;
            }
            self.patch_goto(end_idx, self.quads.len());
        } else {
            self.patch_goto_false(gotof_idx, self.quads.len());
        }
        Ok(())
    }

    fn gen_while(&mut self, cond: &Expr, body: &[Stmt]) -> Result<(), SemanticError> {
        let loop_start = self.quads.len();
        self.reset_stacks();
        let (cond_addr, cond_ty) = self.gen_expr(cond)?;
        if cond_ty != Type::Bool {
            return Err(SemanticError("the condition of 'mientras' must be bool".to_string()));
        }
        self.quads.push(Quadruple::new(Op::GotoFalse {
            cond: cond_addr,
            target: 0,
        }));
        let gotof_idx = self.quads.len() - 1;

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.quads.push(Quadruple::new(Op::Goto { target: loop_start }));
        self.patch_goto_false(gotof_idx, self.quads.len());
        Ok(())
    }

    fn patch_goto(&mut self, idx: QuadIndex, target: QuadIndex) {
        if let Op::Goto { target: t } = &mut self.quads[idx].op {
            *t = target;
        }
    }

    fn patch_goto_false(&mut self, idx: QuadIndex, target: QuadIndex) {
        if let Op::GotoFalse { target: t, .. } = &mut self.quads[idx].op {
            *t = target;
        }
    }

    fn emit_return(&mut self, expr: Option<&Expr>) -> Result<(), SemanticError> {
        let func_name = self
            .current_func
            .clone()
            .ok_or_else(|| SemanticError("'ret' is only valid inside a function".to_string()))?;
        let sig = self.funcs.get(&func_name).cloned().expect("current function is declared");

        match expr {
            None => {
                if sig.ret_type.is_some() {
                    return Err(SemanticError(format!("function '{func_name}' must return a value")));
                }
                self.quads.push(Quadruple::new(Op::Return { value: None, slot: None }));
                Ok(())
            }
            Some(expr) => {
                let Some(ret_type) = sig.ret_type else {
                    return Err(SemanticError(format!("function '{func_name}' must not return a value")));
                };
                self.reset_stacks();
                let (res, t) = self.gen_expr(expr)?;
                if !Type::assign_ok(ret_type, t) {
                    return Err(SemanticError(format!(
                        "invalid return type: expected {ret_type}, got {t}"
                    )));
                }
                self.quads.push(Quadruple::new(Op::Return {
                    value: Some(res),
                    slot: sig.ret_addr,
                }));
                Ok(())
            }
        }
    }

    fn emit_call(&mut self, name: &str, args: &[Expr], expect_value: bool) -> Result<(Option<VirtualAddress>, Option<Type>), SemanticError> {
        let sig = self
            .funcs
            .get(name)
            .cloned()
            .ok_or_else(|| SemanticError(format!("function '{name}' not declared")))?;
        if args.len() != sig.param_types.len() {
            return Err(SemanticError(format!(
                "function '{name}' expects {} parameters, got {}",
                sig.param_types.len(),
                args.len()
            )));
        }

        self.quads.push(Quadruple::new(Op::Era { func: name.to_string() }));
        for (idx, (arg, &expected_ty)) in args.iter().zip(sig.param_types.iter()).enumerate() {
            let (res, t) = self.eval_arg(arg)?;
            if !Type::assign_ok(expected_ty, t) {
                return Err(SemanticError(format!(
                    "invalid type for argument {idx} in call to '{name}'"
                )));
            }
            self.quads.push(Quadruple::new(Op::Param { src: res, index: idx }));
        }

        let entry = match sig.start_quad {
            Some(addr) => addr,
            None => {
                self.pending_gosubs.entry(name.to_string()).or_default().push(self.quads.len());
                0
            }
        };
        self.quads.push(Quadruple::new(Op::Gosub {
            func: name.to_string(),
            entry,
        }));

        if let (Some(ret_type), true) = (sig.ret_type, expect_value) {
            let temp = self.new_temp(ret_type)?;
            self.quads.push(Quadruple::new(Op::Assign {
                src: sig.ret_addr.expect("function with a return type has a return slot"),
                dst: temp,
            }));
            return Ok((Some(temp), Some(ret_type)));
        }
        Ok((None, None))
    }

    /// Evaluate a call argument in a fresh set of expression stacks, then
    /// restore the caller's stacks. Matches the saved/restored globals in
    /// `_eval_arg` of the source this was ported from.
    fn eval_arg(&mut self, expr: &Expr) -> Result<(VirtualAddress, Type), SemanticError> {
        let saved_operands = std::mem::take(&mut self.operand_stack);
        let saved_types = std::mem::take(&mut self.type_stack);
        let saved_ops = std::mem::take(&mut self.operator_stack);
        let result = self.gen_expr(expr);
        self.operand_stack = saved_operands;
        self.type_stack = saved_types;
        self.operator_stack = saved_ops;
        result
    }

    fn new_temp(&mut self, ty: Type) -> Result<VirtualAddress, SemanticError> {
        Ok(self.memory.alloc_temp(ty)?)
    }

    fn gen_expr(&mut self, expr: &Expr) -> Result<(VirtualAddress, Type), SemanticError> {
        self.walk_expr(expr)?;
        let res = self
            .operand_stack
            .pop()
            .ok_or_else(|| SemanticError("empty expression".to_string()))?;
        let t = self.type_stack.pop().expect("operand and type stacks stay in lockstep");
        self.operator_stack.clear();
        Ok((res, t))
    }

    fn walk_expr(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        match expr {
            Expr::IntLit(v) => {
                let addr = self.memory.alloc_const(ConstValue::Int(*v), Type::Int)?;
                self.operand_stack.push(addr);
                self.type_stack.push(Type::Int);
                Ok(())
            }
            Expr::FloatLit(v) => {
                let addr = self.memory.alloc_const(ConstValue::Float(*v), Type::Float)?;
                self.operand_stack.push(addr);
                self.type_stack.push(Type::Float);
                Ok(())
            }
            Expr::StrLit(s) => {
                let addr = self.memory.alloc_const(ConstValue::Str(s.clone()), Type::String)?;
                self.operand_stack.push(addr);
                self.type_stack.push(Type::String);
                Ok(())
            }
            Expr::Id(name) => {
                let vinfo = self
                    .lookup_var(name)
                    .cloned()
                    .ok_or_else(|| SemanticError(format!("variable '{name}' not declared")))?;
                self.operand_stack.push(vinfo.addr);
                self.type_stack.push(vinfo.ty);
                Ok(())
            }
            Expr::Bin { op, left, right } | Expr::Rel { op, left, right } => {
                self.walk_expr(left)?;
                self.walk_expr(right)?;
                self.make_binary(*op)
            }
            Expr::Unary { op, expr } => {
                self.walk_expr(expr)?;
                self.make_unary(*op)
            }
            Expr::Call { name, args } => {
                let (temp, ty) = self.emit_call(name, args, true)?;
                match (temp, ty) {
                    (Some(temp), Some(ty)) => {
                        self.operand_stack.push(temp);
                        self.type_stack.push(ty);
                        Ok(())
                    }
                    _ => Err(SemanticError(format!("function '{name}' does not return a value"))),
                }
            }
        }
    }

    fn make_binary(&mut self, op: BinOpSym) -> Result<(), SemanticError> {
        let right = self.operand_stack.pop().expect("checked by caller's expr structure");
        let tr = self.type_stack.pop().unwrap();
        let left = self.operand_stack.pop().expect("checked by caller's expr structure");
        let tl = self.type_stack.pop().unwrap();
        let cube = SemanticCube::get();
        let result_ty = cube
            .result_type(op.symbol(), tl, tr)
            .ok_or_else(|| SemanticError(format!("invalid operation '{}' for types {tl} and {tr}", op.symbol())))?;
        let temp = self.new_temp(result_ty)?;
        let binop = BinOp::from_symbol(op.symbol()).expect("ast and quad operator symbols match");
        self.quads.push(Quadruple::new(Op::Binary {
            op: binop,
            left,
            right,
            result: temp,
        }));
        self.operand_stack.push(temp);
        self.type_stack.push(result_ty);
        Ok(())
    }

    fn make_unary(&mut self, op: UnaryOpSym) -> Result<(), SemanticError> {
        let operand = self.operand_stack.pop().expect("checked by caller's expr structure");
        let t = self.type_stack.pop().unwrap();
        if !t.is_numeric() {
            return Err(SemanticError(format!("unary operator does not apply to {t}")));
        }
        let temp = self.new_temp(t)?;
        let unop = match op {
            UnaryOpSym::Plus => UnaryOp::Plus,
            UnaryOpSym::Minus => UnaryOp::Minus,
        };
        self.quads.push(Quadruple::new(Op::Unary {
            op: unop,
            operand,
            result: temp,
        }));
        self.operand_stack.push(temp);
        self.type_stack.push(t);
        Ok(())
    }
}

/// Type-check and lower a program into a flat quadruple stream.
pub fn generate(program: &Program) -> Result<Generated, SemanticError> {
    generate_with_capacity(program, None)
}

/// As [`generate`], but overriding the per-`(segment, type)` cell capacity
/// (default 1000) the virtual memory allocator enforces.
pub fn generate_with_capacity(program: &Program, capacity: Option<i64>) -> Result<Generated, SemanticError> {
    let mut gen_ = Generator::new();
    if let Some(capacity) = capacity {
        gen_.memory = VirtualMemory::with_capacity(capacity);
    }
    gen_.generate(program)?;
    let main_temp_usage = gen_.memory_temp_usage();
    Ok(Generated {
        quads: gen_.quads,
        global_vars: gen_.global_vars,
        funcs: gen_.funcs,
        memory: gen_.memory,
        main_temp_usage,
    })
}

impl Generator {
    fn memory_temp_usage(&self) -> HashMap<Type, i64> {
        self.memory.usage(Segment::Temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn gen_(src: &str) -> Generated {
        let program = parse(src).unwrap();
        generate(&program).unwrap()
    }

    fn gen_err(src: &str) -> SemanticError {
        let program = parse(src).unwrap();
        generate(&program).unwrap_err()
    }

    #[test]
    fn assignment_emits_widening_copy() {
        let g = gen_("programa P; vars: x: flotante; inicio x = 2; fin");
        let has_assign = g.quads.iter().any(|q| matches!(q.op, Op::Assign { .. }));
        assert!(has_assign);
    }

    #[test]
    fn narrowing_assignment_is_rejected() {
        let err = gen_err("programa P; vars: x: entero; inicio x = 2.5; fin");
        assert!(err.0.contains("incompatible"));
    }

    #[test]
    fn undeclared_variable_is_an_error() {
        let err = gen_err("programa P; inicio x = 1; fin");
        assert!(err.0.contains("not declared"));
    }

    #[test]
    fn if_condition_must_be_bool() {
        let err = gen_err("programa P; vars: x: entero; inicio si (x) { escribe(x); } fin");
        assert!(err.0.contains("bool"));
    }

    #[test]
    fn while_loop_jumps_back_to_condition() {
        let g = gen_(
            r#"programa P;
            vars: x: entero;
            inicio
              mientras (x < 3) haz { x = x + 1; }
            fin"#,
        );
        let goto_targets: Vec<usize> = g
            .quads
            .iter()
            .filter_map(|q| match q.op {
                Op::Goto { target } => Some(target),
                _ => None,
            })
            .collect();
        assert!(goto_targets.contains(&1));
    }

    #[test]
    fn forward_call_is_patched_after_generation() {
        let g = gen_(
            r#"programa P;
            funcs:
              func f(): nula
              vars:
              inicio
                escribe(g());
              fin
              func g(): entero
              vars:
              inicio
                ret 1;
              fin
            inicio
              f();
            fin"#,
        );
        for q in &g.quads {
            if let Op::Gosub { func, entry } = &q.op {
                let target = g.funcs.get(func).unwrap().start_quad.unwrap();
                assert_eq!(*entry, target);
            }
        }
    }

    #[test]
    fn call_with_wrong_arity_is_rejected() {
        let err = gen_err(
            r#"programa P;
            funcs:
              func f(a: entero): nula
              vars:
              inicio
              fin
            inicio
              f();
            fin"#,
        );
        assert!(err.0.contains("expects"));
    }

    #[test]
    fn return_value_is_copied_out_of_the_global_slot() {
        let g = gen_(
            r#"programa P;
            funcs:
              func suma(a: entero, b: entero): entero
              vars:
              inicio
                ret a + b;
              fin
            inicio
              escribe(suma(1, 2));
            fin"#,
        );
        let has_return_copy = g
            .quads
            .iter()
            .any(|q| matches!(q.op, Op::Assign { .. }));
        assert!(has_return_copy);
    }

    #[test]
    fn capacity_override_is_enforced() {
        let program = parse("programa P; vars: a: entero, b: entero, c: entero; inicio fin").unwrap();
        let err = generate_with_capacity(&program, Some(2)).unwrap_err();
        assert!(err.0.contains("capacity"));
    }

    #[test]
    fn recursion_reuses_local_and_temp_addresses() {
        let g = gen_(
            r#"programa P;
            funcs:
              func fact(n: entero): entero
              vars:
              inicio
                si (n <= 1) {
                  ret 1;
                } sino {
                  ret n * fact(n - 1);
                }
              fin
            inicio
              escribe(fact(5));
            fin"#,
        );
        let info = g.funcs.get("fact").unwrap();
        assert!(info.locals_count.get(&Type::Int).copied().unwrap_or(0) >= 1);
    }
}
