//! The stack-frame interpreter
//!
//! Executes a flat quadruple list exactly as
//! `examples/original_source/patito/vm.py`'s `VirtualMachine.run` does:
//! a single instruction pointer, a call stack of [`Frame`]s, and a pending
//! frame that bridges `ERA` to the `GOSUB` that commits it. Addresses are
//! classified into a segment on every access via
//! [`patito_core::VirtualMemory::classify`]; there is no separate type tag
//! carried alongside an address at runtime.

use crate::error::RuntimeError;
use crate::frame::Frame;
use crate::value::{truthy, Value};
use patito_core::quad::{BinOp, Op, Quadruple, UnaryOp};
use patito_core::{Segment, VirtualAddress, VirtualMemory};
use std::collections::HashMap;
use std::io::Write;

pub struct VirtualMachine {
    quads: Vec<Quadruple>,
    /// Declared parameter addresses per function, in parameter order —
    /// where `PARAM`'s numeric index writes.
    param_addrs: HashMap<String, Vec<VirtualAddress>>,
    const_mem: HashMap<VirtualAddress, Value>,
    global_mem: HashMap<VirtualAddress, Value>,
    call_stack: Vec<Frame>,
    current_frame: Frame,
    pending_frame: Option<Frame>,
    ip: usize,
}

impl VirtualMachine {
    pub fn new(
        quads: Vec<Quadruple>,
        param_addrs: HashMap<String, Vec<VirtualAddress>>,
        const_mem: HashMap<VirtualAddress, Value>,
    ) -> Self {
        VirtualMachine {
            quads,
            param_addrs,
            const_mem,
            global_mem: HashMap::new(),
            call_stack: Vec::new(),
            current_frame: Frame::new("global"),
            pending_frame: None,
            ip: 0,
        }
    }

    /// Run to completion, writing every `PRINT`ed value followed by a
    /// newline to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), RuntimeError> {
        while self.ip < self.quads.len() {
            let op = self.quads[self.ip].op.clone();
            match op {
                Op::Binary { op, left, right, result } => {
                    let a = self.read(left)?;
                    let b = self.read(right)?;
                    let value = eval_binary(op, &a, &b)?;
                    self.write(result, value)?;
                    self.ip += 1;
                }
                Op::Unary { op, operand, result } => {
                    let v = self.read(operand)?;
                    let value = eval_unary(op, &v)?;
                    self.write(result, value)?;
                    self.ip += 1;
                }
                Op::Assign { src, dst } => {
                    let v = self.read(src)?;
                    self.write(dst, v)?;
                    self.ip += 1;
                }
                Op::Print { addr } => {
                    let v = self.read(addr)?;
                    writeln!(out, "{v}")?;
                    self.ip += 1;
                }
                Op::Goto { target } => {
                    self.ip = target;
                }
                Op::GotoFalse { cond, target } => {
                    let v = self.read(cond)?;
                    if truthy(&v) {
                        self.ip += 1;
                    } else {
                        self.ip = target;
                    }
                }
                Op::Era { func } => {
                    self.pending_frame = Some(Frame::new(func));
                    self.ip += 1;
                }
                Op::Param { src, index } => {
                    let value = self.read(src)?;
                    self.write_param(index, value)?;
                    self.ip += 1;
                }
                Op::Gosub { entry, .. } => {
                    let mut pending = self.pending_frame.take().ok_or(RuntimeError::GosubWithoutEra)?;
                    pending.ret_ip = Some(self.ip + 1);
                    let caller = std::mem::replace(&mut self.current_frame, pending);
                    self.call_stack.push(caller);
                    self.ip = entry;
                }
                Op::Return { value, slot } => {
                    if let (Some(value_addr), Some(slot_addr)) = (value, slot) {
                        let v = self.read(value_addr)?;
                        self.write(slot_addr, v)?;
                    }
                    self.return_from_function();
                }
                Op::EndFunc => {
                    self.return_from_function();
                }
            }
        }
        Ok(())
    }

    fn return_from_function(&mut self) {
        match self.call_stack.pop() {
            None => self.ip = self.quads.len(),
            Some(caller) => {
                let ret_ip = self.current_frame.ret_ip;
                self.current_frame = caller;
                self.ip = ret_ip.unwrap_or(self.quads.len());
            }
        }
    }

    fn write_param(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let func = self
            .pending_frame
            .as_ref()
            .ok_or(RuntimeError::ParamWithoutEra)?
            .func
            .clone();
        let addrs = self
            .param_addrs
            .get(&func)
            .ok_or_else(|| RuntimeError::UnknownFunction(func.clone()))?;
        let target = *addrs
            .get(index)
            .ok_or(RuntimeError::ParamIndexOutOfRange { func: func.clone(), index })?;
        let (segment, _) = VirtualMemory::classify(target).ok_or(RuntimeError::AddressOutOfRange(target))?;
        let pending = self.pending_frame.as_mut().expect("checked above");
        match segment {
            Segment::Local => pending.locals.insert(target, value),
            Segment::Temp => pending.temps.insert(target, value),
            _ => return Err(RuntimeError::InvalidParamTarget(target)),
        };
        Ok(())
    }

    fn read(&self, addr: VirtualAddress) -> Result<Value, RuntimeError> {
        let (segment, _) = VirtualMemory::classify(addr).ok_or(RuntimeError::AddressOutOfRange(addr))?;
        let mem = match segment {
            Segment::Const => &self.const_mem,
            Segment::Global => &self.global_mem,
            Segment::Local => &self.current_frame.locals,
            Segment::Temp => &self.current_frame.temps,
        };
        mem.get(&addr).cloned().ok_or(RuntimeError::UnwrittenAddress(addr))
    }

    fn write(&mut self, addr: VirtualAddress, value: Value) -> Result<(), RuntimeError> {
        let (segment, _) = VirtualMemory::classify(addr).ok_or(RuntimeError::AddressOutOfRange(addr))?;
        match segment {
            Segment::Const => Err(RuntimeError::WriteToConst(addr)),
            Segment::Global => {
                self.global_mem.insert(addr, value);
                Ok(())
            }
            Segment::Local => {
                self.current_frame.locals.insert(addr, value);
                Ok(())
            }
            Segment::Temp => {
                self.current_frame.temps.insert(addr, value);
                Ok(())
            }
        }
    }
}

fn eval_binary(op: BinOp, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => numeric_arith(op, a, b),
        BinOp::Div => {
            let x = as_f64(a)?;
            let y = as_f64(b)?;
            Ok(Value::Float(x / y))
        }
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let x = as_f64(a)?;
            let y = as_f64(b)?;
            let result = match op {
                BinOp::Lt => x < y,
                BinOp::Gt => x > y,
                BinOp::Le => x <= y,
                BinOp::Ge => x >= y,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::Eq | BinOp::Ne => {
            let eq = values_equal(a, b)?;
            Ok(Value::Bool(if op == BinOp::Eq { eq } else { !eq }))
        }
    }
}

fn numeric_arith(op: BinOp, a: &Value, b: &Value) -> Result<Value, RuntimeError> {
    if let (Value::Int(x), Value::Int(y)) = (a, b) {
        let result = match op {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            _ => unreachable!(),
        };
        return Ok(Value::Int(result));
    }
    let x = as_f64(a)?;
    let y = as_f64(b)?;
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        _ => unreachable!(),
    };
    Ok(Value::Float(result))
}

fn eval_unary(op: UnaryOp, v: &Value) -> Result<Value, RuntimeError> {
    match v {
        Value::Int(i) => Ok(Value::Int(if op == UnaryOp::Minus { -i } else { *i })),
        Value::Float(f) => Ok(Value::Float(if op == UnaryOp::Minus { -f } else { *f })),
        other => Err(RuntimeError::NotNumeric(other.clone())),
    }
}

fn as_f64(v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::NotNumeric(other.clone())),
    }
}

fn values_equal(a: &Value, b: &Value) -> Result<bool, RuntimeError> {
    if let (Value::Str(x), Value::Str(y)) = (a, b) {
        return Ok(x == y);
    }
    Ok(as_f64(a)? == as_f64(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patito_core::quad::Quadruple;

    #[test]
    fn straight_line_arithmetic_and_print() {
        let quads = vec![
            Quadruple::new(Op::Assign { src: 9000, dst: 1000 }),
            Quadruple::new(Op::Print { addr: 1000 }),
        ];
        let mut const_mem = HashMap::new();
        const_mem.insert(9000, Value::Int(42));
        let mut vm = VirtualMachine::new(quads, HashMap::new(), const_mem);
        let mut out = Vec::new();
        vm.run(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    }

    #[test]
    fn integer_division_always_produces_a_float() {
        let mut const_mem = HashMap::new();
        const_mem.insert(9000, Value::Int(7));
        const_mem.insert(9001, Value::Int(2));
        let quads = vec![
            Quadruple::new(Op::Binary {
                op: BinOp::Div,
                left: 9000,
                right: 9001,
                result: 5000,
            }),
            Quadruple::new(Op::Print { addr: 5000 }),
        ];
        let mut vm = VirtualMachine::new(quads, HashMap::new(), const_mem);
        let mut out = Vec::new();
        vm.run(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3.5\n");
    }

    #[test]
    fn goto_false_skips_the_branch() {
        let mut const_mem = HashMap::new();
        const_mem.insert(9000, Value::Bool(false));
        const_mem.insert(9001, Value::Int(1));
        let quads = vec![
            Quadruple::new(Op::GotoFalse { cond: 9000, target: 3 }),
            Quadruple::new(Op::Print { addr: 9001 }),
            Quadruple::new(Op::Goto { target: 3 }),
        ];
        let mut vm = VirtualMachine::new(quads, HashMap::new(), const_mem);
        let mut out = Vec::new();
        vm.run(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "");
    }

    #[test]
    fn read_from_unwritten_address_is_an_error() {
        let quads = vec![Quadruple::new(Op::Print { addr: 1000 })];
        let mut vm = VirtualMachine::new(quads, HashMap::new(), HashMap::new());
        let mut out = Vec::new();
        assert!(vm.run(&mut out).is_err());
    }

    #[test]
    fn param_without_era_is_an_error() {
        let quads = vec![Quadruple::new(Op::Param { src: 1000, index: 0 })];
        let mut const_mem = HashMap::new();
        const_mem.insert(1000, Value::Int(1));
        let mut vm = VirtualMachine::new(quads, HashMap::new(), const_mem);
        let mut out = Vec::new();
        let err = vm.run(&mut out).unwrap_err();
        assert!(matches!(err, RuntimeError::UnwrittenAddress(_)));
    }

    #[test]
    fn function_call_protocol_passes_arguments_and_returns() {
        // suma(a, b): ret a + b   -- called as suma(2, 3), result copied to global 1000
        let mut param_addrs = HashMap::new();
        param_addrs.insert("suma".to_string(), vec![13000, 13001]);
        let mut const_mem = HashMap::new();
        const_mem.insert(9000, Value::Int(2));
        const_mem.insert(9001, Value::Int(3));

        let quads = vec![
            // 0: GOTO main (index 4)
            Quadruple::new(Op::Goto { target: 4 }),
            // 1: suma body: result := a + b; RET result -> global 1000; ENDFUNC
            Quadruple::new(Op::Binary { op: BinOp::Add, left: 13000, right: 13001, result: 5000 }),
            Quadruple::new(Op::Return { value: Some(5000), slot: Some(1000) }),
            Quadruple::new(Op::EndFunc),
            // main (patched target 4): ERA suma; PARAM 9000 -> 0; PARAM 9001 -> 1; GOSUB suma entry=1
            Quadruple::new(Op::Era { func: "suma".to_string() }),
            Quadruple::new(Op::Param { src: 9000, index: 0 }),
            Quadruple::new(Op::Param { src: 9001, index: 1 }),
            Quadruple::new(Op::Gosub { func: "suma".to_string(), entry: 1 }),
            Quadruple::new(Op::Print { addr: 1000 }),
        ];
        let mut vm = VirtualMachine::new(quads, param_addrs, const_mem);
        let mut out = Vec::new();
        vm.run(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "5\n");
    }
}
