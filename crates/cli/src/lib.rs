//! Patito CLI driver library
//!
//! Wires the compiler and VM crates into the textual report contract, kept
//! separate from `main.rs` so integration tests can run the full pipeline
//! in-process instead of shelling out to the built binary.

pub mod config;
pub mod error;
pub mod output;

use error::CliError;
use patito_compiler::{generator, parser};
use patito_core::VirtualAddress;
use patito_vm::{Value, VirtualMachine};
use std::collections::HashMap;
use std::io::Write;

/// Compile `source` and render the static report (AST through quadruples).
pub fn compile_report(source: &str, capacity: Option<i64>) -> Result<String, CliError> {
    let program = parser::parse(source).map_err(|e| CliError::Compile(e.into()))?;
    let generated = generator::generate_with_capacity(&program, capacity).map_err(|e| CliError::Compile(e.into()))?;
    Ok(output::render_report(&program, &generated))
}

/// Compile and execute `source`, writing every `PRINT`ed line to `out`.
/// Returns the static report; execution output is written to `out`, not
/// returned, so a caller streaming to stdout doesn't need to buffer it.
pub fn compile_and_run(source: &str, capacity: Option<i64>, out: &mut impl Write) -> Result<String, CliError> {
    let program = parser::parse(source).map_err(|e| CliError::Compile(e.into()))?;
    let generated = generator::generate_with_capacity(&program, capacity).map_err(|e| CliError::Compile(e.into()))?;
    let report = output::render_report(&program, &generated);

    let param_addrs: HashMap<String, Vec<VirtualAddress>> = generated
        .funcs
        .in_order()
        .map(|f| (f.name.clone(), f.params.iter().map(|p| p.addr).collect()))
        .collect();
    let const_mem: HashMap<VirtualAddress, Value> = generated
        .memory
        .constants()
        .map(|(value, _, addr)| (addr, Value::from(value)))
        .collect();

    let mut vm = VirtualMachine::new(generated.quads.clone(), param_addrs, const_mem);
    vm.run(out)?;
    Ok(report)
}

/// As [`compile_and_run`], but returns the full `--run` transcript as one
/// string: the static report, a blank line, the `Ejecución` header, then the
/// execution output immediately after — no blank line between the header and
/// the first `PRINT` line, matching `run_cuadruplos.py`'s
/// `print("\nEjecución")` followed directly by `vm.run()`'s own prints.
pub fn compile_and_run_report(source: &str, capacity: Option<i64>) -> Result<String, CliError> {
    let mut execution = Vec::new();
    let report = compile_and_run(source, capacity, &mut execution)?;
    let execution = String::from_utf8_lossy(&execution);
    Ok(format!("{report}\nEjecución\n{execution}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_report_rejects_undeclared_variables() {
        assert!(compile_report("programa P; inicio x = 1; fin", None).is_err());
    }

    #[test]
    fn compile_and_run_executes_print_statements() {
        let mut out = Vec::new();
        let report = compile_and_run(
            "programa P; vars: x: entero; inicio x = 40 + 2; escribe(x); fin",
            None,
            &mut out,
        )
        .unwrap();
        assert!(report.contains("Cuadruplos"));
        assert_eq!(String::from_utf8(out).unwrap(), "42\n");
    }

    #[test]
    fn run_report_has_no_blank_line_between_header_and_first_print() {
        let report = compile_and_run_report(
            "programa P; vars: x: entero; inicio x = 40 + 2; escribe(x); fin",
            None,
        )
        .unwrap();
        assert!(report.ends_with("\nEjecución\n42\n"));
        assert!(!report.ends_with("\nEjecución\n\n42\n"));
    }

    #[test]
    fn capacity_override_surfaces_as_a_cli_error() {
        let mut out = Vec::new();
        let result = compile_and_run(
            "programa P; vars: a: entero, b: entero; inicio fin",
            Some(1),
            &mut out,
        );
        assert!(result.is_err());
    }
}
