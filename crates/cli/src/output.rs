//! Textual report formatting
//!
//! Produces the driver's report in the exact section order and headers
//! named in `examples/original_source/patito/run_cuadruplos.py`: AST dump,
//! global variable listing, function listing, constant listing, quadruple
//! listing.

use patito_compiler::ast::Program;
use patito_compiler::generator::Generated;
use patito_core::address::ConstValue;
use std::fmt::Write as _;

/// Render the full static report (everything before `--run`'s execution
/// section) for a successfully compiled program.
pub fn render_report(program: &Program, generated: &Generated) -> String {
    let mut out = String::new();
    writeln!(out, "AST").unwrap();
    writeln!(out, "{program:#?}").unwrap();
    out.push('\n');

    writeln!(out, "Direcciones virtuales (globales):").unwrap();
    for name in declared_global_names(program) {
        if let Some(v) = generated.global_vars.lookup(&name) {
            writeln!(out, "  {name} [{}] -> {}", v.ty, v.addr).unwrap();
        }
    }
    out.push('\n');

    writeln!(out, "Funciones:").unwrap();
    for info in generated.funcs.in_order() {
        let params = if info.params.is_empty() {
            "-".to_string()
        } else {
            info.params
                .iter()
                .map(|p| format!("{}:{}", p.name, p.ty))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let ret = info.ret_type.map(|t| t.to_string()).unwrap_or_else(|| "void".to_string());
        let start = info.start_quad.map(|q| q.to_string()).unwrap_or_else(|| "_".to_string());
        let ret_addr = info.ret_addr.map(|a| a.to_string()).unwrap_or_else(|| "none".to_string());
        writeln!(out, "  {}({params}) -> {ret} inicio={start} ret={ret_addr}", info.name).unwrap();
    }
    out.push('\n');

    writeln!(out, "Constantes:").unwrap();
    let mut consts: Vec<_> = generated.memory.constants().collect();
    consts.sort_by_key(|(_, _, addr)| *addr);
    for (value, ty, addr) in consts {
        writeln!(out, "  {} [{ty}] -> {addr}", format_const(value)).unwrap();
    }
    out.push('\n');

    writeln!(out, "Cuadruplos").unwrap();
    for (i, quad) in generated.quads.iter().enumerate() {
        writeln!(out, "{i} : {quad}").unwrap();
    }
    out
}

fn format_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(i) => i.to_string(),
        ConstValue::Float(f) => {
            let s = f.to_string();
            if s.contains('.') {
                s
            } else {
                format!("{s}.0")
            }
        }
        ConstValue::Str(s) => format!("\"{s}\""),
    }
}

/// Global variable names in declaration order, flattening multi-name decls
/// (`x, y: entero`) — the table itself does not preserve insertion order.
fn declared_global_names(program: &Program) -> Vec<String> {
    program
        .vars
        .iter()
        .flat_map(|decl| decl.names.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patito_compiler::{generator, parser};

    #[test]
    fn report_lists_sections_in_order() {
        let program = parser::parse("programa P; vars: x: entero; inicio x = 1; escribe(x); fin").unwrap();
        let generated = generator::generate(&program).unwrap();
        let report = render_report(&program, &generated);
        let ast_pos = report.find("AST").unwrap();
        let vars_pos = report.find("Direcciones virtuales").unwrap();
        let funcs_pos = report.find("Funciones:").unwrap();
        let consts_pos = report.find("Constantes:").unwrap();
        let quads_pos = report.find("Cuadruplos").unwrap();
        assert!(ast_pos < vars_pos);
        assert!(vars_pos < funcs_pos);
        assert!(funcs_pos < consts_pos);
        assert!(consts_pos < quads_pos);
    }

    #[test]
    fn float_constants_always_show_a_decimal_point() {
        let program = parser::parse("programa P; vars: x: flotante; inicio x = 4.0; fin").unwrap();
        let generated = generator::generate(&program).unwrap();
        let report = render_report(&program, &generated);
        assert!(report.contains("4.0 [flotante]"));
    }

    #[test]
    fn function_listing_uses_dash_for_no_parameters() {
        let program = parser::parse(
            r#"programa P;
            funcs:
              func f(): nula
              vars:
              inicio
              fin
            inicio
              f();
            fin"#,
        )
        .unwrap();
        let generated = generator::generate(&program).unwrap();
        let report = render_report(&program, &generated);
        assert!(report.contains("f(-) -> void"));
    }
}
