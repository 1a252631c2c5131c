//! End-to-end scenarios, run in-process through `patito_cli`.

use patito_cli::{compile_and_run, compile_and_run_report};

fn run(source: &str) -> String {
    let mut out = Vec::new();
    compile_and_run(source, None, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn arithmetic_respects_operator_precedence() {
    let source = "programa P; vars: x: entero; inicio x = 2 + 3 * 4; escribe(x); fin";
    assert_eq!(run(source), "14\n");
}

#[test]
fn conditional_takes_the_else_branch() {
    let source = r#"programa P;
        vars: x: entero;
        inicio
          x = -1;
          si (x > 0) { escribe("pos"); } sino { escribe("neg"); }
        fin"#;
    assert_eq!(run(source), "neg\n");
}

#[test]
fn while_loop_counts_up() {
    let source = r#"programa P;
        vars: i: entero;
        inicio
          i = 1;
          mientras (i < 4) haz { escribe(i); i = i + 1; }
        fin"#;
    assert_eq!(run(source), "1\n2\n3\n");
}

#[test]
fn function_call_returns_a_value() {
    let source = r#"programa P;
        funcs:
          func suma(a: entero, b: entero): entero
          vars:
          inicio
            ret a + b;
          fin
        inicio
          escribe(suma(2, 3));
        fin"#;
    assert_eq!(run(source), "5\n");
}

#[test]
fn recursive_factorial_isolates_frames_across_depth() {
    let source = r#"programa P;
        funcs:
          func factorial(n: entero): entero
          vars:
          inicio
            si (n < 2) { ret 1; }
            ret n * factorial(n - 1);
          fin
        inicio
          escribe(factorial(5));
        fin"#;
    assert_eq!(run(source), "120\n");
}

#[test]
fn printing_a_bare_relational_expression_capitalizes_like_python() {
    let source = "programa P; vars: x: entero; inicio x = 5; escribe(x > 0); fin";
    assert_eq!(run(source), "True\n");
}

#[test]
fn run_transcript_header_is_immediately_followed_by_execution_output() {
    let source = "programa P; vars: i: entero; inicio i = 1; mientras (i < 3) haz { escribe(i); i = i + 1; } fin";
    let report = compile_and_run_report(source, None).unwrap();
    assert!(report.ends_with("\nEjecución\n1\n2\n"));
}

#[test]
fn narrowing_assignment_is_rejected_before_any_quadruple_runs() {
    let source = "programa P; vars: x: entero; inicio x = 1.5; fin";
    let mut out = Vec::new();
    let result = compile_and_run(source, None, &mut out);
    assert!(result.is_err());
    assert!(out.is_empty());
}
