//! Madlad Syntax - the reference grammar
//!
//! Turns UTF-8 source text into the core syntax tree, or into a list of
//! `{line, column, message}` diagnostics.
//!
//! ```text
//! define x := construct_empty()
//! y := reduce(wrap(x))
//! assert dual(dual(y)) == y, "duality holds"
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod utils;

pub use error::{ParserError, ParserErrorKind};
pub use parser::Parser;

use madlad_core::ast::{Frontend, Module, SyntaxError};
use tracing::debug;

const TARGET: &str = "madlad::parser";

/// Parse a whole program
pub fn parse(source: &str) -> Result<Module, Vec<SyntaxError>> {
    let tokens = lexer::tokenize(source)
        .map_err(|errors| errors.into_iter().map(SyntaxError::from).collect::<Vec<_>>())?;
    debug!(target: TARGET, tokens = tokens.len(), "tokenized");

    let module = Parser::new(tokens)
        .parse()
        .map_err(|errors| errors.into_iter().map(SyntaxError::from).collect::<Vec<_>>())?;
    debug!(target: TARGET, statements = module.statements.len(), "parsed");
    Ok(module)
}

/// [`Frontend`] backed by [`parse`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DslFrontend;

impl Frontend for DslFrontend {
    fn parse(&self, source: &str) -> Result<Module, Vec<SyntaxError>> {
        parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use madlad_core::ast::build::*;
    use madlad_core::ast::{Callee, ExprKind, StmtKind};
    use madlad_core::ops::{BinaryOp, UnaryOp};

    #[test]
    fn test_example_program() {
        let source = "define x := construct_empty(); y := reduce(wrap(x)); assert dual(dual(y)) == y";
        let expected = module(vec![
            define("x", call("construct_empty", vec![])),
            bind("y", call("reduce", vec![call("wrap", vec![var("x")])])),
            assert(binary(
                call("dual", vec![call("dual", vec![var("y")])]),
                BinaryOp::Eq,
                var("y"),
            )),
        ]);
        assert_eq!(parse(source), Ok(expected));
    }

    #[test]
    fn test_precedence_and_associativity() {
        let m = parse("r := 1 + 2 * 3 - 4 < 5 and not false").unwrap();
        let expected = bind(
            "r",
            binary(
                binary(
                    binary(
                        binary(int(1), BinaryOp::Add, binary(int(2), BinaryOp::Mul, int(3))),
                        BinaryOp::Sub,
                        int(4),
                    ),
                    BinaryOp::Lt,
                    int(5),
                ),
                BinaryOp::And,
                unary(UnaryOp::Not, boolean(false)),
            ),
        );
        assert_eq!(m.statements, vec![expected]);
    }

    #[test]
    fn test_control_flow_statements() {
        let source = r#"
            fn step(v) {
                if v > 0 { return v - 1 } else if v < 0 { return v + 1 } else { return }
            }
            x := [3, :a, "b", empty, state]
            converge x with o26 limit 8
            optimize best := select_min over x, wrap(x)
            while false { x := x }
            assert true, "never fails"
        "#;
        let m = parse(source).unwrap();
        assert_eq!(m.statements.len(), 6);
        assert_eq!(m.functions().count(), 1);
        match m.statements[2].as_ref() {
            StmtKind::Converge(c) => {
                assert_eq!(c.step, Callee::OperatorId(26));
                assert_eq!(c.limit, 8);
            }
            other => panic!("expected converge, got {other:?}"),
        }
        match m.statements[5].as_ref() {
            StmtKind::Assert(a) => assert_eq!(a.message.as_deref(), Some("never fails")),
            other => panic!("expected assert, got {other:?}"),
        }
        match m.statements[1].as_ref() {
            StmtKind::Bind(b) => match b.value.as_ref() {
                ExprKind::List(list) => assert_eq!(list.items.len(), 5),
                other => panic!("expected list, got {other:?}"),
            },
            other => panic!("expected binding, got {other:?}"),
        }
    }

    #[test]
    fn test_operator_id_calls() {
        let m = parse("o2(); o41(x)").unwrap();
        assert_eq!(m.statements[0], expr(call_id(2, vec![])));
        assert_eq!(m.statements[1], expr(call_id(41, vec![var("x")])));
    }

    #[test]
    fn test_errors_have_positions_and_recover() {
        let errors = parse("x := (1 +\ny := 2 )\nwhile { }").unwrap_err();
        assert!(errors.len() >= 2, "{errors:?}");
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].message.starts_with("expected"), "{}", errors[0]);
    }

    #[test]
    fn test_lexical_errors_pass_through() {
        let errors = parse("x := 1 @ 2").unwrap_err();
        assert_eq!(errors, vec![SyntaxError::new(1, 8, "unexpected character '@'")]);
    }

    #[test]
    fn test_for_and_print() {
        let m = parse("for i := 0; i < 3; i := i + 1 { print i }\nprint state").unwrap();
        let expected = module(vec![
            for_loop(
                bind("i", int(0)),
                binary(var("i"), BinaryOp::Lt, int(3)),
                bind("i", binary(var("i"), BinaryOp::Add, int(1))),
                vec![print(var("i"))],
            ),
            print(state()),
        ]);
        assert_eq!(m, expected);

        let m = parse("for define n := 2; n > 0; wrap() { n := n - 1 }").unwrap();
        match m.statements[0].as_ref() {
            StmtKind::For(f) => {
                assert_eq!(f.init, define("n", int(2)));
                assert_eq!(f.update, expr(call("wrap", vec![])));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_parameters_rejected() {
        let errors = parse("fn f(a, b, a) { return a }").unwrap_err();
        assert_eq!(
            errors,
            vec![SyntaxError::new(
                1,
                12,
                "parameter 'a' is declared more than once"
            )]
        );
    }

    #[test]
    fn test_negative_literals() {
        let m = parse("x := -9223372036854775808; y := -(5); z := - 7").unwrap();
        assert_eq!(m.statements[0], bind("x", int(i64::MIN)));
        assert_eq!(m.statements[1], bind("y", unary(UnaryOp::Neg, int(5))));
        assert_eq!(m.statements[2], bind("z", int(-7)));

        let errors = parse("x := 9223372036854775808").unwrap_err();
        assert_eq!(
            errors,
            vec![SyntaxError::new(
                1,
                6,
                "integer literal '9223372036854775808' is out of range"
            )]
        );
        assert!(parse("x := -9223372036854775809").is_err());
    }
}
