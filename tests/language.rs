use mini_compiler::{
    ErrorKind, Mode, Value, evaluate, parse, parse::Found, run, tokenize,
};

fn assert_value(src: &str, expected: Value) {
    match run(src, None) {
        Ok(outcome) => assert_eq!(outcome.value, expected, "evaluating {src}"),
        Err(e) => panic!("Expression {src:?} failed: {e}"),
    }
}

fn assert_failure(src: &str, kind: ErrorKind) {
    match run(src, None) {
        Ok(outcome) => panic!(
            "Expression {src:?} evaluated to {} but was expected to fail",
            outcome.value
        ),
        Err(e) => assert_eq!(e.kind(), kind, "{src:?} failed with {e}"),
    }
}

#[test]
fn integer_literals_evaluate_to_themselves() {
    for n in [0_i64, 1, 7, 42, 1000, 65535, 123_456_789, i64::MAX] {
        let src = n.to_string();
        let value = evaluate(&parse(tokenize(&src).unwrap()).unwrap()).unwrap();
        assert_eq!(value, Value::Integer(n));
    }
}

#[test]
fn arithmetic_associativity_and_precedence() {
    assert_value("10-2-3", Value::Integer(5));
    assert_value("2+3*4", Value::Integer(14));
    assert_value("(2+3)*4", Value::Integer(20));
    assert_value("100 / 10 / 5", Value::Integer(2));
    assert_value("2 * (3 + (4 - 1)) / 3", Value::Integer(4));
}

#[test]
fn conditionals() {
    assert_value("if 1==1 then 5 else 1/0", Value::Integer(5));
    assert_value("if (3>2) && !(1==2) then 1 else 0", Value::Integer(1));
    assert_value("if 2 < 1 || 3 != 3 then 1 else 2 * 21", Value::Integer(42));
    assert_value(
        "(if 1 < 2 then 10 else 20) + (if 1 > 2 then 1 else 2)",
        Value::Integer(12),
    );
    assert_value("if 1 == 1 then 1 < 2 else 1 > 2", Value::Bool(true));
}

#[test]
fn boolean_results() {
    assert_value("1 + 1 == 2", Value::Bool(true));
    assert_value("!(4 >= 5) && 2 <= 2", Value::Bool(true));
    assert_value("(1 == 1) != (2 == 2)", Value::Bool(false));
}

#[test]
fn failures_are_classified() {
    assert_failure("3#2", ErrorKind::Lexical);
    assert_failure("x + 1", ErrorKind::Lexical);
    assert_failure("(2+3", ErrorKind::Syntactic);
    assert_failure("2+", ErrorKind::Syntactic);
    assert_failure("if 1 then if 2 then 3 else 4 else 5", ErrorKind::Syntactic);
    assert_failure("5/0", ErrorKind::Evaluation);
    assert_failure("!5", ErrorKind::Evaluation);
    assert_failure("if 5 then 1 else 2", ErrorKind::Evaluation);
}

#[test]
fn unbalanced_parenthesis_names_the_missing_token() {
    let err = parse(tokenize("(2+3").unwrap()).unwrap_err();
    assert_eq!(err.expected, "`)`");
    assert_eq!(err.found, Found::EndOfInput);
}

#[test]
fn lex_error_names_the_character() {
    let err = tokenize("3#2").unwrap_err();
    assert!(err.to_string().contains("'#'"), "{err}");
}

#[test]
fn modes_restrict_operators() {
    assert!(run("1 + 2 * 3", Some(Mode::Arithmetic)).is_ok());
    assert!(run("1 < 2 && 3 > 2", Some(Mode::Logical)).is_ok());
    assert!(run("if 1 < 2 then 3 else 4", Some(Mode::Conditional)).is_ok());

    let kind = |src, mode| run(src, Some(mode)).unwrap_err().kind();
    assert_eq!(kind("1 + 2 == 3", Mode::Logical), ErrorKind::Mode);
    assert_eq!(kind("if 1 < 2 then 3 else 4", Mode::Arithmetic), ErrorKind::Mode);
    assert_eq!(kind("1 < 2", Mode::Conditional), ErrorKind::Mode);
}

#[test]
fn deep_nesting_fails_without_crashing() {
    assert_failure(&format!("{}(1==1)", "!".repeat(200_000)), ErrorKind::Syntactic);
    assert_failure(&format!("{}1", "(".repeat(200_000)), ErrorKind::Syntactic);
    assert_failure(&format!("1{}", "*1".repeat(200_000)), ErrorKind::Syntactic);

    assert_value(&format!("{}(1==1)", "!".repeat(200)), Value::Bool(true));
    assert_value(&format!("{}7{}", "(".repeat(200), ")".repeat(200)), Value::Integer(7));
}

#[test]
fn keywords_split_out_of_letter_runs() {
    let err = tokenize("iff").unwrap_err();
    assert!(err.to_string().contains("'f' at index 2"), "{err}");
    assert_value("if 1 < 2 then 3 else 4", Value::Integer(3));
    assert_failure("ifthen", ErrorKind::Syntactic);
}
