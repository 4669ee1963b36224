use super::*;
use crate::ast::{BinaryOp, Node, UnaryOp};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn eval(node: &Node) -> Result<Value, RuntimeError> {
    let env = Environment::new();
    evaluate(node, &env)
}

fn eval_in(node: &Node, bindings: &[(&str, Value)]) -> Result<Value, RuntimeError> {
    let env = Environment::new();
    for (name, value) in bindings {
        env.declare(*name, value.clone())?;
    }
    evaluate(node, &env)
}

fn render(body: Vec<Node>, bindings: &[(&str, Value)]) -> Result<String, RuntimeError> {
    match eval_in(&Node::program(body), bindings)? {
        Value::String(s) => Ok(s),
        other => panic!("program produced {:?}", other),
    }
}

fn num(n: f64) -> Node {
    Node::number(n)
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    Node::binary(op, left, right)
}

// Literals

#[test]
fn test_literals() {
    assert_eq!(eval(&num(4.5)).unwrap(), Value::Numeric(4.5));
    assert_eq!(eval(&Node::string("hi")).unwrap(), Value::from("hi"));
    assert_eq!(eval(&Node::boolean(false)).unwrap(), Value::Boolean(false));
}

#[test]
fn test_numeric_literal_text_is_parsed() {
    let node = Node::NumericLiteral {
        value: crate::ast::Numeral::Text("42".to_string()),
    };
    assert_eq!(eval(&node).unwrap(), Value::Numeric(42.0));

    let bad = Node::NumericLiteral {
        value: crate::ast::Numeral::Text("4x2".to_string()),
    };
    assert!(matches!(
        eval(&bad),
        Err(RuntimeError::InvalidLiteral { .. })
    ));
}

// Arithmetic and comparison

#[test]
fn test_arithmetic() {
    assert_eq!(
        eval(&binary(BinaryOp::Add, num(3.0), num(4.0))).unwrap(),
        Value::Numeric(7.0)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Mod, num(7.0), num(2.0))).unwrap(),
        Value::Numeric(1.0)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Mul, num(6.0), num(7.0))).unwrap(),
        Value::Numeric(42.0)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Sub, num(1.0), num(3.0))).unwrap(),
        Value::Numeric(-2.0)
    );
}

#[test]
fn test_division_by_zero_follows_floats() {
    assert_eq!(
        eval(&binary(BinaryOp::Div, num(1.0), num(0.0))).unwrap(),
        Value::Numeric(f64::INFINITY)
    );
    let nan = eval(&binary(BinaryOp::Div, num(0.0), num(0.0))).unwrap();
    assert!(nan.as_f64().is_some_and(f64::is_nan));
}

#[test]
fn test_numeric_comparisons() {
    let cases = [
        (BinaryOp::Lt, true),
        (BinaryOp::Le, true),
        (BinaryOp::Gt, false),
        (BinaryOp::Ge, false),
        (BinaryOp::Eq, false),
        (BinaryOp::Ne, true),
    ];
    for (op, expected) in cases {
        assert_eq!(
            eval(&binary(op, num(1.0), num(2.0))).unwrap(),
            Value::Boolean(expected),
            "1 {} 2",
            op
        );
    }
}

#[test]
fn test_and_or_on_numbers_is_unknown_operator() {
    let err = eval(&binary(BinaryOp::And, num(1.0), num(2.0))).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownOperator { .. }));
}

// Boolean operators

#[test]
fn test_boolean_operators() {
    let t = Node::boolean(true);
    let f = Node::boolean(false);
    assert_eq!(
        eval(&binary(BinaryOp::And, t.clone(), f.clone())).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Or, t.clone(), f.clone())).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Ne, t.clone(), f.clone())).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn test_boolean_equality_is_not_defined() {
    let err = eval(&binary(
        BinaryOp::Eq,
        Node::boolean(true),
        Node::boolean(true),
    ))
    .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnknownOperator {
            operator: "==".to_string(),
            operands: "Boolean and Boolean".to_string(),
        }
    );
}

#[test]
fn test_and_does_not_short_circuit() {
    // The right operand is still evaluated, so calling a non-function fails
    let node = binary(
        BinaryOp::And,
        Node::boolean(false),
        Node::call(Node::string("nope"), vec![]),
    );
    assert!(matches!(
        eval(&node),
        Err(RuntimeError::NotCallable {
            kind: ValueKind::String
        })
    ));
}

// Mixed operands

#[test]
fn test_string_concatenation_fallback() {
    assert_eq!(
        eval(&binary(BinaryOp::Add, Node::string("a"), num(1.0))).unwrap(),
        Value::from("a1")
    );
    assert_eq!(
        eval(&binary(BinaryOp::Add, Node::string("x"), Node::string("y"))).unwrap(),
        Value::from("xy")
    );
    assert_eq!(
        eval(&binary(BinaryOp::Add, Node::boolean(true), num(2.5))).unwrap(),
        Value::from("true2.5")
    );
}

#[test]
fn test_mixed_equality() {
    assert_eq!(
        eval(&binary(BinaryOp::Eq, Node::string("a"), Node::string("a"))).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Eq, Node::string("1"), num(1.0))).unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Ne, Node::string("a"), Node::string("b"))).unwrap(),
        Value::Boolean(true)
    );
}

#[test]
fn test_string_comparison_is_unknown_operator() {
    let err = eval(&binary(BinaryOp::Lt, Node::string("a"), Node::string("b"))).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownOperator { .. }));
}

#[test]
fn test_null_operand_rejected() {
    let err = eval(&binary(BinaryOp::Add, Node::ident("missing"), num(1.0))).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::NullOperation {
            operator: "+".to_string(),
            left: ValueKind::Null,
            right: ValueKind::Numeric,
        }
    );

    let err = eval(&binary(BinaryOp::Eq, Node::string("a"), Node::ident("missing"))).unwrap_err();
    assert!(matches!(err, RuntimeError::NullOperation { .. }));
}

// Unary

#[test]
fn test_not_uses_truthiness() {
    let cases = [
        (Node::boolean(true), false),
        (Node::boolean(false), true),
        (num(0.0), true),
        (num(3.0), false),
        (Node::string(""), true),
        (Node::string("x"), false),
        (Node::ident("missing"), true),
    ];
    for (operand, expected) in cases {
        assert_eq!(
            eval(&Node::unary(UnaryOp::Not, operand)).unwrap(),
            Value::Boolean(expected)
        );
    }
}

#[test]
fn test_negation_is_unknown_operator() {
    let err = eval(&Node::unary(UnaryOp::Neg, num(1.0))).unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownOperator { .. }));
}

// Blocks and statements

#[test]
fn test_block_concatenates_non_null_results() {
    let out = render(
        vec![
            Node::string("a"),
            num(1.0),
            Node::ident("missing"),
            Node::boolean(true),
            num(0.5),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(out, "a1true0.5");
}

#[test]
fn test_set_renders_nothing_and_binds() {
    let out = render(
        vec![
            Node::set(Node::ident("x"), num(2.0)),
            Node::string("x="),
            Node::ident("x"),
        ],
        &[],
    )
    .unwrap();
    assert_eq!(out, "x=2");
}

#[test]
fn test_set_overwrites_existing_binding() {
    let out = render(
        vec![
            Node::set(
                Node::ident("n"),
                binary(BinaryOp::Add, Node::ident("n"), num(1.0)),
            ),
            Node::ident("n"),
        ],
        &[("n", Value::Numeric(41.0))],
    )
    .unwrap();
    assert_eq!(out, "42");
}

#[test]
fn test_set_requires_identifier() {
    let node = Node::set(Node::member(Node::ident("user"), "name"), Node::string("x"));
    assert_eq!(
        eval(&node).unwrap_err(),
        RuntimeError::InvalidAssignmentTarget {
            found: "MemberExpression"
        }
    );
}

#[test]
fn test_if_takes_body_branch() {
    let node = Node::if_else(
        Node::boolean(true),
        vec![Node::string("x")],
        vec![Node::string("y")],
    );
    assert_eq!(eval(&node).unwrap(), Value::from("x"));
}

#[test]
fn test_if_takes_alternate_branch() {
    let node = Node::if_else(
        binary(BinaryOp::Gt, num(1.0), num(2.0)),
        vec![Node::string("x")],
        vec![Node::string("y")],
    );
    assert_eq!(eval(&node).unwrap(), Value::from("y"));
}

#[test]
fn test_if_with_empty_alternate_renders_empty() {
    let node = Node::if_else(Node::boolean(false), vec![Node::string("x")], vec![]);
    assert_eq!(eval(&node).unwrap(), Value::from(""));
}

#[test]
fn test_if_rejects_non_boolean_test() {
    let node = Node::if_else(num(1.0), vec![Node::string("x")], vec![]);
    assert!(matches!(
        eval(&node),
        Err(RuntimeError::TypeError { .. })
    ));

    // No truthiness for strings or arrays either
    let node = Node::if_else(Node::ident("items"), vec![], vec![]);
    assert!(matches!(
        eval_in(&node, &[("items", Value::Array(vec![]))]),
        Err(RuntimeError::TypeError { .. })
    ));
}

// Loops

fn numbers(values: &[f64]) -> Value {
    Value::Array(values.iter().copied().map(Value::Numeric).collect())
}

#[test]
fn test_for_renders_each_element() {
    let node = Node::for_loop(
        Node::ident("v"),
        Node::ident("items"),
        vec![Node::member(Node::ident("loop"), "index0"), Node::ident("v"), Node::string(";")],
    );
    let out = eval_in(&node, &[("items", numbers(&[10.0, 20.0, 30.0]))]).unwrap();
    assert_eq!(out, Value::from("010;120;230;"));
}

#[test]
fn test_for_loop_metadata_on_last_iteration() {
    // Render every loop field on each pass, separated by commas
    let field = |name: &str| Node::member(Node::ident("loop"), name);
    let sep = || Node::string(",");
    let node = Node::for_loop(
        Node::ident("v"),
        Node::ident("items"),
        vec![
            field("index"),
            sep(),
            field("index0"),
            sep(),
            field("first"),
            sep(),
            field("last"),
            sep(),
            field("length"),
            sep(),
            Node::ident("v"),
            Node::string("|"),
        ],
    );
    let out = eval_in(&node, &[("items", numbers(&[10.0, 20.0, 30.0]))]).unwrap();
    let passes: Vec<&str> = out.as_str().unwrap().split('|').collect();
    assert_eq!(
        passes,
        vec![
            "1,0,true,false,3,10",
            "2,1,false,false,3,20",
            "3,2,false,true,3,30",
            ""
        ]
    );
}

#[test]
fn test_for_over_empty_array() {
    let node = Node::for_loop(Node::ident("v"), Node::ident("items"), vec![Node::ident("v")]);
    assert_eq!(
        eval_in(&node, &[("items", Value::Array(vec![]))]).unwrap(),
        Value::from("")
    );
}

#[test]
fn test_for_rejects_non_array() {
    let node = Node::for_loop(Node::ident("v"), Node::ident("items"), vec![]);
    let err = eval_in(&node, &[("items", Value::object([("a", Value::Null)]))]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeError {
            message: "for-loop iterable must be Array, got Object".to_string()
        }
    );
}

#[test]
fn test_for_scope_does_not_leak() {
    let out = render(
        vec![
            Node::for_loop(Node::ident("v"), Node::ident("items"), vec![]),
            binary(BinaryOp::Add, Node::string("v="), Node::unary(UnaryOp::Not, Node::ident("v"))),
            binary(BinaryOp::Add, Node::string(" loop="), Node::unary(UnaryOp::Not, Node::ident("loop"))),
        ],
        &[("items", numbers(&[1.0, 2.0]))],
    )
    .unwrap();
    assert_eq!(out, "v=true loop=true");
}

#[test]
fn test_for_loop_variable_updates_outer_binding() {
    let out = render(
        vec![
            Node::for_loop(Node::ident("v"), Node::ident("items"), vec![Node::ident("v")]),
            Node::string("/"),
            Node::ident("v"),
        ],
        &[("items", numbers(&[1.0, 2.0])), ("v", Value::from("outer"))],
    )
    .unwrap();
    assert_eq!(out, "12/2");
}

#[test]
fn test_for_loop_variable_named_loop() {
    let node = Node::for_loop(
        Node::ident("loop"),
        Node::ident("xs"),
        vec![Node::string("x")],
    );
    assert_eq!(
        eval_in(&node, &[("xs", numbers(&[1.0, 2.0]))]).unwrap(),
        Value::from("xx")
    );
}

#[test]
fn test_for_loop_variable_named_loop_sees_element() {
    // The element binding happens after the metadata, so it wins
    let node = Node::for_loop(
        Node::ident("loop"),
        Node::ident("xs"),
        vec![Node::ident("loop"), Node::string(";")],
    );
    assert_eq!(
        eval_in(&node, &[("xs", numbers(&[7.0, 8.0]))]).unwrap(),
        Value::from("7;8;")
    );
}

#[test]
fn test_set_inside_loop_updates_outer_variable() {
    let out = render(
        vec![
            Node::set(Node::ident("total"), num(0.0)),
            Node::for_loop(
                Node::ident("v"),
                Node::ident("items"),
                vec![Node::set(
                    Node::ident("total"),
                    binary(BinaryOp::Add, Node::ident("total"), Node::ident("v")),
                )],
            ),
            Node::ident("total"),
        ],
        &[("items", numbers(&[1.0, 2.0, 3.0]))],
    )
    .unwrap();
    assert_eq!(out, "6");
}

#[test]
fn test_nested_loop_rebinds_enclosing_loop_metadata() {
    // The inner loop finds `loop` in the outer loop scope and overwrites it
    let node = Node::for_loop(
        Node::ident("row"),
        Node::ident("rows"),
        vec![
            Node::for_loop(
                Node::ident("cell"),
                Node::ident("row"),
                vec![Node::ident("cell")],
            ),
            Node::string(":"),
            Node::member(Node::ident("loop"), "index"),
            Node::string(";"),
        ],
    );
    let rows = Value::Array(vec![numbers(&[1.0, 2.0]), numbers(&[3.0])]);
    assert_eq!(
        eval_in(&node, &[("rows", rows)]).unwrap(),
        Value::from("12:2;3:1;")
    );
}

// Member access

#[test]
fn test_string_builtins() {
    let call = |name: &str| Node::call(Node::member(Node::string("  Hi there "), name), vec![]);
    assert_eq!(eval(&call("upper")).unwrap(), Value::from("  HI THERE "));
    assert_eq!(eval(&call("lower")).unwrap(), Value::from("  hi there "));
    assert_eq!(eval(&call("strip")).unwrap(), Value::from("Hi there"));
    assert_eq!(eval(&call("title")).unwrap(), Value::from("  Hi There "));
}

#[test]
fn test_upper_on_short_string() {
    let node = Node::call(Node::member(Node::string("Hi"), "upper"), vec![]);
    assert_eq!(eval(&node).unwrap(), Value::from("HI"));
}

#[test]
fn test_length_properties() {
    assert_eq!(
        eval(&Node::member(Node::string("héllo"), "length")).unwrap(),
        Value::Numeric(5.0)
    );
    assert_eq!(
        eval_in(
            &Node::member(Node::ident("xs"), "length"),
            &[("xs", numbers(&[1.0, 2.0]))]
        )
        .unwrap(),
        Value::Numeric(2.0)
    );
}

#[test]
fn test_builtin_method_rejects_arguments() {
    let node = Node::call(Node::member(Node::string("a"), "upper"), vec![num(1.0)]);
    assert_eq!(
        eval(&node).unwrap_err(),
        RuntimeError::ArityMismatch {
            name: "upper".to_string(),
            expected: 0,
            got: 1,
        }
    );
}

#[test]
fn test_builtin_on_wrong_type_is_missing() {
    let err = eval(&Node::member(num(1.0), "upper")).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::NoSuchProperty {
            kind: ValueKind::Numeric,
            property: "upper".to_string(),
        }
    );
}

#[test]
fn test_object_member_access() {
    let user = Value::object([
        ("name", Value::from("ada")),
        ("upper", Value::from("shadowed")),
    ]);
    let bindings = [("user", user)];
    assert_eq!(
        eval_in(&Node::member(Node::ident("user"), "name"), &bindings).unwrap(),
        Value::from("ada")
    );
    assert_eq!(
        eval_in(&Node::index(Node::ident("user"), Node::string("name")), &bindings).unwrap(),
        Value::from("ada")
    );
    // User data wins over built-ins
    assert_eq!(
        eval_in(&Node::member(Node::ident("user"), "upper"), &bindings).unwrap(),
        Value::from("shadowed")
    );
    assert!(matches!(
        eval_in(&Node::member(Node::ident("user"), "age"), &bindings),
        Err(RuntimeError::NoSuchProperty { .. })
    ));
}

#[test]
fn test_computed_key_must_be_string() {
    let node = Node::index(Node::ident("xs"), num(0.0));
    let err = eval_in(&node, &[("xs", numbers(&[1.0]))]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeError {
            message: "property key must be String, got Numeric".to_string()
        }
    );
}

#[test]
fn test_computed_key_from_variable() {
    let node = Node::index(Node::ident("user"), Node::ident("field"));
    let bindings = [
        ("user", Value::object([("email", Value::from("a@b.c"))])),
        ("field", Value::from("email")),
    ];
    assert_eq!(eval_in(&node, &bindings).unwrap(), Value::from("a@b.c"));
}

// Calls

#[test]
fn test_call_native_function() {
    let join = Function::native("join", |args, _env| {
        let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Ok(Value::String(parts.join("-")))
    });
    let node = Node::call(
        Node::ident("join"),
        vec![Node::string("a"), num(2.0), Node::boolean(true)],
    );
    assert_eq!(
        eval_in(&node, &[("join", Value::Function(join))]).unwrap(),
        Value::from("a-2-true")
    );
}

#[test]
fn test_native_function_sees_calling_scope() {
    let lookup = Function::native("lookup", |args, env| match args.first() {
        Some(Value::String(name)) => Ok(env.lookup_variable(name)),
        _ => Ok(Value::Null),
    });
    let node = Node::for_loop(
        Node::ident("v"),
        Node::ident("items"),
        vec![Node::call(Node::ident("lookup"), vec![Node::string("v")])],
    );
    let bindings = [
        ("lookup", Value::Function(lookup)),
        ("items", numbers(&[7.0, 8.0])),
    ];
    assert_eq!(eval_in(&node, &bindings).unwrap(), Value::from("78"));
}

#[test]
fn test_call_non_function() {
    let node = Node::call(Node::ident("x"), vec![]);
    let err = eval_in(&node, &[("x", Value::Numeric(1.0))]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::NotCallable {
            kind: ValueKind::Numeric
        }
    );
}

#[test]
fn test_arguments_evaluate_before_callee() {
    // Both fail; the argument's failure must be the one reported
    let node = Node::call(
        Node::ident("missing"),
        vec![binary(BinaryOp::Add, Node::ident("missing"), num(1.0))],
    );
    assert!(matches!(
        eval(&node),
        Err(RuntimeError::NullOperation { .. })
    ));
}

// Errors and output form

#[test]
fn test_unknown_node() {
    let node = Node::program(vec![Node::string("a"), Node::Unknown]);
    assert_eq!(
        eval(&node).unwrap_err(),
        RuntimeError::UnknownNode {
            node: "Unknown".to_string()
        }
    );
}

#[test]
fn test_error_aborts_without_partial_output() {
    let node = Node::program(vec![
        Node::string("visible"),
        Node::if_else(num(1.0), vec![], vec![]),
    ]);
    assert!(eval(&node).is_err());
}

#[test]
fn test_printed_forms() {
    assert_eq!(Value::Numeric(7.0).to_string(), "7");
    assert_eq!(Value::Numeric(-0.0).to_string(), "0");
    assert_eq!(Value::Numeric(f64::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(numbers(&[1.0, 2.5]).to_string(), "1,2.5");
    assert_eq!(Value::object([("a", Value::Null)]).to_string(), "[object Object]");
    assert_eq!(Value::Null.to_string(), "");
}

#[test]
fn test_render_unwraps_program_text() {
    let program = Node::program(vec![Node::string("a"), num(1.0)]);
    let env = Environment::new();
    assert_eq!(Interpreter::new().render(&program, &env).unwrap(), "a1");
}

fn sample_template() -> Node {
    Node::program(vec![
        Node::set(Node::ident("greeting"), Node::string("Hello")),
        Node::for_loop(
            Node::ident("user"),
            Node::ident("users"),
            vec![
                Node::ident("greeting"),
                Node::string(" "),
                Node::call(Node::member(Node::member(Node::ident("user"), "name"), "title"), vec![]),
                Node::if_else(
                    Node::member(Node::ident("loop"), "last"),
                    vec![Node::string(".")],
                    vec![Node::string(", ")],
                ),
            ],
        ),
    ])
}

fn sample_globals() -> Environment<'static> {
    let env = Environment::new();
    let users = Value::Array(vec![
        Value::object([("name", Value::from("ada"))]),
        Value::object([("name", Value::from("grace hopper"))]),
    ]);
    env.declare("users", users).unwrap();
    env
}

#[test]
fn test_same_ast_twice_is_identical() {
    let program = sample_template();
    let first = evaluate(&program, &sample_globals()).unwrap();
    let second = evaluate(&program, &sample_globals()).unwrap();
    assert_eq!(first, Value::from("Hello Ada, Hello Grace Hopper."));
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn prop_numeric_addition_matches_host(a in -1.0e9f64..1.0e9, b in -1.0e9f64..1.0e9) {
        let result = eval(&binary(BinaryOp::Add, num(a), num(b))).unwrap();
        prop_assert_eq!(result, Value::Numeric(a + b));
    }

    #[test]
    fn prop_concatenation_uses_printed_forms(s in "[a-z ]{0,12}", n in -1000i32..1000) {
        let result = eval(&binary(BinaryOp::Add, Node::string(s.clone()), num(n as f64))).unwrap();
        prop_assert_eq!(result, Value::String(format!("{}{}", s, n)));
    }

    #[test]
    fn prop_for_renders_every_element(items in proptest::collection::vec(0u32..1000, 0..20)) {
        let array = Value::Array(items.iter().map(|n| Value::Numeric(*n as f64)).collect());
        let node = Node::for_loop(
            Node::ident("v"),
            Node::ident("items"),
            vec![Node::ident("v"), Node::string(",")],
        );
        let expected: String = items.iter().map(|n| format!("{},", n)).collect();
        prop_assert_eq!(eval_in(&node, &[("items", array)]).unwrap(), Value::String(expected));
    }
}
