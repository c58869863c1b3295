//! Parser integration tests.
//!
//! Verifies that the parser builds Babylon-shaped trees from ECMAScript
//! source, checked through the JSON serialisation.

use bumpalo::Bump;
use esparse_ast::visitor::children;
use esparse_ast::Node;
use esparse_parser::{parse, ParserOptions};
use serde_json::Value;

/// Helper: parse a script and return its program as JSON.
fn program(source: &str) -> Value {
    program_with(source, &ParserOptions::default())
}

fn program_with(source: &str, options: &ParserOptions) -> Value {
    let arena = Bump::new();
    let file = parse(&arena, source, options).unwrap_or_else(|err| panic!("{source}: {err}"));
    serde_json::to_value(&file.program).unwrap()
}

/// Helper: the expression of the first statement.
fn expr(source: &str) -> Value {
    program(source)["body"][0]["expression"].clone()
}

/// Helper: the message and offset of a failed parse.
fn error(source: &str, options: &ParserOptions) -> (String, u32) {
    let arena = Bump::new();
    let err = parse(&arena, source, options).expect_err(source);
    (err.message, err.pos)
}

fn script_error(source: &str) -> (String, u32) {
    error(source, &ParserOptions::default())
}

/// Helper: collapse a binary tree into an s-expression.
fn shape(node: &Value) -> String {
    match node["type"].as_str() {
        Some("BinaryExpression") | Some("LogicalExpression") => format!(
            "({} {} {})",
            node["operator"].as_str().unwrap_or("?"),
            shape(&node["left"]),
            shape(&node["right"])
        ),
        Some("NumericLiteral") => node["value"].as_f64().map(|v| v.to_string()).unwrap_or_default(),
        Some("Identifier") => node["name"].as_str().unwrap_or("?").to_string(),
        other => format!("{other:?}"),
    }
}

// ============================================================================
// Determinism and offsets
// ============================================================================

const SAMPLE: &str = r#"
// sample
"use strict";
import fs from "fs";
export default class Reader extends Base {
  constructor(path) { super(); this.path = path; }
  *lines() { for (const l of this.stream) yield l.trim(); }
  static get [Symbol.species]() { return Reader; }
}
export const read = async (p, { encoding = "utf8", ...rest } = {}) => {
  const [head, ...tail] = await fs.read(p, `${encoding}/${rest.mode}`);
  label: for (let i = 0; i < tail.length; i++) { if (!tail[i]) continue label; }
  return head || tail, /ab+c/gi.test(head) ? 2 ** 3 ** 2 : void 0;
};
"#;

fn sample_options() -> ParserOptions {
    ParserOptions::module().with_plugin("objectRestSpread")
}

#[test]
fn test_sample_parses() {
    let json = program_with(SAMPLE, &sample_options());
    assert_eq!(json["sourceType"], "module");
    assert_eq!(json["body"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["directives"][0]["value"]["value"], "use strict");
}

#[test]
fn test_identical_input_gives_identical_trees() {
    let first = program_with(SAMPLE, &sample_options());
    let second = program_with(SAMPLE, &sample_options());
    assert_eq!(first, second);
}

fn check_offsets(node: &Node<'_>, len: u32) {
    assert!(node.start() <= node.end(), "{:?}", node.kind.type_name());
    assert!(node.end() <= len, "{:?}", node.kind.type_name());
    for child in children(node) {
        assert!(node.start() <= child.start() && child.end() <= node.end(), "{}", child.kind.type_name());
        check_offsets(child, len);
    }
}

#[test]
fn test_offsets_are_nested_and_tokens_ordered() {
    let arena = Bump::new();
    let file = parse(&arena, SAMPLE, &sample_options()).unwrap();
    check_offsets(&file.program, SAMPLE.len() as u32);
    for pair in file.tokens.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
    assert_eq!(file.comments.len(), 1);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_precedence() {
    assert_eq!(shape(&expr("1+2*3")), "(+ 1 (* 2 3))");
    assert_eq!(shape(&expr("1*2+3")), "(+ (* 1 2) 3)");
    assert_eq!(shape(&expr("2**3**2")), "(** 2 (** 3 2))");
    assert_eq!(shape(&expr("a || b && c | d")), "(|| a (&& b (| c d)))");
    assert_eq!(shape(&expr("a - b - c")), "(- (- a b) c)");
}

#[test]
fn test_in_is_excluded_from_for_init() {
    let json = program("for (x in y) {}");
    assert_eq!(json["body"][0]["type"], "ForInStatement");
    let json = program("for (var i = (a in b); i; ) {}");
    assert_eq!(json["body"][0]["type"], "ForStatement");
}

#[test]
fn test_update_and_unary() {
    let node = expr("-x++");
    assert_eq!(node["type"], "UnaryExpression");
    assert_eq!(node["argument"]["type"], "UpdateExpression");
    assert_eq!(node["argument"]["prefix"], false);
    assert_eq!(script_error("(-1) ** 2 + -1 ** 2").0, "Illegal expression. Wrap left hand side or entire exponentiation in parentheses.");
}

// ============================================================================
// Automatic semicolon insertion
// ============================================================================

#[test]
fn test_asi_splits_statements() {
    let json = program("a\nb");
    assert_eq!(json["body"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["body"][1]["expression"]["name"], "b");
}

#[test]
fn test_restricted_return() {
    let json = program("function f() { return\na }");
    let body = &json["body"][0]["body"]["body"];
    assert_eq!(body[0]["type"], "ReturnStatement");
    assert_eq!(body[0]["argument"], Value::Null);
    assert_eq!(body[1]["expression"]["name"], "a");
}

#[test]
fn test_postfix_operator_needs_same_line() {
    let json = program("a\n++b");
    assert_eq!(json["body"][1]["expression"]["type"], "UpdateExpression");
    assert_eq!(json["body"][1]["expression"]["prefix"], true);
}

#[test]
fn test_missing_semicolon_on_one_line() {
    assert_eq!(script_error("a b").0, "Unexpected token");
}

// ============================================================================
// Arrows and parentheses
// ============================================================================

#[test]
fn test_arrow_backtracking() {
    let arrow = expr("(a,b)=>a+b");
    assert_eq!(arrow["type"], "ArrowFunctionExpression");
    assert_eq!(arrow["params"][0]["name"], "a");
    assert_eq!(arrow["params"][1]["name"], "b");
    assert_eq!(arrow["expression"], true);

    let sequence = expr("(a,b)");
    assert_eq!(sequence["type"], "SequenceExpression");
    assert_eq!(sequence["expressions"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_arrow_with_patterns_and_defaults() {
    let arrow = expr("({a, b: [c]}, d = 1, ...e) => {}");
    assert_eq!(arrow["params"][0]["type"], "ObjectPattern");
    assert_eq!(arrow["params"][1]["type"], "AssignmentPattern");
    assert_eq!(arrow["params"][2]["type"], "RestElement");
}

#[test]
fn test_async_arrows_and_calls() {
    assert_eq!(expr("async x => x")["async"], true);
    assert_eq!(expr("async (x) => x")["async"], true);
    assert_eq!(expr("async(x)")["type"], "CallExpression");
}

#[test]
fn test_empty_parens_need_an_arrow() {
    assert_eq!(script_error("()").0, "Unexpected token");
}

// ============================================================================
// Regular expressions
// ============================================================================

#[test]
fn test_regex_or_division() {
    assert_eq!(shape(&expr("a/b/g")), "(/ (/ a b) g)");

    let json = program("if(x)/y/.test(z)");
    let callee = &json["body"][0]["consequent"]["expression"]["callee"];
    assert_eq!(callee["object"]["type"], "RegExpLiteral");
    assert_eq!(callee["object"]["pattern"], "y");

    assert_eq!(expr("x = /=/")["right"]["type"], "RegExpLiteral");
    assert_eq!(expr("(a)/2")["type"], "BinaryExpression");
}

// ============================================================================
// Strict mode
// ============================================================================

#[test]
fn test_retroactive_strict_mode() {
    assert_eq!(script_error("\"use strict\"; 010;"), ("Invalid number".to_string(), 14));
    assert_eq!(script_error("function f() { \"use strict\"; with (a) {} }").0, "'with' in strict mode");
    let json = program("function f() { \"use strict\"; } 010;");
    assert_eq!(json["body"][1]["expression"]["value"], 8.0);
}

#[test]
fn test_module_code_is_strict() {
    let (message, _) = error("var yield;", &ParserOptions::module());
    assert!(message.contains("yield"), "{message}");
    let json = program("var yield;");
    assert_eq!(json["body"][0]["declarations"][0]["id"]["name"], "yield");
}

// ============================================================================
// Context rules
// ============================================================================

#[test]
fn test_return_outside_function() {
    assert_eq!(script_error("return 1").0, "'return' outside of function");
    let options = ParserOptions {
        allow_return_outside_function: true,
        ..ParserOptions::default()
    };
    assert_eq!(program_with("return 1", &options)["body"][0]["type"], "ReturnStatement");
}

#[test]
fn test_import_needs_module() {
    assert_eq!(
        script_error("import a from \"a\"").0,
        "'import' and 'export' may appear only with 'sourceType: module'"
    );
    let json = program_with("import a, { b as c } from \"a\"", &ParserOptions::module());
    let specifiers = &json["body"][0]["specifiers"];
    assert_eq!(specifiers[0]["type"], "ImportDefaultSpecifier");
    assert_eq!(specifiers[1]["imported"]["name"], "b");
    assert_eq!(specifiers[1]["local"]["name"], "c");
}

#[test]
fn test_nesting_limit() {
    let options = ParserOptions {
        max_nesting_depth: 20,
        ..ParserOptions::default()
    };
    let deep = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(error(&deep, &options).0, "Maximum nesting depth exceeded");
    let shallow = format!("{}1{}", "(".repeat(3), ")".repeat(3));
    assert_eq!(program_with(&shallow, &options)["body"][0]["expression"]["value"], 1.0);
}

#[test]
fn test_nesting_limit_covers_binding_patterns() {
    let options = ParserOptions {
        max_nesting_depth: 20,
        ..ParserOptions::default()
    };
    let arrays = format!("var {}a{} = x", "[".repeat(50), "]".repeat(50));
    assert_eq!(error(&arrays, &options).0, "Maximum nesting depth exceeded");
    let objects = format!("var {}a{} = x", "{a: ".repeat(50), "}".repeat(50));
    assert_eq!(error(&objects, &options).0, "Maximum nesting depth exceeded");
    let params = format!("function f({}a{}) {{}}", "[".repeat(50), "]".repeat(50));
    assert_eq!(error(&params, &options).0, "Maximum nesting depth exceeded");

    let shallow = "var [[a], {b: [c]}] = x";
    assert_eq!(program_with(shallow, &options)["body"][0]["declarations"][0]["id"]["type"], "ArrayPattern");
}

#[test]
fn test_default_nesting_limit_fits_small_stack() {
    let depth = esparse_parser::DEFAULT_MAX_NESTING_DEPTH as usize + 1;
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let parens = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
            let patterns = format!("var {}a{} = x", "[".repeat(depth), "]".repeat(depth));
            let options = ParserOptions::default();
            (error(&parens, &options).0, error(&patterns, &options).0)
        })
        .unwrap();
    let (parens, patterns) = handle.join().unwrap();
    assert_eq!(parens, "Maximum nesting depth exceeded");
    assert_eq!(patterns, "Maximum nesting depth exceeded");
}

#[test]
fn test_source_filename_is_attached() {
    let options = ParserOptions {
        source_filename: Some("app.js".to_string()),
        ..ParserOptions::default()
    };
    let json = program_with("a + b", &options);
    assert_eq!(json["loc"]["filename"], "app.js");
    assert_eq!(json["body"][0]["expression"]["left"]["loc"]["filename"], "app.js");

    let arena = Bump::new();
    let err = parse(&arena, "var = 1", &options).unwrap_err();
    assert_eq!(err.filename.as_deref(), Some("app.js"));
    assert_eq!(err.to_string(), "Unexpected token (1:4)");
    let value = serde_json::to_value(&err).unwrap();
    assert_eq!(value["filename"], "app.js");

    let err = parse(&arena, "'open", &options).unwrap_err();
    assert_eq!(err.message, "Unterminated string constant");
    assert_eq!(err.filename.as_deref(), Some("app.js"));
}

#[test]
fn test_no_filename_without_option() {
    let json = program("a");
    assert!(json["loc"].get("filename").is_none());
    let arena = Bump::new();
    let err = parse(&arena, "var = 1", &ParserOptions::default()).unwrap_err();
    assert_eq!(err.filename, None);
    assert!(serde_json::to_value(&err).unwrap().get("filename").is_none());
}

#[test]
fn test_error_position_is_reported() {
    let arena = Bump::new();
    let err = parse(&arena, "var a = ;", &ParserOptions::default()).unwrap_err();
    assert_eq!(err.pos, 8);
    assert_eq!(err.loc.line, 1);
    assert_eq!(err.loc.column, 8);
    assert_eq!(err.to_string(), "Unexpected token (1:8)");
}
