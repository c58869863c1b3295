//! Extension integration tests.
//!
//! Verifies that proposal syntax is gated by the `plugins` option and that
//! the built-in extensions compose.

use bumpalo::Bump;
use esparse_parser::{parse, ParserOptions};
use serde_json::Value;

fn program_with(source: &str, options: &ParserOptions) -> Value {
    let arena = Bump::new();
    let file = parse(&arena, source, options).unwrap_or_else(|err| panic!("{source}: {err}"));
    serde_json::to_value(&file.program).unwrap()
}

fn error_with(source: &str, options: &ParserOptions) -> (String, u32) {
    let arena = Bump::new();
    let err = parse(&arena, source, options).expect_err(source);
    (err.message, err.pos)
}

fn gate_error(plugin: &str) -> String {
    format!("This experimental syntax requires enabling the parser plugin: '{plugin}'")
}

// ============================================================================
// Feature gates
// ============================================================================

#[test]
fn test_decorators_are_gated() {
    let source = "@dec class A {}";
    assert_eq!(error_with(source, &ParserOptions::default()), (gate_error("decorators"), 0));

    let json = program_with(source, &ParserOptions::default().with_plugin("decorators"));
    let class = &json["body"][0];
    assert_eq!(class["type"], "ClassDeclaration");
    assert_eq!(class["decorators"][0]["type"], "Decorator");
    assert_eq!(class["decorators"][0]["expression"]["name"], "dec");
}

#[test]
fn test_class_properties_are_gated() {
    let source = "class A { x = 1; static y = 2 }";
    assert_eq!(error_with(source, &ParserOptions::default()).0, gate_error("classProperties"));
    let json = program_with(source, &ParserOptions::default().with_plugin("classProperties"));
    let members = &json["body"][0]["body"]["body"];
    assert_eq!(members[0]["type"], "ClassProperty");
    assert_eq!(members[1]["static"], true);
}

#[test]
fn test_object_rest_spread_is_gated() {
    let source = "({...a, b} = c);";
    assert!(parse(&Bump::new(), source, &ParserOptions::default()).is_err());
    let json = program_with(source, &ParserOptions::default().with_plugin("objectRestSpread"));
    let left = &json["body"][0]["expression"]["left"];
    assert_eq!(left["type"], "ObjectPattern");
    assert_eq!(left["properties"][0]["type"], "RestProperty");
}

#[test]
fn test_function_bind_and_do_expressions() {
    let options = ParserOptions::default().with_plugin("functionBind").with_plugin("doExpressions");
    let json = program_with("a::b; ::c.d; x = do { 1 };", &options);
    assert_eq!(json["body"][0]["expression"]["type"], "BindExpression");
    assert_eq!(json["body"][1]["expression"]["object"], Value::Null);
    assert_eq!(json["body"][2]["expression"]["right"]["type"], "DoExpression");
    assert!(parse(&Bump::new(), "x = do { 1 };", &ParserOptions::default()).is_err());
}

#[test]
fn test_export_extensions() {
    let source = "export v from \"mod\"; export * as ns from \"mod\";";
    assert!(parse(&Bump::new(), source, &ParserOptions::module()).is_err());
    let json = program_with(source, &ParserOptions::module().with_plugin("exportExtensions"));
    assert_eq!(json["body"][0]["specifiers"][0]["type"], "ExportDefaultSpecifier");
    assert_eq!(json["body"][1]["specifiers"][0]["type"], "ExportNamespaceSpecifier");
}

#[test]
fn test_async_generators_are_gated() {
    let source = "async function* f() { for await (const x of y) {} }";
    assert_eq!(error_with(source, &ParserOptions::default()).0, gate_error("asyncGenerators"));
    let json = program_with(source, &ParserOptions::default().with_plugin("asyncGenerators"));
    assert_eq!(json["body"][0]["generator"], true);
    assert_eq!(json["body"][0]["body"]["body"][0]["type"], "ForAwaitStatement");
}

#[test]
fn test_baseline_names_and_unknown_plugins_are_accepted() {
    let options = ParserOptions::default()
        .with_plugin("asyncFunctions")
        .with_plugin("exponentiationOperator")
        .with_plugin("noSuchPlugin");
    let json = program_with("async function f() { await g(2 ** 2); }", &options);
    assert_eq!(json["body"][0]["async"], true);
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_jsx_and_flow_together() {
    let options = ParserOptions::module().with_plugin("jsx").with_plugin("flow");
    let source = "type Props = { name: string };\nconst el = (p: Props): Element => <div title={p.name}>hi</div>;";
    let json = program_with(source, &options);
    assert_eq!(json["body"][0]["type"], "TypeAlias");
    let arrow = &json["body"][1]["declarations"][0]["init"];
    assert_eq!(arrow["params"][0]["typeAnnotation"]["typeAnnotation"]["id"]["name"], "Props");
    assert_eq!(arrow["body"]["type"], "JSXElement");
    assert_eq!(arrow["body"]["openingElement"]["attributes"][0]["value"]["type"], "JSXExpressionContainer");
}

#[test]
fn test_jsx_in_expression_positions() {
    let options = ParserOptions::default().with_plugin("jsx");
    let json = program_with("f(<a/>, x < y ? <b:c/> : <d.e></d.e>);", &options);
    let args = &json["body"][0]["expression"]["arguments"];
    assert_eq!(args[0]["type"], "JSXElement");
    assert_eq!(args[0]["closingElement"], Value::Null);
    let conditional = &args[1];
    assert_eq!(conditional["test"]["type"], "BinaryExpression");
    assert_eq!(conditional["consequent"]["openingElement"]["name"]["type"], "JSXNamespacedName");
    assert_eq!(conditional["alternate"]["openingElement"]["name"]["type"], "JSXMemberExpression");
}

#[test]
fn test_adjacent_jsx_elements() {
    let options = ParserOptions::default().with_plugin("jsx");
    assert_eq!(
        error_with("<a></a><b></b>", &options).0,
        "Adjacent JSX elements must be wrapped in an enclosing tag"
    );
}

#[test]
fn test_unterminated_jsx_contents() {
    let options = ParserOptions::default().with_plugin("jsx");
    assert_eq!(error_with("<a>text", &options).0, "Unterminated JSX contents");
}
