use crate::{Case, Category, Expect, Setup};

const fn program(
    name: &'static str,
    category: Category,
    setup: Setup,
    source: &'static str,
    expected: &'static str,
) -> Case {
    Case {
        name,
        category,
        source,
        setup,
        expect: Expect::Program(expected),
    }
}

const fn error(name: &'static str, setup: Setup, source: &'static str, message: &'static str, pos: u32) -> Case {
    Case {
        name,
        category: Category::Errors,
        source,
        setup,
        expect: Expect::Error { message, pos },
    }
}

const JSX: Setup = Setup { module: false, plugins: &["jsx"] };
const FLOW: Setup = Setup { module: false, plugins: &["flow"] };
const CLASS_EXTRAS: Setup = Setup {
    module: false,
    plugins: &["decorators", "classProperties"],
};

pub static CORPUS: &[Case] = &[
    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------
    program(
        "variable_kinds",
        Category::Statements,
        Setup::SCRIPT,
        "var a = 1; let b; const c = 2;",
        r#"{"body": [
            {"type": "VariableDeclaration", "kind": "var",
             "declarations": [{"id": {"name": "a"}, "init": {"value": 1}}]},
            {"kind": "let", "declarations": [{"id": {"name": "b"}, "init": null}]},
            {"kind": "const", "declarations": [{"init": {"type": "NumericLiteral"}}]}
        ]}"#,
    ),
    program(
        "if_else",
        Category::Statements,
        Setup::SCRIPT,
        "if (a) b; else c;",
        r#"{"body": [{"type": "IfStatement", "test": {"name": "a"},
            "consequent": {"type": "ExpressionStatement"},
            "alternate": {"expression": {"name": "c"}}}]}"#,
    ),
    program(
        "labeled_loop",
        Category::Statements,
        Setup::SCRIPT,
        "outer: for (;;) { break outer; }",
        r#"{"body": [{"type": "LabeledStatement", "label": {"name": "outer"},
            "body": {"type": "ForStatement", "init": null, "test": null, "update": null,
                "body": {"body": [{"type": "BreakStatement", "label": {"name": "outer"}}]}}}]}"#,
    ),
    program(
        "switch_cases",
        Category::Statements,
        Setup::SCRIPT,
        "switch (x) { case 1: a(); break; default: }",
        r#"{"body": [{"type": "SwitchStatement", "discriminant": {"name": "x"}, "cases": [
            {"test": {"value": 1}, "consequent": [{"type": "ExpressionStatement"}, {"type": "BreakStatement"}]},
            {"test": null, "consequent": []}
        ]}]}"#,
    ),
    program(
        "try_catch_finally",
        Category::Statements,
        Setup::SCRIPT,
        "try { a; } catch (e) {} finally {}",
        r#"{"body": [{"type": "TryStatement", "block": {"type": "BlockStatement"},
            "handler": {"type": "CatchClause", "param": {"name": "e"}},
            "finalizer": {"type": "BlockStatement", "body": []}}]}"#,
    ),
    program(
        "do_while",
        Category::Statements,
        Setup::SCRIPT,
        "do x++; while (x < 5);",
        r#"{"body": [{"type": "DoWhileStatement",
            "body": {"expression": {"type": "UpdateExpression", "prefix": false}},
            "test": {"operator": "<"}}]}"#,
    ),
    program(
        "for_of_destructuring",
        Category::Statements,
        Setup::SCRIPT,
        "for (const [k, v] of m) {}",
        r#"{"body": [{"type": "ForOfStatement",
            "left": {"type": "VariableDeclaration", "kind": "const",
                "declarations": [{"id": {"type": "ArrayPattern", "elements": [{"name": "k"}, {"name": "v"}]}, "init": null}]},
            "right": {"name": "m"}}]}"#,
    ),
    program(
        "generator_declaration",
        Category::Statements,
        Setup::SCRIPT,
        "function* g(a, b = 1, ...c) { yield* a; }",
        r#"{"body": [{"type": "FunctionDeclaration", "id": {"name": "g"}, "generator": true, "async": false,
            "params": [{"type": "Identifier"}, {"type": "AssignmentPattern"}, {"type": "RestElement"}],
            "body": {"body": [{"expression": {"type": "YieldExpression", "delegate": true}}]}}]}"#,
    ),
    program(
        "directive_prologue",
        Category::Statements,
        Setup::SCRIPT,
        "\"use strict\"; 'x'; y;",
        r#"{"directives": [
            {"type": "Directive", "value": {"type": "DirectiveLiteral", "value": "use strict"}},
            {"value": {"value": "x"}}
        ], "body": [{"expression": {"name": "y"}}]}"#,
    ),
    program(
        "class_members",
        Category::Statements,
        Setup::SCRIPT,
        "class A extends B { constructor() { super(); } static m() {} get x() { return 1; } set x(v) {} }",
        r#"{"body": [{"type": "ClassDeclaration", "id": {"name": "A"}, "superClass": {"name": "B"},
            "body": {"type": "ClassBody", "body": [
                {"type": "ClassMethod", "kind": "constructor",
                 "body": {"body": [{"expression": {"callee": {"type": "Super"}}}]}},
                {"kind": "method", "static": true, "key": {"name": "m"}},
                {"kind": "get", "params": []},
                {"kind": "set", "params": [{"name": "v"}]}
            ]}}]}"#,
    ),
    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------
    program(
        "member_call_chain",
        Category::Expressions,
        Setup::SCRIPT,
        "a.b[c](d);",
        r#"{"body": [{"expression": {"type": "CallExpression",
            "callee": {"type": "MemberExpression", "computed": true, "property": {"name": "c"},
                "object": {"type": "MemberExpression", "computed": false, "property": {"name": "b"}}},
            "arguments": [{"name": "d"}]}}]}"#,
    ),
    program(
        "new_with_member",
        Category::Expressions,
        Setup::SCRIPT,
        "new a.B(1);",
        r#"{"body": [{"expression": {"type": "NewExpression",
            "callee": {"type": "MemberExpression"}, "arguments": [{"value": 1}]}}]}"#,
    ),
    program(
        "new_target",
        Category::Expressions,
        Setup::SCRIPT,
        "function f() { new.target; }",
        r#"{"body": [{"body": {"body": [{"expression": {"type": "MetaProperty",
            "meta": {"name": "new"}, "property": {"name": "target"}}}]}}]}"#,
    ),
    program(
        "template_literal",
        Category::Expressions,
        Setup::SCRIPT,
        "`a${b}c`;",
        r#"{"body": [{"expression": {"type": "TemplateLiteral",
            "quasis": [{"value": {"cooked": "a"}, "tail": false}, {"value": {"cooked": "c"}, "tail": true}],
            "expressions": [{"name": "b"}]}}]}"#,
    ),
    program(
        "tagged_template",
        Category::Expressions,
        Setup::SCRIPT,
        "tag`x`;",
        r#"{"body": [{"expression": {"type": "TaggedTemplateExpression",
            "tag": {"name": "tag"}, "quasi": {"type": "TemplateLiteral"}}}]}"#,
    ),
    program(
        "object_literal",
        Category::Expressions,
        Setup::SCRIPT,
        "({a, b: 1, [c]: 2, d() {}, get e() { return 1; }});",
        r#"{"body": [{"expression": {"type": "ObjectExpression", "properties": [
            {"type": "ObjectProperty", "shorthand": true, "key": {"name": "a"}},
            {"type": "ObjectProperty", "shorthand": false, "value": {"value": 1}},
            {"type": "ObjectProperty", "computed": true},
            {"type": "ObjectMethod", "kind": "method"},
            {"type": "ObjectMethod", "kind": "get"}
        ]}}]}"#,
    ),
    program(
        "array_holes_and_spread",
        Category::Expressions,
        Setup::SCRIPT,
        "[a, , ...b];",
        r#"{"body": [{"expression": {"type": "ArrayExpression",
            "elements": [{"name": "a"}, null, {"type": "SpreadElement", "argument": {"name": "b"}}]}}]}"#,
    ),
    program(
        "conditional_assignment",
        Category::Expressions,
        Setup::SCRIPT,
        "a = b ? c : d;",
        r#"{"body": [{"expression": {"type": "AssignmentExpression", "operator": "=",
            "right": {"type": "ConditionalExpression", "test": {"name": "b"}, "alternate": {"name": "d"}}}}]}"#,
    ),
    program(
        "logical_over_equality",
        Category::Expressions,
        Setup::SCRIPT,
        "a && b === c;",
        r#"{"body": [{"expression": {"type": "LogicalExpression", "operator": "&&",
            "right": {"type": "BinaryExpression", "operator": "==="}}}]}"#,
    ),
    program(
        "exponent_assignment",
        Category::Expressions,
        Setup::SCRIPT,
        "a **= 2;",
        r#"{"body": [{"expression": {"type": "AssignmentExpression", "operator": "**="}}]}"#,
    ),
    program(
        "keyword_unaries",
        Category::Expressions,
        Setup::SCRIPT,
        "typeof a, void 0, delete a.b;",
        r#"{"body": [{"expression": {"type": "SequenceExpression", "expressions": [
            {"type": "UnaryExpression", "operator": "typeof", "prefix": true},
            {"operator": "void"},
            {"operator": "delete", "argument": {"type": "MemberExpression"}}
        ]}}]}"#,
    ),
    program(
        "async_await",
        Category::Expressions,
        Setup::SCRIPT,
        "async function f() { await x; }",
        r#"{"body": [{"type": "FunctionDeclaration", "async": true,
            "body": {"body": [{"expression": {"type": "AwaitExpression", "argument": {"name": "x"}}}]}}]}"#,
    ),
    program(
        "arrow_block_body",
        Category::Expressions,
        Setup::SCRIPT,
        "x => { return x; };",
        r#"{"body": [{"expression": {"type": "ArrowFunctionExpression", "expression": false,
            "params": [{"name": "x"}], "body": {"type": "BlockStatement"}}}]}"#,
    ),
    program(
        "parenthesized_marker",
        Category::Expressions,
        Setup::SCRIPT,
        "(a);",
        r#"{"body": [{"expression": {"type": "Identifier", "parenStart": 0, "start": 1, "end": 2}}]}"#,
    ),
    program(
        "regexp_flags",
        Category::Expressions,
        Setup::SCRIPT,
        "/a+/gi;",
        r#"{"body": [{"expression": {"type": "RegExpLiteral", "pattern": "a+", "flags": "gi"}}]}"#,
    ),
    program(
        "string_escapes",
        Category::Expressions,
        Setup::SCRIPT,
        r#"x = "a\nA";"#,
        r#"{"body": [{"expression": {"right": {"type": "StringLiteral", "value": "a\nA"}}}]}"#,
    ),
    program(
        "numeric_forms",
        Category::Expressions,
        Setup::SCRIPT,
        "0x1F; 0o17; 0b11; 1e3; .5;",
        r#"{"body": [
            {"expression": {"value": 31}},
            {"expression": {"value": 15}},
            {"expression": {"value": 3}},
            {"expression": {"value": 1000}},
            {"expression": {"value": 0.5}}
        ]}"#,
    ),
    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------
    program(
        "import_forms",
        Category::Modules,
        Setup::MODULE,
        "import a, * as ns from \"m\"; import {b as c, d} from \"n\";",
        r#"{"sourceType": "module", "body": [
            {"type": "ImportDeclaration", "source": {"value": "m"}, "specifiers": [
                {"type": "ImportDefaultSpecifier", "local": {"name": "a"}},
                {"type": "ImportNamespaceSpecifier", "local": {"name": "ns"}}
            ]},
            {"source": {"value": "n"}, "specifiers": [
                {"type": "ImportSpecifier", "imported": {"name": "b"}, "local": {"name": "c"}},
                {"imported": {"name": "d"}, "local": {"name": "d"}}
            ]}
        ]}"#,
    ),
    program(
        "export_forms",
        Category::Modules,
        Setup::MODULE,
        "export const x = 1; export { x as y }; export * from \"m\"; export default function () {}",
        r#"{"body": [
            {"type": "ExportNamedDeclaration", "declaration": {"type": "VariableDeclaration"}, "specifiers": []},
            {"type": "ExportNamedDeclaration", "declaration": null,
             "specifiers": [{"type": "ExportSpecifier", "local": {"name": "x"}, "exported": {"name": "y"}}]},
            {"type": "ExportAllDeclaration", "source": {"value": "m"}},
            {"type": "ExportDefaultDeclaration", "declaration": {"type": "FunctionDeclaration", "id": null}}
        ]}"#,
    ),
    // ------------------------------------------------------------------
    // Extensions
    // ------------------------------------------------------------------
    program(
        "jsx_attributes_and_text",
        Category::Extensions,
        JSX,
        "<a b=\"c\" {...d}>t</a>;",
        r#"{"body": [{"expression": {"type": "JSXElement",
            "openingElement": {"name": {"name": "a"}, "selfClosing": false, "attributes": [
                {"type": "JSXAttribute", "name": {"name": "b"}, "value": {"type": "StringLiteral", "value": "c"}},
                {"type": "JSXSpreadAttribute", "argument": {"name": "d"}}
            ]},
            "children": [{"type": "JSXText", "value": "t"}],
            "closingElement": {"name": {"name": "a"}}}}]}"#,
    ),
    program(
        "flow_generic_alias",
        Category::Extensions,
        FLOW,
        "type A<T> = ?T | Array<T>;",
        r#"{"body": [{"type": "TypeAlias", "id": {"name": "A"},
            "typeParameters": {"type": "TypeParameterDeclaration", "params": [{"name": "T"}]},
            "right": {"type": "UnionTypeAnnotation", "types": [
                {"type": "NullableTypeAnnotation"},
                {"type": "GenericTypeAnnotation", "id": {"name": "Array"},
                 "typeParameters": {"type": "TypeParameterInstantiation"}}
            ]}}]}"#,
    ),
    program(
        "decorated_members",
        Category::Extensions,
        CLASS_EXTRAS,
        "class A { @dec m() {} static p = 1; }",
        r#"{"body": [{"type": "ClassDeclaration", "body": {"body": [
            {"type": "ClassMethod", "decorators": [{"type": "Decorator", "expression": {"name": "dec"}}]},
            {"type": "ClassProperty", "static": true, "value": {"value": 1}}
        ]}}]}"#,
    ),
    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------
    error("missing_expression", Setup::SCRIPT, "var a = ;", "Unexpected token", 8),
    error("return_at_top_level", Setup::SCRIPT, "return;", "'return' outside of function", 0),
    error("with_in_module", Setup::MODULE, "with (a) {}", "'with' in strict mode", 0),
    error("try_without_handler", Setup::SCRIPT, "try {}", "Missing catch or finally clause", 0),
    error("duplicate_label", Setup::SCRIPT, "a: a: ;", "Label 'a' is already declared", 3),
    error(
        "second_default_clause",
        Setup::SCRIPT,
        "switch (x) { default: default: }",
        "Multiple default clauses",
        22,
    ),
    error("throw_newline", Setup::SCRIPT, "throw\n1", "Illegal newline after throw", 5),
    error("getter_with_param", Setup::SCRIPT, "({get a(x) {}});", "getter should have no params", 2),
    error("rest_not_last", Setup::SCRIPT, "let [...a, b] = c;", "Rest element must be last element", 9),
    error("assign_to_literal", Setup::SCRIPT, "1 = 2;", "Assigning to rvalue", 0),
    error("unterminated_string", Setup::SCRIPT, "\"abc", "Unterminated string constant", 0),
    error(
        "gated_decorator",
        Setup::SCRIPT,
        "@dec class A {}",
        "This experimental syntax requires enabling the parser plugin: 'decorators'",
        0,
    ),
];
