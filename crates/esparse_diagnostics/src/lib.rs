//! esparse_diagnostics: The syntax error type and the message catalogue.
//!
//! Parsing stops at the first error, so there is exactly one diagnostic kind:
//! a [`SyntaxError`] carrying the byte offset, the derived line/column and the
//! message. Message templates live in [`messages`] and may contain `{0}`,
//! `{1}` placeholders.

use esparse_core::text::Position;
use miette::LabeledSpan;
use serde::Serialize;
use std::fmt;

/// Sub-category of a syntax error. All categories surface identically to
/// callers; the category only helps tooling group failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Malformed tokens: unterminated literals, bad escapes, invalid numbers.
    Lexical,
    /// An unexpected token or an otherwise malformed production.
    Unexpected,
    /// A strict-mode violation, possibly detected retroactively.
    Strict,
    /// An invalid assignment target, binding or class member.
    Binding,
    /// A construct used outside the context that permits it.
    Context,
    /// Syntax that is only valid with a parser extension enabled.
    Extension,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Lexical => "lexical",
            ErrorCategory::Unexpected => "unexpected",
            ErrorCategory::Strict => "strict",
            ErrorCategory::Binding => "binding",
            ErrorCategory::Context => "context",
            ErrorCategory::Extension => "extension",
        };
        f.write_str(name)
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMessage {
    /// Stable numeric code.
    pub code: u32,
    /// The category of this diagnostic.
    pub category: ErrorCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

impl DiagnosticMessage {
    /// Resolve the template with the given arguments.
    pub fn format(&self, args: &[&str]) -> String {
        format_message(self.message, args)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// The error produced by a failed parse.
///
/// Displays as `"{message} ({line}:{column})"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("{message} ({}:{})", .loc.line, .loc.column)]
pub struct SyntaxError {
    /// The resolved message text.
    pub message: String,
    /// Byte offset of the offending source text.
    pub pos: u32,
    /// Line/column of `pos`.
    pub loc: Position,
    /// Code of the message template that produced this error.
    pub code: u32,
    pub category: ErrorCategory,
    /// Name of the source file, when the caller supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl SyntaxError {
    pub fn new(message: &DiagnosticMessage, args: &[&str], pos: u32, loc: Position) -> Self {
        Self {
            message: message.format(args),
            pos,
            loc,
            code: message.code,
            category: message.category,
            filename: None,
        }
    }

    /// Tag the error with the file it was raised in.
    pub fn with_filename(mut self, filename: Option<&str>) -> Self {
        self.filename = filename.map(str::to_string);
        self
    }
}

impl miette::Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("esparse::{}({})", self.category, self.code)))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new(Some(self.message.clone()), self.pos as usize, 0);
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $category:ident, $msg:expr) => {
            DiagnosticMessage { code: $code, category: ErrorCategory::$category, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!(1000, Lexical, "Unexpected character '{0}'");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1001, Lexical, "Unterminated comment");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(1002, Lexical, "Unterminated string constant");
    pub const UNTERMINATED_TEMPLATE: DiagnosticMessage = diag!(1003, Lexical, "Unterminated template");
    pub const UNTERMINATED_REGEXP: DiagnosticMessage = diag!(1004, Lexical, "Unterminated regular expression");
    pub const INVALID_REGEXP_FLAG: DiagnosticMessage = diag!(1005, Lexical, "Invalid regular expression flag");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1006, Lexical, "Invalid number");
    pub const EXPECTED_NUMBER_IN_RADIX: DiagnosticMessage = diag!(1007, Lexical, "Expected number in radix {0}");
    pub const IDENTIFIER_AFTER_NUMBER: DiagnosticMessage = diag!(1008, Lexical, "Identifier directly after number");
    pub const BAD_ESCAPE: DiagnosticMessage = diag!(1009, Lexical, "Bad character escape sequence");
    pub const CODE_POINT_OUT_OF_BOUNDS: DiagnosticMessage = diag!(1010, Lexical, "Code point out of bounds");
    pub const EXPECTING_UNICODE_ESCAPE: DiagnosticMessage = diag!(1011, Lexical, "Expecting Unicode escape sequence \\uXXXX");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!(1012, Lexical, "Invalid Unicode escape");
    pub const UNTERMINATED_JSX_CONTENTS: DiagnosticMessage = diag!(1013, Lexical, "Unterminated JSX contents");

    // ========================================================================
    // Unexpected tokens and malformed productions (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(1100, Unexpected, "Unexpected token");
    pub const UNEXPECTED_TOKEN_EXPECTED: DiagnosticMessage = diag!(1101, Unexpected, "Unexpected token, expected {0}");
    pub const UNEXPECTED_KEYWORD: DiagnosticMessage = diag!(1102, Unexpected, "Unexpected keyword '{0}'");
    pub const ILLEGAL_NEWLINE_AFTER_THROW: DiagnosticMessage = diag!(1103, Unexpected, "Illegal newline after throw");
    pub const MISSING_CATCH_OR_FINALLY: DiagnosticMessage = diag!(1104, Unexpected, "Missing catch or finally clause");
    pub const MULTIPLE_DEFAULT_CLAUSES: DiagnosticMessage = diag!(1105, Unexpected, "Multiple default clauses");
    pub const LABEL_ALREADY_DECLARED: DiagnosticMessage = diag!(1106, Unexpected, "Label '{0}' is already declared");
    pub const COMPLEX_BINDING_NEEDS_INIT: DiagnosticMessage = diag!(1107, Unexpected, "Complex binding patterns require an initialization value");
    pub const ILLEGAL_EXPONENT_LHS: DiagnosticMessage = diag!(1108, Unexpected, "Illegal expression. Wrap left hand side or entire exponentiation in parentheses.");
    pub const AWAIT_STAR_REMOVED: DiagnosticMessage = diag!(1109, Unexpected, "await* has been removed from the async functions proposal. Use Promise.all() instead.");
    pub const INVALID_META_PROPERTY: DiagnosticMessage = diag!(1110, Unexpected, "The only valid meta property for {0} is {0}.{1}");
    pub const GETTER_NO_PARAMS: DiagnosticMessage = diag!(1111, Unexpected, "getter should have no params");
    pub const SETTER_ONE_PARAM: DiagnosticMessage = diag!(1112, Unexpected, "setter should have exactly one param");
    pub const TRAILING_DECORATORS: DiagnosticMessage = diag!(1113, Unexpected, "You have trailing decorators with no method");
    pub const LEADING_DECORATORS: DiagnosticMessage = diag!(1114, Unexpected, "Leading decorators must be attached to a class declaration");
    pub const DECORATORS_ON_EXPORT: DiagnosticMessage = diag!(1115, Unexpected, "You can only use decorators on an export when exporting a class");
    pub const MAX_NESTING_DEPTH: DiagnosticMessage = diag!(1116, Unexpected, "Maximum nesting depth exceeded");
    pub const EXPECTED_CLOSING_JSX_TAG: DiagnosticMessage = diag!(1117, Unexpected, "Expected corresponding JSX closing tag for <{0}>");
    pub const ADJACENT_JSX_ELEMENTS: DiagnosticMessage = diag!(1118, Unexpected, "Adjacent JSX elements must be wrapped in an enclosing tag");
    pub const JSX_INVALID_ATTRIBUTE_VALUE: DiagnosticMessage = diag!(1119, Unexpected, "JSX value should be either an expression or a quoted JSX text");
    pub const JSX_EMPTY_ATTRIBUTE_EXPRESSION: DiagnosticMessage = diag!(1120, Unexpected, "JSX attributes must only be assigned a non-empty expression");
    pub const REST_ELEMENT_NOT_LAST: DiagnosticMessage = diag!(1121, Unexpected, "Rest element must be last element");
    pub const UNEXPECTED_SUPER: DiagnosticMessage = diag!(1122, Unexpected, "Unexpected super");
    pub const OBJECT_PATTERN_ACCESSOR: DiagnosticMessage = diag!(1123, Unexpected, "Object pattern can't contain getter or setter");
    pub const OBJECT_PATTERN_METHOD: DiagnosticMessage = diag!(1124, Unexpected, "Object pattern can't contain methods");
    pub const DEFAULT_ONLY_EQ: DiagnosticMessage = diag!(1125, Unexpected, "Only '=' operator can be used for specifying default value.");
    pub const BIND_ON_PROPERTY: DiagnosticMessage = diag!(1126, Unexpected, "Binding should be performed on object property.");
    pub const TRAILING_PROPERTY_DECORATORS: DiagnosticMessage = diag!(1127, Unexpected, "You have trailing decorators with no property");

    // ========================================================================
    // Strict mode violations (1200-1299)
    // ========================================================================
    pub const OCTAL_IN_STRICT: DiagnosticMessage = diag!(1200, Strict, "Octal literal in strict mode");
    pub const WITH_IN_STRICT: DiagnosticMessage = diag!(1201, Strict, "'with' in strict mode");
    pub const DELETE_LOCAL_IN_STRICT: DiagnosticMessage = diag!(1202, Strict, "Deleting local variable in strict mode");
    pub const RESERVED_WORD: DiagnosticMessage = diag!(1203, Strict, "The keyword '{0}' is reserved");
    pub const ASSIGN_IN_STRICT: DiagnosticMessage = diag!(1204, Strict, "Assigning to {0} in strict mode");
    pub const BINDING_IN_STRICT: DiagnosticMessage = diag!(1205, Strict, "Binding {0} in strict mode");
    pub const ARGUMENT_NAME_CLASH: DiagnosticMessage = diag!(1206, Strict, "Argument name clash in strict mode");
    pub const NON_SIMPLE_PARAMETER: DiagnosticMessage = diag!(1207, Strict, "Non-simple parameter in strict mode");

    // ========================================================================
    // Binding validity (1300-1399)
    // ========================================================================
    pub const ASSIGNING_TO_RVALUE: DiagnosticMessage = diag!(1300, Binding, "Assigning to rvalue");
    pub const BINDING_RVALUE: DiagnosticMessage = diag!(1301, Binding, "Binding rvalue");
    pub const INVALID_LHS: DiagnosticMessage = diag!(1302, Binding, "Invalid left-hand side in {0}");
    pub const BINDING_INVALID_LHS: DiagnosticMessage = diag!(1303, Binding, "Binding invalid left-hand side in {0}");
    pub const PARENTHESIZED_PATTERN: DiagnosticMessage = diag!(1304, Binding, "You're trying to assign to a parenthesized expression, eg. instead of `({a}) = 0` use `({a} = 0)`");
    pub const DUPLICATE_CONSTRUCTOR: DiagnosticMessage = diag!(1305, Binding, "Duplicate constructor in the same class");
    pub const DUPLICATE_CONSTRUCTOR_CALL: DiagnosticMessage = diag!(1306, Binding, "Duplicate constructor call in the same class");
    pub const CONSTRUCTOR_ACCESSOR: DiagnosticMessage = diag!(1307, Binding, "Constructor can't have get/set modifier");
    pub const CONSTRUCTOR_GENERATOR: DiagnosticMessage = diag!(1308, Binding, "Constructor can't be a generator");
    pub const CONSTRUCTOR_ASYNC: DiagnosticMessage = diag!(1309, Binding, "Constructor can't be an async function");
    pub const STATIC_PROTOTYPE: DiagnosticMessage = diag!(1310, Binding, "Classes may not have static property named prototype");
    pub const DECORATOR_ON_CONSTRUCTOR: DiagnosticMessage = diag!(1311, Binding, "You can't attach decorators to a class constructor");
    pub const PROTO_REDEFINITION: DiagnosticMessage = diag!(1312, Binding, "Redefinition of __proto__ property");
    pub const DUPLICATE_EXPORT: DiagnosticMessage = diag!(1313, Binding, "`{0}` has already been exported. Exported identifiers must be unique.");
    pub const BINDING_KEYWORD: DiagnosticMessage = diag!(1314, Binding, "Binding {0}");
    pub const PARENTHESIZED_ARRAY_PATTERN: DiagnosticMessage = diag!(1315, Binding, "You're trying to assign to a parenthesized expression, eg. instead of `([a]) = 0` use `([a] = 0)`");
    pub const DUPLICATE_DEFAULT_EXPORT: DiagnosticMessage = diag!(1316, Binding, "Only one default export allowed per module.");

    // ========================================================================
    // Grammar context violations (1400-1499)
    // ========================================================================
    pub const RETURN_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(1400, Context, "'return' outside of function");
    pub const SUPER_OUTSIDE_METHOD: DiagnosticMessage = diag!(1401, Context, "'super' outside of function or class");
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: DiagnosticMessage = diag!(1402, Context, "super() outside of class constructor");
    pub const IMPORT_EXPORT_TOP_LEVEL: DiagnosticMessage = diag!(1403, Context, "'import' and 'export' may only appear at the top level");
    pub const IMPORT_EXPORT_MODULE: DiagnosticMessage = diag!(1404, Context, "'import' and 'export' may appear only with 'sourceType: module'");
    pub const AWAIT_IN_ASYNC: DiagnosticMessage = diag!(1405, Context, "invalid use of await inside of an async function");
    pub const UNSYNTACTIC_JUMP: DiagnosticMessage = diag!(1406, Context, "Unsyntactic {0}");

    // ========================================================================
    // Extension-gated syntax (1500-1599)
    // ========================================================================
    pub const PLUGIN_REQUIRED: DiagnosticMessage = diag!(1500, Extension, "This experimental syntax requires enabling the parser plugin: '{0}'");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message("Label '{0}' is already declared", &["outer"]);
        assert_eq!(msg, "Label 'outer' is already declared");
        let msg = messages::INVALID_META_PROPERTY.format(&["new", "target"]);
        assert_eq!(msg, "The only valid meta property for new is new.target");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError::new(&messages::OCTAL_IN_STRICT, &[], 15, Position::new(1, 15));
        assert_eq!(err.to_string(), "Octal literal in strict mode (1:15)");
        assert_eq!(err.category, ErrorCategory::Strict);
        assert_eq!(err.code, 1200);
    }

    #[test]
    fn test_syntax_error_miette_label() {
        use miette::Diagnostic;
        let err = SyntaxError::new(&messages::UNEXPECTED_TOKEN, &[], 4, Position::new(1, 4));
        let labels: Vec<_> = err.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 4);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("esparse::unexpected(1100)"));
    }

    #[test]
    fn test_message_codes_are_unique() {
        use messages::*;
        let all = [
            UNEXPECTED_CHARACTER, UNTERMINATED_COMMENT, UNTERMINATED_STRING, UNTERMINATED_TEMPLATE,
            UNTERMINATED_REGEXP, INVALID_REGEXP_FLAG, INVALID_NUMBER, EXPECTED_NUMBER_IN_RADIX,
            IDENTIFIER_AFTER_NUMBER, BAD_ESCAPE, CODE_POINT_OUT_OF_BOUNDS, EXPECTING_UNICODE_ESCAPE,
            INVALID_UNICODE_ESCAPE, UNTERMINATED_JSX_CONTENTS, UNEXPECTED_TOKEN, UNEXPECTED_TOKEN_EXPECTED,
            UNEXPECTED_KEYWORD, ILLEGAL_NEWLINE_AFTER_THROW, MISSING_CATCH_OR_FINALLY,
            MULTIPLE_DEFAULT_CLAUSES, LABEL_ALREADY_DECLARED, COMPLEX_BINDING_NEEDS_INIT,
            ILLEGAL_EXPONENT_LHS, AWAIT_STAR_REMOVED, INVALID_META_PROPERTY, GETTER_NO_PARAMS,
            SETTER_ONE_PARAM, TRAILING_DECORATORS, LEADING_DECORATORS, DECORATORS_ON_EXPORT,
            MAX_NESTING_DEPTH, EXPECTED_CLOSING_JSX_TAG, ADJACENT_JSX_ELEMENTS,
            JSX_INVALID_ATTRIBUTE_VALUE, JSX_EMPTY_ATTRIBUTE_EXPRESSION, REST_ELEMENT_NOT_LAST, UNEXPECTED_SUPER,
            OBJECT_PATTERN_ACCESSOR, OBJECT_PATTERN_METHOD, DEFAULT_ONLY_EQ, BIND_ON_PROPERTY,
            TRAILING_PROPERTY_DECORATORS, BINDING_KEYWORD, PARENTHESIZED_ARRAY_PATTERN,
            OCTAL_IN_STRICT, WITH_IN_STRICT, DELETE_LOCAL_IN_STRICT, RESERVED_WORD, ASSIGN_IN_STRICT,
            BINDING_IN_STRICT, ARGUMENT_NAME_CLASH, NON_SIMPLE_PARAMETER, ASSIGNING_TO_RVALUE, BINDING_RVALUE, INVALID_LHS,
            BINDING_INVALID_LHS, PARENTHESIZED_PATTERN, DUPLICATE_CONSTRUCTOR,
            DUPLICATE_CONSTRUCTOR_CALL, CONSTRUCTOR_ACCESSOR, CONSTRUCTOR_GENERATOR, CONSTRUCTOR_ASYNC,
            STATIC_PROTOTYPE, DECORATOR_ON_CONSTRUCTOR, PROTO_REDEFINITION, DUPLICATE_EXPORT, DUPLICATE_DEFAULT_EXPORT,
            RETURN_OUTSIDE_FUNCTION, SUPER_OUTSIDE_METHOD, SUPER_CALL_OUTSIDE_CONSTRUCTOR,
            IMPORT_EXPORT_TOP_LEVEL, IMPORT_EXPORT_MODULE, AWAIT_IN_ASYNC, UNSYNTACTIC_JUMP,
            PLUGIN_REQUIRED,
        ];
        let mut codes: Vec<u32> = all.iter().map(|m| m.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
