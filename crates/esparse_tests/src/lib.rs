//! Conformance corpus for esparse.
//!
//! Each [`Case`] is a source snippet with parser setup and an expectation:
//! either a JSON subset the serialised program must contain, or the exact
//! message and offset of the syntax error. The suite groups results by
//! category and reports a pass rate per category.

mod corpus;

use std::fmt::Write as _;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bumpalo::Bump;
use esparse_parser::{parse, ParserOptions};
use serde_json::Value;

pub use corpus::CORPUS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Statements,
    Expressions,
    Modules,
    Extensions,
    Errors,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Statements => "statements",
            Category::Expressions => "expressions",
            Category::Modules => "modules",
            Category::Extensions => "extensions",
            Category::Errors => "errors",
        }
    }
}

/// Parser configuration for a case.
#[derive(Debug, Clone, Copy)]
pub struct Setup {
    pub module: bool,
    pub plugins: &'static [&'static str],
}

impl Setup {
    pub const SCRIPT: Setup = Setup { module: false, plugins: &[] };
    pub const MODULE: Setup = Setup { module: true, plugins: &[] };

    pub fn options(&self) -> ParserOptions {
        let base = if self.module {
            ParserOptions::module()
        } else {
            ParserOptions::default()
        };
        self.plugins.iter().fold(base, |options, name| options.with_plugin(name))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Expect {
    /// JSON text that must be a subset of the serialised `Program`.
    Program(&'static str),
    Error { message: &'static str, pos: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct Case {
    pub name: &'static str,
    pub category: Category,
    pub source: &'static str,
    pub setup: Setup,
    pub expect: Expect,
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: &'static str,
    pub category: Category,
    pub failure: Option<String>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Run one case. A panic inside the parser counts as a failure.
pub fn run_case(case: &Case) -> CaseResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| check(case)));
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(reason)) => Some(reason),
        Err(payload) => Some(match payload.downcast_ref::<String>() {
            Some(message) => format!("panicked: {message}"),
            None => match payload.downcast_ref::<&str>() {
                Some(message) => format!("panicked: {message}"),
                None => "panicked".to_string(),
            },
        }),
    };
    CaseResult {
        name: case.name,
        category: case.category,
        failure,
    }
}

fn check(case: &Case) -> Result<(), String> {
    let arena = Bump::new();
    let result = parse(&arena, case.source, &case.setup.options());
    match (case.expect, result) {
        (Expect::Program(expected), Ok(file)) => {
            let expected: Value = serde_json::from_str(expected).map_err(|err| format!("bad expectation: {err}"))?;
            let actual = serde_json::to_value(&file.program).map_err(|err| err.to_string())?;
            json_subset(&expected, &actual, "program")
        }
        (Expect::Program(_), Err(err)) => Err(format!("unexpected error: {err}")),
        (Expect::Error { message, pos }, Err(err)) => {
            if err.message == message && err.pos == pos {
                Ok(())
            } else {
                Err(format!("expected {message:?} at {pos}, got {:?} at {}", err.message, err.pos))
            }
        }
        (Expect::Error { message, .. }, Ok(_)) => Err(format!("expected error {message:?}, but parsing succeeded")),
    }
}

/// Check that every key of `expected` is present in `actual` with a
/// matching value. Arrays must have the same length. Numbers compare as
/// floats so that `1` matches `1.0`.
pub fn json_subset(expected: &Value, actual: &Value, path: &str) -> Result<(), String> {
    match (expected, actual) {
        (Value::Object(want), Value::Object(have)) => {
            for (key, value) in want {
                let child = format!("{path}.{key}");
                match have.get(key) {
                    Some(found) => json_subset(value, found, &child)?,
                    None => return Err(format!("{child}: missing")),
                }
            }
            Ok(())
        }
        (Value::Array(want), Value::Array(have)) => {
            if want.len() != have.len() {
                return Err(format!("{path}: expected {} elements, found {}", want.len(), have.len()));
            }
            want.iter()
                .zip(have)
                .enumerate()
                .try_for_each(|(index, (value, found))| json_subset(value, found, &format!("{path}[{index}]")))
        }
        (Value::Number(want), Value::Number(have)) if want.as_f64() == have.as_f64() => Ok(()),
        _ if expected == actual => Ok(()),
        _ => Err(format!("{path}: expected {expected}, found {actual}")),
    }
}

/// Results of a corpus run.
#[derive(Debug, Default)]
pub struct ConformanceSuite {
    pub results: Vec<CaseResult>,
}

impl ConformanceSuite {
    pub fn run(cases: &[Case]) -> Self {
        Self {
            results: cases.iter().map(run_case).collect(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|result| !result.passed())
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let passed = self.results.iter().filter(|result| result.passed()).count();
        passed as f64 / self.results.len() as f64 * 100.0
    }

    /// A per-category table followed by the failing cases.
    pub fn summary(&self) -> String {
        let mut categories: Vec<Category> = self.results.iter().map(|result| result.category).collect();
        categories.sort();
        categories.dedup();

        let mut out = String::new();
        let _ = writeln!(out, "=== esparse conformance ===");
        for category in categories {
            let (total, passed) = self
                .results
                .iter()
                .filter(|result| result.category == category)
                .fold((0, 0), |(total, passed), result| (total + 1, passed + usize::from(result.passed())));
            let _ = writeln!(out, "{:<12} {passed}/{total}", category.as_str());
        }
        let _ = writeln!(out, "pass rate: {:.1}%", self.pass_rate());
        for failure in self.failures() {
            let reason = failure.failure.as_deref().unwrap_or_default();
            let _ = writeln!(out, "FAIL {}/{}: {reason}", failure.category.as_str(), failure.name);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subset_ignores_extra_keys() {
        let actual = json!({ "type": "Identifier", "name": "a", "start": 0 });
        assert!(json_subset(&json!({ "name": "a" }), &actual, "node").is_ok());
    }

    #[test]
    fn test_subset_reports_path() {
        let actual = json!({ "body": [{ "type": "EmptyStatement" }] });
        let err = json_subset(&json!({ "body": [{ "type": "DebuggerStatement" }] }), &actual, "program").unwrap_err();
        assert!(err.starts_with("program.body[0].type:"), "{err}");
    }

    #[test]
    fn test_subset_compares_numbers_as_floats() {
        assert!(json_subset(&json!(1), &json!(1.0), "n").is_ok());
        assert!(json_subset(&json!([1, 2]), &json!([1.0]), "n").is_err());
    }

    #[test]
    fn test_failed_expectation_is_reported() {
        let case = Case {
            name: "wrong",
            category: Category::Expressions,
            source: "a;",
            setup: Setup::SCRIPT,
            expect: Expect::Error {
                message: "Unexpected token",
                pos: 0,
            },
        };
        let result = run_case(&case);
        assert!(!result.passed());
        let suite = ConformanceSuite { results: vec![result] };
        assert_eq!(suite.pass_rate(), 0.0);
        assert!(suite.summary().contains("FAIL expressions/wrong"));
    }
}
