//! Runs the conformance corpus and prints the per-category summary.

use esparse_tests::{run_case, Category, ConformanceSuite, CORPUS};

#[test]
fn test_corpus_passes() {
    let suite = ConformanceSuite::run(CORPUS);
    println!("{}", suite.summary());
    let failures: Vec<_> = suite.failures().map(|result| result.name).collect();
    assert!(failures.is_empty(), "failing cases: {failures:?}\n{}", suite.summary());
}

#[test]
fn test_corpus_covers_every_category() {
    for category in [
        Category::Statements,
        Category::Expressions,
        Category::Modules,
        Category::Extensions,
        Category::Errors,
    ] {
        assert!(
            CORPUS.iter().any(|case| case.category == category),
            "no cases for {}",
            category.as_str()
        );
    }
}

#[test]
fn test_case_names_are_unique() {
    let mut names: Vec<_> = CORPUS.iter().map(|case| case.name).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(before, names.len());
}

#[test]
fn test_cases_are_deterministic() {
    for case in CORPUS {
        assert_eq!(run_case(case).failure, run_case(case).failure, "{}", case.name);
    }
}
