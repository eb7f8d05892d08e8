use std::path::Path;

use test_support::load_cases;
use ulang::ast::Program;

/// `(label, source)` for every fixture case opted into benchmarking.
pub fn workloads() -> Vec<(String, String)> {
    let cases = load_cases(Path::new("tests/programs")).expect("load fixture cases");
    cases
        .into_iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case| {
            let source = case
                .source()
                .unwrap_or_else(|err| panic!("read {}: {err:#}", case.name));
            (case.name, source)
        })
        .collect()
}

pub fn load_program(label: &str, source: &str) -> Program {
    ulang::parse_source(source).unwrap_or_else(|err| panic!("parse {label}: {err}"))
}
