use std::path::Path;

use anyhow::{Context, Result, ensure};

use test_support::{Case, CaseClass, load_cases, normalize_output};
use ulang::diagnostic::DiagnosticKind;
use ulang::{parse_source, run_source_captured};

fn check_case(case: &Case) -> Result<()> {
    if case.spec.bench.enabled {
        ensure!(
            !case.spec.bench.tags.is_empty(),
            "Case {} has bench enabled but no tags",
            case.name
        );
    }
    let source = case.source()?;

    match case.spec.class {
        CaseClass::RuntimeSuccess => {
            ensure!(
                case.spec.expected.exit_code == 0,
                "Case {} expected exit code must be 0 for runtime_success",
                case.name
            );
            let (output, result) = run_source_captured(&source, &case.stdin()?);
            result.with_context(|| format!("Running {}", case.name))?;
            assert_eq!(
                normalize_output(&output),
                normalize_output(&case.expected_stdout()?),
                "Output mismatch for {}",
                case.name
            );
        }
        CaseClass::FrontendError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for frontend_error",
                case.name
            );
            let expected_error = case.expected_error()?;
            let Err(diagnostic) = parse_source(&source) else {
                anyhow::bail!("Expected frontend error in {}, but parsing succeeded", case.name);
            };
            ensure!(
                matches!(diagnostic.kind, DiagnosticKind::Lex | DiagnosticKind::Parse),
                "Case {} produced a {} diagnostic",
                case.name,
                diagnostic.kind
            );
            let actual = diagnostic.to_string();
            ensure!(
                actual.contains(&expected_error),
                "Expected frontend error containing '{expected_error}' in {}, got '{actual}'",
                case.name
            );
        }
        CaseClass::RuntimeError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for runtime_error",
                case.name
            );
            let expected_error = case.expected_error()?;
            let (output, result) = run_source_captured(&source, &case.stdin()?);
            let Err(diagnostic) = result else {
                anyhow::bail!("Expected runtime error in {}, but the run succeeded", case.name);
            };
            ensure!(
                diagnostic.kind == DiagnosticKind::Runtime,
                "Case {} produced a {} diagnostic",
                case.name,
                diagnostic.kind
            );
            let actual = diagnostic.to_string();
            ensure!(
                actual.contains(&expected_error),
                "Expected runtime error containing '{expected_error}' in {}, got '{actual}'",
                case.name
            );
            if case.spec.expected.stdout_file.is_some() {
                assert_eq!(
                    normalize_output(&output),
                    normalize_output(&case.expected_stdout()?),
                    "Output before failure mismatch for {}",
                    case.name
                );
            }
        }
    }
    Ok(())
}

#[test]
fn runs_fixture_programs() -> Result<()> {
    for case in load_cases(Path::new("tests/programs"))? {
        check_case(&case)?;
    }
    Ok(())
}
