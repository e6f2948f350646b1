//! Check command - Compile binding expressions
//!
//! Reports, for each expression, whether it compiles and whether it can be
//! written back to (two-way) or only read.

use clap::{Args, ValueEnum};
use lien_atelier_core::compile;
use serde::Serialize;

#[derive(Args)]
pub struct CheckArgs {
    /// Binding expressions to compile
    #[arg(required = true)]
    pub expressions: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CheckFormat::Text)]
    pub format: CheckFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckFormat {
    Text,
    Json,
}

/// Result for one expression
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckResult {
    expression: String,
    assignable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    setter_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: CheckArgs) {
    let results: Vec<CheckResult> = args.expressions.iter().map(|e| check(e)).collect();
    let error_count = results.iter().filter(|r| r.error.is_some()).count();

    match args.format {
        CheckFormat::Json => match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("\x1b[31mError:\x1b[0m failed to serialize output: {e}");
                std::process::exit(1);
            }
        },
        CheckFormat::Text => {
            for result in &results {
                println!("{}", describe(result));
            }
        }
    }

    if error_count > 0 {
        eprintln!("{error_count} expression(s) failed to compile");
        std::process::exit(1);
    }
}

fn check(expression: &str) -> CheckResult {
    match compile(expression) {
        Ok(compiled) => CheckResult {
            expression: expression.to_string(),
            assignable: compiled.is_assignable(),
            setter_path: compiled.setter().map(|setter| setter.path().to_string()),
            error: None,
        },
        Err(e) => CheckResult {
            expression: expression.to_string(),
            assignable: false,
            setter_path: None,
            error: Some(e.to_string()),
        },
    }
}

fn describe(result: &CheckResult) -> String {
    match (&result.error, &result.setter_path) {
        (Some(error), _) => format!("\x1b[31m✗\x1b[0m {}: {error}", result.expression),
        (None, Some(path)) => format!("\x1b[32m✓\x1b[0m {} (two-way: {path})", result.expression),
        (None, None) => format!("\x1b[32m✓\x1b[0m {} (read-only)", result.expression),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_results() {
        let result = check("user.name");
        assert!(result.assignable);
        assert_eq!(result.setter_path.as_deref(), Some("user.name"));

        let result = check("price | currency");
        assert!(!result.assignable);
        assert_eq!(result.error, None);

        let result = check("a |");
        assert!(result.error.is_some());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(check("title")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"expression": "title", "assignable": true, "setterPath": "title"})
        );
    }
}
