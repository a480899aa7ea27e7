//! Suite results and their formatting.

use chrono::{DateTime, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use serde::Serialize;

use crate::error::ErrorKind;
use crate::keywords::Keyword;

/// Outcome of one suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: f64,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub passed: bool,
    /// Steps executed, including the failing one
    pub steps_run: usize,
    pub steps_total: usize,
    pub failure: Option<FailedStep>,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedStep {
    /// 1-based position in the test case
    pub index: usize,
    pub keyword: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Formats suite results for output.
pub struct ResultsReport;

impl ResultsReport {
    /// Format results as a console table.
    pub fn format_table(report: &SuiteReport) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Test", "Result", "Steps", "Time (ms)", "Failure"]);

        for case in &report.cases {
            let result = if case.passed {
                Cell::new("PASS").fg(Color::Green)
            } else {
                Cell::new("FAIL").fg(Color::Red)
            };
            let failure = case
                .failure
                .as_ref()
                .map(|f| format!("step {} ({}): {}", f.index, f.keyword, f.message))
                .unwrap_or_default();

            table.add_row(vec![
                Cell::new(&case.name),
                result,
                Cell::new(format!("{}/{}", case.steps_run, case.steps_total)),
                Cell::new(format!("{:.1}", case.elapsed_ms)),
                Cell::new(failure),
            ]);
        }

        format!(
            "Suite: {}\n{}\n{} passed, {} failed, {} total in {:.1} ms",
            report.suite,
            table,
            report.passed(),
            report.failed(),
            report.total(),
            report.elapsed_ms
        )
    }

    /// Format results as JSON.
    pub fn format_json(report: &SuiteReport) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// The keyword vocabulary as a table.
    pub fn format_keywords() -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Keyword", "Arguments", "Description"]);

        for keyword in Keyword::ALL {
            let mut name = keyword.name().to_string();
            for alias in keyword.aliases() {
                name.push_str(&format!("\n(alias: {})", alias));
            }
            table.add_row(vec![name, keyword.args().join(", "), keyword.doc().to_string()]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SuiteReport {
        SuiteReport {
            suite: "Demo".to_string(),
            started_at: Utc::now(),
            elapsed_ms: 12.5,
            cases: vec![
                CaseReport {
                    name: "ok".to_string(),
                    passed: true,
                    steps_run: 2,
                    steps_total: 2,
                    failure: None,
                    elapsed_ms: 5.0,
                },
                CaseReport {
                    name: "broken".to_string(),
                    passed: false,
                    steps_run: 1,
                    steps_total: 3,
                    failure: Some(FailedStep {
                        index: 1,
                        keyword: "Connect To Url".to_string(),
                        kind: ErrorKind::Connectivity,
                        message: "url: http://x/ Status 500 Can't connect".to_string(),
                    }),
                    elapsed_ms: 7.5,
                },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let report = sample();
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_table_lists_cases_and_failure() {
        let table = ResultsReport::format_table(&sample());
        assert!(table.contains("Suite: Demo"));
        assert!(table.contains("broken"));
        assert!(table.contains("Status 500"));
        assert!(table.contains("1 passed, 1 failed, 2 total"));
    }

    #[test]
    fn test_json_shape() {
        let json = ResultsReport::format_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["suite"], "Demo");
        assert_eq!(value["cases"][1]["failure"]["kind"], "connectivity");
        assert!(value["cases"][0]["failure"].is_null());
    }

    #[test]
    fn test_keyword_table_lists_all() {
        let table = ResultsReport::format_keywords();
        for keyword in Keyword::ALL {
            assert!(table.contains(keyword.name()), "{}", keyword);
        }
        assert!(table.contains("Set Ogc Version"));
    }
}
