use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use serde::Serialize;

use crate::core::runner::{Mode, TestSuite};
use crate::core::test::{TestReport, TestResult};
use crate::reporters::Reporter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct JsonTest<'a> {
    peripheral: &'a str,
    result: TestResult,
    duration_ms: u64,
    timestamp: String,
    details: &'a str,
}

impl<'a> From<&'a TestReport> for JsonTest<'a> {
    fn from(report: &'a TestReport) -> Self {
        Self {
            peripheral: report.peripheral_name(),
            result: report.result(),
            duration_ms: u64::try_from(report.duration().as_millis()).unwrap_or(u64::MAX),
            timestamp: report.timestamp().format(TIMESTAMP_FORMAT).to_string(),
            details: report.details(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSummary {
    total: usize,
    failed: usize,
    passed: usize,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    tests: Vec<JsonTest<'a>>,
    summary: JsonSummary,
}

/// Renders the whole suite as one JSON document once the run completes.
pub fn render(suite: &TestSuite) -> serde_json::Result<String> {
    let document = JsonDocument {
        tests: suite.reports.iter().map(JsonTest::from).collect(),
        summary: JsonSummary {
            total: suite.total(),
            failed: suite.failed(),
            passed: suite.passed(),
        },
    };
    serde_json::to_string_pretty(&document)
}

/// Escapes `s` for embedding between JSON double quotes.
pub fn escape(s: &str) -> String {
    let quoted = serde_json::to_string(s).unwrap_or_default();
    quoted
        .get(1..quoted.len().saturating_sub(1))
        .unwrap_or_default()
        .to_string()
}

/// Machine-readable reporter; silent until the suite is complete.
pub struct JsonReporter {
    output_file: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    fn write_json(&self, suite: &TestSuite) -> io::Result<()> {
        let json_string = render(suite)?;

        match &self.output_file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(json_string.as_bytes())?;
                file.write_all(b"\n")?;
            }
            None => {
                println!("{}", json_string);
            }
        }

        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn report_start(&self, _mode: Mode) {}

    fn report_test_result(&self, _report: &TestReport) {}

    fn report_suite_result(&self, suite: &TestSuite) {
        if let Err(e) = self.write_json(suite) {
            eprintln!("Error writing JSON output: {}", e);
        }
    }
}
