use std::time::Duration;
use colored::*;

use crate::core::logging::Logger;
use crate::core::runner::{Mode, TestSuite};
use crate::core::test::{TestReport, TestResult};
use crate::reporters::Reporter;

/// Human-readable output: per-test log lines plus a colored summary table.
pub struct TextReporter {
    logger: Logger,
}

impl TextReporter {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    fn format_duration(duration: Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else if total_secs > 0 {
            format!("{}s", seconds)
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn format_status(result: TestResult) -> ColoredString {
        match result {
            TestResult::Success => "✓ SUCCESS".green().bold(),
            TestResult::Failure => "✗ FAILURE".red().bold(),
            TestResult::NotSupported => "- NOT_SUPPORTED".yellow().bold(),
            TestResult::Timeout => "⏱ TIMEOUT".red(),
            TestResult::Skipped => "⏸ SKIPPED".blue(),
        }
    }
}

impl Reporter for TextReporter {
    fn report_start(&self, mode: Mode) {
        self.logger.info(format_args!(
            "i.MX93 hardware verification v{} ({})",
            env!("CARGO_PKG_VERSION"),
            mode
        ));
    }

    fn report_test_result(&self, report: &TestReport) {
        self.logger.info(format_args!("Result: {}", report.result()));
        self.logger.info(format_args!("Details: {}", report.details()));
    }

    fn report_suite_result(&self, suite: &TestSuite) {
        println!("\n{}", "TEST SUMMARY".bold());
        println!("============");

        let width = suite
            .reports
            .iter()
            .map(|r| r.peripheral_name().len())
            .max()
            .unwrap_or(10);

        for report in &suite.reports {
            println!(
                "{}: {}{} ({})",
                report.peripheral_name().cyan().bold(),
                " ".repeat(width - report.peripheral_name().len() + 2),
                Self::format_status(report.result()),
                Self::format_duration(report.duration())
            );
        }

        let failed = if suite.failed() > 0 {
            suite.failed().to_string().red().bold()
        } else {
            suite.failed().to_string().normal()
        };
        println!(
            "\nTotal: {}  Passed: {}  Failed: {}",
            suite.total(),
            suite.passed().to_string().green(),
            failed
        );
    }
}
