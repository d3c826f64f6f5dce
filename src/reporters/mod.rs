pub mod text;
pub mod json;

use crate::core::runner::{Mode, TestSuite};
use crate::core::test::TestReport;

/// Receives run events from the `Runner`.
pub trait Reporter {
    /// Called once before the first tester runs.
    fn report_start(&self, mode: Mode);

    /// Called after each tester that actually ran.
    fn report_test_result(&self, report: &TestReport);

    /// Called once with the finished suite.
    fn report_suite_result(&self, suite: &TestSuite);
}
