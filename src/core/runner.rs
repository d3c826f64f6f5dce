use std::fmt;
use std::time::Duration;
use chrono::{DateTime, Local};

use crate::core::probe::ProbeContext;
use crate::core::test::{PeripheralTester, TestReport, TestResult};
use crate::reporters::Reporter;
use crate::tests::{
    camera::CameraTester, cpu::CpuTester, display::DisplayTester, form_factor::FormFactorTester,
    gpio::GpioTester, gpu::GpuTester, memory::MemoryTester, networking::NetworkingTester,
    power::PowerTester, storage::StorageTester, usb::UsbTester,
};

/// Registered peripheral names, in execution order for `--all`.
pub const PERIPHERALS: [&str; 11] = [
    "cpu",
    "gpio",
    "camera",
    "gpu",
    "memory",
    "storage",
    "display",
    "usb",
    "networking",
    "power",
    "form_factor",
];

pub fn names() -> &'static [&'static str] {
    &PERIPHERALS
}

/// Builds the tester registered under `name`.
pub fn create(name: &str, ctx: ProbeContext) -> Option<Box<dyn PeripheralTester>> {
    let tester: Box<dyn PeripheralTester> = match name {
        "cpu" => Box::new(CpuTester::new(ctx)),
        "gpio" => Box::new(GpioTester::new(ctx)),
        "camera" => Box::new(CameraTester::new(ctx)),
        "gpu" => Box::new(GpuTester::new(ctx)),
        "memory" => Box::new(MemoryTester::new(ctx)),
        "storage" => Box::new(StorageTester::new(ctx)),
        "display" => Box::new(DisplayTester::new(ctx)),
        "usb" => Box::new(UsbTester::new(ctx)),
        "networking" => Box::new(NetworkingTester::new(ctx)),
        "power" => Box::new(PowerTester::new(ctx)),
        "form_factor" => Box::new(FormFactorTester::new(ctx)),
        _ => return None,
    };
    Some(tester)
}

/// Which peripherals a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(Vec<String>),
}

impl Selection {
    pub fn names(&self) -> Vec<String> {
        match self {
            Selection::All => PERIPHERALS.iter().map(|name| name.to_string()).collect(),
            Selection::Named(names) => names.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Short,
    Monitor(Duration),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Short => f.write_str("short test"),
            Mode::Monitor(duration) => write!(f, "monitoring ({}s)", duration.as_secs()),
        }
    }
}

/// Reports gathered by one run.
#[derive(Debug)]
pub struct TestSuite {
    pub reports: Vec<TestReport>,
    pub start: DateTime<Local>,
    pub end: Option<DateTime<Local>>,
}

impl TestSuite {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            start: Local::now(),
            end: None,
        }
    }

    pub fn finish(&mut self) {
        self.end = Some(Local::now());
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Anything other than `SUCCESS` counts as a failure.
    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.result() != TestResult::Success)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the selected testers one after another.
pub struct Runner {
    ctx: ProbeContext,
    reporter: Box<dyn Reporter>,
}

impl Runner {
    pub fn new(ctx: ProbeContext, reporter: Box<dyn Reporter>) -> Self {
        Self { ctx, reporter }
    }

    pub fn run(&self, selection: &Selection, mode: Mode) -> TestSuite {
        let mut suite = TestSuite::new();
        self.reporter.report_start(mode);

        for name in selection.names() {
            let mut tester = match create(&name, self.ctx.clone()) {
                Some(tester) => tester,
                None => {
                    self.ctx.logger.error(format_args!("Unknown peripheral: {}", name));
                    continue;
                }
            };

            if let Some(report) = self.execute(&name, tester.as_mut(), mode) {
                self.reporter.report_test_result(&report);
                suite.reports.push(report);
            }
        }

        suite.finish();
        self.reporter.report_suite_result(&suite);
        suite
    }

    /// Runs one tester; `None` if it is not available on this host.
    pub fn execute(&self, name: &str, tester: &mut dyn PeripheralTester, mode: Mode) -> Option<TestReport> {
        let logger = &self.ctx.logger;
        if !tester.is_available() {
            logger.warn(format_args!("{}: Not available, skipping...", name));
            return None;
        }

        let report = match mode {
            Mode::Short => {
                logger.info(format_args!("Running short test for {}...", name));
                logger.scope(|| tester.short_test())
            }
            Mode::Monitor(duration) => {
                logger.info(format_args!(
                    "Running monitoring test for {} ({}s)...",
                    name,
                    duration.as_secs()
                ));
                logger.scope(|| tester.monitor_test(duration))
            }
        };
        Some(report)
    }
}
