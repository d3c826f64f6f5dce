use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use chrono::Utc;

use crate::core::error::{ProbeError, Result};
use crate::core::hardware::{StorageDevice, StorageKind};
use crate::core::monitor;
use crate::core::probe::ProbeContext;
use crate::core::test::{PeripheralTester, SubChecks, TestReport, TestResult};

const NAME: &str = "Storage";
const UNAVAILABLE: &str = "Storage devices not available";

const SYS_BLOCK: &str = "/sys/block";
const DISKSTATS: &str = "/proc/diskstats";
const LSPCI_STORAGE: &str = "lspci | grep -i 'storage\\|nvme\\|ahci' 2>/dev/null";
const SECTOR_SIZE: u64 = 512;
const GIB: u64 = 1024 * 1024 * 1024;

/// eMMC, SD card and NVMe block devices.
pub struct StorageTester {
    ctx: ProbeContext,
    available: bool,
    devices: Vec<StorageDevice>,
}

impl StorageTester {
    pub fn new(ctx: ProbeContext) -> Self {
        let available = ctx.fs.exists("/dev") && (ctx.fs.exists(SYS_BLOCK) || ctx.fs.exists(DISKSTATS));
        let devices = if available { enumerate_devices(&ctx) } else { Vec::new() };
        Self { ctx, available, devices }
    }

    pub fn devices(&self) -> &[StorageDevice] {
        &self.devices
    }

    /// Runs the I/O check against every device of `kind`.
    fn test_kind(&self, kind: StorageKind) -> TestResult {
        let matching: Vec<_> = self.devices.iter().filter(|d| d.kind == kind).collect();
        if matching.is_empty() {
            return TestResult::NotSupported;
        }

        for device in matching {
            if let Err(e) = self.performance_test() {
                self.ctx.logger.debug(format_args!("{} I/O test failed: {}", device.device_path, e));
                return TestResult::Failure;
            }
        }
        TestResult::Success
    }

    fn test_pcie(&self) -> TestResult {
        let nvme = self.devices.iter().any(|d| d.kind == StorageKind::Nvme);
        let controller = || {
            self.ctx
                .run_stdout(LSPCI_STORAGE)
                .map(|out| !out.trim().is_empty())
                .unwrap_or(false)
        };

        if nvme || controller() {
            TestResult::Success
        } else {
            TestResult::NotSupported
        }
    }

    /// Writes 10 MiB with `dd` into the scratch directory and reads it back.
    fn performance_test(&self) -> Result<()> {
        let scratch = self.ctx.config.storage_scratch_dir.join(format!(
            "storage_test_{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let file = scratch.display();

        let written = self
            .ctx
            .run_ok(&format!("timeout 10 dd if=/dev/zero of={} bs=1M count=10 2>/dev/null", file));
        if !written {
            return Err(ProbeError::Command(format!("write to {} failed", file)));
        }

        let read = self
            .ctx
            .run_ok(&format!("timeout 10 dd if={} of=/dev/null bs=1M 2>/dev/null", file));
        let _ = fs::remove_file(&scratch);

        if read {
            Ok(())
        } else {
            Err(ProbeError::Command(format!("read of {} failed", file)))
        }
    }

    /// Writes a marker file below `mount_point` and reads it back.
    pub fn filesystem_integrity(&self, mount_point: &Path) -> TestResult {
        if !self.ctx.fs.path(mount_point).is_dir() {
            return TestResult::Failure;
        }

        let marker = mount_point.join(".storage_test");
        let round_trip = self
            .ctx
            .fs
            .write(&marker, "test data")
            .and_then(|_| self.ctx.fs.read_string(&marker));
        let _ = fs::remove_file(self.ctx.fs.path(&marker));

        TestResult::from_bool(matches!(round_trip, Ok(ref data) if data == "test data"))
    }
}

impl PeripheralTester for StorageTester {
    fn peripheral_name(&self) -> &'static str {
        NAME
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn short_test(&mut self) -> TestReport {
        if !self.available {
            return TestReport::not_supported(NAME, UNAVAILABLE);
        }
        let start = Instant::now();

        let mut checks = SubChecks::new();
        checks.line(format!("Found {} storage device(s)", self.devices.len()));
        for device in &self.devices {
            if device.model.is_empty() {
                checks.line(format!("- {} ({}GB)", device.device_path, device.size_gb));
            } else {
                checks.line(format!("- {} ({}GB, {})", device.device_path, device.size_gb, device.model));
            }
        }

        checks.check("eMMC", self.test_kind(StorageKind::Emmc));
        checks.check("SD Card", self.test_kind(StorageKind::SdCard));
        checks.check("NVMe", self.test_kind(StorageKind::Nvme));

        let pcie = self.test_pcie();
        checks.check("PCIe", pcie);
        checks.check("M.2", pcie);

        TestReport::new(NAME, checks.overall(), start.elapsed(), checks.details())
    }

    fn monitor_test(&mut self, duration: Duration) -> TestReport {
        if !self.available {
            return TestReport::not_supported(NAME, UNAVAILABLE);
        }
        let start = Instant::now();

        let samples = monitor::sample_for(duration, self.ctx.config.storage_poll_interval, || {
            self.ctx.fs.read_string(DISKSTATS).ok().map(|text| io_totals(&text))
        });

        let mut details = vec![monitor::completed_line("Storage", duration)];
        let result = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) if samples.len() >= 2 => {
                let reads = last.0.saturating_sub(first.0);
                let writes = last.1.saturating_sub(first.1);
                details.push(format!("I/O drift: {} reads, {} writes", reads, writes));

                let limit = self.ctx.config.storage_io_drift_ops;
                TestResult::from_bool(reads < limit && writes < limit)
            }
            _ => TestResult::Failure,
        };

        TestReport::new(NAME, result, start.elapsed(), details.join("\n"))
    }
}

fn enumerate_devices(ctx: &ProbeContext) -> Vec<StorageDevice> {
    let names = match ctx.fs.list_dir(SYS_BLOCK) {
        Ok(names) => names,
        Err(_) => return Vec::new(),
    };

    names
        .into_iter()
        .filter_map(|name| {
            let kind = classify(&name)?;
            let device_path = format!("/dev/{}", name);
            if !ctx.fs.exists(&device_path) {
                return None;
            }

            let size_gb = ctx
                .fs
                .read_parsed::<u64>(format!("{}/{}/size", SYS_BLOCK, name))
                .map(|sectors| sectors * SECTOR_SIZE / GIB)
                .unwrap_or(0);
            let model = ctx
                .fs
                .read_string(format!("{}/{}/device/model", SYS_BLOCK, name))
                .unwrap_or_default();

            Some(StorageDevice { device_path, kind, size_gb, model })
        })
        .collect()
}

fn classify(name: &str) -> Option<StorageKind> {
    if name.starts_with("mmcblk") {
        Some(StorageKind::Emmc)
    } else if name.starts_with("nvme") {
        Some(StorageKind::Nvme)
    } else if name.starts_with("sd") {
        Some(StorageKind::SdCard)
    } else {
        None
    }
}

/// Sums completed reads and completed writes over every `/proc/diskstats` row.
pub fn io_totals(diskstats: &str) -> (u64, u64) {
    diskstats
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|fields| fields.len() >= 8)
        .fold((0, 0), |(reads, writes), fields| {
            let field = |i: usize| fields[i].parse::<u64>().unwrap_or(0);
            (reads + field(3), writes + field(7))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::probe::testing::{FakeHost, ScriptedProbe};

    const DISKSTATS_SAMPLE: &str = " 179       0 mmcblk0 5120 12 204800 900 300 40 9600 700 0 1200 1600\n 179       1 mmcblk0p1 100 0 800 10 20 0 160 5 0 20 15\n";

    fn emmc_board() -> FakeHost {
        let host = FakeHost::new();
        host.file("/dev/mmcblk0", "")
            .file("/sys/block/mmcblk0/size", "30535680\n")
            .file("/sys/block/mmcblk0/device/model", "")
            .file("/sys/block/loop0/size", "0\n")
            .file("/dev/loop0", "")
            .file(DISKSTATS, DISKSTATS_SAMPLE);
        host
    }

    #[test]
    fn test_io_totals() {
        assert_eq!(io_totals(DISKSTATS_SAMPLE), (5220, 320));
        assert_eq!(io_totals("garbage\n"), (0, 0));
    }

    #[test]
    fn test_enumerates_only_known_kinds() {
        let host = emmc_board();
        host.file("/sys/block/sda/size", "62333952\n")
            .file("/sys/block/sda/device/model", "SD64G\n");
        let tester = StorageTester::new(host.context(ScriptedProbe::new()));

        let devices = tester.devices();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_path, "/dev/mmcblk0");
        assert_eq!(devices[0].kind, StorageKind::Emmc);
        assert_eq!(devices[0].size_gb, 14);
    }

    #[test]
    fn test_short_test_runs_dd_on_emmc() {
        let host = emmc_board();
        let probe = ScriptedProbe::new().ok_prefix("timeout 10 dd ", "");
        let mut tester = StorageTester::new(host.context(probe));

        let report = tester.short_test();
        assert_eq!(
            report.details(),
            "Found 1 storage device(s)\n- /dev/mmcblk0 (14GB)\neMMC: PASS\nSD Card: N/A\nNVMe: N/A\nPCIe: N/A\nM.2: N/A"
        );
        assert_eq!(report.result(), TestResult::Success);
    }

    #[test]
    fn test_failed_dd_fails_device() {
        let host = emmc_board();
        let probe = ScriptedProbe::new().ok(LSPCI_STORAGE, "01:00.0 Non-Volatile memory controller\n");
        let mut tester = StorageTester::new(host.context(probe));

        let report = tester.short_test();
        assert!(report.details().contains("eMMC: FAIL"));
        assert!(report.details().contains("PCIe: PASS"));
        assert_eq!(report.result(), TestResult::Failure);
    }

    #[test]
    fn test_filesystem_integrity() {
        let host = emmc_board();
        host.dir("/mnt/data");
        let tester = StorageTester::new(host.context(ScriptedProbe::new()));

        assert_eq!(tester.filesystem_integrity(Path::new("/mnt/data")), TestResult::Success);
        assert!(!host.fs().exists("/mnt/data/.storage_test"));
        assert_eq!(tester.filesystem_integrity(Path::new("/mnt/missing")), TestResult::Failure);
    }

    #[test]
    fn test_monitor_idle_disk_is_stable() {
        let host = emmc_board();
        let mut tester = StorageTester::new(host.context(ScriptedProbe::new()));

        let report = tester.monitor_test(Duration::from_millis(30));
        assert_eq!(report.result(), TestResult::Success);
        assert!(report.details().contains("I/O drift: 0 reads, 0 writes"));
    }

    #[test]
    fn test_monitor_without_diskstats_fails() {
        let host = emmc_board();
        host.remove(DISKSTATS);
        let mut tester = StorageTester::new(host.context(ScriptedProbe::new()));

        assert!(tester.is_available());
        assert_eq!(tester.monitor_test(Duration::from_millis(20)).result(), TestResult::Failure);
    }

    #[test]
    fn test_unavailable() {
        let host = FakeHost::new();
        let mut tester = StorageTester::new(host.context(ScriptedProbe::new()));
        assert_eq!(tester.short_test().details(), UNAVAILABLE);
    }

    fn monitor_with_reads(reads: u64) -> TestReport {
        let host = emmc_board();
        host.file(DISKSTATS, " 179       0 mmcblk0 5000 0 0 0 300 0 0 0 0 0 0\n");
        let mut tester = StorageTester::new(host.context(ScriptedProbe::new()));

        let changed = format!(" 179       0 mmcblk0 {} 0 0 0 300 0 0 0 0 0 0\n", reads);
        let writer = host.change_after(Duration::from_millis(40), &[(DISKSTATS, changed.as_str())]);
        let report = tester.monitor_test(Duration::from_millis(150));
        writer.join().unwrap();
        report
    }

    #[test]
    fn test_monitor_drift_below_limit_passes() {
        let report = monitor_with_reads(14_999);
        assert!(report.details().contains("I/O drift: 9999 reads, 0 writes"));
        assert_eq!(report.result(), TestResult::Success);
    }

    #[test]
    fn test_monitor_drift_at_limit_fails() {
        let report = monitor_with_reads(15_000);
        assert!(report.details().contains("I/O drift: 10000 reads, 0 writes"));
        assert_eq!(report.result(), TestResult::Failure);
    }
}
