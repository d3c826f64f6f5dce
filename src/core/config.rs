use serde::{Serialize, Deserialize};
use std::time::Duration;
use std::path::{Path, PathBuf};
use std::fs;

use crate::core::error::{ProbeError, Result};

/// Thresholds, polling intervals and probe targets for every tester.
///
/// Defaults reproduce the limits the board was qualified against; a config
/// file may override any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    // CPU
    pub cpu_temp_min_c: f64,
    pub cpu_temp_max_c: f64,
    pub cpu_temp_variation_c: f64,
    #[serde(with = "humantime_duration")]
    pub cpu_poll_interval: Duration,
    pub cpu_default_frequency_mhz: u32,

    // GPIO
    pub gpio_test_pins: Vec<u32>,
    pub gpio_pwm_pin: u32,
    pub gpio_monitor_pin: u32,
    pub gpio_min_read_ratio: f64,
    #[serde(with = "humantime_duration")]
    pub gpio_poll_interval: Duration,
    #[serde(with = "humantime_duration")]
    pub gpio_export_settle: Duration,
    #[serde(with = "humantime_duration")]
    pub gpio_toggle_delay: Duration,

    // Memory
    pub memory_integrity_size_mb: usize,
    pub memory_bandwidth_size_mb: usize,
    #[serde(with = "humantime_duration")]
    pub memory_bandwidth_limit: Duration,
    pub memory_usage_variation: f64,
    pub memory_stress_max_fraction: f64,
    #[serde(with = "humantime_duration")]
    pub memory_poll_interval: Duration,

    // Storage
    pub storage_io_drift_ops: u64,
    pub storage_scratch_dir: PathBuf,
    #[serde(with = "humantime_duration")]
    pub storage_poll_interval: Duration,

    // Camera
    pub camera_min_width: u32,
    pub camera_min_height: u32,
    pub camera_max_width: u32,
    pub camera_max_height: u32,
    pub camera_max_devices: usize,
    #[serde(with = "humantime_duration")]
    pub camera_poll_interval: Duration,

    // Display
    pub display_min_width: u32,
    pub display_min_height: u32,
    pub display_max_width: u32,
    pub display_max_height: u32,
    pub display_4k_min_refresh_hz: u32,
    #[serde(with = "humantime_duration")]
    pub display_poll_interval: Duration,

    // GPU
    pub gpu_temp_variation_c: f64,
    #[serde(with = "humantime_duration")]
    pub gpu_poll_interval: Duration,

    // USB
    #[serde(with = "humantime_duration")]
    pub usb_poll_interval: Duration,

    // Networking
    pub reference_hosts: Vec<String>,
    pub dns_test_domains: Vec<String>,
    pub min_reachable_hosts: usize,
    pub min_resolved_domains: usize,
    pub max_connectivity_failures: u32,
    #[serde(with = "humantime_duration")]
    pub network_poll_interval: Duration,

    // Power
    pub battery_drain_limit_pct: u8,
    #[serde(with = "humantime_duration")]
    pub power_poll_interval: Duration,

    // Form factor
    pub form_factor_gpio_pins: Vec<u32>,
    pub board_temp_drift_c: f64,
    pub board_temp_max_c: f64,
    #[serde(with = "humantime_duration")]
    pub form_factor_poll_interval: Duration,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            cpu_temp_min_c: 0.0,
            cpu_temp_max_c: 100.0,
            cpu_temp_variation_c: 20.0,
            cpu_poll_interval: Duration::from_secs(1),
            cpu_default_frequency_mhz: 1700,

            gpio_test_pins: vec![0, 1, 2],
            gpio_pwm_pin: 18,
            gpio_monitor_pin: 2,
            gpio_min_read_ratio: 0.95,
            gpio_poll_interval: Duration::from_millis(100),
            gpio_export_settle: Duration::from_millis(100),
            gpio_toggle_delay: Duration::from_millis(10),

            memory_integrity_size_mb: 1,
            memory_bandwidth_size_mb: 100,
            memory_bandwidth_limit: Duration::from_millis(5000),
            memory_usage_variation: 0.10,
            memory_stress_max_fraction: 0.8,
            memory_poll_interval: Duration::from_secs(1),

            storage_io_drift_ops: 10_000,
            storage_scratch_dir: PathBuf::from("/tmp"),
            storage_poll_interval: Duration::from_secs(1),

            camera_min_width: 640,
            camera_min_height: 480,
            camera_max_width: 4056,
            camera_max_height: 3040,
            camera_max_devices: 2,
            camera_poll_interval: Duration::from_secs(2),

            display_min_width: 640,
            display_min_height: 480,
            display_max_width: 7680,
            display_max_height: 4320,
            display_4k_min_refresh_hz: 60,
            display_poll_interval: Duration::from_secs(2),

            gpu_temp_variation_c: 15.0,
            gpu_poll_interval: Duration::from_secs(2),

            usb_poll_interval: Duration::from_secs(2),

            reference_hosts: vec![
                "8.8.8.8".to_string(),
                "1.1.1.1".to_string(),
                "208.67.222.222".to_string(),
            ],
            dns_test_domains: vec![
                "google.com".to_string(),
                "github.com".to_string(),
                "stackoverflow.com".to_string(),
            ],
            min_reachable_hosts: 2,
            min_resolved_domains: 2,
            max_connectivity_failures: 3,
            network_poll_interval: Duration::from_secs(10),

            battery_drain_limit_pct: 50,
            power_poll_interval: Duration::from_secs(5),

            form_factor_gpio_pins: (0..10).collect(),
            board_temp_drift_c: 20.0,
            board_temp_max_c: 100.0,
            form_factor_poll_interval: Duration::from_secs(5),
        }
    }
}

impl TestConfig {
    /// Parses a monitor duration given either as plain seconds ("10") or in
    /// humantime form ("1m 30s").
    pub fn parse_monitor_duration(duration_str: &str) -> std::result::Result<Duration, String> {
        let trimmed = duration_str.trim();
        let duration = match trimmed.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => humantime::parse_duration(trimmed)
                .map_err(|e| format!("Invalid duration format: {}", e))?,
        };

        if duration.is_zero() {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(duration)
    }

    /// Loads a configuration file. `.toml` files are parsed as TOML, anything
    /// else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProbeError::Config(format!("Config file not found: {}", path.display())));
        }

        let contents = fs::read_to_string(path).map_err(|e| ProbeError::io(path, e))?;

        let config = if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str::<Self>(&contents)
                .map_err(|e| ProbeError::Config(format!("Failed to parse TOML config: {}", e)))?
        } else {
            serde_json::from_str::<Self>(&contents)
                .map_err(|e| ProbeError::Config(format!("Failed to parse JSON config: {}", e)))?
        };

        Ok(config)
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
