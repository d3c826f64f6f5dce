use serde::{Serialize, Deserialize};
use std::fmt;


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub model_name: String,
    pub cores: u32,
    pub architecture: String,
    pub max_frequency_mhz: u32,
    /// Degrees Celsius, `None` when no sensor gave a plausible value.
    pub temperature_c: Option<f64>,
    pub m33_status: String,
    pub npu_status: Option<String>,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_mb: u64,
    pub available_mb: u64,
    pub memory_type: String,
    pub ecc_supported: bool,
    pub ecc_enabled: bool,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    Emmc,
    SdCard,
    Nvme,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageKind::Emmc => "eMMC",
            StorageKind::SdCard => "SD Card",
            StorageKind::Nvme => "NVMe",
        })
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageDevice {
    pub device_path: String,
    pub kind: StorageKind,
    pub size_gb: u64,
    pub model: String,
}


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub device_path: String,
    pub driver: String,
    pub sensor: String,
    pub width: u32,
    pub height: u32,
    pub connected: bool,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayKind {
    Hdmi,
    MipiDsi,
    Composite,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub name: String,
    pub kind: DisplayKind,
    pub connected: bool,
    pub width: u32,
    pub height: u32,
    pub refresh_hz: u32,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub model: String,
    pub driver: String,
    pub memory_mb: u64,
    /// Version string reported by the GL stack, if OpenGL works at all.
    pub opengl_version: Option<String>,
    pub vulkan_version: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbControllerInfo {
    pub name: String,
    pub version: String,
    pub ports: u32,
    pub power_path: String,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsbSpeed {
    Low,
    Full,
    High,
    Super,
    Unknown,
}

impl UsbSpeed {
    /// Maps the sysfs `speed` attribute (Mbit/s).
    pub fn from_sysfs(raw: &str) -> Self {
        match raw.trim() {
            "1.5" => UsbSpeed::Low,
            "12" => UsbSpeed::Full,
            "480" => UsbSpeed::High,
            "5000" | "10000" | "20000" => UsbSpeed::Super,
            _ => UsbSpeed::Unknown,
        }
    }
}

impl fmt::Display for UsbSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UsbSpeed::Low => "Low Speed",
            UsbSpeed::Full => "Full Speed",
            UsbSpeed::High => "High Speed",
            UsbSpeed::Super => "Super Speed",
            UsbSpeed::Unknown => "Unknown Speed",
        })
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDeviceInfo {
    pub sysfs_path: String,
    pub vendor_id: String,
    pub product_id: String,
    pub manufacturer: String,
    pub product: String,
    pub max_power_ma: u32,
    pub speed: UsbSpeed,
    pub device_type: String,
    pub connected: bool,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkKind {
    Ethernet,
    Wifi,
    Bluetooth,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceInfo {
    pub name: String,
    pub kind: NetworkKind,
    pub up: bool,
    pub carrier: bool,
    pub mac_address: String,
    pub mtu: u32,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerSource {
    Battery,
    AcAdapter,
    UsbC,
    Poe,
    #[default]
    Unknown,
}

impl fmt::Display for PowerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PowerSource::Battery => "Battery",
            PowerSource::AcAdapter => "AC Adapter",
            PowerSource::UsbC => "USB-C",
            PowerSource::Poe => "PoE",
            PowerSource::Unknown => "Unknown",
        })
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerInfo {
    pub source: PowerSource,
    pub model: String,
    pub voltage_v: f64,
    pub current_ma: f64,
    pub power_w: f64,
    pub battery_percent: Option<u8>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub available: bool,
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFactorInfo {
    pub module_type: String,
    pub revision: String,
    pub serial_number: String,
    /// Degrees Celsius, 0 when no sensor answered.
    pub temperature_c: f64,
    pub interfaces: Vec<InterfaceInfo>,
}

impl FormFactorInfo {
    pub fn available_interfaces(&self) -> usize {
        self.interfaces.iter().filter(|i| i.available).count()
    }
}
