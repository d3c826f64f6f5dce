//! Minimal Video4Linux2 queries used for camera enumeration.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::core::error::{ProbeError, Result};

use self::sys::{vidioc_g_fmt, vidioc_querycap, V4l2Capability, V4l2Format, V4l2FormatData};

const V4L2_CAP_VIDEO_CAPTURE: u32 = 0x0000_0001;
const V4L2_BUF_TYPE_VIDEO_CAPTURE: u32 = 1;

/// Kernel structures from `linux/videodev2.h` and the ioctls that fill them.
#[allow(dead_code)]
mod sys {
    use nix::libc;

    #[repr(C)]
    #[derive(Default)]
    pub struct V4l2Capability {
        pub driver: [u8; 16],
        pub card: [u8; 32],
        pub bus_info: [u8; 32],
        pub version: u32,
        pub capabilities: u32,
        pub device_caps: u32,
        pub reserved: [u32; 3],
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    pub struct V4l2PixFormat {
        pub width: u32,
        pub height: u32,
        pub pixelformat: u32,
        pub field: u32,
        pub bytesperline: u32,
        pub sizeimage: u32,
        pub colorspace: u32,
        pub private: u32,
        pub flags: u32,
        pub ycbcr_enc: u32,
        pub quantization: u32,
        pub xfer_func: u32,
    }

    #[repr(C)]
    pub union V4l2FormatData {
        pub pix: V4l2PixFormat,
        pub raw: [u8; 200],
        // The kernel union holds pointers, which sets its alignment.
        pub align: [libc::c_ulong; 0],
    }

    #[repr(C)]
    pub struct V4l2Format {
        pub kind: u32,
        pub fmt: V4l2FormatData,
    }

    nix::ioctl_read!(vidioc_querycap, b'V', 0, V4l2Capability);
    nix::ioctl_readwrite!(vidioc_g_fmt, b'V', 4, V4l2Format);
}

/// What `VIDIOC_QUERYCAP` reports for a video node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCapabilities {
    pub driver: String,
    pub card: String,
    pub capture: bool,
}

/// Queries video device nodes.
pub trait VideoProbe: Send + Sync {
    fn capabilities(&self, node: &Path) -> Result<VideoCapabilities>;

    /// Current capture format as `(width, height)`.
    fn capture_format(&self, node: &Path) -> Result<(u32, u32)>;
}

/// Talks to real V4L2 nodes through `ioctl`.
#[derive(Debug, Default)]
pub struct V4l2Probe;

impl V4l2Probe {
    fn open(node: &Path) -> Result<File> {
        File::open(node).map_err(|e| ProbeError::io(node, e))
    }
}

impl VideoProbe for V4l2Probe {
    fn capabilities(&self, node: &Path) -> Result<VideoCapabilities> {
        let file = Self::open(node)?;
        let mut cap = V4l2Capability::default();

        // SAFETY: `cap` is a properly sized, writable v4l2_capability and the
        // descriptor stays open for the duration of the call.
        unsafe { vidioc_querycap(file.as_raw_fd(), &mut cap) }
            .map_err(|errno| ProbeError::io(node, io::Error::from(errno)))?;

        Ok(VideoCapabilities {
            driver: c_string(&cap.driver),
            card: c_string(&cap.card),
            capture: cap.capabilities & V4L2_CAP_VIDEO_CAPTURE != 0,
        })
    }

    fn capture_format(&self, node: &Path) -> Result<(u32, u32)> {
        let file = Self::open(node)?;
        let mut format = V4l2Format {
            kind: V4L2_BUF_TYPE_VIDEO_CAPTURE,
            fmt: V4l2FormatData { raw: [0; 200] },
        };

        // SAFETY: `format` matches the kernel's v4l2_format layout and is
        // writable for the duration of the call.
        unsafe { vidioc_g_fmt(file.as_raw_fd(), &mut format) }
            .map_err(|errno| ProbeError::io(node, io::Error::from(errno)))?;

        // SAFETY: for VIDEO_CAPTURE buffers the kernel fills the `pix` member.
        let pix = unsafe { format.fmt.pix };
        Ok((pix.width, pix.height))
    }
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
