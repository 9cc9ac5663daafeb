// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! VisionSensor PV3 MIPI sensor driver
//!
//! Exposes a MIPI camera sensor as a V4L2 sub-device. The driver binds to a
//! platform device matching the `imago,sensor_mipi` compatible string,
//! registers a sub-device named `vsmipi.<device-name>` with the media
//! framework and answers the core, video and pad operation tables.
//!
//! The sensor does no register programming: formats, frame sizes and frame
//! intervals are advertised from a fixed table and the power/stream handlers
//! only acknowledge the request.
//!
//! # Quick Start
//!
//! ```
//! use vsmipi::platform::{PlatformDevice, PlatformDriver};
//! use vsmipi::v4l2::{AsyncRegistry, FormatWhence, PadOps, SubdevFormat};
//!
//! let mut registry = AsyncRegistry::new();
//! let mut pdev = PlatformDevice::new("csi0").with_compatible("imago,sensor_mipi");
//!
//! let driver = PlatformDriver::default();
//! driver.bind(&mut pdev, &mut registry)?;
//! assert!(registry.contains("vsmipi.csi0"));
//!
//! let sensor = pdev.drvdata_mut().unwrap();
//! let mut fmt = SubdevFormat::new(FormatWhence::Active, 0);
//! sensor.get_fmt(&mut fmt)?;
//! println!("{}x{} {}", fmt.format.width, fmt.format.height, fmt.format.code);
//!
//! driver.remove(&mut pdev, &mut registry)?;
//! # Ok::<(), vsmipi::Error>(())
//! ```
//!
//! # Operation tables
//!
//! | Table | Operations |
//! |-------|------------|
//! | core  | `s_power` |
//! | video | `g_parm`, `s_parm`, `s_stream` |
//! | pad   | `enum_frame_size`, `enum_frame_interval`, `enum_mbus_code`, `set_fmt`, `get_fmt` |

use std::{error, fmt};

/// Module name, also used as the sub-device name prefix.
pub const MODULE_NAME: &str = "vsmipi";

/// Module version (also used as the DKMS module version).
pub const MODULE_VERSION: &str = "1.3.2.0";

pub const MODULE_ALIAS: &str = "CSI";
pub const MODULE_LICENSE: &str = "GPL";
pub const MODULE_AUTHOR: &str = "IMAGO Technologies GmbH";
pub const MODULE_DESCRIPTION: &str = "VisionSensor PV3 MIPI sensor driver";

/// Kernel error numbers used by the driver.
pub mod errno {
    pub const ENOMEM: i32 = 12;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const ENODEV: i32 = 19;
    pub const EINVAL: i32 = 22;
    /// Internal code returned for operations a sub-device does not provide.
    pub const ENOIOCTLCMD: i32 = 515;
}

/// Error type for driver and framework operations
///
/// Every variant maps onto the negative kernel error code the media
/// framework expects, see [`Error::errno`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unsupported buffer type, pad or enumeration index (`EINVAL`)
    InvalidArgument,

    /// Device does not match the driver or carries no driver data (`ENODEV`)
    NoDevice,

    /// Device is already bound to a driver (`EBUSY`)
    Busy,

    /// A sub-device with the same name is already registered (`EEXIST`)
    Exists,

    /// The sub-device does not implement the requested operation (`ENOIOCTLCMD`)
    NotSupported,

    /// Sub-device registration was refused by the framework with the given errno
    Registration(i32),

    /// Malformed textual input (kernel version, fraction, pixel code)
    Parse(String),
}

impl Error {
    /// Negative kernel error code for this error
    pub fn errno(&self) -> i32 {
        match self {
            Error::InvalidArgument | Error::Parse(_) => -errno::EINVAL,
            Error::NoDevice => -errno::ENODEV,
            Error::Busy => -errno::EBUSY,
            Error::Exists => -errno::EEXIST,
            Error::NotSupported => -errno::ENOIOCTLCMD,
            Error::Registration(code) => -code.saturating_abs(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::NoDevice => write!(f, "No such device"),
            Error::Busy => write!(f, "Device or resource busy"),
            Error::Exists => write!(f, "Sub-device already registered"),
            Error::NotSupported => write!(f, "Operation not supported by sub-device"),
            Error::Registration(_) => {
                write!(f, "Sub-device registration failed ({})", self.errno())
            }
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl error::Error for Error {}

/// The format module provides the sensor's media bus format table.
pub mod format;

/// The v4l2 module models the sub-device side of the media framework.
pub mod v4l2;

/// The sensor module implements the sub-device operations.
pub mod sensor;

/// The platform module provides the platform driver probe/remove.
pub mod platform;
