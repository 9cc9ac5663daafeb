// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Asynchronous sub-device registration
//!
//! Sensors do not register directly with a video device. They announce
//! themselves to the async framework, which binds them once the bridge
//! driver (the CSI receiver) is ready. The kernel API for this changed in
//! 5.13, when sensors gained a dedicated entry point that also parses the
//! firmware node for lens and flash references.

use std::fmt;
use std::str::FromStr;

use super::subdev::Subdev;
use crate::Error;

/// Kernel release, used to pick the registration entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl KernelVersion {
    /// First release providing `v4l2_async_register_subdev_sensor`
    pub const SENSOR_ASYNC: KernelVersion = KernelVersion::new(5, 13, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Registration entry point available on this release
    pub fn registration_mode(&self) -> RegistrationMode {
        if *self < Self::SENSOR_ASYNC {
            RegistrationMode::Async
        } else {
            RegistrationMode::AsyncSensor
        }
    }
}

impl Default for KernelVersion {
    fn default() -> Self {
        KernelVersion::new(6, 1, 0)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse a release string such as `5.15.0`, `6.1` or `6.6.23-rt28`.
///
/// Anything after the first non-numeric character of a component is
/// ignored, a missing patch level reads as 0.
impl FromStr for KernelVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Parse(format!("invalid kernel version: {}", s));

        let mut parts = s.trim().splitn(3, '.');
        let mut component = |required: bool| -> Result<u32, Error> {
            match parts.next() {
                Some(part) => {
                    let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                    digits.parse::<u32>().map_err(|_| invalid())
                }
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let major = component(true)?;
        let minor = component(true)?;
        let patch = component(false)?;
        Ok(KernelVersion::new(major, minor, patch))
    }
}

/// Async registration entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationMode {
    /// `v4l2_async_register_subdev`
    Async,
    /// `v4l2_async_register_subdev_sensor`
    AsyncSensor,
}

impl RegistrationMode {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationMode::Async => "v4l2_async_register_subdev",
            RegistrationMode::AsyncSensor => "v4l2_async_register_subdev_sensor",
        }
    }
}

impl fmt::Display for RegistrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The framework side of sub-device registration
pub trait SubdevRegistry {
    /// Register `sd` for async binding
    fn register(&mut self, sd: &Subdev, mode: RegistrationMode) -> Result<(), Error>;

    /// Remove `sd` from the framework. Unknown sub-devices are ignored.
    fn unregister(&mut self, sd: &Subdev);
}

/// Record of one registered sub-device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSubdev {
    pub name: String,
    pub owner: &'static str,
    pub dev_name: String,
    pub mode: RegistrationMode,
}

/// In-process async sub-device registry
///
/// Keeps registered sub-devices in registration order and refuses duplicate
/// names. A failure can be armed with [`AsyncRegistry::fail_next`] to drive
/// the error path of a probe.
#[derive(Debug, Default)]
pub struct AsyncRegistry {
    subdevs: Vec<RegisteredSubdev>,
    fail_next: Option<i32>,
}

impl AsyncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next registration fail with `errno` (either sign)
    pub fn fail_next(&mut self, errno: i32) {
        self.fail_next = Some(errno.saturating_abs());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subdevs.iter().any(|sd| sd.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredSubdev> {
        self.subdevs.iter().find(|sd| sd.name == name)
    }

    pub fn len(&self) -> usize {
        self.subdevs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subdevs.is_empty()
    }
}

impl SubdevRegistry for AsyncRegistry {
    fn register(&mut self, sd: &Subdev, mode: RegistrationMode) -> Result<(), Error> {
        if let Some(errno) = self.fail_next.take() {
            return Err(Error::Registration(errno));
        }

        if self.contains(sd.name()) {
            return Err(Error::Exists);
        }

        log::trace!("{}: {} ({})", sd.dev_name(), mode, sd.name());
        self.subdevs.push(RegisteredSubdev {
            name: sd.name().to_owned(),
            owner: sd.owner(),
            dev_name: sd.dev_name().to_owned(),
            mode,
        });
        Ok(())
    }

    fn unregister(&mut self, sd: &Subdev) {
        self.subdevs.retain(|entry| entry.name != sd.name());
    }
}
