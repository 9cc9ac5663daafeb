// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Sub-device object and operation tables
//!
//! A driver embeds a [`Subdev`] in its per-device state and implements the
//! operation traits. Every operation has a default body that reports
//! [`Error::NotSupported`], which is what the framework answers for a missing
//! entry in an operation table.

use std::fmt;

use super::types::{FrameIntervalEnum, FrameSizeEnum, MbusCodeEnum, StreamParm, SubdevFormat};
use crate::Error;

/// Size of the sub-device name buffer, including the terminating NUL.
pub const SUBDEV_NAME_SIZE: usize = 52;

/// Registration state of a sub-device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifecycle {
    #[default]
    Unregistered,
    Registered,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Unregistered => write!(f, "unregistered"),
            Lifecycle::Registered => write!(f, "registered"),
        }
    }
}

/// V4L2 sub-device (`struct v4l2_subdev`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subdev {
    name: String,
    owner: &'static str,
    dev_name: String,
    lifecycle: Lifecycle,
}

impl Subdev {
    /// Initialize a sub-device owned by module `owner` for device `dev_name`.
    ///
    /// The name is `"<owner>.<dev_name>"`, cut to fit the name buffer.
    pub fn init(owner: &'static str, dev_name: &str) -> Self {
        let mut name = format!("{}.{}", owner, dev_name);
        if name.len() >= SUBDEV_NAME_SIZE {
            let mut end = SUBDEV_NAME_SIZE - 1;
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name.truncate(end);
        }

        Subdev {
            name,
            owner,
            dev_name: dev_name.to_owned(),
            lifecycle: Lifecycle::Unregistered,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module owning the sub-device
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Name of the parent device, used to prefix log messages
    pub fn dev_name(&self) -> &str {
        &self.dev_name
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_registered(&self) -> bool {
        self.lifecycle == Lifecycle::Registered
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }
}

/// Core operations (`struct v4l2_subdev_core_ops`)
pub trait CoreOps {
    fn s_power(&mut self, on: bool) -> Result<(), Error> {
        let _ = on;
        Err(Error::NotSupported)
    }
}

/// Video operations (`struct v4l2_subdev_video_ops`)
pub trait VideoOps {
    fn g_parm(&self, parm: &mut StreamParm) -> Result<(), Error> {
        let _ = parm;
        Err(Error::NotSupported)
    }

    fn s_parm(&mut self, parm: &mut StreamParm) -> Result<(), Error> {
        let _ = parm;
        Err(Error::NotSupported)
    }

    fn s_stream(&mut self, enable: bool) -> Result<(), Error> {
        let _ = enable;
        Err(Error::NotSupported)
    }
}

/// Pad operations (`struct v4l2_subdev_pad_ops`)
pub trait PadOps {
    fn enum_mbus_code(&self, code: &mut MbusCodeEnum) -> Result<(), Error> {
        let _ = code;
        Err(Error::NotSupported)
    }

    fn enum_frame_size(&self, fse: &mut FrameSizeEnum) -> Result<(), Error> {
        let _ = fse;
        Err(Error::NotSupported)
    }

    fn enum_frame_interval(&self, fie: &mut FrameIntervalEnum) -> Result<(), Error> {
        let _ = fie;
        Err(Error::NotSupported)
    }

    fn get_fmt(&self, format: &mut SubdevFormat) -> Result<(), Error> {
        let _ = format;
        Err(Error::NotSupported)
    }

    fn set_fmt(&mut self, format: &mut SubdevFormat) -> Result<(), Error> {
        let _ = format;
        Err(Error::NotSupported)
    }
}

/// Complete operation table of a sub-device driver
pub trait SubdevOps: CoreOps + VideoOps + PadOps {
    /// The embedded sub-device object
    fn subdev(&self) -> &Subdev;
}
