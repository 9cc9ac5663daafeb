// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! User-space ioctl routing
//!
//! The sub-device node (`/dev/v4l-subdevN`) and the bridge's video node
//! translate ioctls into sub-device operations. [`dispatch`] performs that
//! translation for the ioctls that reach a sensor driver.

use std::fmt;

use super::subdev::SubdevOps;
use super::types::{FrameIntervalEnum, FrameSizeEnum, MbusCodeEnum, StreamParm, SubdevFormat};
use crate::Error;

const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;

const fn ioc(dir: u32, nr: u32, size: u32) -> u32 {
    (dir << 30) | (size << 16) | ((b'V' as u32) << 8) | nr
}

// Sizes of the kernel argument structures, they are part of the ioctl number.
const SIZEOF_SUBDEV_FORMAT: u32 = 88;
const SIZEOF_SUBDEV_MBUS_CODE_ENUM: u32 = 48;
const SIZEOF_SUBDEV_FRAME_SIZE_ENUM: u32 = 64;
const SIZEOF_SUBDEV_FRAME_INTERVAL_ENUM: u32 = 64;
const SIZEOF_STREAMPARM: u32 = 204;
const SIZEOF_INT: u32 = 4;

/// Ioctls routed to a sensor sub-device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SubdevIoctl {
    SubdevGetFormat = ioc(IOC_READ | IOC_WRITE, 4, SIZEOF_SUBDEV_FORMAT),
    SubdevSetFormat = ioc(IOC_READ | IOC_WRITE, 5, SIZEOF_SUBDEV_FORMAT),
    SubdevEnumMbusCode = ioc(IOC_READ | IOC_WRITE, 2, SIZEOF_SUBDEV_MBUS_CODE_ENUM),
    SubdevEnumFrameSize = ioc(IOC_READ | IOC_WRITE, 74, SIZEOF_SUBDEV_FRAME_SIZE_ENUM),
    SubdevEnumFrameInterval = ioc(IOC_READ | IOC_WRITE, 75, SIZEOF_SUBDEV_FRAME_INTERVAL_ENUM),
    GetParm = ioc(IOC_READ | IOC_WRITE, 21, SIZEOF_STREAMPARM),
    SetParm = ioc(IOC_READ | IOC_WRITE, 22, SIZEOF_STREAMPARM),
    StreamOn = ioc(IOC_WRITE, 18, SIZEOF_INT),
    StreamOff = ioc(IOC_WRITE, 19, SIZEOF_INT),
}

impl SubdevIoctl {
    const ALL: [SubdevIoctl; 9] = [
        SubdevIoctl::SubdevGetFormat,
        SubdevIoctl::SubdevSetFormat,
        SubdevIoctl::SubdevEnumMbusCode,
        SubdevIoctl::SubdevEnumFrameSize,
        SubdevIoctl::SubdevEnumFrameInterval,
        SubdevIoctl::GetParm,
        SubdevIoctl::SetParm,
        SubdevIoctl::StreamOn,
        SubdevIoctl::StreamOff,
    ];

    /// Ioctl request number
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn from_number(nr: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|ioctl| ioctl.number() == nr)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubdevIoctl::SubdevGetFormat => "VIDIOC_SUBDEV_G_FMT",
            SubdevIoctl::SubdevSetFormat => "VIDIOC_SUBDEV_S_FMT",
            SubdevIoctl::SubdevEnumMbusCode => "VIDIOC_SUBDEV_ENUM_MBUS_CODE",
            SubdevIoctl::SubdevEnumFrameSize => "VIDIOC_SUBDEV_ENUM_FRAME_SIZE",
            SubdevIoctl::SubdevEnumFrameInterval => "VIDIOC_SUBDEV_ENUM_FRAME_INTERVAL",
            SubdevIoctl::GetParm => "VIDIOC_G_PARM",
            SubdevIoctl::SetParm => "VIDIOC_S_PARM",
            SubdevIoctl::StreamOn => "VIDIOC_STREAMON",
            SubdevIoctl::StreamOff => "VIDIOC_STREAMOFF",
        }
    }

    /// Sub-device operation the ioctl is routed to
    pub fn op(&self) -> &'static str {
        match self {
            SubdevIoctl::SubdevGetFormat => "pad.get_fmt",
            SubdevIoctl::SubdevSetFormat => "pad.set_fmt",
            SubdevIoctl::SubdevEnumMbusCode => "pad.enum_mbus_code",
            SubdevIoctl::SubdevEnumFrameSize => "pad.enum_frame_size",
            SubdevIoctl::SubdevEnumFrameInterval => "pad.enum_frame_interval",
            SubdevIoctl::GetParm => "video.g_parm",
            SubdevIoctl::SetParm => "video.s_parm",
            SubdevIoctl::StreamOn | SubdevIoctl::StreamOff => "video.s_stream",
        }
    }

    pub fn all() -> &'static [SubdevIoctl] {
        &Self::ALL
    }
}

impl fmt::Display for SubdevIoctl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08x})", self.name(), self.number())
    }
}

/// An ioctl together with its argument
///
/// [`dispatch`] hands the argument to the matching operation and returns it
/// with the result fields filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ioctl {
    GetFormat(SubdevFormat),
    SetFormat(SubdevFormat),
    EnumMbusCode(MbusCodeEnum),
    EnumFrameSize(FrameSizeEnum),
    EnumFrameInterval(FrameIntervalEnum),
    GetParm(StreamParm),
    SetParm(StreamParm),
    StreamOn,
    StreamOff,
}

impl Ioctl {
    pub fn request(&self) -> SubdevIoctl {
        match self {
            Ioctl::GetFormat(_) => SubdevIoctl::SubdevGetFormat,
            Ioctl::SetFormat(_) => SubdevIoctl::SubdevSetFormat,
            Ioctl::EnumMbusCode(_) => SubdevIoctl::SubdevEnumMbusCode,
            Ioctl::EnumFrameSize(_) => SubdevIoctl::SubdevEnumFrameSize,
            Ioctl::EnumFrameInterval(_) => SubdevIoctl::SubdevEnumFrameInterval,
            Ioctl::GetParm(_) => SubdevIoctl::GetParm,
            Ioctl::SetParm(_) => SubdevIoctl::SetParm,
            Ioctl::StreamOn => SubdevIoctl::StreamOn,
            Ioctl::StreamOff => SubdevIoctl::StreamOff,
        }
    }
}

/// Route an ioctl to the sub-device operation implementing it
pub fn dispatch<S: SubdevOps + ?Sized>(sd: &mut S, mut ioctl: Ioctl) -> Result<Ioctl, Error> {
    log::trace!(
        "{}: {} -> {}",
        sd.subdev().name(),
        ioctl.request().name(),
        ioctl.request().op()
    );

    match &mut ioctl {
        Ioctl::GetFormat(format) => sd.get_fmt(format)?,
        Ioctl::SetFormat(format) => sd.set_fmt(format)?,
        Ioctl::EnumMbusCode(code) => sd.enum_mbus_code(code)?,
        Ioctl::EnumFrameSize(fse) => sd.enum_frame_size(fse)?,
        Ioctl::EnumFrameInterval(fie) => sd.enum_frame_interval(fie)?,
        Ioctl::GetParm(parm) => sd.g_parm(parm)?,
        Ioctl::SetParm(parm) => sd.s_parm(parm)?,
        Ioctl::StreamOn => sd.s_stream(true)?,
        Ioctl::StreamOff => sd.s_stream(false)?,
    }

    Ok(ioctl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ioctl_numbers() {
        assert_eq!(SubdevIoctl::SubdevGetFormat.number(), 0xc058_5604);
        assert_eq!(SubdevIoctl::SubdevSetFormat.number(), 0xc058_5605);
        assert_eq!(SubdevIoctl::SubdevEnumMbusCode.number(), 0xc030_5602);
        assert_eq!(SubdevIoctl::SubdevEnumFrameSize.number(), 0xc040_564a);
        assert_eq!(SubdevIoctl::SubdevEnumFrameInterval.number(), 0xc040_564b);
        assert_eq!(SubdevIoctl::GetParm.number(), 0xc0cc_5615);
        assert_eq!(SubdevIoctl::SetParm.number(), 0xc0cc_5616);
        assert_eq!(SubdevIoctl::StreamOn.number(), 0x4004_5612);
        assert_eq!(SubdevIoctl::StreamOff.number(), 0x4004_5613);
    }

    #[test]
    fn test_from_number() {
        for ioctl in SubdevIoctl::all() {
            assert_eq!(SubdevIoctl::from_number(ioctl.number()), Some(*ioctl));
        }
        assert_eq!(SubdevIoctl::from_number(0x8068_5600), None);
    }
}
