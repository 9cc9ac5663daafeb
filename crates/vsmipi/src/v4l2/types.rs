// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Sub-device request structures
//!
//! These are the in/out arguments the media framework hands to sub-device
//! operations. Like their kernel counterparts they are filled in place: the
//! caller sets the request fields, the operation writes the result fields.

use std::fmt;
use std::str::FromStr;

use crate::format::{Colorspace, Field, MbusCode};
use crate::Error;

/// Frames per second used whenever a frame interval is missing or invalid.
pub const DEFAULT_FPS: u32 = 30;

/// Frame interval substituted for a fraction with a zero term (1/30 s).
pub const DEFAULT_FRAME_INTERVAL: Fract = Fract::new(1, DEFAULT_FPS);

/// Fraction of seconds (`struct v4l2_fract`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fract {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fract {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frame interval of `fps` frames per second
    pub const fn per_second(fps: u32) -> Self {
        Self::new(1, fps)
    }

    /// True when either term is zero
    pub fn is_degenerate(&self) -> bool {
        self.numerator == 0 || self.denominator == 0
    }

    /// This fraction, or [`DEFAULT_FRAME_INTERVAL`] if either term is zero
    pub fn normalized(self) -> Self {
        if self.is_degenerate() {
            DEFAULT_FRAME_INTERVAL
        } else {
            self
        }
    }

    /// Whole frames per second for a frame interval, `None` for a degenerate
    /// fraction
    pub fn fps(&self) -> Option<u32> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.denominator / self.numerator)
        }
    }
}

impl fmt::Display for Fract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Media bus frame format (`struct v4l2_mbus_framefmt`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MbusFrameFmt {
    pub width: u32,
    pub height: u32,
    pub code: MbusCode,
    pub field: Field,
    pub colorspace: Colorspace,
}

/// Which format a pad operation addresses (`enum v4l2_subdev_format_whence`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FormatWhence {
    /// Negotiation only, device state is left untouched
    Try = 0,
    /// The format the device actually uses
    #[default]
    Active = 1,
}

/// `struct v4l2_subdev_format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubdevFormat {
    pub which: FormatWhence,
    pub pad: u32,
    pub format: MbusFrameFmt,
}

impl SubdevFormat {
    pub fn new(which: FormatWhence, pad: u32) -> Self {
        Self {
            which,
            pad,
            format: MbusFrameFmt::default(),
        }
    }

    /// Request for `code` at `width`x`height` on pad 0
    pub fn request(which: FormatWhence, code: MbusCode, width: u32, height: u32) -> Self {
        Self {
            which,
            pad: 0,
            format: MbusFrameFmt {
                width,
                height,
                code,
                ..MbusFrameFmt::default()
            },
        }
    }
}

/// `struct v4l2_subdev_mbus_code_enum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MbusCodeEnum {
    pub pad: u32,
    pub index: u32,
    pub code: MbusCode,
}

impl MbusCodeEnum {
    pub fn new(pad: u32, index: u32) -> Self {
        Self {
            pad,
            index,
            code: MbusCode::default(),
        }
    }
}

/// `struct v4l2_subdev_frame_size_enum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSizeEnum {
    pub index: u32,
    pub pad: u32,
    pub code: MbusCode,
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl FrameSizeEnum {
    pub fn new(index: u32, code: MbusCode) -> Self {
        Self {
            index,
            code,
            ..Self::default()
        }
    }
}

/// `struct v4l2_subdev_frame_interval_enum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameIntervalEnum {
    pub index: u32,
    pub pad: u32,
    pub code: MbusCode,
    pub width: u32,
    pub height: u32,
    pub interval: Fract,
}

impl FrameIntervalEnum {
    pub fn new(index: u32, code: MbusCode, width: u32, height: u32) -> Self {
        Self {
            index,
            code,
            width,
            height,
            ..Self::default()
        }
    }
}

/// Buffer type of a stream parameter request (`enum v4l2_buf_type`)
///
/// Values the framework defines but the driver never handles are kept so
/// that they can be told apart from values nobody knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufType {
    #[default]
    VideoCapture,
    VideoOutput,
    VideoOverlay,
    VbiCapture,
    VbiOutput,
    SlicedVbiCapture,
    SlicedVbiOutput,
    /// Any other raw value
    Unknown(u32),
}

impl BufType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => BufType::VideoCapture,
            2 => BufType::VideoOutput,
            3 => BufType::VideoOverlay,
            4 => BufType::VbiCapture,
            5 => BufType::VbiOutput,
            6 => BufType::SlicedVbiCapture,
            7 => BufType::SlicedVbiOutput,
            other => BufType::Unknown(other),
        }
    }

    pub fn as_raw(&self) -> u32 {
        match self {
            BufType::VideoCapture => 1,
            BufType::VideoOutput => 2,
            BufType::VideoOverlay => 3,
            BufType::VbiCapture => 4,
            BufType::VbiOutput => 5,
            BufType::SlicedVbiCapture => 6,
            BufType::SlicedVbiOutput => 7,
            BufType::Unknown(raw) => *raw,
        }
    }

    /// Name without the `V4L2_BUF_TYPE_` prefix
    pub fn name(&self) -> &'static str {
        match self {
            BufType::VideoCapture => "VIDEO_CAPTURE",
            BufType::VideoOutput => "VIDEO_OUTPUT",
            BufType::VideoOverlay => "VIDEO_OVERLAY",
            BufType::VbiCapture => "VBI_CAPTURE",
            BufType::VbiOutput => "VBI_OUTPUT",
            BufType::SlicedVbiCapture => "SLICED_VBI_CAPTURE",
            BufType::SlicedVbiOutput => "SLICED_VBI_OUTPUT",
            BufType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for BufType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufType::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Parse a buffer type from its name (with or without the `V4L2_BUF_TYPE_`
/// prefix, any case) or its raw number.
impl FromStr for BufType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("V4L2_BUF_TYPE_").unwrap_or(upper.as_str());

        if let Some(bt) = (1..=7).map(BufType::from_raw).find(|bt| bt.name() == name) {
            return Ok(bt);
        }

        name.parse::<u32>()
            .map(BufType::from_raw)
            .map_err(|_| Error::Parse(format!("unknown buffer type: {}", s)))
    }
}

/// Capture parameters (`struct v4l2_captureparm`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureParm {
    /// Supported modes
    pub capability: u32,
    /// Current mode
    pub capturemode: u32,
    /// Time per frame in seconds
    pub timeperframe: Fract,
    /// Driver-specific extensions
    pub extendedmode: u32,
    /// Number of buffers for read()
    pub readbuffers: u32,
}

/// Stream parameters (`struct v4l2_streamparm`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamParm {
    pub buf_type: BufType,
    pub capture: CaptureParm,
}

impl StreamParm {
    pub fn new(buf_type: BufType) -> Self {
        Self {
            buf_type,
            capture: CaptureParm::default(),
        }
    }

    /// Capture request setting `timeperframe` and `capturemode`
    pub fn capture(timeperframe: Fract, capturemode: u32) -> Self {
        Self {
            buf_type: BufType::VideoCapture,
            capture: CaptureParm {
                timeperframe,
                capturemode,
                ..CaptureParm::default()
            },
        }
    }
}
