// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Media bus formats advertised by the sensor
//!
//! The sensor streams raw Bayer data only. The supported media bus codes are
//! held in a fixed table, [`SENSOR_FORMATS`], whose order is the enumeration
//! order reported through `enum_mbus_code`.
//!
//! | Index | Code | Name | Colorspace |
//! |-------|------|------|------------|
//! | 0 | `0x3001` | `SBGGR8_1X8` | raw |
//! | 1 | `0x3007` | `SBGGR10_1X10` | raw |
//! | 2 | `0x300b` | `SBGGR10_ALAW8_1X8` | raw |

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Media bus pixel code (`MEDIA_BUS_FMT_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MbusCode(pub u32);

impl MbusCode {
    pub const SBGGR8_1X8: MbusCode = MbusCode(0x3001);
    pub const SBGGR10_1X10: MbusCode = MbusCode(0x3007);
    pub const SBGGR10_ALAW8_1X8: MbusCode = MbusCode(0x300b);

    /// Raw code value
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    /// Short name without the `MEDIA_BUS_FMT_` prefix, if the code is one the
    /// sensor knows about
    pub fn name(self) -> Option<&'static str> {
        match self {
            MbusCode::SBGGR8_1X8 => Some("SBGGR8_1X8"),
            MbusCode::SBGGR10_1X10 => Some("SBGGR10_1X10"),
            MbusCode::SBGGR10_ALAW8_1X8 => Some("SBGGR10_ALAW8_1X8"),
            _ => None,
        }
    }
}

impl fmt::Display for MbusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:04x})", name, self.0),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

/// Parse a media bus code from its short name (`SBGGR8_1X8`, optionally with
/// the `MEDIA_BUS_FMT_` prefix) or a decimal/`0x` hexadecimal number.
///
/// Any numeric value is accepted, whether or not the sensor supports it.
impl FromStr for MbusCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("MEDIA_BUS_FMT_").unwrap_or(upper.as_str());

        if let Some(fmt) = SENSOR_FORMATS.iter().find(|f| f.code.name() == Some(name)) {
            return Ok(fmt.code);
        }

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else {
            s.parse::<u32>()
        };

        value
            .map(MbusCode)
            .map_err(|_| Error::Parse(format!("unknown media bus code: {}", s)))
    }
}

/// V4L2 colorspace (`enum v4l2_colorspace`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Colorspace {
    #[default]
    Default = 0,
    Smpte170m = 1,
    Smpte240m = 2,
    Rec709 = 3,
    Bt878 = 4,
    SystemM470 = 5,
    SystemBg470 = 6,
    Jpeg = 7,
    Srgb = 8,
    OpRgb = 9,
    Bt2020 = 10,
    /// Raw sensor data, no colorspace conversion defined
    Raw = 11,
    DciP3 = 12,
}

impl Colorspace {
    pub fn name(&self) -> &'static str {
        match self {
            Colorspace::Default => "default",
            Colorspace::Smpte170m => "smpte170m",
            Colorspace::Smpte240m => "smpte240m",
            Colorspace::Rec709 => "rec709",
            Colorspace::Bt878 => "bt878",
            Colorspace::SystemM470 => "470m",
            Colorspace::SystemBg470 => "470bg",
            Colorspace::Jpeg => "jpeg",
            Colorspace::Srgb => "srgb",
            Colorspace::OpRgb => "oprgb",
            Colorspace::Bt2020 => "bt2020",
            Colorspace::Raw => "raw",
            Colorspace::DciP3 => "dcip3",
        }
    }
}

impl fmt::Display for Colorspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Field order of a frame (`enum v4l2_field`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Field {
    /// Driver may choose
    #[default]
    Any = 0,
    /// Progressive
    None = 1,
    Top = 2,
    Bottom = 3,
    Interlaced = 4,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Any => write!(f, "any"),
            Field::None => write!(f, "none"),
            Field::Top => write!(f, "top"),
            Field::Bottom => write!(f, "bottom"),
            Field::Interlaced => write!(f, "interlaced"),
        }
    }
}

/// V4L2 pixel format fourcc (`V4L2_PIX_FMT_*`)
///
/// V4L2 packs fourcc codes little-endian regardless of the host byte order,
/// so the conversion to `u32` does not depend on the target.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat(pub [u8; 4]);

impl PixelFormat {
    /// `V4L2_PIX_FMT_SBGGR8`, 8-bit Bayer BGBG/GRGR
    pub const SBGGR8: PixelFormat = PixelFormat(*b"BA81");

    pub const fn to_u32(self) -> u32 {
        (self.0[0] as u32)
            | (self.0[1] as u32) << 8
            | (self.0[2] as u32) << 16
            | (self.0[3] as u32) << 24
    }

    pub const fn from_u32(val: u32) -> PixelFormat {
        PixelFormat([
            (val & 0xff) as u8,
            (val >> 8 & 0xff) as u8,
            (val >> 16 & 0xff) as u8,
            (val >> 24 & 0xff) as u8,
        ])
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::SBGGR8
    }
}

impl From<PixelFormat> for u32 {
    fn from(val: PixelFormat) -> Self {
        val.to_u32()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelFormat({})", self)
    }
}

/// Entry of the sensor format table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFormat {
    pub code: MbusCode,
    pub colorspace: Colorspace,
}

/// Formats the sensor can produce, in enumeration order
pub static SENSOR_FORMATS: [DataFormat; 3] = [
    DataFormat {
        code: MbusCode::SBGGR8_1X8,
        colorspace: Colorspace::Raw,
    },
    DataFormat {
        code: MbusCode::SBGGR10_1X10,
        colorspace: Colorspace::Raw,
    },
    DataFormat {
        code: MbusCode::SBGGR10_ALAW8_1X8,
        colorspace: Colorspace::Raw,
    },
];

/// Table entry substituted when a caller requests a code the sensor does not
/// know
pub const DEFAULT_FORMAT_INDEX: usize = 0;

/// Format used when nothing else was requested
pub fn default_datafmt() -> &'static DataFormat {
    &SENSOR_FORMATS[DEFAULT_FORMAT_INDEX]
}

/// Find a data format by its media bus code
pub fn find_datafmt(code: MbusCode) -> Option<&'static DataFormat> {
    SENSOR_FORMATS.iter().find(|fmt| fmt.code == code)
}
