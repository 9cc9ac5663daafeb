// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;

use crate::format::{default_datafmt, find_datafmt, DataFormat, Field, PixelFormat, SENSOR_FORMATS};
use crate::v4l2::{
    BufType, CaptureParm, CoreOps, FormatWhence, Fract, FrameIntervalEnum, FrameSizeEnum,
    KernelVersion, MbusCodeEnum, PadOps, StreamParm, Subdev, SubdevFormat, SubdevOps, VideoOps,
    DEFAULT_FPS, DEFAULT_FRAME_INTERVAL,
};
use crate::{Error, MODULE_NAME};

/// Frame size range reported by `enum_frame_size`. The sensor accepts any
/// geometry, these are the limits of the CSI receiver.
pub const MIN_WIDTH: u32 = 128;
pub const MAX_WIDTH: u32 = 16384;
pub const MIN_HEIGHT: u32 = 1;
pub const MAX_HEIGHT: u32 = 16384;

/// Pixel geometry (`struct v4l2_pix_format`, the fields the sensor uses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixFormat {
    pub width: u32,
    pub height: u32,
    pub pixelformat: PixelFormat,
}

impl fmt::Display for PixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixelformat)
    }
}

/// Probe-time configuration of a sensor instance
#[derive(Debug, Clone)]
pub struct SensorConfig {
    /// initial frame width
    width: u32,

    /// initial frame height
    height: u32,

    /// initial frame rate, 0 selects the default
    fps: u32,

    /// kernel release the driver registers against
    kernel: KernelVersion,
}

impl SensorConfig {
    pub fn with_resolution(self, width: u32, height: u32) -> SensorConfig {
        SensorConfig {
            width,
            height,
            ..self
        }
    }

    pub fn with_fps(self, fps: u32) -> SensorConfig {
        SensorConfig { fps, ..self }
    }

    pub fn with_kernel(self, kernel: KernelVersion) -> SensorConfig {
        SensorConfig { kernel, ..self }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Initial frame interval
    pub fn timeperframe(&self) -> Fract {
        Fract::per_second(self.fps).normalized()
    }

    pub fn kernel(&self) -> KernelVersion {
        self.kernel
    }
}

impl Default for SensorConfig {
    fn default() -> SensorConfig {
        SensorConfig {
            width: 1920,
            height: 1080,
            fps: DEFAULT_FPS,
            kernel: KernelVersion::default(),
        }
    }
}

/// Per-device sensor state
///
/// Created by the platform driver at probe time and stored as the platform
/// device's driver data. The sub-device is embedded by value; operations
/// reach the sensor state through `self`, the device name for log messages
/// through the sub-device.
#[derive(Debug, Clone)]
pub struct SensorMipi {
    subdev: Subdev,
    pix: PixFormat,
    fmt: &'static DataFormat,
    streamcap: CaptureParm,
}

impl SensorMipi {
    /// Sensor state for device `dev_name` with the probe defaults from `config`
    pub fn new(dev_name: &str, config: &SensorConfig) -> Self {
        SensorMipi {
            subdev: Subdev::init(MODULE_NAME, dev_name),
            pix: PixFormat {
                width: config.width(),
                height: config.height(),
                pixelformat: PixelFormat::SBGGR8,
            },
            fmt: default_datafmt(),
            streamcap: CaptureParm {
                capability: 0,
                capturemode: 0,
                timeperframe: config.timeperframe(),
                ..CaptureParm::default()
            },
        }
    }

    pub(crate) fn subdev_mut(&mut self) -> &mut Subdev {
        &mut self.subdev
    }

    /// Active media bus format
    pub fn datafmt(&self) -> &'static DataFormat {
        self.fmt
    }

    pub fn pix(&self) -> &PixFormat {
        &self.pix
    }

    pub fn streamcap(&self) -> &CaptureParm {
        &self.streamcap
    }

    fn dev(&self) -> &str {
        self.subdev.dev_name()
    }
}

impl CoreOps for SensorMipi {
    fn s_power(&mut self, on: bool) -> Result<(), Error> {
        log::debug!("{}: s_power: {}", self.dev(), on as i32);
        Ok(())
    }
}

impl VideoOps for SensorMipi {
    fn g_parm(&self, parm: &mut StreamParm) -> Result<(), Error> {
        match parm.buf_type {
            BufType::VideoCapture => {
                *parm = StreamParm::new(BufType::VideoCapture);
                parm.capture.capability = self.streamcap.capability;
                parm.capture.timeperframe = self.streamcap.timeperframe;
                parm.capture.capturemode = self.streamcap.capturemode;
                Ok(())
            }
            BufType::Unknown(raw) => {
                log::warn!("{}: Type is unknown - {}", self.dev(), raw);
                Err(Error::InvalidArgument)
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    fn s_parm(&mut self, parm: &mut StreamParm) -> Result<(), Error> {
        match parm.buf_type {
            BufType::VideoCapture => {
                let timeperframe = &mut parm.capture.timeperframe;
                *timeperframe = timeperframe.normalized();

                // Only one mode and rate exist, the target rate is informational.
                if let Some(tgt_fps) = timeperframe.fps() {
                    log::debug!("{}: s_parm: {} fps ({})", self.dev(), tgt_fps, timeperframe);
                }

                self.streamcap.timeperframe = *timeperframe;
                self.streamcap.capturemode = parm.capture.capturemode;
                Ok(())
            }
            BufType::Unknown(raw) => {
                log::warn!("{}: Type is unknown - {}", self.dev(), raw);
                Err(Error::InvalidArgument)
            }
            other => {
                log::warn!(
                    "{}: Type is not V4L2_BUF_TYPE_VIDEO_CAPTURE but {}",
                    self.dev(),
                    other.as_raw()
                );
                Err(Error::InvalidArgument)
            }
        }
    }

    fn s_stream(&mut self, enable: bool) -> Result<(), Error> {
        log::debug!("{}: s_stream: {}", self.dev(), enable as i32);
        Ok(())
    }
}

impl PadOps for SensorMipi {
    fn enum_mbus_code(&self, code: &mut MbusCodeEnum) -> Result<(), Error> {
        if code.pad != 0 {
            return Err(Error::InvalidArgument);
        }

        let fmt = SENSOR_FORMATS
            .get(code.index as usize)
            .ok_or(Error::InvalidArgument)?;
        code.code = fmt.code;
        Ok(())
    }

    fn enum_frame_size(&self, fse: &mut FrameSizeEnum) -> Result<(), Error> {
        if fse.index != 0 {
            return Err(Error::InvalidArgument);
        }

        fse.min_width = MIN_WIDTH;
        fse.max_width = MAX_WIDTH;
        fse.min_height = MIN_HEIGHT;
        fse.max_height = MAX_HEIGHT;
        Ok(())
    }

    fn enum_frame_interval(&self, fie: &mut FrameIntervalEnum) -> Result<(), Error> {
        if fie.index != 0 {
            return Err(Error::InvalidArgument);
        }

        if fie.width == 0 || fie.height == 0 || fie.code.as_raw() == 0 {
            log::warn!("{}: Please assign pixel format, width and height", self.dev());
            return Err(Error::InvalidArgument);
        }

        fie.interval = DEFAULT_FRAME_INTERVAL;
        Ok(())
    }

    fn get_fmt(&self, format: &mut SubdevFormat) -> Result<(), Error> {
        if format.pad != 0 {
            return Err(Error::InvalidArgument);
        }

        let mf = &mut format.format;
        mf.code = self.fmt.code;
        mf.colorspace = self.fmt.colorspace;
        mf.field = Field::None;
        mf.width = self.pix.width;
        mf.height = self.pix.height;
        Ok(())
    }

    fn set_fmt(&mut self, format: &mut SubdevFormat) -> Result<(), Error> {
        let mf = &mut format.format;
        let fmt = match find_datafmt(mf.code) {
            Some(fmt) => fmt,
            None => {
                let fmt = default_datafmt();
                log::debug!(
                    "{}: set_fmt: {} not supported, using {}",
                    self.subdev.dev_name(),
                    mf.code,
                    fmt.code
                );
                mf.code = fmt.code;
                mf.colorspace = fmt.colorspace;
                fmt
            }
        };

        mf.field = Field::None;

        if format.which == FormatWhence::Try {
            return Ok(());
        }

        self.fmt = fmt;
        self.streamcap.capturemode = 0;
        self.pix.width = mf.width;
        self.pix.height = mf.height;
        Ok(())
    }
}

impl SubdevOps for SensorMipi {
    fn subdev(&self) -> &Subdev {
        &self.subdev
    }
}
