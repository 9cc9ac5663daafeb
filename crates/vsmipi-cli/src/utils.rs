// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use signal_hook::consts::SIGINT;
use signal_hook::flag;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use vsmipi::platform::{PlatformDevice, PlatformDriver};
use vsmipi::sensor::{SensorConfig, SensorMipi};
use vsmipi::format::MbusCode;
use vsmipi::v4l2::{
    dispatch, AsyncRegistry, BufType, CoreOps, FormatWhence, Fract, FrameIntervalEnum,
    FrameSizeEnum, Ioctl, KernelVersion, MbusCodeEnum, StreamParm, SubdevFormat,
};

/// Platform device selection shared by all subcommands
#[derive(Debug, Clone)]
pub struct Target {
    pub device: String,
    pub compatible: String,
    pub kernel: String,
}

impl Target {
    pub fn kernel_version(&self) -> Result<KernelVersion, CliError> {
        self.kernel
            .parse::<KernelVersion>()
            .map_err(|e| CliError::InvalidArgs(e.to_string()))
    }
}

/// A sensor bound to its platform device for the lifetime of one command
///
/// Opening a session runs the driver's bind/probe path against an
/// in-process registry, closing it runs remove.
pub struct Session {
    driver: PlatformDriver,
    registry: AsyncRegistry,
    pdev: PlatformDevice,
}

impl Session {
    pub fn open(target: &Target) -> Result<Self, CliError> {
        let kernel = target.kernel_version()?;
        let driver = PlatformDriver::new(SensorConfig::default().with_kernel(kernel));
        let mut registry = AsyncRegistry::new();
        let mut pdev = PlatformDevice::new(&target.device).with_compatible(&target.compatible);

        driver.bind(&mut pdev, &mut registry).map_err(|e| match e {
            vsmipi::Error::NoDevice => CliError::DeviceNotFound(format!(
                "{} ({}) is not handled by {}",
                target.device,
                target.compatible,
                driver.name()
            )),
            e => e.into(),
        })?;

        log::debug!(
            "{}: bound to {} on kernel {}",
            target.device,
            driver.name(),
            kernel
        );

        Ok(Session {
            driver,
            registry,
            pdev,
        })
    }

    pub fn sensor(&self) -> Result<&SensorMipi, CliError> {
        self.pdev
            .drvdata()
            .ok_or_else(|| CliError::DeviceNotFound(format!("{} is not bound", self.pdev.name())))
    }

    pub fn sensor_mut(&mut self) -> Result<&mut SensorMipi, CliError> {
        let name = self.pdev.name().to_owned();
        self.pdev
            .drvdata_mut()
            .ok_or_else(|| CliError::DeviceNotFound(format!("{} is not bound", name)))
    }

    /// Issue an ioctl on the sensor sub-device
    pub fn ioctl(&mut self, ioctl: Ioctl) -> Result<Ioctl, CliError> {
        self.call(ioctl).map_err(CliError::from)
    }

    fn call(&mut self, ioctl: Ioctl) -> Result<Ioctl, vsmipi::Error> {
        let request = ioctl.request();
        log::trace!("{}", request);
        let sensor = self
            .pdev
            .drvdata_mut()
            .ok_or(vsmipi::Error::NoDevice)?;
        dispatch(sensor, ioctl).map_err(|e| {
            log::debug!("{} failed: {}", request.name(), e);
            e
        })
    }

    /// Enumeration step: `Ok(None)` once the driver runs out of entries
    fn enumerate(&mut self, ioctl: Ioctl) -> Result<Option<Ioctl>, CliError> {
        match self.call(ioctl) {
            Ok(reply) => Ok(Some(reply)),
            Err(vsmipi::Error::InvalidArgument) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_format(&mut self, which: FormatWhence) -> Result<SubdevFormat, CliError> {
        match self.ioctl(Ioctl::GetFormat(SubdevFormat::new(which, 0)))? {
            Ioctl::GetFormat(fmt) => Ok(fmt),
            other => Err(unexpected_reply(other)),
        }
    }

    pub fn set_format(&mut self, fmt: SubdevFormat) -> Result<SubdevFormat, CliError> {
        match self.ioctl(Ioctl::SetFormat(fmt))? {
            Ioctl::SetFormat(fmt) => Ok(fmt),
            other => Err(unexpected_reply(other)),
        }
    }

    pub fn enum_mbus_code(&mut self, index: u32) -> Result<Option<MbusCodeEnum>, CliError> {
        match self.enumerate(Ioctl::EnumMbusCode(MbusCodeEnum::new(0, index)))? {
            Some(Ioctl::EnumMbusCode(code)) => Ok(Some(code)),
            Some(other) => Err(unexpected_reply(other)),
            None => Ok(None),
        }
    }

    pub fn enum_frame_size(
        &mut self,
        index: u32,
        code: MbusCode,
    ) -> Result<Option<FrameSizeEnum>, CliError> {
        match self.enumerate(Ioctl::EnumFrameSize(FrameSizeEnum::new(index, code)))? {
            Some(Ioctl::EnumFrameSize(fse)) => Ok(Some(fse)),
            Some(other) => Err(unexpected_reply(other)),
            None => Ok(None),
        }
    }

    pub fn enum_frame_interval(
        &mut self,
        index: u32,
        code: MbusCode,
        width: u32,
        height: u32,
    ) -> Result<Option<FrameIntervalEnum>, CliError> {
        let fie = FrameIntervalEnum::new(index, code, width, height);
        match self.enumerate(Ioctl::EnumFrameInterval(fie))? {
            Some(Ioctl::EnumFrameInterval(fie)) => Ok(Some(fie)),
            Some(other) => Err(unexpected_reply(other)),
            None => Ok(None),
        }
    }

    pub fn g_parm(&mut self, buf_type: BufType) -> Result<StreamParm, CliError> {
        match self.ioctl(Ioctl::GetParm(StreamParm::new(buf_type)))? {
            Ioctl::GetParm(parm) => Ok(parm),
            other => Err(unexpected_reply(other)),
        }
    }

    pub fn s_parm(&mut self, parm: StreamParm) -> Result<StreamParm, CliError> {
        match self.ioctl(Ioctl::SetParm(parm))? {
            Ioctl::SetParm(parm) => Ok(parm),
            other => Err(unexpected_reply(other)),
        }
    }

    /// Sensor power, driven by the bridge rather than an ioctl
    pub fn s_power(&mut self, on: bool) -> Result<(), CliError> {
        self.sensor_mut()?.s_power(on)?;
        Ok(())
    }

    pub fn s_stream(&mut self, enable: bool) -> Result<(), CliError> {
        self.ioctl(if enable {
            Ioctl::StreamOn
        } else {
            Ioctl::StreamOff
        })?;
        Ok(())
    }

    pub fn registry(&self) -> &AsyncRegistry {
        &self.registry
    }

    /// Unbind the driver from the device
    pub fn close(mut self) -> Result<(), CliError> {
        self.driver.remove(&mut self.pdev, &mut self.registry)?;
        Ok(())
    }
}

fn unexpected_reply(reply: Ioctl) -> CliError {
    CliError::General(format!("unexpected reply to {}", reply.request().name()))
}

/// Parse resolution string in format "WxH" or "W*H"
pub fn parse_resolution(s: &str) -> Result<(u32, u32), CliError> {
    let (width_str, height_str) = s
        .split_once('x')
        .or_else(|| s.split_once('*'))
        .ok_or_else(|| {
            CliError::InvalidArgs(format!(
                "Invalid resolution format (expected WxH or W*H): {}",
                s
            ))
        })?;

    let width = width_str
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid width in resolution: {}", s)))?;
    let height = height_str
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid height in resolution: {}", s)))?;

    if width == 0 || height == 0 {
        return Err(CliError::InvalidArgs(format!(
            "Resolution dimensions must be positive: {}",
            s
        )));
    }

    Ok((width, height))
}

/// Parse a frame interval "N/D" in seconds, such as "1/30"
///
/// Zero terms are accepted and left for the driver to normalize.
pub fn parse_interval(s: &str) -> Result<Fract, CliError> {
    let (num, den) = s.split_once('/').ok_or_else(|| {
        CliError::InvalidArgs(format!("Invalid interval format (expected N/D): {}", s))
    })?;

    let numerator = num
        .trim()
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid interval numerator: {}", s)))?;
    let denominator = den
        .trim()
        .parse::<u32>()
        .map_err(|_| CliError::InvalidArgs(format!("Invalid interval denominator: {}", s)))?;

    Ok(Fract::new(numerator, denominator))
}

/// Install signal handler for graceful shutdown on Ctrl+C
///
/// Returns an `Arc<AtomicBool>` that will be set to `true` when SIGINT is received.
pub fn install_signal_handler() -> Result<Arc<AtomicBool>, CliError> {
    let term = Arc::new(AtomicBool::new(false));

    flag::register(SIGINT, Arc::clone(&term))
        .map_err(|e| CliError::General(format!("Failed to register signal handler: {}", e)))?;

    log::debug!("Installed SIGINT handler");
    Ok(term)
}
