// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Platform driver binding
//!
//! The sensor is described in the device tree as a platform device with the
//! `imago,sensor_mipi` compatible string. [`PlatformDriver::probe`] creates
//! the sensor state, stores it as the device's driver data and registers the
//! sub-device; [`PlatformDriver::remove`] unregisters it again.
//!
//! ```text
//!            bind/probe                       remove
//! unbound ───────────────▶ registered ───────────────▶ unbound
//!    ▲
//!    └──── registration failed (driver data released)
//! ```

use crate::sensor::{SensorConfig, SensorMipi};
use crate::v4l2::{Lifecycle, SubdevOps, SubdevRegistry};
use crate::{Error, MODULE_NAME};

/// Device tree match entry (`struct of_device_id`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfDeviceId {
    pub compatible: &'static str,
}

/// Device tree compatible strings handled by the driver
pub const OF_MATCH_TABLE: &[OfDeviceId] = &[OfDeviceId {
    compatible: "imago,sensor_mipi",
}];

/// Platform device (`struct platform_device`) with its driver data slot
#[derive(Debug, Default)]
pub struct PlatformDevice {
    name: String,
    compatible: Vec<String>,
    drvdata: Option<SensorMipi>,
}

impl PlatformDevice {
    pub fn new(name: &str) -> Self {
        PlatformDevice {
            name: name.to_owned(),
            compatible: Vec::new(),
            drvdata: None,
        }
    }

    /// Add a compatible string from the device tree node
    pub fn with_compatible(mut self, compatible: &str) -> Self {
        self.compatible.push(compatible.to_owned());
        self
    }

    /// Device name, as returned by `dev_name()`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compatible(&self) -> &[String] {
        &self.compatible
    }

    pub fn drvdata(&self) -> Option<&SensorMipi> {
        self.drvdata.as_ref()
    }

    pub fn drvdata_mut(&mut self) -> Option<&mut SensorMipi> {
        self.drvdata.as_mut()
    }

    /// True while a driver is bound to the device
    pub fn is_bound(&self) -> bool {
        self.drvdata.is_some()
    }
}

/// The `vsmipi` platform driver
#[derive(Debug, Clone, Default)]
pub struct PlatformDriver {
    config: SensorConfig,
}

impl PlatformDriver {
    pub fn new(config: SensorConfig) -> Self {
        PlatformDriver { config }
    }

    /// Driver name
    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Match table entry for `pdev`, if any of its compatible strings is
    /// handled by this driver
    pub fn of_match(&self, pdev: &PlatformDevice) -> Option<&'static OfDeviceId> {
        OF_MATCH_TABLE
            .iter()
            .find(|id| pdev.compatible.iter().any(|c| c == id.compatible))
    }

    pub fn matches(&self, pdev: &PlatformDevice) -> bool {
        self.of_match(pdev).is_some()
    }

    /// Bus-side bind: check the match table and the device's binding state,
    /// then probe.
    pub fn bind<R: SubdevRegistry>(
        &self,
        pdev: &mut PlatformDevice,
        registry: &mut R,
    ) -> Result<(), Error> {
        if !self.matches(pdev) {
            log::debug!("{}: no match for {:?}", pdev.name(), pdev.compatible());
            return Err(Error::NoDevice);
        }

        if pdev.is_bound() {
            return Err(Error::Busy);
        }

        self.probe(pdev, registry)
    }

    /// Create the sensor state for `pdev` and register its sub-device
    pub fn probe<R: SubdevRegistry>(
        &self,
        pdev: &mut PlatformDevice,
        registry: &mut R,
    ) -> Result<(), Error> {
        let mode = self.config.kernel().registration_mode();
        let sensor = pdev
            .drvdata
            .insert(SensorMipi::new(&pdev.name, &self.config));

        if let Err(err) = registry.register(sensor.subdev(), mode) {
            log::error!("{}: Async register failed ({})", pdev.name, err.errno());
            pdev.drvdata = None;
            return Err(err);
        }

        sensor.subdev_mut().set_lifecycle(Lifecycle::Registered);
        log::info!("{}: v4l subdev registered", pdev.name);
        Ok(())
    }

    /// Unregister the sub-device of `pdev` and detach the sensor state from
    /// the device. The state is handed back to the caller, dropping it
    /// releases it.
    pub fn remove<R: SubdevRegistry>(
        &self,
        pdev: &mut PlatformDevice,
        registry: &mut R,
    ) -> Result<SensorMipi, Error> {
        let mut sensor = pdev.drvdata.take().ok_or(Error::NoDevice)?;

        registry.unregister(sensor.subdev());
        sensor.subdev_mut().set_lifecycle(Lifecycle::Unregistered);
        log::debug!("{}: v4l subdev unregistered", pdev.name);
        Ok(sensor)
    }
}
