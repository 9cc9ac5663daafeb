// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! V4L2 Sub-device Framework Model
//!
//! This module models the parts of the kernel media framework a sensor
//! driver talks to: the sub-device object and its operation tables, the
//! async registration API and the routing of user-space ioctls onto
//! sub-device operations.
//!
//! # Overview
//!
//! | Item | Kernel counterpart |
//! |------|--------------------|
//! | [`Subdev`] | `struct v4l2_subdev` |
//! | [`CoreOps`], [`VideoOps`], [`PadOps`] | `struct v4l2_subdev_{core,video,pad}_ops` |
//! | [`SubdevRegistry`] | `v4l2_async_register_subdev{,_sensor}` / `v4l2_async_unregister_subdev` |
//! | [`dispatch`] | `subdev_do_ioctl()` |
//!
//! Operations receive their argument structures by mutable reference and
//! fill them in place, as the ioctl handlers do. The framework serializes
//! calls into a sub-device; here that guarantee comes from the `&mut`
//! access every mutating operation requires.
//!
//! # Example
//!
//! ```
//! use vsmipi::platform::{PlatformDevice, PlatformDriver};
//! use vsmipi::v4l2::{dispatch, AsyncRegistry, Ioctl, MbusCodeEnum};
//!
//! let mut registry = AsyncRegistry::new();
//! let mut pdev = PlatformDevice::new("csi0").with_compatible("imago,sensor_mipi");
//! PlatformDriver::default().bind(&mut pdev, &mut registry)?;
//!
//! let sensor = pdev.drvdata_mut().unwrap();
//! let mut index = 0;
//! while let Ok(Ioctl::EnumMbusCode(code)) =
//!     dispatch(sensor, Ioctl::EnumMbusCode(MbusCodeEnum::new(0, index)))
//! {
//!     println!("{}", code.code);
//!     index += 1;
//! }
//! assert_eq!(index, 3);
//! # Ok::<(), vsmipi::Error>(())
//! ```

mod ioctl;
mod registry;
mod subdev;
mod types;

pub use ioctl::{dispatch, Ioctl, SubdevIoctl};
pub use registry::{
    AsyncRegistry, KernelVersion, RegisteredSubdev, RegistrationMode, SubdevRegistry,
};
pub use subdev::{CoreOps, Lifecycle, PadOps, Subdev, SubdevOps, VideoOps, SUBDEV_NAME_SIZE};
pub use types::{
    BufType, CaptureParm, FormatWhence, Fract, FrameIntervalEnum, FrameSizeEnum, MbusCodeEnum,
    MbusFrameFmt, StreamParm, SubdevFormat, DEFAULT_FPS, DEFAULT_FRAME_INTERVAL,
};
