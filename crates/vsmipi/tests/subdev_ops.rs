// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// Sub-device Operation Tests
//
// Exercises the core, video and pad operations of a probed sensor through
// the same ioctl routing user space goes through. Tests that check emitted
// warnings share a process-wide logger and run serially.
//
// RUN:
//   cargo test --test subdev_ops

mod common;

use log::Level;
use rand::Rng;
use serial_test::serial;
use vsmipi::format::{Colorspace, Field, MbusCode, SENSOR_FORMATS};
use vsmipi::platform::{PlatformDevice, PlatformDriver};
use vsmipi::v4l2::{
    dispatch, AsyncRegistry, BufType, FormatWhence, Fract, FrameIntervalEnum, FrameSizeEnum,
    Ioctl, MbusCodeEnum, StreamParm, SubdevFormat,
};
use vsmipi::Error;

// =============================================================================
// Helpers
// =============================================================================

fn probed() -> PlatformDevice {
    let mut registry = AsyncRegistry::new();
    let mut pdev = PlatformDevice::new("csi0").with_compatible("imago,sensor_mipi");
    PlatformDriver::default()
        .bind(&mut pdev, &mut registry)
        .expect("probe failed");
    pdev
}

fn ioctl(pdev: &mut PlatformDevice, request: Ioctl) -> Result<Ioctl, Error> {
    dispatch(pdev.drvdata_mut().expect("device not bound"), request)
}

fn set_fmt(pdev: &mut PlatformDevice, fmt: SubdevFormat) -> SubdevFormat {
    match ioctl(pdev, Ioctl::SetFormat(fmt)).expect("set_fmt failed") {
        Ioctl::SetFormat(fmt) => fmt,
        other => panic!("unexpected response {:?}", other),
    }
}

fn get_fmt(pdev: &mut PlatformDevice, pad: u32) -> Result<SubdevFormat, Error> {
    match ioctl(pdev, Ioctl::GetFormat(SubdevFormat::new(FormatWhence::Active, pad)))? {
        Ioctl::GetFormat(fmt) => Ok(fmt),
        other => panic!("unexpected response {:?}", other),
    }
}

fn get_parm(pdev: &mut PlatformDevice, buf_type: BufType) -> Result<StreamParm, Error> {
    match ioctl(pdev, Ioctl::GetParm(StreamParm::new(buf_type)))? {
        Ioctl::GetParm(parm) => Ok(parm),
        other => panic!("unexpected response {:?}", other),
    }
}

// =============================================================================
// Format negotiation
// =============================================================================

#[test]
fn test_set_then_get_each_supported_format() {
    let mut pdev = probed();

    for fmt in SENSOR_FORMATS.iter() {
        let request = SubdevFormat::request(FormatWhence::Active, fmt.code, 1280, 720);
        let applied = set_fmt(&mut pdev, request);
        assert_eq!(applied.format.code, fmt.code);
        assert_eq!(applied.format.field, Field::None);

        let active = get_fmt(&mut pdev, 0).unwrap();
        assert_eq!(active.format.code, fmt.code);
        assert_eq!(active.format.colorspace, fmt.colorspace);
        assert_eq!(active.format.field, Field::None);
        assert_eq!((active.format.width, active.format.height), (1280, 720));
    }
}

#[test]
fn test_set_unknown_code_falls_back_to_first_entry() {
    let mut pdev = probed();
    let mut rng = rand::rng();

    // Move away from the default first so the fallback is observable
    set_fmt(
        &mut pdev,
        SubdevFormat::request(FormatWhence::Active, MbusCode::SBGGR10_1X10, 640, 480),
    );

    for _ in 0..64 {
        let raw: u32 = rng.random();
        let code = MbusCode(raw);
        if SENSOR_FORMATS.iter().any(|f| f.code == code) {
            continue;
        }

        let applied = set_fmt(
            &mut pdev,
            SubdevFormat::request(FormatWhence::Active, code, 640, 480),
        );
        assert_eq!(applied.format.code, SENSOR_FORMATS[0].code);
        assert_eq!(applied.format.colorspace, SENSOR_FORMATS[0].colorspace);

        let active = get_fmt(&mut pdev, 0).unwrap();
        assert_eq!(active.format.code, MbusCode::SBGGR8_1X8);
        assert_eq!(active.format.colorspace, Colorspace::Raw);
    }
}

#[test]
fn test_try_format_does_not_commit() {
    let mut pdev = probed();

    let applied = set_fmt(
        &mut pdev,
        SubdevFormat::request(FormatWhence::Try, MbusCode::SBGGR10_ALAW8_1X8, 320, 240),
    );
    assert_eq!(applied.format.code, MbusCode::SBGGR10_ALAW8_1X8);
    assert_eq!(applied.format.field, Field::None);

    let active = get_fmt(&mut pdev, 0).unwrap();
    assert_eq!(active.format.code, MbusCode::SBGGR8_1X8);
    assert_eq!((active.format.width, active.format.height), (1920, 1080));
}

#[test]
fn test_get_fmt_rejects_nonzero_pad() {
    let mut pdev = probed();
    assert_eq!(get_fmt(&mut pdev, 1).unwrap_err(), Error::InvalidArgument);
    assert_eq!(get_fmt(&mut pdev, 7).unwrap_err().errno(), -22);
}

// =============================================================================
// Enumeration
// =============================================================================

#[test]
fn test_enum_mbus_codes_in_table_order() {
    let mut pdev = probed();

    let codes: Vec<MbusCode> = (0..3)
        .map(|index| match ioctl(&mut pdev, Ioctl::EnumMbusCode(MbusCodeEnum::new(0, index))) {
            Ok(Ioctl::EnumMbusCode(code)) => code.code,
            other => panic!("index {}: {:?}", index, other),
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            MbusCode::SBGGR8_1X8,
            MbusCode::SBGGR10_1X10,
            MbusCode::SBGGR10_ALAW8_1X8
        ]
    );

    assert_eq!(
        ioctl(&mut pdev, Ioctl::EnumMbusCode(MbusCodeEnum::new(0, 3))),
        Err(Error::InvalidArgument)
    );
    assert_eq!(
        ioctl(&mut pdev, Ioctl::EnumMbusCode(MbusCodeEnum::new(1, 0))),
        Err(Error::InvalidArgument)
    );
}

#[test]
fn test_enum_frame_size() {
    let mut pdev = probed();

    match ioctl(
        &mut pdev,
        Ioctl::EnumFrameSize(FrameSizeEnum::new(0, MbusCode::SBGGR8_1X8)),
    ) {
        Ok(Ioctl::EnumFrameSize(fse)) => {
            assert_eq!(
                (fse.min_width, fse.max_width, fse.min_height, fse.max_height),
                (128, 16384, 1, 16384)
            );
        }
        other => panic!("unexpected response {:?}", other),
    }

    for index in [1, 2, 100] {
        assert_eq!(
            ioctl(
                &mut pdev,
                Ioctl::EnumFrameSize(FrameSizeEnum::new(index, MbusCode::SBGGR8_1X8))
            ),
            Err(Error::InvalidArgument)
        );
    }
}

#[test]
fn test_enum_frame_interval_ignores_requested_size() {
    let mut pdev = probed();

    for (code, width, height) in [
        (MbusCode::SBGGR8_1X8, 1920, 1080),
        (MbusCode::SBGGR10_1X10, 128, 1),
        (MbusCode(0x1234), 99999, 3),
    ] {
        match ioctl(
            &mut pdev,
            Ioctl::EnumFrameInterval(FrameIntervalEnum::new(0, code, width, height)),
        ) {
            Ok(Ioctl::EnumFrameInterval(fie)) => assert_eq!(fie.interval, Fract::new(1, 30)),
            other => panic!("unexpected response {:?}", other),
        }
    }

    assert_eq!(
        ioctl(
            &mut pdev,
            Ioctl::EnumFrameInterval(FrameIntervalEnum::new(1, MbusCode::SBGGR8_1X8, 640, 480))
        ),
        Err(Error::InvalidArgument)
    );
}

#[test]
#[serial]
fn test_enum_frame_interval_requires_format() {
    let logger = common::capture();
    let mut pdev = probed();

    for (code, width, height) in [
        (MbusCode::SBGGR8_1X8, 0, 480),
        (MbusCode::SBGGR8_1X8, 640, 0),
        (MbusCode(0), 640, 480),
    ] {
        assert_eq!(
            ioctl(
                &mut pdev,
                Ioctl::EnumFrameInterval(FrameIntervalEnum::new(0, code, width, height))
            ),
            Err(Error::InvalidArgument)
        );
    }

    let warnings = common::messages(logger, Level::Warn);
    assert_eq!(warnings.len(), 3);
    assert!(warnings
        .iter()
        .all(|w| w == "csi0: Please assign pixel format, width and height"));
}

// =============================================================================
// Stream parameters
// =============================================================================

#[test]
fn test_s_parm_zero_interval_normalized() {
    let mut pdev = probed();

    match ioctl(&mut pdev, Ioctl::SetParm(StreamParm::capture(Fract::new(0, 0), 2))) {
        Ok(Ioctl::SetParm(parm)) => assert_eq!(parm.capture.timeperframe, Fract::new(1, 30)),
        other => panic!("unexpected response {:?}", other),
    }

    let parm = get_parm(&mut pdev, BufType::VideoCapture).unwrap();
    assert_eq!(parm.capture.timeperframe, Fract::new(1, 30));
    assert_eq!(parm.capture.capturemode, 2);
    assert_eq!(parm.capture.capability, 0);
}

#[test]
fn test_s_parm_stores_interval() {
    let mut pdev = probed();

    ioctl(&mut pdev, Ioctl::SetParm(StreamParm::capture(Fract::new(1001, 60000), 1))).unwrap();

    let parm = get_parm(&mut pdev, BufType::VideoCapture).unwrap();
    assert_eq!(parm.capture.timeperframe, Fract::new(1001, 60000));
    assert_eq!(parm.capture.capturemode, 1);
}

#[test]
#[serial]
fn test_non_capture_buffer_types_rejected() {
    let logger = common::capture();
    let mut pdev = probed();

    for raw in 2..=7 {
        let buf_type = BufType::from_raw(raw);
        assert_eq!(get_parm(&mut pdev, buf_type).unwrap_err(), Error::InvalidArgument);

        let mut parm = StreamParm::capture(Fract::new(1, 15), 0);
        parm.buf_type = buf_type;
        assert_eq!(
            ioctl(&mut pdev, Ioctl::SetParm(parm)).unwrap_err().errno(),
            -22
        );
    }

    // Known non-capture types warn on set only
    let warnings = common::messages(logger, Level::Warn);
    assert_eq!(warnings.len(), 6);
    assert_eq!(
        warnings[0],
        "csi0: Type is not V4L2_BUF_TYPE_VIDEO_CAPTURE but 2"
    );

    // Rejected requests leave the stored interval alone
    let parm = get_parm(&mut pdev, BufType::VideoCapture).unwrap();
    assert_eq!(parm.capture.timeperframe, Fract::new(1, 30));
}

#[test]
#[serial]
fn test_unknown_buffer_type_warns() {
    let logger = common::capture();
    let mut pdev = probed();

    assert_eq!(
        get_parm(&mut pdev, BufType::Unknown(13)).unwrap_err(),
        Error::InvalidArgument
    );

    let mut parm = StreamParm::capture(Fract::new(1, 15), 0);
    parm.buf_type = BufType::Unknown(13);
    assert_eq!(ioctl(&mut pdev, Ioctl::SetParm(parm)), Err(Error::InvalidArgument));

    assert_eq!(
        common::messages(logger, Level::Warn),
        vec![
            "csi0: Type is unknown - 13".to_string(),
            "csi0: Type is unknown - 13".to_string()
        ]
    );
}

// =============================================================================
// Stream on/off
// =============================================================================

#[test]
fn test_stream_on_off_are_accepted() {
    let mut pdev = probed();
    assert_eq!(ioctl(&mut pdev, Ioctl::StreamOn), Ok(Ioctl::StreamOn));
    assert_eq!(ioctl(&mut pdev, Ioctl::StreamOff), Ok(Ioctl::StreamOff));
}
