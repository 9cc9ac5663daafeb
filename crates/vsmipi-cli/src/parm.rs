// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{self, Session, Target};
use clap::Args as ClapArgs;
use serde::Serialize;
use vsmipi::v4l2::{BufType, CaptureParm, StreamParm, SubdevOps};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Buffer type by name (video_capture) or number
    #[arg(short = 't', long = "type", default_value = "VIDEO_CAPTURE")]
    buf_type: String,

    /// Frame interval N/D in seconds, 0/0 selects the default
    #[arg(short, long)]
    interval: Option<String>,

    /// Capture mode
    #[arg(short = 'm', long)]
    capture_mode: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ParmReport {
    subdev: String,
    buf_type: String,
    capability: u32,
    capturemode: u32,
    timeperframe: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

pub fn execute(args: Args, target: &Target, json: bool) -> Result<(), CliError> {
    log::debug!("Executing parm command: {:?}", args);

    let buf_type = args
        .buf_type
        .parse::<BufType>()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    let interval = args
        .interval
        .as_deref()
        .map(utils::parse_interval)
        .transpose()?;

    let mut session = Session::open(target)?;

    if interval.is_some() || args.capture_mode.is_some() {
        // Fields left out on the command line keep their current value
        let current = current_capture(&mut session, buf_type)?;
        let parm = StreamParm {
            buf_type,
            capture: CaptureParm {
                timeperframe: interval.unwrap_or(current.timeperframe),
                capturemode: args.capture_mode.unwrap_or(current.capturemode),
                ..current
            },
        };
        session.s_parm(parm)?;
    }

    let parm = session.g_parm(buf_type)?;

    let report = ParmReport {
        subdev: session.sensor()?.subdev().name().to_owned(),
        buf_type: parm.buf_type.to_string(),
        capability: parm.capture.capability,
        capturemode: parm.capture.capturemode,
        timeperframe: parm.capture.timeperframe.to_string(),
        fps: parm.capture.timeperframe.fps(),
    };
    session.close()?;

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
    } else {
        println!("Sub-device: {}", report.subdev);
        println!("  Type:         {}", report.buf_type);
        println!("  Capability:   0x{:04x}", report.capability);
        println!("  Capture mode: {}", report.capturemode);
        match report.fps {
            Some(fps) => println!("  Interval:     {} s ({} fps)", report.timeperframe, fps),
            None => println!("  Interval:     {} s", report.timeperframe),
        }
    }

    Ok(())
}

/// Current capture parameters, or an empty set for buffer types the sensor
/// does not report on so the driver gets to judge the request itself
fn current_capture(session: &mut Session, buf_type: BufType) -> Result<CaptureParm, CliError> {
    match session.g_parm(buf_type) {
        Ok(parm) => Ok(parm.capture),
        Err(CliError::InvalidArgs(_)) => Ok(CaptureParm::default()),
        Err(e) => Err(e),
    }
}
