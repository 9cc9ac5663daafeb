// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{self, Session, Target};
use clap::Args as ClapArgs;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use vsmipi::format::MbusCode;
use vsmipi::v4l2::{BufType, FormatWhence, StreamParm, SubdevFormat, SubdevOps};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Resolution in WxH format, negotiated before streaming
    #[arg(short, long)]
    resolution: Option<String>,

    /// Media bus code, negotiated together with the resolution
    #[arg(short, long, default_value = "SBGGR8_1X8")]
    code: String,

    /// Frame interval N/D in seconds
    #[arg(short, long)]
    interval: Option<String>,

    /// Number of frames to stream (0=unlimited)
    #[arg(short, long, default_value = "0")]
    frames: u64,
}

#[derive(Debug, Serialize)]
struct StreamSummary {
    subdev: String,
    width: u32,
    height: u32,
    code: String,
    interval: String,
    frames: u64,
    elapsed_ms: u128,
    interrupted: bool,
}

pub fn execute(args: Args, target: &Target, json: bool) -> Result<(), CliError> {
    log::debug!("Stream parameters: {:?}", args);

    // Install signal handler for graceful shutdown
    let term = utils::install_signal_handler()?;

    let mut session = Session::open(target)?;

    if let Some(ref resolution) = args.resolution {
        let (width, height) = utils::parse_resolution(resolution)?;
        let code = args
            .code
            .parse::<MbusCode>()
            .map_err(|e| CliError::InvalidArgs(e.to_string()))?;
        session.set_format(SubdevFormat::request(
            FormatWhence::Active,
            code,
            width,
            height,
        ))?;
    }

    if let Some(ref interval) = args.interval {
        let timeperframe = utils::parse_interval(interval)?;
        let capturemode = session.g_parm(BufType::VideoCapture)?.capture.capturemode;
        session.s_parm(StreamParm::capture(timeperframe, capturemode))?;
    }

    let fmt = session.get_format(FormatWhence::Active)?.format;
    let timeperframe = session.g_parm(BufType::VideoCapture)?.capture.timeperframe;
    let subdev = session.sensor()?.subdev().name().to_owned();

    // Frame period, the interval is never degenerate once read back
    let period = Duration::from_secs(u64::from(timeperframe.numerator))
        / timeperframe.denominator.max(1);

    log::info!(
        "{}: {}x{} {} at {} s per frame",
        subdev,
        fmt.width,
        fmt.height,
        fmt.code,
        timeperframe
    );

    session.s_power(true)?;
    session.s_stream(true)?;

    let max_frames = if args.frames == 0 {
        u64::MAX
    } else {
        args.frames
    };

    // Main streaming loop
    log::info!(
        "Streaming {} frames (Ctrl+C to stop)...",
        if max_frames == u64::MAX {
            "unlimited".to_string()
        } else {
            max_frames.to_string()
        }
    );

    let start = Instant::now();
    let mut deadline = start;
    let mut frame_count = 0u64;

    while frame_count < max_frames && !term.load(Ordering::Relaxed) {
        deadline += period;
        if !wait_until(deadline, &term) {
            break;
        }

        frame_count += 1;
        log::trace!("frame {}", frame_count);

        // Log progress periodically
        if frame_count % 30 == 0 {
            log::debug!("Streamed {} frames", frame_count);
        }
    }

    let interrupted = term.load(Ordering::Relaxed);
    if interrupted {
        log::info!("Received Ctrl+C, stopping...");
    }

    session.s_stream(false)?;
    session.s_power(false)?;
    session.close()?;

    let summary = StreamSummary {
        subdev,
        width: fmt.width,
        height: fmt.height,
        code: fmt.code.to_string(),
        interval: timeperframe.to_string(),
        frames: frame_count,
        elapsed_ms: start.elapsed().as_millis(),
        interrupted,
    };

    log::info!("Streamed {} frames total", frame_count);

    if json {
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
    } else {
        println!(
            "{}: {} frames in {} ms ({}x{} {}, {} s per frame)",
            summary.subdev,
            summary.frames,
            summary.elapsed_ms,
            summary.width,
            summary.height,
            summary.code,
            summary.interval
        );
    }

    Ok(())
}

/// Longest uninterrupted sleep while waiting for the next frame
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Sleep until `deadline` in slices of at most [`POLL_SLICE`], returning
/// false as soon as `term` is raised
fn wait_until(deadline: Instant, term: &AtomicBool) -> bool {
    loop {
        if term.load(Ordering::Relaxed) {
            return false;
        }

        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(POLL_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_until_deadline() {
        let term = AtomicBool::new(false);
        let start = Instant::now();
        assert!(wait_until(start + Duration::from_millis(30), &term));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_until_interrupted() {
        let term = AtomicBool::new(true);
        let start = Instant::now();
        assert!(!wait_until(start + Duration::from_secs(5), &term));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
