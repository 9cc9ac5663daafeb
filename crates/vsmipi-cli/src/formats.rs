// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{self, Session, Target};
use clap::Args as ClapArgs;
use serde::Serialize;
use vsmipi::format::find_datafmt;
use vsmipi::v4l2::{FormatWhence, SubdevOps};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Resolution (WxH) to enumerate frame intervals for, defaults to the
    /// active format
    #[arg(short, long)]
    resolution: Option<String>,
}

#[derive(Debug, Serialize)]
struct FormatList {
    subdev: String,
    formats: Vec<FormatEntry>,
}

#[derive(Debug, Serialize)]
struct FormatEntry {
    index: u32,
    code: u32,
    name: String,
    colorspace: &'static str,
    frame_sizes: Vec<FrameSizeRange>,
    intervals: Vec<IntervalEntry>,
}

#[derive(Debug, Serialize)]
struct FrameSizeRange {
    min_width: u32,
    max_width: u32,
    min_height: u32,
    max_height: u32,
}

#[derive(Debug, Serialize)]
struct IntervalEntry {
    width: u32,
    height: u32,
    interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<u32>,
}

pub fn execute(args: Args, target: &Target, json: bool) -> Result<(), CliError> {
    log::debug!("Executing formats command: {:?}", args);

    let mut session = Session::open(target)?;

    let (width, height) = match args.resolution {
        Some(ref resolution) => utils::parse_resolution(resolution)?,
        None => {
            let active = session.get_format(FormatWhence::Active)?.format;
            (active.width, active.height)
        }
    };

    let mut formats = Vec::new();
    let mut index = 0;
    while let Some(mce) = session.enum_mbus_code(index)? {
        let code = mce.code;

        let mut frame_sizes = Vec::new();
        let mut fse_index = 0;
        while let Some(fse) = session.enum_frame_size(fse_index, code)? {
            frame_sizes.push(FrameSizeRange {
                min_width: fse.min_width,
                max_width: fse.max_width,
                min_height: fse.min_height,
                max_height: fse.max_height,
            });
            fse_index += 1;
        }

        let mut intervals = Vec::new();
        let mut fie_index = 0;
        while let Some(fie) = session.enum_frame_interval(fie_index, code, width, height)? {
            intervals.push(IntervalEntry {
                width: fie.width,
                height: fie.height,
                interval: fie.interval.to_string(),
                fps: fie.interval.fps(),
            });
            fie_index += 1;
        }

        formats.push(FormatEntry {
            index,
            code: code.as_raw(),
            name: code.to_string(),
            colorspace: find_datafmt(code)
                .map(|fmt| fmt.colorspace.name())
                .unwrap_or("unknown"),
            frame_sizes,
            intervals,
        });
        index += 1;
    }

    log::debug!("Enumerated {} media bus codes", formats.len());

    let list = FormatList {
        subdev: session.sensor()?.subdev().name().to_owned(),
        formats,
    };
    session.close()?;

    if json {
        let json_str = serde_json::to_string_pretty(&list)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
    } else {
        print_text_formats(&list);
    }

    Ok(())
}

fn print_text_formats(list: &FormatList) {
    println!("Sub-device: {}", list.subdev);
    for fmt in &list.formats {
        println!("  [{}] {} colorspace {}", fmt.index, fmt.name, fmt.colorspace);
        for size in &fmt.frame_sizes {
            println!(
                "      Size: {}-{} x {}-{}",
                size.min_width, size.max_width, size.min_height, size.max_height
            );
        }
        for ival in &fmt.intervals {
            match ival.fps {
                Some(fps) => println!(
                    "      Interval: {} s ({} fps) at {}x{}",
                    ival.interval, fps, ival.width, ival.height
                ),
                None => println!(
                    "      Interval: {} s at {}x{}",
                    ival.interval, ival.width, ival.height
                ),
            }
        }
    }
}
