// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{self, Session, Target};
use clap::Args as ClapArgs;
use serde::Serialize;
use vsmipi::format::MbusCode;
use vsmipi::v4l2::{FormatWhence, MbusFrameFmt, SubdevFormat, SubdevOps};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Media bus code by name (SBGGR10_1X10) or number (0x3007)
    #[arg(short, long, default_value = "SBGGR8_1X8")]
    code: String,

    /// Resolution in WxH format
    #[arg(short, long, default_value = "1920x1080")]
    resolution: String,

    /// Negotiate without changing the active format
    #[arg(long = "try")]
    try_only: bool,
}

#[derive(Debug, Serialize)]
struct FormatReport {
    subdev: String,
    which: &'static str,
    requested: FormatInfo,
    negotiated: FormatInfo,
    active: FormatInfo,
}

#[derive(Debug, Serialize)]
struct FormatInfo {
    width: u32,
    height: u32,
    code: u32,
    name: String,
    field: String,
    colorspace: &'static str,
}

impl From<&MbusFrameFmt> for FormatInfo {
    fn from(mf: &MbusFrameFmt) -> Self {
        FormatInfo {
            width: mf.width,
            height: mf.height,
            code: mf.code.as_raw(),
            name: mf.code.to_string(),
            field: mf.field.to_string(),
            colorspace: mf.colorspace.name(),
        }
    }
}

pub fn execute(args: Args, target: &Target, json: bool) -> Result<(), CliError> {
    log::debug!("Executing set-fmt command: {:?}", args);

    let (width, height) = utils::parse_resolution(&args.resolution)?;
    let code = args
        .code
        .parse::<MbusCode>()
        .map_err(|e| CliError::InvalidArgs(e.to_string()))?;

    let which = if args.try_only {
        FormatWhence::Try
    } else {
        FormatWhence::Active
    };

    let mut session = Session::open(target)?;

    let request = SubdevFormat::request(which, code, width, height);
    let negotiated = session.set_format(request)?;
    if negotiated.format.code != code {
        log::warn!(
            "{} not supported, sensor selected {}",
            code,
            negotiated.format.code
        );
    }

    let active = session.get_format(FormatWhence::Active)?;

    let report = FormatReport {
        subdev: session.sensor()?.subdev().name().to_owned(),
        which: match which {
            FormatWhence::Try => "try",
            FormatWhence::Active => "active",
        },
        requested: FormatInfo::from(&request.format),
        negotiated: FormatInfo::from(&negotiated.format),
        active: FormatInfo::from(&active.format),
    };
    session.close()?;

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
    } else {
        println!("Sub-device: {} ({})", report.subdev, report.which);
        print_format("Requested", &report.requested);
        print_format("Negotiated", &report.negotiated);
        print_format("Active", &report.active);
    }

    Ok(())
}

fn print_format(label: &str, fmt: &FormatInfo) {
    println!(
        "  {:<11} {}x{} {} field {} colorspace {}",
        format!("{}:", label),
        fmt.width,
        fmt.height,
        fmt.name,
        fmt.field,
        fmt.colorspace
    );
}
