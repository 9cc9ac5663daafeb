// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use crate::error::CliError;
use crate::utils::{Session, Target};
use clap::Args as ClapArgs;
use serde::Serialize;
use vsmipi::platform::OF_MATCH_TABLE;
use vsmipi::v4l2::{BufType, FormatWhence, SubdevIoctl, SubdevOps};

#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Bind the driver and report the sub-device's initial state
    #[arg(long)]
    probe: bool,
}

#[derive(Debug, Serialize)]
struct DriverInfo {
    name: &'static str,
    version: &'static str,
    alias: &'static str,
    license: &'static str,
    author: &'static str,
    description: &'static str,
    compatible: Vec<&'static str>,
    kernel: String,
    registration: &'static str,
    ops: OpsInfo,
    ioctls: Vec<IoctlInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    subdev: Option<SubdevInfo>,
}

#[derive(Debug, Serialize)]
struct OpsInfo {
    core: Vec<&'static str>,
    video: Vec<&'static str>,
    pad: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct IoctlInfo {
    name: &'static str,
    number: String,
    op: &'static str,
}

#[derive(Debug, Serialize)]
struct SubdevInfo {
    name: String,
    device: String,
    registered_with: &'static str,
    width: u32,
    height: u32,
    code: String,
    colorspace: &'static str,
    interval: String,
    capturemode: u32,
}

pub fn execute(args: Args, target: &Target, json: bool) -> Result<(), CliError> {
    log::debug!("Executing info command: {:?}", args);

    let kernel = target.kernel_version()?;

    let mut info = DriverInfo {
        name: vsmipi::MODULE_NAME,
        version: vsmipi::MODULE_VERSION,
        alias: vsmipi::MODULE_ALIAS,
        license: vsmipi::MODULE_LICENSE,
        author: vsmipi::MODULE_AUTHOR,
        description: vsmipi::MODULE_DESCRIPTION,
        compatible: OF_MATCH_TABLE.iter().map(|id| id.compatible).collect(),
        kernel: kernel.to_string(),
        registration: kernel.registration_mode().name(),
        ops: OpsInfo {
            core: vec!["s_power"],
            video: vec!["g_parm", "s_parm", "s_stream"],
            pad: vec![
                "enum_frame_size",
                "enum_frame_interval",
                "enum_mbus_code",
                "set_fmt",
                "get_fmt",
            ],
        },
        ioctls: SubdevIoctl::all()
            .iter()
            .map(|ioctl| IoctlInfo {
                name: ioctl.name(),
                number: format!("0x{:08x}", ioctl.number()),
                op: ioctl.op(),
            })
            .collect(),
        subdev: None,
    };

    if args.probe {
        info.subdev = Some(query_subdev(target)?);
    }

    // Output results
    if json {
        let json_str = serde_json::to_string_pretty(&info)
            .map_err(|e| CliError::General(format!("Failed to serialize JSON: {}", e)))?;
        println!("{}", json_str);
    } else {
        print_text_info(&info);
    }

    Ok(())
}

fn query_subdev(target: &Target) -> Result<SubdevInfo, CliError> {
    log::debug!("Probing sensor on: {}", target.device);

    let mut session = Session::open(target)?;

    let fmt = session.get_format(FormatWhence::Active)?.format;
    let parm = session.g_parm(BufType::VideoCapture)?.capture;
    let name = session.sensor()?.subdev().name().to_owned();
    let registered_with = session
        .registry()
        .get(&name)
        .map(|entry| entry.mode.name())
        .ok_or_else(|| CliError::RegistrationFailed(format!("{} is not registered", name)))?;

    session.close()?;

    Ok(SubdevInfo {
        name,
        device: target.device.clone(),
        registered_with,
        width: fmt.width,
        height: fmt.height,
        code: fmt.code.to_string(),
        colorspace: fmt.colorspace.name(),
        interval: parm.timeperframe.to_string(),
        capturemode: parm.capturemode,
    })
}

fn print_text_info(info: &DriverInfo) {
    println!("{} - {}", info.name, info.description);
    println!("===============================");
    println!("Version:     {}", info.version);
    println!("Alias:       {}", info.alias);
    println!("License:     {}", info.license);
    println!("Author:      {}", info.author);
    println!("Compatible:  {}", info.compatible.join(", "));
    println!("Kernel:      {} ({})\n", info.kernel, info.registration);

    println!("Operations:");
    println!("  core:  {}", info.ops.core.join(", "));
    println!("  video: {}", info.ops.video.join(", "));
    println!("  pad:   {}", info.ops.pad.join(", "));
    println!();

    println!("Ioctls:");
    for ioctl in &info.ioctls {
        println!("  {:<34} {}  -> {}", ioctl.name, ioctl.number, ioctl.op);
    }

    if let Some(ref sd) = info.subdev {
        println!();
        println!("Sub-device: {}", sd.name);
        println!("  Device:      {}", sd.device);
        println!("  Registered:  {}", sd.registered_with);
        println!("  Format:      {}x{} {}", sd.width, sd.height, sd.code);
        println!("  Colorspace:  {}", sd.colorspace);
        println!("  Interval:    {} s", sd.interval);
        println!("  Capturemode: {}", sd.capturemode);
    }
}
