// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod error;
mod formats;
mod info;
mod parm;
mod set_fmt;
mod stream;
mod utils;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;
use utils::Target;

/// vsmipi CLI - MIPI sensor sub-device inspection and negotiation tool
#[derive(Parser)]
#[command(name = "vsmipi")]
#[command(version)]
#[command(about = "vsmipi CLI - MIPI sensor sub-device inspection and negotiation tool")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=trace for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Platform device name the sensor is probed against
    #[arg(short, long, global = true, default_value = "csi0")]
    device: String,

    /// Device tree compatible string of the platform device
    #[arg(long, global = true, default_value = "imago,sensor_mipi")]
    compatible: String,

    /// Kernel release the driver registers against
    #[arg(short, long, global = true, default_value = "6.1.0")]
    kernel: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display driver identity and sub-device operation surface
    Info(info::Args),

    /// Enumerate media bus codes, frame sizes and frame intervals
    Formats(formats::Args),

    /// Negotiate a pad format and show the resulting active format
    SetFmt(set_fmt::Args),

    /// Set and read capture stream parameters
    Parm(parm::Args),

    /// Power up and stream the sensor until N frames or Ctrl+C
    Stream(stream::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    let target = Target {
        device: cli.device,
        compatible: cli.compatible,
        kernel: cli.kernel,
    };

    // Execute the subcommand and convert result to exit code
    let result = match cli.command {
        Commands::Info(args) => info::execute(args, &target, cli.json),
        Commands::Formats(args) => formats::execute(args, &target, cli.json),
        Commands::SetFmt(args) => set_fmt::execute(args, &target, cli.json),
        Commands::Parm(args) => parm::execute(args, &target, cli.json),
        Commands::Stream(args) => stream::execute(args, &target, cli.json),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    // Determine log level from flags or RUST_LOG environment variable
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None) // Disable timestamps for cleaner CLI output
        .format_target(false) // Disable target (module path) for cleaner output
        .init();

    log::debug!("Logging initialized");
}
