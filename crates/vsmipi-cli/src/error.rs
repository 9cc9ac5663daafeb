// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Invalid command-line arguments or a request the driver rejected
    InvalidArgs(String),
    /// Platform device does not match the driver or is already bound
    DeviceNotFound(String),
    /// Operation not provided by the sub-device
    Unsupported(String),
    /// Sub-device registration refused by the framework
    RegistrationFailed(String),
    /// General error
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            CliError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            CliError::RegistrationFailed(msg) => write!(f, "Registration failed: {}", msg),
            CliError::General(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::InvalidArgs(_) => ExitCode::from(2),
            CliError::DeviceNotFound(_) => ExitCode::from(3),
            CliError::Unsupported(_) => ExitCode::from(4),
            CliError::RegistrationFailed(_) => ExitCode::from(5),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

/// Map vsmipi::Error to CliError with appropriate exit codes
impl From<vsmipi::Error> for CliError {
    fn from(err: vsmipi::Error) -> Self {
        use vsmipi::Error;

        let errno = err.errno();
        match err {
            Error::InvalidArgument => {
                CliError::InvalidArgs(format!("request rejected by driver ({})", errno))
            }
            Error::Parse(msg) => CliError::InvalidArgs(msg),
            Error::NoDevice => CliError::DeviceNotFound(format!("no driver bound ({})", errno)),
            Error::Busy => CliError::DeviceNotFound(format!("device already bound ({})", errno)),
            Error::NotSupported => {
                CliError::Unsupported(format!("not implemented by sub-device ({})", errno))
            }
            Error::Exists => {
                CliError::RegistrationFailed(format!("sub-device name in use ({})", errno))
            }
            Error::Registration(_) => {
                CliError::RegistrationFailed(format!("framework refused sub-device ({})", errno))
            }
        }
    }
}

/// Helper function to convert result to exit code
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
