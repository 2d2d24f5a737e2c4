// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::io;
use thiserror::Error;

/// Errors raised inside the HAL.
///
/// Frame pipeline failures are logged and absorbed where they happen; only
/// glue-level errors ever reach the plugin host, and then only as the
/// negative status returned by [`HalError::status`].
#[derive(Debug, Error)]
pub enum HalError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("camera device is closed")]
    DeviceClosed,

    #[error("camera {0} could not be opened")]
    OpenFailed(i32),

    #[error("operation not supported")]
    Unsupported,

    #[error("status {0}")]
    Status(i32),

    #[error("ioctl failed: {0}")]
    Ioctl(#[from] nix::errno::Errno),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("library error: {0}")]
    Library(#[from] libloading::Error),
}

impl HalError {
    /// Negative errno reported to the plugin host.
    pub fn status(&self) -> i32 {
        match self {
            HalError::InvalidArgument(_) | HalError::DeviceClosed => -libc::EINVAL,
            HalError::OpenFailed(_) => -libc::ENODEV,
            HalError::Unsupported => -libc::ENOSYS,
            HalError::Status(code) if *code < 0 => *code,
            // an error never reports success
            HalError::Status(0) => -libc::EIO,
            HalError::Status(code) => -code,
            HalError::Ioctl(errno) => -(*errno as i32),
            HalError::Io(err) => -err.raw_os_error().unwrap_or(libc::EIO),
            HalError::Config(_) | HalError::Library(_) => -libc::EIO,
        }
    }
}

pub type Result<T> = std::result::Result<T, HalError>;

/// Folds a unit result into the host's `0` / negative errno convention.
pub fn to_status(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.status(),
    }
}
