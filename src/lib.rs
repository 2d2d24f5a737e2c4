// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # MSM Camera HAL
//!
//! A camera HAL shim for MSM devices whose camera stack is a closed vendor
//! engine. The HAL sits between the camera service's device operation
//! table and that engine, forwarding control calls and taking over the
//! frame path:
//!
//! - **Recording frames** are copied into client-allocated memory and
//!   tracked until the client hands each block back, or until the video
//!   stream is torn down.
//! - **Preview and picture frames** are copied into client memory for the
//!   duration of the data callback only.
//! - **Preview display** is done by the MDP hardware blitter, which
//!   converts the engine's YCbCr 4:2:0 output and writes it straight into
//!   a buffer dequeued from the client's preview window.
//!
//! ## Example
//!
//! ```no_run
//! use msm_camera_hal::{config::HalConfig, device::CameraModule, engine::EngineProvider};
//! use std::sync::Arc;
//!
//! # fn provider() -> Arc<dyn EngineProvider> { unimplemented!() }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = CameraModule::new(provider(), HalConfig::load()?);
//! let device = module.open("0")?;
//! assert_eq!(device.start_preview(), 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Safety
//!
//! `unsafe` is confined to the blit ioctl in [`blit`] and the vendor
//! symbol lookup in [`convert`].

pub mod blit;
pub mod callbacks;
pub mod config;
pub mod convert;
pub mod device;
pub mod engine;
pub mod error;
pub mod logging;
pub mod memory;
pub mod msg;
pub mod params;
pub mod preview;
pub mod registry;
pub mod router;
pub mod session;
pub mod window;

pub use error::{HalError, Result};
