// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Bindings for the blit interface of the MSM framebuffer driver
//! (`linux/msm_mdp.h`).
//!
//! The structures mirror the kernel header field for field. The driver
//! copies them straight out of user memory, so their layout must not
//! change.

#![allow(non_camel_case_types)]

use libc::c_uint;
use nix::{ioctl_write_ptr_bad, request_code_write};
use std::mem::size_of;

pub const MSMFB_IOCTL_MAGIC: u8 = b'm';

// enum mdp_imgtype
pub const MDP_RGB_565: u32 = 0;
pub const MDP_XRGB_8888: u32 = 1;
pub const MDP_Y_CBCR_H2V2: u32 = 2;
pub const MDP_ARGB_8888: u32 = 3;
pub const MDP_RGB_888: u32 = 4;
pub const MDP_Y_CRCB_H2V2: u32 = 5;
pub const MDP_YCRYCB_H2V1: u32 = 6;
pub const MDP_Y_CRCB_H2V1: u32 = 7;
pub const MDP_Y_CBCR_H2V1: u32 = 8;
pub const MDP_RGBA_8888: u32 = 9;
pub const MDP_BGRA_8888: u32 = 10;
pub const MDP_RGBX_8888: u32 = 11;

pub const MDP_ALPHA_NOP: u32 = 0xff;
pub const MDP_TRANSP_NOP: u32 = 0xffff_ffff;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct mdp_rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct mdp_img {
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub offset: u32,
    /// File descriptor of the backing pmem/ion region.
    pub memory_id: i32,
    pub priv_: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct mdp_blit_req {
    pub src: mdp_img,
    pub dst: mdp_img,
    pub src_rect: mdp_rect,
    pub dst_rect: mdp_rect,
    pub alpha: u32,
    pub transp_mask: u32,
    pub flags: u32,
    pub sharpening_strength: i32,
}

/// Single-entry form of `struct mdp_blit_req_list`. The kernel declares
/// `req` as a flexible array member; the HAL only ever submits one
/// request, so it is laid out inline.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct mdp_blit_req_list {
    pub count: u32,
    pub req: mdp_blit_req,
}

// MSMFB_BLIT is declared as _IOW('m', 2, unsigned int) even though the
// argument is a pointer to the request list.
ioctl_write_ptr_bad!(
    msmfb_blit,
    request_code_write!(MSMFB_IOCTL_MAGIC, 2, size_of::<c_uint>()),
    mdp_blit_req_list
);
