// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::{
    fmt,
    ops::{BitAnd, BitOr, BitOrAssign},
};

/// Camera message kinds (`CAMERA_MSG_*`).
///
/// Values are bit flags: enable/disable calls may carry several kinds at
/// once while every delivery from the engine carries exactly one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MsgType(pub i32);

impl MsgType {
    pub const ERROR: MsgType = MsgType(0x0001);
    pub const SHUTTER: MsgType = MsgType(0x0002);
    pub const FOCUS: MsgType = MsgType(0x0004);
    pub const ZOOM: MsgType = MsgType(0x0008);
    pub const PREVIEW_FRAME: MsgType = MsgType(0x0010);
    pub const VIDEO_FRAME: MsgType = MsgType(0x0020);
    pub const POSTVIEW_FRAME: MsgType = MsgType(0x0040);
    pub const RAW_IMAGE: MsgType = MsgType(0x0080);
    pub const COMPRESSED_IMAGE: MsgType = MsgType(0x0100);
    pub const RAW_IMAGE_NOTIFY: MsgType = MsgType(0x0200);
    pub const PREVIEW_METADATA: MsgType = MsgType(0x0400);
    pub const ALL: MsgType = MsgType(0xFFFF);

    /// Kinds the engine must deliver for a still capture.
    pub const PICTURE: MsgType = MsgType(
        Self::SHUTTER.0 | Self::POSTVIEW_FRAME.0 | Self::RAW_IMAGE.0 | Self::COMPRESSED_IMAGE.0,
    );

    pub const fn bits(self) -> i32 {
        self.0
    }

    /// True when any bit of `other` is set in `self`.
    pub const fn intersects(self, other: MsgType) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: MsgType) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MsgType {
    type Output = MsgType;

    fn bitor(self, rhs: MsgType) -> MsgType {
        MsgType(self.0 | rhs.0)
    }
}

impl BitOrAssign for MsgType {
    fn bitor_assign(&mut self, rhs: MsgType) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MsgType {
    type Output = MsgType;

    fn bitand(self, rhs: MsgType) -> MsgType {
        MsgType(self.0 & rhs.0)
    }
}

impl From<i32> for MsgType {
    fn from(value: i32) -> Self {
        MsgType(value)
    }
}

impl fmt::Debug for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [(MsgType, &str); 11] = [
            (MsgType::ERROR, "ERROR"),
            (MsgType::SHUTTER, "SHUTTER"),
            (MsgType::FOCUS, "FOCUS"),
            (MsgType::ZOOM, "ZOOM"),
            (MsgType::PREVIEW_FRAME, "PREVIEW_FRAME"),
            (MsgType::VIDEO_FRAME, "VIDEO_FRAME"),
            (MsgType::POSTVIEW_FRAME, "POSTVIEW_FRAME"),
            (MsgType::RAW_IMAGE, "RAW_IMAGE"),
            (MsgType::COMPRESSED_IMAGE, "COMPRESSED_IMAGE"),
            (MsgType::RAW_IMAGE_NOTIFY, "RAW_IMAGE_NOTIFY"),
            (MsgType::PREVIEW_METADATA, "PREVIEW_METADATA"),
        ];

        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(kind, _)| self.intersects(*kind))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "MsgType({:#x})", self.0)
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
