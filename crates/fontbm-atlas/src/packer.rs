// Copyright (c) 2023 the fontbm contributors.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use glam::UVec2;
use serde::Deserialize;

/// A stateful 2D bin packer over a fixed canvas.
///
/// Rectangles are placed in submission order; a packer that failed once may
/// still accept smaller rectangles, so callers start over with a fresh packer.
pub trait Packer {
    /// Places a `width` x `height` rectangle, returning its top-left corner.
    fn pack(&mut self, width: u32, height: u32) -> Option<UVec2>;
}

/// The packing algorithm to lay glyphs out with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackerKind {
    /// First-fit over a list of free rectangles.
    #[default]
    Guillotine,

    /// The skyline packer from the `rect_packer` crate.
    Skyline,
}

impl PackerKind {
    pub fn create(self, width: u32, height: u32) -> Box<dyn Packer> {
        match self {
            PackerKind::Guillotine => Box::new(RectanglePacker::new(width, height)),
            PackerKind::Skyline => Box::new(rect_packer::Packer::new(rect_packer::Config {
                width: width.min(i32::MAX as u32) as i32,
                height: height.min(i32::MAX as u32) as i32,
                border_padding: 0,
                rectangle_padding: 0,
            })),
        }
    }
}

impl Display for PackerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PackerKind::Guillotine => write!(f, "guillotine"),
            PackerKind::Skyline => write!(f, "skyline"),
        }
    }
}

impl FromStr for PackerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guillotine" => Ok(PackerKind::Guillotine),
            "skyline" => Ok(PackerKind::Skyline),
            other => Err(format!("unknown packer {:?}", other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct FreeRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl FreeRect {
    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// First-fit guillotine packer.
///
/// Keeps a list of free rectangles, initially the whole canvas. A request
/// goes to the top-left corner of the first free rectangle that can hold it;
/// that free rectangle is then replaced by its right remainder (as tall as
/// the placed rectangle) followed by its bottom remainder (full width).
/// Free rectangles are never merged.
#[derive(Clone, Debug)]
pub struct RectanglePacker {
    width: u32,
    height: u32,
    free: Vec<FreeRect>,
}

impl RectanglePacker {
    pub fn new(width: u32, height: u32) -> Self {
        let canvas = FreeRect {
            x: 0,
            y: 0,
            width,
            height,
        };

        Self {
            width,
            height,
            free: if canvas.is_empty() { vec![] } else { vec![canvas] },
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

impl Packer for RectanglePacker {
    fn pack(&mut self, width: u32, height: u32) -> Option<UVec2> {
        if width == 0 || height == 0 {
            return Some(UVec2::ZERO);
        }

        let index = self
            .free
            .iter()
            .position(|rect| width <= rect.width && height <= rect.height)?;

        let rect = self.free.remove(index);
        let right = FreeRect {
            x: rect.x + width,
            y: rect.y,
            width: rect.width - width,
            height,
        };
        let bottom = FreeRect {
            x: rect.x,
            y: rect.y + height,
            width: rect.width,
            height: rect.height - height,
        };

        let mut at = index;
        for split in [right, bottom] {
            if !split.is_empty() {
                self.free.insert(at, split);
                at += 1;
            }
        }

        Some(UVec2::new(rect.x, rect.y))
    }
}

impl Packer for rect_packer::Packer {
    fn pack(&mut self, width: u32, height: u32) -> Option<UVec2> {
        if width == 0 || height == 0 {
            return Some(UVec2::ZERO);
        }

        let rect = rect_packer::Packer::pack(self, width as i32, height as i32, false)?;
        Some(UVec2::new(rect.x as u32, rect.y as u32))
    }
}
