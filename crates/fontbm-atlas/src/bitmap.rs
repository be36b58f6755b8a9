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

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::Deserialize;

/// A straight-alpha 8-bit RGBA color. Pixels are stored in this layout, so a
/// pixel buffer casts directly to RGBA bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// This color with its alpha scaled by a coverage value in `0.0..=1.0`.
    pub fn with_coverage(self, coverage: f32) -> Self {
        let coverage = coverage.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * coverage).round() as u8,
            ..self
        }
    }

    /// Composites this color over `dst` (Porter-Duff source-over).
    pub fn over(self, dst: Color) -> Color {
        let sa = self.a as u32;
        let da = dst.a as u32;
        match sa {
            255 => return self,
            0 => return dst,
            _ => {}
        }

        // alpha scaled by 255 to keep the intermediate math in integers
        let out_a = sa * 255 + da * (255 - sa);
        if out_a == 0 {
            return Color::TRANSPARENT;
        }

        let channel = |s: u8, d: u8| {
            ((s as u32 * sa * 255 + d as u32 * da * (255 - sa) + out_a / 2) / out_a) as u8
        };

        Color {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: ((out_a + 127) / 255) as u8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parses `r,g,b` or `r,g,b,a`. Alpha defaults to opaque.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals = s
            .split(',')
            .map(|v| v.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|err| format!("invalid color value {:?}: {}", s, err))?;

        match vals.as_slice() {
            [r, g, b] => Ok(Color::rgba(*r, *g, *b, 255)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            _ => Err(format!(
                "invalid color value {:?}: expected r,g,b or r,g,b,a",
                s
            )),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A rasterized glyph, row-major, owned by the glyph catalog until the atlas
/// is composed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,

    /// Whether the pixels carry their own colors (SVG glyphs) rather than a
    /// single foreground color.
    pub is_color: bool,
}

impl GlyphBitmap {
    /// A bitmap filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
            is_color: false,
        }
    }

    /// A zero-sized bitmap, used for glyphs the rasterizer produced nothing for.
    pub fn empty() -> Self {
        Self::solid(0, 0, Color::TRANSPARENT)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// The pixels as tightly packed RGBA bytes.
    pub fn data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
