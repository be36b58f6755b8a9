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
use std::path::PathBuf;
use std::str::FromStr;

use fontbm_format::DataFormat;
use glam::UVec2;
use serde::Deserialize;

use crate::bitmap::Color;
use crate::catalog::CharSelection;
use crate::error::{AtlasError, AtlasResult};
use crate::packer::PackerKind;
use crate::rasterizer::CodePoint;

/// The largest Unicode scalar value a character range may reach.
pub const MAX_CODE_POINT: CodePoint = 0x10FFFF;

/// How the layout reacts when the glyphs don't fit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoSize {
    /// Fail with an overflow error.
    None,

    /// Grow the texture, starting at 64x64.
    #[default]
    Texture,

    /// Shrink the font one pixel at a time.
    Font,
}

impl FromStr for AutoSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AutoSize::None),
            "texture" => Ok(AutoSize::Texture),
            "font" => Ok(AutoSize::Font),
            other => Err(format!(
                "unknown auto-size mode {:?} (expected none, texture, or font)",
                other
            )),
        }
    }
}

/// A `WIDTHxHEIGHT` pair, used for texture and grid sizes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_uvec2(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Display for Extent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Extent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|err| format!("invalid size {:?}: {}", s, err))
        };

        Ok(Self::new(parse(width)?, parse(height)?))
    }
}

impl TryFrom<String> for Extent {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An inclusive `START-END` range of code points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CharRange {
    pub start: CodePoint,
    pub end: CodePoint,
}

impl Default for CharRange {
    fn default() -> Self {
        Self { start: 32, end: 126 }
    }
}

impl FromStr for CharRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected START-END, got {:?}", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<CodePoint>()
                .map_err(|err| format!("invalid character range {:?}: {}", s, err))
        };

        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

impl TryFrom<String> for CharRange {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Everything that controls how one font is baked.
///
/// Loadable from a TOML table with kebab-case keys; missing keys keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Options {
    pub chars: CharRange,

    /// Literal characters to use instead of [Options::chars].
    pub chars_text: Option<String>,

    /// A file of characters to use instead of [Options::chars]. Takes
    /// precedence over [Options::chars_text].
    pub chars_file: Option<PathBuf>,
    pub font_size: u32,
    pub spacing: u32,
    pub color: Color,
    pub background_color: Color,
    pub texture_size: Extent,
    pub auto_size: AutoSize,

    /// Lay glyphs out in a fixed grid instead of packing them.
    pub no_packing: bool,

    /// Columns x rows of the grid layout.
    pub grid_size: Extent,
    pub data_format: DataFormat,
    pub include_blank_char: bool,
    pub packer: PackerKind,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            chars: CharRange::default(),
            chars_text: None,
            chars_file: None,
            font_size: 32,
            spacing: 1,
            color: Color::WHITE,
            background_color: Color::TRANSPARENT,
            texture_size: Extent::new(256, 256),
            auto_size: AutoSize::Texture,
            no_packing: false,
            grid_size: Extent::new(9, 10),
            data_format: DataFormat::Text,
            include_blank_char: false,
            packer: PackerKind::Guillotine,
        }
    }
}

impl Options {
    pub fn char_selection(&self) -> CharSelection {
        if let Some(path) = &self.chars_file {
            CharSelection::File(path.clone())
        } else if let Some(text) = &self.chars_text {
            CharSelection::Text(text.clone())
        } else {
            CharSelection::Range {
                start: self.chars.start,
                end: self.chars.end,
            }
        }
    }

    /// Rejects values no layout can work with.
    pub fn validate(&self) -> AtlasResult<()> {
        let invalid = |msg: String| Err(AtlasError::InvalidOptions(msg));

        if self.font_size == 0 {
            return invalid("font size must be positive".into());
        }

        if self.font_size > i16::MAX as u32 {
            return invalid(format!("font size {} is too large", self.font_size));
        }

        if self.spacing > u8::MAX as u32 {
            return invalid(format!("spacing {} is too large", self.spacing));
        }

        if self.texture_size.is_empty() {
            return invalid(format!("texture size {} is empty", self.texture_size));
        }

        // scaleW and scaleH are 16-bit in the descriptor
        let max_side = u16::MAX as u32;
        if self.texture_size.width > max_side || self.texture_size.height > max_side {
            return invalid(format!(
                "texture size {} exceeds {}x{}",
                self.texture_size, max_side, max_side
            ));
        }

        if self.no_packing && self.grid_size.is_empty() {
            return invalid(format!("grid size {} is empty", self.grid_size));
        }

        if self
            .grid_size
            .width
            .checked_mul(self.grid_size.height)
            .is_none()
        {
            return invalid(format!("grid size {} has too many cells", self.grid_size));
        }

        if self.chars.start > self.chars.end {
            return invalid(format!(
                "character range {}-{} is empty",
                self.chars.start, self.chars.end
            ));
        }

        if self.chars.end > MAX_CODE_POINT {
            return invalid(format!(
                "character range end {} is beyond U+{:X}",
                self.chars.end, MAX_CODE_POINT
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::default();
        assert_eq!(options.font_size, 32);
        assert_eq!(options.spacing, 1);
        assert_eq!(options.texture_size, Extent::new(256, 256));
        assert_eq!(options.grid_size, Extent::new(9, 10));
        assert_eq!(options.auto_size, AutoSize::Texture);
        assert_eq!(AutoSize::default(), AutoSize::Texture);
        assert_eq!(
            options.char_selection(),
            CharSelection::Range { start: 32, end: 126 }
        );
        assert!(options.validate().is_ok());
    }

    #[test]
    fn parse_extent() {
        assert_eq!("512x256".parse::<Extent>(), Ok(Extent::new(512, 256)));
        assert_eq!("7X7".parse::<Extent>(), Ok(Extent::new(7, 7)));
        assert!("512".parse::<Extent>().is_err());
        assert!("ax1".parse::<Extent>().is_err());
    }

    #[test]
    fn parse_char_range() {
        assert_eq!(
            "48-57".parse::<CharRange>(),
            Ok(CharRange { start: 48, end: 57 })
        );
        assert!("48".parse::<CharRange>().is_err());
        assert!("-5-6".parse::<CharRange>().is_err());
    }

    #[test]
    fn parse_auto_size() {
        assert_eq!("Texture".parse::<AutoSize>(), Ok(AutoSize::Texture));
        assert_eq!("font".parse::<AutoSize>(), Ok(AutoSize::Font));
        assert_eq!("none".parse::<AutoSize>(), Ok(AutoSize::None));
        assert!("grow".parse::<AutoSize>().is_err());
    }

    #[test]
    fn selection_precedence() {
        let mut options = Options {
            chars_text: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(options.char_selection(), CharSelection::Text("abc".into()));

        options.chars_file = Some("chars.txt".into());
        assert_eq!(
            options.char_selection(),
            CharSelection::File("chars.txt".into())
        );
    }

    #[test]
    fn validation() {
        let bad = [
            Options {
                font_size: 0,
                ..Default::default()
            },
            Options {
                texture_size: Extent::new(0, 256),
                ..Default::default()
            },
            Options {
                no_packing: true,
                grid_size: Extent::new(9, 0),
                ..Default::default()
            },
            Options {
                chars: CharRange { start: 10, end: 5 },
                ..Default::default()
            },
            Options {
                texture_size: Extent::new(70000, 8),
                ..Default::default()
            },
            Options {
                texture_size: Extent::new(8, 65536),
                ..Default::default()
            },
            Options {
                grid_size: Extent::new(65536, 65536),
                ..Default::default()
            },
            Options {
                chars: CharRange {
                    start: 0,
                    end: 4_000_000_000,
                },
                ..Default::default()
            },
        ];

        for options in bad {
            assert!(matches!(
                options.validate(),
                Err(AtlasError::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn validation_limits_are_inclusive() {
        let options = Options {
            texture_size: Extent::new(65535, 65535),
            chars: CharRange {
                start: 0x10FFF0,
                end: MAX_CODE_POINT,
            },
            grid_size: Extent::new(65535, 65537),
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }
}
