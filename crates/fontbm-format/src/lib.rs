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

//! The AngelCode BMFont descriptor and its three serializations.
//!
//! A [BmFont] is a plain record of what a bitmap font bundle contains: the
//! `info`, `common`, `pages`, `chars`, and `kernings` blocks. It can be
//! written as text, XML, or the packed little-endian binary layout, and the
//! binary layout can be parsed back.

use std::io::{self, Write};
use std::str::FromStr;

use serde::Deserialize;

/// Binary (`BMF\x03`) encoding and decoding.
pub mod binary;

/// Error types for descriptor decoding.
pub mod error;

/// Line-based text encoding.
pub mod text;

/// XML encoding.
pub mod xml;

pub use error::{FormatError, FormatResult};

bitflags::bitflags! {
    /// The `info` block's bit field. BMFont numbers these bits from the most
    /// significant end, so "bit 0" (smooth) is `0x80`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InfoFlags: u8 {
        const SMOOTH = 1 << 7;
        const UNICODE = 1 << 6;
        const ITALIC = 1 << 5;
        const BOLD = 1 << 4;
        const FIXED_HEIGHT = 1 << 3;
    }
}

bitflags::bitflags! {
    /// The `common` block's bit field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CommonFlags: u8 {
        /// Monochrome glyphs are packed into each of the texture channels.
        const PACKED = 1 << 0;
    }
}

/// How the font was generated. Serialized as block 1 followed by the face name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontInfo {
    pub font_size: i16,
    pub flags: InfoFlags,
    pub char_set: u8,
    pub stretch_h: u16,
    pub aa: u8,
    pub padding_up: u8,
    pub padding_right: u8,
    pub padding_down: u8,
    pub padding_left: u8,
    pub spacing_horiz: u8,
    pub spacing_vert: u8,
    pub outline: u8,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            font_size: 0,
            flags: InfoFlags::empty(),
            char_set: 0,
            stretch_h: 100,
            aa: 1,
            padding_up: 0,
            padding_right: 0,
            padding_down: 0,
            padding_left: 0,
            spacing_horiz: 0,
            spacing_vert: 0,
            outline: 0,
        }
    }
}

/// Information shared by every character in the font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontCommon {
    /// Distance in pixels between each line of text.
    pub line_height: u16,

    /// Distance in pixels from the top of the line to the common base.
    pub base: u16,

    /// Width of the texture, used to normalize glyph coordinates.
    pub scale_w: u16,

    /// Height of the texture, used to normalize glyph coordinates.
    pub scale_h: u16,

    /// Number of texture pages.
    pub pages: u16,

    pub flags: CommonFlags,
    pub alpha_chnl: u8,
    pub red_chnl: u8,
    pub green_chnl: u8,
    pub blue_chnl: u8,
}

impl Default for FontCommon {
    fn default() -> Self {
        Self {
            line_height: 0,
            base: 0,
            scale_w: 0,
            scale_h: 0,
            pages: 0,
            flags: CommonFlags::empty(),
            alpha_chnl: 0,
            red_chnl: 0,
            green_chnl: 0,
            blue_chnl: 0,
        }
    }
}

/// A single glyph quad within a texture page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharInfo {
    pub id: u32,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub x_offset: i16,
    pub y_offset: i16,
    pub x_advance: i16,
    pub page: u8,
    pub chnl: u8,
}

/// An adjustment to the advance between two adjacent characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KernPair {
    pub first: u32,
    pub second: u32,
    pub amount: i16,
}

/// A complete BMFont descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BmFont {
    /// The face name stored after the `info` block.
    pub face: String,
    pub info: FontInfo,
    pub common: FontCommon,

    /// Texture file names, one per page.
    pub pages: Vec<String>,
    pub chars: Vec<CharInfo>,

    /// Kerning pairs. An empty list is not serialized at all.
    pub kernings: Vec<KernPair>,
}

/// The serialization used for a descriptor file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum DataFormat {
    #[default]
    #[serde(rename = "txt")]
    Text,
    #[serde(rename = "xml")]
    Xml,
    #[serde(rename = "bin")]
    Binary,
}

impl DataFormat {
    /// The file extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Text | DataFormat::Binary => "fnt",
            DataFormat::Xml => "xml",
        }
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(DataFormat::Text),
            "xml" => Ok(DataFormat::Xml),
            "bin" => Ok(DataFormat::Binary),
            other => Err(format!("unknown data format {:?} (expected txt, xml, or bin)", other)),
        }
    }
}

impl BmFont {
    /// Writes this descriptor in the given format.
    pub fn write(&self, format: DataFormat, out: &mut impl Write) -> io::Result<()> {
        match format {
            DataFormat::Text => self.write_text(out),
            DataFormat::Xml => self.write_xml(out),
            DataFormat::Binary => out.write_all(&self.to_binary()),
        }
    }

    /// Encodes this descriptor into an in-memory buffer.
    pub fn to_bytes(&self, format: DataFormat) -> Vec<u8> {
        match format {
            DataFormat::Binary => self.to_binary().to_vec(),
            format => {
                let mut out = Vec::new();
                // writing into a Vec cannot fail
                let _ = self.write(format, &mut out);
                out
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A small descriptor touching every block, shared by the format tests.
    pub fn sample_font() -> BmFont {
        BmFont {
            face: "Sample Sans".to_string(),
            info: FontInfo {
                font_size: 32,
                spacing_horiz: 1,
                spacing_vert: 1,
                ..Default::default()
            },
            common: FontCommon {
                line_height: 38,
                base: 7,
                scale_w: 256,
                scale_h: 128,
                pages: 2,
                ..Default::default()
            },
            pages: vec!["sample_0.png".to_string(), "sample_1.png".to_string()],
            chars: vec![
                CharInfo {
                    id: 32,
                    x: 0,
                    y: 0,
                    width: 0,
                    height: 0,
                    x_offset: 0,
                    y_offset: 0,
                    x_advance: 8,
                    page: 0,
                    chnl: 15,
                },
                CharInfo {
                    id: 65,
                    x: 3,
                    y: 4,
                    width: 18,
                    height: 22,
                    x_offset: -1,
                    y_offset: 6,
                    x_advance: 17,
                    page: 0,
                    chnl: 15,
                },
                CharInfo {
                    id: 86,
                    x: 40,
                    y: 90,
                    width: 19,
                    height: 22,
                    x_offset: 0,
                    y_offset: 6,
                    x_advance: 18,
                    page: 1,
                    chnl: 15,
                },
            ],
            kernings: vec![KernPair {
                first: 65,
                second: 86,
                amount: -2,
            }],
        }
    }

    #[test]
    fn data_format_from_str() {
        assert_eq!("txt".parse::<DataFormat>(), Ok(DataFormat::Text));
        assert_eq!("XML".parse::<DataFormat>(), Ok(DataFormat::Xml));
        assert_eq!("bin".parse::<DataFormat>(), Ok(DataFormat::Binary));
        assert!("json".parse::<DataFormat>().is_err());
    }

    #[test]
    fn extensions() {
        assert_eq!(DataFormat::Text.extension(), "fnt");
        assert_eq!(DataFormat::Binary.extension(), "fnt");
        assert_eq!(DataFormat::Xml.extension(), "xml");
    }

    #[test]
    fn to_bytes_matches_write() {
        let font = sample_font();
        for format in [DataFormat::Text, DataFormat::Xml, DataFormat::Binary] {
            let mut written = Vec::new();
            font.write(format, &mut written).unwrap();
            assert_eq!(font.to_bytes(format), written);
        }
    }

    #[test]
    fn info_flags_use_high_bits() {
        assert_eq!(InfoFlags::SMOOTH.bits(), 0x80);
        assert_eq!(InfoFlags::BOLD.bits(), 0x10);
    }
}
