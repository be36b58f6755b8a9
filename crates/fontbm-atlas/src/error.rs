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
use std::fmt::Formatter;
use std::path::PathBuf;

use owned_ttf_parser::FaceParsingError;

#[derive(Debug)]
pub enum AtlasError {
    /// A font or character file could not be read.
    ReadInput { path: PathBuf, source: std::io::Error },

    /// The font data could not be parsed as a TrueType/OpenType face.
    FontParse(FaceParsingError),

    /// The glyphs don't fit into the texture and auto-sizing is off (or gave up).
    AtlasOverflow {
        width: u32,
        height: u32,
        font_size: u32,
    },

    /// An option value that no layout can work with.
    InvalidOptions(String),

    /// The atlas image could not be encoded.
    Png(png::EncodingError),

    /// An output file could not be written.
    WriteOutput { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::ReadInput { path, source } => {
                write!(f, "failed to read {:?}: {}", path, source)
            }
            AtlasError::FontParse(err) => write!(f, "failed to parse font: {}", err),
            AtlasError::AtlasOverflow {
                width,
                height,
                font_size,
            } => {
                write!(
                    f,
                    "glyphs at font size {} do not fit into a {}x{} texture",
                    font_size, width, height
                )
            }
            AtlasError::InvalidOptions(msg) => write!(f, "invalid options: {}", msg),
            AtlasError::Png(err) => write!(f, "failed to encode atlas image: {}", err),
            AtlasError::WriteOutput { path, source } => {
                write!(f, "failed to write {:?}: {}", path, source)
            }
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::ReadInput { source, .. } | AtlasError::WriteOutput { source, .. } => {
                Some(source)
            }
            AtlasError::FontParse(err) => Some(err),
            AtlasError::Png(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FaceParsingError> for AtlasError {
    fn from(err: FaceParsingError) -> Self {
        AtlasError::FontParse(err)
    }
}

impl From<png::EncodingError> for AtlasError {
    fn from(err: png::EncodingError) -> Self {
        AtlasError::Png(err)
    }
}

pub type AtlasResult<T> = Result<T, AtlasError>;
