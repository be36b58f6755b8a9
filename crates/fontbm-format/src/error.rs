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

/// Errors raised while decoding a binary BMFont descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The file does not start with `BMF`.
    BadMagic,

    /// The file is a BMFont binary, but not version 3.
    UnsupportedVersion(u8),

    /// The data ended in the middle of a block header or payload.
    Truncated { block: Option<u8> },

    /// A block type outside of 1..=5.
    UnknownBlock(u8),

    /// A block whose size doesn't fit its record layout.
    BadBlockSize { block: u8, size: usize },

    /// A required block never appeared.
    MissingBlock(u8),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadMagic => write!(f, "invalid font header"),
            FormatError::UnsupportedVersion(version) => {
                write!(f, "unsupported BMFont binary version: {}", version)
            }
            FormatError::Truncated { block: Some(block) } => {
                write!(f, "truncated data in block {}", block)
            }
            FormatError::Truncated { block: None } => write!(f, "truncated block header"),
            FormatError::UnknownBlock(block) => write!(f, "invalid font block type: {}", block),
            FormatError::BadBlockSize { block, size } => {
                write!(f, "block {} has invalid size {}", block, size)
            }
            FormatError::MissingBlock(block) => write!(f, "missing required block {}", block),
        }
    }
}

impl std::error::Error for FormatError {}

pub type FormatResult<T> = Result<T, FormatError>;
