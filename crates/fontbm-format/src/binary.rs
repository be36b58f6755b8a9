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

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::*;

/// The first three bytes of every binary descriptor.
pub const MAGIC: [u8; 3] = *b"BMF";

/// The only binary version this crate reads and writes.
pub const VERSION: u8 = 3;

/// Packed size of the fixed part of the `info` block.
pub const INFO_SIZE: usize = 14;

/// Packed size of the `common` block.
pub const COMMON_SIZE: usize = 15;

/// Packed size of one `chars` record.
pub const CHAR_SIZE: usize = 20;

/// Packed size of one kerning pair record.
pub const KERN_PAIR_SIZE: usize = 10;

/// Block type tags in file order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockType {
    Info = 1,
    Common = 2,
    Pages = 3,
    Chars = 4,
    KerningPairs = 5,
}

impl TryFrom<u8> for BlockType {
    type Error = FormatError;

    fn try_from(other: u8) -> FormatResult<Self> {
        use BlockType::*;
        match other {
            1 => Ok(Info),
            2 => Ok(Common),
            3 => Ok(Pages),
            4 => Ok(Chars),
            5 => Ok(KerningPairs),
            other => Err(FormatError::UnknownBlock(other)),
        }
    }
}

impl FontInfo {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_i16_le(self.font_size);
        buf.put_u8(self.flags.bits());
        buf.put_u8(self.char_set);
        buf.put_u16_le(self.stretch_h);
        buf.put_u8(self.aa);
        buf.put_u8(self.padding_up);
        buf.put_u8(self.padding_right);
        buf.put_u8(self.padding_down);
        buf.put_u8(self.padding_left);
        buf.put_u8(self.spacing_horiz);
        buf.put_u8(self.spacing_vert);
        buf.put_u8(self.outline);
    }

    fn decode(buf: &mut impl Buf) -> Self {
        Self {
            font_size: buf.get_i16_le(),
            flags: InfoFlags::from_bits_retain(buf.get_u8()),
            char_set: buf.get_u8(),
            stretch_h: buf.get_u16_le(),
            aa: buf.get_u8(),
            padding_up: buf.get_u8(),
            padding_right: buf.get_u8(),
            padding_down: buf.get_u8(),
            padding_left: buf.get_u8(),
            spacing_horiz: buf.get_u8(),
            spacing_vert: buf.get_u8(),
            outline: buf.get_u8(),
        }
    }
}

impl FontCommon {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.line_height);
        buf.put_u16_le(self.base);
        buf.put_u16_le(self.scale_w);
        buf.put_u16_le(self.scale_h);
        buf.put_u16_le(self.pages);
        buf.put_u8(self.flags.bits());
        buf.put_u8(self.alpha_chnl);
        buf.put_u8(self.red_chnl);
        buf.put_u8(self.green_chnl);
        buf.put_u8(self.blue_chnl);
    }

    fn decode(buf: &mut impl Buf) -> Self {
        Self {
            line_height: buf.get_u16_le(),
            base: buf.get_u16_le(),
            scale_w: buf.get_u16_le(),
            scale_h: buf.get_u16_le(),
            pages: buf.get_u16_le(),
            flags: CommonFlags::from_bits_retain(buf.get_u8()),
            alpha_chnl: buf.get_u8(),
            red_chnl: buf.get_u8(),
            green_chnl: buf.get_u8(),
            blue_chnl: buf.get_u8(),
        }
    }
}

impl CharInfo {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.id);
        buf.put_u16_le(self.x);
        buf.put_u16_le(self.y);
        buf.put_u16_le(self.width);
        buf.put_u16_le(self.height);
        buf.put_i16_le(self.x_offset);
        buf.put_i16_le(self.y_offset);
        buf.put_i16_le(self.x_advance);
        buf.put_u8(self.page);
        buf.put_u8(self.chnl);
    }

    fn decode(buf: &mut impl Buf) -> Self {
        Self {
            id: buf.get_u32_le(),
            x: buf.get_u16_le(),
            y: buf.get_u16_le(),
            width: buf.get_u16_le(),
            height: buf.get_u16_le(),
            x_offset: buf.get_i16_le(),
            y_offset: buf.get_i16_le(),
            x_advance: buf.get_i16_le(),
            page: buf.get_u8(),
            chnl: buf.get_u8(),
        }
    }
}

impl KernPair {
    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.first);
        buf.put_u32_le(self.second);
        buf.put_i16_le(self.amount);
    }

    fn decode(buf: &mut impl Buf) -> Self {
        Self {
            first: buf.get_u32_le(),
            second: buf.get_u32_le(),
            amount: buf.get_i16_le(),
        }
    }
}

fn put_block(buf: &mut BytesMut, block: BlockType, payload: impl FnOnce(&mut BytesMut)) {
    let mut body = BytesMut::new();
    payload(&mut body);
    buf.put_u8(block as u8);
    buf.put_u32_le(body.len() as u32);
    buf.put_slice(&body);
}

/// Writes a NUL-terminated string. Interior NULs would end the string early
/// on decode, so they are dropped.
fn put_c_str(buf: &mut impl BufMut, s: &str) {
    for byte in s.bytes().filter(|b| *b != 0) {
        buf.put_u8(byte);
    }

    buf.put_u8(0);
}

/// Reads strings as UTF-8, falling back to Latin-1 for files written by
/// tools that store the face name in an ANSI code page.
fn decode_str(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|b| *b as char).collect(),
    }
}

/// Splits a run of NUL-terminated strings.
fn split_c_strs(block: u8, mut data: &[u8]) -> FormatResult<Vec<String>> {
    let mut strings = Vec::new();
    while !data.is_empty() {
        let end = data
            .iter()
            .position(|b| *b == 0)
            .ok_or(FormatError::Truncated { block: Some(block) })?;
        strings.push(decode_str(&data[..end]));
        data = &data[end + 1..];
    }

    Ok(strings)
}

fn records<T>(
    block: BlockType,
    payload: &[u8],
    size: usize,
    decode: impl Fn(&mut &[u8]) -> T,
) -> FormatResult<Vec<T>> {
    if payload.len() % size != 0 {
        return Err(FormatError::BadBlockSize {
            block: block as u8,
            size: payload.len(),
        });
    }

    let mut buf = payload;
    let mut out = Vec::with_capacity(payload.len() / size);
    while buf.has_remaining() {
        out.push(decode(&mut buf));
    }

    Ok(out)
}

impl BmFont {
    /// Encodes this descriptor in the binary layout. Blocks are written in
    /// type order; the kerning block is left out when there are no pairs.
    pub fn to_binary(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            4 + 5 * 5
                + INFO_SIZE
                + self.face.len()
                + 1
                + COMMON_SIZE
                + self.chars.len() * CHAR_SIZE
                + self.kernings.len() * KERN_PAIR_SIZE,
        );

        buf.put_slice(&MAGIC);
        buf.put_u8(VERSION);

        put_block(&mut buf, BlockType::Info, |b| {
            self.info.encode(b);
            put_c_str(b, &self.face);
        });

        put_block(&mut buf, BlockType::Common, |b| self.common.encode(b));

        put_block(&mut buf, BlockType::Pages, |b| {
            for page in self.pages.iter() {
                put_c_str(b, page);
            }
        });

        put_block(&mut buf, BlockType::Chars, |b| {
            for c in self.chars.iter() {
                c.encode(b);
            }
        });

        if !self.kernings.is_empty() {
            put_block(&mut buf, BlockType::KerningPairs, |b| {
                for pair in self.kernings.iter() {
                    pair.encode(b);
                }
            });
        }

        buf.freeze()
    }

    /// Decodes a binary descriptor.
    pub fn from_binary(data: &[u8]) -> FormatResult<Self> {
        if data.len() < 4 || data[..3] != MAGIC {
            return Err(FormatError::BadMagic);
        }

        if data[3] != VERSION {
            return Err(FormatError::UnsupportedVersion(data[3]));
        }

        let mut buf = &data[4..];
        let mut info = None;
        let mut common = None;
        let mut pages = None;
        let mut chars = None;
        let mut kernings = Vec::new();

        while buf.has_remaining() {
            if buf.remaining() < 5 {
                return Err(FormatError::Truncated { block: None });
            }

            let tag = buf.get_u8();
            let size = buf.get_u32_le() as usize;
            if buf.remaining() < size {
                return Err(FormatError::Truncated { block: Some(tag) });
            }

            let (payload, rest) = buf.split_at(size);
            buf = rest;

            let block = BlockType::try_from(tag)?;
            debug!("Decoding block {:?} ({} bytes)", block, size);
            match block {
                BlockType::Info => {
                    if payload.len() < INFO_SIZE {
                        return Err(FormatError::BadBlockSize { block: tag, size });
                    }

                    let mut fixed = &payload[..INFO_SIZE];
                    let name = &payload[INFO_SIZE..];
                    let end = name
                        .iter()
                        .position(|b| *b == 0)
                        .ok_or(FormatError::Truncated { block: Some(tag) })?;
                    info = Some((FontInfo::decode(&mut fixed), decode_str(&name[..end])));
                }
                BlockType::Common => {
                    if payload.len() != COMMON_SIZE {
                        return Err(FormatError::BadBlockSize { block: tag, size });
                    }

                    let mut fixed = payload;
                    common = Some(FontCommon::decode(&mut fixed));
                }
                BlockType::Pages => pages = Some(split_c_strs(tag, payload)?),
                BlockType::Chars => {
                    chars = Some(records(block, payload, CHAR_SIZE, |b| CharInfo::decode(b))?)
                }
                BlockType::KerningPairs => {
                    kernings = records(block, payload, KERN_PAIR_SIZE, |b| KernPair::decode(b))?
                }
            }
        }

        let (info, face) = info.ok_or(FormatError::MissingBlock(BlockType::Info as u8))?;
        let common = common.ok_or(FormatError::MissingBlock(BlockType::Common as u8))?;
        let pages = pages.ok_or(FormatError::MissingBlock(BlockType::Pages as u8))?;
        let chars = chars.ok_or(FormatError::MissingBlock(BlockType::Chars as u8))?;

        Ok(Self {
            face,
            info,
            common,
            pages,
            chars,
            kernings,
        })
    }
}
