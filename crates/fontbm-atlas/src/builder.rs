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

use fontbm_format::{BmFont, CharInfo, FontCommon, FontInfo, KernPair};
use tracing::debug;

use crate::catalog::Glyph;
use crate::layout::Layout;
use crate::options::Options;
use crate::rasterizer::{Rasterizer, BLANK_CODE_POINT};

/// Every channel of the texture carries glyph data.
const ALL_CHANNELS: u8 = 15;

fn saturate_u16(value: i64) -> u16 {
    value.clamp(0, u16::MAX as i64) as u16
}

fn saturate_i16(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Fills in a [BmFont] descriptor from a finished layout.
pub struct BmFontBuilder<'a> {
    name: &'a str,
    options: &'a Options,
    rasterizer: &'a dyn Rasterizer,
}

impl<'a> BmFontBuilder<'a> {
    /// `name` becomes the face name and the stem of the page file name.
    pub fn new(name: &'a str, options: &'a Options, rasterizer: &'a dyn Rasterizer) -> Self {
        Self {
            name,
            options,
            rasterizer,
        }
    }

    pub fn page_name(&self) -> String {
        format!("{}.png", self.name)
    }

    pub fn build(&self, layout: &Layout) -> BmFont {
        let spacing = self.options.spacing.min(u8::MAX as u32) as u8;
        let info = FontInfo {
            font_size: layout.font_size.min(i16::MAX as u32) as i16,
            spacing_horiz: spacing,
            spacing_vert: spacing,
            ..Default::default()
        };

        let common = FontCommon {
            line_height: saturate_u16(layout.metrics.line_height as i64),
            base: saturate_u16(layout.metrics.baseline as i64),
            scale_w: saturate_u16(layout.texture_size.x as i64),
            scale_h: saturate_u16(layout.texture_size.y as i64),
            pages: 1,
            alpha_chnl: 1,
            ..Default::default()
        };

        let chars: Vec<CharInfo> = layout
            .catalog
            .glyphs()
            .iter()
            .filter_map(|glyph| self.char_info(layout, glyph))
            .collect();

        let kernings = if self.rasterizer.is_svg() {
            vec![]
        } else {
            self.kernings(layout)
        };

        debug!(
            "{}: {} chars, {} kerning pairs",
            self.name,
            chars.len(),
            kernings.len()
        );

        BmFont {
            face: self.name.to_string(),
            info,
            common,
            pages: vec![self.page_name()],
            chars,
            kernings,
        }
    }

    /// The descriptor row for a placed glyph, with its extent clipped to
    /// the texture.
    fn char_info(&self, layout: &Layout, glyph: &Glyph) -> Option<CharInfo> {
        let position = glyph.position?;
        let size = glyph.size();
        let texture = layout.texture_size;
        let width = size.x.min(texture.x.saturating_sub(position.x));
        let height = size.y.min(texture.y.saturating_sub(position.y));

        let rect = glyph.rect();
        let metrics = &layout.metrics;
        let is_svg = self.rasterizer.is_svg();

        let y_offset = if is_svg {
            0.0
        } else {
            (metrics.line_height - metrics.baseline) as f32 + rect.top
        };

        let is_blank = self.options.include_blank_char && glyph.code_point == BLANK_CODE_POINT;
        let x_advance = if is_svg && !is_blank && rect.height() > 0.0 {
            rect.width() * layout.font_size as f32 / rect.height()
        } else {
            glyph.metrics.advance_width
        };

        Some(CharInfo {
            id: glyph.code_point,
            x: saturate_u16(position.x as i64),
            y: saturate_u16(position.y as i64),
            width: saturate_u16(width as i64),
            height: saturate_u16(height as i64),
            x_offset: saturate_i16(rect.left),
            y_offset: saturate_i16(y_offset),
            x_advance: saturate_i16(x_advance),
            page: 0,
            chnl: ALL_CHANNELS,
        })
    }

    /// Non-zero kerning for every ordered pair of selected code points.
    fn kernings(&self, layout: &Layout) -> Vec<KernPair> {
        let scale = layout.metrics.scale;
        let code_points: Vec<_> = layout
            .catalog
            .code_points()
            .filter(|cp| !self.options.include_blank_char || *cp != BLANK_CODE_POINT)
            .collect();

        let mut kernings = vec![];
        for &first in code_points.iter() {
            for &second in code_points.iter() {
                let amount = self.rasterizer.kerning(first, second, scale);
                if amount != 0 {
                    kernings.push(KernPair {
                        first,
                        second,
                        amount,
                    });
                }
            }
        }

        kernings
    }
}
