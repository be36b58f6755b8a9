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

use async_trait::async_trait;

use crate::bitmap::{Color, GlyphBitmap};
use crate::metrics::{GlyphMetrics, HMetrics, RectF, VMetrics};

/// A Unicode scalar value. BMFont stores 32-bit IDs.
pub type CodePoint = u32;

/// Reserved code point for the optional solid "blank" glyph.
pub const BLANK_CODE_POINT: CodePoint = 0xFFFE;

/// Width and height of the blank glyph.
pub const BLANK_SIZE: u32 = 8;

/// A source of glyph metrics and glyph bitmaps for one font.
///
/// Metric queries are cheap and synchronous. Rasterization may call out to a
/// nested renderer (SVG documents) and so is asynchronous.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Renders `code_point` at `scale` pixels per design unit. Returns `None`
    /// when the font has nothing to draw for it.
    async fn rasterize(
        &self,
        code_point: CodePoint,
        scale: f32,
        foreground: Color,
        background: Color,
    ) -> Option<GlyphBitmap>;

    /// Glyph metrics under the given scale and shift. With a scale of 1 and
    /// no shift the bounds are in design units (y up is flipped to y down).
    fn glyph_metrics(
        &self,
        code_point: CodePoint,
        x_scale: f32,
        y_scale: f32,
        x_shift: f32,
        y_shift: f32,
    ) -> GlyphMetrics;

    fn font_v_metrics(&self) -> VMetrics;

    fn font_h_metrics(&self) -> HMetrics;

    /// Kerning adjustment between two code points, in pixels at `scale`.
    fn kerning(&self, first: CodePoint, second: CodePoint, scale: f32) -> i16;

    fn units_per_em(&self) -> u16;

    /// Whether glyphs come from an OpenType `SVG ` table.
    fn is_svg(&self) -> bool;

    /// The scale that maps ascent to descent onto `height` pixels.
    fn scale_in_pixels(&self, height: f32) -> f32;

    /// The font-wide bounding box in design units, y down.
    fn font_bounds(&self) -> RectF;
}

/// Everything an [SvgRender] hook needs to place a glyph in its em box.
#[derive(Clone, Debug)]
pub struct SvgRenderContext {
    pub font_size: u32,
    pub units_per_em: u16,
    pub v_metrics: VMetrics,

    /// The glyph's horizontal advance in design units.
    pub advance_width: u16,
    pub foreground: Color,
    pub background: Color,
}

impl SvgRenderContext {
    /// Design units to pixels.
    pub fn scale(&self) -> f32 {
        self.font_size as f32 / self.units_per_em.max(1) as f32
    }

    /// The em box an SVG glyph is drawn into: the advance plus one pixel
    /// wide, the font size tall.
    pub fn box_size(&self) -> (u32, u32) {
        let width = (self.advance_width as f32 * self.scale()).floor() as u32 + 1;
        (width, self.font_size)
    }

    /// Distance from the top of the em box to the baseline, splitting the
    /// box in the ratio of ascent to descent.
    pub fn baseline(&self) -> f32 {
        let span = (self.v_metrics.ascent - self.v_metrics.descent).max(1) as f32;
        self.font_size as f32 * self.v_metrics.ascent as f32 / span
    }
}

/// Hook that renders one glyph's SVG document into a color bitmap.
#[async_trait]
pub trait SvgRender: Send + Sync {
    async fn render(
        &self,
        document: &[u8],
        code_point: CodePoint,
        glyph_index: u16,
        context: &SvgRenderContext,
    ) -> Option<GlyphBitmap>;
}

/// The 8x8 solid white glyph stored at [BLANK_CODE_POINT].
pub fn blank_glyph() -> (GlyphMetrics, GlyphBitmap) {
    let size = BLANK_SIZE as f32;
    let metrics = GlyphMetrics {
        bounds: RectF::new(0.0, 0.0, size, size),
        left_side_bearing: 0.0,
        top_side_bearing: 0.0,
        advance_width: size,
        advance_height: size,
    };

    (
        metrics,
        GlyphBitmap::solid(BLANK_SIZE, BLANK_SIZE, Color::WHITE),
    )
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;

    use super::*;

    /// A font whose glyphs are solid boxes of configurable design-unit size.
    ///
    /// Vertical metrics are 800/-200/90 units with 1000 units per em, so the
    /// outline scale is `height / 1000`. Glyphs without an explicit size are
    /// 500x700 units sitting on the baseline with a 50 unit bearing. Space
    /// (32) has no bitmap.
    pub struct MockRasterizer {
        pub v_metrics: VMetrics,
        pub units_per_em: u16,
        pub svg: bool,
        pub sizes: HashMap<CodePoint, (f32, f32)>,
        pub kerns: HashMap<(CodePoint, CodePoint), f32>,
        pub missing: Vec<CodePoint>,
    }

    impl MockRasterizer {
        pub fn new() -> Self {
            Self {
                v_metrics: VMetrics {
                    ascent: 800,
                    descent: -200,
                    line_gap: 90,
                },
                units_per_em: 1000,
                svg: false,
                sizes: HashMap::new(),
                kerns: HashMap::new(),
                missing: vec![32],
            }
        }

        fn design_size(&self, code_point: CodePoint) -> (f32, f32) {
            self.sizes
                .get(&code_point)
                .copied()
                .unwrap_or((500.0, 700.0))
        }

        fn pixel_box(&self, code_point: CodePoint, scale: f32) -> RectF {
            if self.missing.contains(&code_point) {
                return RectF::default();
            }

            let (w, h) = self.design_size(code_point);
            if self.svg {
                let context = self.context(code_point, scale);
                let (w, h) = context.box_size();
                return RectF::new(0.0, 0.0, w as f32, h as f32);
            }

            RectF::new(
                (50.0 * scale).floor(),
                (-h * scale).floor(),
                ((50.0 + w) * scale).ceil(),
                0.0,
            )
        }

        fn context(&self, code_point: CodePoint, scale: f32) -> SvgRenderContext {
            SvgRenderContext {
                font_size: (scale * self.units_per_em as f32).round() as u32,
                units_per_em: self.units_per_em,
                v_metrics: self.v_metrics,
                advance_width: self.design_size(code_point).0 as u16 + 100,
                foreground: Color::WHITE,
                background: Color::TRANSPARENT,
            }
        }
    }

    #[async_trait]
    impl Rasterizer for MockRasterizer {
        async fn rasterize(
            &self,
            code_point: CodePoint,
            scale: f32,
            foreground: Color,
            _background: Color,
        ) -> Option<GlyphBitmap> {
            let rect = self.pixel_box(code_point, scale);
            if rect.is_empty() {
                return None;
            }

            let mut bitmap =
                GlyphBitmap::solid(rect.width() as u32, rect.height() as u32, foreground);
            bitmap.is_color = self.svg;
            Some(bitmap)
        }

        fn glyph_metrics(
            &self,
            code_point: CodePoint,
            x_scale: f32,
            _y_scale: f32,
            x_shift: f32,
            y_shift: f32,
        ) -> GlyphMetrics {
            let rect = self.pixel_box(code_point, x_scale);
            let advance = (self.design_size(code_point).0 + 100.0) * x_scale;
            GlyphMetrics {
                bounds: RectF::new(
                    rect.left + x_shift,
                    rect.top + y_shift,
                    rect.right + x_shift,
                    rect.bottom + y_shift,
                ),
                left_side_bearing: rect.left,
                top_side_bearing: rect.top,
                advance_width: advance,
                advance_height: rect.height(),
            }
        }

        fn font_v_metrics(&self) -> VMetrics {
            self.v_metrics
        }

        fn font_h_metrics(&self) -> HMetrics {
            HMetrics {
                advance_width_max: 1100,
                min_left_side_bearing: 0,
                min_right_side_bearing: 0,
                x_max_extent: 1050,
            }
        }

        fn kerning(&self, first: CodePoint, second: CodePoint, scale: f32) -> i16 {
            self.kerns
                .get(&(first, second))
                .map(|k| (k * scale).round() as i16)
                .unwrap_or(0)
        }

        fn units_per_em(&self) -> u16 {
            self.units_per_em
        }

        fn is_svg(&self) -> bool {
            self.svg
        }

        fn scale_in_pixels(&self, height: f32) -> f32 {
            height / (self.v_metrics.ascent - self.v_metrics.descent) as f32
        }

        fn font_bounds(&self) -> RectF {
            RectF::new(0.0, -800.0, 1000.0, 200.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_solid_white() {
        let (metrics, bitmap) = blank_glyph();
        assert_eq!(metrics.bounds, RectF::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(metrics.advance_width, 8.0);
        assert_eq!((bitmap.width, bitmap.height), (8, 8));
        assert!(bitmap.pixels.iter().all(|p| *p == Color::WHITE));
    }

    #[test]
    fn svg_context_box() {
        let context = SvgRenderContext {
            font_size: 128,
            units_per_em: 1000,
            v_metrics: VMetrics {
                ascent: 800,
                descent: -200,
                line_gap: 0,
            },
            advance_width: 600,
            foreground: Color::WHITE,
            background: Color::TRANSPARENT,
        };

        assert!((context.scale() - 0.128).abs() < 1e-6);
        // 600 * 0.128 = 76.8
        assert_eq!(context.box_size(), (77, 128));
        assert!((context.baseline() - 102.4).abs() < 1e-3);
    }
}
