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

use ab_glyph_rasterizer::{point, Point};
use async_trait::async_trait;
use bytes::Buf;
use owned_ttf_parser::{name_id, AsFaceRef, Face, GlyphId, OutlineBuilder, OwnedFace, Tag};
use tracing::debug;

use crate::bitmap::{Color, GlyphBitmap};
use crate::error::AtlasResult;
use crate::metrics::{GlyphMetrics, HMetrics, RectF, VMetrics};
use crate::rasterizer::{CodePoint, Rasterizer, SvgRender, SvgRenderContext};

const HHEA: Tag = Tag::from_bytes(b"hhea");

/// A [Rasterizer] over a TrueType/OpenType face.
///
/// Outline glyphs are rendered with coverage anti-aliasing. Fonts with an
/// `SVG ` table hand each glyph's document to the installed [SvgRender] hook;
/// glyphs the hook can't handle fall back to their outline, drawn into the
/// same em box.
pub struct TtfRasterizer {
    face: OwnedFace,
    h_metrics: HMetrics,
    svg_render: Option<Box<dyn SvgRender>>,
}

impl TtfRasterizer {
    pub fn from_vec(data: Vec<u8>) -> AtlasResult<Self> {
        let face = OwnedFace::from_vec(data, 0)?;
        let h_metrics = face
            .as_face_ref()
            .raw_face()
            .table(HHEA)
            .and_then(parse_hhea)
            .unwrap_or_default();

        Ok(Self {
            face,
            h_metrics,
            svg_render: None,
        })
    }

    /// Installs the renderer used for glyphs stored as SVG documents.
    pub fn with_svg_render(mut self, render: impl SvgRender + 'static) -> Self {
        self.svg_render = Some(Box::new(render));
        self
    }

    /// The face's full name from the `name` table, if it has a Unicode one.
    pub fn full_name(&self) -> Option<String> {
        self.face()
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::FULL_NAME)
            .find_map(|name| name.to_string())
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn glyph(&self, code_point: CodePoint) -> Option<GlyphId> {
        char::from_u32(code_point).and_then(|c| self.face().glyph_index(c))
    }

    fn svg_document(&self, glyph: GlyphId) -> Option<&[u8]> {
        self.face().glyph_svg_image(glyph)
    }

    fn svg_context(
        &self,
        glyph: GlyphId,
        scale: f32,
        foreground: Color,
        background: Color,
    ) -> SvgRenderContext {
        SvgRenderContext {
            font_size: (scale * self.units_per_em() as f32).round() as u32,
            units_per_em: self.units_per_em(),
            v_metrics: self.font_v_metrics(),
            advance_width: self.face().glyph_hor_advance(glyph).unwrap_or(0),
            foreground,
            background,
        }
    }

    /// Integer pixel box of an outline glyph, y down from the baseline.
    fn outline_box(&self, glyph: GlyphId, x_scale: f32, y_scale: f32, x_shift: f32, y_shift: f32) -> RectF {
        match self.face().glyph_bounding_box(glyph) {
            Some(bbox) => RectF::new(
                (bbox.x_min as f32 * x_scale + x_shift).floor(),
                (-bbox.y_max as f32 * y_scale + y_shift).floor(),
                (bbox.x_max as f32 * x_scale + x_shift).ceil(),
                (-bbox.y_min as f32 * y_scale + y_shift).ceil(),
            ),
            None => RectF::default(),
        }
    }

    /// Draws `glyph`'s outline into a `width` x `height` bitmap, mapping
    /// design point (x, y) to pixel (x * scale + dx, dy - y * scale).
    fn draw_outline(
        &self,
        glyph: GlyphId,
        (width, height): (u32, u32),
        transform: OutlineTransform,
        foreground: Color,
        background: Color,
    ) -> Option<GlyphBitmap> {
        if width == 0 || height == 0 {
            return None;
        }

        let mut raster = OutlineRaster::new(width, height, transform);
        self.face().outline_glyph(glyph, &mut raster)?;

        let mut bitmap = GlyphBitmap::solid(width, height, background);
        raster.rasterizer.for_each_pixel_2d(|x, y, coverage| {
            if coverage > 0.0 {
                bitmap.set(x, y, foreground.with_coverage(coverage).over(background));
            }
        });

        Some(bitmap)
    }
}

#[async_trait]
impl Rasterizer for TtfRasterizer {
    async fn rasterize(
        &self,
        code_point: CodePoint,
        scale: f32,
        foreground: Color,
        background: Color,
    ) -> Option<GlyphBitmap> {
        let glyph = self.glyph(code_point)?;

        if self.is_svg() {
            let context = self.svg_context(glyph, scale, foreground, background);
            if let (Some(render), Some(document)) = (&self.svg_render, self.svg_document(glyph)) {
                match render.render(document, code_point, glyph.0, &context).await {
                    Some(mut bitmap) => {
                        bitmap.is_color = true;
                        return Some(bitmap);
                    }
                    None => debug!("SVG renderer declined glyph {}", glyph.0),
                }
            }

            let transform = OutlineTransform {
                scale: context.scale(),
                dx: 0.0,
                dy: context.baseline(),
            };

            return self.draw_outline(glyph, context.box_size(), transform, foreground, background);
        }

        let rect = self.outline_box(glyph, scale, scale, 0.0, 0.0);
        let transform = OutlineTransform {
            scale,
            dx: -rect.left,
            dy: -rect.top,
        };

        let size = (rect.width() as u32, rect.height() as u32);
        self.draw_outline(glyph, size, transform, foreground, background)
    }

    fn glyph_metrics(
        &self,
        code_point: CodePoint,
        x_scale: f32,
        y_scale: f32,
        x_shift: f32,
        y_shift: f32,
    ) -> GlyphMetrics {
        let Some(glyph) = self.glyph(code_point) else {
            return GlyphMetrics::default();
        };

        let face = self.face();
        let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * x_scale;
        let bounds = if self.is_svg() {
            let context = self.svg_context(glyph, x_scale, Color::WHITE, Color::TRANSPARENT);
            let (width, height) = context.box_size();
            RectF::new(x_shift, y_shift, width as f32 + x_shift, height as f32 + y_shift)
        } else {
            self.outline_box(glyph, x_scale, y_scale, x_shift, y_shift)
        };

        GlyphMetrics {
            bounds,
            left_side_bearing: face.glyph_hor_side_bearing(glyph).unwrap_or(0) as f32 * x_scale,
            top_side_bearing: bounds.top,
            advance_width: advance,
            advance_height: bounds.height(),
        }
    }

    fn font_v_metrics(&self) -> VMetrics {
        let face = self.face();
        VMetrics {
            ascent: face.ascender() as i32,
            descent: face.descender() as i32,
            line_gap: face.line_gap() as i32,
        }
    }

    fn font_h_metrics(&self) -> HMetrics {
        self.h_metrics
    }

    fn kerning(&self, first: CodePoint, second: CodePoint, scale: f32) -> i16 {
        let (Some(first), Some(second)) = (self.glyph(first), self.glyph(second)) else {
            return 0;
        };

        let Some(kern) = self.face().tables().kern.as_ref() else {
            return 0;
        };

        kern.subtables
            .into_iter()
            .filter(|st| st.horizontal && !st.variable)
            .find_map(|st| st.glyphs_kerning(first, second))
            .map(|amount| (amount as f32 * scale).round() as i16)
            .unwrap_or(0)
    }

    fn units_per_em(&self) -> u16 {
        self.face().units_per_em()
    }

    fn is_svg(&self) -> bool {
        self.face().tables().svg.is_some()
    }

    fn scale_in_pixels(&self, height: f32) -> f32 {
        let VMetrics {
            ascent, descent, ..
        } = self.font_v_metrics();
        height / (ascent - descent).max(1) as f32
    }

    fn font_bounds(&self) -> RectF {
        let bbox = self.face().global_bounding_box();
        RectF::new(
            bbox.x_min as f32,
            -bbox.y_max as f32,
            bbox.x_max as f32,
            -bbox.y_min as f32,
        )
    }
}

/// Reads advanceWidthMax, minLeftSideBearing, minRightSideBearing, and
/// xMaxExtent from a raw `hhea` table.
fn parse_hhea(table: &[u8]) -> Option<HMetrics> {
    let mut buf = table.get(10..18)?;
    Some(HMetrics {
        advance_width_max: buf.get_u16() as i32,
        min_left_side_bearing: buf.get_i16() as i32,
        min_right_side_bearing: buf.get_i16() as i32,
        x_max_extent: buf.get_i16() as i32,
    })
}

#[derive(Copy, Clone, Debug)]
struct OutlineTransform {
    scale: f32,
    dx: f32,
    dy: f32,
}

/// Feeds a glyph outline into a coverage rasterizer.
struct OutlineRaster {
    rasterizer: ab_glyph_rasterizer::Rasterizer,
    transform: OutlineTransform,
    first_point: Point,
    last_point: Point,
}

impl OutlineRaster {
    fn new(width: u32, height: u32, transform: OutlineTransform) -> Self {
        Self {
            rasterizer: ab_glyph_rasterizer::Rasterizer::new(width as usize, height as usize),
            transform,
            first_point: point(0.0, 0.0),
            last_point: point(0.0, 0.0),
        }
    }

    fn point(&self, x: f32, y: f32) -> Point {
        let t = self.transform;
        point(x * t.scale + t.dx, t.dy - y * t.scale)
    }
}

impl OutlineBuilder for OutlineRaster {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.first_point = p;
        self.last_point = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.rasterizer.draw_line(self.last_point, p);
        self.last_point = p;
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p1 = self.point(x1, y1);
        let p = self.point(x, y);
        self.rasterizer.draw_quad(self.last_point, p1, p);
        self.last_point = p;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p1 = self.point(x1, y1);
        let p2 = self.point(x2, y2);
        let p = self.point(x, y);
        self.rasterizer.draw_cubic(self.last_point, p1, p2, p);
        self.last_point = p;
    }

    fn close(&mut self) {
        if self.last_point != self.first_point {
            self.rasterizer.draw_line(self.last_point, self.first_point);
        }

        self.last_point = self.first_point;
    }
}
