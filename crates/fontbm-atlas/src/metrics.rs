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

use crate::rasterizer::Rasterizer;

/// An axis-aligned rectangle in floating-point coordinates, y pointing down.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RectF {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl RectF {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.left * factor,
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
        )
    }
}

/// Per-glyph metrics. Whether `bounds` is in design units or pixels depends on
/// the scale it was queried with.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    pub bounds: RectF,
    pub left_side_bearing: f32,
    pub top_side_bearing: f32,
    pub advance_width: f32,
    pub advance_height: f32,
}

/// Vertical font metrics in design units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VMetrics {
    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,
}

/// Horizontal font metrics in design units, as stored in the `hhea` table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HMetrics {
    pub advance_width_max: i32,
    pub min_left_side_bearing: i32,
    pub min_right_side_bearing: i32,
    pub x_max_extent: i32,
}

/// Font-wide metrics normalized to a requested pixel size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FontMetrics {
    /// The requested font size in pixels.
    pub font_size: u32,

    /// Supersampling factor for distance-field output. Always 1 for now.
    pub sdf_scale: u32,

    /// `font_size * sdf_scale`.
    pub height: u32,

    /// Design units to pixels.
    pub scale: f32,

    pub ascent: i32,
    pub descent: i32,
    pub line_gap: i32,

    /// `height - round(ascent * scale)`.
    pub baseline: i32,

    /// `ceil((ascent - descent + line_gap) * scale)`.
    pub line_height: i32,

    pub advance_width_max: i32,
    pub min_left_side_bearing: i32,
    pub min_right_side_bearing: i32,
    pub x_max_extent: i32,
}

impl FontMetrics {
    /// Derives the metrics of `rasterizer`'s font at `font_size` pixels.
    ///
    /// Outline fonts scale so that ascent to descent spans the requested
    /// height; SVG fonts are laid out in design space, so their scale maps one
    /// em to the font size.
    pub fn compute(rasterizer: &dyn Rasterizer, font_size: u32) -> Self {
        let sdf_scale = 1;
        let height = font_size * sdf_scale;
        let scale = if rasterizer.is_svg() {
            font_size as f32 / rasterizer.units_per_em().max(1) as f32
        } else {
            rasterizer.scale_in_pixels(height as f32)
        };

        let VMetrics {
            ascent,
            descent,
            line_gap,
        } = rasterizer.font_v_metrics();
        let h = rasterizer.font_h_metrics();

        Self {
            font_size,
            sdf_scale,
            height,
            scale,
            ascent,
            descent,
            line_gap,
            baseline: height as i32 - (ascent as f32 * scale).round() as i32,
            line_height: ((ascent - descent + line_gap) as f32 * scale).ceil() as i32,
            advance_width_max: h.advance_width_max,
            min_left_side_bearing: h.min_left_side_bearing,
            min_right_side_bearing: h.min_right_side_bearing,
            x_max_extent: h.x_max_extent,
        }
    }

    /// Distance in pixels from the top of the line box to the baseline.
    pub fn ascent_px(&self) -> i32 {
        (self.ascent as f32 * self.scale).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::mock::MockRasterizer;

    #[test]
    fn rect_dimensions() {
        let rect = RectF::new(-1.0, -10.0, 7.0, 2.0);
        assert_eq!(rect.width(), 8.0);
        assert_eq!(rect.height(), 12.0);
        assert!(!rect.is_empty());
        assert!(RectF::new(3.0, 3.0, 3.0, 8.0).is_empty());
        assert_eq!(RectF::new(5.0, 0.0, 1.0, 1.0).width(), 0.0);
        assert_eq!(rect.scale(0.5), RectF::new(-0.5, -5.0, 3.5, 1.0));
    }

    #[test]
    fn outline_metrics() {
        // ascent 800, descent -200, gap 90: 1000 units span the pixel height
        let mock = MockRasterizer::new();
        let metrics = FontMetrics::compute(&mock, 20);
        assert_eq!(metrics.height, 20);
        assert_eq!(metrics.sdf_scale, 1);
        assert!((metrics.scale - 0.02).abs() < 1e-6);
        assert_eq!(metrics.ascent_px(), 16);
        assert_eq!(metrics.baseline, 4);
        // (800 + 200 + 90) * 0.02 = 21.8
        assert_eq!(metrics.line_height, 22);
        assert_eq!(metrics.advance_width_max, 1100);
    }

    #[test]
    fn line_height_rounds_up() {
        let mut mock = MockRasterizer::new();
        mock.v_metrics = VMetrics {
            ascent: 750,
            descent: -250,
            line_gap: 0,
        };
        // exactly 1000 units: no rounding needed
        assert_eq!(FontMetrics::compute(&mock, 16).line_height, 16);

        mock.v_metrics.line_gap = 1;
        assert_eq!(FontMetrics::compute(&mock, 16).line_height, 17);
    }

    #[test]
    fn svg_metrics_use_units_per_em() {
        let mut mock = MockRasterizer::new();
        mock.svg = true;
        mock.units_per_em = 2048;
        let metrics = FontMetrics::compute(&mock, 128);
        assert!((metrics.scale - 0.0625).abs() < 1e-6);
        assert_eq!(metrics.baseline, 128 - 50);
    }
}
