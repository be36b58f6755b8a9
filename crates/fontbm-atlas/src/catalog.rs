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

use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::PathBuf;

use glam::UVec2;
use tracing::debug;

use crate::bitmap::{Color, GlyphBitmap};
use crate::error::{AtlasError, AtlasResult};
use crate::metrics::{FontMetrics, GlyphMetrics, RectF};
use crate::rasterizer::{blank_glyph, CodePoint, Rasterizer, BLANK_CODE_POINT};

/// Which code points go into the atlas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CharSelection {
    /// An inclusive range of code points.
    Range { start: CodePoint, end: CodePoint },

    /// Every character of a string.
    Text(String),

    /// Every non-control character of a UTF-8 text file.
    File(PathBuf),
}

impl Default for CharSelection {
    fn default() -> Self {
        CharSelection::Range { start: 32, end: 126 }
    }
}

impl CharSelection {
    /// Resolves the selection into code points in first-occurrence order,
    /// optionally followed by the blank glyph.
    pub fn code_points(&self, include_blank: bool) -> AtlasResult<Vec<CodePoint>> {
        let mut code_points: Vec<CodePoint> = match self {
            CharSelection::Range { start, end } => {
                if start > end {
                    return Err(AtlasError::InvalidOptions(format!(
                        "character range {}-{} is empty",
                        start, end
                    )));
                }

                (*start..=*end).collect()
            }
            CharSelection::Text(text) => text.chars().map(CodePoint::from).collect(),
            CharSelection::File(path) => std::fs::read_to_string(path)
                .map_err(|source| AtlasError::ReadInput {
                    path: path.clone(),
                    source,
                })?
                .chars()
                .filter(|c| !c.is_control())
                .map(CodePoint::from)
                .collect(),
        };

        if include_blank {
            code_points.push(BLANK_CODE_POINT);
        }

        let mut seen = HashSet::new();
        code_points.retain(|cp| seen.insert(*cp));
        Ok(code_points)
    }
}

/// One code point's metrics and bitmap, plus its atlas position once laid out.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub code_point: CodePoint,

    /// Pixel-space metrics at the scale the bitmap was rendered with. The
    /// bounds are relative to the pen position on the baseline, y down.
    pub metrics: GlyphMetrics,
    pub bitmap: GlyphBitmap,
    pub position: Option<UVec2>,
}

impl Glyph {
    pub fn rect(&self) -> RectF {
        self.metrics.bounds
    }

    /// Whole-pixel size of the glyph's rectangle.
    pub fn size(&self) -> UVec2 {
        let rect = self.rect();
        UVec2::new(rect.width().ceil() as u32, rect.height().ceil() as u32)
    }

    pub fn area(&self) -> u64 {
        let size = self.size();
        size.x as u64 * size.y as u64
    }
}

/// The glyphs of one font at one size, in selection order.
#[derive(Clone, Debug, Default)]
pub struct GlyphCatalog {
    glyphs: Vec<Glyph>,
    sorted: Vec<usize>,
}

impl GlyphCatalog {
    /// Measures and rasterizes every code point at `metrics.scale`.
    ///
    /// Glyphs the rasterizer can't produce are kept with an empty bitmap and
    /// zero-area bounds so that they still get an advance in the descriptor.
    /// [BLANK_CODE_POINT] becomes the solid blank glyph only when
    /// `include_blank` is set; otherwise the font is asked for it like any
    /// other code point.
    pub async fn populate(
        code_points: &[CodePoint],
        include_blank: bool,
        metrics: &FontMetrics,
        rasterizer: &dyn Rasterizer,
        foreground: Color,
        background: Color,
    ) -> Self {
        let scale = metrics.scale;
        let mut glyphs = Vec::with_capacity(code_points.len());

        for &code_point in code_points {
            if include_blank && code_point == BLANK_CODE_POINT {
                let (metrics, bitmap) = blank_glyph();
                glyphs.push(Glyph {
                    code_point,
                    metrics,
                    bitmap,
                    position: None,
                });
                continue;
            }

            let mut glyph_metrics = rasterizer.glyph_metrics(code_point, scale, scale, 0.0, 0.0);
            let bitmap = rasterizer
                .rasterize(code_point, scale, foreground, background)
                .await
                .filter(|bitmap| !bitmap.is_empty());

            let bitmap = match bitmap {
                Some(bitmap) => {
                    // the bitmap is authoritative for the glyph's extent
                    let bounds = &mut glyph_metrics.bounds;
                    bounds.right = bounds.left + bitmap.width as f32;
                    bounds.bottom = bounds.top + bitmap.height as f32;
                    bitmap
                }
                None => {
                    debug!("No bitmap for code point U+{:04X}", code_point);
                    glyph_metrics.bounds = RectF::default();
                    GlyphBitmap::empty()
                }
            };

            glyphs.push(Glyph {
                code_point,
                metrics: glyph_metrics,
                bitmap,
                position: None,
            });
        }

        let sorted = (0..glyphs.len()).collect();
        Self { glyphs, sorted }
    }

    /// Orders glyph indices by descending area, keeping selection order
    /// among equal areas.
    pub fn sort_by_area(&mut self) {
        let glyphs = &self.glyphs;
        self.sorted = (0..glyphs.len()).collect();
        self.sorted.sort_by_key(|&index| Reverse(glyphs[index].area()));
    }

    /// Glyph indices in packing order.
    pub fn sorted(&self) -> &[usize] {
        &self.sorted
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut [Glyph] {
        &mut self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn code_points(&self) -> impl Iterator<Item = CodePoint> + '_ {
        self.glyphs.iter().map(|glyph| glyph.code_point)
    }

    pub fn clear_positions(&mut self) {
        for glyph in self.glyphs.iter_mut() {
            glyph.position = None;
        }
    }

    /// Glyphs that have been given an atlas position.
    pub fn placed(&self) -> impl Iterator<Item = (&Glyph, UVec2)> {
        self.glyphs
            .iter()
            .filter_map(|glyph| glyph.position.map(|position| (glyph, position)))
    }

    /// Drops all bitmaps once they've been composited.
    pub fn release_bitmaps(&mut self) {
        for glyph in self.glyphs.iter_mut() {
            glyph.bitmap = GlyphBitmap::empty();
        }
    }
}
