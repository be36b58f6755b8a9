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

use glam::{UVec2, Vec2};
use tracing::debug;

use crate::catalog::GlyphCatalog;
use crate::error::{AtlasError, AtlasResult};
use crate::metrics::FontMetrics;
use crate::options::{AutoSize, Options};
use crate::rasterizer::{CodePoint, Rasterizer};

/// Starting texture size when auto-sizing the texture.
pub const INITIAL_TEXTURE_SIZE: u32 = 64;

/// Largest texture side auto-sizing will grow to.
pub const MAX_TEXTURE_SIZE: u32 = 16384;

/// The outcome of a layout: every glyph with its atlas position, at the
/// effective font size and texture size.
#[derive(Debug)]
pub struct Layout {
    pub catalog: GlyphCatalog,
    pub metrics: FontMetrics,
    pub texture_size: UVec2,
    pub font_size: u32,
}

/// Chooses atlas positions for a font's glyphs, shrinking the font or
/// growing the texture as [Options::auto_size] asks.
pub struct AtlasLayoutEngine<'a> {
    rasterizer: &'a dyn Rasterizer,
    options: &'a Options,
    code_points: Vec<CodePoint>,
}

impl<'a> AtlasLayoutEngine<'a> {
    pub fn new(rasterizer: &'a dyn Rasterizer, options: &'a Options) -> AtlasResult<Self> {
        options.validate()?;
        let code_points = options
            .char_selection()
            .code_points(options.include_blank_char)?;

        Ok(Self {
            rasterizer,
            options,
            code_points,
        })
    }

    pub fn code_points(&self) -> &[CodePoint] {
        &self.code_points
    }

    pub async fn run(&self) -> AtlasResult<Layout> {
        if self.options.no_packing {
            self.layout_grid().await
        } else {
            self.layout_packed().await
        }
    }

    fn initial_texture_size(&self) -> UVec2 {
        match self.options.auto_size {
            AutoSize::Texture => UVec2::splat(INITIAL_TEXTURE_SIZE),
            _ => self.options.texture_size.as_uvec2(),
        }
    }

    async fn populate(&self, code_points: &[CodePoint], font_size: u32) -> (FontMetrics, GlyphCatalog) {
        let metrics = FontMetrics::compute(self.rasterizer, font_size);
        let catalog = GlyphCatalog::populate(
            code_points,
            self.options.include_blank_char,
            &metrics,
            self.rasterizer,
            self.options.color,
            self.options.background_color,
        )
        .await;

        (metrics, catalog)
    }

    async fn layout_packed(&self) -> AtlasResult<Layout> {
        let mut texture_size = self.initial_texture_size();
        let mut font_size = self.options.font_size;
        let (mut metrics, mut catalog) = self.populate(&self.code_points, font_size).await;
        catalog.sort_by_area();

        while !self.pack(&mut catalog, texture_size) {
            match self.options.auto_size {
                AutoSize::None => return Err(overflow(texture_size, font_size)),
                AutoSize::Texture => {
                    texture_size = grow(texture_size, font_size)?;
                    debug!("Growing texture to {}x{}", texture_size.x, texture_size.y);
                }
                AutoSize::Font => {
                    font_size = shrink(texture_size, font_size)?;
                    debug!("Shrinking font to {}px", font_size);
                    (metrics, catalog) = self.populate(&self.code_points, font_size).await;
                    catalog.sort_by_area();
                }
            }
        }

        Ok(Layout {
            catalog,
            metrics,
            texture_size,
            font_size,
        })
    }

    /// Packs every glyph in area order with a fresh packer, reserving
    /// `spacing` pixels right of and below each one. Glyphs without pixels
    /// go to the origin.
    fn pack(&self, catalog: &mut GlyphCatalog, texture_size: UVec2) -> bool {
        let spacing = self.options.spacing;
        let mut packer = self.options.packer.create(texture_size.x, texture_size.y);
        let order = catalog.sorted().to_vec();
        catalog.clear_positions();

        for index in order {
            let glyph = &mut catalog.glyphs_mut()[index];
            let size = glyph.size();
            if size.x == 0 || size.y == 0 {
                glyph.position = Some(UVec2::ZERO);
                continue;
            }

            match packer.pack(size.x + spacing, size.y + spacing) {
                Some(position) => glyph.position = Some(position),
                None => return false,
            }
        }

        true
    }

    /// Bounding size of the largest glyph at `font_size`.
    fn max_glyph_size(&self, font_size: u32) -> Vec2 {
        if self.rasterizer.is_svg() {
            let scale = font_size as f32 / self.rasterizer.units_per_em().max(1) as f32;
            let bounds = self.rasterizer.font_bounds().scale(scale);
            Vec2::new(bounds.width(), bounds.height())
        } else {
            Vec2::splat(font_size as f32)
        }
    }

    async fn layout_grid(&self) -> AtlasResult<Layout> {
        let grid = self.options.grid_size.as_uvec2();
        let char_count = (grid.x * grid.y) as usize;
        let code_points = &self.code_points[..self.code_points.len().min(char_count)];
        if code_points.len() < self.code_points.len() {
            debug!(
                "Grid holds {} glyphs, ignoring {} code points",
                char_count,
                self.code_points.len() - char_count
            );
        }

        let mut texture_size = self.initial_texture_size();
        let mut font_size = self.options.font_size;
        let mut max_glyph_size = self.max_glyph_size(font_size);
        let mut cell_size = texture_size.as_vec2() / grid.as_vec2();

        let overflows = |glyph: Vec2, cell: Vec2| glyph.x > cell.x || glyph.y > cell.y;
        match self.options.auto_size {
            AutoSize::None => {}
            AutoSize::Texture => {
                while overflows(max_glyph_size, cell_size) {
                    texture_size = grow(texture_size, font_size)?;
                    cell_size = texture_size.as_vec2() / grid.as_vec2();
                    debug!("Growing texture to {}x{}", texture_size.x, texture_size.y);
                }
            }
            AutoSize::Font => {
                while overflows(max_glyph_size, cell_size) {
                    font_size = shrink(texture_size, font_size)?;
                    max_glyph_size = self.max_glyph_size(font_size);
                    debug!("Shrinking font to {}px", font_size);
                }
            }
        }

        let (metrics, mut catalog) = self.populate(code_points, font_size).await;
        let is_svg = self.rasterizer.is_svg();
        let ascent = metrics.height as f32 - metrics.baseline as f32;

        for (index, glyph) in catalog.glyphs_mut().iter_mut().enumerate() {
            let index = index as u32;
            let cell = UVec2::new(index % grid.x, index / grid.x).as_vec2() * cell_size;
            let size = glyph.size().as_vec2();

            let x = (cell.x + (cell_size.x - size.x) / 2.0).max(0.0);
            let y = if is_svg {
                cell.y
            } else {
                (cell.y + ascent + glyph.rect().top).max(0.0)
            };

            glyph.position = Some(Vec2::new(x, y).as_uvec2());
        }

        Ok(Layout {
            catalog,
            metrics,
            texture_size,
            font_size,
        })
    }
}

fn overflow(texture_size: UVec2, font_size: u32) -> AtlasError {
    AtlasError::AtlasOverflow {
        width: texture_size.x,
        height: texture_size.y,
        font_size,
    }
}

/// Next texture size in the 1:1, 1:2, 2:2, 2:4 ... sequence.
fn grow(texture_size: UVec2, font_size: u32) -> AtlasResult<UVec2> {
    let next = if texture_size.x == texture_size.y {
        UVec2::new(texture_size.x, texture_size.y * 2)
    } else {
        UVec2::new(texture_size.x * 2, texture_size.y)
    };

    if next.max_element() > MAX_TEXTURE_SIZE {
        return Err(overflow(texture_size, font_size));
    }

    Ok(next)
}

fn shrink(texture_size: UVec2, font_size: u32) -> AtlasResult<u32> {
    match font_size {
        0 | 1 => Err(overflow(texture_size, font_size)),
        size => Ok(size - 1),
    }
}
