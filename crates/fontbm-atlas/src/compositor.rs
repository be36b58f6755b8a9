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

use glam::UVec2;
use png::{BitDepth, ColorType, Encoder};
use tracing::debug;

use crate::bitmap::{Color, GlyphBitmap};
use crate::catalog::GlyphCatalog;
use crate::error::AtlasResult;

/// The composited atlas page, row-major RGBA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
    pub background: Color,
}

impl AtlasBitmap {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            background,
        }
    }

    /// Composites every placed glyph of `catalog` into a fresh atlas.
    pub fn compose(catalog: &GlyphCatalog, size: UVec2, background: Color) -> Self {
        let mut atlas = Self::new(size.x, size.y, background);
        for (glyph, position) in catalog.placed() {
            atlas.blit(&glyph.bitmap, position);
        }

        debug!("Composed {}x{} atlas", size.x, size.y);
        atlas
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Draws `src` with its top-left corner at `position`, clipped to the
    /// atlas. Source pixels equal to the background color are skipped; the
    /// rest are composited source-over.
    pub fn blit(&mut self, src: &GlyphBitmap, position: UVec2) {
        if position.x >= self.width || position.y >= self.height {
            return;
        }

        let width = src.width.min(self.width - position.x);
        let height = src.height.min(self.height - position.y);
        for y in 0..height {
            let row = (position.y + y) as usize * self.width as usize;
            for x in 0..width {
                let color = src.get(x, y);
                if color == self.background {
                    continue;
                }

                let dst = &mut self.pixels[row + (position.x + x) as usize];
                *dst = color.over(*dst);
            }
        }
    }

    /// The pixels as tightly packed RGBA bytes.
    pub fn data_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Encodes the atlas as an 8-bit RGBA PNG.
    pub fn to_png(&self) -> AtlasResult<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(self.data_bytes())?;
            writer.finish()?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FontMetrics;
    use crate::rasterizer::mock::MockRasterizer;

    const RED: Color = Color::rgba(255, 0, 0, 255);

    #[test]
    fn starts_with_background() {
        let atlas = AtlasBitmap::new(4, 3, Color::BLACK);
        assert_eq!(atlas.data_bytes().len(), 4 * 3 * 4);
        assert!(atlas.pixels.iter().all(|p| *p == Color::BLACK));
    }

    #[test]
    fn blit_skips_background_pixels() {
        let mut atlas = AtlasBitmap::new(4, 4, Color::BLACK);
        atlas.blit(&GlyphBitmap::solid(2, 2, RED), UVec2::new(1, 1));

        let mut glyph = GlyphBitmap::solid(2, 2, Color::BLACK);
        glyph.set(1, 1, Color::WHITE);
        atlas.blit(&glyph, UVec2::new(0, 0));

        // the black corner of the second glyph didn't erase the red one
        assert_eq!(atlas.get(1, 1), Color::WHITE);
        assert_eq!(atlas.get(2, 2), RED);
        assert_eq!(atlas.get(0, 0), Color::BLACK);
    }

    #[test]
    fn blit_blends_over_existing() {
        let mut atlas = AtlasBitmap::new(1, 1, Color::TRANSPARENT);
        atlas.blit(&GlyphBitmap::solid(1, 1, RED), UVec2::ZERO);
        atlas.blit(
            &GlyphBitmap::solid(1, 1, Color::WHITE.with_coverage(0.5)),
            UVec2::ZERO,
        );

        let pixel = atlas.get(0, 0);
        assert_eq!(pixel.a, 255);
        assert_eq!(pixel.r, 255);
        assert!(pixel.g > 100 && pixel.g < 155);
    }

    #[test]
    fn blit_clips() {
        let mut atlas = AtlasBitmap::new(4, 4, Color::TRANSPARENT);
        atlas.blit(&GlyphBitmap::solid(3, 3, RED), UVec2::new(2, 3));
        atlas.blit(&GlyphBitmap::solid(3, 3, RED), UVec2::new(9, 0));

        let red = atlas.pixels.iter().filter(|p| **p == RED).count();
        assert_eq!(red, 2);
        assert_eq!(atlas.get(3, 3), RED);
    }

    #[tokio::test]
    async fn compose_places_glyphs() {
        let rasterizer = MockRasterizer::new();
        let metrics = FontMetrics::compute(&rasterizer, 20);
        let mut catalog =
            GlyphCatalog::populate(&[65, 66], false, &metrics, &rasterizer, RED, Color::TRANSPARENT).await;
        catalog.glyphs_mut()[0].position = Some(UVec2::new(0, 0));
        catalog.glyphs_mut()[1].position = Some(UVec2::new(20, 10));

        let atlas = AtlasBitmap::compose(&catalog, UVec2::new(32, 32), Color::TRANSPARENT);
        assert_eq!(atlas.get(0, 0), RED);
        assert_eq!(atlas.get(9, 13), RED);
        assert_eq!(atlas.get(10, 0), Color::TRANSPARENT);
        assert_eq!(atlas.get(20, 10), RED);
        assert_eq!(atlas.get(29, 23), RED);
        assert_eq!(atlas.get(30, 23), Color::TRANSPARENT);
    }

    #[test]
    fn png_round_trip() {
        let mut atlas = AtlasBitmap::new(5, 3, Color::rgba(0, 0, 0, 0));
        atlas.blit(&GlyphBitmap::solid(2, 2, Color::rgba(10, 20, 30, 40)), UVec2::new(3, 1));

        let data = atlas.to_png().unwrap();
        let decoder = png::Decoder::new(data.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();

        assert_eq!((info.width, info.height), (5, 3));
        assert_eq!(info.color_type, ColorType::Rgba);
        assert_eq!(info.bit_depth, BitDepth::Eight);
        assert_eq!(&buf[..info.buffer_size()], atlas.data_bytes());
    }
}
