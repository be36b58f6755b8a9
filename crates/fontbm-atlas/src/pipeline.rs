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

use std::path::{Path, PathBuf};

use fontbm_format::{BmFont, DataFormat};
use tracing::{debug, info};

use crate::builder::BmFontBuilder;
use crate::compositor::AtlasBitmap;
use crate::error::{AtlasError, AtlasResult};
use crate::layout::AtlasLayoutEngine;
use crate::options::Options;
use crate::rasterizer::Rasterizer;
use crate::ttf::TtfRasterizer;

/// A baked bitmap font: the descriptor and its single atlas page.
#[derive(Clone, Debug)]
pub struct FontBundle {
    pub name: String,
    pub font: BmFont,
    pub atlas: AtlasBitmap,
    pub data_format: DataFormat,
}

impl FontBundle {
    pub fn atlas_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.png", self.name))
    }

    pub fn descriptor_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", self.name, self.data_format.extension()))
    }

    /// Writes the atlas PNG and the descriptor into `output_dir`, creating
    /// it if needed. Both files are encoded before either is written.
    pub async fn save(&self, output_dir: &Path) -> AtlasResult<(PathBuf, PathBuf)> {
        let png = self.atlas.to_png()?;
        let descriptor = self.font.to_bytes(self.data_format);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| AtlasError::WriteOutput {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let atlas_path = self.atlas_path(output_dir);
        let descriptor_path = self.descriptor_path(output_dir);
        for (path, data) in [(&atlas_path, png), (&descriptor_path, descriptor)] {
            tokio::fs::write(path, data)
                .await
                .map_err(|source| AtlasError::WriteOutput {
                    path: path.clone(),
                    source,
                })?;
            debug!("Wrote {:?}", path);
        }

        Ok((atlas_path, descriptor_path))
    }
}

/// Runs layout, descriptor building, and compositing for one font.
pub async fn bake(
    name: &str,
    rasterizer: &dyn Rasterizer,
    options: &Options,
) -> AtlasResult<FontBundle> {
    let engine = AtlasLayoutEngine::new(rasterizer, options)?;
    let mut layout = engine.run().await?;

    if layout.font_size != options.font_size {
        info!(
            "{}: font size reduced from {}px to {}px",
            name, options.font_size, layout.font_size
        );
    }

    let font = BmFontBuilder::new(name, options, rasterizer).build(&layout);
    let atlas = AtlasBitmap::compose(
        &layout.catalog,
        layout.texture_size,
        options.background_color,
    );
    layout.catalog.release_bitmaps();

    Ok(FontBundle {
        name: name.to_string(),
        font,
        atlas,
        data_format: options.data_format,
    })
}

/// Loads a TrueType/OpenType file and bakes it under its file stem.
pub async fn bake_file(path: &Path, options: &Options) -> AtlasResult<FontBundle> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| AtlasError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;

    let rasterizer = TtfRasterizer::from_vec(data)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_string());

    debug!(
        "Loaded {:?} ({})",
        path,
        rasterizer.full_name().as_deref().unwrap_or("unnamed face")
    );

    bake(&name, &rasterizer, options).await
}

#[cfg(test)]
mod tests {
    use glam::UVec2;

    use super::*;
    use crate::bitmap::Color;
    use crate::options::{AutoSize, CharRange, Extent};
    use crate::rasterizer::mock::MockRasterizer;
    use crate::rasterizer::BLANK_CODE_POINT;

    #[tokio::test]
    async fn default_ascii_text() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            auto_size: AutoSize::None,
            font_size: 16,
            ..Default::default()
        };

        let bundle = bake("Mock Sans", &rasterizer, &options).await.unwrap();
        assert_eq!(bundle.font.chars.len(), 95);
        assert_eq!((bundle.atlas.width, bundle.atlas.height), (256, 256));

        let mut text = vec![];
        bundle.font.write_text(&mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.starts_with(
            "info face=\"Mock Sans\" size=16 bold=0 italic=0 charset=\"\" unicode=1 \
             stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0\n"
        ));
    }

    #[tokio::test]
    async fn atlas_matches_char_rows() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            auto_size: AutoSize::None,
            chars: CharRange { start: 65, end: 75 },
            color: Color::rgba(200, 10, 10, 255),
            background_color: Color::BLACK,
            ..Default::default()
        };

        let bundle = bake("Mock", &rasterizer, &options).await.unwrap();
        let atlas = &bundle.atlas;
        assert_eq!(atlas.data_bytes().len(), 256 * 256 * 4);

        let mut covered = 0;
        for c in bundle.font.chars.iter() {
            for y in c.y..c.y + c.height {
                for x in c.x..c.x + c.width {
                    assert_eq!(atlas.get(x as u32, y as u32), options.color);
                    covered += 1;
                }
            }
        }

        let colored = atlas.pixels.iter().filter(|p| **p == options.color).count();
        assert_eq!(colored, covered);
    }

    #[tokio::test]
    async fn blank_region_is_white() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            chars: CharRange { start: 65, end: 70 },
            include_blank_char: true,
            ..Default::default()
        };

        let bundle = bake("Mock", &rasterizer, &options).await.unwrap();
        let blank = bundle
            .font
            .chars
            .iter()
            .find(|c| c.id == BLANK_CODE_POINT)
            .unwrap();
        assert_eq!((blank.width, blank.height, blank.x_advance), (8, 8, 8));

        for y in blank.y..blank.y + 8 {
            for x in blank.x..blank.x + 8 {
                assert_eq!(bundle.atlas.get(x as u32, y as u32), Color::WHITE);
            }
        }
    }

    #[tokio::test]
    async fn texture_auto_size_reports_final_size() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            font_size: 64,
            auto_size: AutoSize::Texture,
            ..Default::default()
        };

        let bundle = bake("Mock", &rasterizer, &options).await.unwrap();
        let common = &bundle.font.common;
        assert_eq!(
            UVec2::new(common.scale_w as u32, common.scale_h as u32),
            UVec2::new(bundle.atlas.width, bundle.atlas.height)
        );
        assert!(bundle.atlas.width >= 64 && bundle.atlas.height >= 64);
        for c in bundle.font.chars.iter() {
            assert!(c.x + c.width <= common.scale_w);
            assert!(c.y + c.height <= common.scale_h);
        }
    }

    #[tokio::test]
    async fn overflow_is_an_error() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            auto_size: AutoSize::None,
            font_size: 64,
            texture_size: Extent::new(32, 32),
            ..Default::default()
        };

        assert!(matches!(
            bake("Mock", &rasterizer, &options).await,
            Err(AtlasError::AtlasOverflow { .. })
        ));
    }

    #[tokio::test]
    async fn save_writes_both_files() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            auto_size: AutoSize::None,
            chars: CharRange { start: 65, end: 70 },
            data_format: DataFormat::Binary,
            ..Default::default()
        };

        let bundle = bake("Mock", &rasterizer, &options).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("out");
        let (png_path, fnt_path) = bundle.save(&output).await.unwrap();

        assert_eq!(png_path, output.join("Mock.png"));
        assert_eq!(fnt_path, output.join("Mock.fnt"));

        let descriptor = std::fs::read(&fnt_path).unwrap();
        assert_eq!(BmFont::from_binary(&descriptor).unwrap(), bundle.font);

        let png = std::fs::read(&png_path).unwrap();
        let mut reader = png::Decoder::new(png.as_slice()).read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (256, 256));
        assert_eq!(&buf[..info.buffer_size()], bundle.atlas.data_bytes());
    }

    #[tokio::test]
    async fn xml_uses_xml_extension() {
        let rasterizer = MockRasterizer::new();
        let options = Options {
            chars: CharRange { start: 65, end: 66 },
            data_format: DataFormat::Xml,
            ..Default::default()
        };

        let bundle = bake("Mock", &rasterizer, &options).await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (_, descriptor) = bundle.save(dir.path()).await.unwrap();
        assert_eq!(descriptor, dir.path().join("Mock.xml"));

        let xml = std::fs::read_to_string(descriptor).unwrap();
        assert!(xml.contains("<page id=\"0\" file=\"Mock.png\"/>"));
    }

    #[tokio::test]
    async fn missing_font_file() {
        let options = Options::default();
        let result = bake_file(Path::new("/nonexistent/font.ttf"), &options).await;
        assert!(matches!(result, Err(AtlasError::ReadInput { .. })));
    }

    #[tokio::test]
    async fn garbage_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        let result = bake_file(&path, &Options::default()).await;
        assert!(matches!(result, Err(AtlasError::FontParse(_))));
    }

    #[tokio::test]
    async fn bakes_real_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("NotoSans-Regular.ttf");
        std::fs::write(&path, notosans::REGULAR_TTF).unwrap();

        let bundle = bake_file(&path, &Options::default()).await.unwrap();
        assert_eq!(bundle.name, "NotoSans-Regular");
        assert_eq!(bundle.font.chars.len(), 95);

        let common = &bundle.font.common;
        assert_eq!(
            (common.scale_w as u32, common.scale_h as u32),
            (bundle.atlas.width, bundle.atlas.height)
        );

        let space = bundle.font.chars.iter().find(|c| c.id == 32).unwrap();
        assert_eq!((space.width, space.height), (0, 0));
        assert!(space.x_advance > 0);

        let inked: Vec<_> = bundle
            .font
            .chars
            .iter()
            .filter(|c| c.width > 0 && c.height > 0)
            .collect();
        for (i, a) in inked.iter().enumerate() {
            assert!(a.x + a.width <= common.scale_w);
            assert!(a.y + a.height <= common.scale_h);
            for b in inked[i + 1..].iter() {
                let disjoint = a.x + a.width <= b.x
                    || b.x + b.width <= a.x
                    || a.y + a.height <= b.y
                    || b.y + b.height <= a.y;
                assert!(disjoint, "{} overlaps {}", a.id, b.id);
            }
        }
    }
}
