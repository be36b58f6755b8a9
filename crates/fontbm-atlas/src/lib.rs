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

//! Bakes scalable fonts into a single-page bitmap atlas and its BMFont
//! descriptor.
//!
//! The pipeline runs leaves first: [metrics::FontMetrics] normalizes the
//! font's vertical metrics, [catalog::GlyphCatalog] rasterizes the selected
//! code points, [layout::AtlasLayoutEngine] packs or grids them (auto-sizing
//! the texture or the font), [compositor::AtlasBitmap] blits the atlas, and
//! [builder::BmFontBuilder] fills in the descriptor.

pub mod bitmap;
pub mod builder;
pub mod catalog;
pub mod compositor;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod options;
pub mod packer;
pub mod pipeline;
pub mod rasterizer;
pub mod ttf;

pub use bitmap::{Color, GlyphBitmap};
pub use error::{AtlasError, AtlasResult};
pub use options::{AutoSize, CharRange, Extent, Options};
pub use packer::PackerKind;
pub use pipeline::{bake, bake_file, FontBundle};
pub use rasterizer::{CodePoint, Rasterizer, SvgRender, SvgRenderContext};
pub use ttf::TtfRasterizer;
