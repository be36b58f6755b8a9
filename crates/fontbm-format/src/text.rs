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

use std::io::{self, Write};

use crate::*;

impl BmFont {
    /// Writes the line-based text form: one `info`, `common`, and `chars`
    /// line, one `page` line per page, then a `char` line per character and
    /// (if there are any) a `kernings` line followed by each pair.
    ///
    /// `charset` is written empty and `unicode`/`smooth` as 1: the atlas is
    /// always keyed by Unicode scalar values and rendered anti-aliased.
    pub fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        let info = &self.info;
        writeln!(
            out,
            "info face=\"{}\" size={} bold={} italic={} charset=\"\" unicode=1 stretchH={} smooth=1 aa={} padding={},{},{},{} spacing={},{} outline={}",
            self.face,
            info.font_size,
            info.flags.contains(InfoFlags::BOLD) as u8,
            info.flags.contains(InfoFlags::ITALIC) as u8,
            info.stretch_h,
            info.aa,
            info.padding_up,
            info.padding_right,
            info.padding_down,
            info.padding_left,
            info.spacing_horiz,
            info.spacing_vert,
            info.outline,
        )?;

        let common = &self.common;
        writeln!(
            out,
            "common lineHeight={} base={} scaleW={} scaleH={} pages={} packed={} alphaChnl={} redChnl={} greenChnl={} blueChnl={}",
            common.line_height,
            common.base,
            common.scale_w,
            common.scale_h,
            common.pages,
            common.flags.contains(CommonFlags::PACKED) as u8,
            common.alpha_chnl,
            common.red_chnl,
            common.green_chnl,
            common.blue_chnl,
        )?;

        for (id, file) in self.pages.iter().enumerate() {
            writeln!(out, "page id={} file=\"{}\"", id, file)?;
        }

        writeln!(out, "chars count={}", self.chars.len())?;
        for c in self.chars.iter() {
            writeln!(
                out,
                "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page={} chnl={}",
                c.id, c.x, c.y, c.width, c.height, c.x_offset, c.y_offset, c.x_advance, c.page, c.chnl
            )?;
        }

        if !self.kernings.is_empty() {
            writeln!(out, "kernings count={}", self.kernings.len())?;
            for k in self.kernings.iter() {
                writeln!(
                    out,
                    "kerning first={} second={} amount={}",
                    k.first, k.second, k.amount
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_font;

    fn text(font: &BmFont) -> String {
        String::from_utf8(font.to_bytes(DataFormat::Text)).unwrap()
    }

    #[test]
    fn info_line() {
        let mut font = sample_font();
        font.info.font_size = 16;
        let text = text(&font);
        assert_eq!(
            text.lines().next().unwrap(),
            "info face=\"Sample Sans\" size=16 bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0"
        );
    }

    #[test]
    fn full_layout() {
        let expected = "\
info face=\"Sample Sans\" size=32 bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0
common lineHeight=38 base=7 scaleW=256 scaleH=128 pages=2 packed=0 alphaChnl=0 redChnl=0 greenChnl=0 blueChnl=0
page id=0 file=\"sample_0.png\"
page id=1 file=\"sample_1.png\"
chars count=3
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=8 page=0 chnl=15
char id=65 x=3 y=4 width=18 height=22 xoffset=-1 yoffset=6 xadvance=17 page=0 chnl=15
char id=86 x=40 y=90 width=19 height=22 xoffset=0 yoffset=6 xadvance=18 page=1 chnl=15
kernings count=1
kerning first=65 second=86 amount=-2
";
        assert_eq!(text(&sample_font()), expected);
    }

    #[test]
    fn style_flags() {
        let mut font = sample_font();
        font.info.flags = InfoFlags::BOLD | InfoFlags::ITALIC;
        font.common.flags = CommonFlags::PACKED;
        let text = text(&font);
        assert!(text.contains(" bold=1 italic=1 "));
        assert!(text.contains(" packed=1 "));
    }

    #[test]
    fn no_kernings_line_without_pairs() {
        let mut font = sample_font();
        font.kernings.clear();
        let text = text(&font);
        assert!(!text.contains("kerning"));
        assert!(text.ends_with("chnl=15\n"));
    }

    #[test]
    fn deterministic() {
        let font = sample_font();
        assert_eq!(text(&font), text(&font.clone()));
    }
}
