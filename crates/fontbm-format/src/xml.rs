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

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::*;

fn xml_error(err: quick_xml::Error) -> io::Error {
    match err {
        quick_xml::Error::Io(err) => err,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

/// Writes `<name a="1" .../>`. Attribute values are escaped by the writer.
fn empty<W: Write>(writer: &mut Writer<W>, name: &str, attrs: &[(&str, String)]) -> io::Result<()> {
    let element = BytesStart::borrowed_name(name.as_bytes())
        .with_attributes(attrs.iter().map(|(key, value)| (*key, value.as_str())));
    writer.write_event(Event::Empty(element)).map_err(xml_error)?;
    Ok(())
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str, attrs: &[(&str, String)]) -> io::Result<()> {
    let element = BytesStart::borrowed_name(name.as_bytes())
        .with_attributes(attrs.iter().map(|(key, value)| (*key, value.as_str())));
    writer.write_event(Event::Start(element)).map_err(xml_error)?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> io::Result<()> {
    writer
        .write_event(Event::End(BytesEnd::borrowed(name.as_bytes())))
        .map_err(xml_error)?;
    Ok(())
}

impl BmFont {
    /// Writes the XML form: a `<font>` root holding `<info/>`, `<common/>`,
    /// one `<page/>` per page, `<chars>`, and `<kernings>` when there are
    /// pairs. Attribute names match the text form, and each `<char/>` also
    /// carries its `letter`.
    pub fn write_xml(&self, out: &mut impl Write) -> io::Result<()> {
        let info = &self.info;
        let common = &self.common;
        let mut writer = Writer::new_with_indent(&mut *out, b' ', 2);

        let decl = BytesDecl::new(b"1.0", Some(b"utf-8"), None);
        writer.write_event(Event::Decl(decl)).map_err(xml_error)?;
        start(&mut writer, "font", &[])?;

        let flag = |set: bool| (set as u8).to_string();
        empty(
            &mut writer,
            "info",
            &[
                ("face", self.face.clone()),
                ("size", info.font_size.to_string()),
                ("bold", flag(info.flags.contains(InfoFlags::BOLD))),
                ("italic", flag(info.flags.contains(InfoFlags::ITALIC))),
                ("charset", String::new()),
                ("unicode", "1".to_string()),
                ("stretchH", info.stretch_h.to_string()),
                ("smooth", "1".to_string()),
                ("aa", info.aa.to_string()),
                (
                    "padding",
                    format!(
                        "{},{},{},{}",
                        info.padding_up, info.padding_right, info.padding_down, info.padding_left
                    ),
                ),
                ("spacing", format!("{},{}", info.spacing_horiz, info.spacing_vert)),
                ("outline", info.outline.to_string()),
            ],
        )?;

        empty(
            &mut writer,
            "common",
            &[
                ("lineHeight", common.line_height.to_string()),
                ("base", common.base.to_string()),
                ("scaleW", common.scale_w.to_string()),
                ("scaleH", common.scale_h.to_string()),
                ("pages", common.pages.to_string()),
                ("packed", flag(common.flags.contains(CommonFlags::PACKED))),
                ("alphaChnl", common.alpha_chnl.to_string()),
                ("redChnl", common.red_chnl.to_string()),
                ("greenChnl", common.green_chnl.to_string()),
                ("blueChnl", common.blue_chnl.to_string()),
            ],
        )?;

        for (id, file) in self.pages.iter().enumerate() {
            empty(&mut writer, "page", &[("id", id.to_string()), ("file", file.clone())])?;
        }

        start(&mut writer, "chars", &[("count", self.chars.len().to_string())])?;
        for c in self.chars.iter() {
            let mut attrs = vec![
                ("id", c.id.to_string()),
                ("x", c.x.to_string()),
                ("y", c.y.to_string()),
                ("width", c.width.to_string()),
                ("height", c.height.to_string()),
                ("xoffset", c.x_offset.to_string()),
                ("yoffset", c.y_offset.to_string()),
                ("xadvance", c.x_advance.to_string()),
                ("page", c.page.to_string()),
                ("chnl", c.chnl.to_string()),
            ];
            if let Some(letter) = char::from_u32(c.id) {
                attrs.push(("letter", letter.to_string()));
            }
            empty(&mut writer, "char", &attrs)?;
        }
        end(&mut writer, "chars")?;

        if !self.kernings.is_empty() {
            start(&mut writer, "kernings", &[("count", self.kernings.len().to_string())])?;
            for k in self.kernings.iter() {
                empty(
                    &mut writer,
                    "kerning",
                    &[
                        ("first", k.first.to_string()),
                        ("second", k.second.to_string()),
                        ("amount", k.amount.to_string()),
                    ],
                )?;
            }
            end(&mut writer, "kernings")?;
        }

        end(&mut writer, "font")?;
        writer.into_inner().write_all(b"\n")
    }
}
