//! `xl/styles.xml` reading and writing
//!
//! Fonts, fills, borders, custom number formats, cell formats and the
//! indexed palette map onto the [`StyleRegistry`]. Everything else in the
//! part (cell styles, differential formats, table styles, extensions) is
//! carried through unchanged.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::xml::{
    attribute, bool_attribute, capture_element, escape_xml, local_name, parse_attribute,
    raw_slice, PreservedXml, NS_MAIN, XML_DECLARATION,
};
use sheetstyle_core::style::FontProperty;
use sheetstyle_core::{
    Alignment, Border, BorderStyle, Borders, CellFormat, Color, Fill, Font, HorizontalAlignment,
    NumberFormat, PatternType, StyleRegistry, VerticalAlignment,
};

/// Children of `<styleSheet>` in schema order
pub(crate) const STYLESHEET_ORDER: &[&str] = &[
    "numFmts",
    "fonts",
    "fills",
    "borders",
    "cellStyleXfs",
    "cellXfs",
    "cellStyles",
    "dxfs",
    "tableStyles",
    "colors",
    "extLst",
];

const DEFAULT_CELL_STYLE_XFS: &str = "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>";
const DEFAULT_CELL_STYLES: &str = "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>";

// ==================== Enum mapping ====================

fn pattern_type_to_str(p: PatternType) -> &'static str {
    match p {
        PatternType::None => "none",
        PatternType::Solid => "solid",
        PatternType::MediumGray => "mediumGray",
        PatternType::DarkGray => "darkGray",
        PatternType::LightGray => "lightGray",
        PatternType::DarkHorizontal => "darkHorizontal",
        PatternType::DarkVertical => "darkVertical",
        PatternType::DarkDown => "darkDown",
        PatternType::DarkUp => "darkUp",
        PatternType::DarkGrid => "darkGrid",
        PatternType::DarkTrellis => "darkTrellis",
        PatternType::LightHorizontal => "lightHorizontal",
        PatternType::LightVertical => "lightVertical",
        PatternType::LightDown => "lightDown",
        PatternType::LightUp => "lightUp",
        PatternType::LightGrid => "lightGrid",
        PatternType::LightTrellis => "lightTrellis",
        PatternType::Gray125 => "gray125",
        PatternType::Gray0625 => "gray0625",
    }
}

fn str_to_pattern_type(s: &str) -> Option<PatternType> {
    Some(match s {
        "none" => PatternType::None,
        "solid" => PatternType::Solid,
        "mediumGray" => PatternType::MediumGray,
        "darkGray" => PatternType::DarkGray,
        "lightGray" => PatternType::LightGray,
        "darkHorizontal" => PatternType::DarkHorizontal,
        "darkVertical" => PatternType::DarkVertical,
        "darkDown" => PatternType::DarkDown,
        "darkUp" => PatternType::DarkUp,
        "darkGrid" => PatternType::DarkGrid,
        "darkTrellis" => PatternType::DarkTrellis,
        "lightHorizontal" => PatternType::LightHorizontal,
        "lightVertical" => PatternType::LightVertical,
        "lightDown" => PatternType::LightDown,
        "lightUp" => PatternType::LightUp,
        "lightGrid" => PatternType::LightGrid,
        "lightTrellis" => PatternType::LightTrellis,
        "gray125" => PatternType::Gray125,
        "gray0625" => PatternType::Gray0625,
        _ => return None,
    })
}

fn border_style_to_str(s: BorderStyle) -> &'static str {
    match s {
        BorderStyle::None => "none",
        BorderStyle::Thin => "thin",
        BorderStyle::Medium => "medium",
        BorderStyle::Dashed => "dashed",
        BorderStyle::Dotted => "dotted",
        BorderStyle::Thick => "thick",
        BorderStyle::Double => "double",
        BorderStyle::Hair => "hair",
        BorderStyle::MediumDashed => "mediumDashed",
        BorderStyle::DashDot => "dashDot",
        BorderStyle::MediumDashDot => "mediumDashDot",
        BorderStyle::DashDotDot => "dashDotDot",
        BorderStyle::MediumDashDotDot => "mediumDashDotDot",
        BorderStyle::SlantDashDot => "slantDashDot",
    }
}

fn str_to_border_style(s: &str) -> Option<BorderStyle> {
    Some(match s {
        "none" => BorderStyle::None,
        "thin" => BorderStyle::Thin,
        "medium" => BorderStyle::Medium,
        "dashed" => BorderStyle::Dashed,
        "dotted" => BorderStyle::Dotted,
        "thick" => BorderStyle::Thick,
        "double" => BorderStyle::Double,
        "hair" => BorderStyle::Hair,
        "mediumDashed" => BorderStyle::MediumDashed,
        "dashDot" => BorderStyle::DashDot,
        "mediumDashDot" => BorderStyle::MediumDashDot,
        "dashDotDot" => BorderStyle::DashDotDot,
        "mediumDashDotDot" => BorderStyle::MediumDashDotDot,
        "slantDashDot" => BorderStyle::SlantDashDot,
        _ => return None,
    })
}

fn horiz_to_str(h: HorizontalAlignment) -> &'static str {
    match h {
        HorizontalAlignment::General => "general",
        HorizontalAlignment::Left => "left",
        HorizontalAlignment::Center => "center",
        HorizontalAlignment::Right => "right",
        HorizontalAlignment::Fill => "fill",
        HorizontalAlignment::Justify => "justify",
        HorizontalAlignment::CenterContinuous => "centerContinuous",
        HorizontalAlignment::Distributed => "distributed",
    }
}

fn str_to_horizontal(s: &str) -> Option<HorizontalAlignment> {
    Some(match s {
        "general" => HorizontalAlignment::General,
        "left" => HorizontalAlignment::Left,
        "center" => HorizontalAlignment::Center,
        "right" => HorizontalAlignment::Right,
        "fill" => HorizontalAlignment::Fill,
        "justify" => HorizontalAlignment::Justify,
        "centerContinuous" => HorizontalAlignment::CenterContinuous,
        "distributed" => HorizontalAlignment::Distributed,
        _ => return None,
    })
}

fn vert_to_str(v: VerticalAlignment) -> &'static str {
    match v {
        VerticalAlignment::Bottom => "bottom",
        VerticalAlignment::Top => "top",
        VerticalAlignment::Center => "center",
        VerticalAlignment::Justify => "justify",
        VerticalAlignment::Distributed => "distributed",
    }
}

fn str_to_vertical(s: &str) -> Option<VerticalAlignment> {
    Some(match s {
        "bottom" => VerticalAlignment::Bottom,
        "top" => VerticalAlignment::Top,
        "center" => VerticalAlignment::Center,
        "justify" => VerticalAlignment::Justify,
        "distributed" => VerticalAlignment::Distributed,
        _ => return None,
    })
}

// ==================== Reading ====================

/// Color from the attributes of a `<color>`, `<fgColor>`, `<bgColor>` element
pub(crate) fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    let mut color = if let Some(rgb) = attribute(e, b"rgb") {
        Color::from_argb(&rgb)
    } else if let Some(theme) = parse_attribute::<u32>(e, b"theme") {
        Color::theme(theme)
    } else if let Some(indexed) = parse_attribute::<u32>(e, b"indexed") {
        Color::indexed(indexed)
    } else if bool_attribute(e, b"auto") == Some(true) {
        Color::auto()
    } else {
        Color::new()
    };
    if let Some(tint) = parse_attribute::<f64>(e, b"tint") {
        color.set_tint(tint);
    }
    color
}

/// Apply one child of `<font>` or `<rPr>` to a font
fn apply_font_property(font: &mut Font, e: &BytesStart<'_>) {
    let flag = || bool_attribute(e, b"val").unwrap_or(true);
    match e.local_name().as_ref() {
        b"b" => font.set_bold(flag()),
        b"i" => font.set_italic(flag()),
        b"u" => {
            let underline = attribute(e, b"val").map_or(true, |val| val != "none");
            font.set_underline(underline);
        }
        b"sz" => {
            if let Some(size) = parse_attribute::<f64>(e, b"val") {
                font.set_size(size);
            }
        }
        b"color" => font.set_color(parse_color_attrs(e)),
        b"name" | b"rFont" => {
            if let Some(name) = attribute(e, b"val") {
                font.set_name(name);
            }
        }
        _ => {}
    }
}

/// Read the children of a font element up to its end tag
pub(crate) fn read_font(reader: &mut Reader<&[u8]>, end: &[u8]) -> XlsxResult<Font> {
    let mut font = Font::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => apply_font_property(&mut font, &e),
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(font)
}

fn read_fonts(reader: &mut Reader<&[u8]>, registry: &mut StyleRegistry) -> XlsxResult<()> {
    let mut id = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"font" => {
                registry.fonts.insert_at(id, read_font(reader, b"font")?);
                id += 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"font" => {
                registry.fonts.insert_at(id, Font::new());
                id += 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"fonts" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn read_fill(reader: &mut Reader<&[u8]>) -> XlsxResult<Fill> {
    let mut pattern_type = None;
    let mut foreground = None;
    let mut background = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"patternFill" => {
                    pattern_type = attribute(&e, b"patternType")
                        .as_deref()
                        .and_then(str_to_pattern_type);
                }
                b"gradientFill" => {
                    log::warn!("gradient fills are not supported, reading as no fill");
                }
                b"fgColor" => foreground = Some(parse_color_attrs(&e)),
                b"bgColor" => background = Some(parse_color_attrs(&e)),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"fill" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    // The foreground goes first: setting it on an empty fill makes it solid
    let mut fill = Fill::new();
    if let Some(color) = foreground {
        fill.set_foreground(color);
    }
    if let Some(color) = background {
        fill.set_background(color);
    }
    if let Some(pattern_type) = pattern_type {
        fill.set_pattern_type(pattern_type);
    }
    Ok(fill)
}

fn read_fills(reader: &mut Reader<&[u8]>, registry: &mut StyleRegistry) -> XlsxResult<()> {
    let mut id = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"fill" => {
                registry.fills.insert_at(id, read_fill(reader)?);
                id += 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"fill" => {
                registry.fills.insert_at(id, Fill::new());
                id += 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"fills" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn border_slot<'a>(borders: &'a mut Borders, name: &[u8]) -> Option<&'a mut Option<Border>> {
    match name {
        b"left" | b"start" => Some(&mut borders.left),
        b"right" | b"end" => Some(&mut borders.right),
        b"top" => Some(&mut borders.top),
        b"bottom" => Some(&mut borders.bottom),
        b"diagonal" => Some(&mut borders.diagonal),
        _ => None,
    }
}

fn read_border(reader: &mut Reader<&[u8]>) -> XlsxResult<Borders> {
    let mut borders = Borders::new();
    let mut edge: Option<Vec<u8>> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name().as_ref().to_vec();
                if let Some(slot) = border_slot(&mut borders, &name) {
                    *slot = Some(edge_from(&e));
                    edge = Some(name);
                } else if name == b"color" {
                    let slot = edge
                        .as_deref()
                        .and_then(|current| border_slot(&mut borders, current));
                    if let Some(Some(border)) = slot {
                        border.color = parse_color_attrs(&e);
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"border" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(borders)
}

fn edge_from(e: &BytesStart<'_>) -> Border {
    let style = attribute(e, b"style")
        .as_deref()
        .and_then(str_to_border_style)
        .unwrap_or_default();
    Border::new(style, Color::new())
}

fn read_borders(reader: &mut Reader<&[u8]>, registry: &mut StyleRegistry) -> XlsxResult<()> {
    let mut id = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"border" => {
                registry.borders.insert_at(id, read_border(reader)?);
                id += 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"border" => {
                registry.borders.insert_at(id, Borders::new());
                id += 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"borders" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn read_num_fmts(reader: &mut Reader<&[u8]>, registry: &mut StyleRegistry) -> XlsxResult<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"numFmt" => {
                let id = parse_attribute::<u32>(&e, b"numFmtId");
                let code = attribute(&e, b"formatCode");
                if let (Some(id), Some(code)) = (id, code) {
                    registry.number_formats.insert_at(id, NumberFormat::new(code));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"numFmts" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn read_alignment(e: &BytesStart<'_>) -> Alignment {
    let mut alignment = Alignment::new();
    if let Some(h) = attribute(e, b"horizontal").as_deref().and_then(str_to_horizontal) {
        alignment.horizontal = h;
    }
    if let Some(v) = attribute(e, b"vertical").as_deref().and_then(str_to_vertical) {
        alignment.vertical = v;
    }
    alignment.wrap_text = bool_attribute(e, b"wrapText").unwrap_or(false);
    alignment
}

/// Raw ids and apply flags of an `<xf>`
#[derive(Default)]
struct RawXf {
    font: Option<u32>,
    fill: Option<u32>,
    border: Option<u32>,
    number_format: Option<u32>,
    alignment: Option<Alignment>,
}

/// A part of an xf applies when its flag says so, or when the flag is
/// absent and the id is not the default
fn applied(e: &BytesStart<'_>, id_name: &[u8], flag_name: &[u8]) -> Option<u32> {
    let id = parse_attribute::<u32>(e, id_name)?;
    match bool_attribute(e, flag_name) {
        Some(true) => Some(id),
        Some(false) => None,
        None => (id != 0).then_some(id),
    }
}

fn raw_xf(e: &BytesStart<'_>) -> RawXf {
    RawXf {
        font: applied(e, b"fontId", b"applyFont"),
        fill: applied(e, b"fillId", b"applyFill"),
        border: applied(e, b"borderId", b"applyBorder"),
        number_format: applied(e, b"numFmtId", b"applyNumberFormat"),
        alignment: None,
    }
}

fn read_cell_xfs(reader: &mut Reader<&[u8]>) -> XlsxResult<Vec<RawXf>> {
    let mut xfs = Vec::new();
    let mut current: Option<RawXf> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"xf" => current = Some(raw_xf(&e)),
            Event::Empty(e) if e.local_name().as_ref() == b"xf" => xfs.push(raw_xf(&e)),
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"alignment" => {
                if let Some(xf) = current.as_mut() {
                    xf.alignment = Some(read_alignment(&e));
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"xf" => {
                if let Some(xf) = current.take() {
                    xfs.push(xf);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(xfs)
}

fn read_colors(reader: &mut Reader<&[u8]>, registry: &mut StyleRegistry) -> XlsxResult<()> {
    let mut in_indexed = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"indexedColors" => in_indexed = true,
            Event::End(e) if e.local_name().as_ref() == b"indexedColors" => in_indexed = false,
            Event::Start(e) | Event::Empty(e)
                if in_indexed && e.local_name().as_ref() == b"rgbColor" =>
            {
                if let Some(rgb) = attribute(&e, b"rgb") {
                    registry.indexed_colors.push(rgb.to_ascii_uppercase());
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"colors" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Drop references to entries the part does not define
fn clamp(id: Option<u32>, exists: impl Fn(u32) -> bool, what: &str, xf: u32) -> Option<u32> {
    match id {
        Some(id) if !exists(id) => {
            log::warn!("cell format {xf} refers to missing {what} {id}, using the default");
            None
        }
        other => other,
    }
}

/// Parse `xl/styles.xml` into a registry plus the content it does not model
pub(crate) fn read_styles_xml(xml: &str) -> XlsxResult<(StyleRegistry, PreservedXml)> {
    let mut reader = Reader::from_str(xml);
    let mut registry = StyleRegistry::empty();
    let mut preserved = PreservedXml::new();
    let mut cell_xfs = Vec::new();

    loop {
        let start = reader.buffer_position();
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"styleSheet" => {
                preserved.set_root_attributes(&e);
            }
            Event::Start(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "numFmts" => read_num_fmts(&mut reader, &mut registry)?,
                    "fonts" => read_fonts(&mut reader, &mut registry)?,
                    "fills" => read_fills(&mut reader, &mut registry)?,
                    "borders" => read_borders(&mut reader, &mut registry)?,
                    "cellXfs" => cell_xfs = read_cell_xfs(&mut reader)?,
                    "colors" => read_colors(&mut reader, &mut registry)?,
                    _ => {
                        let raw = capture_element(&mut reader, xml, start, &e)?;
                        preserved.keep(&name, raw, STYLESHEET_ORDER);
                        continue;
                    }
                }
                preserved.note(&name, STYLESHEET_ORDER);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "styleSheet" => preserved.set_root_attributes(&e),
                    "numFmts" | "fonts" | "fills" | "borders" | "cellXfs" | "colors" => {
                        preserved.note(&name, STYLESHEET_ORDER)
                    }
                    _ => {
                        let raw = raw_slice(xml, start, reader.buffer_position());
                        preserved.keep(&name, raw, STYLESHEET_ORDER);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    for (id, xf) in cell_xfs.into_iter().enumerate() {
        let id = id as u32;
        let format = CellFormat {
            alignment: xf.alignment,
            font_id: clamp(xf.font, |i| registry.fonts.contains(i), "font", id),
            fill_id: clamp(xf.fill, |i| registry.fills.contains(i), "fill", id),
            borders_id: clamp(xf.border, |i| registry.borders.contains(i), "border", id),
            number_format_id: clamp(
                xf.number_format,
                |i| registry.number_formats.get(i).is_some(),
                "number format",
                id,
            ),
        };
        registry.cell_formats.insert_at(id, format);
    }

    registry.ensure_defaults();
    Ok((registry, preserved))
}

// ==================== Writing ====================

/// Color element, or nothing when no channel is set
pub(crate) fn write_color(tag: &str, color: &Color) -> String {
    if !color.is_used() {
        return String::new();
    }
    let mut s = format!("<{tag}");
    if let Some(argb) = color.to_argb() {
        s.push_str(&format!(" rgb=\"{argb}\""));
    } else if let Some(theme) = color.theme_value() {
        s.push_str(&format!(" theme=\"{theme}\""));
    } else if let Some(indexed) = color.indexed_value() {
        s.push_str(&format!(" indexed=\"{indexed}\""));
    } else if color.is_auto() {
        s.push_str(" auto=\"1\"");
    }
    if color.tint() != 0.0 {
        s.push_str(&format!(" tint=\"{}\"", color.tint()));
    }
    s.push_str("/>");
    s
}

fn write_flag(s: &mut String, tag: &str, value: bool) {
    if value {
        s.push_str(&format!("<{tag}/>"));
    } else {
        s.push_str(&format!("<{tag} val=\"0\"/>"));
    }
}

/// Children of a font element; only the properties that are set are written
///
/// `name_tag` is `name` in the font table and `rFont` in rich text runs.
pub(crate) fn write_font_properties(font: &Font, name_tag: &str) -> String {
    let mut s = String::new();
    if font.is_set(FontProperty::Bold) {
        write_flag(&mut s, "b", font.bold());
    }
    if font.is_set(FontProperty::Italic) {
        write_flag(&mut s, "i", font.italic());
    }
    if font.is_set(FontProperty::Underline) {
        if font.underline() {
            s.push_str("<u/>");
        } else {
            s.push_str("<u val=\"none\"/>");
        }
    }
    if let Some(size) = font.size() {
        s.push_str(&format!("<sz val=\"{size}\"/>"));
    }
    if let Some(color) = font.color() {
        s.push_str(&write_color("color", color));
    }
    if let Some(name) = font.name() {
        s.push_str(&format!("<{name_tag} val=\"{}\"/>", escape_xml(name)));
    }
    s
}

fn write_fill(fill: &Fill) -> String {
    let colors = format!(
        "{}{}",
        write_color("fgColor", fill.foreground()),
        write_color("bgColor", fill.background())
    );
    let pattern = pattern_type_to_str(fill.pattern_type());
    if colors.is_empty() {
        format!("<fill><patternFill patternType=\"{pattern}\"/></fill>")
    } else {
        format!("<fill><patternFill patternType=\"{pattern}\">{colors}</patternFill></fill>")
    }
}

fn write_border_edge(tag: &str, edge: &Option<Border>) -> String {
    match edge {
        None => String::new(),
        Some(border) if border.style == BorderStyle::None => format!("<{tag}/>"),
        Some(border) => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            border_style_to_str(border.style),
            write_color("color", &border.color)
        ),
    }
}

fn write_border(borders: &Borders) -> String {
    format!(
        "<border>{}{}{}{}{}</border>",
        write_border_edge("left", &borders.left),
        write_border_edge("right", &borders.right),
        write_border_edge("top", &borders.top),
        write_border_edge("bottom", &borders.bottom),
        write_border_edge("diagonal", &borders.diagonal)
    )
}

fn write_alignment(al: &Alignment) -> String {
    let mut s = String::from("<alignment");
    if al.horizontal != HorizontalAlignment::General {
        s.push_str(&format!(" horizontal=\"{}\"", horiz_to_str(al.horizontal)));
    }
    if al.vertical != VerticalAlignment::Bottom {
        s.push_str(&format!(" vertical=\"{}\"", vert_to_str(al.vertical)));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(format: &CellFormat) -> String {
    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        format.number_format(),
        format.font(),
        format.fill(),
        format.borders()
    );
    for (part, flag) in [
        (format.number_format_id, "applyNumberFormat"),
        (format.font_id, "applyFont"),
        (format.fill_id, "applyFill"),
        (format.borders_id, "applyBorder"),
    ] {
        if part.is_some() {
            s.push_str(&format!(" {flag}=\"1\""));
        }
    }
    match &format.alignment {
        Some(alignment) => {
            s.push_str(" applyAlignment=\"1\">");
            s.push_str(&write_alignment(alignment));
            s.push_str("</xf>");
        }
        None => s.push_str("/>"),
    }
    s
}

/// Entries of a table by position, filling id gaps with a default
fn dense<T: Clone>(
    max_id: Option<u32>,
    get: impl Fn(u32) -> Option<T>,
    default: impl Fn() -> T,
) -> Vec<T> {
    match max_id {
        Some(max) => (0..=max).map(|id| get(id).unwrap_or_else(&default)).collect(),
        None => Vec::new(),
    }
}

/// Serialize the registry as `xl/styles.xml`
///
/// Ids are positions in the written tables, so deleted ids are filled with
/// default entries.
pub(crate) fn to_styles_xml(registry: &StyleRegistry, preserved: &PreservedXml) -> XlsxResult<String> {
    let default_font = registry.default_font();
    let fonts = dense(
        registry.fonts.max_id(),
        |id| registry.fonts.get(id).cloned(),
        || default_font.clone(),
    );
    let fills = dense(registry.fills.max_id(), |id| registry.fills.get(id).cloned(), Fill::new);
    let borders = dense(
        registry.borders.max_id(),
        |id| registry.borders.get(id).cloned(),
        Borders::empty_edges,
    );
    let cell_formats = dense(
        registry.cell_formats.max_id(),
        |id| registry.cell_formats.get(id).copied(),
        CellFormat::new,
    );

    let mut xml = String::from(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&preserved.root_tag("styleSheet", &[("xmlns", NS_MAIN)]));

    preserved.write_children(&mut xml, STYLESHEET_ORDER, |name, out| {
        match name {
            "numFmts" => {
                let custom: Vec<_> = registry.number_formats.custom().collect();
                if !custom.is_empty() {
                    out.push_str(&format!("\n<numFmts count=\"{}\">", custom.len()));
                    for (id, format) in custom {
                        out.push_str(&format!(
                            "<numFmt numFmtId=\"{id}\" formatCode=\"{}\"/>",
                            escape_xml(format.code())
                        ));
                    }
                    out.push_str("</numFmts>");
                }
            }
            "fonts" => {
                out.push_str(&format!("\n<fonts count=\"{}\">", fonts.len()));
                for font in &fonts {
                    out.push_str(&format!("<font>{}</font>", write_font_properties(font, "name")));
                }
                out.push_str("</fonts>");
            }
            "fills" => {
                out.push_str(&format!("\n<fills count=\"{}\">", fills.len()));
                for fill in &fills {
                    out.push_str(&write_fill(fill));
                }
                out.push_str("</fills>");
            }
            "borders" => {
                out.push_str(&format!("\n<borders count=\"{}\">", borders.len()));
                for border in &borders {
                    out.push_str(&write_border(border));
                }
                out.push_str("</borders>");
            }
            "cellStyleXfs" if !preserved.contains(name) => {
                out.push('\n');
                out.push_str(DEFAULT_CELL_STYLE_XFS);
            }
            "cellXfs" => {
                out.push_str(&format!("\n<cellXfs count=\"{}\">", cell_formats.len()));
                for format in &cell_formats {
                    out.push_str(&write_xf(format));
                }
                out.push_str("</cellXfs>");
            }
            "cellStyles" if !preserved.contains(name) => {
                out.push('\n');
                out.push_str(DEFAULT_CELL_STYLES);
            }
            "colors" => {
                if !registry.indexed_colors.is_empty() {
                    out.push_str("\n<colors><indexedColors>");
                    for rgb in &registry.indexed_colors {
                        out.push_str(&format!("<rgbColor rgb=\"{}\"/>", escape_xml(rgb)));
                    }
                    out.push_str("</indexedColors></colors>");
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;

    xml.push_str("\n</styleSheet>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x14ac" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">
<numFmts count="1"><numFmt numFmtId="164" formatCode="0.0%"/></numFmts>
<fonts count="2">
<font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/></font>
<font><b/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
</fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
</fills>
<borders count="2">
<border><left/><right/><top/><bottom/><diagonal/></border>
<border><left style="thin"><color indexed="64"/></left><right/><top/><bottom style="double"><color auto="1"/></bottom><diagonal/></border>
</borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="4">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="164" fontId="1" fillId="2" borderId="1" xfId="0" applyNumberFormat="1" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" wrapText="1"/></xf>
<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="0"/>
<xf numFmtId="0" fontId="9" fillId="0" borderId="0" xfId="0"/>
</cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
<dxfs count="1"><dxf><font><b/></font></dxf></dxfs>
<tableStyles count="0" defaultTableStyle="TableStyleMedium2"/>
</styleSheet>"#;

    #[test]
    fn test_read_styles() {
        let (registry, preserved) = read_styles_xml(STYLES).unwrap();

        let bold = registry.fonts.get(1).unwrap();
        assert!(bold.bold());
        assert_eq!(bold.size(), Some(14.0));
        assert_eq!(bold.name(), Some("Arial"));
        assert_eq!(bold.color().and_then(Color::rgb_value), Some("#FF0000"));

        let fill = registry.fills.get(2).unwrap();
        assert_eq!(fill.pattern_type(), PatternType::Solid);
        assert_eq!(fill.foreground().rgb_value(), Some("#FFFF00"));
        assert_eq!(fill.background().indexed_value(), Some(64));

        let borders = registry.borders.get(1).unwrap();
        assert_eq!(borders.left.as_ref().map(|b| b.style), Some(BorderStyle::Thin));
        assert!(borders.bottom.as_ref().is_some_and(|b| b.color.is_auto()));
        assert_eq!(registry.borders.get(0), Some(&Borders::empty_edges()));

        let xf = registry.cell_format(1).unwrap();
        assert_eq!(xf.font_id, Some(1));
        assert_eq!(xf.number_format_id, Some(164));
        assert_eq!(
            xf.alignment,
            Some(
                Alignment::new()
                    .with_horizontal(HorizontalAlignment::Center)
                    .with_wrap(true)
            )
        );
        assert_eq!(registry.cell_format(2).unwrap().font_id, None);
        // Unknown font id falls back to the default
        assert_eq!(registry.cell_format(3).unwrap().font_id, None);
        assert_eq!(registry.number_formats.get(164).map(NumberFormat::code), Some("0.0%"));

        assert!(preserved.contains("dxfs"));
        assert!(preserved.contains("tableStyles"));
        assert!(preserved.contains("cellStyles"));
    }

    #[test]
    fn test_styles_survive_a_rewrite() {
        let (registry, preserved) = read_styles_xml(STYLES).unwrap();
        let xml = to_styles_xml(&registry, &preserved).unwrap();

        assert!(xml.contains("mc:Ignorable=\"x14ac\""));
        assert!(xml.contains("<dxfs count=\"1\"><dxf><font><b/></font></dxf></dxfs>"));
        assert!(xml.contains("<numFmt numFmtId=\"164\" formatCode=\"0.0%\"/>"));
        assert!(xml.find("<cellXfs").unwrap() < xml.find("<cellStyles").unwrap());
        assert!(xml.find("<cellStyles").unwrap() < xml.find("<dxfs").unwrap());

        let (reread, _) = read_styles_xml(&xml).unwrap();
        for id in 0..4 {
            assert_eq!(reread.cell_format(id).unwrap(), registry.cell_format(id).unwrap());
        }
        assert_eq!(reread.fonts.get(1), registry.fonts.get(1));
        assert_eq!(reread.fills.get(2), registry.fills.get(2));
        assert_eq!(reread.borders.get(1), registry.borders.get(1));
    }

    #[test]
    fn test_new_registry_writes_required_sections() {
        let registry = StyleRegistry::new();
        let xml = to_styles_xml(&registry, &PreservedXml::new()).unwrap();
        assert!(xml.contains("<fills count=\"2\"><fill><patternFill patternType=\"none\"/></fill><fill><patternFill patternType=\"gray125\"/></fill></fills>"));
        assert!(xml.contains(DEFAULT_CELL_STYLE_XFS));
        assert!(xml.contains(DEFAULT_CELL_STYLES));
        assert!(!xml.contains("<numFmts"));
        assert!(xml.contains("<font><sz val=\"11\"/><color theme=\"1\"/><name val=\"Calibri\"/></font>"));
    }

    #[test]
    fn test_deleted_ids_are_padded() {
        let mut registry = StyleRegistry::new();
        let a = registry.fonts.insert(Font::new().with_bold(true));
        let b = registry.fonts.insert(Font::new().with_italic(true));
        registry.fonts.delete(a);

        let xml = to_styles_xml(&registry, &PreservedXml::new()).unwrap();
        let (reread, _) = read_styles_xml(&xml).unwrap();
        assert_eq!(reread.fonts.get(b), registry.fonts.get(b));
        assert_eq!(reread.fonts.get(a), Some(&registry.default_font()));
    }

    #[test]
    fn test_font_flags_set_false_are_kept() {
        let font = Font::new().with_bold(false).with_underline(true);
        assert_eq!(write_font_properties(&font, "rFont"), "<b val=\"0\"/><u/>");

        let xml = format!("<rPr>{}</rPr>", write_font_properties(&font, "rFont"));
        let mut reader = Reader::from_str(&xml);
        reader.read_event().unwrap();
        assert_eq!(read_font(&mut reader, b"rPr").unwrap(), font);
    }

    #[test]
    fn test_builtin_number_format_ids_from_the_package() {
        let xml = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="44" formatCode="_-* #,##0.00\ &quot;€&quot;_-;\-* #,##0.00\ &quot;€&quot;_-;_-* &quot;-&quot;??\ &quot;€&quot;_-;_-@_-"/></numFmts>
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellXfs count="3">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="44" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
<xf numFmtId="7" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
</cellXfs>
</styleSheet>"#;
        let accounting = r#"_-* #,##0.00\ "€"_-;\-* #,##0.00\ "€"_-;_-* "-"??\ "€"_-;_-@_-"#;

        let (registry, preserved) = read_styles_xml(xml).unwrap();
        assert_eq!(registry.cell_format(1).unwrap().number_format_id, Some(44));
        assert_eq!(registry.effective_number_format(1).code(), accounting);
        assert_eq!(registry.cell_format(2).unwrap().number_format_id, Some(7));

        let rewritten = to_styles_xml(&registry, &preserved).unwrap();
        assert!(rewritten.contains("<numFmts count=\"1\"><numFmt numFmtId=\"44\""));
        let (reread, _) = read_styles_xml(&rewritten).unwrap();
        assert_eq!(reread.effective_number_format(1).code(), accounting);
        assert_eq!(reread.cell_format(2).unwrap().number_format_id, Some(7));
    }

    #[test]
    fn test_indexed_palette_round_trip() {
        let mut registry = StyleRegistry::new();
        registry.indexed_colors = vec!["FF000000".into(), "FFFFFFFF".into()];
        let xml = to_styles_xml(&registry, &PreservedXml::new()).unwrap();
        let (reread, _) = read_styles_xml(&xml).unwrap();
        assert_eq!(reread.indexed_colors, registry.indexed_colors);
    }
}
