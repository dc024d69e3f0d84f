//! Worksheet part reader

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::shared_strings::read_string_item;
use crate::xml::{
    attribute, bool_attribute, capture_element, decode_excel_escapes, index_attribute,
    local_name, parse_attribute, parse_bool, raw_slice, PreservedXml,
};
use sheetstyle_core::{
    time, CellAddress, CellRange, CellValue, ColumnCollection, ColumnRange, HyperlinkTarget,
    RichString, SharedStringTable, WorkbookSettings, Worksheet,
};

/// Children of `<worksheet>` in schema order
pub(crate) const WORKSHEET_ORDER: &[&str] = &[
    "sheetPr",
    "dimension",
    "sheetViews",
    "sheetFormatPr",
    "cols",
    "sheetData",
    "sheetCalcPr",
    "sheetProtection",
    "protectedRanges",
    "scenarios",
    "autoFilter",
    "sortState",
    "dataConsolidate",
    "customSheetViews",
    "mergeCells",
    "phoneticPr",
    "conditionalFormatting",
    "dataValidations",
    "hyperlinks",
    "printOptions",
    "pageMargins",
    "pageSetup",
    "headerFooter",
    "rowBreaks",
    "colBreaks",
    "customProperties",
    "cellWatches",
    "ignoredErrors",
    "smartTags",
    "drawing",
    "legacyDrawing",
    "legacyDrawingHF",
    "drawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

/// Parse a worksheet part into `sheet`, returning what the model does not cover
pub(crate) fn read_worksheet_xml(
    xml: &str,
    sheet: &mut Worksheet,
    strings: &SharedStringTable,
    settings: &WorkbookSettings,
) -> XlsxResult<PreservedXml> {
    let mut reader = Reader::from_str(xml);
    let mut preserved = PreservedXml::new();
    let mut merges = Vec::new();
    let mut links = Vec::new();

    sheet.set_default_row_height(settings.default_row_height);
    sheet.set_max_column_width(settings.max_column_width);

    loop {
        let start = reader.buffer_position();
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"worksheet" => {
                preserved.set_root_attributes(&e);
            }
            Event::Start(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "dimension" => {
                        reader.read_to_end(e.name())?;
                    }
                    "sheetFormatPr" => {
                        read_sheet_format(&e, sheet);
                        reader.read_to_end(e.name())?;
                    }
                    "sheetViews" => read_sheet_views(&mut reader, sheet)?,
                    "cols" => {
                        sheet.columns = ColumnCollection::from_ranges(&read_cols(&mut reader)?);
                        sheet.set_max_column_width(settings.max_column_width);
                    }
                    "sheetData" => read_sheet_data(&mut reader, sheet, strings)?,
                    "mergeCells" => merges = read_merge_cells(&mut reader)?,
                    "hyperlinks" => {
                        links = read_hyperlinks(&mut reader, xml, &mut preserved, sheet.name())?
                    }
                    _ => {
                        let raw = capture_element(&mut reader, xml, start, &e)?;
                        preserved.keep(&name, raw, WORKSHEET_ORDER);
                        continue;
                    }
                }
                preserved.note(&name, WORKSHEET_ORDER);
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "worksheet" => preserved.set_root_attributes(&e),
                    "sheetFormatPr" => {
                        read_sheet_format(&e, sheet);
                        preserved.note(&name, WORKSHEET_ORDER);
                    }
                    "dimension" | "sheetViews" | "cols" | "sheetData" | "mergeCells"
                    | "hyperlinks" => preserved.note(&name, WORKSHEET_ORDER),
                    _ => {
                        let raw = raw_slice(xml, start, reader.buffer_position());
                        preserved.keep(&name, raw, WORKSHEET_ORDER);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    for range in merges {
        if let Err(e) = sheet.merge(&range) {
            log::warn!("skipping merge {} on '{}': {e}", range.to_a1_string(), sheet.name());
        }
    }
    for (cell, target) in links {
        match sheet.cell_mut(cell.row, cell.column) {
            Ok(cell) => cell.hyperlink = Some(target),
            Err(e) => log::warn!("skipping hyperlink on '{}': {e}", sheet.name()),
        }
    }

    Ok(preserved)
}

fn read_sheet_format(e: &BytesStart<'_>, sheet: &mut Worksheet) {
    if let Some(height) = parse_attribute::<f64>(e, b"defaultRowHeight") {
        sheet.set_default_row_height(height);
    }
}

/// Selected tab and frozen panes of the first view
fn read_sheet_views(reader: &mut Reader<&[u8]>, sheet: &mut Worksheet) -> XlsxResult<()> {
    let mut views = 0;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheetView" => {
                    if views == 0 {
                        sheet.view.selected = bool_attribute(&e, b"tabSelected").unwrap_or(false);
                    }
                    views += 1;
                }
                b"pane" if views == 1 => {
                    let frozen = matches!(
                        attribute(&e, b"state").as_deref(),
                        Some("frozen") | Some("frozenSplit")
                    );
                    if frozen {
                        sheet.set_frozen(
                            index_attribute(&e, b"ySplit").unwrap_or(0),
                            index_attribute(&e, b"xSplit").unwrap_or(0),
                        );
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"sheetViews" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn read_cols(reader: &mut Reader<&[u8]>) -> XlsxResult<Vec<ColumnRange>> {
    let mut ranges = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"col" => {
                let (Some(min), Some(max)) = (index_attribute(&e, b"min"), index_attribute(&e, b"max"))
                else {
                    log::warn!("skipping column record without min or max");
                    continue;
                };
                ranges.push(ColumnRange {
                    min,
                    max,
                    style_index: parse_attribute(&e, b"style").unwrap_or(0),
                    width: parse_attribute(&e, b"width").unwrap_or(0.0),
                    best_fit: bool_attribute(&e, b"bestFit").unwrap_or(false),
                    custom_width: bool_attribute(&e, b"customWidth").unwrap_or(false),
                });
            }
            Event::End(e) if e.local_name().as_ref() == b"cols" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(ranges)
}

/// A cell whose start tag has been read
struct PendingCell {
    row: u32,
    column: u32,
    style_index: u32,
    cell_type: String,
    raw: String,
    inline: Option<RichString>,
}

impl PendingCell {
    fn start(e: &BytesStart<'_>, row: u32, previous_column: u32) -> Self {
        let address = attribute(e, b"r").and_then(|r| match CellAddress::parse(&r) {
            Ok(address) => Some(address),
            Err(err) => {
                log::warn!("ignoring bad cell reference: {err}");
                None
            }
        });
        Self {
            row: address.map_or(row, |a| a.row),
            column: address.map_or(previous_column + 1, |a| a.column),
            style_index: parse_attribute(e, b"s").unwrap_or(0),
            cell_type: attribute(e, b"t").unwrap_or_else(|| "n".to_string()),
            raw: String::new(),
            inline: None,
        }
    }

    /// Decode the cached value; malformed values become blank
    fn value(self, strings: &SharedStringTable) -> (u32, u32, u32, CellValue) {
        let raw = self.raw.trim();
        let value = match self.cell_type.as_str() {
            "s" => match raw.parse::<u32>().ok().and_then(|i| strings.get(i)) {
                Some(text) => CellValue::SharedString(text.clone()),
                None => {
                    log::warn!("cell refers to missing shared string '{raw}'");
                    CellValue::Blank
                }
            },
            "b" => CellValue::Boolean(parse_bool(raw)),
            "str" | "e" if self.raw.is_empty() => CellValue::Blank,
            "str" | "e" => CellValue::String(decode_excel_escapes(&self.raw)),
            "inlineStr" => self
                .inline
                .map(CellValue::SharedString)
                .unwrap_or_default(),
            "d" => match parse_iso_date(raw) {
                Some(date) => CellValue::Number(time::from_date_time(date)),
                None => {
                    log::warn!("skipping unreadable date '{raw}'");
                    CellValue::Blank
                }
            },
            _ if raw.is_empty() => CellValue::Blank,
            _ => match raw.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => {
                    log::warn!("skipping unreadable number '{raw}'");
                    CellValue::Blank
                }
            },
        };
        (self.row, self.column, self.style_index, value)
    }
}

fn parse_iso_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Apply row-level format and custom height, materializing the row only if needed
fn read_row_attributes(e: &BytesStart<'_>, sheet: &mut Worksheet, index: u32) -> XlsxResult<()> {
    let style_index = if bool_attribute(e, b"customFormat") == Some(true) {
        parse_attribute(e, b"s").unwrap_or(0)
    } else {
        0
    };
    let height = if bool_attribute(e, b"customHeight") == Some(true) {
        parse_attribute::<f64>(e, b"ht")
    } else {
        None
    };
    if style_index == 0 && height.is_none() {
        return Ok(());
    }
    let row = sheet.rows.get_mut(index)?;
    row.style_index = style_index;
    if let Some(height) = height {
        row.set_height(height);
    }
    Ok(())
}

fn store_cell(sheet: &mut Worksheet, pending: PendingCell, strings: &SharedStringTable) -> XlsxResult<()> {
    let (row, column, style_index, value) = pending.value(strings);
    if value.is_blank() && style_index == 0 {
        return Ok(());
    }
    let cell = sheet.cell_mut(row, column)?;
    cell.value = value;
    cell.style_index = style_index;
    Ok(())
}

fn read_sheet_data(
    reader: &mut Reader<&[u8]>,
    sheet: &mut Worksheet,
    strings: &SharedStringTable,
) -> XlsxResult<()> {
    let mut row = 0u32;
    let mut column = 0u32;
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                row = index_attribute(&e, b"r").unwrap_or(row + 1);
                column = 0;
                read_row_attributes(&e, sheet, row)?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let cell = PendingCell::start(&e, row, column);
                column = cell.column;
                pending = Some(cell);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let cell = PendingCell::start(&e, row, column);
                column = cell.column;
                store_cell(sheet, cell, strings)?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"v" => in_value = true,
            Event::Start(e) if e.local_name().as_ref() == b"is" => {
                let text = read_string_item(reader, b"is")?;
                if let Some(cell) = pending.as_mut() {
                    cell.inline = Some(text);
                }
            }
            Event::Text(t) if in_value => {
                if let Some(cell) = pending.as_mut() {
                    cell.raw.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        store_cell(sheet, cell, strings)?;
                    }
                }
                b"sheetData" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn read_merge_cells(reader: &mut Reader<&[u8]>) -> XlsxResult<Vec<CellRange>> {
    let mut merges = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"mergeCell" => {
                match attribute(&e, b"ref").map(|r| CellRange::parse(&r)) {
                    Some(Ok(range)) => merges.push(range),
                    Some(Err(err)) => log::warn!("skipping merge: {err}"),
                    None => log::warn!("skipping merge without a ref"),
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"mergeCells" => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(merges)
}

/// Whether a hyperlink points outside the workbook through a relationship
fn is_external_link(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .any(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id")
}

/// Internal links by anchor cell; external links are kept as they are
///
/// A location without a sheet part points into `sheet_name`.
fn read_hyperlinks(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    preserved: &mut PreservedXml,
    sheet_name: &str,
) -> XlsxResult<Vec<(CellAddress, HyperlinkTarget)>> {
    let mut links = Vec::new();
    loop {
        let start = reader.buffer_position();
        let (e, has_children) = match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"hyperlink" => (e, true),
            Event::Empty(e) if e.local_name().as_ref() == b"hyperlink" => (e, false),
            Event::End(e) if e.local_name().as_ref() == b"hyperlinks" => break,
            Event::Eof => break,
            _ => continue,
        };

        let location = attribute(&e, b"location");
        let anchor = attribute(&e, b"ref")
            .and_then(|r| CellRange::parse(&r).ok())
            .map(|range| range.start);

        match (is_external_link(&e), location, anchor) {
            (false, Some(location), Some(anchor)) => {
                if has_children {
                    reader.read_to_end(e.name())?;
                }
                let target = HyperlinkTarget::parse(&location).or_else(|_| {
                    CellAddress::parse(&location).map(|cell| HyperlinkTarget::new(sheet_name, cell))
                });
                match target {
                    Ok(target) => links.push((anchor, target)),
                    Err(err) => log::warn!("skipping hyperlink to '{location}': {err}"),
                }
            }
            _ => {
                let raw = if has_children {
                    capture_element(reader, xml, start, &e)?
                } else {
                    raw_slice(xml, start, reader.buffer_position())
                };
                preserved.keep_fragment("hyperlinks", raw);
            }
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(xml: &str) -> (Worksheet, PreservedXml) {
        let mut strings = SharedStringTable::new();
        strings.push(RichString::plain("hello"));
        let mut sheet = Worksheet::new("Data");
        let preserved =
            read_worksheet_xml(xml, &mut sheet, &strings, &WorkbookSettings::default()).unwrap();
        (sheet, preserved)
    }

    #[test]
    fn test_read_cells_and_rows() {
        let (sheet, _) = read(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1" s="2" customFormat="1" ht="30" customHeight="1">
<c r="A1" t="s"><v>0</v></c><c r="B1" t="b"><v>1</v></c><c r="C1"><v>2.5</v></c>
<c r="D1" t="str"><f>A1</f><v>hello</v></c><c r="E1" s="3"/>
</row>
<row r="3"><c t="inlineStr"><is><t>inline</t></is></c><c t="d"><v>1900-01-02T00:00:00</v></c><c><v>oops</v></c></row>
</sheetData>
</worksheet>"#,
        );

        assert_eq!(sheet.value(1, 1), CellValue::text("hello"));
        assert_eq!(sheet.value(1, 2), CellValue::Boolean(true));
        assert_eq!(sheet.value(1, 3), CellValue::Number(2.5));
        assert_eq!(sheet.value(1, 4), CellValue::String("hello".into()));
        assert_eq!(sheet.cell(1, 5).map(|c| c.style_index), Some(3));

        let row = sheet.rows.get(1).unwrap();
        assert_eq!(row.style_index, 2);
        assert_eq!(row.custom_height(), Some(30.0));

        assert_eq!(sheet.value(3, 1), CellValue::text("inline"));
        assert_eq!(sheet.value(3, 2), CellValue::Number(2.0));
        assert!(sheet.cell(3, 3).is_none());
    }

    #[test]
    fn test_read_layout() {
        let (sheet, preserved) = read(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetPr><tabColor rgb="FFFF0000"/></sheetPr>
<dimension ref="A1:C3"/>
<sheetViews><sheetView tabSelected="1" workbookViewId="0"><pane xSplit="1" ySplit="2" topLeftCell="B3" activePane="bottomRight" state="frozen"/></sheetView></sheetViews>
<sheetFormatPr defaultRowHeight="18"/>
<cols><col min="1" max="2" width="20" customWidth="1"/><col min="3" max="16384" width="9.140625"/></cols>
<sheetData/>
<mergeCells count="1"><mergeCell ref="A1:C2"/></mergeCells>
<hyperlinks><hyperlink ref="A3" location="'Other Sheet'!B2" display="go"/><hyperlink ref="B3" r:id="rId1"/></hyperlinks>
<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>
<drawing r:id="rId2"/>
</worksheet>"#,
        );

        assert!(sheet.view.selected);
        assert_eq!((sheet.view.frozen_row, sheet.view.frozen_column), (2, 1));
        assert_eq!(sheet.default_row_height(), 18.0);
        assert_eq!(sheet.row_height(7), 18.0);

        assert_eq!(sheet.columns.len(), 2);
        assert_eq!(sheet.columns.width(1), 20.0);
        assert!(sheet.columns.get(2).is_some_and(|c| c.custom_width));

        let anchor = sheet.cell(1, 1).unwrap();
        assert_eq!((anchor.merge_down, anchor.merge_across), (1, 2));

        let link = sheet.cell(3, 1).and_then(|c| c.hyperlink.clone()).unwrap();
        assert_eq!(link.to_string(), "'Other Sheet'!B2");
        assert!(sheet.cell(3, 2).is_none());

        assert!(preserved.contains("sheetPr"));
        assert!(preserved.contains("pageMargins"));
        assert!(preserved.contains("drawing"));
        assert!(!preserved.contains("dimension"));
        assert_eq!(
            preserved.fragments("hyperlinks").collect::<Vec<_>>(),
            vec![r#"<hyperlink ref="B3" r:id="rId1"/>"#]
        );
    }

    #[test]
    fn test_missing_references_follow_previous() {
        let (sheet, _) = read(
            r#"<worksheet><sheetData><row><c><v>1</v></c><c><v>2</v></c></row><row><c r="C2"><v>3</v></c><c><v>4</v></c></row></sheetData></worksheet>"#,
        );
        assert_eq!(sheet.value(1, 2), CellValue::Number(2.0));
        assert_eq!(sheet.value(2, 4), CellValue::Number(4.0));
    }
}
