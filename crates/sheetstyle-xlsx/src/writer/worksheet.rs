//! Worksheet part writer

use crate::error::XlsxResult;
use crate::reader::WORKSHEET_ORDER;
use crate::shared_strings::write_string_item;
use crate::xml::{escape_xml, PreservedXml, NS_MAIN, NS_RELATIONSHIPS, XML_DECLARATION};
use sheetstyle_core::{Cell, CellAddress, CellValue, Row, SharedStringTable, Worksheet};

/// Serialize a worksheet; also returns how many cells refer to shared strings
pub(crate) fn to_worksheet_xml(
    sheet: &Worksheet,
    strings: &SharedStringTable,
    preserved: &PreservedXml,
) -> XlsxResult<(String, usize)> {
    let mut xml = format!("{XML_DECLARATION}\n");
    xml.push_str(&preserved.root_tag(
        "worksheet",
        &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)],
    ));

    let mut references = 0;
    preserved.write_children(&mut xml, WORKSHEET_ORDER, |name, out| {
        match name {
            "dimension" => {
                out.push_str(&format!("\n<dimension ref=\"{}\"/>", sheet.dimension()));
            }
            "sheetViews" => write_sheet_views(sheet, out),
            "sheetFormatPr" => out.push_str(&format!(
                "\n<sheetFormatPr defaultRowHeight=\"{}\"/>",
                sheet.default_row_height()
            )),
            "cols" => write_cols(sheet, out),
            "sheetData" => references = write_sheet_data(sheet, strings, out),
            "mergeCells" => write_merge_cells(sheet, out),
            "hyperlinks" => write_hyperlinks(sheet, preserved, out),
            _ => return Ok(false),
        }
        Ok(true)
    })?;

    xml.push_str("\n</worksheet>");
    Ok((xml, references))
}

fn write_sheet_views(sheet: &Worksheet, out: &mut String) {
    let view = &sheet.view;
    out.push_str("\n<sheetViews><sheetView");
    if view.selected {
        out.push_str(" tabSelected=\"1\"");
    }
    out.push_str(" workbookViewId=\"0\"");

    let (rows, columns) = (view.frozen_row, view.frozen_column);
    if rows == 0 && columns == 0 {
        out.push_str("/></sheetViews>");
        return;
    }

    let active_pane = match (rows > 0, columns > 0) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        _ => "topRight",
    };
    out.push_str("><pane");
    if columns > 0 {
        out.push_str(&format!(" xSplit=\"{columns}\""));
    }
    if rows > 0 {
        out.push_str(&format!(" ySplit=\"{rows}\""));
    }
    out.push_str(&format!(
        " topLeftCell=\"{}\" activePane=\"{active_pane}\" state=\"frozen\"/>",
        CellAddress::new(rows + 1, columns + 1)
    ));
    out.push_str("</sheetView></sheetViews>");
}

/// Runs of similar columns, one `<col>` each
fn write_cols(sheet: &Worksheet, out: &mut String) {
    let ranges = sheet.columns.to_ranges();
    if ranges.is_empty() {
        return;
    }
    out.push_str("\n<cols>");
    for range in ranges {
        out.push_str(&format!(
            "<col min=\"{}\" max=\"{}\" width=\"{}\"",
            range.min, range.max, range.width
        ));
        if range.style_index != 0 {
            out.push_str(&format!(" style=\"{}\"", range.style_index));
        }
        if range.best_fit {
            out.push_str(" bestFit=\"1\"");
        }
        if range.custom_width {
            out.push_str(" customWidth=\"1\"");
        }
        out.push_str("/>");
    }
    out.push_str("</cols>");
}

fn is_row_written(row: &Row) -> bool {
    row.style_index != 0 || row.custom_height().is_some() || row.is_used()
}

fn write_sheet_data(sheet: &Worksheet, strings: &SharedStringTable, out: &mut String) -> usize {
    let mut references = 0;
    let mut rows = sheet.rows.iter().filter(|(_, row)| is_row_written(row)).peekable();
    if rows.peek().is_none() {
        out.push_str("\n<sheetData/>");
        return 0;
    }

    out.push_str("\n<sheetData>");
    for (index, row) in rows {
        out.push_str(&format!("<row r=\"{index}\""));
        if row.style_index != 0 {
            out.push_str(&format!(" s=\"{}\" customFormat=\"1\"", row.style_index));
        }
        if let Some(height) = row.custom_height() {
            out.push_str(&format!(" ht=\"{height}\" customHeight=\"1\""));
        }
        out.push('>');
        for (column, cell) in row.cells.iter().filter(|(_, cell)| cell.is_used()) {
            if write_cell(CellAddress::new(index, column), cell, strings, out) {
                references += 1;
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData>");
    references
}

/// Write one `<c>`; returns whether it refers to a shared string
fn write_cell(address: CellAddress, cell: &Cell, strings: &SharedStringTable, out: &mut String) -> bool {
    out.push_str(&format!("<c r=\"{address}\""));
    if cell.style_index != 0 {
        out.push_str(&format!(" s=\"{}\"", cell.style_index));
    }

    match &cell.value {
        CellValue::Boolean(b) => {
            out.push_str(&format!(" t=\"b\"><v>{}</v></c>", u8::from(*b)));
        }
        CellValue::Number(n) if n.is_finite() => {
            out.push_str(&format!("><v>{n}</v></c>"));
        }
        CellValue::Number(n) => {
            log::warn!("writing {address} blank: {n} cannot be stored");
            out.push_str("/>");
        }
        CellValue::SharedString(text) if !text.is_empty() => match strings.lookup(text) {
            Some(index) => {
                out.push_str(&format!(" t=\"s\"><v>{index}</v></c>"));
                return true;
            }
            None => {
                out.push_str(&format!(
                    " t=\"inlineStr\"><is>{}</is></c>",
                    write_string_item(text)
                ));
            }
        },
        CellValue::String(text) if !text.is_empty() => {
            out.push_str(&format!(" t=\"str\"><v>{}</v></c>", escape_xml(text)));
        }
        _ => out.push_str("/>"),
    }
    false
}

fn write_merge_cells(sheet: &Worksheet, out: &mut String) {
    let merges = sheet.merges();
    if merges.is_empty() {
        return;
    }
    out.push_str(&format!("\n<mergeCells count=\"{}\">", merges.len()));
    for range in merges {
        out.push_str(&format!("<mergeCell ref=\"{}\"/>", range.to_a1_string()));
    }
    out.push_str("</mergeCells>");
}

/// Internal links from the cells, then external links as they were read
fn write_hyperlinks(sheet: &Worksheet, preserved: &PreservedXml, out: &mut String) {
    let links = sheet.hyperlinks();
    let external: Vec<&str> = preserved.fragments("hyperlinks").collect();
    if links.is_empty() && external.is_empty() {
        return;
    }

    out.push_str("\n<hyperlinks>");
    for (address, target) in links {
        let display = sheet.value(address.row, address.column).to_string();
        out.push_str(&format!(
            "<hyperlink ref=\"{address}\" location=\"{}\"",
            escape_xml(&target.to_string())
        ));
        if !display.is_empty() {
            out.push_str(&format!(" display=\"{}\"", escape_xml(&display)));
        }
        out.push_str("/>");
    }
    for raw in external {
        out.push_str(raw);
    }
    out.push_str("</hyperlinks>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetstyle_core::{CellRange, HyperlinkTarget, RichString};

    fn write(sheet: &Worksheet, strings: &SharedStringTable) -> (String, usize) {
        to_worksheet_xml(sheet, strings, &PreservedXml::new()).unwrap()
    }

    #[test]
    fn test_write_cells() {
        let mut strings = SharedStringTable::new();
        strings.insert(RichString::plain("hello"));

        let mut sheet = Worksheet::new("Data");
        sheet.set_value(1, 1, "hello").unwrap();
        sheet.set_value(1, 2, true).unwrap();
        sheet.set_value(2, 1, 2.5).unwrap();
        sheet.set_value(2, 2, f64::NAN).unwrap();
        sheet.set_value(3, 1, "not pooled").unwrap();
        sheet.cell_mut(3, 3).unwrap().style_index = 4;

        let (xml, references) = write(&sheet, &strings);
        assert_eq!(references, 1);
        assert!(xml.contains("<c r=\"A1\" t=\"s\"><v>0</v></c>"));
        assert!(xml.contains("<c r=\"B1\" t=\"b\"><v>1</v></c>"));
        assert!(xml.contains("<c r=\"A2\"><v>2.5</v></c>"));
        assert!(xml.contains("<c r=\"B2\"/>"));
        assert!(xml.contains("<c r=\"A3\" t=\"inlineStr\"><is><t>not pooled</t></is></c>"));
        assert!(xml.contains("<c r=\"C3\" s=\"4\"/>"));
        assert!(xml.contains("<dimension ref=\"A1:C3\"/>"));
    }

    #[test]
    fn test_write_layout() {
        let mut sheet = Worksheet::new("Data");
        sheet.view.selected = true;
        sheet.set_frozen(1, 0);
        sheet.columns.get_mut(2).unwrap().set_width(10.0);
        sheet.columns.get_mut(2).unwrap().custom_width = true;
        sheet.rows.get_mut(4).unwrap().set_height(30.0);
        sheet.merge(&CellRange::parse("A1:B2").unwrap()).unwrap();
        sheet.cell_mut(5, 1).unwrap().hyperlink =
            Some(HyperlinkTarget::new("Other", CellAddress::new(1, 1)));

        let (xml, _) = write(&sheet, &SharedStringTable::new());
        assert!(xml.contains(
            "<sheetView tabSelected=\"1\" workbookViewId=\"0\"><pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>"
        ));
        assert!(xml.contains("<col min=\"2\" max=\"2\" width=\"10.83\" customWidth=\"1\"/>"));
        assert!(xml.contains("<col min=\"3\" max=\"16384\""));
        assert!(xml.contains("<row r=\"4\" ht=\"30\" customHeight=\"1\"></row>"));
        assert!(xml.contains("<mergeCells count=\"1\"><mergeCell ref=\"A1:B2\"/></mergeCells>"));
        assert!(xml.contains("<hyperlink ref=\"A5\" location=\"Other!A1\"/>"));

        let order: Vec<usize> = ["<dimension", "<sheetViews", "<cols", "<sheetData", "<mergeCells", "<hyperlinks"]
            .iter()
            .map(|tag| xml.find(tag).unwrap())
            .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_empty_sheet() {
        let (xml, references) = write(&Worksheet::new("Empty"), &SharedStringTable::new());
        assert_eq!(references, 0);
        assert!(xml.contains("<dimension ref=\"A1\"/>"));
        assert!(xml.contains("<sheetData/>"));
        assert!(!xml.contains("<cols>"));
        assert!(!xml.contains("<mergeCells"));
    }
}
