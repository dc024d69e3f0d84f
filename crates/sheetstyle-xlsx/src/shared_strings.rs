//! `xl/sharedStrings.xml` reading and writing

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;
use crate::styles::{read_font, write_font_properties};
use crate::xml::{decode_excel_escapes, text_element, NS_MAIN, XML_DECLARATION};
use sheetstyle_core::{RichString, SharedStringTable, TextRun};

/// Read the content of a string item (`<si>` or `<is>`) up to its end tag
///
/// Phonetic runs (`<rPh>`) are skipped; they are not part of the text.
pub(crate) fn read_string_item(reader: &mut Reader<&[u8]>, end: &[u8]) -> XlsxResult<RichString> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut plain: Option<String> = None;
    let mut run: Option<TextRun> = None;
    let mut in_text = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth += 1,
                _ if phonetic_depth > 0 => {}
                b"r" => run = Some(TextRun::plain("")),
                b"rPr" => {
                    let font = read_font(reader, b"rPr")?;
                    if let Some(run) = run.as_mut() {
                        run.font = Some(font);
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Text(t) if in_text && phonetic_depth == 0 => {
                let text = decode_excel_escapes(&t.unescape()?);
                match run.as_mut() {
                    Some(run) => run.text.push_str(&text),
                    None => plain.get_or_insert_with(String::new).push_str(&text),
                }
            }
            Event::CData(t) if in_text && phonetic_depth == 0 => {
                let text = String::from_utf8_lossy(&t).into_owned();
                match run.as_mut() {
                    Some(run) => run.text.push_str(&text),
                    None => plain.get_or_insert_with(String::new).push_str(&text),
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"r" if phonetic_depth == 0 => {
                    if let Some(run) = run.take() {
                        runs.push(run);
                    }
                }
                name if name == end => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(if runs.is_empty() {
        RichString::plain(plain.unwrap_or_default())
    } else {
        RichString::from_runs(runs)
    })
}

/// Parse `xl/sharedStrings.xml`, keeping every item at its position
pub(crate) fn read_shared_strings_xml(xml: &str, table: &mut SharedStringTable) -> XlsxResult<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"si" => {
                table.push(read_string_item(&mut reader, b"si")?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                table.push(RichString::default());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Content of a string item, without the enclosing element
pub(crate) fn write_string_item(value: &RichString) -> String {
    if let Some(text) = value.as_plain() {
        return text_element(text);
    }
    let mut s = String::new();
    for run in value.runs() {
        s.push_str("<r>");
        if let Some(font) = &run.font {
            s.push_str(&format!("<rPr>{}</rPr>", write_font_properties(font, "rFont")));
        }
        s.push_str(&text_element(&run.text));
        s.push_str("</r>");
    }
    s
}

/// Serialize the pool; `references` is the number of cells pointing into it
pub(crate) fn to_shared_strings_xml(table: &SharedStringTable, references: usize) -> String {
    let mut xml = format!(
        "{XML_DECLARATION}\n<sst xmlns=\"{NS_MAIN}\" count=\"{references}\" uniqueCount=\"{}\">",
        table.len()
    );
    for item in table.iter() {
        xml.push_str("<si>");
        xml.push_str(&write_string_item(item));
        xml.push_str("</si>");
    }
    xml.push_str("</sst>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetstyle_core::Font;

    #[test]
    fn test_read_plain_and_rich_items() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
<si><t xml:space="preserve"> padded </t></si>
<si><r><t>Total: </t></r><r><rPr><b/><sz val="12"/><rFont val="Arial"/></rPr><t>42</t></r></si>
<si><t>ruby</t><rPh sb="0" eb="4"><t>ignored</t></rPh></si>
<si/>
</sst>"#;
        let mut table = SharedStringTable::new();
        read_shared_strings_xml(xml, &mut table).unwrap();

        assert_eq!(table.len(), 4);
        assert_eq!(table.get(0).and_then(RichString::as_plain), Some(" padded "));

        let rich = table.get(1).unwrap();
        assert!(rich.is_rich());
        assert_eq!(rich.text(), "Total: 42");
        assert_eq!(
            rich.runs()[1].font,
            Some(Font::new().with_bold(true).with_size(12.0).with_name("Arial"))
        );
        assert_eq!(rich.runs()[0].font, None);

        assert_eq!(table.get(2).map(RichString::text), Some("ruby".to_string()));
        assert_eq!(table.get(3).map(RichString::text), Some(String::new()));
    }

    #[test]
    fn test_shared_strings_round_trip() {
        let mut table = SharedStringTable::new();
        table.insert(RichString::plain("a & b"));
        table.insert(RichString::from_runs(vec![
            TextRun::plain("x "),
            TextRun::with_font("y", Font::new().with_italic(true)),
        ]));

        let xml = to_shared_strings_xml(&table, 5);
        assert!(xml.contains("count=\"5\" uniqueCount=\"2\""));
        assert!(xml.contains("<t xml:space=\"preserve\">x </t>"));

        let mut reread = SharedStringTable::new();
        read_shared_strings_xml(&xml, &mut reread).unwrap();
        assert_eq!(reread.get(0), table.get(0));
        assert_eq!(reread.get(1), table.get(1));
    }
}
