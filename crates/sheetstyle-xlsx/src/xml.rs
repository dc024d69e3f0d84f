//! XML helpers shared by the reader and writer

use std::str::FromStr;

use quick_xml::events::BytesStart;
use quick_xml::name::QName;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;

/// Main SpreadsheetML namespace
pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Office document relationships namespace (`r:` prefix)
pub(crate) const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode characters XML cannot carry:
/// - `_x000d_` = CR (carriage return)
/// - `_x0001_` = control character 1
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.get(6..7) == Some("_"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Encode characters XML cannot carry, and underscores that would read as escapes
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (pos, c) in s.char_indices() {
        let is_control = c.is_control() && !matches!(c, '\t' | '\n' | '\r');
        if is_control {
            result.push_str(&format!("_x{:04X}_", c as u32));
        } else if c == '_' && decode_excel_escapes(&s[pos..]).len() != s[pos..].len() {
            result.push_str("_x005F_");
        } else {
            result.push(c);
        }
    }
    result
}

/// Text that needs `xml:space="preserve"` to survive a round trip
pub(crate) fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

/// `<t>` element for a piece of text
pub(crate) fn text_element(text: &str) -> String {
    let escaped = escape_xml(&encode_excel_escapes(text));
    if needs_space_preserve(text) {
        format!("<t xml:space=\"preserve\">{escaped}</t>")
    } else {
        format!("<t>{escaped}</t>")
    }
}

pub(crate) fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Unescaped value of an attribute, by qualified name
pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

pub(crate) fn parse_attribute<T: FromStr>(e: &BytesStart<'_>, name: &[u8]) -> Option<T> {
    attribute(e, name).and_then(|value| value.trim().parse().ok())
}

pub(crate) fn bool_attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<bool> {
    attribute(e, name).map(|value| parse_bool(&value))
}

/// Row or column number written as an integer or a float (`"2"`, `"2.0"`)
pub(crate) fn index_attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<u32> {
    parse_attribute::<f64>(e, name)
        .filter(|value| *value >= 0.0)
        .map(|value| value as u32)
}

/// Local name of an element as a string
pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Copy the element that just started, children included, as raw text
///
/// `start` is the reader position before the start tag was read.
pub(crate) fn capture_element(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    start: usize,
    e: &BytesStart<'_>,
) -> XlsxResult<String> {
    let end = e.name().as_ref().to_vec();
    reader.read_to_end(QName(&end))?;
    Ok(raw_slice(xml, start, reader.buffer_position()))
}

/// Raw text between two reader positions
pub(crate) fn raw_slice(xml: &str, start: usize, end: usize) -> String {
    xml.get(start..end).unwrap_or_default().trim().to_string()
}

/// A child element of a part's root that the model does not cover
#[derive(Debug, Clone, PartialEq)]
struct PreservedElement {
    name: String,
    /// Last sibling before it whose name is in the part's schema order
    after: Option<String>,
    raw: String,
}

/// Unmodelled content of a part, kept verbatim for the rewrite
///
/// Root attributes keep namespace declarations the preserved elements rely
/// on. Elements are replayed in schema order; elements the order does not
/// name follow the sibling they came after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreservedXml {
    root_attributes: Vec<(String, String)>,
    elements: Vec<PreservedElement>,
    last_listed: Option<String>,
    /// Unmodelled children of modelled elements, by parent name
    fragments: Vec<(String, String)>,
}

impl PreservedXml {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the attributes of the root start tag as written
    pub(crate) fn set_root_attributes(&mut self, e: &BytesStart<'_>) {
        self.root_attributes = e
            .attributes()
            .flatten()
            .map(|attr| {
                (
                    String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                )
            })
            .collect();
    }

    /// Record that a modelled element was seen
    pub(crate) fn note(&mut self, name: &str, order: &[&str]) {
        if order.contains(&name) {
            self.last_listed = Some(name.to_string());
        }
    }

    /// Keep an unmodelled element
    pub(crate) fn keep(&mut self, name: &str, raw: String, order: &[&str]) {
        self.elements.push(PreservedElement {
            name: name.to_string(),
            after: self.last_listed.clone(),
            raw,
        });
        self.note(name, order);
    }

    /// Keep a child of a modelled element, e.g. an external hyperlink
    pub(crate) fn keep_fragment(&mut self, parent: &str, raw: String) {
        self.fragments.push((parent.to_string(), raw));
    }

    pub(crate) fn fragments<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a str> {
        self.fragments
            .iter()
            .filter(move |(name, _)| name == parent)
            .map(|(_, raw)| raw.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.iter().any(|element| element.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.fragments.is_empty()
    }

    /// Root start tag carrying the kept attributes plus any required ones missing
    pub(crate) fn root_tag(&self, name: &str, required: &[(&str, &str)]) -> String {
        let mut tag = format!("<{name}");
        for (key, value) in &self.root_attributes {
            tag.push_str(&format!(" {key}=\"{value}\""));
        }
        for (key, value) in required {
            if !self.root_attributes.iter().any(|(existing, _)| existing == key) {
                tag.push_str(&format!(" {key}=\"{}\"", escape_xml(value)));
            }
        }
        tag.push('>');
        tag
    }

    fn push_matching(&self, out: &mut String, matches: impl Fn(&PreservedElement) -> bool) {
        for element in self.elements.iter().filter(|element| matches(element)) {
            out.push('\n');
            out.push_str(&element.raw);
        }
    }

    /// Write the children of a root element in schema order
    ///
    /// `own` writes the modelled content for a name and returns whether it
    /// did; otherwise the preserved elements of that name are written.
    pub(crate) fn write_children(
        &self,
        out: &mut String,
        order: &[&str],
        mut own: impl FnMut(&str, &mut String) -> XlsxResult<bool>,
    ) -> XlsxResult<()> {
        let unlisted = |element: &PreservedElement| !order.contains(&element.name.as_str());
        self.push_matching(out, |element| unlisted(element) && element.after.is_none());
        for &name in order {
            if !own(name, out)? {
                self.push_matching(out, |element| element.name == name);
            }
            self.push_matching(out, |element| {
                unlisted(element) && element.after.as_deref() == Some(name)
            });
        }
        Ok(())
    }
}
