//! OPC package: the zip container, its content types and relationships
//!
//! Every part is held in memory as raw bytes. Parts the reader does not
//! model are written back exactly as they were read.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek, Write};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::{attribute, escape_xml, PreservedXml, XML_DECLARATION};

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";
pub(crate) const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship types
pub mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const CALC_CHAIN: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain";
}

/// Content types
pub mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const WORKBOOK: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
}

// ==================== Paths ====================

fn directory_of(part: &str) -> &str {
    part.rfind('/').map(|pos| &part[..pos]).unwrap_or("")
}

/// Part name a relationship target points at, relative to the source part
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let base = directory_of(source_part);
            if base.is_empty() {
                target.to_string()
            } else {
                format!("{base}/{target}")
            }
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Target text for a part, relative to the source part where possible
pub(crate) fn relative_target(source_part: &str, part: &str) -> String {
    let base = directory_of(source_part);
    if base.is_empty() {
        return part.to_string();
    }
    match part.strip_prefix(base).and_then(|rest| rest.strip_prefix('/')) {
        Some(relative) => relative.to_string(),
        None => format!("/{part}"),
    }
}

/// Relationships part belonging to a part (`xl/_rels/workbook.xml.rels`)
pub(crate) fn rels_path(part: &str) -> String {
    let directory = directory_of(part);
    let file = part.rsplit('/').next().unwrap_or(part);
    if directory.is_empty() {
        format!("_rels/{file}.rels")
    } else {
        format!("{directory}/_rels/{file}.rels")
    }
}

/// Whether an external target could not be parsed as a URI
///
/// Flags what URI parsers reject outright: empty targets, whitespace or
/// control characters, backslashes, characters that must be escaped and
/// percent signs not followed by two hex digits.
pub(crate) fn is_malformed_uri(target: &str) -> bool {
    if target.trim().is_empty() {
        return true;
    }
    if target
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '\\' | '"' | '<' | '>'))
    {
        return true;
    }
    let bytes = target.as_bytes();
    bytes.iter().enumerate().any(|(pos, &b)| {
        b == b'%'
            && !(bytes.get(pos + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(pos + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

// ==================== Relationships ====================

/// A relationship from one part to another part or an external resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"`
    pub external: bool,
}

/// Contents of a `.rels` part
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(xml: &str) -> XlsxResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut items = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    let (Some(id), Some(target)) = (attribute(&e, b"Id"), attribute(&e, b"Target"))
                    else {
                        log::warn!("skipping relationship without an id or target");
                        continue;
                    };
                    items.push(Relationship {
                        id,
                        rel_type: attribute(&e, b"Type").unwrap_or_default(),
                        target,
                        external: attribute(&e, b"TargetMode").as_deref() == Some("External"),
                    });
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(Self { items })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            "{XML_DECLARATION}\n<Relationships xmlns=\"{NS_PACKAGE_RELATIONSHIPS}\">"
        );
        for rel in &self.items {
            xml.push_str(&format!(
                "\n<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"",
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(" TargetMode=\"External\"");
            }
            xml.push_str("/>");
        }
        xml.push_str("\n</Relationships>");
        xml
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|rel| rel.id == id)
    }

    pub fn of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.items.iter().filter(move |rel| rel.rel_type == rel_type)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|rel| rel.rel_type == rel_type)
    }

    /// First `rIdN` not in use
    pub fn next_id(&self) -> String {
        let mut n = 1;
        while self.get(&format!("rId{n}")).is_some() {
            n += 1;
        }
        format!("rId{n}")
    }

    /// Add an internal relationship under a fresh id
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn push(&mut self, rel: Relationship) {
        self.items.push(rel);
    }

    pub fn retain(&mut self, f: impl FnMut(&Relationship) -> bool) {
        self.items.retain(f);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ==================== Content types ====================

/// Contents of `[Content_Types].xml`
///
/// Override part names are stored without the leading slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Content types of an empty package
    pub fn new() -> Self {
        let mut types = Self::default();
        types.ensure_default("rels", content_type::RELATIONSHIPS);
        types.ensure_default("xml", content_type::XML);
        types
    }

    pub fn parse(xml: &str) -> XlsxResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut types = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(ct)) =
                            (attribute(&e, b"Extension"), attribute(&e, b"ContentType"))
                        {
                            types.defaults.push((ext, ct));
                        }
                    }
                    b"Override" => {
                        if let (Some(part), Some(ct)) =
                            (attribute(&e, b"PartName"), attribute(&e, b"ContentType"))
                        {
                            types
                                .overrides
                                .push((part.trim_start_matches('/').to_string(), ct));
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(types)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!("{XML_DECLARATION}\n<Types xmlns=\"{NS_CONTENT_TYPES}\">");
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                "\n<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                "\n<Override PartName=\"/{}\" ContentType=\"{}\"/>",
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("\n</Types>");
        xml
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    pub fn set_override(&mut self, part: &str, content_type: &str) {
        match self.overrides.iter_mut().find(|(name, _)| name == part) {
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self
                .overrides
                .push((part.to_string(), content_type.to_string())),
        }
    }

    pub fn has_override(&self, part: &str) -> bool {
        self.overrides.iter().any(|(name, _)| name == part)
    }

    pub fn remove_override(&mut self, part: &str) {
        self.overrides.retain(|(name, _)| name != part);
    }

    /// Keep overrides whose part passes a predicate
    pub fn retain_overrides(&mut self, mut f: impl FnMut(&str) -> bool) {
        self.overrides.retain(|(name, _)| f(name));
    }

    /// Content type of a part, override first
    pub fn content_type(&self, part: &str) -> Option<&str> {
        if let Some((_, ct)) = self.overrides.iter().find(|(name, _)| name == part) {
            return Some(ct);
        }
        let extension = part.rsplit('.').next()?;
        self.defaults
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct.as_str())
    }
}

// ==================== Package ====================

/// An xlsx package held in memory
#[derive(Debug, Clone)]
pub struct Package {
    parts: BTreeMap<String, Vec<u8>>,
    content_types: ContentTypes,
    workbook_part: String,
    /// Unmodelled XML of regenerated parts, keyed by part name
    pub(crate) preserved: HashMap<String, PreservedXml>,
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

impl Package {
    /// An empty package with a workbook part at the usual place
    pub fn new() -> Self {
        let mut root = Relationships::new();
        root.add(rel_type::OFFICE_DOCUMENT, DEFAULT_WORKBOOK_PART);
        let mut parts = BTreeMap::new();
        parts.insert(ROOT_RELS_PART.to_string(), root.to_xml().into_bytes());
        Self {
            parts,
            content_types: ContentTypes::new(),
            workbook_part: DEFAULT_WORKBOOK_PART.to_string(),
            preserved: HashMap::new(),
        }
    }

    /// Read a package and check its relationships
    ///
    /// Fails with `TransientLock` when an external relationship target is
    /// malformed.
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let package = Self::read_unchecked(reader)?;
        package.check_relationships()?;
        Ok(package)
    }

    /// Read a package without validating relationship targets
    pub fn read_unchecked<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| XlsxError::InvalidFormat(format!("not a zip package: {e}")))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.insert(name, data);
        }

        let content_types = match parts.get(CONTENT_TYPES_PART) {
            Some(data) => ContentTypes::parse(utf8(CONTENT_TYPES_PART, data)?)?,
            None => {
                return Err(XlsxError::InvalidFormat(
                    "Missing [Content_Types].xml".into(),
                ))
            }
        };

        let mut package = Self {
            parts,
            content_types,
            workbook_part: DEFAULT_WORKBOOK_PART.to_string(),
            preserved: HashMap::new(),
        };
        if let Some(rel) = package
            .relationships("")?
            .first_of_type(rel_type::OFFICE_DOCUMENT)
        {
            package.workbook_part = resolve_target("", &rel.target);
        }
        if !package.contains_part(&package.workbook_part) {
            return Err(XlsxError::MissingPart(package.workbook_part.clone()));
        }

        package.remove_calc_chain()?;
        Ok(package)
    }

    /// Part name of the workbook
    pub fn workbook_part(&self) -> &str {
        &self.workbook_part
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(name).map(Vec::as_slice)
    }

    /// Text of an XML part
    pub fn part_text(&self, name: &str) -> XlsxResult<Option<&str>> {
        self.parts
            .get(name)
            .map(|data| utf8(name, data))
            .transpose()
    }

    pub fn contains_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn set_part<S: Into<String>>(&mut self, name: S, data: Vec<u8>) {
        self.parts.insert(name.into(), data);
    }

    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Relationships of a part; `""` for the package root
    ///
    /// A part without a relationships part has none.
    pub fn relationships(&self, part: &str) -> XlsxResult<Relationships> {
        let path = if part.is_empty() {
            ROOT_RELS_PART.to_string()
        } else {
            rels_path(part)
        };
        match self.part_text(&path)? {
            Some(xml) => Relationships::parse(xml),
            None => Ok(Relationships::new()),
        }
    }

    /// Replace the relationships of a part; an empty set removes the rels part
    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) {
        let path = if part.is_empty() {
            ROOT_RELS_PART.to_string()
        } else {
            rels_path(part)
        };
        if rels.is_empty() && !part.is_empty() {
            self.parts.remove(&path);
        } else {
            self.parts.insert(path, rels.to_xml().into_bytes());
        }
    }

    /// Part a source part relates to with the first relationship of a type
    pub fn related_part(&self, source_part: &str, rel_type: &str) -> XlsxResult<Option<String>> {
        Ok(self
            .relationships(source_part)?
            .first_of_type(rel_type)
            .filter(|rel| !rel.external)
            .map(|rel| resolve_target(source_part, &rel.target)))
    }

    /// Drop the calculation chain; it is rebuilt by the application
    fn remove_calc_chain(&mut self) -> XlsxResult<()> {
        let workbook_part = self.workbook_part.clone();
        let mut rels = self.relationships(&workbook_part)?;
        let Some(rel) = rels.first_of_type(rel_type::CALC_CHAIN).cloned() else {
            return Ok(());
        };
        let part = resolve_target(&workbook_part, &rel.target);
        self.parts.remove(&part);
        self.content_types.remove_override(&part);
        rels.retain(|r| r.id != rel.id);
        self.set_relationships(&workbook_part, &rels);
        log::debug!("dropped calculation chain {part}");
        Ok(())
    }

    /// Fail with `TransientLock` if any external target is malformed
    pub fn check_relationships(&self) -> XlsxResult<()> {
        for (name, data) in &self.parts {
            if !name.ends_with(".rels") {
                continue;
            }
            let rels = Relationships::parse(utf8(name, data)?)?;
            let malformed = rels
                .iter()
                .find(|rel| rel.external && is_malformed_uri(&rel.target))
                .map(|rel| rel.target.clone());
            if let Some(target) = malformed {
                return Err(XlsxError::TransientLock(format!(
                    "malformed relationship target '{target}' in {name}"
                )));
            }
        }
        Ok(())
    }

    /// Remove external relationships from every worksheet
    ///
    /// Returns the number of relationships removed.
    pub fn clean_external_worksheet_relationships(&mut self) -> XlsxResult<usize> {
        let workbook_part = self.workbook_part.clone();
        let sheets: Vec<String> = self
            .relationships(&workbook_part)?
            .of_type(rel_type::WORKSHEET)
            .map(|rel| resolve_target(&workbook_part, &rel.target))
            .collect();

        let mut removed = 0;
        for sheet in sheets {
            let mut rels = self.relationships(&sheet)?;
            let before = rels.len();
            rels.retain(|rel| !rel.external);
            if rels.len() != before {
                log::warn!(
                    "removed {} external relationship(s) from {sheet}",
                    before - rels.len()
                );
                removed += before - rels.len();
                self.set_relationships(&sheet, &rels);
            }
        }
        Ok(removed)
    }

    /// Write the package as a zip archive
    ///
    /// `[Content_Types].xml` and the root relationships come first.
    pub fn write<W: Write + Seek>(&self, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file(CONTENT_TYPES_PART, options)?;
        zip.write_all(self.content_types.to_xml().as_bytes())?;

        if let Some(root) = self.parts.get(ROOT_RELS_PART) {
            zip.start_file(ROOT_RELS_PART, options)?;
            zip.write_all(root)?;
        }

        for (name, data) in &self.parts {
            if name == CONTENT_TYPES_PART || name == ROOT_RELS_PART {
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn utf8<'a>(name: &str, data: &'a [u8]) -> XlsxResult<&'a str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    std::str::from_utf8(data).map_err(|e| XlsxError::Parse(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"),
            "xl/drawings/drawing1.xml"
        );
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/styles.xml"),
            "xl/styles.xml"
        );
    }

    #[test]
    fn test_relative_target_and_rels_path() {
        assert_eq!(
            relative_target("xl/workbook.xml", "xl/worksheets/sheet2.xml"),
            "worksheets/sheet2.xml"
        );
        assert_eq!(relative_target("xl/workbook.xml", "other/a.xml"), "/other/a.xml");
        assert_eq!(rels_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(
            rels_path("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_malformed_uri() {
        assert!(!is_malformed_uri("https://example.com/a%20b"));
        assert!(!is_malformed_uri("mailto:someone@example.com"));
        assert!(is_malformed_uri("mailto:bad address"));
        assert!(is_malformed_uri("file:///C:\\docs\\x.xlsx"));
        assert!(is_malformed_uri("http://x/%zz"));
        assert!(is_malformed_uri(""));
    }

    #[test]
    fn test_relationships_round_trip() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(rel_type::WORKSHEET, "worksheets/sheet1.xml"), "rId1");
        rels.push(Relationship {
            id: "rId3".into(),
            rel_type: "http://example.com/link".into(),
            target: "http://example.com/?a=1&b=2".into(),
            external: true,
        });
        assert_eq!(rels.next_id(), "rId2");

        let parsed = Relationships::parse(&rels.to_xml()).unwrap();
        assert_eq!(parsed, rels);
        assert_eq!(parsed.get("rId3").map(|r| r.external), Some(true));
    }

    #[test]
    fn test_content_types() {
        let xml = r#"<?xml version="1.0"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;
        let mut types = ContentTypes::parse(xml).unwrap();
        assert_eq!(types.content_type("xl/workbook.xml"), Some(content_type::WORKBOOK));
        assert_eq!(types.content_type("xl/media/image1.PNG"), Some("image/png"));

        types.ensure_default("xml", content_type::XML);
        types.remove_override("xl/workbook.xml");
        let reparsed = ContentTypes::parse(&types.to_xml()).unwrap();
        assert_eq!(reparsed.content_type("xl/workbook.xml"), Some(content_type::XML));
    }

    fn zip_of(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in parts {
            zip.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    const TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/calcChain.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.calcChain+xml"/></Types>"#;
    const ROOT: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
    const WORKBOOK_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/calcChain" Target="calcChain.xml"/></Relationships>"#;
    const SHEET_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="mailto:not an address" TargetMode="External"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#;

    fn sample(sheet_rels: &str) -> Vec<u8> {
        zip_of(&[
            (CONTENT_TYPES_PART, TYPES),
            (ROOT_RELS_PART, ROOT),
            ("xl/workbook.xml", "<workbook/>"),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/calcChain.xml", "<calcChain/>"),
            ("xl/worksheets/sheet1.xml", "<worksheet/>"),
            ("xl/worksheets/_rels/sheet1.xml.rels", sheet_rels),
        ])
    }

    #[test]
    fn test_read_drops_calc_chain() {
        let package = Package::read_unchecked(Cursor::new(sample(SHEET_RELS))).unwrap();
        assert_eq!(package.workbook_part(), "xl/workbook.xml");
        assert!(!package.contains_part("xl/calcChain.xml"));
        assert!(package
            .relationships("xl/workbook.xml")
            .unwrap()
            .first_of_type(rel_type::CALC_CHAIN)
            .is_none());
        assert_eq!(package.content_types().content_type("xl/calcChain.xml"), Some("application/xml"));
    }

    #[test]
    fn test_malformed_target_is_transient_and_cleanable() {
        let err = Package::read(Cursor::new(sample(SHEET_RELS))).unwrap_err();
        assert!(matches!(err, XlsxError::TransientLock(_)));

        let mut package = Package::read_unchecked(Cursor::new(sample(SHEET_RELS))).unwrap();
        assert_eq!(package.clean_external_worksheet_relationships().unwrap(), 1);
        package.check_relationships().unwrap();

        let rels = package.relationships("xl/worksheets/sheet1.xml").unwrap();
        assert_eq!(rels.len(), 1);
        assert_eq!(rels.iter().next().map(|r| r.id.as_str()), Some("rId2"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = Package::read(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }

    #[test]
    fn test_write_puts_content_types_first() {
        let package = Package::read_unchecked(Cursor::new(sample(WORKBOOK_RELS))).unwrap();
        let mut out = Cursor::new(Vec::new());
        package.write(&mut out).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(out.into_inner())).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), CONTENT_TYPES_PART);
        assert_eq!(archive.by_index(1).unwrap().name(), ROOT_RELS_PART);
        assert!(archive.by_name("xl/worksheets/sheet1.xml").is_ok());
    }
}
