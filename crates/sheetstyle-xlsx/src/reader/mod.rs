//! XLSX reader

mod worksheet;

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{rel_type, resolve_target, Package};
use crate::shared_strings::read_shared_strings_xml;
use crate::styles::read_styles_xml;
use crate::xml::{attribute, capture_element, local_name, parse_attribute, raw_slice, PreservedXml};
use sheetstyle_core::{
    DefinedName, NameScope, SheetVisibility, StyleRegistry, Workbook, WorkbookSettings, Worksheet,
};

pub(crate) use worksheet::WORKSHEET_ORDER;

/// Children of `<workbook>` in schema order
pub(crate) const WORKBOOK_ORDER: &[&str] = &[
    "fileVersion",
    "fileSharing",
    "workbookPr",
    "workbookProtection",
    "bookViews",
    "sheets",
    "functionGroups",
    "externalReferences",
    "definedNames",
    "calcPr",
    "oleSize",
    "customWorkbookViews",
    "pivotCaches",
    "smartTagPr",
    "smartTagTypes",
    "webPublishing",
    "fileRecoveryPr",
    "webPublishObjects",
    "extLst",
];

/// A `<sheet>` entry of the workbook part
#[derive(Debug)]
struct SheetEntry {
    name: String,
    visibility: SheetVisibility,
    relationship_id: String,
}

/// A `<definedName>` entry; `local_sheet` is the 0-based `localSheetId`
#[derive(Debug)]
struct NameEntry {
    name: String,
    local_sheet: Option<usize>,
    refers_to: String,
}

#[derive(Debug, Default)]
struct WorkbookEntries {
    sheets: Vec<SheetEntry>,
    names: Vec<NameEntry>,
    active_tab: Option<usize>,
}

/// Value of a namespaced `id` attribute such as `r:id`
fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id")
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn parse_visibility(state: Option<&str>) -> SheetVisibility {
    match state {
        Some("hidden") => SheetVisibility::Hidden,
        Some("veryHidden") => SheetVisibility::VeryHidden,
        _ => SheetVisibility::Visible,
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(XlsxError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut package = Package::read(reader)?;
        Self::read_package(&mut package, &WorkbookSettings::default())
    }

    /// Build a workbook from a package
    ///
    /// Unmodelled XML of the workbook, styles and worksheet parts is kept
    /// on the package for the next write.
    pub fn read_package(package: &mut Package, settings: &WorkbookSettings) -> XlsxResult<Workbook> {
        let workbook_part = package.workbook_part().to_string();
        let workbook_xml = package
            .part_text(&workbook_part)?
            .ok_or_else(|| XlsxError::MissingPart(workbook_part.clone()))?
            .to_string();
        let (entries, preserved) = Self::read_workbook_xml(&workbook_xml)?;
        package.preserved.insert(workbook_part.clone(), preserved);

        let mut workbook = Workbook::empty(settings.clone());

        match package.related_part(&workbook_part, rel_type::STYLES)? {
            Some(part) => match package.part_text(&part)? {
                Some(xml) => {
                    let (registry, preserved) = read_styles_xml(xml)?;
                    workbook.styles = registry;
                    package.preserved.insert(part, preserved);
                }
                None => log::warn!("styles part {part} is missing, using defaults"),
            },
            None => workbook.styles = StyleRegistry::new(),
        }

        if let Some(part) = package.related_part(&workbook_part, rel_type::SHARED_STRINGS)? {
            if let Some(xml) = package.part_text(&part)? {
                read_shared_strings_xml(xml, workbook.shared_strings_mut())?;
            }
        }

        let rels = package.relationships(&workbook_part)?;
        for entry in &entries.sheets {
            let rel = rels
                .get(&entry.relationship_id)
                .filter(|rel| !rel.external)
                .ok_or_else(|| {
                    XlsxError::Parse(format!(
                        "sheet '{}' refers to unknown relationship {}",
                        entry.name, entry.relationship_id
                    ))
                })?;
            let part = resolve_target(&workbook_part, &rel.target);
            let xml = package
                .part_text(&part)?
                .ok_or_else(|| XlsxError::MissingPart(part.clone()))?;

            let mut sheet = Worksheet::new(entry.name.as_str());
            let preserved =
                worksheet::read_worksheet_xml(xml, &mut sheet, workbook.shared_strings(), settings)?;
            sheet.source = Some(part.clone());
            package.preserved.insert(part, preserved);
            workbook.push_worksheet(sheet);
            log::debug!("read worksheet '{}'", entry.name);
        }

        for (pos, entry) in entries.sheets.iter().enumerate() {
            if entry.visibility != SheetVisibility::Visible {
                if let Err(e) = workbook.set_visibility(pos as u32 + 1, entry.visibility) {
                    log::warn!("keeping sheet '{}' visible: {e}", entry.name);
                }
            }
        }

        let any_selected = workbook.worksheets().any(|sheet| sheet.view.selected);
        if let (false, Some(tab)) = (any_selected, entries.active_tab) {
            if let Err(e) = workbook.set_active_sheet(tab as u32 + 1) {
                log::warn!("ignoring active tab {tab}: {e}");
            }
        }

        for entry in entries.names {
            if entry.refers_to.contains('(') {
                log::warn!("skipping defined name '{}' with a formula", entry.name);
                continue;
            }
            let scope = match entry.local_sheet {
                Some(_) => NameScope::Worksheet,
                None => NameScope::Workbook,
            };
            let mut name = DefinedName::parse(entry.name, &entry.refers_to, scope);
            if name.sheet.is_none() {
                name.sheet = entry
                    .local_sheet
                    .and_then(|pos| entries.sheets.get(pos))
                    .map(|sheet| sheet.name.clone());
            }
            workbook.defined_names.insert(name);
        }

        Ok(workbook)
    }

    fn read_workbook_xml(xml: &str) -> XlsxResult<(WorkbookEntries, PreservedXml)> {
        let mut reader = Reader::from_str(xml);
        let mut entries = WorkbookEntries::default();
        let mut preserved = PreservedXml::new();

        loop {
            let start = reader.buffer_position();
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"workbook" => {
                    preserved.set_root_attributes(&e);
                }
                Event::Start(e) => {
                    let name = local_name(&e);
                    match name.as_str() {
                        "sheets" => Self::read_sheets(&mut reader, &mut entries)?,
                        "bookViews" => Self::read_book_views(&mut reader, &mut entries)?,
                        "definedNames" => Self::read_defined_names(&mut reader, &mut entries)?,
                        _ => {
                            let raw = capture_element(&mut reader, xml, start, &e)?;
                            preserved.keep(&name, raw, WORKBOOK_ORDER);
                            continue;
                        }
                    }
                    preserved.note(&name, WORKBOOK_ORDER);
                }
                Event::Empty(e) => {
                    let name = local_name(&e);
                    match name.as_str() {
                        "workbook" => preserved.set_root_attributes(&e),
                        "sheets" | "bookViews" | "definedNames" => {
                            preserved.note(&name, WORKBOOK_ORDER)
                        }
                        _ => {
                            let raw = raw_slice(xml, start, reader.buffer_position());
                            preserved.keep(&name, raw, WORKBOOK_ORDER);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if entries.sheets.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no sheets".into()));
        }
        Ok((entries, preserved))
    }

    fn read_sheets(reader: &mut Reader<&[u8]>, entries: &mut WorkbookEntries) -> XlsxResult<()> {
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                    let (Some(name), Some(relationship_id)) =
                        (attribute(&e, b"name"), relationship_id(&e))
                    else {
                        return Err(XlsxError::Parse(
                            "sheet entry without a name or relationship".into(),
                        ));
                    };
                    entries.sheets.push(SheetEntry {
                        name,
                        visibility: parse_visibility(attribute(&e, b"state").as_deref()),
                        relationship_id,
                    });
                }
                Event::End(e) if e.local_name().as_ref() == b"sheets" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn read_book_views(reader: &mut Reader<&[u8]>, entries: &mut WorkbookEntries) -> XlsxResult<()> {
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if e.local_name().as_ref() == b"workbookView" =>
                {
                    if entries.active_tab.is_none() {
                        entries.active_tab = Some(parse_attribute(&e, b"activeTab").unwrap_or(0));
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"bookViews" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }

    fn read_defined_names(
        reader: &mut Reader<&[u8]>,
        entries: &mut WorkbookEntries,
    ) -> XlsxResult<()> {
        let mut current: Option<NameEntry> = None;
        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                    current = attribute(&e, b"name").map(|name| NameEntry {
                        name,
                        local_sheet: parse_attribute(&e, b"localSheetId"),
                        refers_to: String::new(),
                    });
                }
                Event::Text(t) => {
                    if let Some(entry) = current.as_mut() {
                        entry.refers_to.push_str(&t.unescape()?);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                    if let Some(entry) = current.take() {
                        entries.names.push(entry);
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"definedNames" => break,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(())
    }
}
