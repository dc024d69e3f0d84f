//! XLSX writer
//!
//! The writer regenerates the workbook, styles, shared string and worksheet
//! parts of a package. Every other part is written back as it was read.

mod worksheet;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use crate::package::{
    content_type, rel_type, relative_target, rels_path, resolve_target, Package, Relationship,
    Relationships, ROOT_RELS_PART,
};
use crate::reader::WORKBOOK_ORDER;
use crate::shared_strings::to_shared_strings_xml;
use crate::styles::to_styles_xml;
use crate::xml::{escape_xml, PreservedXml, NS_MAIN, NS_RELATIONSHIPS, XML_DECLARATION};
use sheetstyle_core::{NameScope, SheetVisibility, Workbook};

/// Where a worksheet is written and under which relationship
struct SheetPart {
    path: String,
    /// Relationship id kept from the package being rewritten
    old_id: Option<String>,
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &mut Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a workbook to a new package
    pub fn write<W: Write + Seek>(workbook: &mut Workbook, writer: W) -> XlsxResult<()> {
        let mut package = Package::new();
        Self::write_package(workbook, &mut package, writer)
    }

    /// Update a package from a workbook and write it out
    pub fn write_package<W: Write + Seek>(
        workbook: &mut Workbook,
        package: &mut Package,
        writer: W,
    ) -> XlsxResult<()> {
        Self::update_package(workbook, package)?;
        package.write(writer)
    }

    /// Regenerate the modelled parts of a package from a workbook
    ///
    /// Worksheets keep the part they were read from; new or copied
    /// worksheets get the first free `worksheets/sheetN.xml`. Parts of
    /// deleted worksheets are removed. Each worksheet's `source` is updated
    /// to the part it was written to.
    pub fn update_package(workbook: &mut Workbook, package: &mut Package) -> XlsxResult<()> {
        let workbook_part = package.workbook_part().to_string();
        let old_rels = package.relationships(&workbook_part)?;
        workbook.rebuild_shared_strings();

        let sheet_parts = Self::assign_sheet_parts(workbook, package, &workbook_part, &old_rels);

        let mut references = 0;
        for (sheet, part) in workbook.worksheets().zip(&sheet_parts) {
            let preserved = package
                .preserved
                .entry(part.path.clone())
                .or_insert_with(PreservedXml::new);
            let (xml, count) =
                worksheet::to_worksheet_xml(sheet, workbook.shared_strings(), preserved)?;
            references += count;
            package.set_part(part.path.as_str(), xml.into_bytes());
            package
                .content_types_mut()
                .set_override(&part.path, content_type::WORKSHEET);
        }

        let strings_part = Self::write_shared_strings(workbook, package, &workbook_part, references)?;
        let styles_part = Self::write_styles(workbook, package, &workbook_part)?;

        let mut rels = Relationships::new();
        for rel in old_rels.iter() {
            let keep = match rel.rel_type.as_str() {
                rel_type::WORKSHEET => false,
                rel_type::SHARED_STRINGS => strings_part.is_some(),
                _ => true,
            };
            if keep {
                rels.push(rel.clone());
            }
        }
        for part in sheet_parts.iter() {
            if let Some(id) = &part.old_id {
                rels.push(Relationship {
                    id: id.clone(),
                    rel_type: rel_type::WORKSHEET.to_string(),
                    target: relative_target(&workbook_part, &part.path),
                    external: false,
                });
            }
        }
        let mut sheet_ids = Vec::with_capacity(sheet_parts.len());
        for part in &sheet_parts {
            let id = match &part.old_id {
                Some(id) => id.clone(),
                None => rels.add(
                    rel_type::WORKSHEET,
                    &relative_target(&workbook_part, &part.path),
                ),
            };
            sheet_ids.push(id);
        }
        if rels.first_of_type(rel_type::STYLES).is_none() {
            rels.add(rel_type::STYLES, &relative_target(&workbook_part, &styles_part));
        }
        if let Some(strings_part) = &strings_part {
            if rels.first_of_type(rel_type::SHARED_STRINGS).is_none() {
                rels.add(
                    rel_type::SHARED_STRINGS,
                    &relative_target(&workbook_part, strings_part),
                );
            }
        }
        package.set_relationships(&workbook_part, &rels);

        let preserved = package
            .preserved
            .get(&workbook_part)
            .cloned()
            .unwrap_or_default();
        let xml = Self::workbook_xml(workbook, &sheet_ids, &preserved)?;
        package.set_part(workbook_part.as_str(), xml.into_bytes());

        Self::update_content_types(package, &workbook_part);

        for (pos, part) in sheet_parts.into_iter().enumerate() {
            workbook.worksheet_mut(pos as u32 + 1)?.source = Some(part.path);
        }
        log::debug!("updated package with {} worksheet(s)", workbook.sheet_count());
        Ok(())
    }

    /// Pick a part for every worksheet and drop the parts no worksheet claims
    fn assign_sheet_parts(
        workbook: &Workbook,
        package: &mut Package,
        workbook_part: &str,
        old_rels: &Relationships,
    ) -> Vec<SheetPart> {
        let mut old_parts: HashMap<String, String> = old_rels
            .of_type(rel_type::WORKSHEET)
            .filter(|rel| !rel.external)
            .map(|rel| (resolve_target(workbook_part, &rel.target), rel.id.clone()))
            .collect();

        let mut parts: Vec<Option<SheetPart>> = workbook
            .worksheets()
            .map(|sheet| {
                let path = sheet.source.as_ref()?;
                let old_id = old_parts.remove(path)?;
                Some(SheetPart {
                    path: path.clone(),
                    old_id: Some(old_id),
                })
            })
            .collect();

        for path in old_parts.into_keys() {
            package.remove_part(&path);
            package.remove_part(&rels_path(&path));
            package.content_types_mut().remove_override(&path);
            package.preserved.remove(&path);
            log::debug!("removed worksheet part {path}");
        }

        let mut taken: HashSet<String> = parts.iter().flatten().map(|p| p.path.clone()).collect();
        let mut next = 1;
        for part in parts.iter_mut().filter(|part| part.is_none()) {
            let path = loop {
                let candidate =
                    resolve_target(workbook_part, &format!("worksheets/sheet{next}.xml"));
                next += 1;
                if !taken.contains(&candidate) && !package.contains_part(&candidate) {
                    break candidate;
                }
            };
            taken.insert(path.clone());
            package.preserved.insert(path.clone(), PreservedXml::new());
            *part = Some(SheetPart { path, old_id: None });
        }

        parts.into_iter().flatten().collect()
    }

    /// Write the string pool, or remove it when no cell uses it
    fn write_shared_strings(
        workbook: &Workbook,
        package: &mut Package,
        workbook_part: &str,
        references: usize,
    ) -> XlsxResult<Option<String>> {
        let existing = package.related_part(workbook_part, rel_type::SHARED_STRINGS)?;
        let strings = workbook.shared_strings();
        if strings.is_empty() {
            if let Some(part) = existing {
                package.remove_part(&part);
                package.content_types_mut().remove_override(&part);
            }
            return Ok(None);
        }

        let part = existing.unwrap_or_else(|| resolve_target(workbook_part, "sharedStrings.xml"));
        package.set_part(
            part.as_str(),
            to_shared_strings_xml(strings, references).into_bytes(),
        );
        package
            .content_types_mut()
            .set_override(&part, content_type::SHARED_STRINGS);
        Ok(Some(part))
    }

    fn write_styles(
        workbook: &Workbook,
        package: &mut Package,
        workbook_part: &str,
    ) -> XlsxResult<String> {
        let part = package
            .related_part(workbook_part, rel_type::STYLES)?
            .unwrap_or_else(|| resolve_target(workbook_part, "styles.xml"));
        let xml = match package.preserved.get(&part) {
            Some(preserved) => to_styles_xml(&workbook.styles, preserved)?,
            None => to_styles_xml(&workbook.styles, &PreservedXml::new())?,
        };
        package.set_part(part.as_str(), xml.into_bytes());
        package
            .content_types_mut()
            .set_override(&part, content_type::STYLES);
        Ok(part)
    }

    fn workbook_xml(
        workbook: &Workbook,
        sheet_ids: &[String],
        preserved: &PreservedXml,
    ) -> XlsxResult<String> {
        let mut xml = format!("{XML_DECLARATION}\n");
        xml.push_str(&preserved.root_tag(
            "workbook",
            &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)],
        ));

        preserved.write_children(&mut xml, WORKBOOK_ORDER, |name, out| {
            match name {
                "bookViews" => out.push_str(&format!(
                    "\n<bookViews><workbookView activeTab=\"{}\"/></bookViews>",
                    workbook.active_sheet() - 1
                )),
                "sheets" => {
                    out.push_str("\n<sheets>");
                    for (pos, (sheet, id)) in workbook.worksheets().zip(sheet_ids).enumerate() {
                        out.push_str(&format!(
                            "<sheet name=\"{}\" sheetId=\"{}\"",
                            escape_xml(sheet.name()),
                            pos + 1
                        ));
                        match sheet.visibility() {
                            SheetVisibility::Visible => {}
                            SheetVisibility::Hidden => out.push_str(" state=\"hidden\""),
                            SheetVisibility::VeryHidden => out.push_str(" state=\"veryHidden\""),
                        }
                        out.push_str(&format!(" r:id=\"{id}\"/>"));
                    }
                    out.push_str("</sheets>");
                }
                "definedNames" => Self::write_defined_names(workbook, out),
                _ => return Ok(false),
            }
            Ok(true)
        })?;

        xml.push_str("\n</workbook>");
        Ok(xml)
    }

    fn write_defined_names(workbook: &Workbook, out: &mut String) {
        if workbook.defined_names.is_empty() {
            return;
        }
        out.push_str("\n<definedNames>");
        for (_, name) in workbook.defined_names.iter() {
            out.push_str(&format!("<definedName name=\"{}\"", escape_xml(&name.name)));
            if name.scope == NameScope::Worksheet {
                match name.sheet.as_deref().and_then(|s| workbook.sheet_index(s)) {
                    Some(index) => out.push_str(&format!(" localSheetId=\"{}\"", index - 1)),
                    None => log::warn!("writing '{}' with workbook scope", name.name),
                }
            }
            out.push_str(&format!(">{}</definedName>", escape_xml(&name.refers_to())));
        }
        out.push_str("</definedNames>");
    }

    /// Defaults, the workbook override and overrides of parts still present
    fn update_content_types(package: &mut Package, workbook_part: &str) {
        if !package.contains_part(ROOT_RELS_PART) {
            let mut root = Relationships::new();
            root.add(rel_type::OFFICE_DOCUMENT, workbook_part);
            package.set_relationships("", &root);
        }

        let parts: HashSet<String> = package.part_names().map(str::to_string).collect();
        let types = package.content_types_mut();
        types.ensure_default("rels", content_type::RELATIONSHIPS);
        types.ensure_default("xml", content_type::XML);
        if !types.has_override(workbook_part) {
            types.set_override(workbook_part, content_type::WORKBOOK);
        }
        types.retain_overrides(|part| parts.contains(part));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::XlsxReader;
    use pretty_assertions::assert_eq;
    use sheetstyle_core::{DefinedName, Worksheet, WorkbookSettings};

    fn written_package(workbook: &mut Workbook) -> Package {
        let mut package = Package::new();
        XlsxWriter::update_package(workbook, &mut package).unwrap();
        package
    }

    #[test]
    fn test_new_package_layout() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, "hello").unwrap();
        let package = written_package(&mut workbook);

        let names: Vec<&str> = package.part_names().collect();
        assert_eq!(
            names,
            vec![
                "_rels/.rels",
                "xl/_rels/workbook.xml.rels",
                "xl/sharedStrings.xml",
                "xl/styles.xml",
                "xl/workbook.xml",
                "xl/worksheets/sheet1.xml",
            ]
        );
        assert_eq!(
            package.content_types().content_type("xl/worksheets/sheet1.xml"),
            Some(content_type::WORKSHEET)
        );
        assert_eq!(
            package.content_types().content_type("xl/workbook.xml"),
            Some(content_type::WORKBOOK)
        );
        assert_eq!(
            workbook.worksheet(1).unwrap().source.as_deref(),
            Some("xl/worksheets/sheet1.xml")
        );
    }

    #[test]
    fn test_deleted_and_added_sheets() {
        let mut workbook = Workbook::new();
        workbook.add("Second");
        workbook.add("Third");
        let mut package = written_package(&mut workbook);

        workbook.delete(2).unwrap();
        workbook.push_worksheet(Worksheet::new("Fourth"));
        XlsxWriter::update_package(&mut workbook, &mut package).unwrap();

        let sources: Vec<_> = workbook.worksheets().map(|s| s.source.clone().unwrap()).collect();
        assert_eq!(
            sources,
            vec![
                "xl/worksheets/sheet1.xml",
                "xl/worksheets/sheet3.xml",
                "xl/worksheets/sheet2.xml",
            ]
        );
        let rels = package.relationships("xl/workbook.xml").unwrap();
        assert_eq!(rels.of_type(rel_type::WORKSHEET).count(), 3);
    }

    #[test]
    fn test_no_shared_strings_part_without_text() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, 42.0).unwrap();
        let package = written_package(&mut workbook);
        assert!(!package.contains_part("xl/sharedStrings.xml"));
        let rels = package.relationships("xl/workbook.xml").unwrap();
        assert!(rels.first_of_type(rel_type::SHARED_STRINGS).is_none());
    }

    #[test]
    fn test_workbook_xml_round_trip() {
        let mut workbook = Workbook::new();
        workbook.add("Hidden");
        workbook.add("Last");
        workbook.set_visibility(2, SheetVisibility::Hidden).unwrap();
        workbook.set_active_sheet(3).unwrap();
        workbook.defined_names.set_print_area("Last", "$A$1:$B$4");
        workbook
            .defined_names
            .insert(DefinedName::parse("Rates", "Sheet1!$C$1:$C$9", NameScope::Workbook));

        let mut buffer = std::io::Cursor::new(Vec::new());
        XlsxWriter::write(&mut workbook, &mut buffer).unwrap();
        buffer.set_position(0);
        let mut package = Package::read(buffer).unwrap();
        let reread = XlsxReader::read_package(&mut package, &WorkbookSettings::default()).unwrap();

        assert_eq!(reread.sheet_count(), 3);
        assert_eq!(
            reread.worksheet(2).unwrap().visibility(),
            SheetVisibility::Hidden
        );
        assert_eq!(reread.active_sheet(), 3);
        assert_eq!(
            reread.defined_names.print_area("Last").as_deref(),
            Some("$A$1:$B$4")
        );
        assert_eq!(reread.defined_names.len(), 2);
    }
}
