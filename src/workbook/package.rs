//! In-place editing of an `.xlsx` package.
//!
//! An `.xlsx` file is a zip of XML parts. [`XlsxPackage`] loads every part
//! into memory and only ever rewrites the parts a sheet operation touches:
//! `xl/workbook.xml`, `xl/_rels/workbook.xml.rels`, `[Content_Types].xml`
//! and the worksheet being added or removed. Every other part (styles,
//! shared strings, the other worksheets, drawings, macros) is written back
//! unchanged, which is what keeps the original workbook's formatting.

use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{EngineError, EngineResult};

use super::{SheetCell, SpreadsheetDocument};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

const WORKSHEET_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A sheet entry of `xl/workbook.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetEntry {
    name: String,
    sheet_id: u32,
    rel_id: String,
    hidden: bool,
}

/// What `xl/workbook.xml` says about its sheets and view.
#[derive(Debug, Clone, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    active_tab: usize,
    rel_id_attr: Option<String>,
}

/// A relationship of `xl/_rels/workbook.xml.rels`.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    target: String,
}

/// One change applied to `xl/workbook.xml`.
enum WorkbookEdit<'a> {
    Hide { index: usize },
    Remove { index: usize },
    Append {
        entry: &'a SheetEntry,
        rel_id_attr: &'a str,
        position: usize,
        activate: bool,
    },
}

/// An `.xlsx` package held in memory as an ordered list of parts.
///
/// # Example
///
/// ```no_run
/// use payroll_jv::workbook::{SpreadsheetDocument, XlsxPackage};
/// use std::path::Path;
///
/// let mut package = XlsxPackage::open(Path::new("payroll.xlsx"))?;
/// package.hide_sheet("JSR")?;
/// package.save(Path::new("payroll_with_jv.xlsx"))?;
/// # Ok::<(), payroll_jv::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct XlsxPackage {
    parts: Vec<(String, Vec<u8>)>,
    activate_next: bool,
}

impl XlsxPackage {
    /// Loads a package from disk.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Loads a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> EngineResult<Self> {
        let mut archive = ZipArchive::new(reader).map_err(|_| invalid_package())?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|_| invalid_package())?;
            if file.is_dir() {
                continue;
            }
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)
                .map_err(|_| invalid_package())?;
            parts.push((file.name().to_string(), content));
        }

        if !parts.iter().any(|(name, _)| name == WORKBOOK_PART) {
            return Err(invalid_package());
        }

        Ok(Self {
            parts,
            activate_next: false,
        })
    }

    /// Returns the bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, content)| content.as_slice())
    }

    /// Returns true when the package has a part with this name.
    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replaces a part, or adds it at the end of the package.
    pub fn set_part(&mut self, name: &str, content: Vec<u8>) {
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some((_, existing)) => *existing = content,
            None => self.parts.push((name.to_string(), content)),
        }
    }

    /// Drops a part. Returns false when it did not exist.
    pub fn remove_part(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|(part, _)| part != name);
        self.parts.len() != before
    }

    /// Writes the package to disk.
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        let file = File::create(path).map_err(|e| EngineError::io(path, e))?;
        self.write_to(file).map_err(|e| EngineError::io(path, e))
    }

    /// Writes the package to any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> zip::result::ZipResult<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Returns whether a sheet is hidden, or `None` when it does not exist.
    pub fn is_sheet_hidden(&self, name: &str) -> EngineResult<Option<bool>> {
        let info = self.workbook_info()?;
        Ok(info
            .sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| sheet.hidden))
    }

    /// The index of the active tab.
    pub fn active_tab(&self) -> EngineResult<usize> {
        Ok(self.workbook_info()?.active_tab)
    }

    fn text_part(&self, name: &str) -> EngineResult<&str> {
        let content = self
            .part(name)
            .ok_or_else(|| xml_error(name, "part is missing"))?;
        std::str::from_utf8(content).map_err(|e| xml_error(name, e))
    }

    fn workbook_info(&self) -> EngineResult<WorkbookInfo> {
        parse_workbook(self.text_part(WORKBOOK_PART)?)
    }

    fn relationships(&self) -> EngineResult<Vec<Relationship>> {
        parse_relationships(self.text_part(WORKBOOK_RELS_PART)?)
    }

    fn edit_workbook(&mut self, edit: WorkbookEdit<'_>) -> EngineResult<()> {
        let rewritten = rewrite_workbook(self.text_part(WORKBOOK_PART)?, &edit)?;
        self.set_part(WORKBOOK_PART, rewritten.into_bytes());
        Ok(())
    }

    fn worksheet_part(&self, rel_id: &str) -> EngineResult<Option<String>> {
        Ok(self
            .relationships()?
            .into_iter()
            .find(|rel| rel.id == rel_id)
            .map(|rel| resolve_target(&rel.target)))
    }

    fn clear_tab_selection(&mut self, part: &str) -> EngineResult<()> {
        if !self.has_part(part) {
            return Ok(());
        }
        let rewritten = strip_tab_selected(self.text_part(part)?, part)?;
        self.set_part(part, rewritten.into_bytes());
        Ok(())
    }

    fn drop_calc_chain(&mut self) -> EngineResult<()> {
        if !self.remove_part(CALC_CHAIN_PART) {
            return Ok(());
        }
        let is_calc_chain = |e: &BytesStart<'_>| {
            attribute(e, b"Target").is_some_and(|target| resolve_target(&target) == CALC_CHAIN_PART)
        };
        let rels = self.text_part(WORKBOOK_RELS_PART)?;
        let rels = rewrite_children(rels, WORKBOOK_RELS_PART, "Relationships", is_calc_chain, None)?;
        self.set_part(WORKBOOK_RELS_PART, rels.into_bytes());
        self.remove_content_type(CALC_CHAIN_PART)
    }

    fn remove_content_type(&mut self, part: &str) -> EngineResult<()> {
        let part_name = format!("/{}", part);
        let is_override = |e: &BytesStart<'_>| {
            e.local_name().as_ref() == b"Override"
                && attribute(e, b"PartName").as_deref() == Some(part_name.as_str())
        };
        let types = self.text_part(CONTENT_TYPES_PART)?;
        let types = rewrite_children(types, CONTENT_TYPES_PART, "Types", is_override, None)?;
        self.set_part(CONTENT_TYPES_PART, types.into_bytes());
        Ok(())
    }

    fn next_worksheet_part(&self) -> String {
        (1..)
            .map(|n| format!("xl/worksheets/sheet{}.xml", n))
            .find(|name| !self.has_part(name))
            .unwrap_or_default()
    }
}

impl SpreadsheetDocument for XlsxPackage {
    fn sheet_names(&self) -> EngineResult<Vec<String>> {
        Ok(self
            .workbook_info()?
            .sheets
            .into_iter()
            .map(|sheet| sheet.name)
            .collect())
    }

    fn hide_sheet(&mut self, name: &str) -> EngineResult<bool> {
        let info = self.workbook_info()?;
        let Some(index) = info.sheets.iter().position(|sheet| sheet.name == name) else {
            return Ok(false);
        };

        self.edit_workbook(WorkbookEdit::Hide { index })?;
        if let Some(part) = self.worksheet_part(&info.sheets[index].rel_id)? {
            self.clear_tab_selection(&part)?;
        }
        if info.active_tab == index {
            self.activate_next = true;
        }
        Ok(true)
    }

    fn remove_sheet(&mut self, name: &str) -> EngineResult<bool> {
        let info = self.workbook_info()?;
        let Some(index) = info.sheets.iter().position(|sheet| sheet.name == name) else {
            return Ok(false);
        };
        let rel_id = info.sheets[index].rel_id.clone();

        if let Some(part) = self.worksheet_part(&rel_id)? {
            self.remove_part(&part);
            self.remove_part(&sheet_rels_part(&part));
            self.remove_content_type(&part)?;
        }

        let is_sheet_rel = |e: &BytesStart<'_>| attribute(e, b"Id").as_deref() == Some(rel_id.as_str());
        let rels = self.text_part(WORKBOOK_RELS_PART)?;
        let rels = rewrite_children(rels, WORKBOOK_RELS_PART, "Relationships", is_sheet_rel, None)?;
        self.set_part(WORKBOOK_RELS_PART, rels.into_bytes());

        self.edit_workbook(WorkbookEdit::Remove { index })?;
        self.drop_calc_chain()?;
        if info.active_tab == index {
            self.activate_next = true;
        }
        Ok(true)
    }

    fn append_sheet(&mut self, name: &str, rows: &[Vec<SheetCell>]) -> EngineResult<()> {
        let info = self.workbook_info()?;
        let relationships = self.relationships()?;

        let sheet_id = info.sheets.iter().map(|s| s.sheet_id).max().unwrap_or(0) + 1;
        let rel_number = relationships
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let entry = SheetEntry {
            name: name.to_string(),
            sheet_id,
            rel_id: format!("rId{}", rel_number),
            hidden: false,
        };
        let part = self.next_worksheet_part();
        let activate = self.activate_next
            || info
                .sheets
                .get(info.active_tab)
                .is_none_or(|sheet| sheet.hidden);

        self.set_part(&part, worksheet_xml(rows, activate).into_bytes());

        let relationship = (
            "Relationship",
            vec![
                ("Id", entry.rel_id.clone()),
                ("Type", WORKSHEET_REL_TYPE.to_string()),
                ("Target", part.trim_start_matches("xl/").to_string()),
            ],
        );
        let rels = self.text_part(WORKBOOK_RELS_PART)?;
        let rels = rewrite_children(rels, WORKBOOK_RELS_PART, "Relationships", |_| false, Some(relationship))?;
        self.set_part(WORKBOOK_RELS_PART, rels.into_bytes());

        let content_type = (
            "Override",
            vec![
                ("PartName", format!("/{}", part)),
                ("ContentType", WORKSHEET_CONTENT_TYPE.to_string()),
            ],
        );
        let types = self.text_part(CONTENT_TYPES_PART)?;
        let types = rewrite_children(types, CONTENT_TYPES_PART, "Types", |_| false, Some(content_type))?;
        self.set_part(CONTENT_TYPES_PART, types.into_bytes());

        let rel_id_attr = info.rel_id_attr.unwrap_or_else(|| "r:id".to_string());
        self.edit_workbook(WorkbookEdit::Append {
            entry: &entry,
            rel_id_attr: &rel_id_attr,
            position: info.sheets.len(),
            activate,
        })?;
        self.activate_next = false;
        Ok(())
    }
}

fn invalid_package() -> EngineError {
    EngineError::UnsupportedFileType {
        message: super::reader::INVALID_WORKBOOK.to_string(),
    }
}

fn xml_error(part: &str, error: impl std::fmt::Display) -> EngineError {
    EngineError::IoFailure {
        path: part.to_string(),
        message: error.to_string(),
    }
}

/// Reads an attribute by its full name, unescaped.
fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attribute_value(&attr))
}

fn attribute_value(attr: &Attribute<'_>) -> String {
    let raw = String::from_utf8_lossy(&attr.value);
    match unescape(&raw) {
        Ok(value) => value.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

/// Resolves a workbook relationship target to a part name.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// `xl/worksheets/sheet3.xml` → `xl/worksheets/_rels/sheet3.xml.rels`.
fn sheet_rels_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn parse_workbook(xml: &str) -> EngineResult<WorkbookInfo> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut info = WorkbookInfo::default();

    loop {
        match reader.read_event().map_err(|e| xml_error(WORKBOOK_PART, e))? {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let mut entry = SheetEntry {
                        name: String::new(),
                        sheet_id: 0,
                        rel_id: String::new(),
                        hidden: false,
                    };
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => entry.name = attribute_value(&attr),
                            b"sheetId" => {
                                entry.sheet_id = attribute_value(&attr).parse().unwrap_or(0)
                            }
                            b"state" => entry.hidden = attribute_value(&attr) != "visible",
                            key if attr.key.local_name().as_ref() == b"id" => {
                                entry.rel_id = attribute_value(&attr);
                                if info.rel_id_attr.is_none() {
                                    info.rel_id_attr =
                                        Some(String::from_utf8_lossy(key).into_owned());
                                }
                            }
                            _ => {}
                        }
                    }
                    info.sheets.push(entry);
                }
                b"workbookView" => {
                    if let Some(tab) = attribute(&e, b"activeTab") {
                        info.active_tab = tab.parse().unwrap_or(0);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(info)
}

fn parse_relationships(xml: &str) -> EngineResult<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut relationships = Vec::new();

    loop {
        match reader
            .read_event()
            .map_err(|e| xml_error(WORKBOOK_RELS_PART, e))?
        {
            Event::Eof => break,
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id"), attribute(&e, b"Target"))
                {
                    relationships.push(Relationship { id, target });
                }
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Copies an element, replacing (or dropping, with `None`) some attributes
/// and appending new ones.
fn rebuild_element(
    e: &BytesStart<'_>,
    replace: &[(&[u8], Option<String>)],
) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut rebuilt = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if replace.iter().any(|(key, _)| attr.key.as_ref() == *key) {
            continue;
        }
        rebuilt.push_attribute(attr);
    }
    for (key, value) in replace {
        if let Some(value) = value {
            let key = String::from_utf8_lossy(key);
            rebuilt.push_attribute((key.as_ref(), value.as_str()));
        }
    }
    rebuilt.into_owned()
}

/// Adjusts a sheet index attribute after the sheet at `removed` is deleted.
/// Indexes pointing at the removed sheet fall back to the first sheet.
fn shift_index(value: Option<String>, removed: usize) -> Option<Option<String>> {
    let index: usize = value?.parse().ok()?;
    match index.cmp(&removed) {
        std::cmp::Ordering::Less => None,
        std::cmp::Ordering::Equal => Some(Some("0".to_string())),
        std::cmp::Ordering::Greater => Some(Some((index - 1).to_string())),
    }
}

fn rewrite_workbook(xml: &str, edit: &WorkbookEdit<'_>) -> EngineResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut sheet_index = 0usize;
    let mut skip_until: Option<&'static [u8]> = None;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(WORKBOOK_PART, e))?;

        if let Some(end) = skip_until {
            if let Event::End(e) = &event {
                if e.local_name().as_ref() == end {
                    skip_until = None;
                }
            }
            continue;
        }

        let out: Option<Event<'_>> = match event {
            Event::Eof => break,
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                let index = sheet_index;
                sheet_index += 1;
                match edit {
                    WorkbookEdit::Remove { index: removed } if *removed == index => {
                        if matches!(event, Event::Start(_)) {
                            skip_until = Some(b"sheet".as_slice());
                        }
                        None
                    }
                    WorkbookEdit::Hide { index: hidden } if *hidden == index => {
                        let rebuilt =
                            rebuild_element(e, &[(b"state".as_slice(), Some("hidden".to_string()))]);
                        Some(match event {
                            Event::Start(_) => Event::Start(rebuilt),
                            _ => Event::Empty(rebuilt),
                        })
                    }
                    _ => Some(event),
                }
            }
            Event::Start(ref e) if e.local_name().as_ref() == b"definedName" => {
                match (edit, attribute(e, b"localSheetId")) {
                    (WorkbookEdit::Remove { index }, Some(local)) => {
                        match local.parse::<usize>() {
                            Ok(local) if local == *index => {
                                skip_until = Some(b"definedName".as_slice());
                                None
                            }
                            Ok(local) if local > *index => Some(Event::Start(rebuild_element(
                                e,
                                &[(b"localSheetId".as_slice(), Some((local - 1).to_string()))],
                            ))),
                            _ => Some(event),
                        }
                    }
                    _ => Some(event),
                }
            }
            Event::Empty(ref e) | Event::Start(ref e)
                if e.local_name().as_ref() == b"workbookView" =>
            {
                let replace: Vec<(&[u8], Option<String>)> = match edit {
                    WorkbookEdit::Remove { index } => [b"activeTab".as_slice(), b"firstSheet".as_slice()]
                        .into_iter()
                        .filter_map(|key| {
                            shift_index(attribute(e, key), *index).map(|value| (key, value))
                        })
                        .collect(),
                    WorkbookEdit::Append {
                        position,
                        activate: true,
                        ..
                    } => vec![(b"activeTab".as_slice(), Some(position.to_string()))],
                    _ => Vec::new(),
                };
                if replace.is_empty() {
                    Some(event)
                } else {
                    let rebuilt = rebuild_element(e, &replace);
                    Some(match event {
                        Event::Start(_) => Event::Start(rebuilt),
                        _ => Event::Empty(rebuilt),
                    })
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"sheets" => {
                if let WorkbookEdit::Append {
                    entry, rel_id_attr, ..
                } = edit
                {
                    let prefix = String::from_utf8_lossy(e.name().as_ref())
                        .strip_suffix("sheets")
                        .unwrap_or_default()
                        .to_string();
                    let mut sheet = BytesStart::new(format!("{}sheet", prefix));
                    sheet.push_attribute(("name", entry.name.as_str()));
                    sheet.push_attribute(("sheetId", entry.sheet_id.to_string().as_str()));
                    sheet.push_attribute((*rel_id_attr, entry.rel_id.as_str()));
                    writer
                        .write_event(Event::Empty(sheet))
                        .map_err(|e| xml_error(WORKBOOK_PART, e))?;
                }
                Some(event)
            }
            other => Some(other),
        };

        if let Some(event) = out {
            writer
                .write_event(event)
                .map_err(|e| xml_error(WORKBOOK_PART, e))?;
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| xml_error(WORKBOOK_PART, e))
}

/// Rewrites the children of a root element: drops those matching `remove`
/// and appends `append` (a tag with attributes) before the closing tag.
fn rewrite_children<F>(
    xml: &str,
    part: &str,
    root: &str,
    remove: F,
    append: Option<(&str, Vec<(&str, String)>)>,
) -> EngineResult<String>
where
    F: Fn(&BytesStart<'_>) -> bool,
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(part, e))?;
        match &event {
            Event::Eof => break,
            _ if skip_depth > 0 => {
                match &event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    _ => {}
                }
                continue;
            }
            Event::Empty(e) if remove(e) => continue,
            Event::Start(e) if remove(e) => {
                skip_depth = 1;
                continue;
            }
            Event::End(e) if e.local_name().as_ref() == root.as_bytes() => {
                if let Some((tag, attributes)) = &append {
                    let mut element = BytesStart::new(*tag);
                    for (key, value) in attributes {
                        element.push_attribute((*key, value.as_str()));
                    }
                    writer
                        .write_event(Event::Empty(element))
                        .map_err(|e| xml_error(part, e))?;
                }
            }
            _ => {}
        }
        writer.write_event(event).map_err(|e| xml_error(part, e))?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| xml_error(part, e))
}

/// Drops `tabSelected` from every `sheetView` of a worksheet.
fn strip_tab_selected(xml: &str, part: &str) -> EngineResult<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());

    loop {
        let event = reader.read_event().map_err(|e| xml_error(part, e))?;
        let event = match event {
            Event::Eof => break,
            Event::Start(ref e) if e.local_name().as_ref() == b"sheetView" => {
                Event::Start(rebuild_element(e, &[(b"tabSelected".as_slice(), None)]))
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"sheetView" => {
                Event::Empty(rebuild_element(e, &[(b"tabSelected".as_slice(), None)]))
            }
            other => other,
        };
        writer.write_event(event).map_err(|e| xml_error(part, e))?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| xml_error(part, e))
}

/// Column letters for a zero-based index: 0 → A, 25 → Z, 26 → AA.
fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Serializes rows into a worksheet part with inline strings.
fn worksheet_xml(rows: &[Vec<SheetCell>], selected: bool) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let dimension = if rows.is_empty() || width == 0 {
        "A1".to_string()
    } else {
        format!("A1:{}{}", column_letters(width - 1), rows.len())
    };
    let view = if selected {
        r#"<sheetView tabSelected="1" workbookViewId="0"/>"#
    } else {
        r#"<sheetView workbookViewId="0"/>"#
    };

    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}" xmlns:r="{}"><dimension ref="{}"/><sheetViews>{}</sheetViews><sheetFormatPr defaultRowHeight="15"/><sheetData>"#,
        SPREADSHEETML_NS, RELATIONSHIPS_NS, dimension, view
    );

    for (r, row) in rows.iter().enumerate() {
        let row_number = r + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), row_number);
            match cell {
                SheetCell::Empty => {}
                SheetCell::Text(text) => {
                    let space = if text.trim() != text {
                        r#" xml:space="preserve""#
                    } else {
                        ""
                    };
                    xml.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t{}>{}</t></is></c>"#,
                        reference,
                        space,
                        escape(text.as_str())
                    ));
                }
                SheetCell::Number(number) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, number));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData><pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/></worksheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader as _, SheetVisible, Xlsx};
    use rust_decimal::Decimal;
    use rust_xlsxwriter::Workbook;
    use std::io::Cursor;

    fn sample_package(sheets: &[&str]) -> XlsxPackage {
        let mut workbook = Workbook::new();
        for name in sheets {
            let sheet = workbook.add_worksheet();
            sheet.set_name(*name).unwrap();
            sheet.write_string(0, 0, format!("{} content", name)).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();
        XlsxPackage::from_reader(Cursor::new(bytes)).unwrap()
    }

    fn reopen(package: &XlsxPackage) -> Xlsx<Cursor<Vec<u8>>> {
        let mut buffer = Cursor::new(Vec::new());
        package.write_to(&mut buffer).unwrap();
        buffer.set_position(0);
        Xlsx::new(buffer).unwrap()
    }

    fn rows() -> Vec<Vec<SheetCell>> {
        vec![
            vec![SheetCell::Text("Description".to_string()), SheetCell::Text("Amount".to_string())],
            vec![
                SheetCell::Text("A & B <1>".to_string()),
                SheetCell::Number(Decimal::new(-12550, 2)),
            ],
        ]
    }

    #[test]
    fn test_sheet_names_in_tab_order() {
        let package = sample_package(&["Payroll", "JSR", "Notes"]);
        assert_eq!(package.sheet_names().unwrap(), vec!["Payroll", "JSR", "Notes"]);
    }

    #[test]
    fn test_append_sheet_is_readable() {
        let mut package = sample_package(&["Payroll"]);

        package.append_sheet("JV Jan 2024", &rows()).unwrap();

        let mut workbook = reopen(&package);
        assert_eq!(workbook.sheet_names(), vec!["Payroll", "JV Jan 2024"]);
        let range = workbook.worksheet_range("JV Jan 2024").unwrap();
        assert_eq!(
            range.get_value((1, 0)),
            Some(&Data::String("A & B <1>".to_string()))
        );
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(-125.5)));
        let original = workbook.worksheet_range("Payroll").unwrap();
        assert_eq!(
            original.get_value((0, 0)),
            Some(&Data::String("Payroll content".to_string()))
        );
    }

    #[test]
    fn test_hide_sheet() {
        let mut package = sample_package(&["Payroll", "JSR"]);

        assert!(package.hide_sheet("JSR").unwrap());
        assert!(!package.hide_sheet("Missing").unwrap());

        assert_eq!(package.is_sheet_hidden("JSR").unwrap(), Some(true));
        assert_eq!(package.is_sheet_hidden("Payroll").unwrap(), Some(false));
        let workbook = reopen(&package);
        let jsr = workbook
            .sheets_metadata()
            .iter()
            .find(|s| s.name == "JSR")
            .unwrap();
        assert_eq!(jsr.visible, SheetVisible::Hidden);
    }

    #[test]
    fn test_hiding_active_sheet_activates_appended_sheet() {
        let mut package = sample_package(&["JSR", "Payroll"]);
        assert_eq!(package.active_tab().unwrap(), 0);

        package.hide_sheet("JSR").unwrap();
        package.append_sheet("JV Jan 2024", &rows()).unwrap();

        assert_eq!(package.active_tab().unwrap(), 2);
    }

    #[test]
    fn test_remove_sheet_drops_part_and_relationship() {
        let mut package = sample_package(&["Payroll", "JV Jan 2024", "Notes"]);

        assert!(package.remove_sheet("JV Jan 2024").unwrap());
        assert!(!package.remove_sheet("JV Jan 2024").unwrap());

        assert!(!package.has_part("xl/worksheets/sheet2.xml"));
        let rels = std::str::from_utf8(package.part(WORKBOOK_RELS_PART).unwrap()).unwrap();
        assert!(!rels.contains("worksheets/sheet2.xml"));
        let types = std::str::from_utf8(package.part(CONTENT_TYPES_PART).unwrap()).unwrap();
        assert!(!types.contains("/xl/worksheets/sheet2.xml"));

        let mut workbook = reopen(&package);
        assert_eq!(workbook.sheet_names(), vec!["Payroll", "Notes"]);
        assert!(workbook.worksheet_range("Notes").is_ok());
    }

    #[test]
    fn test_replace_reuses_free_part_name() {
        let mut package = sample_package(&["Payroll", "JV Jan 2024"]);

        package.remove_sheet("JV Jan 2024").unwrap();
        package.append_sheet("JV Jan 2024", &rows()).unwrap();

        assert!(package.has_part("xl/worksheets/sheet2.xml"));
        let mut workbook = reopen(&package);
        assert_eq!(workbook.sheet_names(), vec!["Payroll", "JV Jan 2024"]);
        let range = workbook.worksheet_range("JV Jan 2024").unwrap();
        assert_eq!(range.get_size(), (2, 2));
    }

    #[test]
    fn test_defined_names_are_reindexed() {
        let xml = r#"<workbook xmlns:r="r"><bookViews><workbookView activeTab="2" firstSheet="1"/></bookViews><sheets><sheet name="A" sheetId="1" r:id="rId1"/><sheet name="B" sheetId="2" r:id="rId2"/><sheet name="C" sheetId="3" r:id="rId3"/></sheets><definedNames><definedName name="_xlnm.Print_Area" localSheetId="1">B!$A$1</definedName><definedName name="X" localSheetId="2">C!$A$1</definedName><definedName name="G">A!$A$1</definedName></definedNames></workbook>"#;

        let rewritten = rewrite_workbook(xml, &WorkbookEdit::Remove { index: 1 }).unwrap();

        assert!(!rewritten.contains(r#"name="B""#));
        assert!(!rewritten.contains("B!$A$1"));
        assert!(rewritten.contains(r#"localSheetId="1">C!$A$1"#));
        assert!(rewritten.contains(">A!$A$1<"));
        assert!(rewritten.contains(r#"activeTab="1""#));
        assert!(rewritten.contains(r#"firstSheet="0""#));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(6), "G");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_worksheet_xml_cells() {
        let rows = vec![
            vec![
                SheetCell::Text("R&D <north>".to_string()),
                SheetCell::Empty,
                SheetCell::Number(Decimal::new(150050, 2)),
            ],
            vec![SheetCell::Text(" padded".to_string())],
        ];

        let xml = worksheet_xml(&rows, true);

        assert!(xml.contains(r#"<dimension ref="A1:C2"/>"#));
        assert!(xml.contains(r#"tabSelected="1""#));
        assert!(xml.contains(
            r#"<c r="A1" t="inlineStr"><is><t>R&amp;D &lt;north&gt;</t></is></c><c r="C1"><v>1500.50</v></c></row>"#
        ));
        assert!(xml.contains(r#"<t xml:space="preserve"> padded</t>"#));
        assert!(xml.ends_with("</worksheet>"));
    }

    #[test]
    fn test_sheet_rels_part() {
        assert_eq!(
            sheet_rels_part("xl/worksheets/sheet3.xml"),
            "xl/worksheets/_rels/sheet3.xml.rels"
        );
    }

    #[test]
    fn test_not_a_zip() {
        let result = XlsxPackage::from_reader(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(
            result,
            Err(EngineError::UnsupportedFileType { .. })
        ));
    }
}
