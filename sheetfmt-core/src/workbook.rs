//! Workbook representation and file I/O operations.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Result, SheetfmtError};
use crate::style::{Font, StyleRegistry};
use crate::worksheet::Worksheet;
use crate::{reader, writer};

/// A defined name from workbook.xml, kept verbatim across a load/save cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedRange {
    pub name: String,
    /// Formula text, e.g. `'Sheet1'!$A$1:$B$2`.
    pub value: String,
    /// Index of the sheet the name is scoped to.
    pub local_sheet_id: Option<u32>,
    pub hidden: bool,
}

/// Compression level for saving workbooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1)
    Fast,
    /// Deflate level 6
    #[default]
    Default,
    /// Deflate level 9 - smallest files, slowest
    Best,
}

/// An Excel workbook containing worksheets.
#[derive(Clone, Debug)]
pub struct Workbook {
    pub worksheets: Vec<Worksheet>,
    pub named_ranges: Vec<NamedRange>,
    pub compression: CompressionLevel,
    /// Base font (style index 0) written to styles.xml.
    pub default_font: Font,
    /// Raw `dxfs`, `tableStyles` and `colors` of the loaded styles.xml.
    pub preserved_styles: Vec<String>,
    /// Theme part of the loaded package, written back as xl/theme/theme1.xml.
    pub theme: Option<Vec<u8>>,
    active: usize,
}

impl Workbook {
    /// Create a new empty workbook.
    pub fn new() -> Self {
        let default_font = StyleRegistry::new().fonts.swap_remove(0);
        Workbook {
            worksheets: Vec::new(),
            named_ranges: Vec::new(),
            compression: CompressionLevel::default(),
            default_font,
            preserved_styles: Vec::new(),
            theme: None,
            active: 0,
        }
    }

    pub fn set_compression(&mut self, level: CompressionLevel) {
        self.compression = level;
    }

    /// Load a workbook from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SheetfmtError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open file '{}': {}", path.display(), e),
            ))
        })?;
        Self::load_from_reader(BufReader::new(file))
    }

    /// Load a workbook from bytes (e.g., from memory or network).
    pub fn load_from_bytes(data: &[u8]) -> Result<Self> {
        Self::load_from_reader(Cursor::new(data))
    }

    /// Load a workbook from any seekable reader.
    pub fn load_from_reader<R: Read + Seek>(source: R) -> Result<Self> {
        let mut archive = ZipArchive::new(source)?;
        let workbook = reader::read_workbook(&mut archive)?;
        tracing::debug!(
            sheets = workbook.worksheets.len(),
            active = workbook.active,
            "loaded workbook"
        );
        Ok(workbook)
    }

    /// The sheet selected when the file was last saved.
    pub fn active(&self) -> Result<&Worksheet> {
        self.worksheets.get(self.active).ok_or(SheetfmtError::NoWorksheets)
    }

    pub fn active_mut(&mut self) -> Result<&mut Worksheet> {
        self.worksheets.get_mut(self.active).ok_or(SheetfmtError::NoWorksheets)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Select the active sheet. Out-of-range indexes are ignored.
    pub fn set_active(&mut self, index: usize) {
        if index < self.worksheets.len() || self.worksheets.is_empty() {
            self.active = index;
        }
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(|ws| ws.title()).collect()
    }

    /// Get a worksheet by name.
    pub fn get_sheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.title() == name)
            .ok_or_else(|| SheetfmtError::WorksheetNotFound(name.to_string()))
    }

    /// Get a mutable worksheet by name.
    pub fn get_sheet_by_name_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|ws| ws.title() == name)
            .ok_or_else(|| SheetfmtError::WorksheetNotFound(name.to_string()))
    }

    /// Append a new worksheet. Without a title it is named `Sheet{n}`.
    pub fn create_sheet(&mut self, title: Option<String>) -> Result<&mut Worksheet> {
        let title = title.unwrap_or_else(|| format!("Sheet{}", self.worksheets.len() + 1));
        if self.worksheets.iter().any(|ws| ws.title() == title) {
            return Err(SheetfmtError::WorksheetAlreadyExists(title));
        }
        self.worksheets.push(Worksheet::new(title));
        let last = self.worksheets.len() - 1;
        Ok(&mut self.worksheets[last])
    }

    /// Save the workbook to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.save_to_writer(file)
    }

    /// Save the workbook to an in-memory byte vector.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        self.write_workbook_contents(&mut zip)?;
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Save the workbook to any writer that implements Write + Seek.
    pub fn save_to_writer<W: std::io::Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = zip::ZipWriter::new(writer);
        self.write_workbook_contents(&mut zip)?;
        zip.finish()?;
        Ok(())
    }

    /// Get the file options based on compression settings.
    fn get_file_options(&self) -> writer::PartOptions {
        use zip::write::FileOptions;
        use zip::CompressionMethod;

        match self.compression {
            CompressionLevel::None => FileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Stored),
            CompressionLevel::Fast => FileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Default => FileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::Best => FileOptions::default()
                .large_file(false)
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }

    /// Write all workbook parts to a ZipWriter.
    fn write_workbook_contents<W: std::io::Write + Seek>(&self, zip: &mut zip::ZipWriter<W>) -> Result<()> {
        if self.worksheets.is_empty() {
            return Err(SheetfmtError::NoWorksheets);
        }
        let options = self.get_file_options();

        let sorted: Vec<writer::SortedCells<'_>> =
            self.worksheets.iter().map(|ws| ws.sorted_cells()).collect();
        let (shared_strings, shared_index) = writer::collect_shared_strings(&sorted);
        let has_shared_strings = !shared_strings.is_empty();
        let sheet_count = self.worksheets.len();
        let has_theme = self.theme.is_some();

        writer::write_content_types(zip, &options, sheet_count, has_shared_strings, has_theme)?;
        writer::write_rels(zip, &options)?;
        writer::write_doc_props(zip, &options)?;
        writer::write_workbook_xml(zip, &options, &self.worksheets, self.active, &self.named_ranges)?;
        writer::write_workbook_rels(zip, &options, sheet_count, has_shared_strings, has_theme)?;
        if has_shared_strings {
            writer::write_shared_strings(zip, &options, &shared_strings)?;
        }
        if let Some(theme) = &self.theme {
            writer::write_theme(zip, &options, theme)?;
        }

        // Worksheets register their cell styles, so styles.xml goes last.
        let mut styles = StyleRegistry::new();
        styles.set_default_font(self.default_font.clone());
        for (idx, (worksheet, cells)) in self.worksheets.iter().zip(&sorted).enumerate() {
            writer::write_worksheet_xml(
                zip,
                &options,
                worksheet,
                cells,
                idx + 1,
                idx == self.active,
                &shared_index,
                &mut styles,
            )?;
        }
        writer::write_styles_xml(zip, &options, &styles, &self.preserved_styles)?;

        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
