//! Worksheet grid, row/column dimensions and merged ranges.

#[cfg(feature = "fast-hash")]
use hashbrown::HashMap;
#[cfg(not(feature = "fast-hash"))]
use std::collections::HashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cell::CellValue;
use crate::preserved::PreservedXml;
use crate::style::{Alignment, Border, CellStyle, Font};
use crate::utils::CellRange;

/// Pack (row, column) into a single map key. Rows occupy the high half so keys sort row-major.
#[inline]
pub fn cell_key(row: u32, column: u32) -> u64 {
    (u64::from(row) << 32) | u64::from(column)
}

#[inline]
fn split_key(key: u64) -> (u32, u32) {
    ((key >> 32) as u32, key as u32)
}

/// A stored cell: value plus an optional shared style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    pub style: Option<Arc<CellStyle>>,
}

impl CellData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one component of the style, keeping the others.
    fn update_style<F: FnOnce(&mut CellStyle)>(&mut self, update: F) {
        let mut style = self
            .style
            .as_deref()
            .cloned()
            .unwrap_or_default();
        update(&mut style);
        self.style = Some(Arc::new(style));
    }
}

/// Per-row layout metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowDimension {
    /// Height in points; `None` means the sheet default.
    pub height: Option<f64>,
    pub hidden: bool,
    /// Default style of empty cells in the row (`s` with `customFormat`).
    pub style: Option<Arc<CellStyle>>,
}

/// Per-column layout metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnDimension {
    /// Width in characters; `None` means the sheet default.
    pub width: Option<f64>,
    pub hidden: bool,
    /// Default style of empty cells in the column.
    pub style: Option<Arc<CellStyle>>,
}

/// Tab visibility of a sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    /// Read the `state` attribute of a `<sheet>` element. Unknown values are visible.
    pub fn from_attr(value: &str) -> Self {
        match value {
            "hidden" => SheetState::Hidden,
            "veryHidden" => SheetState::VeryHidden,
            _ => SheetState::Visible,
        }
    }

    /// Attribute value to write, or `None` for the default.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            SheetState::Visible => None,
            SheetState::Hidden => Some("hidden"),
            SheetState::VeryHidden => Some("veryHidden"),
        }
    }
}

/// A single worksheet.
#[derive(Clone, Debug)]
pub struct Worksheet {
    title: String,
    pub state: SheetState,
    pub cells: HashMap<u64, CellData>,
    pub row_dimensions: BTreeMap<u32, RowDimension>,
    pub column_dimensions: BTreeMap<u32, ColumnDimension>,
    merged_cells: Vec<CellRange>,
    /// Sheet settings read from the file and written back unchanged.
    pub preserved: PreservedXml,
    max_row: u32,
    max_col: u32,
}

impl Worksheet {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Worksheet {
            title: title.into(),
            state: SheetState::Visible,
            cells: HashMap::new(),
            row_dimensions: BTreeMap::new(),
            column_dimensions: BTreeMap::new(),
            merged_cells: Vec::new(),
            preserved: PreservedXml::default(),
            max_row: 0,
            max_col: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        self.title = title.into();
    }

    /// Largest row index holding a stored cell, or 1 for an empty sheet.
    pub fn max_row(&self) -> u32 {
        self.max_row.max(1)
    }

    /// Largest column index holding a stored cell, or 1 for an empty sheet.
    pub fn max_column(&self) -> u32 {
        self.max_col.max(1)
    }

    fn track_extent(&mut self, row: u32, column: u32) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(column);
    }

    pub fn get_cell(&self, row: u32, column: u32) -> Option<&CellData> {
        self.cells.get(&cell_key(row, column))
    }

    pub fn get_cell_value(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.get_cell(row, column).map(|c| &c.value)
    }

    /// Style of a cell, if it has one.
    pub fn get_cell_style(&self, row: u32, column: u32) -> Option<&CellStyle> {
        self.get_cell(row, column).and_then(|c| c.style.as_deref())
    }

    /// Fetch a cell for mutation, creating an empty one if needed.
    pub fn get_or_create_cell_mut(&mut self, row: u32, column: u32) -> &mut CellData {
        self.track_extent(row, column);
        self.cells.entry(cell_key(row, column)).or_default()
    }

    /// Insert a fully built cell (used by the reader).
    pub fn set_cell_data(&mut self, row: u32, column: u32, data: CellData) {
        self.track_extent(row, column);
        self.cells.insert(cell_key(row, column), data);
    }

    pub fn set_cell_value(&mut self, row: u32, column: u32, value: CellValue) {
        self.get_or_create_cell_mut(row, column).value = value;
    }

    pub fn set_cell_style(&mut self, row: u32, column: u32, style: CellStyle) {
        self.get_or_create_cell_mut(row, column).style = Some(Arc::new(style));
    }

    /// Assign a cell's font, keeping its other style components.
    pub fn set_cell_font(&mut self, row: u32, column: u32, font: Font) {
        self.get_or_create_cell_mut(row, column)
            .update_style(|s| s.font = Some(font));
    }

    /// Assign a cell's border, keeping its other style components.
    pub fn set_cell_border(&mut self, row: u32, column: u32, border: Border) {
        self.get_or_create_cell_mut(row, column)
            .update_style(|s| s.border = Some(border));
    }

    /// Assign a cell's alignment, keeping its other style components.
    pub fn set_cell_alignment(&mut self, row: u32, column: u32, alignment: Alignment) {
        self.get_or_create_cell_mut(row, column)
            .update_style(|s| s.alignment = Some(alignment));
    }

    /// Stored cells in row-major order.
    pub fn sorted_cells(&self) -> Vec<((u32, u32), &CellData)> {
        let mut keys: Vec<u64> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(|key| self.cells.get(&key).map(|cell| (split_key(key), cell)))
            .collect()
    }

    pub fn row_dimension(&self, row: u32) -> Option<&RowDimension> {
        self.row_dimensions.get(&row)
    }

    pub fn row_dimension_mut(&mut self, row: u32) -> &mut RowDimension {
        self.row_dimensions.entry(row).or_default()
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_dimension_mut(row).height = Some(height);
    }

    pub fn column_dimension(&self, column: u32) -> Option<&ColumnDimension> {
        self.column_dimensions.get(&column)
    }

    pub fn column_dimension_mut(&mut self, column: u32) -> &mut ColumnDimension {
        self.column_dimensions.entry(column).or_default()
    }

    pub fn set_column_width(&mut self, column: u32, width: f64) {
        self.column_dimension_mut(column).width = Some(width);
    }

    pub fn merged_cells(&self) -> &[CellRange] {
        &self.merged_cells
    }

    /// Record a merged range exactly as read from a file.
    pub fn add_merged_range(&mut self, range: CellRange) {
        self.merged_cells.push(range);
    }

    /// Merge a range into one cell.
    ///
    /// Ranges overlapping the new one are dropped. Non-anchor cells lose their
    /// values but stay stored, so they count toward the sheet extent.
    pub fn merge_cells(&mut self, range: CellRange) {
        self.merged_cells.retain(|existing| !existing.intersects(&range));
        self.merged_cells.push(range);

        let anchor = range.anchor();
        for (row, column) in range.cells() {
            if (row, column) != anchor {
                self.get_or_create_cell_mut(row, column).value = CellValue::Empty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderStyle, Fill, Color, NumberFormat};

    #[test]
    fn test_extent() {
        let mut ws = Worksheet::new("Sheet1");
        assert_eq!(ws.max_row(), 1);
        assert_eq!(ws.max_column(), 1);

        ws.set_cell_value(20, 3, CellValue::from(1u32));
        ws.set_cell_font(4, 30, Font::new().with_bold(true));
        assert_eq!(ws.max_row(), 20);
        assert_eq!(ws.max_column(), 30);

        ws.set_row_height(50, 10.0);
        ws.set_column_width(40, 3.0);
        assert_eq!(ws.max_row(), 20);
        assert_eq!(ws.max_column(), 30);
    }

    #[test]
    fn test_style_components_are_independent() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_style(
            2,
            2,
            CellStyle::new()
                .with_fill(Fill::solid(Color::rgb("FFFFFF00")))
                .with_number_format(NumberFormat::Builtin(14)),
        );
        ws.set_cell_border(2, 2, Border::all(BorderStyle::thin()));
        ws.set_cell_font(2, 2, Font::new().with_size(10.0));

        let style = ws.get_cell_style(2, 2).unwrap();
        assert!(style.fill.is_some());
        assert_eq!(style.number_format, Some(NumberFormat::Builtin(14)));
        assert_eq!(style.font.as_ref().and_then(|f| f.size), Some(10.0));
        assert!(style.border.is_some());
    }

    #[test]
    fn test_merge_cells() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value(5, 11, CellValue::from("note"));
        ws.set_cell_value(5, 12, CellValue::from("lost"));
        ws.add_merged_range(CellRange::parse("L5:M5").unwrap());
        ws.add_merged_range(CellRange::parse("A1:B1").unwrap());

        ws.merge_cells(CellRange::parse("K5:W5").unwrap());
        ws.merge_cells(CellRange::parse("K5:W5").unwrap());

        assert_eq!(
            ws.merged_cells(),
            &[
                CellRange::parse("A1:B1").unwrap(),
                CellRange::parse("K5:W5").unwrap()
            ]
        );
        assert_eq!(ws.get_cell_value(5, 11), Some(&CellValue::from("note")));
        assert_eq!(ws.get_cell_value(5, 12), Some(&CellValue::Empty));
        assert_eq!(ws.max_column(), 23);
    }

    #[test]
    fn test_sorted_cells() {
        let mut ws = Worksheet::new("Sheet1");
        ws.set_cell_value(2, 1, CellValue::from(3u32));
        ws.set_cell_value(1, 2, CellValue::from(2u32));
        ws.set_cell_value(1, 1, CellValue::from(1u32));
        let order: Vec<(u32, u32)> = ws.sorted_cells().into_iter().map(|(pos, _)| pos).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
    }
}
