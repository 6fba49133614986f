//! Conversion options

use chrono::{FixedOffset, Offset, Utc};

use bsdd_sheets_core::ColumnSpan;

use crate::template::EntityKind;

/// Where one row-set lives in the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    /// Entity kind the rows describe
    pub kind: EntityKind,
    /// Sheet name
    pub sheet_name: String,
    /// 0-based index of the header row
    pub header_row: u32,
    /// Columns read from every row
    pub columns: ColumnSpan,
}

impl SheetLayout {
    /// Header row of the bSDD template: five banner rows are skipped
    pub const TEMPLATE_HEADER_ROW: u32 = 5;

    pub fn new(kind: EntityKind, header_row: u32, columns: ColumnSpan) -> Self {
        Self {
            kind,
            sheet_name: kind.sheet_name().to_string(),
            header_row,
            columns,
        }
    }

    /// Layout of `kind` in the published template
    pub fn template(kind: EntityKind) -> Self {
        // Column letters of the template are fixed
        let (first, last) = match kind {
            EntityKind::Domain => (2, 16),                  // C:Q
            EntityKind::Classification => (2, 26),          // C:AA
            EntityKind::Material => (2, 26),                // C:AA
            EntityKind::Property => (2, 45),                // C:AT
            EntityKind::ClassificationProperty => (2, 19),  // C:T
            EntityKind::ClassificationRelation => (2, 6),   // C:G
            EntityKind::AllowedValue => (2, 45),            // C:AT
            EntityKind::PropertyRelation => (2, 45),        // C:AT
        };
        Self::new(
            kind,
            Self::TEMPLATE_HEADER_ROW,
            ColumnSpan::new(first, last),
        )
    }
}

/// Layouts of all eight row-sets, one per [`EntityKind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayouts {
    layouts: [SheetLayout; 8],
}

impl SheetLayouts {
    /// Layout for `kind`
    pub fn get(&self, kind: EntityKind) -> &SheetLayout {
        &self.layouts[kind as usize]
    }

    /// Replace the layout for `layout.kind`
    pub fn set(&mut self, layout: SheetLayout) {
        let idx = layout.kind as usize;
        self.layouts[idx] = layout;
    }

    pub fn iter(&self) -> impl Iterator<Item = &SheetLayout> {
        self.layouts.iter()
    }
}

impl Default for SheetLayouts {
    fn default() -> Self {
        Self {
            layouts: EntityKind::ALL.map(SheetLayout::template),
        }
    }
}

/// Options for converting a workbook
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Keep null fields and entries in the output (default: false, nulls are pruned)
    pub keep_nulls: bool,
    /// Offset appended to date/time cells (default: UTC)
    pub utc_offset: FixedOffset,
    /// Sheet layouts (default: the published template)
    pub layouts: SheetLayouts,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            keep_nulls: false,
            utc_offset: Utc.fix(),
            layouts: SheetLayouts::default(),
        }
    }
}
