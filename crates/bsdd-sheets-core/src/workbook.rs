//! Workbook type
//!
//! A loaded workbook is a list of named sheets in tab order plus the date
//! system its serial numbers were written in. Sheets are looked up by their
//! exact name; the template loader never guesses at casing.

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Day zero of the workbook's date serials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01 (Windows Excel)
    #[default]
    Epoch1900,
    /// Serial 0 is 1904-01-01 (`<workbookPr date1904="1"/>`)
    Epoch1904,
}

impl DateSystem {
    pub fn from_date1904(flag: bool) -> Self {
        if flag {
            DateSystem::Epoch1904
        } else {
            DateSystem::Epoch1900
        }
    }

    pub fn is_1904(self) -> bool {
        self == DateSystem::Epoch1904
    }
}

/// Sheets of one workbook, in tab order
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    date_system: DateSystem,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Sheet whose name matches `name` exactly
    pub fn sheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|sheet| sheet.name() == name)
    }

    /// Like [`Workbook::sheet_by_name`], failing with [`Error::SheetNotFound`]
    pub fn find_sheet(&self, name: &str) -> Result<&Worksheet> {
        self.sheet_by_name(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sheets.iter().map(Worksheet::name)
    }

    /// Append an empty sheet and hand it back for filling
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        let index = self.push_sheet(Worksheet::new(name))?;
        Ok(&mut self.sheets[index])
    }

    /// Append a filled sheet, returning its tab index
    pub fn push_sheet(&mut self, sheet: Worksheet) -> Result<usize> {
        check_sheet_name(sheet.name())?;
        // Excel treats "Domain" and "DOMAIN" as the same tab
        if self
            .sheet_names()
            .any(|existing| existing.eq_ignore_ascii_case(sheet.name()))
        {
            return Err(Error::DuplicateSheetName(sheet.name().to_string()));
        }
        self.sheets.push(sheet);
        Ok(self.sheets.len() - 1)
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    pub fn set_date_system(&mut self, date_system: DateSystem) {
        self.date_system = date_system;
    }
}

fn check_sheet_name(name: &str) -> Result<()> {
    let problem = match name {
        "" => Some("name is empty".to_string()),
        _ if name.chars().count() > MAX_SHEET_NAME_LEN => {
            Some(format!("longer than {} characters", MAX_SHEET_NAME_LEN))
        }
        _ => name
            .chars()
            .find(|c| matches!(c, ':' | '\\' | '/' | '?' | '*' | '[' | ']'))
            .map(|c| format!("'{}' is not allowed", c)),
    };

    match problem {
        Some(reason) => Err(Error::InvalidSheetName(format!("{:?}: {}", name, reason))),
        None => Ok(()),
    }
}
