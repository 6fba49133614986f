//! Non-fatal conversion diagnostics
//!
//! Problems that do not stop a conversion are collected here and handed back
//! with the result. The library never prints them; callers decide whether to
//! log, show or ignore them.

use std::fmt;

/// One non-fatal problem found while converting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A header names no field of the sheet's template; the column is ignored
    UnknownColumn { sheet: String, column: String },

    /// A header repeats an earlier one; the later column is ignored
    DuplicateHeader {
        sheet: String,
        column: String,
        /// Column letters of the ignored column
        letters: String,
    },
}

impl Diagnostic {
    /// Sheet the diagnostic refers to
    pub fn sheet(&self) -> &str {
        match self {
            Diagnostic::UnknownColumn { sheet, .. } | Diagnostic::DuplicateHeader { sheet, .. } => {
                sheet
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownColumn { sheet, column } => write!(
                f,
                "Sheet '{}': column '{}' is not a recognized field and was ignored",
                sheet, column
            ),
            Diagnostic::DuplicateHeader {
                sheet,
                column,
                letters,
            } => write!(
                f,
                "Sheet '{}': column {} repeats header '{}' and was ignored",
                sheet, letters, column
            ),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(%diagnostic, "diagnostic recorded");
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
