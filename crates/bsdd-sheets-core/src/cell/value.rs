//! Cell value types

use chrono::NaiveDateTime;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(SharedString),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),

    /// Date/time value. Readers produce this for numeric cells whose number
    /// format is a date format; the serial has already been resolved against
    /// the workbook's date system.
    DateTime(NaiveDateTime),

    /// Formula with the cached result written by the producing application
    Formula {
        /// Original formula text (e.g., "=CONCAT(A1,B1)")
        text: String,
        /// Last calculated value (if any)
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// True only for [`CellValue::Empty`]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Whether the cell carries no data a row could use. Whitespace-only
    /// text and formulas that were never calculated count as blank.
    pub fn is_blank(&self) -> bool {
        match self.effective_value() {
            CellValue::String(s) => s.trim().is_empty(),
            CellValue::Empty | CellValue::Formula { .. } => true,
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self.effective_value() {
            CellValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The value a reader of the sheet sees: a formula's cached result, or
    /// the cell itself. Uncached formulas are returned unchanged.
    pub fn effective_value(&self) -> &CellValue {
        let mut value = self;
        while let CellValue::Formula {
            cached_value: Some(cached),
            ..
        } = value
        {
            value = &**cached;
        }
        value
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

/// Renders the cell the way a header or code reads in the sheet
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_value() {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
            CellValue::Error(e) => f.write_str(e.as_str()),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::Formula { text, .. } => f.write_str(text),
        }
    }
}

macro_rules! cell_value_from {
    ($($ty:ty => |$v:ident| $make:expr;)*) => {
        $(
            impl From<$ty> for CellValue {
                fn from($v: $ty) -> Self {
                    $make
                }
            }
        )*
    };
}

cell_value_from! {
    bool => |b| CellValue::Boolean(b);
    f64 => |n| CellValue::Number(n);
    &str => |s| CellValue::string(s);
    String => |s| CellValue::string(s);
    NaiveDateTime => |dt| CellValue::DateTime(dt);
}

/// Error literals a cell can hold (`t="e"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
    Spill,
    Calc,
}

const ERROR_LITERALS: [(CellError, &str); 10] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
    (CellError::GettingData, "#GETTING_DATA"),
    (CellError::Spill, "#SPILL!"),
    (CellError::Calc, "#CALC!"),
];

impl CellError {
    /// The literal as Excel writes it, e.g. `#N/A`
    pub fn as_str(self) -> &'static str {
        ERROR_LITERALS
            .iter()
            .find(|(error, _)| *error == self)
            .map_or("#VALUE!", |(_, literal)| literal)
    }

    /// Match an error literal, ignoring ASCII case
    pub fn parse(s: &str) -> Option<Self> {
        ERROR_LITERALS
            .iter()
            .find(|(_, literal)| literal.eq_ignore_ascii_case(s.trim()))
            .map(|(error, _)| *error)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable text shared between every cell that points at the same
/// shared-string table entry
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SharedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
