//! Number formats, as far as reading needs them
//!
//! A workbook stores dates as plain serial numbers; the only thing that marks
//! a cell as a date is the number format attached to its style. This module
//! answers that one question.

/// Number format attached to a cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Build a format from a `numFmtId`, using the custom format code when the
    /// workbook defines one for that ID
    pub fn from_id(id: u32, custom_code: Option<&str>) -> Self {
        match (id, custom_code) {
            (0, None) => NumberFormat::General,
            (_, Some(code)) => NumberFormat::Custom(code.to_string()),
            (id, None) => NumberFormat::BuiltIn(id),
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            // 14..=22 are the locale-independent date/time formats; 27..=36 and
            // 50..=58 are the East Asian date variants; 45..=47 are mm:ss style.
            NumberFormat::BuiltIn(id) => {
                matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
            }
            NumberFormat::Custom(code) => custom_code_is_date(code),
            NumberFormat::General => false,
        }
    }
}

/// Scan a custom format code for date/time placeholders, skipping quoted
/// literals, escaped characters and bracketed modifiers like `[Red]` or
/// `[$-409]`. Elapsed-time brackets (`[h]`, `[mm]`, `[ss]`) count as time.
fn custom_code_is_date(code: &str) -> bool {
    // Only the first section (positive numbers) decides.
    let section = code.split(';').next().unwrap_or("");
    let mut chars = section.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let lower = inner.to_ascii_lowercase();
                if !lower.is_empty() && lower.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            // "General" and exponent markers are never dates
            'G' | 'g' => {
                let rest: String = chars.clone().take(6).collect();
                if rest.eq_ignore_ascii_case("eneral") {
                    for _ in 0..6 {
                        chars.next();
                    }
                }
            }
            'e' | 'E' => {
                if matches!(chars.peek(), Some('+') | Some('-')) {
                    chars.next();
                }
            }
            _ => {}
        }
    }

    false
}
