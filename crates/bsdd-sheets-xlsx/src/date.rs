//! Excel serial dates
//!
//! Notes:
//! - Excel stores dates as serial numbers (days since a base date), with the
//!   time of day as the fractional part.
//! - In the 1900 date system, Excel includes the historical "1900 leap year"
//!   bug: serial 60 is the non-existent 1900-02-29. Serials below 60 are
//!   shifted by one day so that every real date after it lands correctly;
//!   serial 60 itself is read as 1900-02-28.
//! - In the 1904 date system serial 0 is 1904-01-01 and there is no bug.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert an Excel serial number to a date/time.
///
/// Returns `None` for negative or non-finite serials and for serials past the
/// range chrono can represent; callers keep those cells as plain numbers.
pub fn excel_serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let (epoch, serial) = if date_1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, serial)
    } else if serial < 60.0 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, serial)
    } else if serial < 61.0 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, serial - 1.0)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, serial)
    };

    // Round to the millisecond so that 0.999999 day fractions do not turn
    // 12:00 into 11:59:59.999.
    let total_millis = (serial * MILLIS_PER_DAY).round();
    if total_millis > i64::MAX as f64 {
        return None;
    }
    let total_millis = total_millis as i64;

    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(total_millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_1900_system_dates() {
        assert_eq!(
            excel_serial_to_datetime(1.0, false),
            Some(ymd_hms(1900, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            excel_serial_to_datetime(59.0, false),
            Some(ymd_hms(1900, 2, 28, 0, 0, 0))
        );
        // The fictional 1900-02-29
        assert_eq!(
            excel_serial_to_datetime(60.0, false),
            Some(ymd_hms(1900, 2, 28, 0, 0, 0))
        );
        assert_eq!(
            excel_serial_to_datetime(61.0, false),
            Some(ymd_hms(1900, 3, 1, 0, 0, 0))
        );
        assert_eq!(
            excel_serial_to_datetime(44693.0, false),
            Some(ymd_hms(2022, 5, 12, 0, 0, 0))
        );
    }

    #[test]
    fn test_time_fraction() {
        assert_eq!(
            excel_serial_to_datetime(44693.5, false),
            Some(ymd_hms(2022, 5, 12, 12, 0, 0))
        );
        // Floating-point noise just below noon still rounds to noon
        assert_eq!(
            excel_serial_to_datetime(44693.499_999_999_9, false),
            Some(ymd_hms(2022, 5, 12, 12, 0, 0))
        );
    }

    #[test]
    fn test_1904_system() {
        assert_eq!(
            excel_serial_to_datetime(0.0, true),
            Some(ymd_hms(1904, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            excel_serial_to_datetime(43231.0, true),
            Some(ymd_hms(2022, 5, 12, 0, 0, 0))
        );
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(excel_serial_to_datetime(-1.0, false), None);
        assert_eq!(excel_serial_to_datetime(f64::NAN, false), None);
        assert_eq!(excel_serial_to_datetime(f64::INFINITY, false), None);
        assert_eq!(excel_serial_to_datetime(1e300, false), None);
    }
}
