use chrono::{Datelike, NaiveDate};
use miqat_types::{HijriDate, MiqatError};

/// Minimum Gregorian year for tabular Hijri conversion.
pub const HIJRI_MIN_YEAR: i32 = 1938;
/// Maximum Gregorian year for tabular Hijri conversion.
pub const HIJRI_MAX_YEAR: i32 = 2076;

/// Returns the English Hijri month name.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Muharram",
        2 => "Safar",
        3 => "Rabi' al-Awwal",
        4 => "Rabi' al-Thani",
        5 => "Jumada al-Ula",
        6 => "Jumada al-Akhirah",
        7 => "Rajab",
        8 => "Sha'ban",
        9 => "Ramadan",
        10 => "Shawwal",
        11 => "Dhu al-Qi'dah",
        12 => "Dhu al-Hijjah",
        _ => "Unknown",
    }
}

/// Builds the Hijri record from the day, month and year reported by a
/// calculator. `date` is rebuilt as `DD-MM-YYYY` when not supplied.
pub fn compose(day: &str, month_number: u32, month_name: &str, year: &str, date: Option<&str>) -> HijriDate {
    let date = match date {
        Some(d) => d.to_string(),
        None => format!("{:0>2}-{:02}-{}", day, month_number, year),
    };
    HijriDate {
        date,
        day: day.to_string(),
        month_number,
        month_name: month_name.to_string(),
        year: year.to_string(),
    }
}

/// Converts a Gregorian date with the tabular calendar.
///
/// Used when the calculator payload carries no Hijri block.
///
/// # Errors
/// Returns `Parse` if the date is outside 1938-2076.
pub fn from_gregorian(date: NaiveDate) -> Result<HijriDate, MiqatError> {
    if date.year() < HIJRI_MIN_YEAR || date.year() > HIJRI_MAX_YEAR {
        return Err(MiqatError::parse(
            "hijri date",
            format!("{} outside {}-{}", date, HIJRI_MIN_YEAR, HIJRI_MAX_YEAR),
        ));
    }

    let hijri = hijri_date::HijriDate::from_gr(date.year() as usize, date.month() as usize, date.day() as usize)
        .map_err(|_| MiqatError::parse("hijri date", format!("{} has no tabular Hijri equivalent", date)))?;

    let month = hijri.month() as u32;
    let day = format!("{:02}", hijri.day());
    let year = hijri.year().to_string();
    Ok(compose(&day, month, month_name(month), &year, None))
}
