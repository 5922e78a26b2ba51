use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Converts a timestamp into a fractional year, e.g. 2021-07-02 12:00 -> 2021.5
pub fn decimal_year(datetime: NaiveDateTime) -> Option<f64> {
    let year = datetime.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_hms_opt(0, 0, 0)?;

    let elapsed = (datetime - start).num_seconds() as f64;
    let length = (end - start).num_seconds() as f64;
    Some(year as f64 + elapsed / length)
}

/// Fractional year at midnight of `date`
pub fn decimal_year_from_date(date: NaiveDate) -> Option<f64> {
    decimal_year(date.and_hms_opt(0, 0, 0)?)
}

/// Parses a date given as YYYY-MM-DD or YYYYMMDD
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
}
