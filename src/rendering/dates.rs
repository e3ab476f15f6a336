use chrono::{DateTime, Datelike, Timelike, Utc};

/// Abbreviated month names in Brazilian Portuguese.
const MONTHS_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// `dd MMM yyyy`, e.g. `15 mar 2021`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        MONTHS_PT_BR[date.month0() as usize],
        date.year()
    )
}

/// `dd MMM yyyy, às H:mm`, e.g. `25 mar 2021, às 19:48`.
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    format!(
        "{}, às {}:{:02}",
        format_date(date),
        date.hour(),
        date.minute()
    )
}

/// The annotation shown on posts revised after first publication.
pub fn edited_label(date: &DateTime<Utc>) -> String {
    format!("* editado em {}", format_date_time(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2021, 3, 5, 19, 25, 28).unwrap();
        assert_eq!(format_date(&date), "05 mar 2021");
    }

    #[test]
    fn test_all_months() {
        let expected = [
            "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
        ];
        for (i, month) in expected.iter().enumerate() {
            let date = Utc.with_ymd_and_hms(2022, i as u32 + 1, 10, 0, 0, 0).unwrap();
            assert_eq!(format_date(&date), format!("10 {month} 2022"));
        }
    }

    #[test]
    fn test_format_date_time_hour_not_padded() {
        let date = Utc.with_ymd_and_hms(2021, 3, 25, 9, 5, 0).unwrap();
        assert_eq!(format_date_time(&date), "25 mar 2021, às 9:05");
    }

    #[test]
    fn test_edited_label() {
        let date = Utc.with_ymd_and_hms(2021, 3, 25, 19, 48, 0).unwrap();
        assert_eq!(edited_label(&date), "* editado em 25 mar 2021, às 19:48");
    }
}
