use chrono::NaiveDate;
use uuid::Uuid;

/// Format: `SUM-YYYYMMDD-XXXXX`. The suffix is derived deterministically
/// from `summary_id`'s hex digits, not randomly generated — ported 1:1 from
/// `examples/original_source/app/utils/reference_number.py` so reference
/// numbers a user has already seen never change if this is ever recomputed.
pub fn generate(summary_id: Uuid, date: NaiveDate) -> String {
    let date_str = date.format("%Y%m%d").to_string();
    let hex = summary_id.simple().to_string().to_uppercase();

    let mut suffix = String::with_capacity(5);
    let bytes = hex.as_bytes();
    let mut i = 0;
    while i < 10 && i + 2 <= bytes.len() {
        let pair = &hex[i..i + 2];
        let value = u32::from_str_radix(pair, 16).unwrap_or(0);
        if value % 2 == 0 {
            let letter = (b'A' + (value % 26) as u8) as char;
            suffix.push(letter);
        } else {
            suffix.push_str(&(value % 10).to_string());
        }
        i += 2;
    }
    while suffix.len() < 5 {
        suffix.push('0');
    }
    suffix.truncate(5);

    format!("SUM-{date_str}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_expected_format() {
        let id = Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 27).unwrap();
        let reference = generate(id, date);
        assert!(reference.starts_with("SUM-20250127-"));
        assert_eq!(reference.len(), "SUM-20250127-XXXXX".len());
    }

    #[test]
    fn is_deterministic_for_the_same_id_and_date() {
        let id = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        assert_eq!(generate(id, date), generate(id, date));
    }
}
