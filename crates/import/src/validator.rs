use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tally_core::{CanonicalRecord, ProjectedRow, RawValue, TargetColumn, DEFAULT_CATEGORY};
use thiserror::Error;

/// Why a row was left out of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecord {
    #[error("Missing required field: {0}")]
    MissingField(TargetColumn),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

// `%Y` happily reads "24" as year 24, so parsed years below MIN_YEAR are
// skipped and the two-digit `%y` forms get their turn.
const MIN_YEAR: i32 = 1000;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y",
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%b %d %Y", "%b %d, %Y", "%d %B %Y",
    "%B %d %Y", "%B %d, %Y",
];

/// Commas are only accepted as thousands separators: `1,234` or `12,345.67`.
fn thousands_grouped() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^[-+]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("invalid regex"))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Checks one projected row and builds its canonical record.
///
/// Date, description and amount must be present and non-empty. A missing or
/// empty category becomes [`DEFAULT_CATEGORY`]; any other category passes
/// through untouched.
pub fn validate(row: &ProjectedRow) -> Result<CanonicalRecord, InvalidRecord> {
    let date = required(row, TargetColumn::Date)?;
    let description = required(row, TargetColumn::Description)?;
    let amount = required(row, TargetColumn::Amount)?;

    let date = parse_date(date)?;
    let amount = parse_amount(amount)?;
    let description = description.render().unwrap_or_default();
    let category = row
        .get(TargetColumn::Category)
        .and_then(RawValue::render)
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Ok(CanonicalRecord {
        date,
        description,
        amount,
        category,
    })
}

/// Valid records in input order; invalid rows are dropped.
pub fn validate_batch(rows: &[ProjectedRow]) -> Vec<CanonicalRecord> {
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| match validate(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(row = idx, reason = %e, "dropping invalid row");
                None
            }
        })
        .collect()
}

fn required(row: &ProjectedRow, column: TargetColumn) -> Result<&RawValue, InvalidRecord> {
    match row.get(column) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(InvalidRecord::MissingField(column)),
    }
}

fn parse_date(value: &RawValue) -> Result<NaiveDate, InvalidRecord> {
    let s = value.render().unwrap_or_default();
    let s = s.trim();

    let parsed = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .chain(
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date()),
        )
        .chain(DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .find(|date| date.year() >= MIN_YEAR);

    parsed.ok_or_else(|| InvalidRecord::InvalidDate(s.to_string()))
}

fn parse_amount(value: &RawValue) -> Result<Decimal, InvalidRecord> {
    let s = match value {
        RawValue::Number(d) => return Ok(*d),
        RawValue::Text(s) => s.trim(),
        RawValue::Empty => return Err(InvalidRecord::MissingField(TargetColumn::Amount)),
    };

    let invalid = || InvalidRecord::InvalidAmount(s.to_string());

    let (negative, inner) = match s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let mut cleaned = inner.replace(['$', ' '], "");
    // A sign inside accounting parentheses is ambiguous.
    if negative && cleaned.starts_with(['-', '+']) {
        return Err(invalid());
    }
    if cleaned.contains(',') {
        if !thousands_grouped().is_match(&cleaned) {
            return Err(invalid());
        }
        cleaned.retain(|c| c != ',');
    }
    let dec = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| invalid())?;

    Ok(if negative { -dec } else { dec })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn row(date: RawValue, description: RawValue, amount: RawValue, category: RawValue) -> ProjectedRow {
        ProjectedRow::new()
            .with(TargetColumn::Date, date)
            .with(TargetColumn::Description, description)
            .with(TargetColumn::Amount, amount)
            .with(TargetColumn::Category, category)
    }

    // ── validate ──────────────────────────────────────────────────────────────

    #[test]
    fn valid_row_becomes_record() {
        let r = row(text("2024-01-05"), text("Coffee"), text("-4.50"), text("Food"));
        let record = validate(&r).unwrap();
        assert_eq!(
            record,
            CanonicalRecord::new(date(2024, 1, 5), "Coffee", dec("-4.50"), "Food")
        );
    }

    #[test]
    fn empty_category_defaults_to_personal() {
        let r = row(text("2024-01-05"), text("Coffee"), text("-4.50"), RawValue::Empty);
        assert_eq!(validate(&r).unwrap().category, "Personal");
    }

    #[test]
    fn absent_category_defaults_to_personal() {
        let r = ProjectedRow::new()
            .with(TargetColumn::Date, text("2024-01-05"))
            .with(TargetColumn::Description, text("Coffee"))
            .with(TargetColumn::Amount, text("1"));
        assert_eq!(validate(&r).unwrap().category, DEFAULT_CATEGORY);
    }

    #[test]
    fn category_passes_through_unchanged() {
        let r = row(text("2024-01-05"), text("x"), text("1"), text("  weird Cat "));
        assert_eq!(validate(&r).unwrap().category, "  weird Cat ");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let r = row(RawValue::Empty, text("x"), text("1"), text("y"));
        assert_eq!(validate(&r), Err(InvalidRecord::MissingField(TargetColumn::Date)));

        let r = row(text("2024-01-05"), RawValue::Empty, text("1"), text("y"));
        assert_eq!(
            validate(&r),
            Err(InvalidRecord::MissingField(TargetColumn::Description))
        );

        let r = row(text("2024-01-05"), text("x"), RawValue::Empty, text("y"));
        assert_eq!(validate(&r), Err(InvalidRecord::MissingField(TargetColumn::Amount)));

        assert_eq!(
            validate(&ProjectedRow::new()),
            Err(InvalidRecord::MissingField(TargetColumn::Date))
        );
    }

    #[test]
    fn explicit_empty_description_is_allowed() {
        let r = row(text("2024-01-05"), text(""), text("1"), text("y"));
        assert_eq!(validate(&r).unwrap().description, "");
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let r = row(text("not-a-date"), text("x"), text("5"), text("y"));
        assert_eq!(
            validate(&r),
            Err(InvalidRecord::InvalidDate("not-a-date".into()))
        );
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let r = row(text("2024-01-05"), text("x"), text("five"), text("y"));
        assert_eq!(validate(&r), Err(InvalidRecord::InvalidAmount("five".into())));
    }

    #[test]
    fn numeric_cells_are_accepted() {
        let r = row(
            RawValue::Number(Decimal::from(20240105)),
            RawValue::Number(Decimal::from(42)),
            RawValue::Number(dec("5")),
            RawValue::Number(Decimal::from(7)),
        );
        let record = validate(&r).unwrap();
        assert_eq!(record.date, date(2024, 1, 5));
        assert_eq!(record.description, "42");
        assert_eq!(record.amount, dec("5"));
        assert_eq!(record.category, "7");
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn parse_date_accepts_common_layouts() {
        let expected = date(2024, 1, 5);
        for input in [
            "2024-01-05",
            "2024/01/05",
            "20240105",
            "01/05/2024",
            "01/05/24",
            "01-05-2024",
            "05 Jan 2024",
            "Jan 05 2024",
            "Jan 5, 2024",
            "January 5, 2024",
            "2024-01-05 13:45:00",
            "2024-01-05T13:45:00",
            "2024-01-05T13:45:00Z",
            " 2024-01-05 ",
        ] {
            assert_eq!(parse_date(&text(input)), Ok(expected), "input {input}");
        }
    }

    #[test]
    fn parse_date_falls_back_to_day_first() {
        assert_eq!(parse_date(&text("25/12/2024")), Ok(date(2024, 12, 25)));
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert!(parse_date(&text("2024-02-30")).is_err());
        assert!(parse_date(&text("13/13/2024")).is_err());
    }

    // ── parse_amount ──────────────────────────────────────────────────────────

    #[test]
    fn parse_amount_plain_and_signed() {
        assert_eq!(parse_amount(&text("123.45")), Ok(dec("123.45")));
        assert_eq!(parse_amount(&text("-4.50")), Ok(dec("-4.50")));
        assert_eq!(parse_amount(&text("0")), Ok(Decimal::ZERO));
    }

    #[test]
    fn parse_amount_strips_currency_formatting() {
        assert_eq!(parse_amount(&text("$1,234.56")), Ok(dec("1234.56")));
        assert_eq!(parse_amount(&text("(75.25)")), Ok(dec("-75.25")));
    }

    #[test]
    fn parse_amount_requires_three_digit_groups() {
        assert_eq!(parse_amount(&text("1,234.56")), Ok(dec("1234.56")));
        assert_eq!(parse_amount(&text("-12,345,678")), Ok(dec("-12345678")));
        assert_eq!(
            parse_amount(&text("4,50")),
            Err(InvalidRecord::InvalidAmount("4,50".into()))
        );
        assert_eq!(
            parse_amount(&text("1,2,3")),
            Err(InvalidRecord::InvalidAmount("1,2,3".into()))
        );
        assert!(parse_amount(&text("1234,567.8")).is_err());
        assert!(parse_amount(&text(",100")).is_err());
    }

    #[test]
    fn parse_amount_rejects_sign_inside_parentheses() {
        assert_eq!(
            parse_amount(&text("(-5)")),
            Err(InvalidRecord::InvalidAmount("(-5)".into()))
        );
        assert!(parse_amount(&text("(+5)")).is_err());
        assert_eq!(parse_amount(&text("($1,000.00)")), Ok(dec("-1000.00")));
    }

    #[test]
    fn parse_amount_accepts_scientific_notation() {
        assert_eq!(parse_amount(&text("1e3")), Ok(Decimal::from(1000)));
    }

    #[test]
    fn parse_amount_invalid() {
        assert!(parse_amount(&text("not_a_number")).is_err());
        assert!(parse_amount(&text("")).is_err());
    }

    // ── validate_batch ────────────────────────────────────────────────────────

    #[test]
    fn batch_keeps_only_valid_rows_in_order() {
        let rows = vec![
            row(text("2024-01-05"), text("a"), text("1"), text("x")),
            row(text("bad"), text("b"), text("2"), text("x")),
            row(text("2024-01-07"), text("c"), text("3"), RawValue::Empty),
            row(text("2024-01-08"), text("d"), text("nope"), text("x")),
        ];
        let records = validate_batch(&rows);
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "c"]);
    }

    #[test]
    fn batch_of_invalid_rows_is_empty() {
        let rows = vec![row(text("bad"), text("b"), text("2"), text("x"))];
        assert!(validate_batch(&rows).is_empty());
    }
}
