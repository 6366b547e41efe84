use lazy_static::lazy_static;
use regex::Regex;

/// Westernmost and easternmost whole-hour UTC offsets in use
pub const MIN_OFFSET_HOURS: i32 = -12;
pub const MAX_OFFSET_HOURS: i32 = 14;

lazy_static! {
    static ref SIGNED_INTEGER: Regex = Regex::new(r"[-+]?[0-9]+").expect("offset pattern is valid");
}

/// Extract a signed whole-hour offset from free-form time zone text
///
/// Accepts values such as `-5`, `+2`, `UTC+1`, `GMT-03:00` and takes the
/// first signed integer found. Blank text means the offset is unknown.
///
/// # Returns
/// * `Ok(None)` - no value given
/// * `Ok(Some(hours))` - offset parsed and within `-12..=14`
/// * `Err(raw)` - text present but holds no usable offset
pub fn parse_offset(raw: Option<&str>) -> Result<Option<i32>, String> {
    let text = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(t) => t,
    };

    let hours = SIGNED_INTEGER
        .find(text)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .filter(|h| (MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(h))
        .ok_or_else(|| text.to_string())?;

    Ok(Some(hours))
}

/// Absolute distance between two offsets in hours
#[inline]
pub fn offset_gap(a: i32, b: i32) -> i64 {
    (i64::from(a) - i64::from(b)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_offsets() {
        assert_eq!(parse_offset(Some("-5")), Ok(Some(-5)));
        assert_eq!(parse_offset(Some("+2")), Ok(Some(2)));
        assert_eq!(parse_offset(Some("8")), Ok(Some(8)));
    }

    #[test]
    fn test_parse_prefixed_offsets() {
        assert_eq!(parse_offset(Some("UTC+1")), Ok(Some(1)));
        assert_eq!(parse_offset(Some("GMT-03:00")), Ok(Some(-3)));
        assert_eq!(parse_offset(Some(" UTC-10 ")), Ok(Some(-10)));
        assert_eq!(parse_offset(Some("UTC+14")), Ok(Some(14)));
    }

    #[test]
    fn test_blank_is_unknown() {
        assert_eq!(parse_offset(None), Ok(None));
        assert_eq!(parse_offset(Some("   ")), Ok(None));
    }

    #[test]
    fn test_text_without_digits_is_malformed() {
        assert_eq!(parse_offset(Some("Europe/Paris")), Err("Europe/Paris".to_string()));
    }

    #[test]
    fn test_out_of_range_offsets_are_malformed() {
        assert_eq!(parse_offset(Some("UTC+15")), Err("UTC+15".to_string()));
        assert_eq!(parse_offset(Some("-13")), Err("-13".to_string()));
        assert_eq!(
            parse_offset(Some("UTC+2147483647")),
            Err("UTC+2147483647".to_string())
        );
        assert!(parse_offset(Some("99999999999999")).is_err());
    }

    #[test]
    fn test_offset_gap() {
        assert_eq!(offset_gap(-5, 2), 7);
        assert_eq!(offset_gap(3, 3), 0);
        assert_eq!(offset_gap(i32::MAX, -5), i64::from(i32::MAX) + 5);
    }
}
