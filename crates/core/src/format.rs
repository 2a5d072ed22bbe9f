//! Display formatting and escaping helpers.
//!
//! Pure functions with no dependencies on the rest of the crate.

use chrono::SecondsFormat;

use crate::types::Timestamp;

/// Render a `YYYY-MM-DD` date as `YYYY / MM / DD`.
///
/// Empty input renders as `-`; anything without three dash-separated parts
/// is returned unchanged.
///
/// ```
/// use boardtrack_core::format::format_slash_ymd;
/// assert_eq!(format_slash_ymd("2024-03-05"), "2024 / 03 / 05");
/// assert_eq!(format_slash_ymd(""), "-");
/// ```
pub fn format_slash_ymd(date: &str) -> String {
    if date.is_empty() {
        return "-".to_string();
    }
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() >= 3 {
        format!("{} / {} / {}", parts[0], parts[1], parts[2])
    } else {
        date.to_string()
    }
}

/// Normalized timestamp string used in exports: RFC 3339, UTC, milliseconds.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Quote a value as a delimited-text field, doubling embedded quotes.
///
/// Every field is quoted so embedded commas, newlines and quotes survive.
pub fn escape_csv(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slash_format_passes_through_unparseable() {
        assert_eq!(format_slash_ymd("March"), "March");
        assert_eq!(format_slash_ymd("2024-03"), "2024-03");
    }

    #[test]
    fn html_escapes_all_markup_characters() {
        assert_eq!(
            escape_html(r#"<b a="1">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        assert_eq!(
            escape_csv(r#"He said "ok", thanks"#),
            r#""He said ""ok"", thanks""#
        );
    }

    #[test]
    fn csv_quotes_empty_value() {
        assert_eq!(escape_csv(""), "\"\"");
    }

    #[test]
    fn timestamp_uses_millis_and_z() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-05T08:30:00.000Z");
    }
}
