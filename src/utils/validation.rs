use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

/// Lower-cased, trimmed email used for identity lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns the trimmed value, or a validation error naming the field when it is blank.
pub fn require_field(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::ValidationError(format!("{field} is required"))),
    }
}

pub fn validate_length(value: &str, field: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_http_url(url: &str, field: &str) -> AppResult<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) || url.len() > 2048 {
        return Err(AppError::ValidationError(format!(
            "{field} must be an http(s) URL"
        )));
    }
    Ok(())
}

/// Escapes user input before it is placed into an HTML email body.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane@example").is_err());
        assert!(validate_email("jane example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_require_field() {
        assert_eq!(require_field(Some("  Ace "), "name").unwrap(), "Ace");
        assert!(require_field(Some("   "), "name").is_err());
        assert!(require_field(None, "name").is_err());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://cdn.example.com/a.jpg", "photo").is_ok());
        assert!(validate_http_url("javascript:alert(1)", "photo").is_err());
    }
}
