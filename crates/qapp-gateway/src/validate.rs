// SPDX-FileCopyrightText: 2026 QApp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field validation for request bodies.
//!
//! Each check returns the cleaned value or a 400 naming the field.

use std::collections::HashSet;

use crate::error::ApiError;

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 150;
pub const MAX_TAG_LEN: usize = 50;
pub const MAX_AVATAR_LEN: usize = 200;

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        None => Err(ApiError::bad_request(format!("{field}: This field is required."))),
        Some("") => Err(ApiError::bad_request(format!("{field}: This field may not be blank."))),
        Some(value) => Ok(value),
    }
}

fn max_chars(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::bad_request(format!(
            "{field}: Ensure this field has no more than {max} characters."
        )));
    }
    Ok(())
}

pub fn title(value: Option<&str>) -> Result<String, ApiError> {
    let title = required("title", value)?;
    max_chars("title", title, MAX_TITLE_LEN)?;
    Ok(title.to_string())
}

/// Post descriptions and reply contents: any non-blank text.
pub fn text(field: &str, value: Option<&str>) -> Result<String, ApiError> {
    required(field, value).map(str::to_string)
}

/// Trimmed, deduplicated tag names in their given order.
pub fn tags(names: &[String]) -> Result<Vec<String>, ApiError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::bad_request("tags: Tag names may not be blank."));
        }
        max_chars("tags", name, MAX_TAG_LEN)?;
        if seen.insert(name) {
            out.push(name.to_string());
        }
    }
    Ok(out)
}

const INVALID_USERNAME: &str = "username: Enter a valid username. This value may contain only \
     ASCII letters, numbers, and @/./+/-/_ characters.";

/// ASCII letters, digits, and `@.+-_`, at most 150 characters.
pub fn username(value: Option<&str>) -> Result<String, ApiError> {
    let username = required("username", value)?;
    max_chars("username", username, MAX_NAME_LEN)?;
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if !valid {
        return Err(ApiError::bad_request(INVALID_USERNAME));
    }
    Ok(username.to_string())
}

/// Optional display name. Blank is allowed.
pub fn display_name(value: Option<&str>) -> Result<String, ApiError> {
    let name = value.map(str::trim).unwrap_or_default();
    max_chars("display_name", name, MAX_NAME_LEN)?;
    Ok(name.to_string())
}

/// Avatar URL. Blank clears it.
pub fn avatar(value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    max_chars("avatar", value, MAX_AVATAR_LEN)?;
    let host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or_default();
    if host.is_empty() || host.starts_with('/') || value.chars().any(char::is_whitespace) {
        return Err(ApiError::bad_request("avatar: Enter a valid URL."));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_bounded() {
        assert_eq!(title(Some("  Hello ")).unwrap(), "Hello");
        assert_eq!(
            title(None).unwrap_err().detail(),
            "title: This field is required."
        );
        assert_eq!(
            title(Some("   ")).unwrap_err().detail(),
            "title: This field may not be blank."
        );
        assert!(title(Some(&"x".repeat(255))).is_ok());
        assert!(title(Some(&"x".repeat(256))).is_err());
    }

    #[test]
    fn tags_are_deduplicated_in_order() {
        let names = vec![" work ".to_string(), "health".to_string(), "work".to_string()];
        assert_eq!(tags(&names).unwrap(), vec!["work", "health"]);
        assert!(tags(&["".to_string()]).is_err());
        assert!(tags(&["t".repeat(51)]).is_err());
        assert!(tags(&[]).unwrap().is_empty());
    }

    #[test]
    fn usernames_follow_the_allowed_alphabet() {
        assert_eq!(username(Some("jo.doe+1@x-y_z")).unwrap(), "jo.doe+1@x-y_z");
        assert!(username(Some("has space")).is_err());
        assert!(username(Some("semi;colon")).is_err());
        assert!(username(Some(&"u".repeat(151))).is_err());
    }

    #[test]
    fn usernames_are_ascii_only() {
        assert!(username(Some("josé")).is_err());
        assert!(username(Some("名前")).is_err());
        assert_eq!(username(Some("jose")).unwrap(), "jose");
    }

    #[test]
    fn avatar_must_be_http_url() {
        assert_eq!(avatar("").unwrap(), "");
        assert_eq!(
            avatar("https://img.example/a.png").unwrap(),
            "https://img.example/a.png"
        );
        assert!(avatar("ftp://img.example/a.png").is_err());
        assert!(avatar("https://").is_err());
        assert!(avatar("not a url").is_err());
        let long = format!("https://example.com/{}", "a".repeat(200));
        assert!(avatar(&long).is_err());
    }

    #[test]
    fn display_name_may_be_blank() {
        assert_eq!(display_name(None).unwrap(), "");
        assert_eq!(display_name(Some(" Ann ")).unwrap(), "Ann");
        assert!(display_name(Some(&"n".repeat(151))).is_err());
    }
}
