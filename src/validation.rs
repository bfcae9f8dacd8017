use crate::error::{NexusError, NexusResult};

/// Validates that a string is not blank (empty or whitespace-only).
/// Returns the trimmed string on success.
pub fn non_blank(value: &str, field: &str) -> NexusResult<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        Err(NexusError::BlankField {
            field: field.to_string(),
        })
    } else {
        Ok(trimmed)
    }
}

/// Validates that a list holds no more than `max` entries.
pub fn at_most<T>(value: &[T], max: usize, field: &str) -> NexusResult<()> {
    if value.len() > max {
        Err(NexusError::TooMany {
            field: field.to_string(),
            max,
        })
    } else {
        Ok(())
    }
}

/// Trims an optional string, returning None if blank.
pub fn trim_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trims an optional email and checks it has the `local@domain` shape.
pub fn optional_email(value: Option<&str>) -> NexusResult<Option<String>> {
    match trim_optional(value) {
        None => Ok(None),
        Some(email) => {
            let valid = match email.split_once('@') {
                Some((local, domain)) => {
                    !local.is_empty()
                        && !domain.is_empty()
                        && !domain.contains('@')
                        && !email.contains(char::is_whitespace)
                }
                None => false,
            };
            if valid {
                Ok(Some(email))
            } else {
                Err(NexusError::InvalidFormat {
                    field: "email".into(),
                    value: email,
                })
            }
        }
    }
}

/// Trims an optional zip code; accepts `12345` or `12345-6789`.
pub fn optional_zip(value: Option<&str>) -> NexusResult<Option<String>> {
    match trim_optional(value) {
        None => Ok(None),
        Some(zip) => {
            let digits = |s: &str, n: usize| s.len() == n && s.chars().all(|c| c.is_ascii_digit());
            let valid = match zip.split_once('-') {
                Some((head, tail)) => digits(head, 5) && digits(tail, 4),
                None => digits(&zip, 5),
            };
            if valid {
                Ok(Some(zip))
            } else {
                Err(NexusError::InvalidFormat {
                    field: "zip".into(),
                    value: zip,
                })
            }
        }
    }
}
