use crate::utils::error::{Result, VenueError};
use std::cmp::Ordering;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(VenueError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| VenueError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Loose shape check: one `@`, something before it, a dotted domain after it.
pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| VenueError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = value
        .trim()
        .split_once('@')
        .ok_or_else(|| invalid("Email address must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("Email address is malformed"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("Email domain is malformed"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    let in_range = matches!(
        (value.partial_cmp(&min), value.partial_cmp(&max)),
        (Some(Ordering::Greater | Ordering::Equal), Some(Ordering::Less | Ordering::Equal))
    );
    if !in_range {
        return Err(VenueError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("llm.endpoint", "https://example.com").is_ok());
        assert!(validate_url("llm.endpoint", "http://example.com").is_ok());
        assert!(validate_url("llm.endpoint", "").is_err());
        assert!(validate_url("llm.endpoint", "invalid-url").is_err());
        assert!(validate_url("llm.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("scoring.concurrent_requests", 5, 1).is_ok());
        assert!(validate_positive_number("scoring.concurrent_requests", 0, 1).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("sender_email", "john.doe@example.com").is_ok());
        assert!(validate_email("sender_email", "john.doe").is_err());
        assert!(validate_email("sender_email", "@example.com").is_err());
        assert!(validate_email("sender_email", "a@b@example.com").is_err());
        assert!(validate_email("sender_email", "john@localhost").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("radius_km", 0.5, 0.1, 50.0).is_ok());
        assert!(validate_range("radius_km", 0.0, 0.1, 50.0).is_err());
        assert!(validate_range("min_score", 101u32, 0, 100).is_err());
        assert!(validate_range("radius_km", f64::NAN, 0.1, 50.0).is_err());
        assert!(validate_range("llm.temperature", f32::NAN, 0.0, 2.0).is_err());
        assert!(validate_range("radius_km", 50.0, 0.1, 50.0).is_ok());
    }
}
