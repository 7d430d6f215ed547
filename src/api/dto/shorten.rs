//! DTOs for the shorten endpoint.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Absolute URL to shorten. Stored byte-for-byte as given.
    #[validate(length(max = 2048, message = "URL is too long"))]
    #[validate(url(message = "Invalid URL format"))]
    #[validate(custom(function = "no_control_characters"))]
    pub long_url: String,
}

/// Rejects tabs, line breaks and other ASCII controls; `url` parsing strips
/// them, but the stored value must fit in a `Location` header.
fn no_control_characters(long_url: &str) -> Result<(), ValidationError> {
    if long_url.chars().any(|c| c.is_ascii_control()) {
        let mut err = ValidationError::new("control_characters");
        err.message = Some("URL must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_url_passes() {
        let req = ShortenRequest {
            long_url: "https://example.com/a?b=c".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_invalid_urls_rejected() {
        for long_url in ["", "example.com", "not a url"] {
            let req = ShortenRequest {
                long_url: long_url.to_string(),
            };
            assert!(req.validate().is_err(), "{long_url:?} should be rejected");
        }
    }

    #[test]
    fn test_control_characters_rejected() {
        for long_url in [
            "https://example.com/a\r\nb",
            "https://example.com/a\tb",
            "https://example.com/\u{7f}",
        ] {
            let req = ShortenRequest {
                long_url: long_url.to_string(),
            };
            let errors = req.validate().unwrap_err();
            assert!(
                errors.field_errors()["long_url"]
                    .iter()
                    .any(|e| e.code == "control_characters"),
                "{long_url:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_ascii_url_passes() {
        let req = ShortenRequest {
            long_url: "https://example.com/caf\u{e9}".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_url_rejected() {
        let req = ShortenRequest {
            long_url: format!("https://example.com/{}", "a".repeat(2048)),
        };
        assert!(req.validate().is_err());
    }
}
