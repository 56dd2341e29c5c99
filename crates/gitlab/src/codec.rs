//! Base64 codec for file content crossing the API boundary.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

/// Encode file content for a commit action.
pub fn to_base64(content: &[u8]) -> String {
    STANDARD.encode(content)
}

/// Decode base64 file content as delivered by the API.
///
/// GitLab line-wraps long content, so whitespace is stripped before
/// decoding.
pub fn from_base64(content: &str) -> Result<Vec<u8>> {
    let cleaned: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(cleaned)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text() {
        let original = "---\ntitle: Hello\n---\n\nBody text with unicode: café";
        let decoded = from_base64(&to_base64(original.as_bytes())).unwrap();
        assert_eq!(decoded, original.as_bytes());
    }

    #[test]
    fn round_trips_binary() {
        let original: Vec<u8> = (0u8..=255).collect();
        let decoded = from_base64(&to_base64(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decodes_line_wrapped_content() {
        let encoded = "aGVsbG8g\nd29ybGQs\r\ndGhpcyBp\ncyB3cmFw\ncGVk";
        assert_eq!(from_base64(encoded).unwrap(), b"hello world,this is wrapped");
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(from_base64("not*base64*at*all").is_err());
    }

    #[test]
    fn empty_content_round_trips() {
        assert_eq!(to_base64(b""), "");
        assert_eq!(from_base64("").unwrap(), Vec::<u8>::new());
    }
}
