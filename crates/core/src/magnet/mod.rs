//! Magnet link validation and job label derivation.

mod label;

pub use label::{JobLabel, MAX_LABEL_BYTES, MAX_LABEL_LEN};

use std::fmt;
use thiserror::Error;

/// URI scheme prefix every magnet link starts with.
pub const MAGNET_PREFIX: &str = "magnet:";

/// Errors produced while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MagnetError {
    /// Input does not start with the magnet scheme.
    #[error("Invalid magnet link: expected a URI starting with \"magnet:\"")]
    InvalidScheme,
}

/// A magnet URI that passed the prefix check.
///
/// Nothing beyond the scheme is validated; the download engine is the
/// authority on whether the rest of the link makes sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink(String);

impl MagnetLink {
    /// Validates raw user input, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, MagnetError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with(MAGNET_PREFIX) {
            return Err(MagnetError::InvalidScheme);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The full URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the `key=value` pairs after `magnet:?`, undecoded.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        let query = self.0[MAGNET_PREFIX.len()..].trim_start_matches('?');
        query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Raw (still percent-encoded) value of the first `dn` parameter.
    pub fn display_name_raw(&self) -> Option<&str> {
        self.params()
            .find(|(key, _)| *key == "dn")
            .map(|(_, value)| value)
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MagnetLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_magnet_prefix() {
        let link = MagnetLink::parse("magnet:?xt=urn:btih:ABC").unwrap();
        assert_eq!(link.as_str(), "magnet:?xt=urn:btih:ABC");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let link = MagnetLink::parse("  magnet:?xt=urn:btih:ABC\n").unwrap();
        assert_eq!(link.as_str(), "magnet:?xt=urn:btih:ABC");
    }

    #[test]
    fn test_parse_rejects_other_input() {
        for raw in [
            "not-a-magnet",
            "",
            "   ",
            "http://example.com/file.torrent",
            "Magnet:?xt=urn:btih:ABC",
            "xmagnet:?xt=urn:btih:ABC",
        ] {
            assert_eq!(
                MagnetLink::parse(raw),
                Err(MagnetError::InvalidScheme),
                "accepted {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_params() {
        let link = MagnetLink::parse("magnet:?xt=urn:btih:ABC&dn=Name&tr=udp%3A%2F%2Ft&flag").unwrap();
        let params: Vec<_> = link.params().collect();
        assert_eq!(
            params,
            vec![
                ("xt", "urn:btih:ABC"),
                ("dn", "Name"),
                ("tr", "udp%3A%2F%2Ft"),
                ("flag", ""),
            ]
        );
    }

    #[test]
    fn test_display_name_raw_requires_exact_key() {
        let link = MagnetLink::parse("magnet:?xt=urn:btih:ABC&xdn=Wrong").unwrap();
        assert_eq!(link.display_name_raw(), None);

        let link = MagnetLink::parse("magnet:?dn=First&dn=Second").unwrap();
        assert_eq!(link.display_name_raw(), Some("First"));
    }
}
