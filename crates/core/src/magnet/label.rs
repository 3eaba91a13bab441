use chrono::Utc;
use std::fmt;

use super::MagnetLink;

/// Maximum label length in characters.
pub const MAX_LABEL_LEN: usize = 100;

/// Maximum label length in bytes, leaving room for `.zip` under the usual
/// 255-byte file name limit.
pub const MAX_LABEL_BYTES: usize = 255 - ".zip".len();

/// Characters that are not allowed in file names on common filesystems.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Filesystem-safe name for a job, used for the download directory and archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobLabel(String);

impl JobLabel {
    /// Derives a label from the magnet's `dn` parameter.
    ///
    /// Never fails: when the display name is missing or unusable the label is
    /// `torrent_<unix-seconds>`.
    pub fn from_magnet(link: &MagnetLink) -> Self {
        link.display_name_raw()
            .and_then(decode_display_name)
            .map(|name| sanitize_filename(&name))
            .filter(|name| is_usable(name))
            .map(Self)
            .unwrap_or_else(Self::fallback)
    }

    /// Timestamp-based label.
    pub fn fallback() -> Self {
        Self(format!("torrent_{}", Utc::now().timestamp()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archive for this label.
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.0)
    }
}

impl fmt::Display for JobLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Form-style decoding: `+` is a space, then percent escapes.
fn decode_display_name(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

/// Replaces illegal characters, collapses whitespace runs into `_` and
/// truncates to [`MAX_LABEL_LEN`] characters and [`MAX_LABEL_BYTES`] bytes,
/// always on a char boundary.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if ILLEGAL_CHARS.contains(&c) || c.is_control() {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    let mut bytes = 0;
    out.chars()
        .take(MAX_LABEL_LEN)
        .take_while(|c| {
            bytes += c.len_utf8();
            bytes <= MAX_LABEL_BYTES
        })
        .collect()
}

/// `""`, `"."` and `".."` would escape or alias the download root.
fn is_usable(name: &str) -> bool {
    !name.is_empty() && !name.chars().all(|c| c == '.')
}
