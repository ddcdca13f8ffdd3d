// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collision-resistant filename derivation for downloaded attachments.
//!
//! Names follow `{unix_millis}_{suffix}.{ext}`: the timestamp plus the tail
//! of the contact identifier keeps concurrent downloads for different
//! contacts from colliding, and the extension comes from the declared MIME
//! type so the stored file stays openable.

use chrono::Utc;

/// Extensions for the media types the channel actually delivers. Looked up
/// before falling back to the mime database, which orders alternatives
/// alphabetically (`image/jpeg` would otherwise map to `jpe`).
const COMMON_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("audio/ogg", "ogg"),
    ("audio/ogg; codecs=opus", "ogg"),
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "m4a"),
    ("video/mp4", "mp4"),
    ("application/pdf", "pdf"),
];

/// Maps a declared MIME type to a file extension, defaulting to `bin` for
/// unknown or empty types.
pub fn extension_for_mime(mime_type: &str) -> &str {
    let normalized = mime_type.trim();
    if normalized.is_empty() {
        return "bin";
    }
    if let Some((_, ext)) = COMMON_EXTENSIONS
        .iter()
        .find(|(m, _)| normalized.eq_ignore_ascii_case(m))
    {
        return ext;
    }
    // Parameters like `; codecs=opus` are not part of the registered type.
    let essence = normalized.split(';').next().unwrap_or(normalized).trim();
    mime_guess::get_mime_extensions_str(essence)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin")
}

/// Derives a stable, collision-resistant filename for an attachment from
/// the given contact. The suffix is the last four characters of the contact
/// identifier.
pub fn derive_filename(contact_id: &str, mime_type: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = contact_id
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{millis}_{suffix}.{}", extension_for_mime(mime_type))
}
