//! Naming policy: sanitization, validation and unique-name resolution.
//!
//! Names are validated before any persistence attempt. Uniqueness is resolved
//! against the sibling scope (the set of existing names at the same parent
//! and room), which the repositories compute with a fresh read immediately
//! before calling [`resolve_unique_name`].

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Characters that may never appear in an entity name.
pub const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of an entity name in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// The kind of entity a name belongs to. Selects the noun used in
/// validation error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// A file name.
    File,
    /// A folder name.
    Folder,
    /// A room name.
    Room,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::File => write!(f, "file"),
            NameKind::Folder => write!(f, "folder"),
            NameKind::Room => write!(f, "room"),
        }
    }
}

/// Reasons a name can be rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// The name is blank after trimming.
    #[error("{0} name cannot be empty")]
    Empty(NameKind),
    /// The name exceeds [`MAX_NAME_LENGTH`] characters.
    #[error("{0} name is too long (max 255 characters)")]
    TooLong(NameKind),
    /// The name still contains a forbidden character.
    #[error("{0} name contains invalid characters")]
    InvalidCharacters(NameKind),
}

/// Strip forbidden characters and surrounding whitespace from an untrusted
/// name. Pure and total; may return an empty string when nothing salvageable
/// remains.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Validate a name for the given entity kind.
///
/// Checks the forbidden character set again even though callers sanitize
/// first, so a repository can never persist an invalid name.
pub fn validate_name(name: &str, kind: NameKind) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty(kind));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong(kind));
    }
    if name.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Err(NameError::InvalidCharacters(kind));
    }
    Ok(())
}

/// Resolve a candidate name against the sibling scope.
///
/// Returns the candidate unchanged when it is absent from the scope.
/// Otherwise splits it into base and extension on the last dot and appends
/// the lowest free counter as `"{base} ({n}){ext}"`. Terminates for any
/// finite scope.
pub fn resolve_unique_name(candidate: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(candidate) {
        return candidate.to_string();
    }

    let (base, ext) = split_extension(candidate);
    let mut counter: u64 = 1;
    loop {
        let attempt = format!("{base} ({counter}){ext}");
        if !existing.contains(&attempt) {
            return attempt;
        }
        counter += 1;
    }
}

/// Split a name into (base, extension) on the last dot. The extension keeps
/// its leading dot; a trailing dot or no dot at all yields an empty
/// extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}
