/// Conventional subdirectories of a character folder
pub const DEFAULT_LEAF_NAMES: &[&str] = &["Assets", "Avatars", "Audio", "Portraits"];

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Reduce a folder path to the character's root directory.
///
/// The path is trimmed. When its last segment is one of `known_leaf_names`
/// (case-sensitive) and a separator precedes it, the segment and that
/// separator are dropped. Anything else comes back trimmed but unchanged.
pub fn normalize<S: AsRef<str>>(raw: &str, known_leaf_names: &[S]) -> String {
    let trimmed = raw.trim();
    if let Some(sep) = trimmed.rfind(is_separator) {
        let leaf = &trimmed[sep + 1..];
        if sep > 0 && known_leaf_names.iter().any(|known| known.as_ref() == leaf) {
            return trimmed[..sep].to_string();
        }
    }
    trimmed.to_string()
}
