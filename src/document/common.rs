//! Filename helpers shared by the assemblers and the download route.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const FILE_EXTENSION: &str = "pdf";
pub const MAX_NAME_PART: usize = 40;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

/// Reduce a user-supplied string to a safe ASCII filename component.
///
/// The name is NFKD-decomposed and folded to ASCII first, so accented
/// letters keep their base letter. Path separators count as whitespace,
/// whitespace runs become a single `_`, anything outside `[A-Za-z0-9_.-]` is
/// dropped, and leading/trailing `.` and `_` are stripped. May return an
/// empty string.
pub fn secure_filename(name: &str) -> String {
    let folded: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = folded.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");
    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn name_part(value: &str, fallback: &str) -> String {
    let safe = secure_filename(value);
    let safe = if safe.is_empty() { fallback.to_string() } else { safe };
    safe.chars().take(MAX_NAME_PART).collect()
}

/// `proposal_{client}_{project}_{id}.pdf` with each name part capped at
/// [`MAX_NAME_PART`] characters.
pub fn suggested_filename(client_name: &str, project: &str, id: &Uuid) -> String {
    format!(
        "proposal_{}_{}_{}.{}",
        name_part(client_name, "client"),
        name_part(project, "project"),
        id.simple(),
        FILE_EXTENSION
    )
}
