use std::collections::HashSet;

const ARXIV_PREFIX: &str = "arxiv:";

/// Canonical form of a paper identifier.
///
/// Rules, applied in order:
/// 1. trim surrounding whitespace and lowercase
/// 2. strip a leading `arxiv:` prefix
/// 3. strip a trailing version suffix `v<digits>` (`2401.01234v2` -> `2401.01234`)
///
/// The version suffix is only stripped when something precedes it, so an id that is
/// literally `v2` is left alone.
pub fn normalize_paper_id(id: &str) -> String {
    let lowered = id.trim().to_lowercase();
    let without_prefix = lowered.strip_prefix(ARXIV_PREFIX).unwrap_or(&lowered);
    strip_version_suffix(without_prefix).trim().to_string()
}

fn strip_version_suffix(id: &str) -> &str {
    let digits = id.bytes().rev().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return id;
    }

    let head = &id[..id.len() - digits];
    match head.strip_suffix('v') {
        Some(base) if !base.is_empty() => base,
        _ => id,
    }
}

/// Normalizes every id in `ids` into a set. Empty ids are skipped.
pub fn normalized_set<I, S>(ids: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| normalize_paper_id(id.as_ref()))
        .filter(|id| !id.is_empty())
        .collect()
}
