use super::types::SentenceDetail;

/// Prefix of `details` up to, not including, the first unsupported sentence.
///
/// An unsupported first sentence yields an empty slice: later sentences may build on
/// the unsupported claim.
pub fn truncate(details: &[SentenceDetail]) -> &[SentenceDetail] {
    let cut = details
        .iter()
        .position(|d| !d.is_supported())
        .unwrap_or(details.len());
    &details[..cut]
}

/// Joins sentence texts with a single space.
pub fn reconstruct(details: &[SentenceDetail]) -> String {
    details
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
