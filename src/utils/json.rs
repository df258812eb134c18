//! JSON extraction helper for generative-model output.
//!
//! Advisor responses frequently wrap the requested JSON object in prose or
//! code fences. Slicing from the first `{` to the last `}` recovers the
//! object in either case.

/// Extract the substring between the first `{` and the last `}`.
/// Returns `None` when no balanced-looking block exists.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
