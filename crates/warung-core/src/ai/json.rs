//! Best-effort extraction of a JSON object from model output.

use serde::de::DeserializeOwned;

/// Strip markdown code-fence markers from model output.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Extract the JSON object embedded in free-form model output.
///
/// Two stages: strip code fences, then slice from the first `{` to the
/// last `}` and require a strict parse of the slice. A failed parse is an
/// extraction miss (`None`), routing the caller to its fallback path; no
/// brace-balancing heuristics are attempted.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    let cleaned = strip_code_fences(text);
    let cleaned = cleaned.trim();

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }

    serde_json::from_str(cleaned[start..=end].trim()).ok()
}
