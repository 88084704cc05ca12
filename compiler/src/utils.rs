/// Render `text` as a JSON string literal, which escapes newlines and quotes
/// the same way diagnostics show them.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}
