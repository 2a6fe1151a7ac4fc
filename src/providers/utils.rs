/// Splits a `<think>...</think>` block off a reasoning model's completion.
/// Returns the visible answer and the reasoning text, if any.
pub fn split_reasoning(raw: &str) -> (String, Option<String>) {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let Some(start) = raw.find(OPEN) else {
        return (raw.trim().to_string(), None);
    };
    let after_open = start + OPEN.len();

    match raw[after_open..].find(CLOSE) {
        Some(rel_end) => {
            let reasoning = raw[after_open..after_open + rel_end].trim().to_string();
            let answer = format!("{}{}", &raw[..start], &raw[after_open + rel_end + CLOSE.len()..]);
            let reasoning = (!reasoning.is_empty()).then_some(reasoning);
            (answer.trim().to_string(), reasoning)
        }
        // Unterminated block: the model ran out of tokens while thinking.
        None => {
            let reasoning = raw[after_open..].trim().to_string();
            (raw[..start].trim().to_string(), (!reasoning.is_empty()).then_some(reasoning))
        }
    }
}
