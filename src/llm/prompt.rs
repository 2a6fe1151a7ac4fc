use crate::database::ScoredChunk;
use crate::document::Chunk;

pub const PROMPT_TEMPLATE: &str = concat!(
    "\n",
    "You are an expert research assistant. Use the provided context to answer the query. \n",
    "If unsure, state that you don't know. Be concise and factual (max 3 sentences).\n",
    "\n",
    "Query: {user_query} \n",
    "Context: {document_context} \n",
    "Answer:\n",
);

pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Renders the answer prompt for `query` over the retrieved `chunks`.
pub fn build(query: &str, chunks: &[Chunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    render(
        PROMPT_TEMPLATE,
        &[("user_query", query), ("document_context", &context)],
    )
}

pub fn build_from_results(query: &str, results: &[ScoredChunk]) -> String {
    let chunks: Vec<Chunk> = results.iter().map(|r| r.chunk.clone()).collect();
    build(query, &chunks)
}

/// Single-pass `{name}` substitution. Substituted values are never rescanned,
/// and unknown placeholders are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let replaced = after_open.find('}').and_then(|close| {
            let name = &after_open[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                out.push('{');
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}
