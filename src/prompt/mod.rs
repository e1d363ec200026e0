//! Assembles the cited context block and the final LLM prompt.
//!
//! Everything here is pure string formatting over already-ranked chunks; the
//! retrieval engine decides what goes in, this module only decides how it
//! reads.


use crate::constants::CONTEXT_PREVIEW_CHARS;
use crate::retrieval::ScoredChunk;

const CONTEXT_HEADER: &str = "## PDF Context Retrieved:";

/// Formats ranked chunks into a citation-annotated context block.
///
/// Each entry is prefixed by its 1-based rank, document display name, and
/// page number. Chunk text longer than [`CONTEXT_PREVIEW_CHARS`] characters
/// is truncated with an ellipsis marker; the truncation is display-only and
/// never touches the chunk itself. Empty input yields an empty string.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    if chunks.is_empty() {
        return String::new();
    }

    let mut parts = vec![CONTEXT_HEADER.to_string()];

    for (idx, scored) in chunks.iter().enumerate() {
        parts.push(format!(
            "\n[{}] {}, Page {}",
            idx + 1,
            scored.chunk.doc_name,
            scored.chunk.page
        ));
        parts.push(preview(&scored.chunk.text));
    }

    parts.join("\n")
}

/// Builds the complete prompt: instructional framing, context block, and the
/// literal user query.
///
/// The framing directs the model to cite document name and page, and to say
/// clearly when the answer is not supported by the context. With no
/// retrieved chunks the prompt is still well-formed (just context-less), so
/// the model can fall back to general knowledge.
pub fn build_prompt(query: &str, chunks: &[ScoredChunk]) -> String {
    let context = format_context(chunks);

    format!(
        "You are an AI assistant that answers questions based on provided PDF content.\n\
         Use the retrieved PDF context below to answer the user's question.\n\
         Always cite the source (PDF name, page number) when referencing the documents.\n\
         If the answer is not in the provided context, say so clearly.\n\
         \n\
         {context}\n\
         \n\
         ---\n\
         \n\
         User Question: {query}\n\
         \n\
         Please provide a detailed answer with specific citations."
    )
}

/// Truncates to the preview length on a char boundary, appending "..." only
/// when something was actually cut.
fn preview(text: &str) -> String {
    if text.chars().count() <= CONTEXT_PREVIEW_CHARS {
        return text.to_string();
    }

    let truncated: String = text.chars().take(CONTEXT_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}
