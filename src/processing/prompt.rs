//! Prompt assembly for context-constrained answering.
//!
//! The instruction header and the refusal phrase are semantic contracts: the
//! model must answer only from the retrieved context and must emit the fixed
//! refusal when the context does not contain the answer.

/// Answer returned when the index has no entries for the query.
pub(crate) const NO_RESULTS_ANSWER: &str =
    "There are no results in the index. Ingest some PDFs first.";

/// Refusal phrase the model is instructed to emit for out-of-context questions.
pub(crate) const REFUSAL_PHRASE: &str = "I don't have that information in the corpus";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Assemble the generation prompt from the retrieved chunk texts.
pub(crate) fn build_prompt(question: &str, contexts: &[String]) -> String {
    let context = contexts.join(CONTEXT_SEPARATOR);
    format!(
        "You are an assistant that answers EXCLUSIVELY from the information in the context.\n\
         If something is not in the context, reply: \"{REFUSAL_PHRASE}\".\n\
         \n\
         === CONTEXT ===\n\
         {context}\n\
         \n\
         === QUESTION ===\n\
         {question}\n\
         \n\
         Answer clearly and concisely."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_context_question_and_refusal() {
        let prompt = build_prompt(
            "What is the warranty period?",
            &["chunk one".into(), "chunk two".into()],
        );

        assert!(prompt.contains("EXCLUSIVELY"));
        assert!(prompt.contains(REFUSAL_PHRASE));
        assert!(prompt.contains("=== CONTEXT ==="));
        assert!(prompt.contains("chunk one\n\n---\n\nchunk two"));
        assert!(prompt.contains("=== QUESTION ===\nWhat is the warranty period?"));
    }

    #[test]
    fn single_chunk_has_no_separator() {
        let prompt = build_prompt("q", &["only".into()]);
        assert!(!prompt.contains("---\n\nonly\n\n---"));
        assert!(prompt.contains("only"));
    }
}
