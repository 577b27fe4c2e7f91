//! Prompt template for legal question answering
//!
//! Every turn sends the model one prompt built from a fixed instruction
//! preamble, the retrieved context, the recent chat history and the
//! user's question. Inputs are substituted as-is.

/// Instruction block that opens every prompt
pub const LEGAL_PREAMBLE: &str = "<s>[INST] This is a chat template. As a legal chatbot specializing in Indian Penal Code queries, \n\
your objective is to provide accurate and concise information based on the user's questions. Do not generate \n\
your own questions and answers. You will strictly follow instructions, using only relevant legal context. \n\
Avoid unnecessary details. If a question falls outside the given context, you will use your own knowledge base. \n\
Do not ask additional questions. Your responses should be professional, precise, and compliant with the Indian Penal Code.\n";

/// Marker closing the prompt
const PROMPT_SUFFIX: &str = "</s>[INST]\n";

/// Separator placed between retrieved context chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Builds the prompt sent to the completion endpoint
///
/// # Arguments
///
/// * `context_chunks` - Retrieved passages, most relevant first
/// * `chat_history` - Rendered recent exchanges, possibly empty
/// * `question` - The user's current question
///
/// # Examples
///
/// ```
/// use lawaid::prompts::{compose, LEGAL_PREAMBLE};
///
/// let prompt = compose(&["Section 378 defines theft."], "", "What is theft?");
/// assert!(prompt.starts_with(LEGAL_PREAMBLE));
/// assert!(prompt.contains("CONTEXT: Section 378 defines theft.\n"));
/// assert!(prompt.contains("QUESTION: What is theft?\n"));
/// ```
pub fn compose<S: AsRef<str>>(context_chunks: &[S], chat_history: &str, question: &str) -> String {
    let context = context_chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    format!(
        "{preamble}\nCONTEXT: {context}\nCHAT HISTORY: {history}\nQUESTION: {question}\nANSWER:\n{suffix}",
        preamble = LEGAL_PREAMBLE,
        context = context,
        history = chat_history,
        question = question,
        suffix = PROMPT_SUFFIX,
    )
}
