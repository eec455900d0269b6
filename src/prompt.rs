//! Prompt assembly for a single conversation turn.

/// The name the assistant goes by, used for transcript lines and the persona
/// framing.
pub const ASSISTANT_NAME: &str = "Gemini";

/// Assemble the full prompt for one turn: persona framing, transcript
/// history, the current message, then one synthetic exchange per extracted
/// image block, in attachment order.
pub fn build(
    user_name: &str,
    history: &str,
    current_message: &str,
    extracted_blocks: &[String],
) -> String {
    let mut prompt = format!(
        "The following is a chat history between {user_name} and Gemini, \
         an AI assistant. Please continue the conversation naturally. \
         Gemini always refers to itself as 'Gemini'.\n\n\
         {history}\n{user_name}: {current_message}\nGemini:\
         When you respond, don't include the phrase 'Gemini:' in your response, \
         and don't include but remember previous chat history in your message."
    );

    for text in extracted_blocks {
        prompt.push_str(&format!(
            "\n{user_name}: (sent an image)\n\
             Gemini: The following text was extracted from the image:\n{text}\n\n"
        ));
    }

    prompt
}
