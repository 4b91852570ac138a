use crate::llm::ChatMessage;

const SYSTEM_PROMPT: &str = "You are Traction Coach, an expert planner helping users choose their highest-leverage actions.";

/// Builds the message sequence for a suggestion request.
///
/// `max_items` is an instruction to the model only; the engine truncates afterwards.
pub fn render_prompt(context: &str, question: &str, max_items: usize) -> Vec<ChatMessage> {
    let user = format!(
        "Context items:\n{context}\n\n\
         Question: {question}\n\n\
         Return up to {max_items} recommended actions as a single JSON object with shape:\n\
         {{\"items\": [{{\"itemId\": \"...\", \"reason\": \"...\", \"score\": 0.9}}]}}\n\
         Only reference item ids that appear in the context list. \
         If the context list has no items, return {{\"items\": []}}.\n\
         Respond with the JSON object only."
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}
