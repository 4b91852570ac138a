//! Renders retrieved items into the context block shown to the model.

use super::store::RetrievedMatch;

/// Returned instead of an empty block so the prompt still reads sensibly.
pub const NO_OPEN_ACTIONS: &str = "No open actions found for this user.";

/// One entry per match, in retrieval order.
pub fn format_context(matches: &[RetrievedMatch]) -> String {
    if matches.is_empty() {
        return NO_OPEN_ACTIONS.to_string();
    }

    matches
        .iter()
        .map(|m| {
            format!(
                "- id={}; type={}; title={}; energy={}; size={}; score={:.2}\n  text: {}",
                m.id, m.item_type, m.title, m.energy, m.size, m.score, m.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
