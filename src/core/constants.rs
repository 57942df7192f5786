//! Fixed strings shown to the user by the chat session.

/// First entry of every transcript, restored on reset.
pub const WELCOME_MESSAGE: &str = "Hello! I'm Lumon, your botanical assistant. Ask me anything about plant care, or send a photo and I'll try to identify it.";

/// Shown when the server answered a chat message with an error.
pub const CHAT_APOLOGY: &str =
    "Sorry, I couldn't come up with an answer just now. Please try again.";

/// Shown when the server could not be reached at all.
pub const CONNECTION_APOLOGY: &str =
    "Sorry, I'm having trouble connecting to the server. Please check your connection and try again.";

/// Shown when identification failed without a server explanation.
pub const IDENTIFY_APOLOGY: &str =
    "Sorry, I couldn't identify that plant. Please try again with a clearer photo.";

/// Apology for a failed identification that quotes the server's reason.
pub fn identify_failure_message(reason: &str) -> String {
    let reason = reason.trim();
    if reason.is_empty() {
        IDENTIFY_APOLOGY.to_string()
    } else {
        format!("Sorry, I couldn't identify that plant: {reason}")
    }
}
