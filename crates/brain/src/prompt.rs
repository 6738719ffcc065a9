use crate::Message;

pub const SYSTEM_PROMPT: &str = "You are an assistant that only outputs valid JSON for LINE Flex Messages. Respond with a single JSON object. Never include explanations or code fences.";

pub const DEFAULT_INSTRUCTION: &str = "Create one recommended Flex Message for the user.";

const IMPROVE_PREAMBLE: &str = "Improve or extend the following existing Flex Message JSON. You may adjust buttons, text, images and so on as needed, but return JSON that conforms to the LINE Messaging API Flex Message specification.";

/// System + user messages for one generation request.
pub fn build_messages(prompt: &str, base_template: Option<&serde_json::Value>) -> Vec<Message> {
    let trimmed = prompt.trim();
    let instruction = if trimmed.is_empty() { DEFAULT_INSTRUCTION } else { trimmed };

    let base = base_template.and_then(|t| serde_json::to_string_pretty(t).ok());

    let mut sections: Vec<String> = Vec::new();
    match base {
        Some(base) => {
            sections.push(IMPROVE_PREAMBLE.to_string());
            sections.push(base);
            sections.push("Improvement request:".to_string());
        }
        None => sections.push("Create a Flex Message with the following requirements:".to_string()),
    }
    sections.push(instruction.to_string());

    vec![Message::system(SYSTEM_PROMPT), Message::user(sections.join("\n\n"))]
}
