use crate::context::ContextSnapshot;
use crate::domains::chat::{MessageRole, StoredMessage};
use crate::domains::directory::UserRole;

const BASE_PROMPT: &str = "You are a helpful assistant for an event-management platform.

IMPORTANT: You will receive the user's ACTUAL meeting schedule, travel plans, and event details in the User Context block.
ALWAYS answer from that data. DO NOT make assumptions or provide generic guidance.

When the user asks about meetings:
- Check the \"Meeting Schedule\" section in User Context.
- If it says \"NO meetings scheduled\", tell them they have no meetings.
- If meetings are listed, show the actual meeting details.

When the user asks about travel:
- Check the \"Travel Plan\" section and be specific about their arrangements.

If a section says \"data unavailable\", say so and suggest trying again later.

Always be concise, helpful, and professional. Use ONLY the data provided in User Context.";

const BUYER_PROMPT: &str = "The user is a BUYER (event participant) who can:
- Browse and connect with sellers
- Schedule meetings with sellers
- Manage their travel plans
- View event information";

const SELLER_PROMPT: &str = "The user is a SELLER (exhibitor) who can:
- View and manage meeting requests
- See buyer information
- Update their business information
- Manage their schedule";

/// Role-aware system instructions for one turn.
pub fn system_prompt(role: UserRole) -> String {
    let role_specific = match role {
        UserRole::Buyer => BUYER_PROMPT,
        UserRole::Seller => SELLER_PROMPT,
    };
    format!("{BASE_PROMPT}\n\n{role_specific}")
}

/// Renders the provider-agnostic prompt for one turn: system
/// instructions, context snapshot, trailing history, new user text.
/// Every provider receives this same flat transcript.
pub fn render(snapshot: &ContextSnapshot, history: &[StoredMessage], user_text: &str) -> String {
    let mut parts = Vec::new();
    parts.push(format!("System: {}\n", system_prompt(snapshot.role)));

    let context_block = snapshot.render();
    if !context_block.trim().is_empty() {
        parts.push(format!("User Context:\n{context_block}\n"));
    }

    for message in history {
        let speaker = match message.role {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
            MessageRole::System => continue,
        };
        parts.push(format!("{speaker}: {}", message.content));
    }

    parts.push(format!("User: {user_text}"));
    parts.push("Assistant:".to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Section;
    use crate::intent::Intent;

    fn snapshot(role: UserRole) -> ContextSnapshot {
        ContextSnapshot {
            user_id: "u1".to_string(),
            role,
            intent: Intent::Freeform,
            profile: Section::Skipped,
            event: Section::Skipped,
            meetings: Section::Skipped,
            travel: Section::Skipped,
            sellers: Section::Skipped,
        }
    }

    fn message(id: i64, role: MessageRole, content: &str) -> StoredMessage {
        StoredMessage {
            id,
            conversation_id: 1,
            role,
            content: content.to_string(),
            metadata: None,
            created_at: id,
        }
    }

    #[test]
    fn system_prompt_is_role_aware() {
        assert!(system_prompt(UserRole::Buyer).contains("BUYER"));
        assert!(system_prompt(UserRole::Seller).contains("SELLER"));
    }

    #[test]
    fn render_interleaves_history_and_ends_with_assistant_cue() {
        let history = vec![
            message(1, MessageRole::User, "hi"),
            message(2, MessageRole::Assistant, "hello"),
        ];
        let prompt = render(&snapshot(UserRole::Buyer), &history, "when is the event?");
        let hi = prompt.find("User: hi").unwrap();
        let hello = prompt.find("Assistant: hello").unwrap();
        let question = prompt.find("User: when is the event?").unwrap();
        assert!(hi < hello && hello < question);
        assert!(prompt.trim_end().ends_with("Assistant:"));
    }

    #[test]
    fn render_drops_system_history_rows() {
        let history = vec![message(1, MessageRole::System, "internal note")];
        let prompt = render(&snapshot(UserRole::Seller), &history, "hello");
        assert!(!prompt.contains("internal note"));
    }
}
