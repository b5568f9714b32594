//! Surface Intents
//!
//! The complete set of things a UI surface can ask the core to do. Surfaces
//! are dumb renderers: they report what the user did and let the
//! [`ViewStateMachine`](crate::view::ViewStateMachine) decide what it means.

use serde::{Deserialize, Serialize};

use crate::catalog::FigureId;

/// Intent from UI surface to the view state machine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Replace the browse search text
    SetSearchQuery(String),
    /// Replace the browse category (`"All"` clears it)
    SetCategory(String),
    /// Open a conversation with a figure
    SelectEntity(FigureId),
    /// Send a message in the active conversation
    SendMessage(String),
    /// Leave the conversation and return to browsing
    Back,
}

impl Intent {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSearchQuery(_) => "set_search_query",
            Self::SetCategory(_) => "set_category",
            Self::SelectEntity(_) => "select_entity",
            Self::SendMessage(_) => "send_message",
            Self::Back => "back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_names() {
        assert_eq!(Intent::Back.name(), "back");
        assert_eq!(Intent::SelectEntity(FigureId(3)).name(), "select_entity");
        assert_eq!(Intent::SendMessage("hi".into()).name(), "send_message");
    }

    #[test]
    fn test_intent_serde() {
        let intent = Intent::SelectEntity(FigureId(6));
        let json = serde_json::to_string(&intent).unwrap();
        assert_eq!(json, r#"{"SelectEntity":6}"#);
        let parsed: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, intent);
    }
}
