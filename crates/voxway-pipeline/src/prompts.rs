//! Static catalog of base prompts for the AI stage.
//!
//! A request may override the system prompt with `base_prompt`; when it
//! does not, the catalog default applies. Served verbatim by the
//! `get_base_prompts` tool.

/// One catalog entry.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BasePrompt {
    pub id: &'static str,
    pub name: &'static str,
    pub prompt: &'static str,
}

const CATALOG: &[BasePrompt] = &[
    BasePrompt {
        id: "assistant",
        name: "Voice assistant",
        prompt: "You are a helpful voice assistant. The user's message was \
                 transcribed from speech, so minor transcription errors are \
                 possible. Answer concisely in a natural spoken register; \
                 your reply will be read aloud.",
    },
    BasePrompt {
        id: "concise",
        name: "Concise answers",
        prompt: "Answer in at most two short sentences suitable for being \
                 read aloud. Skip preamble and caveats unless safety \
                 requires them.",
    },
    BasePrompt {
        id: "translator",
        name: "Speech translator",
        prompt: "Translate the user's transcribed speech into English. Reply \
                 with the translation only, phrased naturally for speech \
                 synthesis.",
    },
];

/// The full catalog, in display order.
pub fn catalog() -> &'static [BasePrompt] {
    CATALOG
}

/// The prompt applied when a request carries no override.
pub fn default_prompt() -> &'static BasePrompt {
    &CATALOG[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_non_empty_with_unique_ids() {
        let entries = catalog();
        assert!(!entries.is_empty());
        let mut ids: Vec<_> = entries.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), entries.len(), "prompt ids must be unique");
    }

    #[test]
    fn default_prompt_is_the_assistant_entry() {
        assert_eq!(default_prompt().id, "assistant");
    }
}
