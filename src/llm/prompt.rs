use clap::ValueEnum;

/// Instruction used for chat turns when the user supplies only a message.
pub const DEFAULT_CHAT_INSTRUCTION: &str =
    "Respond helpfully and conversationally to the following message.";

/// Canned writing-tool instructions selectable from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Rewrite for readability
    Readability,
    /// Rewrite for a younger audience
    GenZ,
    /// Rewrite as a professional email
    Email,
    /// Rewrite more concisely
    Concise,
    /// Grammar check with explained corrections
    Grammar,
}

impl Preset {
    pub fn instruction(self) -> &'static str {
        match self {
            Preset::Readability => {
                "Rewrite this text for better readability while maintaining its original \
                 meaning. Focus on improving sentence structure and clarity."
            }
            Preset::GenZ => {
                "Rewrite this text to make it more appealing and relatable to a younger, \
                 millennial or Gen Z audience. Use contemporary language, slang, and \
                 references that resonate with this demographic, while keeping the original \
                 message intact."
            }
            Preset::Email => {
                "Create an email to make it sound more professional and formal. Ensure the \
                 tone is respectful and the language is polished, while keeping the original \
                 message intact."
            }
            Preset::Concise => {
                "Rewrite this section to make it more concise. Remove any unnecessary words \
                 and redundant phrases, while keeping the original message intact."
            }
            Preset::Grammar => {
                "Identify any grammatical errors, suggest corrections, and explain the \
                 reasoning behind the changes. Maintain the original meaning of the sentence."
            }
        }
    }
}

/// Build a transform prompt: the instruction followed by the source text quoted
/// verbatim, so the model treats the text as the literal subject of the
/// instruction. No truncation, no escaping.
pub fn build_transform_prompt(instruction: &str, text: &str) -> String {
    format!("{instruction} \"{text}\"")
}

/// Build a chat prompt. Falls back to a generic respond-helpfully framing when
/// no explicit instruction was given.
pub fn build_chat_prompt(instruction: Option<&str>, message: &str) -> String {
    let instruction = match instruction {
        Some(i) if !i.trim().is_empty() => i,
        _ => DEFAULT_CHAT_INSTRUCTION,
    };
    build_transform_prompt(instruction, message)
}
