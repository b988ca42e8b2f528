pub mod client;
pub mod extract;
pub mod prompt;
pub mod sanitize;

pub use client::{CompletionClient, CompletionError, HttpTransport, Transport};
pub use extract::{extract_labeled, CORRECTION_LABELS};
pub use prompt::Preset;
pub use sanitize::sanitize;
