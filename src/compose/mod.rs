//! Commit message generation.

pub mod message;

pub use message::{
    CommitMessage, MessageComposer, MessageSource, fallback_message, format_timestamp,
};
