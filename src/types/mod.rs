//! # Types Module
//!
//! Core request and response types shared by the wrapper, the cache, and the transport.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Prompt`] | Text prompt or chat conversation |
//! | [`Message`] | Chat message with role and content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//! | [`RawResponse`] | Provider response: usage counters and choices |
//!
//! ## Example
//!
//! ```rust
//! use gptinference::types::{Message, Prompt};
//!
//! let single = Prompt::text("\nTell me fun things to do in San Francisco.");
//! let chat = Prompt::conversation(vec![
//!     Message::system("You are an expert travel guide."),
//!     Message::user("Tell me fun things to do in San Francisco."),
//! ]);
//! assert_eq!(single.canonical(), "Tell me fun things to do in San Francisco.");
//! assert!(chat.canonical().starts_with("[{\"role\":\"system\""));
//! ```

pub mod message;
pub mod response;

pub use message::{Message, MessageRole, Prompt};
pub use response::{Choice, ChoiceMessage, RawResponse, Usage};
