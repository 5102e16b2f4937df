//! Core types for parley.

pub mod chat;
pub mod content;
pub mod message;
pub mod run;

pub use chat::*;
pub use content::*;
pub use message::*;
pub use run::*;
