//! External provider integrations

pub mod github;
pub mod openai;
