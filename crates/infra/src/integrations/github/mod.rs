//! GitHub activity gateway

pub mod client;
pub(crate) mod types;

pub use client::GithubGateway;
