//! Credential encryption

pub mod vault;

pub use vault::CredentialVault;
