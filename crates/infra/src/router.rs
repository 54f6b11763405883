//! Client-to-repository routing backed by configuration.
//!
//! A thin mapping of client identifier to the repositories of interest; an
//! unknown client yields `None`, which downstream code treats as "no
//! filtering".

use std::collections::HashMap;
use std::path::Path;

use kintai_core::RepoRouter;
use kintai_domain::{KintaiError, Result};

/// `RepoRouter` implementation over a static config map.
#[derive(Debug, Clone, Default)]
pub struct ConfigRepoRouter {
    routes: HashMap<String, Vec<String>>,
}

impl ConfigRepoRouter {
    pub fn new(routes: HashMap<String, Vec<String>>) -> Self {
        Self { routes }
    }

    /// Load routes from a TOML file shaped as `client_id = ["owner/repo"]`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| KintaiError::Config(format!("failed to read routes file: {e}")))?;
        let routes: HashMap<String, Vec<String>> = toml::from_str(&contents)
            .map_err(|e| KintaiError::Config(format!("invalid routes file: {e}")))?;
        Ok(Self { routes })
    }
}

impl RepoRouter for ConfigRepoRouter {
    fn repos_for(&self, client_id: &str) -> Option<Vec<String>> {
        self.routes.get(client_id).cloned()
    }
}
