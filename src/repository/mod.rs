// src/repository/mod.rs

//! Configured package repositories and lookup by user-supplied tag.
//!
//! The request parser consults a [`RepositoryRegistry`] whenever an
//! argument carries a `repo:` prefix. A tag matches a repository by its
//! 1-based position number, alias, name, or URI — the same forms users
//! may pass to repository management commands.
//!
//! Registries are built programmatically or loaded from a TOML file:
//!
//! ```toml
//! [[repository]]
//! alias = "non-oss"
//! name = "Non-OSS Packages"
//! url = "https://download.example.com/non-oss"
//! enabled = true
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// One configured package source.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Short unique handle, e.g. "non-oss".
    pub alias: String,
    /// Human-readable name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Base location of the repository.
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Repository {
    pub fn new(alias: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            name: String::new(),
            url: url.into(),
            enabled: true,
        }
    }
}

/// The ordered set of configured repositories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryRegistry {
    #[serde(default, rename = "repository")]
    repositories: Vec<Repository>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load repository definitions from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let registry: RepositoryRegistry = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        for repo in &registry.repositories {
            if let Err(e) = Url::parse(&repo.url) {
                return Err(Error::Config(format!(
                    "{}: repository '{}' has an invalid URL '{}': {}",
                    path.display(),
                    repo.alias,
                    repo.url,
                    e
                )));
            }
        }
        debug!(
            "loaded {} repositories from {}",
            registry.repositories.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn add(&mut self, repository: Repository) {
        self.repositories.push(repository);
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Match a user-supplied tag by number, alias, name, or URI.
    ///
    /// Numbers are 1-based list positions. URI candidates are compared
    /// as parsed URLs so that trivial spelling differences do not defeat
    /// the match; a candidate that is not a valid URL simply does not
    /// match that way.
    pub fn resolve(&self, candidate: &str) -> Option<&Repository> {
        if let Ok(number) = candidate.parse::<usize>() {
            if (1..=self.repositories.len()).contains(&number) {
                return Some(&self.repositories[number - 1]);
            }
        }

        if let Some(repo) = self
            .repositories
            .iter()
            .find(|r| r.alias == candidate || (!r.name.is_empty() && r.name == candidate))
        {
            return Some(repo);
        }

        let candidate_url = Url::parse(candidate).ok()?;
        self.repositories
            .iter()
            .find(|r| Url::parse(&r.url).is_ok_and(|u| u == candidate_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RepositoryRegistry {
        let mut registry = RepositoryRegistry::new();
        let mut main = Repository::new("main", "https://download.example.com/main");
        main.name = "Main Packages".to_string();
        registry.add(main);
        registry.add(Repository::new(
            "non-oss",
            "https://download.example.com/non-oss",
        ));
        registry
    }

    #[test]
    fn test_resolve_by_alias() {
        let registry = registry();
        assert_eq!(registry.resolve("non-oss").unwrap().alias, "non-oss");
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = registry();
        assert_eq!(registry.resolve("Main Packages").unwrap().alias, "main");
    }

    #[test]
    fn test_resolve_by_number() {
        let registry = registry();
        assert_eq!(registry.resolve("1").unwrap().alias, "main");
        assert_eq!(registry.resolve("2").unwrap().alias, "non-oss");
        assert!(registry.resolve("3").is_none());
        assert!(registry.resolve("0").is_none());
    }

    #[test]
    fn test_resolve_by_uri() {
        let registry = registry();
        let repo = registry
            .resolve("https://download.example.com/non-oss")
            .unwrap();
        assert_eq!(repo.alias, "non-oss");
    }

    #[test]
    fn test_unknown_candidate() {
        let registry = registry();
        assert!(registry.resolve("packman").is_none());
        // not a URL, not an alias; must not error
        assert!(registry.resolve("perl-devel").is_none());
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.toml");
        std::fs::write(
            &path,
            r#"
[[repository]]
alias = "main"
name = "Main Packages"
url = "https://download.example.com/main"

[[repository]]
alias = "updates"
url = "https://download.example.com/updates"
enabled = false
"#,
        )
        .unwrap();

        let registry = RepositoryRegistry::load(&path).unwrap();
        assert_eq!(registry.repositories().len(), 2);
        assert!(registry.repositories()[0].enabled);
        assert!(!registry.repositories()[1].enabled);
        assert_eq!(registry.resolve("updates").unwrap().alias, "updates");
    }

    #[test]
    fn test_load_rejects_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.toml");
        std::fs::write(
            &path,
            r#"
[[repository]]
alias = "broken"
url = "not a url"
"#,
        )
        .unwrap();

        assert!(RepositoryRegistry::load(&path).is_err());
    }
}
