// src/core/disclosure.rs - Per-firm disclosure generation with write-once caching

use std::sync::Arc;

use super::types::{Disclosure, Firm, FirmProfile};
use crate::sources::DataSource;

/// Composes a firm's disclosure from its profile and the configured sources.
/// The result is stored in the firm's own slot, so sources run at most once
/// per firm for the lifetime of the process.
#[derive(Clone, Default)]
pub struct DisclosureProvider {
    sources: Vec<Arc<dyn DataSource>>,
}

impl DisclosureProvider {
    pub fn new(sources: Vec<Arc<dyn DataSource>>) -> Self {
        Self { sources }
    }

    /// Profile-only disclosures. No network access.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Return the firm's disclosure, composing it on first use.
    /// Concurrent first calls for one firm share a single composition.
    pub async fn generate(&self, firm: &Firm) -> Disclosure {
        firm.disclosure_slot()
            .get_or_init(|| self.compose(firm.profile()))
            .await
            .clone()
    }

    async fn compose(&self, profile: &FirmProfile) -> Disclosure {
        let mut lines = vec![base_line(&profile.name)];
        if let Some(statement) = profile.statement.as_deref().map(str::trim) {
            if !statement.is_empty() {
                lines.push(statement.to_string());
            }
        }

        let mut used = Vec::new();
        for source in &self.sources {
            match source.fetch(profile).await {
                Ok(Some(line)) if !line.trim().is_empty() => {
                    lines.push(line.trim().to_string());
                    used.push(source.name().to_string());
                }
                Ok(_) => {
                    tracing::debug!(firm = %profile.id, source = source.name(), "Source had nothing to add");
                }
                Err(e) => {
                    tracing::warn!(firm = %profile.id, source = source.name(), error = %e, "Source failed, line omitted");
                }
            }
        }

        tracing::info!(firm = %profile.id, sources = used.len(), "Disclosure composed");
        Disclosure::new(lines.join("\n"), used)
    }
}

pub fn base_line(name: &str) -> String {
    format!(
        "{name} latest ESG disclosure overview: environmental management, \
         social responsibility and corporate governance summary."
    )
}
