// src/core/ledger.rs - Per-round score and disclosure ledger
//
// Owned by the orchestrator. Scorers write through a shared reference, so the
// score table sits behind a mutex; disclosures are only written by the owner.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::{Dimension, DimensionScores, Disclosure, FirmId};

pub type DisclosureMap = BTreeMap<FirmId, Disclosure>;

#[derive(Debug, Default)]
pub struct ScoreLedger {
    scores: Mutex<BTreeMap<FirmId, DimensionScores>>,
    disclosures: DisclosureMap,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, BTreeMap<FirmId, DimensionScores>> {
        // A panicking writer cannot leave a half-written f64 behind.
        self.scores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every score and disclosure from the previous round.
    pub fn clear(&mut self) {
        self.scores
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.disclosures.clear();
    }

    pub fn submit_disclosure(&mut self, firm: FirmId, disclosure: Disclosure) {
        self.disclosures.insert(firm, disclosure);
    }

    pub fn disclosures(&self) -> &DisclosureMap {
        &self.disclosures
    }

    pub fn disclosure(&self, firm: &FirmId) -> Option<&Disclosure> {
        self.disclosures.get(firm)
    }

    /// Record one dimension score. Later writes to the same key win.
    pub fn record(&self, firm: &FirmId, dimension: Dimension, score: f64) {
        self.table()
            .entry(firm.clone())
            .or_default()
            .insert(dimension, score);
    }

    pub fn score(&self, firm: &FirmId, dimension: Dimension) -> Option<f64> {
        self.table()
            .get(firm)
            .and_then(|s| s.get(&dimension))
            .copied()
    }

    /// Snapshot of every recorded dimension for one firm.
    pub fn scores_for(&self, firm: &FirmId) -> DimensionScores {
        self.table().get(firm).cloned().unwrap_or_default()
    }

    /// Fill every missing (firm, dimension) pair with `neutral`.
    /// Returns how many entries were added.
    pub fn backfill<'a>(
        &self,
        firms: impl IntoIterator<Item = &'a FirmId>,
        dimensions: &[Dimension],
        neutral: f64,
    ) -> usize {
        let mut table = self.table();
        let mut added = 0;
        for firm in firms {
            let entry = table.entry(firm.clone()).or_default();
            for dimension in dimensions {
                if !entry.contains_key(dimension) {
                    entry.insert(*dimension, neutral);
                    added += 1;
                }
            }
        }
        added
    }

    /// Number of firms with at least one score.
    pub fn scored_firms(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.disclosures.is_empty() && self.table().is_empty()
    }
}
