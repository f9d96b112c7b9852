use std::sync::{Arc, RwLock};

use crate::search::catalog::SearchableRecord;
use crate::search::matcher::{search_with_policy, AggregationPolicy, DEFAULT_RESULT_CAP};

/// Proof that a catalog refresh was started. Only the most recent ticket
/// may install records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

#[derive(Default)]
struct Catalog {
    /// Last ticket handed out.
    latest: u64,
    records: Arc<Vec<SearchableRecord>>,
}

/// The record set behind one search surface.
///
/// The catalog is refreshed when the surface opens and reused for every
/// keystroke. Refreshes are sequenced: a fetch that resolves after a newer
/// one was started is discarded. Tickets are issued and checked under the
/// same lock as the records they guard.
pub struct SearchSession {
    catalog: RwLock<Catalog>,
    cap: usize,
    policy: AggregationPolicy,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_CAP, AggregationPolicy::default())
    }
}

impl SearchSession {
    pub fn new(cap: usize, policy: AggregationPolicy) -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            cap,
            policy,
        }
    }

    /// Start a refresh. Any earlier outstanding ticket becomes stale.
    pub fn begin_refresh(&self) -> RefreshTicket {
        let mut catalog = self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        catalog.latest += 1;
        RefreshTicket(catalog.latest)
    }

    /// Whether `ticket` is still the most recent refresh.
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.catalog
            .read()
            .map(|catalog| catalog.latest == ticket.0)
            .unwrap_or(false)
    }

    /// Install `records` if `ticket` is still the latest refresh.
    ///
    /// Returns `false` when the result is stale and was dropped.
    pub fn complete_refresh(&self, ticket: RefreshTicket, records: Vec<SearchableRecord>) -> bool {
        let Ok(mut catalog) = self.catalog.write() else {
            return false;
        };
        if ticket.0 != catalog.latest {
            tracing::debug!(ticket = ticket.0, "Dropping stale search catalog");
            return false;
        }
        catalog.records = Arc::new(records);
        true
    }

    /// Current cached record set.
    pub fn records(&self) -> Arc<Vec<SearchableRecord>> {
        self.catalog
            .read()
            .map(|catalog| Arc::clone(&catalog.records))
            .unwrap_or_default()
    }

    /// Filter the cached records. No backend access.
    pub fn search(&self, query: &str) -> Vec<SearchableRecord> {
        search_with_policy(&self.records(), query, self.cap, self.policy)
    }
}
