//! Attribution recorder — persists computed results as immutable records.
//!
//! The parent record embeds its per-touchpoint children, so a single store
//! insert is atomic: either the whole result is recorded or nothing is.
//! Re-submitting the same (customer, conversion, model) key is rejected as a
//! duplicate rather than overwritten; analytics relies on records never
//! changing after creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use attribution_core::error::{AttributionError, EngineResult};
use attribution_core::types::RevenueAttribution;

/// Persistence seam for attribution records. Production implementations sit
/// on whatever storage the host owns; `MemoryAttributionStore` backs tests
/// and embedded use.
pub trait AttributionStore: Send + Sync {
    /// Insert a record. Must be atomic and must fail on a duplicate
    /// idempotency key.
    fn insert(&self, record: RevenueAttribution) -> EngineResult<Uuid>;

    fn get(&self, id: &Uuid) -> Option<RevenueAttribution>;

    fn contains_key(&self, idempotency_key: &str) -> bool;

    /// All records whose conversion date falls inside [start, end].
    fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<RevenueAttribution>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DashMap-backed store.
#[derive(Default)]
pub struct MemoryAttributionStore {
    records: DashMap<Uuid, RevenueAttribution>,
    keys: DashMap<String, Uuid>,
}

impl MemoryAttributionStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            keys: DashMap::new(),
        }
    }
}

impl AttributionStore for MemoryAttributionStore {
    fn insert(&self, record: RevenueAttribution) -> EngineResult<Uuid> {
        let key = record.idempotency_key();
        let id = record.id;
        // Entry claim first: two concurrent inserts of the same key race on
        // the key map, only one wins.
        match self.keys.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(AttributionError::DuplicateAttribution {
                    conversion_id: record.conversion_id.clone(),
                    model: record.model_key.clone(),
                })
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(id);
                self.records.insert(id, record);
                Ok(id)
            }
        }
    }

    fn get(&self, id: &Uuid) -> Option<RevenueAttribution> {
        self.records.get(id).map(|r| r.clone())
    }

    fn contains_key(&self, idempotency_key: &str) -> bool {
        self.keys.contains_key(idempotency_key)
    }

    fn records_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<RevenueAttribution> {
        self.records
            .iter()
            .filter(|r| r.conversion_date >= start && r.conversion_date <= end)
            .map(|r| r.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Thin wrapper that owns the duplicate check and logging around the store.
#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn AttributionStore>,
}

impl Recorder {
    pub fn new(store: Arc<dyn AttributionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn AttributionStore> {
        Arc::clone(&self.store)
    }

    /// Record a computed attribution. Returns the parent record id.
    pub fn record(&self, record: RevenueAttribution) -> EngineResult<Uuid> {
        let key = record.idempotency_key();
        if self.store.contains_key(&key) {
            debug!(key = %key, "duplicate attribution rejected before insert");
            return Err(AttributionError::DuplicateAttribution {
                conversion_id: record.conversion_id,
                model: record.model_key,
            });
        }

        let conversion_id = record.conversion_id.clone();
        let model_key = record.model_key.clone();
        let touchpoints = record.touchpoint_attributions.len();
        let id = self.store.insert(record)?;
        info!(
            attribution_id = %id,
            conversion_id = %conversion_id,
            model = %model_key,
            touchpoints,
            "attribution recorded"
        );
        Ok(id)
    }
}
