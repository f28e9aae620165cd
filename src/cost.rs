//! Per-call cost records and the sinks that receive them.
//!
//! Every [`Wrapper`](crate::wrapper::Wrapper) call that reaches the lookup step reports exactly
//! one [`CallCost`]. Cache hits report a zero-cost record with `cache_hit` set.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// What one call (or one batch) cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallCost {
    pub engine: String,
    pub dollar_cost: f64,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cache_hit: bool,
}

impl CallCost {
    /// A call served from the cache.
    pub fn free(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            dollar_cost: 0.0,
            input_tokens: 0,
            output_tokens: 0,
            cache_hit: true,
        }
    }
}

/// Destination for cost records.
pub trait CostSink: Send + Sync {
    fn report(&self, cost: CallCost);
}

impl<S: CostSink + ?Sized> CostSink for Arc<S> {
    fn report(&self, cost: CallCost) {
        (**self).report(cost)
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCostSink;

impl CostSink for NoopCostSink {
    fn report(&self, _: CallCost) {}
}

/// Returns a no-op cost sink.
pub fn noop_sink() -> Arc<dyn CostSink> {
    Arc::new(NoopCostSink)
}

/// Keeps every record; useful for accounting over a run and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCostSink {
    records: Mutex<Vec<CallCost>>,
}

impl InMemoryCostSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CallCost> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_dollars(&self) -> f64 {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.dollar_cost)
            .sum()
    }

    /// `(input, output)` token totals.
    pub fn total_tokens(&self) -> (u64, u64) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .fold((0, 0), |(i, o), c| {
                (i + c.input_tokens as u64, o + c.output_tokens as u64)
            })
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CostSink for InMemoryCostSink {
    fn report(&self, cost: CallCost) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cost);
    }
}

/// Keeps only the most recent record.
#[derive(Debug, Default)]
pub struct LastCallSink {
    last: Mutex<Option<CallCost>>,
}

impl LastCallSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<CallCost> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Option<CallCost> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl CostSink for LastCallSink {
    fn report(&self, cost: CallCost) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(cost);
    }
}
