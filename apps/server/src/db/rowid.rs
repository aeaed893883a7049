//! Row id allocation for the in-memory store.
//!
//! Mirrors the shape of CockroachDB's `unique_rowid()`: ten-microsecond ticks
//! since 2015-01-01 shifted left by 15 bits, bumped to stay strictly
//! increasing. Ids land far above 2^53, so clients that lose integer precision
//! are caught without a database.

use chrono::Utc;
use spoolyard_ids::Id;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::{Error, Result};

const SEQUENCE_BITS: u32 = 15;
const EPOCH_2015_MICROS: i64 = 1_420_070_400_000_000;

#[derive(Debug, Default)]
pub struct RowIdGenerator {
    last: AtomicI64,
}

impl RowIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> Result<Id> {
        let ticks = ((Utc::now().timestamp_micros() - EPOCH_2015_MICROS) / 10).max(0);
        let candidate = ticks << SEQUENCE_BITS;

        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = candidate.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => {
                    return Id::new(next)
                        .map_err(|e| Error::Internal(format!("Row id allocation failed: {e}")))
                }
                Err(actual) => last = actual,
            }
        }
    }
}
