use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::engine::Engine;
use crate::market::types::Quote;

/// Anything that can produce the latest quote for the tracked asset.
pub trait QuoteSource {
    fn fetch(&self) -> impl Future<Output = Result<Quote>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A sample was appended and status/levels recomputed.
    Updated { price: f64, points: usize },
    /// The fetch failed; engine state is untouched.
    Skipped { reason: String },
}

impl TickOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Fetch one quote and feed it to the engine. Fetch errors never escape.
pub async fn run_tick<S: QuoteSource>(
    engine: &mut Engine,
    source: &S,
    now: DateTime<Utc>,
) -> TickOutcome {
    match source.fetch().await {
        Ok(quote) => {
            let state = engine.ingest(quote.into(), now);
            TickOutcome::Updated {
                price: state.status.price,
                points: state.status.data_progress,
            }
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            tracing::warn!(error = %reason, "quote fetch failed, skipping tick");
            TickOutcome::Skipped { reason }
        }
    }
}
