use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use chrono::Utc;

use pulse_levels::engine::Engine;
use pulse_levels::market::types::Quote;
use pulse_levels::session::{run_tick, QuoteSource, TickOutcome};

struct ScriptedSource {
    replies: RefCell<VecDeque<Result<Quote>>>,
}

impl ScriptedSource {
    fn new(replies: Vec<Result<Quote>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
        }
    }
}

impl QuoteSource for ScriptedSource {
    async fn fetch(&self) -> Result<Quote> {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("script exhausted")))
    }
}

fn quote(price: f64) -> Result<Quote> {
    Ok(Quote {
        price,
        volume: 42.0,
    })
}

#[test]
/// Verifies failed fetches are skipped:
/// the engine state is unchanged and the loop can continue with the next quote.
fn failed_fetch_skips_tick_without_touching_state() {
    let source = ScriptedSource::new(vec![
        quote(100.0),
        Err(anyhow!("connection timed out")),
        quote(101.0),
    ]);
    let mut engine = Engine::default();

    let first = tokio_test::block_on(run_tick(&mut engine, &source, Utc::now()));
    assert_eq!(
        first,
        TickOutcome::Updated {
            price: 100.0,
            points: 1
        }
    );
    let before = engine.snapshot();

    let second = tokio_test::block_on(run_tick(&mut engine, &source, Utc::now()));
    match second {
        TickOutcome::Skipped { reason } => assert!(reason.contains("timed out")),
        other => panic!("expected skip, got {:?}", other),
    }
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.buffer().len(), 1);

    let third = tokio_test::block_on(run_tick(&mut engine, &source, Utc::now()));
    assert!(third.is_updated());
    assert_eq!(engine.buffer().len(), 2);
    assert_eq!(engine.state().status.price, 101.0);
}

#[test]
fn twenty_good_ticks_make_the_engine_ready() {
    let replies = (0..20).map(|i| quote(200.0 + i as f64 * 0.5)).collect();
    let source = ScriptedSource::new(replies);
    let mut engine = Engine::default();
    for _ in 0..20 {
        let outcome = tokio_test::block_on(run_tick(&mut engine, &source, Utc::now()));
        assert!(outcome.is_updated());
    }
    assert!(engine.is_ready());
    assert!(engine.state().status.data_ready);
    assert_eq!(engine.buffer().latest().map(|s| s.volume), Some(42.0));
}
