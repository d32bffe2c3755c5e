use std::cell::{Cell, RefCell};
use std::io;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use pulse_levels::error::AppError;
use pulse_levels::trial::{Clock, FileTimestampStore, LockOrigin, TimestampStore, TrialLock};

const DAY: Duration = Duration::from_secs(24 * 3600);

struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[derive(Default)]
struct MemoryStore {
    contents: RefCell<Option<String>>,
    clears: Cell<u32>,
}

impl MemoryStore {
    fn with(contents: &str) -> Self {
        Self {
            contents: RefCell::new(Some(contents.to_string())),
            clears: Cell::new(0),
        }
    }

    fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl TimestampStore for MemoryStore {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.clears.set(self.clears.get() + 1);
        *self.contents.borrow_mut() = None;
        Ok(())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap()
}

#[test]
/// Verifies first-run behavior:
/// with no lock present the current time is written and the full duration remains.
fn first_run_writes_timestamp() {
    let store = MemoryStore::default();
    let clock = ManualClock::at(start());
    let lock = TrialLock::acquire(&store, &clock, DAY).expect("first run should succeed");

    assert_eq!(lock.origin(), LockOrigin::FirstRun);
    assert_eq!(lock.first_start(), start());
    assert_eq!(store.contents(), Some(start().to_rfc3339()));
    assert_eq!(lock.remaining(), TimeDelta::hours(24));
}

#[test]
fn existing_lock_within_limit_is_reused() {
    let store = MemoryStore::with(&start().to_rfc3339());
    let clock = ManualClock::at(start() + TimeDelta::hours(5));
    let lock = TrialLock::acquire(&store, &clock, DAY).expect("trial still active");

    assert_eq!(lock.origin(), LockOrigin::Existing);
    assert_eq!(lock.elapsed(), TimeDelta::hours(5));
    assert_eq!(lock.remaining(), TimeDelta::hours(19));
    assert!(lock.check().is_ok());
}

#[test]
/// Verifies expiry at startup:
/// a lock older than the trial duration is rejected with TrialExpired.
fn expired_lock_is_rejected() {
    let store = MemoryStore::with(&start().to_rfc3339());
    let clock = ManualClock::at(start() + TimeDelta::hours(25));
    match TrialLock::acquire(&store, &clock, DAY) {
        Err(AppError::TrialExpired {
            elapsed_hours,
            limit_hours,
        }) => {
            assert_eq!(elapsed_hours, 25);
            assert_eq!(limit_hours, 24);
        }
        other => panic!("expected TrialExpired, got {:?}", other.map(|l| l.origin())),
    }
}

#[test]
/// Verifies the per-tick deadline with an injected clock:
/// the lock expires once simulated time passes the limit, without real waiting.
fn lock_expires_as_clock_advances() {
    let store = MemoryStore::default();
    let clock = ManualClock::at(start());
    let lock = TrialLock::acquire(&store, &clock, DAY).expect("first run");

    clock.advance(TimeDelta::hours(24));
    assert!(!lock.is_expired(), "exactly at the limit is still allowed");
    clock.advance(TimeDelta::seconds(1));
    assert!(lock.is_expired());
    assert!(matches!(lock.check(), Err(AppError::TrialExpired { .. })));
    assert_eq!(lock.remaining(), TimeDelta::zero());
}

#[test]
fn legacy_digest_lock_is_migrated() {
    let digest = "3f79bb7b435b05321651daefd374cdc681dc06faa65e374e38337b88ca046dea";
    let store = MemoryStore::with(digest);
    let clock = ManualClock::at(start());
    let lock = TrialLock::acquire(&store, &clock, DAY).expect("migration should succeed");

    assert_eq!(lock.origin(), LockOrigin::MigratedLegacyDigest);
    assert_eq!(lock.first_start(), start());
    assert_eq!(store.clears.get(), 1);
    assert_eq!(store.contents(), Some(start().to_rfc3339()));
}

#[test]
fn offset_less_timestamp_is_rewritten_as_rfc3339() {
    let store = MemoryStore::with("2026-10-17T08:00:00.250000");
    let clock = ManualClock::at(start() + TimeDelta::hours(1));
    // Interpreted in local time, so only the format is asserted here.
    match TrialLock::acquire(&store, &clock, Duration::from_secs(7 * 24 * 3600)) {
        Ok(lock) => {
            assert_eq!(lock.origin(), LockOrigin::MigratedNaiveTimestamp);
            let rewritten = store.contents().expect("lock rewritten");
            assert!(DateTime::parse_from_rfc3339(&rewritten).is_ok());
        }
        Err(e) => panic!("naive timestamp should migrate: {}", e),
    }
}

#[test]
fn corrupt_lock_starts_a_fresh_trial() {
    let store = MemoryStore::with("definitely not a timestamp");
    let clock = ManualClock::at(start());
    let lock = TrialLock::acquire(&store, &clock, DAY).expect("recovery should succeed");

    assert_eq!(lock.origin(), LockOrigin::RecoveredCorrupt);
    assert_eq!(store.contents(), Some(start().to_rfc3339()));
}

#[test]
fn file_store_round_trips_and_clears() {
    let path = std::env::temp_dir().join(format!(
        "pulse-lock-{}.lock",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos()
    ));
    let store = FileTimestampStore::new(&path);
    assert_eq!(store.read().expect("read missing"), None);
    store.write("2026-10-17T08:00:00+00:00").expect("write");
    assert_eq!(
        store.read().expect("read back").as_deref(),
        Some("2026-10-17T08:00:00+00:00")
    );
    store.clear().expect("clear");
    store.clear().expect("clearing twice is fine");
    assert_eq!(store.read().expect("read cleared"), None);
}
