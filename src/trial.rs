//! Time-bounded trial: the first run writes a timestamp, later runs measure from it.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};

use crate::error::AppError;

/// Legacy lock files held a hex-encoded SHA-256 digest instead of a timestamp.
const LEGACY_DIGEST_LEN: usize = 64;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Where the first-run timestamp lives.
pub trait TimestampStore {
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, contents: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileTimestampStore {
    path: PathBuf,
}

impl FileTimestampStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimestampStore for FileTimestampStore {
    fn read(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// How the first-run timestamp was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOrigin {
    FirstRun,
    Existing,
    MigratedLegacyDigest,
    MigratedNaiveTimestamp,
    RecoveredCorrupt,
}

#[derive(Debug, Clone)]
pub struct TrialLock<C: Clock> {
    clock: C,
    first_start: DateTime<Utc>,
    limit: TimeDelta,
    origin: LockOrigin,
}

enum Parsed {
    Timestamp(DateTime<Utc>),
    NaiveTimestamp(DateTime<Utc>),
    LegacyDigest,
    Corrupt,
}

fn parse_lock(content: &str) -> Parsed {
    let content = content.trim();
    if content.len() == LEGACY_DIGEST_LEN && hex::decode(content).is_ok() {
        return Parsed::LegacyDigest;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(content) {
        return Parsed::Timestamp(ts.with_timezone(&Utc));
    }
    // Offset-less ISO timestamps were written in local time.
    if let Ok(naive) = NaiveDateTime::parse_from_str(content, "%Y-%m-%dT%H:%M:%S%.f") {
        if let Some(local) = Local.from_local_datetime(&naive).earliest() {
            return Parsed::NaiveTimestamp(local.with_timezone(&Utc));
        }
    }
    Parsed::Corrupt
}

impl<C: Clock> TrialLock<C> {
    /// Read (or create) the first-run timestamp and fail if the trial is over.
    pub fn acquire<S: TimestampStore>(
        store: &S,
        clock: C,
        duration: Duration,
    ) -> Result<Self, AppError> {
        let limit = TimeDelta::from_std(duration)
            .map_err(|e| AppError::Config(format!("trial duration out of range: {}", e)))?;
        let now = clock.now();

        let content = match store.read() {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "trial lock unreadable, starting a new trial");
                Some(String::new())
            }
        };

        let (first_start, origin) = match content.as_deref().map(parse_lock) {
            None => {
                store.write(&now.to_rfc3339())?;
                tracing::info!(first_start = %now, "first trial run");
                (now, LockOrigin::FirstRun)
            }
            Some(Parsed::Timestamp(ts)) => (ts, LockOrigin::Existing),
            Some(Parsed::NaiveTimestamp(ts)) => {
                store.write(&ts.to_rfc3339())?;
                tracing::info!(first_start = %ts, "migrated offset-less trial timestamp");
                (ts, LockOrigin::MigratedNaiveTimestamp)
            }
            Some(Parsed::LegacyDigest) => {
                store.clear()?;
                store.write(&now.to_rfc3339())?;
                tracing::info!(first_start = %now, "migrated legacy digest trial lock");
                (now, LockOrigin::MigratedLegacyDigest)
            }
            Some(Parsed::Corrupt) => {
                tracing::warn!("corrupt trial lock, starting a new trial");
                store.clear()?;
                store.write(&now.to_rfc3339())?;
                (now, LockOrigin::RecoveredCorrupt)
            }
        };

        let lock = Self {
            clock,
            first_start,
            limit,
            origin,
        };
        lock.check()?;
        Ok(lock)
    }

    pub fn first_start(&self) -> DateTime<Utc> {
        self.first_start
    }

    pub fn origin(&self) -> LockOrigin {
        self.origin
    }

    pub fn limit(&self) -> TimeDelta {
        self.limit
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.clock.now() - self.first_start
    }

    /// Time left, never negative.
    pub fn remaining(&self) -> TimeDelta {
        (self.limit - self.elapsed()).max(TimeDelta::zero())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() > self.limit
    }

    pub fn check(&self) -> Result<(), AppError> {
        if self.is_expired() {
            return Err(AppError::TrialExpired {
                elapsed_hours: self.elapsed().num_hours(),
                limit_hours: self.limit.num_hours(),
            });
        }
        Ok(())
    }
}
