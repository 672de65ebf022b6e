//! Rates from monotonic counters
//!
//! SNMP exposes traffic and error counts as ever-growing counters; checks
//! want per-second rates. The [`ValueStore`] remembers the counter value seen
//! on the previous run (persisted as JSON between invocations) and
//! [`get_rate`](ValueStore::get_rate) computes the delta rate. The first
//! sample for a key and counter wraps are typed errors, the caller decides
//! how loudly to report them.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use derive_more::From;
use serde::{Deserialize, Serialize};

#[derive(Debug, From)]
pub enum RateError {
    /// No previous sample for this key; no rate can be computed yet.
    FirstSample,
    /// The counter went backwards (device reboot or 32-bit wrap).
    CounterWrapped,
    /// The previous sample is not older than `now`.
    NoTimeDifference,
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RateError::FirstSample => write!(f, "counter initialized"),
            RateError::CounterWrapped => write!(f, "counter wrapped"),
            RateError::NoTimeDifference => write!(f, "no time elapsed since last sample"),
            RateError::Io(e) => write!(f, "could not access value store: {}", e),
            RateError::Json(e) => write!(f, "corrupt value store: {}", e),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Sample {
    time: f64,
    value: f64,
}

/// Counter samples from the previous run, keyed by
/// `"{plugin}.{counter}.{item}"` strings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ValueStore {
    samples: HashMap<String, Sample>,
}

impl ValueStore {
    pub fn new() -> ValueStore {
        ValueStore::default()
    }

    /// Load a store, treating a missing file as empty: the first run of a
    /// fresh host has no history.
    pub fn load(path: &Path) -> Result<ValueStore, RateError> {
        let mut contents = String::new();
        match File::open(path) {
            Ok(mut fh) => fh.read_to_string(&mut contents).map(|_| ())?,
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => return Ok(ValueStore::new()),
            Err(e) => return Err(e.into()),
        }
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RateError> {
        let contents = serde_json::to_string(self)?;
        File::create(path)?.write_all(contents.as_bytes())?;
        Ok(())
    }

    /// Record `(now, value)` for `key` and return the per-second rate since
    /// the previous sample. The sample is recorded even when an error is
    /// returned, so the next run can succeed.
    pub fn get_rate(&mut self, key: &str, now: f64, value: f64) -> Result<f64, RateError> {
        let previous = self.samples.insert(key.to_string(), Sample { time: now, value });
        let previous = previous.ok_or(RateError::FirstSample)?;
        if now <= previous.time {
            return Err(RateError::NoTimeDifference);
        }
        if value < previous.value {
            return Err(RateError::CounterWrapped);
        }
        Ok((value - previous.value) / (now - previous.time))
    }
}

/// A value store bound to its file, saved back with [`persist`](Self::persist).
///
/// Binaries hold one of these for the whole run; plugins only see the inner
/// [`ValueStore`].
#[derive(Debug, Default)]
pub struct PersistentStore {
    pub store: ValueStore,
    path: Option<PathBuf>,
}

impl PersistentStore {
    /// In-memory only; rates will report [`RateError::FirstSample`] every run.
    pub fn ephemeral() -> PersistentStore {
        PersistentStore::default()
    }

    pub fn open(path: PathBuf) -> Result<PersistentStore, RateError> {
        let store = ValueStore::load(&path)?;
        Ok(PersistentStore {
            store,
            path: Some(path),
        })
    }

    pub fn persist(&self) -> Result<(), RateError> {
        match &self.path {
            Some(path) => self.store.save(path),
            None => Ok(()),
        }
    }
}
