//! Calendar date source for circulation rules

use chrono::{Duration, NaiveDate, Utc};
use std::sync::RwLock;

/// Source of "today" for every date comparison in the domain layer.
///
/// Production code uses [`SystemClock`]; tests pin dates with [`FixedClock`].
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the system UTC time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to an explicit date, adjustable at runtime
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.write().unwrap() = today;
    }

    pub fn advance_days(&self, days: i64) {
        let mut guard = self.today.write().unwrap();
        *guard += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.read().unwrap()
    }
}
