mod inmemory;

use dosetrack_domain::{Day, DayDot, YearMonth, ID};
pub use inmemory::InMemoryIndicatorCacheRepo;
use std::collections::BTreeMap;

/// Process local cache for computed month indicators, keyed on
/// `(user_id, year_month)`. Entries expire after a ttl and are
/// invalidated explicitly whenever a dose instance belonging to the
/// period is written.
#[async_trait::async_trait]
pub trait IIndicatorCacheRepo: Send + Sync {
    async fn get(
        &self,
        user_id: &ID,
        period: &YearMonth,
        now: i64,
    ) -> Option<BTreeMap<Day, Vec<DayDot>>>;
    async fn set(
        &self,
        user_id: &ID,
        period: &YearMonth,
        indicators: BTreeMap<Day, Vec<DayDot>>,
        expires_at: i64,
    );
    async fn invalidate(&self, user_id: &ID, period: &YearMonth);
}
