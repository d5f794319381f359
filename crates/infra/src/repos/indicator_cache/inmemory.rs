use super::IIndicatorCacheRepo;
use dosetrack_domain::{Day, DayDot, YearMonth, ID};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

struct CacheEntry {
    indicators: BTreeMap<Day, Vec<DayDot>>,
    expires_at: i64,
}

pub struct InMemoryIndicatorCacheRepo {
    entries: Mutex<HashMap<(ID, YearMonth), CacheEntry>>,
}

impl InMemoryIndicatorCacheRepo {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IIndicatorCacheRepo for InMemoryIndicatorCacheRepo {
    async fn get(
        &self,
        user_id: &ID,
        period: &YearMonth,
        now: i64,
    ) -> Option<BTreeMap<Day, Vec<DayDot>>> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(&(user_id.clone(), *period))?;
        if entry.expires_at <= now {
            return None;
        }
        Some(entry.indicators.clone())
    }

    async fn set(
        &self,
        user_id: &ID,
        period: &YearMonth,
        indicators: BTreeMap<Day, Vec<DayDot>>,
        expires_at: i64,
    ) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            (user_id.clone(), *period),
            CacheEntry {
                indicators,
                expires_at,
            },
        );
    }

    async fn invalidate(&self, user_id: &ID, period: &YearMonth) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&(user_id.clone(), *period));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dosetrack_domain::IntakeStatus;

    fn indicators() -> BTreeMap<Day, Vec<DayDot>> {
        let mut map = BTreeMap::new();
        map.insert(
            Day::new(2025, 1, 1),
            vec![DayDot {
                medicine_id: Default::default(),
                label: "A".into(),
                status: IntakeStatus::Taken,
            }],
        );
        map
    }

    #[tokio::test]
    async fn it_serves_entries_until_expiry() {
        let cache = InMemoryIndicatorCacheRepo::new();
        let user_id = ID::default();
        let period = YearMonth {
            year: 2025,
            month: 1,
        };

        cache.set(&user_id, &period, indicators(), 1000).await;
        assert!(cache.get(&user_id, &period, 999).await.is_some());
        assert!(cache.get(&user_id, &period, 1000).await.is_none());
    }

    #[tokio::test]
    async fn it_invalidates_per_user_and_period() {
        let cache = InMemoryIndicatorCacheRepo::new();
        let user_id = ID::default();
        let other_user = ID::default();
        let period = YearMonth {
            year: 2025,
            month: 1,
        };

        cache.set(&user_id, &period, indicators(), 1000).await;
        cache.set(&other_user, &period, indicators(), 1000).await;
        cache.invalidate(&user_id, &period).await;
        assert!(cache.get(&user_id, &period, 0).await.is_none());
        assert!(cache.get(&other_user, &period, 0).await.is_some());
    }
}
