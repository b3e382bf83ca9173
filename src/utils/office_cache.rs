use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use sqlx::MySqlPool;

use crate::model::office_location::OfficeLocation;

/// Read-through cache of the office-location list consulted on every
/// clock-in. Writers call [`OfficeCache::invalidate`].
///
/// Entries are keyed by a generation counter. A load still in flight when
/// `invalidate` runs lands under the old generation and is never served.
#[derive(Clone)]
pub struct OfficeCache {
    cache: Cache<u64, Arc<Vec<OfficeLocation>>>,
    generation: Arc<AtomicU64>,
}

impl OfficeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(2).time_to_live(ttl).build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Offices ordered by id, the order geofence matching relies on.
    pub async fn get_or_load(
        &self,
        pool: &MySqlPool,
    ) -> Result<Arc<Vec<OfficeLocation>>, sqlx::Error> {
        self.get_or_load_with(async {
            tracing::debug!("Loading office locations");
            sqlx::query_as::<_, OfficeLocation>(
                r#"
                SELECT id, name, latitude, longitude, radius_meters, created_at
                FROM office_locations
                ORDER BY id ASC
                "#,
            )
            .fetch_all(pool)
            .await
        })
        .await
    }

    async fn get_or_load_with<F>(&self, load: F) -> Result<Arc<Vec<OfficeLocation>>, sqlx::Error>
    where
        F: Future<Output = Result<Vec<OfficeLocation>, sqlx::Error>>,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        self.cache
            .try_get_with(generation, async { load.await.map(Arc::new) })
            .await
            .map_err(|e: Arc<sqlx::Error>| {
                Arc::try_unwrap(e).unwrap_or_else(|shared| sqlx::Error::Protocol(shared.to_string()))
            })
    }

    pub async fn invalidate(&self) {
        let stale = self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(&stale).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::rt::time::sleep;

    fn office(id: u64, name: &str) -> OfficeLocation {
        OfficeLocation {
            id,
            name: name.into(),
            latitude: 1.0,
            longitude: 1.0,
            radius_meters: 100.0,
            created_at: None,
        }
    }

    #[actix_web::test]
    async fn serves_cached_list_until_invalidated() {
        let cache = OfficeCache::new(Duration::from_secs(60));

        let first = cache
            .get_or_load_with(async { Ok(vec![office(1, "Head Office")]) })
            .await
            .unwrap();
        let cached = cache
            .get_or_load_with(async { Ok(vec![office(2, "Branch")]) })
            .await
            .unwrap();
        assert_eq!(first, cached);

        cache.invalidate().await;
        let reloaded = cache
            .get_or_load_with(async { Ok(vec![office(2, "Branch")]) })
            .await
            .unwrap();
        assert_eq!(reloaded[0].name, "Branch");
    }

    #[actix_web::test]
    async fn load_racing_an_invalidate_is_not_served_afterwards() {
        let cache = OfficeCache::new(Duration::from_secs(60));

        let slow_load = cache.get_or_load_with(async {
            sleep(Duration::from_millis(200)).await;
            Ok(vec![office(1, "Old Name")])
        });
        let invalidate = async {
            sleep(Duration::from_millis(50)).await;
            cache.invalidate().await;
        };
        let (stale, ()) = futures::join!(slow_load, invalidate);
        assert_eq!(stale.unwrap()[0].name, "Old Name");

        let fresh = cache
            .get_or_load_with(async { Ok(vec![office(1, "New Name")]) })
            .await
            .unwrap();
        assert_eq!(fresh[0].name, "New Name");
    }

    #[actix_web::test]
    async fn failed_load_is_not_cached() {
        let cache = OfficeCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_load_with(async { Err(sqlx::Error::RowNotFound) })
            .await;
        assert!(matches!(err, Err(sqlx::Error::RowNotFound)));

        let ok = cache
            .get_or_load_with(async { Ok(vec![office(1, "Head Office")]) })
            .await
            .unwrap();
        assert_eq!(ok.len(), 1);
    }
}
