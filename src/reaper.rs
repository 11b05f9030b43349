use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::engine::Engine;
use crate::model::Actor;
use crate::observability;

/// Background task that completes confirmed bookings whose stay has ended.
pub async fn run_sweeper(engine: Arc<Engine>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        let due = engine.collect_due_completions(now).await;
        let system = Actor::system();
        for booking_id in due {
            match engine.complete_booking(booking_id, &system).await {
                Ok(_) => {
                    metrics::counter!(observability::AUTO_COMPLETIONS_TOTAL).increment(1);
                    info!("auto-completed booking {booking_id}");
                }
                Err(e) => {
                    // May have been cancelled or completed since the scan
                    tracing::debug!("sweeper skip {booking_id}: {e}");
                }
            }
        }
    }
}

/// Background task that rewrites the WAL once enough appends accumulate.
pub async fn run_compactor(engine: Arc<Engine>, threshold: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    loop {
        interval.tick().await;
        let appends = match engine.wal_appends_since_compact().await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("compactor: {e}");
                continue;
            }
        };
        if appends < threshold {
            continue;
        }
        match engine.compact_wal().await {
            Ok(()) => info!("compacted WAL after {appends} appends"),
            Err(e) => tracing::warn!("WAL compaction failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use std::path::PathBuf;
    use ulid::Ulid;

    fn test_wal_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("bookd_test_sweeper");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn now() -> Ms {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as Ms
    }

    #[tokio::test]
    async fn sweeper_collects_only_ended_confirmed_stays() {
        let path = test_wal_path("sweeper_collect.wal");
        let engine = Arc::new(Engine::new(path).unwrap());
        let admin = Actor::system();

        let room = Ulid::new();
        engine
            .create_room(room, &admin, None, 10_000, true)
            .await
            .unwrap();

        let start = now() + NIGHT_MS;
        let ended = Ulid::new();
        engine
            .create_booking(ended, room, &admin, start, start + NIGHT_MS, None)
            .await
            .unwrap();
        engine.confirm_booking(ended, &admin).await.unwrap();

        // Still pending: never auto-completed
        let pending = Ulid::new();
        engine
            .create_booking(pending, room, &admin, start + NIGHT_MS, start + 2 * NIGHT_MS, None)
            .await
            .unwrap();

        // Nothing due before the stay ends
        assert!(engine.collect_due_completions(start).await.is_empty());

        // Once past check-out, only the confirmed booking is due
        let due = engine.collect_due_completions(start + NIGHT_MS).await;
        assert_eq!(due, vec![ended]);

        engine.complete_booking(ended, &admin).await.unwrap();
        assert!(engine
            .collect_due_completions(start + NIGHT_MS)
            .await
            .is_empty());
    }
}
