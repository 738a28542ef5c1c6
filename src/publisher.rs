use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::model::Date;
use crate::observability;

/// Write today's free place count for the shop website: decimal plus newline.
///
/// Written to a sibling temp file and renamed, so readers never see a
/// half-written number.
pub async fn write_free_space_file(path: &Path, free: u32) -> io::Result<()> {
    let tmp = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp, format!("{free}\n")).await?;
    tokio::fs::rename(&tmp, path).await
}

async fn publish(engine: &Engine, path: &Path, today: Date) {
    let free = engine.free_space(today).await;
    metrics::gauge!(observability::FREE_SPACE_TODAY).set(free as f64);
    match write_free_space_file(path, free).await {
        Ok(()) => debug!("published {free} free places on {today} to {}", path.display()),
        Err(e) => warn!("could not write {}: {e}", path.display()),
    }
}

/// Keep the free-space file current: once at startup, after every committed
/// change, and on each tick so the figure follows the calendar past midnight.
pub async fn run_publisher(engine: Arc<Engine>, path: impl AsRef<Path>, every: Duration) {
    run_publisher_with_clock(engine, path, every, Date::today).await
}

/// `run_publisher` reading the current day from `today` instead of the
/// local clock.
pub async fn run_publisher_with_clock<F>(engine: Arc<Engine>, path: impl AsRef<Path>, every: Duration, today: F)
where
    F: Fn() -> Date,
{
    let path = path.as_ref();
    let mut changes = engine.notify.subscribe();
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // The first tick completes immediately and covers the startup write.
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            received = changes.recv() => match received {
                Ok(event) => debug!("{} committed, republishing", observability::event_label(&event)),
                Err(RecvError::Lagged(skipped)) => debug!("publisher lagged {skipped} events"),
                Err(RecvError::Closed) => {
                    warn!("change feed closed, publishing on interval only");
                    loop {
                        interval.tick().await;
                        publish(&engine, path, today()).await;
                    }
                }
            },
        }
        publish(&engine, path, today()).await;
    }
}

/// Background task that compacts the journal once enough appends pile up.
pub async fn run_compactor(engine: Arc<Engine>, threshold: u64, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let appends = engine.journal_appends_since_compact().await;
        if appends >= threshold {
            match engine.compact_journal().await {
                Ok(()) => info!("compacted journal after {appends} appends"),
                Err(e) => tracing::error!("journal compaction failed: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KennelConfig;
    use crate::engine::BookingRequest;
    use crate::model::fixtures::*;
    use crate::model::*;
    use crate::notify::NotifyHub;
    use std::path::PathBuf;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("kennel_test_publisher").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn open_engine(dir: &Path) -> Arc<Engine> {
        let config = KennelConfig {
            data_dir: dir.to_path_buf(),
            ..KennelConfig::default()
        };
        Arc::new(Engine::open(&config, Arc::new(NotifyHub::new())).unwrap())
    }

    async fn read_count(path: &Path) -> Option<u32> {
        let text = tokio::fs::read_to_string(path).await.ok()?;
        text.strip_suffix('\n')?.parse().ok()
    }

    #[tokio::test]
    async fn writes_decimal_and_newline() {
        let path = test_dir("write").join("freeSpace.txt");
        write_free_space_file(&path, 7).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "7\n");
        write_free_space_file(&path, 10).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10\n");
    }

    #[tokio::test]
    async fn publishes_at_startup_and_after_changes() {
        let dir = test_dir("publisher");
        let path = dir.join("freeSpace.txt");
        let engine = open_engine(&dir);

        let day = d(1, 3, 2031);
        let task = tokio::spawn(run_publisher_with_clock(
            engine.clone(),
            path.clone(),
            Duration::from_secs(3600),
            move || day,
        ));

        let mut seen = None;
        for _ in 0..100 {
            seen = read_count(&path).await;
            if seen.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(seen, Some(10));

        engine
            .add_booking(BookingRequest::from(&booking(d(28, 2, 2031), d(3, 3, 2031))))
            .await
            .unwrap();
        // Outside the published day
        engine
            .add_booking(BookingRequest::from(&booking(d(2, 3, 2031), d(4, 3, 2031))))
            .await
            .unwrap();

        for _ in 0..100 {
            seen = read_count(&path).await;
            if seen == Some(9) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(seen, Some(9));
        task.abort();
    }

    #[tokio::test]
    async fn compactor_respects_threshold() {
        let dir = test_dir("compactor");
        let engine = open_engine(&dir);
        for i in 0..3 {
            let b = booking_for(&format!("pet{i}"), d(1, 3, 2031), d(4, 3, 2031));
            engine.add_booking(BookingRequest::from(&b)).await.unwrap();
        }
        assert_eq!(engine.journal_appends_since_compact().await, 3);

        let task = tokio::spawn(run_compactor(engine.clone(), 3, Duration::from_millis(10)));
        for _ in 0..100 {
            if engine.journal_appends_since_compact().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        task.abort();
        assert_eq!(engine.journal_appends_since_compact().await, 0);
        assert_eq!(engine.list_bookings().await.len(), 3);
    }
}
