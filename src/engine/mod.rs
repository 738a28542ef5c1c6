pub mod availability;
mod error;
mod mutations;
mod queries;
mod store;
mod validation;

pub use availability::{LinearScan, Occupancy, StepIndex};
pub use error::{CapacityConflict, EditError, EngineError};
pub use store::{BookingList, DEFAULT_KENNEL_CAPACITY};
pub use validation::BookingRequest;

use std::io;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};

use crate::config::KennelConfig;
use crate::journal::Journal;
use crate::model::*;
use crate::notify::NotifyHub;
use crate::observability;

// ── Journal writer ───────────────────────────────────────

pub(super) enum JournalCommand {
    Record {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Rewrite {
        bookings: Vec<KennelBooking>,
        response: oneshot::Sender<io::Result<()>>,
    },
    RecordsSinceRewrite {
        response: oneshot::Sender<u64>,
    },
}

/// Task that owns the journal file. Callers hold the store lock while they
/// wait, so commands arrive one at a time in commit order.
async fn journal_writer_loop(mut journal: Journal, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            JournalCommand::Record { event, response } => {
                let started = std::time::Instant::now();
                let result = journal.record(&event);
                metrics::histogram!(observability::JOURNAL_WRITE_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                if let Err(e) = &result {
                    tracing::error!("journal {}: write failed: {e}", journal.path().display());
                }
                let _ = response.send(result);
            }
            JournalCommand::Rewrite { bookings, response } => {
                let result = journal.rewrite(&bookings);
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(observability::JOURNAL_COMPACTIONS_TOTAL, "status" => status).increment(1);
                let _ = response.send(result);
            }
            JournalCommand::RecordsSinceRewrite { response } => {
                let _ = response.send(journal.records_since_rewrite());
            }
        }
    }
}

/// The kennel booking service: one store, one journal, one lock.
///
/// Every mutation holds the write lock from capacity check through journal
/// append to in-memory apply, so concurrent callers cannot both take the
/// last free place on a day.
pub struct Engine {
    pub(super) bookings: RwLock<BookingList>,
    pub(super) journal_tx: mpsc::Sender<JournalCommand>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    /// Replay the configured journal and start the journal writer.
    /// Must be called from within a Tokio runtime.
    pub fn open(config: &KennelConfig, notify: Arc<NotifyHub>) -> io::Result<Self> {
        let journal_path = config.journal_path();
        let capacity = config.capacity;
        let (journal, events) = Journal::recover(&journal_path)?;
        let (journal_tx, journal_rx) = mpsc::channel(64);
        tokio::spawn(journal_writer_loop(journal, journal_rx));

        let mut list = BookingList::new(capacity);
        for event in &events {
            list.apply(event);
        }
        tracing::info!(
            "opened {} with {} bookings ({} journal events, capacity {capacity})",
            journal_path.display(),
            list.len(),
            events.len()
        );
        metrics::gauge!(observability::BOOKINGS_STORED).set(list.len() as f64);

        Ok(Self {
            bookings: RwLock::new(list),
            journal_tx,
            notify,
        })
    }

    async fn journal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Record {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::JournalError("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::JournalError("journal writer dropped response".into()))?
            .map_err(|e| EngineError::JournalError(e.to_string()))
    }

    /// Journal-append + apply + notify. The caller holds the write lock and
    /// has already validated the event; a failed append leaves `list` untouched.
    pub(super) async fn persist_and_apply(&self, list: &mut BookingList, event: Event) -> Result<(), EngineError> {
        if let Err(e) = self.journal_append(&event).await {
            tracing::error!("{} not committed: {e}", observability::event_label(&event));
            return Err(e);
        }
        list.apply(&event);
        metrics::gauge!(observability::BOOKINGS_STORED).set(list.len() as f64);
        self.notify.send(&event);
        Ok(())
    }
}
