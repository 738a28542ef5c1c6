use std::time::Instant;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::limits::*;
use crate::model::*;
use crate::observability::record_mutation;

use super::validation::validate_request;
use super::{BookingRequest, Engine, EngineError, JournalCommand};

fn status_of<T>(result: &Result<T, EngineError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(EngineError::CapacityExceeded(_)) => "conflict",
        Err(EngineError::NotFound) => "not_found",
        Err(EngineError::InvalidRequest(_) | EngineError::LimitExceeded(_)) => "rejected",
        Err(EngineError::JournalError(_)) => "error",
    }
}

impl Engine {
    /// Book a kennel place for every day of `[start, end)`.
    ///
    /// All-or-nothing: on a full day nothing is stored or journaled.
    pub async fn add_booking(&self, request: BookingRequest) -> Result<KennelBooking, EngineError> {
        let started = Instant::now();
        let result = self.add_booking_inner(request).await;
        record_mutation("add_booking", status_of(&result), started);
        result
    }

    async fn add_booking_inner(&self, request: BookingRequest) -> Result<KennelBooking, EngineError> {
        let booking = validate_request(request)?;
        let mut list = self.bookings.write().await;
        if list.len() >= MAX_BOOKINGS {
            return Err(EngineError::LimitExceeded("too many bookings"));
        }
        if let Err(conflict) = list.check_add(&booking) {
            debug!("add rejected for {}: {conflict}", booking.pet().name);
            return Err(conflict.into());
        }

        let event = Event::BookingAdded { booking: booking.clone() };
        self.persist_and_apply(&mut list, event).await?;
        info!("booked {booking}");
        Ok(booking)
    }

    /// Remove the first booking equal to `booking`. Returns false, journaling
    /// nothing, when no such booking is stored.
    pub async fn remove_booking(&self, booking: &KennelBooking) -> Result<bool, EngineError> {
        let started = Instant::now();
        let mut list = self.bookings.write().await;
        if list.index_of(booking).is_none() {
            record_mutation("remove_booking", "absent", started);
            return Ok(false);
        }

        let event = Event::BookingRemoved { booking: booking.clone() };
        let result = self.persist_and_apply(&mut list, event).await;
        record_mutation("remove_booking", status_of(&result), started);
        result?;
        info!("removed {booking}");
        Ok(true)
    }

    /// Replace `old` with the booking described by `request`.
    ///
    /// The new range is checked with `old` left out of the count. On any
    /// error the stored bookings are exactly as before.
    pub async fn edit_booking(&self, old: &KennelBooking, request: BookingRequest) -> Result<KennelBooking, EngineError> {
        let started = Instant::now();
        let result = self.edit_booking_inner(old, request).await;
        record_mutation("edit_booking", status_of(&result), started);
        result
    }

    async fn edit_booking_inner(&self, old: &KennelBooking, request: BookingRequest) -> Result<KennelBooking, EngineError> {
        let new = validate_request(request)?;
        let mut list = self.bookings.write().await;
        if let Err(e) = list.check_edit(old, &new) {
            debug!("edit rejected for {}: {e}", old.pet().name);
            return Err(e.into());
        }

        let event = Event::BookingEdited {
            old: old.clone(),
            new: new.clone(),
        };
        self.persist_and_apply(&mut list, event).await?;
        info!("edited booking from {} - {}: {new}", old.start(), old.end());
        Ok(new)
    }

    /// Replace every stored booking with `snapshot`.
    ///
    /// The snapshot is trusted as saved: capacity is not re-checked.
    pub async fn restore(&self, snapshot: Vec<KennelBooking>) -> Result<(), EngineError> {
        let started = Instant::now();
        if snapshot.len() > MAX_BOOKINGS {
            record_mutation("restore", "rejected", started);
            return Err(EngineError::LimitExceeded("too many bookings"));
        }
        let mut list = self.bookings.write().await;
        let count = snapshot.len();
        let event = Event::Restored { bookings: snapshot };
        let result = self.persist_and_apply(&mut list, event).await;
        record_mutation("restore", status_of(&result), started);
        result?;
        info!("restored {count} bookings from snapshot");
        Ok(())
    }

    /// Rewrite the journal as a single snapshot of the current bookings.
    pub async fn compact_journal(&self) -> Result<(), EngineError> {
        // Holding the read lock keeps writers out until the swap is done
        let list = self.bookings.read().await;
        let bookings = list.bookings().to_vec();

        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Rewrite { bookings, response: tx })
            .await
            .map_err(|_| EngineError::JournalError("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::JournalError("journal writer dropped response".into()))?
            .map_err(|e| EngineError::JournalError(e.to_string()))?;
        info!("journal compacted to {} bookings", list.len());
        Ok(())
    }

    pub async fn journal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .journal_tx
            .send(JournalCommand::RecordsSinceRewrite { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    /// Compact before exit so the next start replays one record.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        if self.journal_appends_since_compact().await == 0 {
            return Ok(());
        }
        self.compact_journal().await
    }
}
