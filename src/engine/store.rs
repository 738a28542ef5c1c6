use crate::model::*;

use super::availability::{self, LinearScan, StepIndex};
use super::error::{CapacityConflict, EditError};

/// Places in the kennel unless configured otherwise.
pub const DEFAULT_KENNEL_CAPACITY: u32 = 10;

/// Ordered kennel bookings with a fixed per-day capacity.
///
/// For every day, the number of stored bookings occupying it never exceeds
/// `capacity`. Bookings keep insertion order, not date order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingList {
    bookings: Vec<KennelBooking>,
    capacity: u32,
}

impl Default for BookingList {
    fn default() -> Self {
        Self::new(DEFAULT_KENNEL_CAPACITY)
    }
}

impl BookingList {
    pub fn new(capacity: u32) -> Self {
        Self {
            bookings: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn bookings(&self) -> &[KennelBooking] {
        &self.bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn index_of(&self, booking: &KennelBooking) -> Option<usize> {
        self.bookings.iter().position(|b| b == booking)
    }

    // ── Mutations ────────────────────────────────────────────

    /// Check `candidate` against the current bookings without storing it.
    pub fn check_add(&self, candidate: &KennelBooking) -> Result<(), CapacityConflict> {
        self.check_range(&LinearScan::new(&self.bookings), candidate.range())
    }

    pub fn add_booking(&mut self, candidate: KennelBooking) -> Result<(), CapacityConflict> {
        self.check_add(&candidate)?;
        self.bookings.push(candidate);
        Ok(())
    }

    /// Remove the first booking equal to `existing`. Absent bookings are a no-op.
    pub fn remove_booking(&mut self, existing: &KennelBooking) -> Option<KennelBooking> {
        let pos = self.index_of(existing)?;
        Some(self.bookings.remove(pos))
    }

    /// Validate replacing `old` with `new` and return the position to write.
    ///
    /// Dates unchanged: no capacity check. Otherwise `new` is checked with
    /// `old` excluded from the count, so a booking never conflicts with itself.
    pub fn check_edit(&self, old: &KennelBooking, new: &KennelBooking) -> Result<usize, EditError> {
        let pos = self.index_of(old).ok_or(EditError::NotFound)?;
        if old.same_dates(new) {
            return Ok(pos);
        }
        self.check_range(&LinearScan::excluding(&self.bookings, pos), new.range())
            .map_err(EditError::Conflict)?;
        Ok(pos)
    }

    /// Replace `old` with `new` in place. Returns the replaced booking.
    pub fn edit_booking(&mut self, old: &KennelBooking, new: KennelBooking) -> Result<KennelBooking, EditError> {
        let pos = self.check_edit(old, &new)?;
        Ok(std::mem::replace(&mut self.bookings[pos], new))
    }

    /// Replace the whole store with a previously saved snapshot.
    pub fn replace_all(&mut self, bookings: Vec<KennelBooking>) {
        self.bookings = bookings;
    }

    /// Apply an already-validated event. Used for commit and journal replay.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::BookingAdded { booking } => self.bookings.push(booking.clone()),
            Event::BookingRemoved { booking } => {
                self.remove_booking(booking);
            }
            Event::BookingEdited { old, new } => match self.index_of(old) {
                Some(pos) => self.bookings[pos] = new.clone(),
                None => {
                    tracing::warn!("edit of unknown booking in journal, appending: {new}");
                    self.bookings.push(new.clone());
                }
            },
            Event::Restored { bookings } => self.replace_all(bookings.clone()),
        }
    }

    // ── Queries ──────────────────────────────────────────────

    pub fn free_space(&self, date: Date) -> u32 {
        availability::free_space(&LinearScan::new(&self.bookings), self.capacity, date)
    }

    pub fn free_space_today(&self) -> u32 {
        self.free_space(Date::today())
    }

    pub fn is_kennel_free(&self, start: Date, end: Date) -> bool {
        availability::is_range_free(&LinearScan::new(&self.bookings), self.capacity, DateRange::new(start, end))
    }

    /// Stretches of `[start, end)` in which the kennel is full.
    pub fn saturated_ranges(&self, start: Date, end: Date) -> Vec<DateRange> {
        StepIndex::build(&self.bookings).saturated_ranges(DateRange::new(start, end), self.capacity)
    }

    /// Free places for each day of `[start, end)`.
    pub fn daily_free_space(&self, start: Date, end: Date) -> Vec<(Date, u32)> {
        let index = StepIndex::build(&self.bookings);
        DateRange::new(start, end)
            .days()
            .map(|day| (day, availability::free_space(&index, self.capacity, day)))
            .collect()
    }

    fn check_range(&self, index: &LinearScan<'_>, range: DateRange) -> Result<(), CapacityConflict> {
        match availability::first_full_day(index, self.capacity, range) {
            Some(date) => Err(CapacityConflict {
                date,
                capacity: self.capacity,
            }),
            None => Ok(()),
        }
    }
}
