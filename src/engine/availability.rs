use crate::model::*;

// ── Occupancy ────────────────────────────────────────────────────

/// Number of bookings occupying a given day.
pub trait Occupancy {
    fn occupancy(&self, date: Date) -> u32;
}

/// Recomputes occupancy by scanning every booking. Optionally skips one
/// position so an edit can be checked as if the old record were gone.
pub struct LinearScan<'a> {
    bookings: &'a [KennelBooking],
    skip: Option<usize>,
}

impl<'a> LinearScan<'a> {
    pub fn new(bookings: &'a [KennelBooking]) -> Self {
        Self { bookings, skip: None }
    }

    pub fn excluding(bookings: &'a [KennelBooking], index: usize) -> Self {
        Self {
            bookings,
            skip: Some(index),
        }
    }
}

impl Occupancy for LinearScan<'_> {
    fn occupancy(&self, date: Date) -> u32 {
        self.bookings
            .iter()
            .enumerate()
            .filter(|(i, b)| Some(*i) != self.skip && b.range().contains(date))
            .count() as u32
    }
}

/// Occupancy as a step function over days, built once by a sweep line.
///
/// `steps` holds `(day, count)` pairs sorted by day: the occupancy from that
/// day until the next step. Before the first step occupancy is zero.
#[derive(Debug, Clone, Default)]
pub struct StepIndex {
    steps: Vec<(Date, u32)>,
}

impl StepIndex {
    pub fn build<'a>(bookings: impl IntoIterator<Item = &'a KennelBooking>) -> Self {
        // +1 at check-in, -1 at check-out
        let mut events: Vec<(Date, i32)> = Vec::new();
        for b in bookings {
            let range = b.range();
            if range.is_empty() {
                continue;
            }
            events.push((range.start, 1));
            events.push((range.end, -1));
        }
        events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut steps: Vec<(Date, u32)> = Vec::new();
        let mut count: u32 = 0;
        for (date, delta) in events {
            if delta > 0 {
                count += 1;
            } else {
                count -= 1;
            }
            match steps.last_mut() {
                Some(last) if last.0 == date => last.1 = count,
                _ => steps.push((date, count)),
            }
        }
        Self { steps }
    }

    /// Maximal sub-ranges of `query` in which every day is at or over `capacity`.
    pub fn saturated_ranges(&self, query: DateRange, capacity: u32) -> Vec<DateRange> {
        if query.is_empty() {
            return Vec::new();
        }
        let mut result = Vec::new();
        let mut saturated_start = (self.occupancy(query.start) >= capacity).then_some(query.start);

        let first = self.steps.partition_point(|(d, _)| *d <= query.start);
        for &(date, count) in &self.steps[first..] {
            if date >= query.end {
                break;
            }
            if count >= capacity && saturated_start.is_none() {
                saturated_start = Some(date);
            } else if count < capacity
                && let Some(start) = saturated_start.take()
            {
                result.push(DateRange::new(start, date));
            }
        }
        if let Some(start) = saturated_start {
            result.push(DateRange::new(start, query.end));
        }
        result
    }
}

impl Occupancy for StepIndex {
    fn occupancy(&self, date: Date) -> u32 {
        let idx = self.steps.partition_point(|(d, _)| *d <= date);
        if idx == 0 { 0 } else { self.steps[idx - 1].1 }
    }
}

// ── Derived queries ──────────────────────────────────────────────

pub fn free_space<O: Occupancy + ?Sized>(index: &O, capacity: u32, date: Date) -> u32 {
    capacity.saturating_sub(index.occupancy(date))
}

/// First day of `range` with no free slot, scanning day by day from the start.
pub fn first_full_day<O: Occupancy + ?Sized>(index: &O, capacity: u32, range: DateRange) -> Option<Date> {
    range.days().find(|day| free_space(index, capacity, *day) == 0)
}

/// True when every day of `[start, end)` has a free slot. An empty range is always free.
pub fn is_range_free<O: Occupancy + ?Sized>(index: &O, capacity: u32, range: DateRange) -> bool {
    first_full_day(index, capacity, range).is_none()
}
