use crate::limits::*;
use crate::model::*;

use super::validation::validate_range;
use super::{Engine, EngineError};

impl Engine {
    pub async fn capacity(&self) -> u32 {
        self.bookings.read().await.capacity()
    }

    pub async fn free_space(&self, date: Date) -> u32 {
        self.bookings.read().await.free_space(date)
    }

    pub async fn free_space_today(&self) -> u32 {
        self.bookings.read().await.free_space_today()
    }

    /// True iff every day of `[start, end)` has a free place.
    pub async fn is_kennel_free(&self, start: Date, end: Date) -> bool {
        self.bookings.read().await.is_kennel_free(start, end)
    }

    /// Stored bookings in insertion order.
    pub async fn list_bookings(&self) -> Vec<KennelBooking> {
        self.bookings.read().await.bookings().to_vec()
    }

    pub async fn saturated_ranges(&self, start: Date, end: Date) -> Result<Vec<DateRange>, EngineError> {
        validate_range(&DateRange::new(start, end), MAX_QUERY_DAYS, "query window too long")?;
        Ok(self.bookings.read().await.saturated_ranges(start, end))
    }

    pub async fn daily_free_space(&self, start: Date, end: Date) -> Result<Vec<(Date, u32)>, EngineError> {
        validate_range(&DateRange::new(start, end), MAX_QUERY_DAYS, "query window too long")?;
        Ok(self.bookings.read().await.daily_free_space(start, end))
    }
}
