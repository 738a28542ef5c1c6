use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ── Calendar ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateError {
    pub day: u8,
    pub month: u8,
    pub year: i32,
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date: {}.{}.{}", self.day, self.month, self.year)
    }
}

impl std::error::Error for DateError {}

/// A whole calendar day in the proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDate", into = "RawDate")]
pub struct Date(NaiveDate);

/// Wire shape of a `Date`; validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawDate {
    day: u8,
    month: u8,
    year: i32,
}

impl TryFrom<RawDate> for Date {
    type Error = DateError;

    fn try_from(raw: RawDate) -> Result<Self, Self::Error> {
        Date::new(raw.day, raw.month, raw.year)
    }
}

impl From<Date> for RawDate {
    fn from(d: Date) -> Self {
        RawDate {
            day: d.day(),
            month: d.month(),
            year: d.year(),
        }
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

impl From<Date> for NaiveDate {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl Date {
    pub fn new(day: u8, month: u8, year: i32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month.into(), day.into())
            .map(Self)
            .ok_or(DateError { day, month, year })
    }

    /// The host's current local date.
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    pub fn day(&self) -> u8 {
        self.0.day() as u8
    }

    pub fn month(&self) -> u8 {
        self.0.month() as u8
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The following calendar day. `None` only at the end of chrono's range.
    pub fn next_day(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    pub fn is_before(&self, other: &Date) -> bool {
        self < other
    }

    /// True if `self` lies in the half-open range `[start, end)`.
    pub fn is_date_between(&self, start: Date, end: Date) -> bool {
        DateRange::new(start, end).contains(*self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.day(), self.month(), self.year())
    }
}

/// Half-open range of days `[start, end)`.
///
/// Empty when `start >= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Each day of the range in order, one fresh value per step.
    pub fn days(&self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }

    /// Number of days, counting at most `limit + 1` so callers can bound long ranges cheaply.
    pub fn len_days_capped(&self, limit: usize) -> usize {
        self.days().take(limit.saturating_add(1)).count()
    }
}

impl IntoIterator for DateRange {
    type Item = Date;
    type IntoIter = Days;

    fn into_iter(self) -> Days {
        self.days()
    }
}

pub struct Days {
    next: Option<Date>,
    end: Date,
}

impl Iterator for Days {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next.filter(|d| *d < self.end)?;
        self.next = current.next_day();
        Some(current)
    }
}

// ── Booking record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    pub phone_number: String,
}

impl CustomerRef {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }
}

impl fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetClass {
    Cat,
    Dog,
    Rodent,
    Bird,
    Fish,
}

/// Whether the shop holds a pet as a boarding guest or as stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PetPurpose {
    Kennel,
    ForSale,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetRef {
    pub name: String,
    pub class: PetClass,
    pub purpose: PetPurpose,
}

impl PetRef {
    pub fn new(name: impl Into<String>, class: PetClass, purpose: PetPurpose) -> Self {
        Self {
            name: name.into(),
            class,
            purpose,
        }
    }
}

impl fmt::Display for PetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.name, self.class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    Negative,
    NotFinite,
    TooLarge,
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceError::Negative => f.write_str("price must not be negative"),
            PriceError::NotFinite => f.write_str("price must be a finite number"),
            PriceError::TooLarge => f.write_str("price too large"),
        }
    }
}

impl std::error::Error for PriceError {}

/// Non-negative amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn from_decimal(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount < 0.0 {
            return Err(PriceError::Negative);
        }
        let cents = (amount * 100.0).round();
        // `u64::MAX as f64` is 2^64, the first value that no longer fits
        if cents >= u64::MAX as f64 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(cents as u64))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// One stay in the kennel. Replaced wholesale on edit, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KennelBooking {
    customer: CustomerRef,
    pet: PetRef,
    start: Date,
    end: Date,
    price: Price,
}

impl KennelBooking {
    pub fn new(customer: CustomerRef, pet: PetRef, start: Date, end: Date, price: Price) -> Self {
        Self {
            customer,
            pet,
            start,
            end,
            price,
        }
    }

    pub fn customer(&self) -> &CustomerRef {
        &self.customer
    }

    pub fn pet(&self) -> &PetRef {
        &self.pet
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Days the booking occupies a slot: check-in day counts, check-out day does not.
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    pub fn same_dates(&self, other: &KennelBooking) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl fmt::Display for KennelBooking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dates: {} - {} Pet: {} Customer: {} Price: {}",
            self.start, self.end, self.pet.name, self.customer.name, self.price
        )
    }
}

/// Committed booking changes. This is the journal record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BookingAdded {
        booking: KennelBooking,
    },
    BookingRemoved {
        booking: KennelBooking,
    },
    BookingEdited {
        old: KennelBooking,
        new: KennelBooking,
    },
    /// Full replacement of the store; also the compacted journal image.
    Restored {
        bookings: Vec<KennelBooking>,
    },
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn d(day: u8, month: u8, year: i32) -> Date {
        Date::new(day, month, year).unwrap()
    }

    pub fn booking(start: Date, end: Date) -> KennelBooking {
        booking_for("Rex", start, end)
    }

    pub fn booking_for(pet: &str, start: Date, end: Date) -> KennelBooking {
        KennelBooking::new(
            CustomerRef::new("Ana Popescu", "+45 1234 5678"),
            PetRef::new(pet, PetClass::Dog, PetPurpose::Kennel),
            start,
            end,
            Price::from_cents(25_000),
        )
    }
}
