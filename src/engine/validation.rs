use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// A booking as submitted from the booking form, before any checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub customer: CustomerRef,
    pub pet: PetRef,
    pub start: Date,
    pub end: Date,
    pub price: Price,
}

impl From<&KennelBooking> for BookingRequest {
    fn from(b: &KennelBooking) -> Self {
        Self {
            customer: b.customer().clone(),
            pet: b.pet().clone(),
            start: b.start(),
            end: b.end(),
            price: b.price(),
        }
    }
}

/// Field-level checks the booking form performs before the store sees a request.
///
/// The store itself only enforces capacity; zero-length and inverted ranges
/// stop here.
pub(crate) fn validate_request(request: BookingRequest) -> Result<KennelBooking, EngineError> {
    if !request.start.is_before(&request.end) {
        return Err(EngineError::InvalidRequest("start date must be before end date"));
    }
    if request.pet.purpose != PetPurpose::Kennel {
        return Err(EngineError::InvalidRequest("pet is not a kennel guest"));
    }
    validate_name(&request.customer.name, "customer name is empty", "customer name too long")?;
    validate_name(&request.pet.name, "pet name is empty", "pet name too long")?;
    validate_range(&DateRange::new(request.start, request.end), MAX_BOOKING_DAYS, "stay too long")?;

    Ok(KennelBooking::new(
        request.customer,
        request.pet,
        request.start,
        request.end,
        request.price,
    ))
}

pub(crate) fn validate_range(range: &DateRange, max_days: usize, msg: &'static str) -> Result<(), EngineError> {
    if range.len_days_capped(max_days) > max_days {
        return Err(EngineError::LimitExceeded(msg));
    }
    Ok(())
}

fn validate_name(name: &str, empty: &'static str, too_long: &'static str) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidRequest(empty));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded(too_long));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;

    fn request(start: Date, end: Date) -> BookingRequest {
        BookingRequest::from(&booking(start, end))
    }

    #[test]
    fn accepts_well_formed_request() {
        let b = validate_request(request(d(1, 3, 2025), d(5, 3, 2025))).unwrap();
        assert_eq!(b, booking(d(1, 3, 2025), d(5, 3, 2025)));
    }

    #[test]
    fn rejects_zero_length_and_inverted() {
        let day = d(1, 3, 2025);
        assert!(matches!(
            validate_request(request(day, day)),
            Err(EngineError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate_request(request(d(5, 3, 2025), day)),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_pet_for_sale() {
        let mut req = request(d(1, 3, 2025), d(5, 3, 2025));
        req.pet.purpose = PetPurpose::ForSale;
        let err = validate_request(req).unwrap_err();
        assert!(err.to_string().contains("not a kennel guest"));
    }

    #[test]
    fn rejects_blank_and_long_names() {
        let mut req = request(d(1, 3, 2025), d(5, 3, 2025));
        req.customer.name = "  ".into();
        assert!(matches!(
            validate_request(req),
            Err(EngineError::InvalidRequest("customer name is empty"))
        ));

        let mut req = request(d(1, 3, 2025), d(5, 3, 2025));
        req.pet.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            validate_request(req),
            Err(EngineError::LimitExceeded("pet name too long"))
        ));
    }

    #[test]
    fn rejects_overlong_stay() {
        let req = request(d(1, 1, 2025), d(1, 1, 2027));
        assert!(matches!(
            validate_request(req),
            Err(EngineError::LimitExceeded("stay too long"))
        ));
        // A full leap year is within the limit
        assert!(validate_request(request(d(1, 1, 2024), d(1, 1, 2025))).is_ok());
    }
}
