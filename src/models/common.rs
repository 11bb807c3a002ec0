//! Common domain primitives shared by input entities, runtime state and records.

#[cfg(test)]
#[path = "../../tests/unit/models/common_test.rs"]
mod common_test;

use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};

/// Specifies a location id type.
pub type LocationId = usize;

/// Specifies a vehicle id type.
pub type VehicleId = usize;

/// Specifies a route id type.
pub type RouteId = usize;

/// Specifies a monetary cost value (PLN).
pub type Cost = f64;

/// Represents a distance in kilometers, fractional.
pub type Distance = f64;

/// Represents kilometers entering odometer counters, always whole.
pub type Kilometers = i64;

/// Represents a point in time.
pub type DateTime = OffsetDateTime;

/// Rounds a raw route or relocation distance to whole kilometers at the moment
/// it is added to state counters.
#[inline]
pub fn round_km(distance: Distance) -> Kilometers {
    distance.round() as Kilometers
}

/// Converts fractional hours to a time duration.
#[inline]
pub fn hours(value: f64) -> Duration {
    Duration::seconds_f64(value * 3600.)
}

/// Converts whole days to a time duration.
#[inline]
pub fn days(value: i64) -> Duration {
    Duration::days(value)
}

/// Advances a datetime by one lease year keeping month and day.
/// Feb 29 is clamped to Feb 28 on non-leap years.
pub fn add_lease_year(value: DateTime) -> DateTime {
    let date = value.date();
    let rolled = Date::from_calendar_date(date.year() + 1, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(date.year() + 1, date.month(), 28))
        .expect("clamped calendar date is always valid");

    value.replace_date(rolled)
}

/// Formats a datetime as RFC 3339 for logs and records.
pub fn format_time(value: DateTime) -> String {
    value.format(&Rfc3339).unwrap_or_else(|_| value.to_string())
}
