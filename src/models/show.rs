//! Screening identity and seat selection.
//!
//! A screening is never stored as its own row. Its identity, the [`ShowKey`],
//! is the tuple under which seat occupancy is evaluated:
//! movie, calendar date, time of day, location and cinema.
//!
//! Both types here are parsed from raw request input and are the only way the
//! booking service receives show and seat data, so every value reaching the
//! database has already been validated and normalized.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

use crate::error::AppError;

/// Longest seat label accepted (matches the `booking_seats.seat_label` check).
pub const MAX_SEAT_LABEL_LEN: usize = 8;

/// Composite identity of a single screening.
///
/// # Normalization
///
/// - `show_time` accepts `HH:MM` or `HH:MM:SS` (24-hour) and is held as a
///   [`NaiveTime`] with whole seconds, so `19:30` and `19:30:00` are equal.
/// - `location` and `cinema` keep their trimmed display form; comparisons use
///   [`ShowKey::location_key`] / [`ShowKey::cinema_key`], which are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowKey {
    movie_id: i64,
    show_date: NaiveDate,
    show_time: NaiveTime,
    location: String,
    cinema: String,
}

impl ShowKey {
    /// Parse and validate raw show identity fields.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the movie id is not positive, the date is not
    /// `YYYY-MM-DD`, the time is not `HH:MM[:SS]`, or location/cinema are blank.
    pub fn parse(
        movie_id: i64,
        show_date: &str,
        show_time: &str,
        location: &str,
        cinema: &str,
    ) -> Result<Self, AppError> {
        if movie_id <= 0 {
            return Err(AppError::InvalidRequest("Invalid movie_id".to_string()));
        }

        let show_date = parse_show_date(show_date)?;
        let show_time = parse_show_time(show_time)?;

        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::InvalidRequest("location is required".to_string()));
        }

        let cinema = cinema.trim();
        if cinema.is_empty() {
            return Err(AppError::InvalidRequest("cinema is required".to_string()));
        }

        Ok(Self {
            movie_id,
            show_date,
            show_time,
            location: location.to_string(),
            cinema: cinema.to_string(),
        })
    }

    pub fn movie_id(&self) -> i64 {
        self.movie_id
    }

    pub fn show_date(&self) -> NaiveDate {
        self.show_date
    }

    pub fn show_time(&self) -> NaiveTime {
        self.show_time
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn cinema(&self) -> &str {
        &self.cinema
    }

    /// Case-insensitive comparison key for the location.
    pub fn location_key(&self) -> String {
        self.location.to_lowercase()
    }

    /// Case-insensitive comparison key for the cinema.
    pub fn cinema_key(&self) -> String {
        self.cinema.to_lowercase()
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_show_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidRequest("Invalid show_date format".to_string()))
}

/// Parse a 24-hour `HH:MM` or `HH:MM:SS` time of day.
///
/// Both forms normalize to the same value: `"09:05"` equals `"09:05:00"`.
/// Hours above 23, minutes/seconds above 59 and leap seconds are rejected.
pub fn parse_show_time(raw: &str) -> Result<NaiveTime, AppError> {
    let invalid = || AppError::InvalidRequest("Invalid show_time format".to_string());
    let raw = raw.trim();

    let format = match time_shape(raw) {
        Some(TimeShape::HourMinute) => "%H:%M",
        Some(TimeShape::HourMinuteSecond) => "%H:%M:%S",
        None => return Err(invalid()),
    };

    let time = NaiveTime::parse_from_str(raw, format).map_err(|_| invalid())?;

    // chrono accepts ":60" as a leap second
    if time.nanosecond() >= 1_000_000_000 {
        return Err(invalid());
    }

    Ok(time)
}

enum TimeShape {
    HourMinute,
    HourMinuteSecond,
}

/// Two-digit groups separated by colons: `dd:dd` or `dd:dd:dd`.
fn time_shape(raw: &str) -> Option<TimeShape> {
    let groups: Vec<&str> = raw.split(':').collect();
    let two_digits = |g: &&str| g.len() == 2 && g.bytes().all(|b| b.is_ascii_digit());

    if !groups.iter().all(two_digits) {
        return None;
    }

    match groups.len() {
        2 => Some(TimeShape::HourMinute),
        3 => Some(TimeShape::HourMinuteSecond),
        _ => None,
    }
}

/// Validated, ordered list of seats requested for one booking.
///
/// Labels are trimmed and uppercased (`" a1 "` becomes `"A1"`). Duplicates in a
/// single request are rejected rather than silently merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSelection {
    labels: Vec<String>,
}

impl SeatSelection {
    /// Validate the seats of a booking request.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the list is empty, a label is blank or longer than
    /// [`MAX_SEAT_LABEL_LEN`], or the same seat appears twice.
    pub fn parse(seats: Vec<String>) -> Result<Self, AppError> {
        if seats.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one seat is required".to_string(),
            ));
        }

        let mut labels: Vec<String> = Vec::with_capacity(seats.len());
        for seat in seats {
            let label = normalize_seat_label(&seat)?;
            if labels.contains(&label) {
                return Err(AppError::InvalidRequest(format!(
                    "Seat {label} is listed more than once"
                )));
            }
            labels.push(label);
        }

        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    /// Total price of the booking: seat count times per-seat price.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` when the price is not positive or the total overflows.
    pub fn total_price(&self, price_per_seat: i64) -> Result<i64, AppError> {
        if price_per_seat <= 0 {
            return Err(AppError::InvalidRequest(
                "price_per_seat must be positive".to_string(),
            ));
        }

        i64::try_from(self.labels.len())
            .ok()
            .and_then(|count| count.checked_mul(price_per_seat))
            .ok_or_else(|| AppError::InvalidRequest("Total price is too large".to_string()))
    }
}

/// Parse the optional seat filter of an availability check.
///
/// Accepts a comma-separated list (`"A1,A2"`); blank entries are skipped and
/// an absent or empty filter yields an empty list, meaning "all occupied seats".
pub fn parse_seat_filter(raw: Option<&str>) -> Result<Vec<String>, AppError> {
    let mut labels: Vec<String> = Vec::new();

    for part in raw.unwrap_or_default().split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let label = normalize_seat_label(part)?;
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    Ok(labels)
}

fn normalize_seat_label(raw: &str) -> Result<String, AppError> {
    let label = raw.trim().to_uppercase();

    if label.is_empty() {
        return Err(AppError::InvalidRequest(
            "Seat labels must not be empty".to_string(),
        ));
    }
    if label.chars().count() > MAX_SEAT_LABEL_LEN {
        return Err(AppError::InvalidRequest(format!(
            "Seat label {label} is longer than {MAX_SEAT_LABEL_LEN} characters"
        )));
    }

    Ok(label)
}
