// Booking price derivation shared by the destination, package and room flows
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const VAN_RENTAL_SURCHARGE: f64 = 2500.0;
pub const BOAT_TRANSFER_SURCHARGE: f64 = 1800.0;

// Flat VAT-style rate used on receipts only
pub const VAT_RATE: f64 = 0.12;

const SECONDS_PER_DAY: i64 = 86_400;

// Destination visit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TourType {
    DayTour,
    OvernightStay,
}

impl TourType {
    // Share of the destination budget this tour type costs
    pub fn budget_multiplier(self) -> f64 {
        match self {
            TourType::DayTour => 0.5,
            TourType::OvernightStay => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TourType::DayTour => "Day tour",
            TourType::OvernightStay => "Overnight stay",
        }
    }
}

// Transportation add-ons; anything the backend sends that we don't know is kept but costs nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transportation {
    VanRental,
    BoatTransfer,
    #[serde(other)]
    Unrecognized,
}

impl Transportation {
    pub fn surcharge(self) -> f64 {
        match self {
            Transportation::VanRental => VAN_RENTAL_SURCHARGE,
            Transportation::BoatTransfer => BOAT_TRANSFER_SURCHARGE,
            Transportation::Unrecognized => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Transportation::VanRental => "Van rental",
            Transportation::BoatTransfer => "Boat transfer",
            Transportation::Unrecognized => "Other transportation",
        }
    }
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

// Base part of a destination price before add-ons
pub fn tour_price(tour_type: Option<TourType>, budget: f64) -> f64 {
    tour_type.map_or(0.0, |t| sanitize_amount(budget) * t.budget_multiplier())
}

pub fn transportation_price(transportation: &BTreeSet<Transportation>) -> f64 {
    transportation.iter().map(|t| t.surcharge()).sum()
}

/// Total price of a destination booking for the given selections.
///
/// An unset tour type contributes nothing, so a draft with only add-ons
/// selected is priced at the add-ons alone.
pub fn destination_price(
    tour_type: Option<TourType>,
    budget: f64,
    transportation: &BTreeSet<Transportation>,
) -> f64 {
    tour_price(tour_type, budget) + transportation_price(transportation)
}

// Whole nights between two calendar dates, reversed ranges floor to zero
pub fn count_nights(check_in: NaiveDate, check_out: NaiveDate) -> u32 {
    let days = (check_out - check_in).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

// Same as count_nights but partial days are rounded up
pub fn count_nights_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> u32 {
    let seconds = (check_out - check_in).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    let nights = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(nights).unwrap_or(u32::MAX)
}

pub fn room_total(nights: u32, nightly_rate: f64) -> f64 {
    f64::from(nights) * sanitize_amount(nightly_rate)
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn tax(subtotal: f64) -> f64 {
    round_to_cents(subtotal * VAT_RATE)
}

pub fn grand_total(subtotal: f64) -> f64 {
    round_to_cents(subtotal + tax(subtotal))
}
