// In-progress booking choices for the destination, package and hotel room flows.
// Totals are derived: every setter recomputes them, nothing else writes them.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::catalog::{BookingTarget, Destination, HotelRoom, Package};
use crate::pricing::{self, TourType, Transportation};

// Display strings are the inline messages shown next to the form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please select a tour type.")]
    MissingTourType,

    #[error("Please select a start date.")]
    MissingStartDate,

    #[error("Please select check-in and check-out dates.")]
    MissingDateRange,

    #[error("Check-out must be at least one night after check-in.")]
    EmptyStay,

    #[error("The selected date has already passed.")]
    DateInPast,

    #[error("Please enter the guest name.")]
    MissingGuestName,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a contact number.")]
    MissingPhone,

    #[error("This item can no longer be booked.")]
    MissingItemId,
}

// Payload POSTed to the backend when a draft is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub target: BookingTarget,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    // Client estimate; the backend prices the booking itself
    pub total_price: f64,
}

// A priced line on the receipt
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

fn check_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), DraftError> {
    if date < today {
        return Err(DraftError::DateInPast);
    }
    Ok(())
}

fn item_id(id: &Option<String>) -> Result<String, DraftError> {
    id.clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or(DraftError::MissingItemId)
}

#[derive(Debug, Clone)]
pub struct DestinationDraft {
    destination_id: Option<String>,
    destination_name: String,
    budget: f64,
    tour_type: Option<TourType>,
    transportation: BTreeSet<Transportation>,
    start_date: Option<NaiveDate>,
    total_price: f64,
}

impl DestinationDraft {
    pub fn new(destination: &Destination) -> Self {
        Self {
            destination_id: destination.id.clone(),
            destination_name: destination.name.clone(),
            budget: destination.budget,
            tour_type: None,
            transportation: BTreeSet::new(),
            start_date: None,
            total_price: 0.0,
        }
    }

    fn recompute(&mut self) {
        self.total_price =
            pricing::destination_price(self.tour_type, self.budget, &self.transportation);
    }

    pub fn set_tour_type(&mut self, tour_type: Option<TourType>) {
        self.tour_type = tour_type;
        self.recompute();
    }

    // Checkbox semantics: returns whether the option is now selected
    pub fn toggle_transportation(&mut self, option: Transportation) -> bool {
        let selected = if self.transportation.remove(&option) {
            false
        } else {
            self.transportation.insert(option)
        };
        self.recompute();
        selected
    }

    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
    }

    pub fn reset(&mut self) {
        self.tour_type = None;
        self.transportation.clear();
        self.start_date = None;
        self.recompute();
    }

    pub fn tour_type(&self) -> Option<TourType> {
        self.tour_type
    }

    pub fn transportation(&self) -> &BTreeSet<Transportation> {
        &self.transportation
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), DraftError> {
        if self.tour_type.is_none() {
            return Err(DraftError::MissingTourType);
        }
        let start = self.start_date.ok_or(DraftError::MissingStartDate)?;
        check_not_past(start, today)
    }

    pub fn to_request(&self, today: NaiveDate) -> Result<CreateBookingRequest, DraftError> {
        self.validate(today)?;
        let tour_type = self.tour_type.ok_or(DraftError::MissingTourType)?;
        let start_date = self.start_date.ok_or(DraftError::MissingStartDate)?;

        Ok(CreateBookingRequest {
            target: BookingTarget::Destination {
                destination_id: item_id(&self.destination_id)?,
                tour_type,
                transportation: self.transportation.iter().copied().collect(),
            },
            start_date,
            end_date: None,
            total_price: self.total_price,
        })
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        let mut items = Vec::new();
        if let Some(tour_type) = self.tour_type {
            items.push(LineItem {
                description: format!("{} - {}", self.destination_name, tour_type.label()),
                amount: pricing::tour_price(Some(tour_type), self.budget),
            });
        }
        for option in &self.transportation {
            items.push(LineItem {
                description: option.label().to_string(),
                amount: option.surcharge(),
            });
        }
        items
    }
}

#[derive(Debug, Clone)]
pub struct PackageDraft {
    package_id: Option<String>,
    package_name: String,
    duration_days: u32,
    price: f64,
    start_date: Option<NaiveDate>,
}

impl PackageDraft {
    pub fn new(package: &Package) -> Self {
        Self {
            package_id: package.id.clone(),
            package_name: package.name.clone(),
            duration_days: package.duration_days,
            price: package.price,
            start_date: None,
        }
    }

    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
    }

    pub fn reset(&mut self) {
        self.start_date = None;
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    // Packages are sold at a fixed price
    pub fn total_price(&self) -> f64 {
        self.price.max(0.0)
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), DraftError> {
        let start = self.start_date.ok_or(DraftError::MissingStartDate)?;
        check_not_past(start, today)
    }

    pub fn to_request(&self, today: NaiveDate) -> Result<CreateBookingRequest, DraftError> {
        self.validate(today)?;
        let start_date = self.start_date.ok_or(DraftError::MissingStartDate)?;
        let end_date = start_date
            .checked_add_days(chrono::Days::new(u64::from(self.duration_days)));

        Ok(CreateBookingRequest {
            target: BookingTarget::Package {
                package_id: item_id(&self.package_id)?,
            },
            start_date,
            end_date,
            total_price: self.total_price(),
        })
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        vec![LineItem {
            description: format!("{} ({} days)", self.package_name, self.duration_days),
            amount: self.total_price(),
        }]
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuestContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl GuestContact {
    fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingGuestName);
        }
        if !looks_like_email(self.email.trim()) {
            return Err(DraftError::InvalidEmail);
        }
        if self.phone.trim().is_empty() {
            return Err(DraftError::MissingPhone);
        }
        Ok(())
    }
}

// Loose shape check only; the backend does the real verification
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct RoomDraft {
    room_id: Option<String>,
    hotel_name: String,
    room_type: String,
    nightly_rate: f64,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    nights: u32,
    total_price: f64,
    pub guest: GuestContact,
}

impl RoomDraft {
    pub fn new(room: &HotelRoom) -> Self {
        Self {
            room_id: room.id.clone(),
            hotel_name: room.hotel_name.clone(),
            room_type: room.room_type.clone(),
            nightly_rate: room.price_per_night,
            check_in: None,
            check_out: None,
            nights: 0,
            total_price: 0.0,
            guest: GuestContact::default(),
        }
    }

    fn recompute(&mut self) {
        self.nights = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => pricing::count_nights(check_in, check_out),
            _ => 0,
        };
        self.total_price = pricing::room_total(self.nights, self.nightly_rate);
    }

    pub fn set_date_range(&mut self, check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) {
        self.check_in = check_in;
        self.check_out = check_out;
        self.recompute();
    }

    pub fn clear_date_range(&mut self) {
        self.set_date_range(None, None);
    }

    pub fn reset(&mut self) {
        self.guest = GuestContact::default();
        self.clear_date_range();
    }

    pub fn check_in(&self) -> Option<NaiveDate> {
        self.check_in
    }

    pub fn check_out(&self) -> Option<NaiveDate> {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        self.nights
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), DraftError> {
        let check_in = self.check_in.ok_or(DraftError::MissingDateRange)?;
        if self.check_out.is_none() {
            return Err(DraftError::MissingDateRange);
        }
        if self.nights == 0 {
            return Err(DraftError::EmptyStay);
        }
        check_not_past(check_in, today)?;
        self.guest.validate()
    }

    pub fn to_request(&self, today: NaiveDate) -> Result<CreateBookingRequest, DraftError> {
        self.validate(today)?;
        let check_in = self.check_in.ok_or(DraftError::MissingDateRange)?;

        Ok(CreateBookingRequest {
            target: BookingTarget::HotelRoom {
                room_id: item_id(&self.room_id)?,
                guest_name: self.guest.name.trim().to_string(),
                guest_email: self.guest.email.trim().to_string(),
                guest_phone: self.guest.phone.trim().to_string(),
            },
            start_date: check_in,
            end_date: self.check_out,
            total_price: self.total_price,
        })
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        vec![LineItem {
            description: format!(
                "{} {} - {} night(s) x {:.2}",
                self.hotel_name, self.room_type, self.nights, self.nightly_rate
            ),
            amount: self.total_price,
        }]
    }
}
