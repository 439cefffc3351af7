// Catalog records as the booking backend returns them, plus client-side filtering and paging
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::{TourType, Transportation};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub budget: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub hotel_name: String,
    pub room_type: String,
    pub location: String,
    pub price_per_night: f64,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub rating: f64,
}

fn default_capacity() -> u32 {
    2
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub destinations: Vec<String>,
    pub duration_days: u32,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Lifecycle is driven by the backend; the client only reads it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_cancellable(self) -> bool {
        self == BookingStatus::Upcoming
    }
}

// What a booking was made against
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BookingTarget {
    #[serde(rename_all = "camelCase")]
    Destination {
        destination_id: String,
        tour_type: TourType,
        #[serde(default)]
        transportation: Vec<Transportation>,
    },
    #[serde(rename_all = "camelCase")]
    Package { package_id: String },
    #[serde(rename_all = "camelCase")]
    HotelRoom {
        room_id: String,
        guest_name: String,
        guest_email: String,
        guest_phone: String,
    },
}

impl BookingTarget {
    pub fn item_id(&self) -> &str {
        match self {
            BookingTarget::Destination { destination_id, .. } => destination_id,
            BookingTarget::Package { package_id } => package_id,
            BookingTarget::HotelRoom { room_id, .. } => room_id,
        }
    }
}

// Authoritative booking record returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub target: BookingTarget,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub total_price: f64,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// Common view over listing items used by filtering
pub trait Listing {
    fn display_name(&self) -> &str;
    fn location(&self) -> &str;
    fn listed_price(&self) -> f64;
    fn rating(&self) -> f64;
}

impl Listing for Destination {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn listed_price(&self) -> f64 {
        self.budget
    }

    fn rating(&self) -> f64 {
        self.rating
    }
}

impl Listing for HotelRoom {
    fn display_name(&self) -> &str {
        &self.hotel_name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn listed_price(&self) -> f64 {
        self.price_per_night
    }

    fn rating(&self) -> f64 {
        self.rating
    }
}

impl Listing for Package {
    fn display_name(&self) -> &str {
        &self.name
    }

    // Packages span several destinations; the first one stands in for the location
    fn location(&self) -> &str {
        self.destinations.first().map_or("", String::as_str)
    }

    fn listed_price(&self) -> f64 {
        self.price
    }

    fn rating(&self) -> f64 {
        self.rating
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub location_contains: Option<String>,
    pub name_contains: Option<String>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

impl CatalogFilter {
    pub fn matches<T: Listing>(&self, item: &T) -> bool {
        if !self.max_price.map_or(true, |max| item.listed_price() <= max) {
            return false;
        }

        if !self.min_rating.map_or(true, |min| item.rating() >= min) {
            return false;
        }

        if !self
            .location_contains
            .as_ref()
            .map_or(true, |loc| contains_ignore_case(item.location(), loc))
        {
            return false;
        }

        self.name_contains
            .as_ref()
            .map_or(true, |name| contains_ignore_case(item.display_name(), name))
    }

    pub fn apply<T: Listing + Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().filter(|item| self.matches(*item)).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    // 1-based, clamped to the available pages
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}
