// Display-only receipt for a confirmed booking. Nothing here is sent back to the backend.
use chrono::{DateTime, NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

use crate::catalog::{Booking, BookingStatus};
use crate::draft::LineItem;
use crate::pricing;

const RECEIPT_PREFIX: &str = "RCPT-";
const RECEIPT_SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub receipt_number: String,
    pub booking_id: String,
    pub status: BookingStatus,
    pub issued_at: DateTime<Utc>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub line_items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub grand_total: f64,
}

pub fn generate_receipt_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RECEIPT_SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("{}{}", RECEIPT_PREFIX, suffix)
}

impl Receipt {
    pub fn new(booking: &Booking, line_items: Vec<LineItem>) -> Self {
        Self::issued_at(booking, line_items, Utc::now())
    }

    pub fn issued_at(booking: &Booking, line_items: Vec<LineItem>, issued_at: DateTime<Utc>) -> Self {
        let subtotal = pricing::round_to_cents(line_items.iter().map(|item| item.amount).sum());

        Self {
            receipt_number: generate_receipt_number(),
            booking_id: booking.id.clone(),
            status: booking.status,
            issued_at,
            start_date: booking.start_date,
            end_date: booking.end_date,
            line_items,
            subtotal,
            tax: pricing::tax(subtotal),
            grand_total: pricing::grand_total(subtotal),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(48);
        writeln!(f, "Receipt {}", self.receipt_number)?;
        writeln!(f, "Booking {} ({:?})", self.booking_id, self.status)?;
        writeln!(f, "Issued {}", self.issued_at.format("%Y-%m-%d %H:%M UTC"))?;
        match self.end_date {
            Some(end) => writeln!(f, "Dates  {} to {}", self.start_date, end)?,
            None => writeln!(f, "Date   {}", self.start_date)?,
        }
        writeln!(f, "{rule}")?;
        for item in &self.line_items {
            writeln!(f, "{:<36}{:>12.2}", item.description, item.amount)?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<36}{:>12.2}", "Subtotal", self.subtotal)?;
        writeln!(f, "{:<36}{:>12.2}", "VAT (12%)", self.tax)?;
        writeln!(f, "{:<36}{:>12.2}", "Total", self.grand_total)
    }
}
