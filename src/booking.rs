// Booking flow: validate a draft, hand it to the backend, derive the receipt
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, BackendApi};
use crate::catalog::Booking;
use crate::draft::{CreateBookingRequest, DestinationDraft, DraftError, LineItem, PackageDraft, RoomDraft};
use crate::receipt::Receipt;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Validation(#[from] DraftError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Booking {0} can no longer be cancelled")]
    NotCancellable(String),
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(e) => e.to_string(),
            BookingError::Api(e) => e.user_message(),
            BookingError::NotCancellable(_) => "Only upcoming bookings can be cancelled.".to_string(),
        }
    }
}

pub struct BookingService<B: BackendApi + ?Sized> {
    backend: Arc<B>,
}

impl<B: BackendApi + ?Sized> BookingService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    async fn submit(
        &self,
        request: CreateBookingRequest,
        line_items: Vec<LineItem>,
    ) -> Result<Receipt, BookingError> {
        let booking = self.backend.create_booking(&request).await.map_err(|e| {
            warn!("Booking for {} failed: {e}", request.target.item_id());
            e
        })?;
        info!(
            "Booking {} created for {} ({:.2})",
            booking.id,
            booking.target.item_id(),
            booking.total_price
        );
        Ok(Receipt::new(&booking, line_items))
    }

    pub async fn book_destination(
        &self,
        draft: &DestinationDraft,
        today: NaiveDate,
    ) -> Result<Receipt, BookingError> {
        let request = draft.to_request(today)?;
        self.submit(request, draft.line_items()).await
    }

    pub async fn book_package(
        &self,
        draft: &PackageDraft,
        today: NaiveDate,
    ) -> Result<Receipt, BookingError> {
        let request = draft.to_request(today)?;
        self.submit(request, draft.line_items()).await
    }

    pub async fn book_room(&self, draft: &RoomDraft, today: NaiveDate) -> Result<Receipt, BookingError> {
        let request = draft.to_request(today)?;
        self.submit(request, draft.line_items()).await
    }

    // Checked locally first; the backend still has the final say
    pub async fn cancel(&self, booking: &Booking) -> Result<Booking, BookingError> {
        if !booking.status.is_cancellable() {
            return Err(BookingError::NotCancellable(booking.id.clone()));
        }
        let cancelled = self.backend.cancel_booking(&booking.id).await?;
        info!("Booking {} cancelled", cancelled.id);
        Ok(cancelled)
    }

    pub async fn my_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.backend.my_bookings().await?)
    }
}
