// Client-side core of the travel booking front-end: pricing, drafts, receipts and the backend client

pub mod api;
pub mod booking;
pub mod catalog;
pub mod chatbot;
pub mod config;
pub mod draft;
pub mod pricing;
pub mod receipt;
pub mod session;
pub mod suggest;

// Re-export key types for convenience
pub use api::{
    load_catalog, ApiError, BackendApi, CatalogResource, CatalogSnapshot, ClientError, ClientStats,
    HttpBackend,
};
pub use booking::{BookingError, BookingService};
pub use catalog::{
    paginate, Booking, BookingStatus, BookingTarget, CatalogFilter, Destination, HotelRoom, Package,
    Page, Role, User,
};
pub use chatbot::{FaqBot, FaqEntry};
pub use config::{ClientConfig, SuggestionConfig};
pub use draft::{CreateBookingRequest, DestinationDraft, DraftError, PackageDraft, RoomDraft};
pub use pricing::{TourType, Transportation};
pub use receipt::Receipt;
pub use session::{AuthTokens, FileTokenStore, MemoryTokenStore, SessionError, TokenStore};
pub use suggest::{SuggestionCache, Suggester};
