pub mod client;
pub mod error;
pub mod extract;
pub mod geocode;
mod markup;
pub mod retry;

pub use client::CalendarClient;
pub use error::ScraperError;
pub use extract::extract_events;
pub use geocode::{CacheEntry, GeocodeCache, GeocodeStats, Geocoder, GeocoderSettings};
pub use retry::RetryPolicy;
