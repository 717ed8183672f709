//! API endpoint implementations.

mod announcements;
mod auth;
mod book;
mod calendar;
mod gallery;
mod leaders;

pub use announcements::AnnouncementsApi;
pub use auth::AuthApi;
pub use book::BookApi;
pub use calendar::{CalendarApi, ListEventsQuery};
pub use gallery::{GalleryApi, ListGalleryQuery};
pub use leaders::LeadersApi;
