//! UI layer for desktop GUI: booking form, appointment list, and status banner.

pub mod app;

pub use app::BookingApp;
