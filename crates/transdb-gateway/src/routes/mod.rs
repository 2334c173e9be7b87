//! HTTP route handlers.

pub mod domains;
pub mod health;
pub mod languages;
pub mod translations;
