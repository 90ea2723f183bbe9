//! HTTP routes
//!
//! One module per resource; each exposes a `router()` merged in `main`.

pub mod hash;
pub mod health;
pub mod uploads;
pub mod verify;
