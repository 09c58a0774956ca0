//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod concierge;
pub mod health;
