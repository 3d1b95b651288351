//! HTTP handlers of the reference service.

pub mod products;
pub mod users;
