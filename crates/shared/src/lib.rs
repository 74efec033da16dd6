//! Wire types shared between the balance server and its clients.

pub mod api;

pub use api::*;
