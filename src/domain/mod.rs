//! Domain types and the ports the application layer depends on.

pub mod document;
pub mod exam;
pub mod id_card;
pub mod payment;
pub mod ports;
pub mod upload;
