//! Application layer: one service per area of the admin panel.
//!
//! Every service holds the document store it was given at construction and
//! awaits each store call on the caller's task. `PaymentService` is the only
//! one with real consistency concerns; the others are thin facades that map
//! a single store operation to the shape the panel needs.

pub mod exams;
pub mod id_cards;
pub mod notifications;
pub mod payments;
pub mod questions;
pub mod results;
pub mod students;
pub mod syllabus;
