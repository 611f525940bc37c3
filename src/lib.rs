//! Exploratory dashboard over the Pima Indians diabetes dataset.
//!
//! The data layer ([`data`]) loads one table and computes static views; the
//! [`session`] owns widget state and drives [`pipeline::recompute`] on every
//! widget event; [`ui`] and [`report`] render the result.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod state;
pub mod ui;
