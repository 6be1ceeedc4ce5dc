//! Request handlers

pub mod calendar;
pub mod cycle;
pub mod health;
pub mod ledger;
