//! Request and response data transfer objects

pub mod cycle;
pub mod ledger;
