//! Level-code mapping for the external time-tracking system
//!
//! The workforce system tags every booking with a small set of numeric
//! "levels". The numbering is external configuration: the defaults below
//! match the vendor installation, but an instance can override individual
//! codes through its local mapping table.

use serde::{Deserialize, Serialize};

/// The booking dimensions the external system encodes as levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Customer,
    Activity,
    InvoicingType,
    SalesOrder,
    Material,
}

/// Maps booking dimensions to the external system's numeric level codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMap {
    pub customer: u8,
    pub activity: u8,
    pub invoicing_type: u8,
    pub sales_order: u8,
    pub material: u8,
}

impl Default for LevelMap {
    /// The vendor-standard numbering
    fn default() -> Self {
        Self {
            customer: 1,
            activity: 2,
            invoicing_type: 3,
            sales_order: 4,
            material: 7,
        }
    }
}

impl LevelMap {
    /// Returns the numeric code for a dimension
    pub fn code_for(&self, level: Level) -> u8 {
        match level {
            Level::Customer => self.customer,
            Level::Activity => self.activity,
            Level::InvoicingType => self.invoicing_type,
            Level::SalesOrder => self.sales_order,
            Level::Material => self.material,
        }
    }

    /// Resolves a numeric code back to a dimension, if mapped
    pub fn level_for(&self, code: u8) -> Option<Level> {
        [
            Level::Customer,
            Level::Activity,
            Level::InvoicingType,
            Level::SalesOrder,
            Level::Material,
        ]
        .into_iter()
        .find(|l| self.code_for(*l) == code)
    }

    /// Overrides a single dimension's code
    pub fn with_code(mut self, level: Level, code: u8) -> Self {
        match level {
            Level::Customer => self.customer = code,
            Level::Activity => self.activity = code,
            Level::InvoicingType => self.invoicing_type = code,
            Level::SalesOrder => self.sales_order = code,
            Level::Material => self.material = code,
        }
        self
    }
}
