//! Customer records and the directory port

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, PortError};

use crate::tax::TaxRegion;

/// A billable customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    /// External code used by the time-tracking system (level 1)
    pub code: String,
    pub name: String,
    pub tax_region: TaxRegion,
    /// Disabled customers are never billed and are deactivated in the
    /// external system
    #[serde(default)]
    pub disabled: bool,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        code: impl Into<String>,
        name: impl Into<String>,
        tax_region: TaxRegion,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            tax_region,
            disabled: false,
        }
    }
}

/// Lookup port for customer records
pub trait CustomerDirectory: Send + Sync {
    /// Fetches a customer by id
    fn customer(&self, id: &CustomerId) -> Result<Customer, PortError>;

    /// Fetches a customer by its external code
    fn customer_by_code(&self, code: &str) -> Result<Customer, PortError>;
}

/// In-process customer directory
#[derive(Debug, Default)]
pub struct MemoryCustomerDirectory {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl MemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: Customer) {
        self.customers
            .write()
            .expect("directory lock poisoned")
            .insert(customer.id, customer);
    }
}

impl CustomerDirectory for MemoryCustomerDirectory {
    fn customer(&self, id: &CustomerId) -> Result<Customer, PortError> {
        self.customers
            .read()
            .expect("directory lock poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Customer", id))
    }

    fn customer_by_code(&self, code: &str) -> Result<Customer, PortError> {
        self.customers
            .read()
            .expect("directory lock poisoned")
            .values()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(|| PortError::not_found("Customer", code))
    }
}
