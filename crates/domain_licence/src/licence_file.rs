//! Licence key file writer
//!
//! The terminal software at the customer site is unlocked by a small
//! key-value text file. The format is fixed by the installed readers:
//! `Key: Value` lines, CRLF terminated, module grants as `Module.<code>`
//! lines in alphabetical order so regenerated files compare equal.

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A granted module with its seat or device count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrant {
    pub code: String,
    pub count: u32,
}

/// The content of one licence key file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenceKeyFile {
    pub customer_code: String,
    pub customer_name: String,
    pub serial: String,
    pub valid_until: NaiveDate,
    pub modules: Vec<ModuleGrant>,
}

impl LicenceKeyFile {
    /// Renders the file content
    pub fn render(&self) -> String {
        let mut modules: Vec<&ModuleGrant> = self.modules.iter().collect();
        modules.sort_by(|a, b| a.code.cmp(&b.code));

        let mut out = String::new();
        let _ = write!(out, "Customer: {}\r\n", self.customer_code);
        let _ = write!(out, "Name: {}\r\n", self.customer_name);
        let _ = write!(out, "Serial: {}\r\n", self.serial);
        let _ = write!(out, "ValidUntil: {}\r\n", self.valid_until.format("%Y-%m-%d"));
        for module in modules {
            let _ = write!(out, "Module.{}: {}\r\n", module.code, module.count);
        }
        out
    }
}
