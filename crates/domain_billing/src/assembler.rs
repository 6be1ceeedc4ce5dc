//! Invoice assembler
//!
//! Groups line items into draft invoices for one customer and persists them
//! through the invoice store. The assembler owns three policies:
//!
//! - **Bill-to resolution**: a retailer on the request redirects the bill
//!   while the end customer's name is preserved in the remarks.
//! - **Tax routing**: template and income account come from the bill-to
//!   party's tax region via the [`TaxPolicy`] table.
//! - **Duplicate protection**: every insert carries an idempotency key; a
//!   key the store has already seen makes the call a no-op (`Ok(None)`),
//!   which is what makes batch re-runs safe.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info};

use core_kernel::{Currency, CustomerId, InvoiceId, PortError, Rate};

use crate::customer::CustomerDirectory;
use crate::error::BillingError;
use crate::invoice::{InvoiceDraft, LineItem};
use crate::tax::TaxPolicy;

/// Request to build one or more invoices for a customer
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub customer: CustomerId,
    /// Redirects the bill to a retailer while keeping the customer on record
    pub retailer: Option<CustomerId>,
    pub currency: Currency,
    pub items: Vec<LineItem>,
    pub overall_discount: Rate,
    pub remarks: String,
    /// When set, items are split by group into one invoice per group
    pub invoice_separately: bool,
    /// Base idempotency key; the group name is appended per split invoice
    pub idempotency_key: String,
}

/// Persistence seam for draft invoices
///
/// The host accounting system sits behind this trait; the in-memory
/// implementation below covers tests and the API process.
pub trait InvoiceStore: Send + Sync {
    /// Persists a draft; returns its id
    fn insert(&self, draft: InvoiceDraft) -> Result<InvoiceId, PortError>;

    /// Returns true if an insert with this idempotency key already happened
    fn contains_key(&self, idempotency_key: &str) -> bool;

    /// Fetches a persisted draft
    fn get(&self, id: &InvoiceId) -> Option<InvoiceDraft>;

    /// All drafts billed to the given party
    fn by_bill_to(&self, bill_to: &CustomerId) -> Vec<InvoiceDraft>;
}

/// In-process invoice store
#[derive(Debug, Default)]
pub struct MemoryInvoiceStore {
    inner: Mutex<MemoryInvoiceStoreInner>,
}

#[derive(Debug, Default)]
struct MemoryInvoiceStoreInner {
    drafts: HashMap<InvoiceId, InvoiceDraft>,
    keys: HashMap<String, InvoiceId>,
}

impl MemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored drafts
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InvoiceStore for MemoryInvoiceStore {
    fn insert(&self, draft: InvoiceDraft) -> Result<InvoiceId, PortError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.keys.contains_key(&draft.idempotency_key) {
            return Err(PortError::conflict(format!(
                "idempotency key already used: {}",
                draft.idempotency_key
            )));
        }
        let id = draft.id;
        inner.keys.insert(draft.idempotency_key.clone(), id);
        inner.drafts.insert(id, draft);
        Ok(id)
    }

    fn contains_key(&self, idempotency_key: &str) -> bool {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .keys
            .contains_key(idempotency_key)
    }

    fn get(&self, id: &InvoiceId) -> Option<InvoiceDraft> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .drafts
            .get(id)
            .cloned()
    }

    fn by_bill_to(&self, bill_to: &CustomerId) -> Vec<InvoiceDraft> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .drafts
            .values()
            .filter(|d| &d.bill_to == bill_to)
            .cloned()
            .collect()
    }
}

/// Builds and persists draft invoices
pub struct InvoiceAssembler {
    tax_policy: TaxPolicy,
    directory: Arc<dyn CustomerDirectory>,
    store: Arc<dyn InvoiceStore>,
}

impl InvoiceAssembler {
    pub fn new(
        tax_policy: TaxPolicy,
        directory: Arc<dyn CustomerDirectory>,
        store: Arc<dyn InvoiceStore>,
    ) -> Self {
        Self {
            tax_policy,
            directory,
            store,
        }
    }

    /// Creates one invoice from the request's items
    ///
    /// Returns `Ok(None)` when the idempotency key was already used or the
    /// request carries no items with a billable amount trail (empty item
    /// list). All other failures are errors the caller decides about.
    pub fn create_invoice(
        &self,
        request: &InvoiceRequest,
    ) -> Result<Option<InvoiceId>, BillingError> {
        self.insert_draft(request, &request.items, &request.idempotency_key)
    }

    /// Creates invoices from the request, honoring `invoice_separately`
    ///
    /// With separate invoicing the items are split by group and each group
    /// becomes its own invoice; group names are appended to the idempotency
    /// key so a partially completed run resumes exactly where it stopped.
    pub fn create_invoices(
        &self,
        request: &InvoiceRequest,
    ) -> Result<Vec<InvoiceId>, BillingError> {
        if !request.invoice_separately {
            return Ok(self.create_invoice(request)?.into_iter().collect());
        }

        let mut by_group: BTreeMap<String, Vec<LineItem>> = BTreeMap::new();
        for item in &request.items {
            by_group
                .entry(item.group.clone().unwrap_or_default())
                .or_default()
                .push(item.clone());
        }

        let mut created = Vec::new();
        for (group, items) in by_group {
            let key = format!("{}:{}", request.idempotency_key, group);
            if let Some(id) = self.insert_draft(request, &items, &key)? {
                created.push(id);
            }
        }
        Ok(created)
    }

    fn insert_draft(
        &self,
        request: &InvoiceRequest,
        items: &[LineItem],
        idempotency_key: &str,
    ) -> Result<Option<InvoiceId>, BillingError> {
        if items.is_empty() {
            debug!(customer = %request.customer, "no items, skipping invoice");
            return Ok(None);
        }
        if self.store.contains_key(idempotency_key) {
            debug!(key = idempotency_key, "idempotency key seen, skipping invoice");
            return Ok(None);
        }

        let customer = self.directory.customer(&request.customer)?;
        let (bill_to, remarks) = match request.retailer {
            Some(retailer_id) => {
                let retailer = self.directory.customer(&retailer_id)?;
                // Keep the end customer visible on the redirected bill
                let remarks = if request.remarks.is_empty() {
                    format!("Customer: {}", customer.name)
                } else {
                    format!("Customer: {}; {}", customer.name, request.remarks)
                };
                (retailer, remarks)
            }
            None => (customer.clone(), request.remarks.clone()),
        };

        let rule = self.tax_policy.rule_for(bill_to.tax_region)?;

        let draft = InvoiceDraft {
            id: InvoiceId::new_v7(),
            customer: customer.id,
            bill_to: bill_to.id,
            currency: request.currency,
            items: items.to_vec(),
            overall_discount: request.overall_discount,
            remarks,
            tax_template: rule.template.clone(),
            income_account: rule.income_account.clone(),
            idempotency_key: idempotency_key.to_string(),
            created_at: Utc::now(),
        };

        let grand_total = draft.grand_total();
        // A concurrent run may have inserted the key after the check above
        let id = self.store.insert(draft).map_err(|err| match err {
            PortError::Conflict { .. } => {
                BillingError::DuplicateKey(idempotency_key.to_string())
            }
            other => BillingError::Port(other),
        })?;
        info!(
            invoice = %id,
            bill_to = %bill_to.id,
            total = %grand_total,
            "invoice draft created"
        );
        Ok(Some(id))
    }
}
