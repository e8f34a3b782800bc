// Order workflow services
pub mod order_items;
pub mod order_payments;
pub mod orders;

// Ledgers
pub mod money_transactions;
pub mod quantities;

// Pricing helpers that the order workflow folds in
pub mod currency;
pub mod payment_status;

// Rule engine reacting to domain events
pub mod automations;

// Service factory for dependency injection
pub mod factory;

/// Whether a read should include soft-removed rows. Queries state this
/// explicitly instead of relying on an implicit filtering convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    ActiveOnly,
    IncludeRemoved,
}

impl RemovalPolicy {
    pub fn includes_removed(self) -> bool {
        matches!(self, RemovalPolicy::IncludeRemoved)
    }
}
