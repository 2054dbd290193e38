//! `ledgerly-customers` — customer entity and the snapshot value object
//! embedded into invoices.

pub mod customer;

pub use customer::{Customer, CustomerFields, CustomerSnapshot, CustomerUpdate};
