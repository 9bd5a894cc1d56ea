//! Persistence for the medal ledger.

pub mod ledger_store;

pub use ledger_store::{LedgerStore, LedgerStoreError};
