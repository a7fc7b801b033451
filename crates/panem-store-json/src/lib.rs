//! Legacy JSON document backend for the Panem tribute store.
//!
//! This is the storage format that predates the relational store: two flat
//! documents, one mapping tribute ids to inventories and one mapping tribute
//! ids to prompts. It is retained for fallback reads and the one-time
//! migration only — no new capabilities are added here.
//!
//! Every operation loads the whole document, mutates it in memory, and
//! rewrites it wholesale. Last writer wins; there are no transactions.

mod document;
mod store;

pub mod error;

pub use document::{LegacyInventory, LegacyPrompt};
pub use error::{Error, Result};
pub use store::JsonStore;

#[cfg(test)]
mod tests;
