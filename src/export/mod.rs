//! Export module for SoulVault
//!
//! Provides the lineage CSV: a read-only projection of a user's souls that
//! carries a seed fingerprint instead of the seed.

pub mod csv;

pub use csv::export_lineage_csv;
