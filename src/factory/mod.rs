//! Vault factory
//!
//! Protocol-wide settings read by every vault, and the owner's entry point for
//! vault administration.

pub mod vault_factory;

pub use vault_factory::*;
