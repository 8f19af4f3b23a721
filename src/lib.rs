#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared building blocks
pub mod errors;
pub mod events;
pub mod math;
pub mod token;
pub mod tokens;

// Oracle price feeds
pub mod oracle;

// Vault, its strategy and the factory administering both
pub mod vault;
pub mod strategy;
pub mod factory;
