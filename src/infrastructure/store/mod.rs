//! Entry store backends beyond the in-memory default

pub mod bounded;
pub mod factory;

pub use bounded::BoundedStore;
pub use factory::{StoreFactory, StoreKind};
