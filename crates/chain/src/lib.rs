mod resolver;
mod store;
mod validate;

pub use resolver::{reconcile, Reconciliation};
pub use store::ChainStore;
pub use validate::{is_valid_chain, is_valid_successor};
