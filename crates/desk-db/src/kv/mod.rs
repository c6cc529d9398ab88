pub mod blob;
pub mod error;
pub mod keys;
pub mod primary;
pub mod store;
