pub mod migration;
pub mod state;
