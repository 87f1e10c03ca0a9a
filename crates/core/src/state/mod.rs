//! State module - the in-memory mirror kept in step with the asset store.

mod app_store;
mod state_model;


pub use app_store::AppStore;
pub use state_model::{calculate_total_value, AssetsState};
