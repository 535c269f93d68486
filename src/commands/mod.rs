pub mod context;
pub mod giveaway;

// Re-exports for the later usage in main.rs
pub use crate::commands::context::{Context, UserData};
pub use crate::commands::giveaway::create_giveaway;
