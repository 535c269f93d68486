pub mod discord;
pub mod formatters;
pub mod gateway;
pub mod handlers;
pub mod manager;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod strategies;
pub mod util;

pub use crate::commands::giveaway::handlers::{
    // Giveaway creation
    create_giveaway,

    // Interaction with the giveaway
    handle_component,
};
