pub mod base;
pub mod random;

pub use crate::commands::giveaway::strategies::base::WinnerSelector;
pub use crate::commands::giveaway::strategies::random::UniformRandomSelector;
