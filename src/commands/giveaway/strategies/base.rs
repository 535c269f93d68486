use crate::commands::giveaway::models::{DrawOutcome, Participant};

pub trait WinnerSelector: Send + Sync {
    // Picks `winners_count` distinct participants. When there are fewer
    // participants than requested winners, nobody is picked at all.
    fn select(&self, participants: &[Participant], winners_count: usize) -> DrawOutcome;
}
