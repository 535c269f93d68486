use rand::seq::index::sample;
use rand::thread_rng;

use crate::commands::giveaway::models::{DrawOutcome, Participant};
use crate::commands::giveaway::strategies::base::WinnerSelector;

// Uniform sampling without replacement. Positions are drawn independently of
// the order in which users have joined.
#[derive(Debug, Default)]
pub struct UniformRandomSelector;

impl UniformRandomSelector {
    pub fn new() -> Self {
        UniformRandomSelector {}
    }
}

impl WinnerSelector for UniformRandomSelector {
    fn select(&self, participants: &[Participant], winners_count: usize) -> DrawOutcome {
        if participants.len() < winners_count {
            return DrawOutcome::InsufficientParticipants {
                required: winners_count,
                actual: participants.len(),
            };
        }

        let mut rng = thread_rng();
        let winners = sample(&mut rng, participants.len(), winners_count)
            .into_iter()
            .map(|index| participants[index].clone())
            .collect::<Vec<Participant>>();
        DrawOutcome::Winners(winners)
    }
}
