use chrono::{DateTime, Utc};

use crate::commands::giveaway::models::{DrawOutcome, GiveawayView};

pub trait GiveawayFormatter: Send + Sync {
    // Text of the public announcement while users can still join.
    fn render_open(&self, giveaway: &GiveawayView, now: DateTime<Utc>) -> String;
    // Text of the public announcement after the conclusion.
    fn render_closed(&self, giveaway: &GiveawayView, outcome: &DrawOutcome) -> String;
    // Private report with the same results for the creator of the giveaway.
    fn render_creator_report(&self, giveaway: &GiveawayView, outcome: &DrawOutcome) -> String;
    // Private confirmation for a user who has just joined.
    fn render_join_confirmation(&self, giveaway: &GiveawayView) -> String;
}
