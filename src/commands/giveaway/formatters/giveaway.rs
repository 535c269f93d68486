// Default texts for the giveaway announcements
use chrono::{DateTime, Utc};

use crate::commands::giveaway::formatters::base::GiveawayFormatter;
use crate::commands::giveaway::models::{DrawOutcome, GiveawayView, Participant};
use crate::commands::giveaway::util::format_time_left;

pub struct DefaultGiveawayFormatter;

impl DefaultGiveawayFormatter {
    pub fn new() -> Self {
        DefaultGiveawayFormatter {}
    }

    // `@username` when the user has one, otherwise the visible name with the id.
    fn format_winner(&self, position: usize, winner: &Participant) -> String {
        match winner.username() {
            Some(username) => format!("{}. @{}", position, username),
            None => format!(
                "{}. {} (ID: {})",
                position,
                winner.display_name(),
                winner.user_id()
            ),
        }
    }

    fn format_outcome(&self, outcome: &DrawOutcome, insufficient_text: &str) -> String {
        match outcome {
            DrawOutcome::Winners(winners) => {
                let winners_text = winners
                    .iter()
                    .enumerate()
                    .map(|(index, winner)| self.format_winner(index + 1, winner))
                    .collect::<Vec<String>>()
                    .join("\n");
                format!("🏅 Winners:\n{}", winners_text)
            }
            DrawOutcome::InsufficientParticipants { .. } => format!("❌ {}", insufficient_text),
        }
    }
}

impl Default for DefaultGiveawayFormatter {
    fn default() -> Self {
        DefaultGiveawayFormatter::new()
    }
}

impl GiveawayFormatter for DefaultGiveawayFormatter {
    fn render_open(&self, giveaway: &GiveawayView, now: DateTime<Utc>) -> String {
        format!(
            "🎉 **New giveaway!**\n\n\
            🎁 Prize: {}\n\
            📝 Description: {}\n\
            🏆 Winners: {}\n\
            ⏳ Ends in: {}\n\
            👥 Participants: {}",
            giveaway.prize,
            giveaway.description,
            giveaway.winners_count,
            format_time_left(giveaway.end_time - now),
            giveaway.participants_count(),
        )
    }

    fn render_closed(&self, giveaway: &GiveawayView, outcome: &DrawOutcome) -> String {
        format!(
            "🎉 **The giveaway has ended!**\n\n\
            🎁 Prize: {}\n\
            👥 Participants: {}\n\n\
            {}",
            giveaway.prize,
            giveaway.participants_count(),
            self.format_outcome(outcome, "Not enough participants to choose the winners!"),
        )
    }

    fn render_creator_report(&self, giveaway: &GiveawayView, outcome: &DrawOutcome) -> String {
        format!(
            "🏆 **Giveaway results:**\n\n\
            🎁 Prize: {}\n\
            👥 Participants: {}\n\n\
            {}",
            giveaway.prize,
            giveaway.participants_count(),
            self.format_outcome(outcome, "Not enough participants!"),
        )
    }

    fn render_join_confirmation(&self, giveaway: &GiveawayView) -> String {
        format!(
            "✅ You have successfully joined the giveaway of \"{}\"!",
            giveaway.prize
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::commands::giveaway::formatters::{DefaultGiveawayFormatter, GiveawayFormatter};
    use crate::commands::giveaway::manager::GiveawayManager;
    use crate::commands::giveaway::models::{
        DrawOutcome, GiveawayParams, GiveawayView, Participant,
    };

    fn get_view(participants: Vec<Participant>) -> GiveawayView {
        let manager = GiveawayManager::new();
        let id = manager
            .create_giveaway(GiveawayParams {
                prize: "Steam key".to_string(),
                description: "Weekly giveaway".to_string(),
                winners_count: 2,
                end_time: Utc::now() + Duration::hours(1),
                creator_id: 1,
                target_channel_id: None,
            })
            .unwrap();
        for participant in participants {
            manager.register(&id, participant).unwrap();
        }
        manager.snapshot(&id).unwrap()
    }

    #[test]
    fn test_render_open_giveaway() {
        let view = get_view(vec![Participant::new(2, Some("alice"), "Alice")]);
        let formatter = DefaultGiveawayFormatter::new();

        let text = formatter.render_open(&view, view.end_time - Duration::minutes(5));
        assert_eq!(
            text,
            "🎉 **New giveaway!**\n\n\
            🎁 Prize: Steam key\n\
            📝 Description: Weekly giveaway\n\
            🏆 Winners: 2\n\
            ⏳ Ends in: 5m\n\
            👥 Participants: 1"
        );
    }

    #[test]
    fn test_render_closed_giveaway_with_winners() {
        let alice = Participant::new(2, Some("alice"), "Alice");
        let bob = Participant::new(3, None, "Bob");
        let view = get_view(vec![alice.clone(), bob.clone()]);
        let formatter = DefaultGiveawayFormatter::new();

        let text = formatter.render_closed(&view, &DrawOutcome::Winners(vec![bob, alice]));
        assert_eq!(
            text,
            "🎉 **The giveaway has ended!**\n\n\
            🎁 Prize: Steam key\n\
            👥 Participants: 2\n\n\
            🏅 Winners:\n1. Bob (ID: 3)\n2. @alice"
        );
    }

    #[test]
    fn test_render_closed_giveaway_without_enough_participants() {
        let view = get_view(vec![Participant::new(2, Some("alice"), "Alice")]);
        let formatter = DefaultGiveawayFormatter::new();
        let outcome = DrawOutcome::InsufficientParticipants {
            required: 2,
            actual: 1,
        };

        let text = formatter.render_closed(&view, &outcome);
        assert_eq!(
            text.ends_with("❌ Not enough participants to choose the winners!"),
            true
        );

        let report = formatter.render_creator_report(&view, &outcome);
        assert_eq!(report.starts_with("🏆 **Giveaway results:**"), true);
        assert_eq!(report.ends_with("❌ Not enough participants!"), true);
    }

    #[test]
    fn test_render_join_confirmation() {
        let view = get_view(vec![]);
        let formatter = DefaultGiveawayFormatter::new();

        assert_eq!(
            formatter.render_join_confirmation(&view),
            "✅ You have successfully joined the giveaway of \"Steam key\"!"
        );
    }
}
