use chrono::{DateTime, Utc};
use poise::CreateReply;
use serenity::builder::CreateInteractionResponseFollowup;
use serenity::client::Context as SerenityContext;
use serenity::model::application::ComponentInteraction;
use serenity::model::channel::Channel;
use tracing::{info, instrument, warn};

use crate::commands::context::Context;
use crate::commands::giveaway::models::{
    ConclusionReport, GiveawayId, GiveawayParams, Participant, Registration, DRAW_ACTION_PREFIX,
    JOIN_ACTION_PREFIX,
};
use crate::commands::giveaway::service::GiveawayService;
use crate::commands::giveaway::util::{format_time_left, parse_deadline};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{get_shared, AuthorizerStorage, ConfigStorage, GiveawayStorage};

// Raw values of the creation command before validation.
#[derive(Debug, Clone)]
pub struct GiveawayRequest {
    pub prize: String,
    pub description: String,
    pub duration: String,
    pub winners: i64,
    pub creator_id: u64,
    pub channel_id: Option<u64>,
}

impl GiveawayRequest {
    // Validates the input in the same order as it is asked from the user.
    pub fn into_params(self, config: &Config, now: DateTime<Utc>) -> Result<GiveawayParams> {
        let prize = self.prize.trim().to_string();
        if prize.is_empty() {
            return Err(Error::InvalidInput("The prize can't be empty.".to_string()));
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            let message = "The description can't be empty.".to_string();
            return Err(Error::InvalidInput(message));
        }

        let end_time = parse_deadline(&self.duration, now)?;
        if end_time - now > config.max_duration {
            let message = format!(
                "A giveaway can't last longer than {}.",
                format_time_left(config.max_duration)
            );
            return Err(Error::InvalidInput(message));
        }

        if self.winners <= 0 {
            let message = "The number of winners must be a positive number.".to_string();
            return Err(Error::InvalidInput(message));
        }
        let winners_count = self.winners as usize;
        if winners_count > config.max_winners {
            let message = format!("A giveaway can't have more than {} winners.", config.max_winners);
            return Err(Error::InvalidInput(message));
        }

        Ok(GiveawayParams {
            prize,
            description,
            winners_count,
            end_time,
            creator_id: self.creator_id,
            target_channel_id: self.channel_id,
        })
    }
}

async fn reply(ctx: Context<'_>, text: impl Into<String>) -> Result<()> {
    ctx.send(CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

/// Create a new giveaway
#[poise::command(slash_command, rename = "giveaway")]
pub async fn create_giveaway(
    ctx: Context<'_>,
    #[description = "What is given away"] prize: String,
    #[description = "Giveaway description"] description: String,
    #[description = "Duration: 30s, 5m, 1h or 2d"] duration: String,
    #[description = "Number of winners"] winners: i64,
    #[description = "Channel for the announcement (private message when omitted)"]
    channel: Option<Channel>,
) -> Result<()> {
    ctx.defer_ephemeral().await?;

    let serenity_ctx = ctx.serenity_context();
    let config = get_shared::<ConfigStorage>(serenity_ctx).await?;
    let creator_id = ctx.author().id.get();
    let channel_id = channel.map(|channel| channel.id().get());

    info!("User '{}' creates a giveaway", ctx.author().name);
    let request = GiveawayRequest {
        prize,
        description,
        duration,
        winners,
        creator_id,
        channel_id,
    };
    let params = match request.into_params(&config, Utc::now()) {
        Ok(params) => params,
        Err(err) => return reply(ctx, format!("❌ {}", err)).await,
    };

    if let Some(channel_id) = channel_id {
        let authorizer = get_shared::<AuthorizerStorage>(serenity_ctx).await?;
        match authorizer.is_channel_admin(channel_id, creator_id).await {
            Ok(true) => (),
            Ok(false) => {
                let err = Error::Forbidden("You are not an administrator of this channel!".to_string());
                return reply(ctx, format!("❌ {}", err)).await;
            }
            Err(err) => {
                warn!("Error getting channel info: {}", err.to_string());
                return reply(ctx, "❌ Can't find the channel. Check the bot permissions.").await;
            }
        }
    }

    let service = get_shared::<GiveawayStorage>(serenity_ctx).await?;
    match service.create_giveaway(params).await {
        Ok(_) => {
            let text = match channel_id {
                Some(channel_id) => format!("✅ The giveaway was created in <#{}>!", channel_id),
                None => "✅ The giveaway was created! Check your private messages.".to_string(),
            };
            reply(ctx, text).await
        }
        Err(err) => reply(ctx, format!("❌ {}", err)).await,
    }
}

// Short notice shown to the user who pressed the "Join" button.
pub fn join_notice(result: Result<Registration>) -> String {
    match result {
        Ok(Registration::Registered { participants }) => format!(
            "✅ You have joined the giveaway! Participants: {}",
            participants
        ),
        Ok(Registration::AlreadyRegistered) => {
            "You have already joined this giveaway.".to_string()
        }
        Ok(Registration::Rejected(reason)) => format!("❌ {}", Error::from(reason)),
        Err(err) => format!("❌ {}", err),
    }
}

// Short notice shown to the user who pressed the "Draw winners" button.
pub fn draw_notice(result: Result<ConclusionReport>) -> String {
    match result {
        Ok(ConclusionReport::Concluded { .. }) => {
            "🎉 The giveaway is finished, the results have been published.".to_string()
        }
        Ok(ConclusionReport::AlreadyConcluded) => format!("❌ {}", Error::Closed),
        Ok(ConclusionReport::NotEnoughParticipants { required, .. }) => format!(
            "❌ At least {} participants are required to draw the winners.",
            required
        ),
        Err(err) => format!("❌ {}", err),
    }
}

async fn on_join(service: &GiveawayService, raw_id: &str, participant: Participant) -> Result<Registration> {
    let id = raw_id.parse::<GiveawayId>()?;
    service.on_join_requested(&id, participant).await
}

async fn on_draw(service: &GiveawayService, raw_id: &str, user_id: u64) -> Result<ConclusionReport> {
    let id = raw_id.parse::<GiveawayId>()?;
    service.on_manual_conclusion_requested(&id, user_id).await
}

// Routes the giveaway buttons. Every press gets an ephemeral answer; the public
// message is only changed by the service.
#[instrument(skip(ctx, component), fields(custom_id = %component.data.custom_id))]
pub async fn handle_component(ctx: &SerenityContext, component: &ComponentInteraction) -> Result<()> {
    let custom_id = component.data.custom_id.as_str();
    if !custom_id.starts_with(JOIN_ACTION_PREFIX) && !custom_id.starts_with(DRAW_ACTION_PREFIX) {
        return Ok(());
    }

    component.defer_ephemeral(ctx).await?;
    let service = get_shared::<GiveawayStorage>(ctx).await?;

    let notice = match custom_id.strip_prefix(JOIN_ACTION_PREFIX) {
        Some(raw_id) => {
            let participant = Participant::from(&component.user);
            join_notice(on_join(&service, raw_id, participant).await)
        }
        None => {
            let raw_id = custom_id.trim_start_matches(DRAW_ACTION_PREFIX);
            let user_id = component.user.id.get();
            draw_notice(on_draw(&service, raw_id, user_id).await)
        }
    };

    let followup = CreateInteractionResponseFollowup::new()
        .content(notice)
        .ephemeral(true);
    component.create_followup(ctx, followup).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::commands::giveaway::handlers::{draw_notice, join_notice, GiveawayRequest};
    use crate::commands::giveaway::models::{ConclusionReport, Registration, RejectReason};
    use crate::config::Config;
    use crate::error::Error;

    fn get_config() -> Config {
        Config {
            discord_token: "token".to_string(),
            max_duration: Duration::days(30),
            max_winners: 10,
        }
    }

    fn get_request(duration: &str, winners: i64) -> GiveawayRequest {
        GiveawayRequest {
            prize: " Steam key ".to_string(),
            description: "Weekly giveaway".to_string(),
            duration: duration.to_string(),
            winners,
            creator_id: 1,
            channel_id: Some(42),
        }
    }

    #[test]
    fn test_build_params_from_request() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let params = get_request("2d", 3).into_params(&get_config(), now).unwrap();

        assert_eq!(params.prize, "Steam key");
        assert_eq!(params.winners_count, 3);
        assert_eq!(params.end_time, now + Duration::days(2));
        assert_eq!(params.target_channel_id, Some(42));
    }

    #[test]
    fn test_get_error_for_invalid_duration() {
        let result = get_request("2w", 3).into_params(&get_config(), Utc::now());
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidDurationFormat("\"2w\"".to_string())
        );
    }

    #[test]
    fn test_get_error_for_too_long_giveaway() {
        let result = get_request("31d", 3).into_params(&get_config(), Utc::now());
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidInput("A giveaway can't last longer than 30d.".to_string())
        );
    }

    #[test]
    fn test_get_error_for_non_positive_winners() {
        for winners in [0, -3] {
            let result = get_request("1h", winners).into_params(&get_config(), Utc::now());
            assert_eq!(
                result.unwrap_err(),
                Error::InvalidInput("The number of winners must be a positive number.".to_string())
            );
        }
    }

    #[test]
    fn test_get_error_for_too_many_winners() {
        let result = get_request("1h", 11).into_params(&get_config(), Utc::now());
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidInput("A giveaway can't have more than 10 winners.".to_string())
        );
    }

    #[test]
    fn test_get_error_for_empty_prize() {
        let mut request = get_request("1h", 1);
        request.prize = "  ".to_string();

        let result = request.into_params(&get_config(), Utc::now());
        assert_eq!(
            result.unwrap_err(),
            Error::InvalidInput("The prize can't be empty.".to_string())
        );
    }

    #[test]
    fn test_join_notices() {
        assert_eq!(
            join_notice(Ok(Registration::Registered { participants: 3 })),
            "✅ You have joined the giveaway! Participants: 3"
        );
        assert_eq!(
            join_notice(Ok(Registration::AlreadyRegistered)),
            "You have already joined this giveaway."
        );
        assert_eq!(
            join_notice(Ok(Registration::Rejected(RejectReason::Expired))),
            "❌ The time for joining this giveaway has expired."
        );
        assert_eq!(
            join_notice(Err(Error::NotFound)),
            "❌ This giveaway no longer exists."
        );
    }

    #[test]
    fn test_draw_notices() {
        assert_eq!(
            draw_notice(Ok(ConclusionReport::AlreadyConcluded)),
            "❌ This giveaway has already ended."
        );
        assert_eq!(
            draw_notice(Ok(ConclusionReport::NotEnoughParticipants {
                required: 3,
                actual: 1
            })),
            "❌ At least 3 participants are required to draw the winners."
        );
        assert_eq!(
            draw_notice(Err(Error::Forbidden(
                "Only an administrator can finish this giveaway.".to_string()
            ))),
            "❌ Only an administrator can finish this giveaway."
        );
    }
}
