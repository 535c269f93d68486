// Discord implementations of the giveaway gateway and authorization check
use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{CreateActionRow, CreateButton, CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::application::ButtonStyle;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tracing::error;

use crate::commands::giveaway::gateway::{AnnouncementGateway, ConclusionAuthorizer};
use crate::commands::giveaway::models::{GiveawayId, GiveawayView, Location, PublishTarget};
use crate::error::Result;

// Buttons attached to the announcement while the giveaway is open.
fn giveaway_controls(id: GiveawayId) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(id.join_action())
            .label("Join")
            .emoji('✅')
            .style(ButtonStyle::Success),
        CreateButton::new(id.draw_action())
            .label("Draw winners")
            .emoji('🎲')
            .style(ButtonStyle::Secondary),
    ])]
}

pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordGateway { http }
    }
}

#[async_trait]
impl AnnouncementGateway for DiscordGateway {
    async fn publish(&self, id: GiveawayId, target: PublishTarget, text: String) -> Result<Location> {
        let message = CreateMessage::new()
            .content(text)
            .components(giveaway_controls(id));

        let sent = match target {
            PublishTarget::Channel(channel_id) => {
                ChannelId::new(channel_id)
                    .send_message(&self.http, message)
                    .await?
            }
            PublishTarget::Creator(user_id) => {
                UserId::new(user_id)
                    .direct_message(&self.http, message)
                    .await?
            }
        };

        Ok(Location::new(sent.channel_id.get(), sent.id.get()))
    }

    async fn update(&self, id: GiveawayId, location: Location, text: String, open: bool) -> Result<()> {
        let components = match open {
            true => giveaway_controls(id),
            false => Vec::new(),
        };
        let message = EditMessage::new().content(text).components(components);

        ChannelId::new(location.chat_id)
            .edit_message(&self.http, MessageId::new(location.message_id), message)
            .await?;
        Ok(())
    }

    async fn notify_user(&self, user_id: u64, text: String) -> Result<()> {
        UserId::new(user_id)
            .direct_message(&self.http, CreateMessage::new().content(text))
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DiscordAuthorizer {
    http: Arc<Http>,
}

impl DiscordAuthorizer {
    pub fn new(http: Arc<Http>) -> Self {
        DiscordAuthorizer { http }
    }

    // Checks that the user can administrate the given guild channel. Private
    // channels have no administrators.
    pub async fn is_channel_admin(&self, channel_id: u64, user_id: u64) -> Result<bool> {
        let channel = ChannelId::new(channel_id).to_channel(&self.http).await?;
        let Some(guild_channel) = channel.guild() else {
            return Ok(false);
        };

        let guild = guild_channel.guild_id.to_partial_guild(&self.http).await?;
        let member = guild_channel
            .guild_id
            .member(&self.http, UserId::new(user_id))
            .await?;

        let permissions = guild.user_permissions_in(&guild_channel, &member);
        Ok(permissions.administrator() || permissions.manage_channels())
    }
}

#[async_trait]
impl ConclusionAuthorizer for DiscordAuthorizer {
    async fn is_authorized_to_conclude(&self, giveaway: &GiveawayView, user_id: u64) -> bool {
        match giveaway.target {
            PublishTarget::Creator(creator_id) => creator_id == user_id,
            PublishTarget::Channel(channel_id) => {
                match self.is_channel_admin(channel_id, user_id).await {
                    Ok(is_admin) => is_admin,
                    Err(err) => {
                        error!("Error checking admin status: {}", err.to_string());
                        false
                    }
                }
            }
        }
    }
}
