use serenity::async_trait;

use crate::commands::giveaway::models::{GiveawayId, GiveawayView, Location, PublishTarget};
use crate::error::Result;

// Delivers rendered giveaway texts to the chat platform.
#[async_trait]
pub trait AnnouncementGateway: Send + Sync {
    // Posts a new announcement with the join/draw controls and returns where it landed.
    async fn publish(&self, id: GiveawayId, target: PublishTarget, text: String) -> Result<Location>;

    // Replaces the text of the announcement. Closed giveaways lose their controls.
    async fn update(&self, id: GiveawayId, location: Location, text: String, open: bool) -> Result<()>;

    // Sends a private message to the user.
    async fn notify_user(&self, user_id: u64, text: String) -> Result<()>;
}

// Decides whether the user may finish the giveaway ahead of time.
#[async_trait]
pub trait ConclusionAuthorizer: Send + Sync {
    async fn is_authorized_to_conclude(&self, giveaway: &GiveawayView, user_id: u64) -> bool;
}
