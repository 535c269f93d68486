use std::sync::Arc;

use serenity::client::Context;
use serenity::prelude::TypeMapKey;

use crate::commands::giveaway::discord::DiscordAuthorizer;
use crate::commands::giveaway::service::GiveawayService;
use crate::config::Config;
use crate::error::{Error, Result};

pub struct GiveawayStorage;

impl TypeMapKey for GiveawayStorage {
    type Value = Arc<GiveawayService>;
}

pub struct AuthorizerStorage;

impl TypeMapKey for AuthorizerStorage {
    type Value = Arc<DiscordAuthorizer>;
}

pub struct ConfigStorage;

impl TypeMapKey for ConfigStorage {
    type Value = Arc<Config>;
}

// Reads a shared value stored in the client data at the startup.
pub async fn get_shared<K>(ctx: &Context) -> Result<K::Value>
where
    K: TypeMapKey,
    K::Value: Clone,
{
    ctx.data
        .read()
        .await
        .get::<K>()
        .cloned()
        .ok_or_else(|| {
            let message = format!("Expected {} in ShareMap.", std::any::type_name::<K>());
            Error::Configuration(message)
        })
}
