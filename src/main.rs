pub mod commands;
pub mod config;
pub mod error;
pub mod storage;

use std::process;
use std::sync::Arc;

use poise::serenity_prelude::GatewayIntents;
use serenity::async_trait;
use serenity::client::{Client, Context, EventHandler};
use serenity::model::application::Interaction;
use serenity::model::gateway::Ready;
use tracing::{error, info};

use crate::commands::giveaway::discord::{DiscordAuthorizer, DiscordGateway};
use crate::commands::giveaway::handle_component;
use crate::commands::giveaway::service::GiveawayService;
use crate::commands::{create_giveaway, UserData};
use crate::config::Config;
use crate::error::Error;
use crate::storage::{AuthorizerStorage, ConfigStorage, GiveawayStorage};

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if let Err(err) = handle_component(&ctx, &component).await {
                error!("Can't process the button press: {}", err.to_string());
            }
        }
    }

    async fn ready(&self, _: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            error!("Can't read the configuration: {}", err.to_string());
            process::exit(1);
        }
    };
    info!("Starting with {:?}", config);

    let framework = poise::Framework::<UserData, Error>::builder()
        .options(poise::FrameworkOptions {
            commands: vec![create_giveaway()],
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(UserData {})
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged();
    let client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await;
    let mut client = match client {
        Ok(client) => client,
        Err(err) => {
            error!("Cannot create a Discord client: {}", err.to_string());
            process::exit(1);
        }
    };

    let authorizer = Arc::new(DiscordAuthorizer::new(client.http.clone()));
    let service = Arc::new(GiveawayService::new(
        Arc::new(DiscordGateway::new(client.http.clone())),
        authorizer.clone(),
    ));
    {
        let mut data = client.data.write().await;
        data.insert::<GiveawayStorage>(service.clone());
        data.insert::<AuthorizerStorage>(authorizer);
        data.insert::<ConfigStorage>(config);
    }

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Can't listen for the shutdown signal: {}", err.to_string());
            return;
        }
        info!(
            "Shutting down, {} giveaways are still open",
            service.manager().len()
        );
        service.shutdown();
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
