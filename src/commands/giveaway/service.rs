use std::sync::{Arc, Weak};

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::commands::giveaway::formatters::{DefaultGiveawayFormatter, GiveawayFormatter};
use crate::commands::giveaway::gateway::{AnnouncementGateway, ConclusionAuthorizer};
use crate::commands::giveaway::manager::GiveawayManager;
use crate::commands::giveaway::models::{
    Conclusion, ConclusionReport, DrawOutcome, GiveawayId, GiveawayParams, GiveawayView,
    Participant, Registration,
};
use crate::commands::giveaway::scheduler::Scheduler;
use crate::commands::giveaway::strategies::{UniformRandomSelector, WinnerSelector};
use crate::error::{Error, Result};

pub const UNDELIVERED_RESULTS_WARNING: &str =
    "⚠️ The public giveaway message couldn't be updated with these results.";

// Glues the registry, the timers, the winners selection and the announcements
// together. Platform specifics stay behind the gateway and the authorizer.
pub struct GiveawayService {
    manager: Arc<GiveawayManager>,
    scheduler: Scheduler,
    selector: Arc<dyn WinnerSelector>,
    formatter: Arc<dyn GiveawayFormatter>,
    gateway: Arc<dyn AnnouncementGateway>,
    authorizer: Arc<dyn ConclusionAuthorizer>,
}

impl GiveawayService {
    pub fn new(
        gateway: Arc<dyn AnnouncementGateway>,
        authorizer: Arc<dyn ConclusionAuthorizer>,
    ) -> Self {
        GiveawayService {
            manager: Arc::new(GiveawayManager::new()),
            scheduler: Scheduler::new(),
            selector: Arc::new(UniformRandomSelector::new()),
            formatter: Arc::new(DefaultGiveawayFormatter::new()),
            gateway,
            authorizer,
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn WinnerSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn manager(&self) -> Arc<GiveawayManager> {
        self.manager.clone()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // Creates the giveaway, posts its announcement and arms the deadline timer.
    // A giveaway which couldn't be announced is withdrawn right away.
    #[instrument(skip(self, params), fields(creator_id = params.creator_id))]
    pub async fn create_giveaway(self: &Arc<Self>, params: GiveawayParams) -> Result<GiveawayId> {
        let target = params.target();
        let id = self.manager.create_giveaway(params)?;
        let giveaway = self.manager.snapshot(&id)?;

        let text = self.formatter.render_open(&giveaway, Utc::now());
        let location = match self.gateway.publish(id, target, text).await {
            Ok(location) => location,
            Err(err) => {
                error!("Can't publish giveaway {}: {}", id, err);
                self.manager.conclude(&id)?;
                return Err(Error::AnnouncementDeliveryFailed(err.to_string()));
            }
        };
        self.manager.attach_message_ref(&id, location)?;

        let service: Weak<Self> = Arc::downgrade(self);
        self.scheduler.arm(id, giveaway.end_time, move || async move {
            let Some(service) = service.upgrade() else {
                return;
            };

            if let Err(err) = service.conclude(&id).await {
                error!("Can't conclude giveaway {} on its deadline: {}", id, err);
            }
        });

        info!("Giveaway {} is running until {}", id, giveaway.end_time);
        Ok(id)
    }

    #[instrument(skip(self, participant), fields(user_id = participant.user_id()))]
    pub async fn on_join_requested(
        &self,
        id: &GiveawayId,
        participant: Participant,
    ) -> Result<Registration> {
        let user_id = participant.user_id();
        let registration = self.manager.register(id, participant)?;

        if let Registration::Registered { participants } = registration {
            debug!("Giveaway {} has {} participant(s)", id, participants);
            let giveaway = self.manager.snapshot(id)?;
            self.refresh_announcement(&giveaway).await;

            let confirmation = self.formatter.render_join_confirmation(&giveaway);
            if let Err(err) = self.gateway.notify_user(user_id, confirmation).await {
                error!("Can't send the join confirmation to user {}: {}", user_id, err);
            }
        }

        Ok(registration)
    }

    // Early conclusion requested by a user. Authorization happens here, before the
    // registry is touched; under-filled giveaways are left running.
    #[instrument(skip(self))]
    pub async fn on_manual_conclusion_requested(
        &self,
        id: &GiveawayId,
        requesting_user_id: u64,
    ) -> Result<ConclusionReport> {
        let giveaway = self.manager.snapshot(id)?;
        if !giveaway.is_open() {
            return Ok(ConclusionReport::AlreadyConcluded);
        }

        let is_authorized = self
            .authorizer
            .is_authorized_to_conclude(&giveaway, requesting_user_id)
            .await;
        if !is_authorized {
            let message = "Only an administrator can finish this giveaway.".to_string();
            return Err(Error::Forbidden(message));
        }

        let conclusion = self.manager.conclude_with_quorum(id)?;
        Ok(self.finish(conclusion).await)
    }

    // Conclusion on the deadline. Safe to call any number of times.
    #[instrument(skip(self))]
    pub async fn conclude(&self, id: &GiveawayId) -> Result<ConclusionReport> {
        let conclusion = self.manager.conclude(id)?;
        Ok(self.finish(conclusion).await)
    }

    // Stops every pending timer. Giveaways stay in memory until the process exits.
    pub fn shutdown(&self) {
        let open_giveaways = self.manager.open_giveaways();
        if !open_giveaways.is_empty() {
            warn!(
                "Shutting down with {} unfinished giveaway(s)",
                open_giveaways.len()
            );
        }
        self.scheduler.shutdown();
    }

    async fn finish(&self, conclusion: Conclusion) -> ConclusionReport {
        match conclusion {
            Conclusion::JustConcluded(giveaway) => {
                let outcome = self.announce_results(&giveaway).await;
                ConclusionReport::Concluded { giveaway, outcome }
            }
            Conclusion::AlreadyConcluded => {
                debug!("The giveaway has been concluded before, nothing to do");
                ConclusionReport::AlreadyConcluded
            }
            Conclusion::NotEnoughParticipants { required, actual } => {
                ConclusionReport::NotEnoughParticipants { required, actual }
            }
        }
    }

    // Runs for the single caller which actually concluded the giveaway.
    async fn announce_results(&self, giveaway: &GiveawayView) -> DrawOutcome {
        let outcome = self
            .selector
            .select(&giveaway.participants, giveaway.winners_count);
        if let DrawOutcome::InsufficientParticipants { required, actual } = &outcome {
            info!(
                "Giveaway {} has {} participant(s) for {} winner(s)",
                giveaway.id, actual, required
            );
        }

        let public_text = self.formatter.render_closed(giveaway, &outcome);
        let mut report = self.formatter.render_creator_report(giveaway, &outcome);

        let delivered = match giveaway.location {
            Some(location) => {
                match self.gateway.update(giveaway.id, location, public_text, false).await {
                    Ok(_) => true,
                    Err(err) => {
                        error!("Can't publish results of giveaway {}: {}", giveaway.id, err);
                        false
                    }
                }
            }
            None => {
                warn!("Giveaway {} has no announcement to update", giveaway.id);
                false
            }
        };
        if !delivered {
            report = format!("{}\n\n{}", report, UNDELIVERED_RESULTS_WARNING);
        }

        if let Err(err) = self.gateway.notify_user(giveaway.creator_id, report).await {
            error!(
                "Can't send results of giveaway {} to its creator: {}",
                giveaway.id, err
            );
        }

        outcome
    }

    async fn refresh_announcement(&self, giveaway: &GiveawayView) {
        if !giveaway.is_open() {
            debug!("Giveaway {} was concluded meanwhile, skipping the refresh", giveaway.id);
            return;
        }

        let Some(location) = giveaway.location else {
            warn!("Giveaway {} has no announcement to refresh", giveaway.id);
            return;
        };

        let text = self.formatter.render_open(giveaway, Utc::now());
        if let Err(err) = self.gateway.update(giveaway.id, location, text, true).await {
            error!("Can't refresh the announcement of giveaway {}: {}", giveaway.id, err);
        }
    }
}
