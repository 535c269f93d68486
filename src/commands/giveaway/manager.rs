use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::commands::giveaway::models::{
    Conclusion, Giveaway, GiveawayId, GiveawayParams, GiveawayStatus, GiveawayView, Location,
    Participant, Registration, RejectReason,
};
use crate::error::{Error, Result};

// The only owner of the giveaways and their participants. The map is sharded, so
// unrelated giveaways never wait on each other; every giveaway carries its own lock
// for registration and conclusion.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct GiveawayManager {
    giveaways: DashMap<GiveawayId, Arc<Giveaway>>,
}

impl GiveawayManager {
    pub fn new() -> Self {
        GiveawayManager {
            giveaways: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.giveaways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.giveaways.is_empty()
    }

    fn get_giveaway(&self, id: &GiveawayId) -> Result<Arc<Giveaway>> {
        self.giveaways
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound)
    }

    pub fn create_giveaway(&self, params: GiveawayParams) -> Result<GiveawayId> {
        if params.winners_count == 0 {
            let message = "The number of winners must be a positive number.".to_string();
            return Err(Error::InvalidInput(message));
        }

        let id = GiveawayId::new();
        let giveaway = Giveaway::new(id, params, Utc::now());
        self.giveaways.insert(id, Arc::new(giveaway));

        info!("Created giveaway {}", id);
        Ok(id)
    }

    pub fn attach_message_ref(&self, id: &GiveawayId, location: Location) -> Result<()> {
        let giveaway = self.get_giveaway(id)?;
        giveaway.set_location(location);

        debug!(
            "Giveaway {} is published as message {} in chat {}",
            id, location.message_id, location.chat_id
        );
        Ok(())
    }

    pub fn register(&self, id: &GiveawayId, participant: Participant) -> Result<Registration> {
        self.register_at(id, participant, Utc::now())
    }

    // Same as `register`, but checks the deadline against the given moment.
    pub fn register_at(
        &self,
        id: &GiveawayId,
        participant: Participant,
        now: DateTime<Utc>,
    ) -> Result<Registration> {
        let giveaway = self.get_giveaway(id)?;
        let mut state = giveaway.state().lock()?;

        if state.status == GiveawayStatus::Concluded {
            return Ok(Registration::Rejected(RejectReason::Closed));
        }

        if now >= giveaway.end_time() {
            return Ok(Registration::Rejected(RejectReason::Expired));
        }

        if !state.participant_ids.insert(participant.user_id()) {
            return Ok(Registration::AlreadyRegistered);
        }

        debug!("User {} joined giveaway {}", participant.user_id(), id);
        state.participants.push(participant);
        Ok(Registration::Registered {
            participants: state.participants.len(),
        })
    }

    pub fn conclude(&self, id: &GiveawayId) -> Result<Conclusion> {
        self.try_conclude(id, false)
    }

    // Concludes the giveaway only when enough users have joined it. Used by the
    // manual draw, which refuses to finish an under-filled giveaway.
    pub fn conclude_with_quorum(&self, id: &GiveawayId) -> Result<Conclusion> {
        self.try_conclude(id, true)
    }

    fn try_conclude(&self, id: &GiveawayId, quorum_required: bool) -> Result<Conclusion> {
        let giveaway = self.get_giveaway(id)?;
        let mut state = giveaway.state().lock()?;

        if state.status == GiveawayStatus::Concluded {
            return Ok(Conclusion::AlreadyConcluded);
        }

        let required = giveaway.winners_count();
        let actual = state.participants.len();
        if quorum_required && actual < required {
            return Ok(Conclusion::NotEnoughParticipants { required, actual });
        }

        state.status = GiveawayStatus::Concluded;
        info!("Concluded giveaway {} with {} participant(s)", id, actual);
        Ok(Conclusion::JustConcluded(giveaway.view(&state)))
    }

    pub fn snapshot(&self, id: &GiveawayId) -> Result<GiveawayView> {
        let giveaway = self.get_giveaway(id)?;
        let state = giveaway.state().lock()?;
        Ok(giveaway.view(&state))
    }

    // Identifiers of the giveaways that haven't been concluded yet.
    pub fn open_giveaways(&self) -> Vec<GiveawayId> {
        self.giveaways
            .iter()
            .filter(|entry| match entry.value().state().lock() {
                Ok(state) => state.status == GiveawayStatus::Open,
                Err(err) => {
                    warn!("Giveaway {} is skipped: {}", entry.key(), err);
                    false
                }
            })
            .map(|entry| *entry.key())
            .collect()
    }
}
