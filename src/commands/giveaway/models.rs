use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use crossbeam::atomic::AtomicCell;
use serenity::model::user::User as DiscordUser;
use uuid::Uuid;

use crate::error::{Error, Result};

// Prefixes of the button custom ids that route interactions to a giveaway.
pub const JOIN_ACTION_PREFIX: &str = "join_";
pub const DRAW_ACTION_PREFIX: &str = "draw_";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GiveawayId(Uuid);

impl GiveawayId {
    pub fn new() -> Self {
        GiveawayId(Uuid::new_v4())
    }

    // Custom id of the "Join" button.
    pub fn join_action(&self) -> String {
        format!("{}{}", JOIN_ACTION_PREFIX, self.0)
    }

    // Custom id of the "Draw winners" button.
    pub fn draw_action(&self) -> String {
        format!("{}{}", DRAW_ACTION_PREFIX, self.0)
    }
}

impl fmt::Display for GiveawayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GiveawayId {
    type Err = Error;

    // Any malformed (or guessed) identifier is reported the same way as an unknown one.
    fn from_str(value: &str) -> Result<Self> {
        Uuid::parse_str(value)
            .map(GiveawayId)
            .map_err(|_| Error::NotFound)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Participant {
    user_id: u64,
    username: Option<String>,
    display_name: String,
}

impl Participant {
    pub fn new(user_id: u64, username: Option<&str>, display_name: &str) -> Self {
        Participant {
            user_id,
            username: username.map(|value| value.to_string()),
            display_name: display_name.to_string(),
        }
    }

    // Returns a unique identifier of the user on the platform
    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    // Returns the account name, if the user has one
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    // Returns the name shown in the chat
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl From<&DiscordUser> for Participant {
    fn from(discord_user: &DiscordUser) -> Self {
        let display_name = discord_user
            .global_name
            .clone()
            .unwrap_or_else(|| discord_user.name.clone());

        Participant {
            user_id: discord_user.id.get(),
            username: Some(discord_user.name.clone()),
            display_name,
        }
    }
}

// Where the giveaway announcement is going to be published.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PublishTarget {
    Channel(u64),
    Creator(u64),
}

// A reference onto the published announcement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Location {
    pub chat_id: u64,
    pub message_id: u64,
}

impl Location {
    pub fn new(chat_id: u64, message_id: u64) -> Self {
        Location { chat_id, message_id }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GiveawayStatus {
    Open,
    Concluded,
}

// Everything the input step collects before the giveaway gets created.
#[derive(Debug, Clone)]
pub struct GiveawayParams {
    pub prize: String,
    pub description: String,
    pub winners_count: usize,
    pub end_time: DateTime<Utc>,
    pub creator_id: u64,
    pub target_channel_id: Option<u64>,
}

impl GiveawayParams {
    pub fn target(&self) -> PublishTarget {
        match self.target_channel_id {
            Some(channel_id) => PublishTarget::Channel(channel_id),
            None => PublishTarget::Creator(self.creator_id),
        }
    }
}

// Mutable part of the giveaway. Always accessed under the giveaway lock.
#[derive(Debug)]
pub(crate) struct GiveawayState {
    pub(crate) status: GiveawayStatus,
    pub(crate) participants: Vec<Participant>,
    pub(crate) participant_ids: HashSet<u64>,
}

#[derive(Debug)]
pub struct Giveaway {
    id: GiveawayId,
    prize: String,
    description: String,
    winners_count: usize,
    creator_id: u64,
    target: PublishTarget,
    end_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
    // Filled in once the announcement was posted
    location: AtomicCell<Option<Location>>,
    state: Mutex<GiveawayState>,
}

impl Giveaway {
    pub fn new(id: GiveawayId, params: GiveawayParams, created_at: DateTime<Utc>) -> Self {
        Giveaway {
            id,
            target: params.target(),
            prize: params.prize,
            description: params.description,
            winners_count: params.winners_count,
            creator_id: params.creator_id,
            end_time: params.end_time,
            created_at,
            location: AtomicCell::new(None),
            state: Mutex::new(GiveawayState {
                status: GiveawayStatus::Open,
                participants: Vec::new(),
                participant_ids: HashSet::new(),
            }),
        }
    }

    pub fn id(&self) -> GiveawayId {
        self.id
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn winners_count(&self) -> usize {
        self.winners_count
    }

    pub fn location(&self) -> Option<Location> {
        self.location.load()
    }

    pub(crate) fn set_location(&self, location: Location) {
        self.location.store(Some(location))
    }

    pub(crate) fn state(&self) -> &Mutex<GiveawayState> {
        &self.state
    }

    // Builds an immutable view from the state guarded by the caller.
    pub(crate) fn view(&self, state: &GiveawayState) -> GiveawayView {
        GiveawayView {
            id: self.id,
            prize: self.prize.clone(),
            description: self.description.clone(),
            winners_count: self.winners_count,
            creator_id: self.creator_id,
            target: self.target,
            end_time: self.end_time,
            created_at: self.created_at,
            location: self.location(),
            status: state.status,
            participants: Arc::new(state.participants.clone()),
        }
    }
}

// Read-only copy of the giveaway taken at some point in time.
#[readonly::make]
#[derive(Debug, Clone)]
pub struct GiveawayView {
    pub id: GiveawayId,
    pub prize: String,
    pub description: String,
    pub winners_count: usize,
    pub creator_id: u64,
    pub target: PublishTarget,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub location: Option<Location>,
    pub status: GiveawayStatus,
    pub participants: Arc<Vec<Participant>>,
}

impl GiveawayView {
    pub fn participants_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_open(&self) -> bool {
        self.status == GiveawayStatus::Open
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RejectReason {
    Closed,
    Expired,
}

impl From<RejectReason> for Error {
    fn from(reason: RejectReason) -> Error {
        match reason {
            RejectReason::Closed => Error::Closed,
            RejectReason::Expired => Error::Expired,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Registration {
    Registered { participants: usize },
    AlreadyRegistered,
    Rejected(RejectReason),
}

#[derive(Debug, Clone)]
pub enum Conclusion {
    JustConcluded(GiveawayView),
    AlreadyConcluded,
    // Only produced by the manual path: nothing was changed.
    NotEnoughParticipants { required: usize, actual: usize },
}

// What the orchestration did on a conclusion request.
#[derive(Debug, Clone)]
pub enum ConclusionReport {
    Concluded {
        giveaway: GiveawayView,
        outcome: DrawOutcome,
    },
    AlreadyConcluded,
    NotEnoughParticipants { required: usize, actual: usize },
}

// Result of the winners selection for a concluded giveaway.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    Winners(Vec<Participant>),
    InsufficientParticipants { required: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::commands::giveaway::models::{
        GiveawayId, GiveawayParams, Participant, PublishTarget,
    };
    use crate::error::Error;

    #[test]
    fn test_parse_giveaway_id_from_action() {
        let id = GiveawayId::new();
        let action = id.join_action();
        let parsed = action
            .trim_start_matches("join_")
            .parse::<GiveawayId>()
            .unwrap();

        assert_eq!(parsed, id);
        assert_eq!(id.draw_action(), format!("draw_{}", id));
    }

    #[test]
    fn test_get_not_found_for_malformed_giveaway_id() {
        let result = "1234".parse::<GiveawayId>();
        assert_eq!(result.is_err(), true);
        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let first = GiveawayId::new();
        let second = GiveawayId::new();

        assert_ne!(first, second);
    }

    #[test]
    fn test_participant_without_username() {
        let participant = Participant::new(10, None, "Anonymous");

        assert_eq!(participant.user_id(), 10);
        assert_eq!(participant.username(), None);
        assert_eq!(participant.display_name(), "Anonymous");
    }

    #[test]
    fn test_params_target() {
        let mut params = GiveawayParams {
            prize: "Game key".to_string(),
            description: "Test".to_string(),
            winners_count: 1,
            end_time: Utc::now() + Duration::hours(1),
            creator_id: 7,
            target_channel_id: None,
        };
        assert_eq!(params.target(), PublishTarget::Creator(7));

        params.target_channel_id = Some(42);
        assert_eq!(params.target(), PublishTarget::Channel(42));
    }
}
