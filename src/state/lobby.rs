//! Lobby domain model and the turn state machine.

use std::time::{Instant, SystemTime};

use thiserror::Error;
use uuid::Uuid;

use crate::gateway::error::GatewayErrorKind;
use crate::gateway::models::SongResult;

/// Hard cap on lobby membership; joins beyond this are rejected, not queued.
pub const MAX_PLAYERS: usize = 4;

/// A participant in a lobby. Names are unique within a lobby and double as
/// the push-notification address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Display name supplied at create/join time.
    pub name: String,
}

/// Phase of a lobby, modelled as an explicit tagged variant so call sites
/// never infer it from index arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyPhase {
    /// Players are taking turns; `turn` indexes into the player list.
    Collecting {
        /// Index of the player whose turn it is.
        turn: usize,
    },
    /// Every player has had their turn and the generation call is in flight.
    Completing,
    /// Generation finished; results are immutable from here on.
    Done {
        /// Generated songs, in the order the service returned them.
        results: Vec<SongResult>,
    },
    /// Generation failed; the lobby stays terminal.
    Failed {
        /// Classification of the gateway failure.
        reason: GatewayErrorKind,
    },
}

/// Reasons a join request can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The lobby already holds [`MAX_PLAYERS`] players.
    #[error("lobby is full ({MAX_PLAYERS} players)")]
    Full,
    /// Another player already uses this name in the lobby.
    #[error("player name `{0}` is already taken in this lobby")]
    NameTaken(String),
    /// The lobby is no longer collecting turns.
    #[error("lobby is no longer accepting players")]
    Closed,
}

/// Reasons a turn submission can be refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// The submitting player is not the current player.
    #[error("it is `{current}`'s turn")]
    NotYourTurn {
        /// Name of the player whose turn it actually is.
        current: String,
    },
    /// The lobby is completing, done, or failed; no further turns exist.
    #[error("lobby is no longer collecting turns")]
    Closed,
}

/// Result of an accepted turn submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStep {
    /// The turn advanced and another player is now up.
    Advanced {
        /// Name of the player to notify.
        next_player: String,
    },
    /// The final turn landed; the lobby is now Completing and the caller
    /// must drive the generation call with this content.
    AllVersesIn {
        /// Lobby title.
        title: String,
        /// Genre set by the first turn.
        genre: String,
        /// Verses in turn order.
        verses: Vec<String>,
    },
}

/// The unit of game state: membership, accumulated content, and phase.
#[derive(Debug, Clone)]
pub struct Lobby {
    /// Opaque unique identifier, immutable after creation.
    pub id: Uuid,
    /// Insertion order is turn order; append-only.
    pub players: Vec<Player>,
    /// Song title, fixed at creation.
    pub title: String,
    /// Set by turn 0, immutable afterwards.
    pub genre: Option<String>,
    /// One entry per non-first turn, in turn order.
    pub verses: Vec<String>,
    /// Current phase; see [`LobbyPhase`].
    pub phase: LobbyPhase,
    /// Wall-clock creation time, reported in snapshots.
    pub created_at: SystemTime,
    /// Last mutation time, drives eviction.
    pub touched_at: Instant,
}

impl Lobby {
    /// Create a lobby with the host as its first (and current) player.
    pub fn new(id: Uuid, host: String, title: String) -> Self {
        Self {
            id,
            players: vec![Player { name: host }],
            title,
            genre: None,
            verses: Vec::new(),
            phase: LobbyPhase::Collecting { turn: 0 },
            created_at: SystemTime::now(),
            touched_at: Instant::now(),
        }
    }

    /// Append a player, enforcing capacity, name uniqueness, and phase.
    pub fn join(&mut self, name: String) -> Result<(), JoinError> {
        if !matches!(self.phase, LobbyPhase::Collecting { .. }) {
            return Err(JoinError::Closed);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(JoinError::Full);
        }
        if self.players.iter().any(|player| player.name == name) {
            return Err(JoinError::NameTaken(name));
        }

        self.players.push(Player { name });
        self.touched_at = Instant::now();
        Ok(())
    }

    /// Apply one turn submission. Turn 0 sets the genre, every later turn
    /// appends a verse, and the turn index advances by exactly one. When the
    /// last player has submitted, the lobby flips to Completing and the
    /// caller receives the accumulated content to hand to the gateway.
    pub fn submit(&mut self, player: &str, content: String) -> Result<TurnStep, TurnError> {
        let LobbyPhase::Collecting { turn } = self.phase else {
            return Err(TurnError::Closed);
        };
        let Some(current) = self.players.get(turn) else {
            // Unreachable while the Collecting invariant holds.
            return Err(TurnError::Closed);
        };
        if current.name != player {
            return Err(TurnError::NotYourTurn {
                current: current.name.clone(),
            });
        }

        if turn == 0 {
            self.genre = Some(content);
        } else {
            self.verses.push(content);
        }
        self.touched_at = Instant::now();

        let next = turn + 1;
        if next < self.players.len() {
            self.phase = LobbyPhase::Collecting { turn: next };
            Ok(TurnStep::Advanced {
                next_player: self.players[next].name.clone(),
            })
        } else {
            self.phase = LobbyPhase::Completing;
            Ok(TurnStep::AllVersesIn {
                title: self.title.clone(),
                genre: self.genre.clone().unwrap_or_default(),
                verses: self.verses.clone(),
            })
        }
    }

    /// Record generation results. Only meaningful from Completing; returns
    /// whether the transition was applied.
    pub fn finish(&mut self, results: Vec<SongResult>) -> bool {
        if !matches!(self.phase, LobbyPhase::Completing) {
            return false;
        }
        self.phase = LobbyPhase::Done { results };
        self.touched_at = Instant::now();
        true
    }

    /// Record a generation failure. Only meaningful from Completing; returns
    /// whether the transition was applied.
    pub fn fail(&mut self, reason: GatewayErrorKind) -> bool {
        if !matches!(self.phase, LobbyPhase::Completing) {
            return false;
        }
        self.phase = LobbyPhase::Failed { reason };
        self.touched_at = Instant::now();
        true
    }

    /// Name of the player whose turn it is, while collecting.
    pub fn current_player(&self) -> Option<&str> {
        match self.phase {
            LobbyPhase::Collecting { turn } => {
                self.players.get(turn).map(|player| player.name.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby_with(players: &[&str]) -> Lobby {
        let mut lobby = Lobby::new(Uuid::new_v4(), players[0].to_string(), "MusicTitle".into());
        for name in &players[1..] {
            lobby.join(name.to_string()).unwrap();
        }
        lobby
    }

    fn song(id: &str) -> SongResult {
        SongResult {
            id: id.into(),
            title: "t".into(),
            audio_url: "a".into(),
            image_url: "i".into(),
            lyric: "l".into(),
            tags: "g".into(),
        }
    }

    #[test]
    fn new_lobby_starts_collecting_at_turn_zero() {
        let lobby = lobby_with(&["alice"]);
        assert_eq!(lobby.phase, LobbyPhase::Collecting { turn: 0 });
        assert_eq!(lobby.current_player(), Some("alice"));
        assert!(lobby.verses.is_empty());
        assert!(lobby.genre.is_none());
    }

    #[test]
    fn join_rejects_fifth_player() {
        let mut lobby = lobby_with(&["a", "b", "c", "d"]);
        assert_eq!(lobby.join("e".into()), Err(JoinError::Full));
        assert_eq!(lobby.players.len(), MAX_PLAYERS);
    }

    #[test]
    fn join_rejects_duplicate_name() {
        let mut lobby = lobby_with(&["alice"]);
        assert_eq!(
            lobby.join("alice".into()),
            Err(JoinError::NameTaken("alice".into()))
        );
        assert_eq!(lobby.players.len(), 1);
    }

    #[test]
    fn join_rejects_once_completing() {
        let mut lobby = lobby_with(&["alice"]);
        lobby.submit("alice", "rock".into()).unwrap();
        assert_eq!(lobby.phase, LobbyPhase::Completing);
        assert_eq!(lobby.join("bob".into()), Err(JoinError::Closed));
    }

    #[test]
    fn first_turn_sets_genre_not_a_verse() {
        let mut lobby = lobby_with(&["alice", "bob"]);
        let step = lobby.submit("alice", "pop".into()).unwrap();

        assert_eq!(
            step,
            TurnStep::Advanced {
                next_player: "bob".into()
            }
        );
        assert_eq!(lobby.genre.as_deref(), Some("pop"));
        assert!(lobby.verses.is_empty());
        assert_eq!(lobby.phase, LobbyPhase::Collecting { turn: 1 });
    }

    #[test]
    fn final_turn_flips_to_completing_with_collected_content() {
        let mut lobby = lobby_with(&["alice", "bob"]);
        lobby.submit("alice", "rock".into()).unwrap();
        let step = lobby.submit("bob", "line one".into()).unwrap();

        assert_eq!(
            step,
            TurnStep::AllVersesIn {
                title: "MusicTitle".into(),
                genre: "rock".into(),
                verses: vec!["line one".into()],
            }
        );
        assert_eq!(lobby.phase, LobbyPhase::Completing);
    }

    #[test]
    fn submit_out_of_turn_is_rejected_without_state_change() {
        let mut lobby = lobby_with(&["alice", "bob"]);
        let err = lobby.submit("bob", "line".into()).unwrap_err();

        assert_eq!(
            err,
            TurnError::NotYourTurn {
                current: "alice".into()
            }
        );
        assert_eq!(lobby.phase, LobbyPhase::Collecting { turn: 0 });
        assert!(lobby.genre.is_none());
        assert!(lobby.verses.is_empty());
    }

    #[test]
    fn submit_by_unknown_player_is_not_your_turn() {
        let mut lobby = lobby_with(&["alice", "bob"]);
        let err = lobby.submit("carol", "x".into()).unwrap_err();
        assert!(matches!(err, TurnError::NotYourTurn { .. }));
        assert_eq!(lobby.verses.len(), 0);
    }

    #[test]
    fn verses_track_turn_index_while_collecting() {
        let mut lobby = lobby_with(&["a", "b", "c", "d"]);
        lobby.submit("a", "jazz".into()).unwrap();
        lobby.submit("b", "v1".into()).unwrap();
        lobby.submit("c", "v2".into()).unwrap();

        let LobbyPhase::Collecting { turn } = lobby.phase else {
            panic!("expected collecting phase");
        };
        assert_eq!(turn, 3);
        assert_eq!(lobby.verses.len(), turn - 1);
    }

    #[test]
    fn finish_only_applies_from_completing() {
        let mut lobby = lobby_with(&["alice"]);
        assert!(!lobby.finish(vec![song("s1")]));

        lobby.submit("alice", "rock".into()).unwrap();
        assert!(lobby.finish(vec![song("s1")]));
        assert!(matches!(lobby.phase, LobbyPhase::Done { .. }));

        // Terminal: a second write-back is ignored.
        assert!(!lobby.finish(vec![song("s2")]));
        assert!(!lobby.fail(GatewayErrorKind::Timeout));
    }

    #[test]
    fn failed_lobby_rejects_further_submissions() {
        let mut lobby = lobby_with(&["alice"]);
        lobby.submit("alice", "rock".into()).unwrap();
        assert!(lobby.fail(GatewayErrorKind::Timeout));

        assert_eq!(lobby.submit("alice", "again".into()), Err(TurnError::Closed));
        assert_eq!(
            lobby.phase,
            LobbyPhase::Failed {
                reason: GatewayErrorKind::Timeout
            }
        );
    }
}
