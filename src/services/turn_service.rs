//! The turn coordinator: who may act, what their action means, and the
//! end-of-game transition into song generation.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::ws::ServerMessage;
use crate::error::ServiceError;
use crate::gateway::error::GatewayResult;
use crate::gateway::models::{GenerationRequest, SongResult};
use crate::state::SharedState;
use crate::state::lobby::TurnStep;
use crate::state::registry::NotifyError;

/// Result of a successful turn submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn advanced; another player is now up.
    Advanced {
        /// Player whose turn it now is.
        next_player: String,
    },
    /// The final turn landed and generation succeeded.
    Completed {
        /// Generated songs, in service order.
        results: Vec<SongResult>,
    },
}

/// Apply one turn submission to a lobby.
///
/// The in-memory transition runs entirely inside the store's per-lobby
/// critical section; the generation call, the only long-latency operation in
/// the core, runs strictly outside any lock so a slow external service never
/// serializes unrelated lobbies.
pub async fn submit_turn(
    state: &SharedState,
    lobby_id: Uuid,
    username: &str,
    content: String,
) -> Result<TurnOutcome, ServiceError> {
    let step = state.lobbies().submit(lobby_id, username, content)?;

    match step {
        TurnStep::Advanced { next_player } => {
            notify_turn(state, &next_player, lobby_id);
            Ok(TurnOutcome::Advanced { next_player })
        }
        TurnStep::AllVersesIn {
            title,
            genre,
            verses,
        } => {
            info!(lobby = %lobby_id, verses = verses.len(), "all turns in; requesting song generation");
            let request = GenerationRequest {
                title,
                genre,
                verses,
            };

            // The call and its write-back run in their own task. The lobby
            // left Collecting when this submission won, so even if the client
            // disconnects and this handler future is dropped mid-await, the
            // lobby still reaches Done or Failed instead of sitting in
            // Completing forever.
            let generation = tokio::spawn(run_generation(Arc::clone(state), lobby_id, request));
            match generation.await {
                Ok(Ok(results)) => Ok(TurnOutcome::Completed { results }),
                Ok(Err(err)) => Err(ServiceError::Gateway(err)),
                Err(err) => {
                    warn!(lobby = %lobby_id, error = %err, "song generation task crashed");
                    Err(ServiceError::Internal("song generation task crashed".into()))
                }
            }
        }
    }
}

/// Drive one generation call to its terminal lobby phase.
///
/// Runs detached from the submitting request so the write-back survives
/// handler cancellation.
async fn run_generation(
    state: SharedState,
    lobby_id: Uuid,
    request: GenerationRequest,
) -> GatewayResult<Vec<SongResult>> {
    match state.gateway().generate(request).await {
        Ok(results) => {
            state.lobbies().finish(lobby_id, results.clone());
            info!(lobby = %lobby_id, songs = results.len(), "song generation completed");
            broadcast_songs_ready(&state, lobby_id);
            Ok(results)
        }
        Err(err) => {
            warn!(lobby = %lobby_id, error = %err, "song generation failed");
            state.lobbies().fail(lobby_id, err.kind());
            Err(err)
        }
    }
}

/// Best-effort "your turn" push. A disconnected player is never fatal to the
/// turn flow; they can still discover their turn by polling the lobby.
fn notify_turn(state: &SharedState, player: &str, lobby_id: Uuid) {
    match state
        .connections()
        .notify(player, &ServerMessage::YourTurn { lobby_id })
    {
        Ok(()) => debug!(lobby = %lobby_id, player = %player, "turn notification pushed"),
        Err(NotifyError::NotConnected(_)) => {
            debug!(lobby = %lobby_id, player = %player, "next player not connected; relying on polling")
        }
        Err(err @ NotifyError::SendFailed(_)) => {
            warn!(lobby = %lobby_id, player = %player, error = %err, "turn notification failed")
        }
    }
}

/// Tell every lobby member the songs are ready, best-effort.
fn broadcast_songs_ready(state: &SharedState, lobby_id: Uuid) {
    let Some(lobby) = state.lobbies().snapshot(lobby_id) else {
        return;
    };
    for player in &lobby.players {
        if let Err(err) = state
            .connections()
            .notify(&player.name, &ServerMessage::SongsReady { lobby_id })
        {
            debug!(lobby = %lobby_id, player = %player.name, error = %err, "songs-ready push skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::gateway::SongGenerator;
    use crate::gateway::error::{GatewayError, GatewayErrorKind, GatewayResult};
    use crate::state::AppState;
    use crate::state::lobby::LobbyPhase;
    use futures::future::BoxFuture;
    use std::sync::{Arc, Mutex};

    /// Scripted gateway double recording every request it receives.
    struct StubGenerator {
        behavior: StubBehavior,
        calls: Mutex<Vec<GenerationRequest>>,
    }

    enum StubBehavior {
        Songs(Vec<SongResult>),
        Timeout,
        Empty,
    }

    impl StubGenerator {
        fn new(behavior: StubBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<GenerationRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SongGenerator for StubGenerator {
        fn generate(
            &self,
            request: GenerationRequest,
        ) -> BoxFuture<'static, GatewayResult<Vec<SongResult>>> {
            self.calls.lock().unwrap().push(request);
            let result = match &self.behavior {
                StubBehavior::Songs(songs) => Ok(songs.clone()),
                StubBehavior::Timeout => Err(GatewayError::Timeout),
                StubBehavior::Empty => Err(GatewayError::EmptyResult),
            };
            Box::pin(async move { result })
        }
    }

    /// Gateway double that signals when invoked, then dawdles before
    /// answering, leaving a window where the caller can go away.
    struct SlowGenerator {
        started: Mutex<Option<tokio::sync::oneshot::Sender<()>>>,
        songs: Vec<SongResult>,
    }

    impl SongGenerator for SlowGenerator {
        fn generate(
            &self,
            _request: GenerationRequest,
        ) -> BoxFuture<'static, GatewayResult<Vec<SongResult>>> {
            let started = self.started.lock().unwrap().take();
            let songs = self.songs.clone();
            Box::pin(async move {
                if let Some(tx) = started {
                    let _ = tx.send(());
                }
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                Ok(songs)
            })
        }
    }

    fn song(id: &str) -> SongResult {
        SongResult {
            id: id.into(),
            title: "Moonlight".into(),
            audio_url: "https://cdn.example/a.mp3".into(),
            image_url: "https://cdn.example/a.png".into(),
            lyric: "line one".into(),
            tags: "rock".into(),
        }
    }

    fn state_with(generator: Arc<StubGenerator>) -> SharedState {
        AppState::new(AppConfig::default(), generator)
    }

    #[tokio::test]
    async fn full_round_ends_done_with_results() {
        let generator = StubGenerator::new(StubBehavior::Songs(vec![song("s1"), song("s2")]));
        let state = state_with(Arc::clone(&generator));

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        state.lobbies().join(lobby.id, "bob".into()).unwrap();

        let outcome = submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Advanced {
                next_player: "bob".into()
            }
        );

        let outcome = submit_turn(&state, lobby.id, "bob", "line one".into())
            .await
            .unwrap();
        let TurnOutcome::Completed { results } = outcome else {
            panic!("expected completion");
        };
        assert_eq!(results.len(), 2);

        // Gateway received the joined verses and the genre as tags.
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt(), "line one");
        assert_eq!(calls[0].genre, "rock");
        assert_eq!(calls[0].title, "MusicTitle");

        let snapshot = state.lobbies().snapshot(lobby.id).unwrap();
        assert!(matches!(snapshot.phase, LobbyPhase::Done { .. }));
    }

    #[tokio::test]
    async fn out_of_turn_submission_never_reaches_the_gateway() {
        let generator = StubGenerator::new(StubBehavior::Songs(vec![song("s1")]));
        let state = state_with(Arc::clone(&generator));

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        state.lobbies().join(lobby.id, "bob".into()).unwrap();

        let err = submit_turn(&state, lobby.id, "carol", "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotYourTurn { .. }));
        assert!(generator.calls().is_empty());

        let snapshot = state.lobbies().snapshot(lobby.id).unwrap();
        assert_eq!(snapshot.phase, LobbyPhase::Collecting { turn: 0 });
        assert!(snapshot.genre.is_none());
    }

    #[tokio::test]
    async fn unknown_lobby_is_not_found() {
        let state = state_with(StubGenerator::new(StubBehavior::Empty));
        let err = submit_turn(&state, Uuid::new_v4(), "alice", "x".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LobbyNotFound(_)));
    }

    #[tokio::test]
    async fn gateway_timeout_marks_lobby_failed_and_locks_it() {
        let state = state_with(StubGenerator::new(StubBehavior::Timeout));

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        let err = submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(GatewayError::Timeout)));

        let snapshot = state.lobbies().snapshot(lobby.id).unwrap();
        assert_eq!(
            snapshot.phase,
            LobbyPhase::Failed {
                reason: GatewayErrorKind::Timeout
            }
        );

        // The lobby is terminal; a repeat submission is rejected.
        let err = submit_turn(&state, lobby.id, "alice", "again".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LobbyClosed));
    }

    #[tokio::test]
    async fn empty_gateway_result_marks_lobby_failed() {
        let state = state_with(StubGenerator::new(StubBehavior::Empty));

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        let err = submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Gateway(GatewayError::EmptyResult)
        ));

        let snapshot = state.lobbies().snapshot(lobby.id).unwrap();
        assert_eq!(
            snapshot.phase,
            LobbyPhase::Failed {
                reason: GatewayErrorKind::EmptyResult
            }
        );
        assert!(snapshot.verses.is_empty());
    }

    #[tokio::test]
    async fn turn_advance_pushes_notification_to_next_player() {
        let generator = StubGenerator::new(StubBehavior::Songs(vec![song("s1")]));
        let state = state_with(generator);

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        state.lobbies().join(lobby.id, "bob".into()).unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        state.connections().register("bob".into(), tx);

        submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap();

        let axum::extract::ws::Message::Text(text) = rx.try_recv().unwrap() else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "your_turn");
        assert_eq!(value["lobby_id"], lobby.id.to_string());
    }

    fn received_songs_ready(
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<axum::extract::ws::Message>,
    ) -> bool {
        while let Ok(frame) = rx.try_recv() {
            if let axum::extract::ws::Message::Text(text) = frame {
                let value: serde_json::Value = serde_json::from_str(&text).unwrap();
                if value["type"] == "songs_ready" {
                    return true;
                }
            }
        }
        false
    }

    #[tokio::test]
    async fn completion_broadcasts_songs_ready_to_every_member() {
        let generator = StubGenerator::new(StubBehavior::Songs(vec![song("s1")]));
        let state = state_with(generator);

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        state.lobbies().join(lobby.id, "bob".into()).unwrap();

        let (alice_tx, mut alice_rx) = tokio::sync::mpsc::unbounded_channel();
        let (bob_tx, mut bob_rx) = tokio::sync::mpsc::unbounded_channel();
        state.connections().register("alice".into(), alice_tx);
        state.connections().register("bob".into(), bob_tx);

        submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap();
        submit_turn(&state, lobby.id, "bob", "line one".into())
            .await
            .unwrap();

        // Bob's channel holds a your_turn frame first; both must also see
        // the songs_ready push.
        assert!(received_songs_ready(&mut alice_rx));
        assert!(received_songs_ready(&mut bob_rx));
    }

    #[tokio::test]
    async fn disconnecting_submitter_does_not_strand_the_lobby() {
        let (started_tx, started_rx) = tokio::sync::oneshot::channel();
        let generator = Arc::new(SlowGenerator {
            started: Mutex::new(Some(started_tx)),
            songs: vec![song("s1")],
        });
        let state = AppState::new(AppConfig::default(), generator);

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());

        let submission = tokio::spawn({
            let state = Arc::clone(&state);
            async move { submit_turn(&state, lobby.id, "alice", "rock".into()).await }
        });

        // Wait until the generation call is in flight, then drop the request
        // the way a vanished client would.
        started_rx.await.unwrap();
        submission.abort();

        // The write-back must still land; the lobby may not stay Completing.
        let mut phase = state.lobbies().snapshot(lobby.id).unwrap().phase;
        for _ in 0..200 {
            if phase != LobbyPhase::Completing {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            phase = state.lobbies().snapshot(lobby.id).unwrap().phase;
        }
        assert!(matches!(phase, LobbyPhase::Done { .. }));
    }

    #[tokio::test]
    async fn disconnected_next_player_does_not_block_the_turn() {
        let generator = StubGenerator::new(StubBehavior::Songs(vec![song("s1")]));
        let state = state_with(generator);

        let lobby = state.lobbies().create("alice".into(), "MusicTitle".into());
        state.lobbies().join(lobby.id, "bob".into()).unwrap();

        // Nobody is connected; the advance must still succeed.
        let outcome = submit_turn(&state, lobby.id, "alice", "rock".into())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Advanced {
                next_player: "bob".into()
            }
        );
        assert_eq!(
            state.lobbies().snapshot(lobby.id).unwrap().phase,
            LobbyPhase::Collecting { turn: 1 }
        );
    }
}
