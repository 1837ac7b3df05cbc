use std::future::pending;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::config::BoardConfig;
use crate::controller::{BoardController, BoardSnapshot};
use crate::error::BoardError;
use crate::feed::{FeedSubscription, UpdateFeed};
use crate::generate::generate_matches_seeded;
use crate::matches::sample_change;
use crate::types::{Match, UpdateEvent};
use crate::view_state::ViewState;

#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    Scroll { offset: f32 },
    Resize { viewport_height: f32 },
    ToggleSelection(String),
    Shutdown,
}

/// Front end of a running board session. Commands are fire-and-forget;
/// state comes back as snapshots. Dropping the handle ends the session.
pub struct BoardHandle {
    commands: mpsc::UnboundedSender<BoardCommand>,
    snapshots: watch::Receiver<Arc<BoardSnapshot>>,
    task: JoinHandle<()>,
}

impl BoardHandle {
    fn send(&self, command: BoardCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn scroll_to(&self, offset: f32) -> bool {
        self.send(BoardCommand::Scroll { offset })
    }

    pub fn resize(&self, viewport_height: f32) -> bool {
        self.send(BoardCommand::Resize { viewport_height })
    }

    pub fn toggle_selection(&self, option_id: impl Into<String>) -> bool {
        self.send(BoardCommand::ToggleSelection(option_id.into()))
    }

    pub fn shutdown(&self) -> bool {
        self.send(BoardCommand::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.snapshots.clone()
    }

    /// Wait for the session task to finish. Closes the command channel first,
    /// so a session still running winds down on its own.
    pub async fn join(self) -> Result<(), JoinError> {
        let BoardHandle { commands, task, .. } = self;
        drop(commands);
        task.await
    }
}

/// The task that owns the board. Commands, feed events and highlight expiries
/// are handled one at a time; every change is published as a new snapshot.
pub struct BoardSession {
    config: BoardConfig,
    view_state: ViewState,
    commands: mpsc::UnboundedReceiver<BoardCommand>,
    snapshots: watch::Sender<Arc<BoardSnapshot>>,
}

impl BoardSession {
    pub fn spawn(config: BoardConfig, view_state: ViewState, runtime: &Handle) -> BoardHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let initial = Arc::new(BoardSnapshot::loading(&config, view_state.scroll_offset()));
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let session = BoardSession {
            config,
            view_state,
            commands: command_rx,
            snapshots: snapshot_tx,
        };
        let task = runtime.spawn(session.run());
        BoardHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }

    async fn run(self) {
        let BoardSession {
            config,
            view_state,
            mut commands,
            snapshots,
        } = self;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let count = config.total_matches;
        let seed = config.seed;
        let mut generator = Some(tokio::task::spawn_blocking(move || {
            generate_matches_seeded(count, seed)
        }));
        let mut controller = BoardController::new(config, view_state);
        let mut feed: Option<UpdateFeed> = None;
        let mut subscription: Option<FeedSubscription> = None;
        publish(&snapshots, &controller);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let command = match command {
                        Some(BoardCommand::Shutdown) | None => break,
                        Some(command) => command,
                    };
                    apply_command(&mut controller, feed.as_ref(), command);
                }
                generated = join_generator(&mut generator) => {
                    generator = None;
                    let loaded = generated
                        .map_err(|err| BoardError::Generator(err.to_string()))
                        .and_then(|matches| controller.load(matches));
                    if let Err(err) = loaded {
                        error!(%err, "board failed to load");
                        continue;
                    }
                    let started = UpdateFeed::new(controller.config().feed_config(), controller.match_count());
                    started.set_visible_range(controller.visible_range());
                    subscription = Some(started.subscribe());
                    started.start();
                    feed = Some(started);
                }
                event = next_feed_event(&mut subscription) => {
                    match event {
                        Some(event) => {
                            let change = sample_change(&mut rng);
                            if let Some(applied) = controller.apply_event(&event, change) {
                                debug!(
                                    option_id = %applied.option_id,
                                    old = %applied.old_value,
                                    new = %applied.new_value,
                                    direction = applied.direction.label(),
                                    "price updated"
                                );
                            }
                        }
                        None => subscription = None,
                    }
                }
                Some(option_id) = controller.next_expired(), if controller.has_highlights() => {
                    debug!(%option_id, "highlight expired");
                }
            }
            publish(&snapshots, &controller);
        }

        if let Some(feed) = feed.take() {
            if let Some(subscription) = subscription.take() {
                feed.unsubscribe(subscription.id);
            }
            feed.stop();
        }
        controller.teardown();
        publish(&snapshots, &controller);
        info!(stats = ?controller.stats(), "board session finished");
    }
}

fn apply_command(controller: &mut BoardController, feed: Option<&UpdateFeed>, command: BoardCommand) {
    match command {
        BoardCommand::Scroll { offset } => {
            controller.on_scroll(offset);
        }
        BoardCommand::Resize { viewport_height } => controller.set_viewport_height(viewport_height),
        BoardCommand::ToggleSelection(option_id) => {
            controller.toggle_selection(&option_id);
        }
        BoardCommand::Shutdown => {}
    }
    if let Some(feed) = feed {
        feed.set_visible_range(controller.visible_range());
    }
}

fn publish(snapshots: &watch::Sender<Arc<BoardSnapshot>>, controller: &BoardController) {
    snapshots.send_replace(Arc::new(controller.snapshot()));
}

async fn join_generator(
    generator: &mut Option<JoinHandle<Vec<Match>>>,
) -> Result<Vec<Match>, JoinError> {
    match generator {
        Some(task) => task.await,
        None => pending().await,
    }
}

async fn next_feed_event(subscription: &mut Option<FeedSubscription>) -> Option<UpdateEvent> {
    match subscription {
        Some(subscription) => subscription.receiver.recv().await,
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::HighlightPolicy;
    use crate::controller::BoardPhase;
    use crate::types::VisibleRange;

    fn config(update_interval: Duration) -> BoardConfig {
        BoardConfig {
            total_matches: 60,
            update_interval,
            highlight_duration: Duration::from_millis(1_000),
            visible_bias: 0.7,
            row_height: 80.0,
            viewport_height: 400.0,
            highlight_policy: HighlightPolicy::Always,
            seed: Some(21),
        }
    }

    fn spawn(update_interval: Duration) -> BoardHandle {
        BoardSession::spawn(
            config(update_interval),
            ViewState::in_memory().unwrap(),
            &Handle::current(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn session_loads_and_serves_commands() {
        let handle = spawn(Duration::from_secs(60));
        assert_eq!(handle.snapshot().phase, BoardPhase::Loading);

        let mut snapshots = handle.subscribe();
        let ready = snapshots
            .wait_for(|s| s.phase == BoardPhase::Ready)
            .await
            .unwrap()
            .clone();
        assert_eq!(ready.total_rows, 60);
        assert_eq!(ready.visible_range, VisibleRange { start: 0, end: 15 });

        handle.scroll_to(160.0);
        snapshots
            .wait_for(|s| s.visible_range == VisibleRange { start: 2, end: 17 })
            .await
            .unwrap();

        handle.toggle_selection("match-3-Total-Over 2.5");
        let selected = snapshots
            .wait_for(|s| s.stats.selected == 1)
            .await
            .unwrap()
            .clone();
        assert!(selected.selected.contains("match-3-Total-Over 2.5"));
        assert_eq!(selected.row(3).unwrap().id, "match-3");

        handle.resize(800.0);
        snapshots
            .wait_for(|s| s.visible_range == VisibleRange { start: 2, end: 22 })
            .await
            .unwrap();

        assert!(handle.shutdown());
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn feed_updates_flash_then_lapse() {
        let handle = spawn(Duration::from_secs(5));
        let mut snapshots = handle.subscribe();
        let flashed = snapshots
            .wait_for(|s| !s.highlights.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(flashed.highlights.len(), 1);

        let lapsed = snapshots
            .wait_for(|s| s.highlights.is_empty())
            .await
            .unwrap()
            .clone();
        assert_eq!(lapsed.phase, BoardPhase::Ready);
        handle.shutdown();
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_clears_pending_highlights() {
        let handle = spawn(Duration::from_millis(100));
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| !s.highlights.is_empty())
            .await
            .unwrap();

        handle.shutdown();
        handle.join().await.unwrap();
        let last = snapshots.borrow_and_update().clone();
        assert!(last.highlights.is_empty());
        assert!(snapshots.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_ends_the_session() {
        let handle = spawn(Duration::from_millis(100));
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| s.phase == BoardPhase::Ready)
            .await
            .unwrap();
        drop(handle);
        while snapshots.changed().await.is_ok() {}
        assert!(snapshots.borrow().highlights.is_empty());
    }

    fn match_index(option_id: &str) -> usize {
        option_id
            .strip_prefix("match-")
            .and_then(|rest| rest.split('-').next())
            .and_then(|index| index.parse().ok())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn scrolling_retargets_the_feed() {
        let handle = BoardSession::spawn(
            BoardConfig {
                visible_bias: 1.0,
                highlight_duration: Duration::from_millis(50),
                ..config(Duration::from_millis(100))
            },
            ViewState::in_memory().unwrap(),
            &Handle::current(),
        );
        let mut snapshots = handle.subscribe();
        snapshots
            .wait_for(|s| s.phase == BoardPhase::Ready)
            .await
            .unwrap();

        handle.scroll_to(40.0 * 80.0);
        let scrolled = snapshots
            .wait_for(|s| s.visible_range.start == 40)
            .await
            .unwrap()
            .visible_range;
        assert_eq!(scrolled, VisibleRange { start: 40, end: 55 });
        snapshots
            .wait_for(|s| s.highlights.is_empty())
            .await
            .unwrap();

        let mut updates = 0;
        while updates < 10 {
            snapshots.changed().await.unwrap();
            let snapshot = snapshots.borrow_and_update().clone();
            for option_id in snapshot.highlights.keys() {
                let index = match_index(option_id);
                assert!(scrolled.contains(index), "{option_id} outside {scrolled:?}");
                updates += 1;
            }
        }

        handle.shutdown();
        handle.join().await.unwrap();
    }
}
