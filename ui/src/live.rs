use std::sync::OnceLock;

use odds_core::{BoardConfig, BoardHandle, BoardSession, ViewState};

pub fn tokio_runtime() -> &'static tokio::runtime::Runtime {
    static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("tokio runtime")
    })
}

/// Start a board session on the shared runtime.
pub fn start_board(config: BoardConfig, view_state: ViewState) -> BoardHandle {
    BoardSession::spawn(config, view_state, tokio_runtime().handle())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use odds_core::BoardPhase;

    use super::*;

    #[test]
    fn board_runs_on_the_shared_runtime() {
        let config = BoardConfig {
            total_matches: 25,
            update_interval: Duration::from_millis(20),
            seed: Some(5),
            ..BoardConfig::default()
        };
        let handle = start_board(config, ViewState::in_memory().expect("view state"));
        let mut snapshots = handle.subscribe();
        tokio_runtime().block_on(async move {
            let ready = snapshots
                .wait_for(|s| s.phase == BoardPhase::Ready)
                .await
                .expect("session alive")
                .clone();
            assert_eq!(ready.total_rows, 25);
            handle.shutdown();
            handle.join().await.expect("session task");
        });
    }
}
