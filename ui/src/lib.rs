mod board;
pub mod components;
mod live;
pub mod logging;
pub mod store;

pub use board::{BoardView, launch_board};
pub use live::{start_board, tokio_runtime};
