pub mod config;
pub mod controller;
pub mod error;
pub mod feed;
pub mod generate;
pub mod highlight;
pub mod matches;
pub mod session;
pub mod store;
pub mod types;
pub mod view_state;
pub mod windowing;

pub use config::{BoardConfig, HighlightPolicy};
pub use controller::{BoardController, BoardPhase, BoardSnapshot};
pub use error::{BoardError, ViewStateError};
pub use feed::{FeedConfig, FeedSubscription, UpdateFeed};
pub use generate::{generate_matches, generate_matches_seeded};
pub use highlight::HighlightManager;
pub use matches::MatchStore;
pub use session::{BoardCommand, BoardHandle, BoardSession};
pub use store::{DuckDbStore, StorageMode, StoreError};
pub use types::{
    AppliedUpdate, BettingOption, BoardStats, Direction, Highlights, MarketCategory, Match, Price,
    Sport, UpdateEvent, VisibleRange,
};
pub use view_state::{SessionBackend, ViewState};
pub use windowing::compute_visible_range;
