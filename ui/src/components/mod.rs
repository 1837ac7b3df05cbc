pub mod loading_pulse;
pub mod odds_button;
