pub mod config;
pub mod form;
pub mod h2h;
pub mod http_client;
pub mod match_dataset;
pub mod outcome;
pub mod patterns;
pub mod player_dataset;
pub mod props;
pub mod rankings;
pub mod report_export;
pub mod rolling;
pub mod season_fetch;
pub mod state;
pub mod store;
pub mod team_names;
