pub mod get;

pub use get::get as get_leaderboard;
