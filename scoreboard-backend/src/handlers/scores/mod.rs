pub mod create;
pub mod dto;

pub use create::create as create_score;
