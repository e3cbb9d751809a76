pub mod dto;
pub mod exists;

pub use exists::exists as user_exists;
