pub mod animation;
pub mod input;
pub mod session;
pub mod time;
