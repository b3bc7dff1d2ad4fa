//! Data models for Tessera

mod club;
mod event;
mod newsletter;
mod registration;
mod token;
mod user;

pub use club::*;
pub use event::*;
pub use newsletter::*;
pub use registration::*;
pub use token::*;
pub use user::*;
