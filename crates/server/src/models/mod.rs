mod chatroom;
mod message;
mod user;

pub use chatroom::*;
pub use message::*;
pub use user::*;
