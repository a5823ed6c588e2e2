pub mod choice;
pub mod command;
pub mod draft;
mod keyboards;
pub mod pagination;
pub mod picker;
pub mod reply;
pub mod session;
pub mod stats;
pub mod steps;

pub use command::Command;
pub use reply::{Button, Keyboard, Reply};
pub use session::{handle_update, BotContext, Inbound, Session};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
