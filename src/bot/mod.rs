pub mod commands;
pub mod dispatcher;
pub mod handler;
pub mod keyboards;
pub mod labels;
pub mod state;
pub mod traits;

pub use commands::Commands;
pub use dispatcher::{start_bot, BotDispatcher};
pub use handler::{route, MessageHandler, Route};
pub use keyboards::Keyboard;
pub use labels::Label;
pub use state::{ConversationState, StateStore};
pub use traits::BotApi;
