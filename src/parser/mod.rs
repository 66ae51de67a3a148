pub mod message;
pub mod patterns;

pub use message::MessageParser;
pub use patterns::Patterns;
