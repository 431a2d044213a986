pub mod broadcast;
pub mod controller;
pub mod error;
pub mod store;
pub mod types;

pub use broadcast::{ChatEvent, ChatNotifier};
pub use controller::{ChatController, StreamHandle, CANCEL_GRACE};
pub use error::ChatError;
pub use store::MessageLog;
pub use types::{Message, MessageContent, Phase, Sender, SessionSnapshot};
