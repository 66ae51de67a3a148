use crate::bot::keyboards::Keyboard;
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::ChatId;
use teloxide::RequestError;

/// The one transport operation the handlers need. Keeping it behind a trait
/// lets tests record outgoing messages without a Telegram connection.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), RequestError>;
}

#[async_trait]
impl BotApi for teloxide::Bot {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), RequestError> {
        Requester::send_message(self, ChatId(chat_id), text)
            .reply_markup(keyboard.markup())
            .await?;
        Ok(())
    }
}
