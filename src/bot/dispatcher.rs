use anyhow::Result;
use log::{debug, error, info};
use teloxide::{
    prelude::*,
    types::{MediaKind, MessageKind},
    utils::command::BotCommands,
    RequestError,
};

use crate::bot::commands::Commands;
use crate::bot::handler::MessageHandler;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "показать справку")]
    Help,
}

pub struct BotDispatcher {
    message_handler: MessageHandler,
    commands: Commands,
}

impl BotDispatcher {
    pub fn new(message_handler: MessageHandler, commands: Commands) -> Self {
        Self {
            message_handler,
            commands,
        }
    }

    pub async fn run(self, bot: Bot) -> Result<()> {
        info!("🤖 Starting BudgetBot dispatcher...");

        let handler = self.message_handler.clone();
        let commands = self.commands.clone();

        Dispatcher::builder(
            bot,
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(
                    move |bot: Bot, msg: Message, cmd: Command| {
                        let commands = commands.clone();
                        async move {
                            debug!("Handling command: {cmd:?}");

                            let command_str = match cmd {
                                Command::Start => "/start",
                                Command::Help => "/help",
                            };

                            let chat_id = msg.chat.id.0;
                            if let Err(e) = commands.handle_command(&bot, chat_id, command_str).await
                            {
                                error!(
                                    "[{}] Failed to handle command {command_str} for chat {chat_id}: {e}",
                                    e.severity()
                                );
                            }

                            Ok::<(), RequestError>(())
                        }
                    },
                ))
                .branch(
                    dptree::filter(|msg: Message| msg.text().is_some()).endpoint(
                        move |bot: Bot, msg: Message| {
                            let handler = handler.clone();
                            async move {
                                if let MessageKind::Common(common_msg) = &msg.kind {
                                    if let MediaKind::Text(media) = &common_msg.media_kind {
                                        let chat_id = msg.chat.id.0;
                                        debug!("Handling message from chat: {chat_id}");

                                        if let Err(e) =
                                            handler.handle_message(&bot, chat_id, &media.text).await
                                        {
                                            error!(
                                                "[{}] Failed to handle message from chat {chat_id}: {e}",
                                                e.severity()
                                            );

                                            let error_text =
                                                "❌ Произошла ошибка при обработке сообщения, попробуйте позже";
                                            if let Err(send_err) =
                                                bot.send_message(msg.chat.id, error_text).await
                                            {
                                                error!("Failed to send error message: {send_err}");
                                            }
                                        }
                                    }
                                }

                                Ok::<(), RequestError>(())
                            }
                        },
                    ),
                ),
        )
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

        Ok(())
    }
}

/// Connects to the Bot API and runs the long-polling dispatcher until Ctrl-C.
pub async fn start_bot(
    token: &str,
    message_handler: MessageHandler,
    commands: Commands,
) -> Result<()> {
    info!("🚀 Initializing Telegram Bot...");

    let bot = Bot::new(token);

    match bot.get_me().await {
        Ok(me) => {
            info!("✅ Bot connected successfully:");
            info!("  - Username: @{}", me.username());
            info!("  - Name: {}", me.first_name);
            info!("  - ID: {}", me.id);
        }
        Err(e) => {
            error!("❌ Failed to connect to Telegram Bot API: {e}");
            return Err(anyhow::anyhow!("Bot connection failed: {}", e));
        }
    }

    let dispatcher = BotDispatcher::new(message_handler, commands);

    info!("🎯 Starting message processing...");
    info!("💡 Bot is now ready to receive messages!");

    dispatcher.run(bot).await?;

    Ok(())
}
