use crate::bot::keyboards::Keyboard;
use crate::bot::traits::BotApi;
use crate::database::Database;
use crate::error::Result;
use crate::utils::{Formatter, Logger};
use log::info;

#[derive(Clone)]
pub struct Commands {
    db: Database,
    income_categories: Vec<String>,
}

impl Commands {
    pub fn new(db: Database, income_categories: Vec<String>) -> Self {
        Self {
            db,
            income_categories,
        }
    }

    pub async fn handle_command(
        &self,
        bot: &dyn BotApi,
        chat_id: i64,
        command: &str,
    ) -> Result<()> {
        match command {
            "/start" => self.handle_start(bot, chat_id).await,
            "/help" => self.handle_help(bot, chat_id).await,
            _ => {
                bot.send_message(
                    chat_id,
                    "Неизвестная команда. Отправьте /help для справки.",
                    Keyboard::Main,
                )
                .await?;
                Ok(())
            }
        }
    }

    async fn handle_start(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.get_user_balance(chat_id).await {
            Ok(balance) => {
                bot.send_message(
                    chat_id,
                    &format!(
                        "Привет! Отправь операцию в формате: \"Категория, Сумма\"\n\
                         Например: \"Продукты, 1500\" - для расходов\n\
                         Или: \"Зарплата, 50000\" - для доходов\n\n\
                         Доходы: {}\n\n\
                         Текущий баланс: {}\n\n\
                         Используй кнопки для просмотра статистики 📊 или настроек ⚙️",
                        self.income_categories.join(", "),
                        Formatter::format_rub(balance)
                    ),
                    Keyboard::Main,
                )
                .await?;
                info!("✅ User {chat_id} started the bot");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "handle_start", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Main)
                    .await?;
            }
        }
        Ok(())
    }

    async fn handle_help(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        bot.send_message(
            chat_id,
            &format!(
                "BudgetBot помогает вести учёт личных финансов.\n\n\
                 Команды:\n\
                 /start - начать работу\n\
                 /help - эта справка\n\n\
                 Запись операции: \"Категория, Сумма\"\n\
                 Например: \"Продукты, 1500\" или \"Зарплата, 50000\"\n\n\
                 Категории доходов: {}\n\
                 Всё остальное считается расходом.\n\n\
                 Кнопки:\n\
                 📊 Статистика - отчёты за день, неделю и месяц\n\
                 ⚙️ Настройки - баланс, валюты и сброс данных",
                self.income_categories.join(", ")
            ),
            Keyboard::Main,
        )
        .await?;
        Ok(())
    }
}
