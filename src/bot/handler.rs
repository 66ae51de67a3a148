use crate::bot::keyboards::Keyboard;
use crate::bot::labels::{self, Label};
use crate::bot::state::{ConversationState, StateStore};
use crate::bot::traits::BotApi;
use crate::calculator::{aggregate, Period};
use crate::database::Database;
use crate::error::{BudgetBotError, Result};
use crate::parser::MessageParser;
use crate::utils::{Formatter, Logger};
use chrono::Local;
use log::{info, warn};

/// Where an incoming text goes. Strict precedence: a recognized button
/// caption always wins over an active mode, the active mode wins over
/// transaction parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Label(Label),
    Mode(ConversationState),
    Transaction,
}

pub fn route(state: &ConversationState, text: &str) -> Route {
    if let Some(label) = Label::from_caption(text) {
        return Route::Label(label);
    }

    match state {
        ConversationState::Idle => Route::Transaction,
        active => Route::Mode(active.clone()),
    }
}

#[derive(Clone)]
pub struct MessageHandler {
    db: Database,
    states: StateStore,
    parser: MessageParser,
}

impl MessageHandler {
    pub fn new(db: Database, parser: MessageParser) -> Self {
        Self {
            db,
            states: StateStore::new(),
            parser,
        }
    }

    pub async fn handle_message(&self, bot: &dyn BotApi, chat_id: i64, text: &str) -> Result<()> {
        let state = self.states.get(chat_id).await;

        match route(&state, text) {
            Route::Label(label) => self.run_label(bot, chat_id, label).await,
            Route::Mode(mode) => match self.run_mode(bot, chat_id, &mode, text).await {
                Err(BudgetBotError::UnknownState) => {
                    warn!("Chat {chat_id}: input in unrecognized mode, clearing state");
                    self.states.clear(chat_id).await;
                    Ok(())
                }
                other => other,
            },
            Route::Transaction => self.record_operation(bot, chat_id, text).await,
        }
    }

    async fn run_label(&self, bot: &dyn BotApi, chat_id: i64, label: Label) -> Result<()> {
        match label {
            Label::StatisticsMenu => self.show_statistics_menu(bot, chat_id).await,
            Label::SettingsMenu => self.show_settings_menu(bot, chat_id).await,
            Label::Statistics(period) => self.show_statistics(bot, chat_id, period).await,
            Label::SetBalance => self.start_set_balance(bot, chat_id).await,
            Label::ResetBalance => self.start_reset_balance(bot, chat_id).await,
            Label::CurrenciesMenu => self.show_currencies_menu(bot, chat_id).await,
            Label::DeleteAllData => self.start_delete_all_data(bot, chat_id).await,
            Label::Back => self.show_main_menu(bot, chat_id).await,
            Label::Cancel => self.cancel_operation(bot, chat_id).await,
            Label::ConfirmDeleteAll => self.process_delete_all_data(bot, chat_id).await,
            Label::OpenCurrency(code) => self.open_currency(bot, chat_id, code).await,
            Label::DeleteCurrencyMenu => self.show_delete_currency_menu(bot, chat_id).await,
            Label::DeleteCurrency(code) => self.delete_currency(bot, chat_id, code).await,
        }
    }

    async fn run_mode(
        &self,
        bot: &dyn BotApi,
        chat_id: i64,
        mode: &ConversationState,
        text: &str,
    ) -> Result<()> {
        match mode {
            ConversationState::SettingBalance => {
                self.process_balance_input(bot, chat_id, text).await
            }
            ConversationState::ResettingBalance => {
                self.process_reset_balance(bot, chat_id, text).await
            }
            ConversationState::DeletingAllData => {
                self.remind_delete_confirmation(bot, chat_id).await
            }
            ConversationState::SettingCurrency(code) => {
                self.process_currency_input(bot, chat_id, code, text).await
            }
            // The router never sends Idle here; treat it as a corrupted flag.
            ConversationState::Idle => Err(BudgetBotError::UnknownState),
        }
    }

    /// No active mode, no button: the text is a "Категория, Сумма" line.
    async fn record_operation(&self, bot: &dyn BotApi, chat_id: i64, text: &str) -> Result<()> {
        let operation = match self.parser.parse(text) {
            Ok(operation) => operation,
            Err(err) => {
                warn!("User {chat_id} input error: {err}");
                bot.send_message(chat_id, err.user_message(), Keyboard::Main)
                    .await?;
                return Ok(());
            }
        };

        let date = Local::now().date_naive();
        match self
            .db
            .add_transaction(
                chat_id,
                date,
                &operation.category,
                operation.amount,
                operation.is_income,
            )
            .await
        {
            Ok(()) => {
                let kind_word = if operation.is_income { "доход" } else { "расход" };
                bot.send_message(
                    chat_id,
                    &format!(
                        "✅ Запись добавлена: {} - {:.2} руб. ({kind_word})",
                        operation.category, operation.amount
                    ),
                    Keyboard::Main,
                )
                .await?;
                info!(
                    "✅ User {chat_id} added {kind_word}: {} - {:.2}",
                    operation.category, operation.amount
                );
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "add_transaction", &err);
                bot.send_message(
                    chat_id,
                    "❌ Произошла ошибка при добавлении записи",
                    Keyboard::Main,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn show_main_menu(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        let overview = async {
            let balance = self.db.get_user_balance(chat_id).await?;
            let currencies = self.db.get_user_currencies(chat_id).await?;
            Ok::<_, BudgetBotError>(Formatter::balances_overview(balance, &currencies))
        }
        .await;

        match overview {
            Ok(overview) => {
                bot.send_message(
                    chat_id,
                    &format!("Главное меню\n\n{overview}"),
                    Keyboard::Main,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "show_main_menu", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Main)
                    .await?;
            }
        }
        Ok(())
    }

    async fn show_statistics_menu(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        bot.send_message(
            chat_id,
            "Выберите период для просмотра статистики:",
            Keyboard::Statistics,
        )
        .await?;
        Ok(())
    }

    async fn show_settings_menu(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        let summary = async {
            let balance = self.db.get_user_balance(chat_id).await?;
            let transactions = self.db.get_transactions(chat_id).await?;
            let currencies = self.db.get_user_currencies(chat_id).await?;
            Ok::<_, BudgetBotError>((balance, transactions.len(), currencies.len()))
        }
        .await;

        match summary {
            Ok((balance, transactions_count, currencies_count)) => {
                bot.send_message(
                    chat_id,
                    &format!(
                        "⚙️ Настройки\n\n\
                         Текущий баланс: {}\n\
                         Количество операций: {transactions_count}\n\
                         Количество валют: {currencies_count}\n\n\
                         Выберите действие:",
                        Formatter::format_rub(balance)
                    ),
                    Keyboard::Settings,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "show_settings_menu", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Main)
                    .await?;
            }
        }
        Ok(())
    }

    async fn show_statistics(&self, bot: &dyn BotApi, chat_id: i64, period: Period) -> Result<()> {
        let today = Local::now().date_naive();
        let (start, end) = period.bounds(today);

        let report = async {
            let transactions = self
                .db
                .get_transactions_by_period(chat_id, start, end)
                .await?;
            let stats = aggregate(&transactions);
            let balance = self.db.get_user_balance(chat_id).await?;
            let currencies = self.db.get_user_currencies(chat_id).await?;
            Ok::<_, BudgetBotError>(Formatter::statistics_report(
                period,
                start,
                end,
                &stats,
                balance,
                &currencies,
            ))
        }
        .await;

        match report {
            Ok(report) => {
                bot.send_message(chat_id, &report, Keyboard::Statistics).await?;
                info!("✅ User {chat_id} viewed {period:?} statistics");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "show_statistics", &err);
                bot.send_message(
                    chat_id,
                    "❌ Ошибка при получении статистики",
                    Keyboard::Statistics,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn start_set_balance(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.get_user_balance(chat_id).await {
            Ok(balance) => {
                self.states
                    .enter(chat_id, ConversationState::SettingBalance)
                    .await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "💰 Установка баланса\n\n\
                         Текущий баланс: {}\n\n\
                         Введите новое значение баланса (например: 10000 или 1500.50):\n\
                         Или нажмите '{}' для возврата",
                        Formatter::format_rub(balance),
                        labels::CANCEL
                    ),
                    Keyboard::Cancel,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "start_set_balance", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Settings)
                    .await?;
            }
        }
        Ok(())
    }

    async fn process_balance_input(&self, bot: &dyn BotApi, chat_id: i64, text: &str) -> Result<()> {
        // Invalid input re-prompts and keeps the mode active.
        let new_balance = match self.parser.parse_number(text) {
            Ok(value) => value,
            Err(_) => {
                bot.send_message(
                    chat_id,
                    "❌ Неверный формат числа. Введите число (например: 10000 или 1500.50):",
                    Keyboard::Cancel,
                )
                .await?;
                return Ok(());
            }
        };

        match self.db.reset_user_balance(chat_id, new_balance).await {
            Ok(value) => {
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    &format!("✅ Баланс успешно установлен: {}", Formatter::format_rub(value)),
                    Keyboard::Main,
                )
                .await?;
                info!("✅ User {chat_id} set balance to: {value:.2}");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "reset_user_balance", &err);
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    "❌ Произошла ошибка при установке баланса",
                    Keyboard::Main,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn start_reset_balance(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.get_user_balance(chat_id).await {
            Ok(balance) => {
                self.states
                    .enter(chat_id, ConversationState::ResettingBalance)
                    .await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "🔄 Сброс баланса\n\n\
                         Текущий баланс: {}\n\n\
                         Вы уверены, что хотите сбросить баланс до 0?\n\
                         Это действие нельзя отменить!\n\n\
                         Введите 'ДА' для подтверждения или '{}' для отмены:",
                        Formatter::format_rub(balance),
                        labels::CANCEL
                    ),
                    Keyboard::Cancel,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "start_reset_balance", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Settings)
                    .await?;
            }
        }
        Ok(())
    }

    async fn process_reset_balance(&self, bot: &dyn BotApi, chat_id: i64, text: &str) -> Result<()> {
        if text.trim().to_uppercase() != "ДА" {
            bot.send_message(
                chat_id,
                &format!(
                    "Введите 'ДА' для подтверждения или '{}' для выхода:",
                    labels::CANCEL
                ),
                Keyboard::Cancel,
            )
            .await?;
            return Ok(());
        }

        match self.db.reset_user_balance(chat_id, 0.0).await {
            Ok(_) => {
                self.states.clear(chat_id).await;
                bot.send_message(chat_id, "✅ Баланс успешно сброшен до 0 руб.", Keyboard::Main)
                    .await?;
                info!("✅ User {chat_id} reset balance to 0");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "reset_user_balance", &err);
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    "❌ Произошла ошибка при сбросе баланса",
                    Keyboard::Main,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn start_delete_all_data(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        let summary = async {
            let transactions = self.db.get_transactions(chat_id).await?;
            let balance = self.db.get_user_balance(chat_id).await?;
            Ok::<_, BudgetBotError>((transactions.len(), balance))
        }
        .await;

        match summary {
            Ok((transactions_count, balance)) => {
                self.states
                    .enter(chat_id, ConversationState::DeletingAllData)
                    .await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "🗑️ Сброс всех данных\n\n\
                         ⚠️ ⚠️ ⚠️ ВНИМАНИЕ! ⚠️ ⚠️ ⚠️\n\n\
                         Это действие УДАЛИТ ВСЕ ваши данные:\n\
                         • Операций расходов/доходов: {transactions_count}\n\
                         • Текущий баланс: {}\n\n\
                         ❌ Это действие НЕЛЬЗЯ отменить!\n\
                         ❌ Данные будут удалены НАВСЕГДА!\n\n\
                         Для подтверждения нажмите '{}'\n\
                         Для отмены нажмите '{}'",
                        Formatter::format_rub(balance),
                        labels::CONFIRM_DELETE_ALL,
                        labels::CANCEL
                    ),
                    Keyboard::Confirmation,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "start_delete_all_data", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Settings)
                    .await?;
            }
        }
        Ok(())
    }

    /// Free text while the delete confirmation is pending. Deliberately does
    /// not fall through to transaction parsing.
    async fn remind_delete_confirmation(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        bot.send_message(
            chat_id,
            &format!(
                "⚠️ Пожалуйста, используйте кнопки для подтверждения:\n\
                 • '{}' - для подтверждения удаления\n\
                 • '{}' - для отмены",
                labels::CONFIRM_DELETE_ALL,
                labels::CANCEL
            ),
            Keyboard::Confirmation,
        )
        .await?;
        Ok(())
    }

    async fn process_delete_all_data(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.delete_all_user_data(chat_id).await {
            Ok((transactions_deleted, balances_deleted, currencies_deleted)) => {
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "✅ Все данные успешно удалены!\n\n\
                         Удалено:\n\
                         • Операций расходов/доходов: {transactions_deleted}\n\
                         • Записей баланса: {balances_deleted}\n\
                         • Валютных балансов: {currencies_deleted}\n\n\
                         Бот готов к работе с чистого листа!",
                    ),
                    Keyboard::Main,
                )
                .await?;
                info!(
                    "✅ User {chat_id} deleted all data: {transactions_deleted} transactions, \
                     {balances_deleted} balance records, {currencies_deleted} currency records"
                );
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "delete_all_user_data", &err);
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    "❌ Произошла ошибка при удалении данных",
                    Keyboard::Main,
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Clears every mode flag unconditionally, whatever was active.
    async fn cancel_operation(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        self.states.clear(chat_id).await;

        let message = match self.db.get_user_balance(chat_id).await {
            Ok(balance) => format!(
                "Операция отменена.\n\nТекущий баланс: {}",
                Formatter::format_rub(balance)
            ),
            Err(err) => {
                Logger::log_store_failure(chat_id, "cancel_operation", &err);
                "Операция отменена.".to_string()
            }
        };

        bot.send_message(chat_id, &message, Keyboard::Main).await?;
        info!("✅ User {chat_id} cancelled operation");
        Ok(())
    }

    async fn show_currencies_menu(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.get_user_currencies(chat_id).await {
            Ok(currencies) => {
                let mut message = "💱 Управление валютами\n\n".to_string();
                if currencies.is_empty() {
                    message.push_str("У вас пока нет валютных балансов\n\n");
                } else {
                    message.push_str("Ваши валютные балансы:\n");
                    message.push_str(&Formatter::currency_lines(&currencies));
                    message.push('\n');
                }
                message.push_str("Нажмите на валюту чтобы открыть её баланс:");

                bot.send_message(chat_id, &message, Keyboard::Currencies).await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "show_currencies_menu", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Settings)
                    .await?;
            }
        }
        Ok(())
    }

    /// Opens (idempotently creating) the currency balance and immediately
    /// prompts for its new value.
    async fn open_currency(&self, bot: &dyn BotApi, chat_id: i64, code: &'static str) -> Result<()> {
        match self.db.create_currency_balance(chat_id, code).await {
            Ok(current) => {
                self.states
                    .enter(chat_id, ConversationState::SettingCurrency(code.to_string()))
                    .await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "💵 Установка баланса {code}\n\n\
                         Текущий баланс: {}\n\n\
                         Введите сумму в {code} (например: 100 или 150.50):\n\
                         Или нажмите '{}' для возврата",
                        Formatter::format_currency(code, current),
                        labels::CANCEL
                    ),
                    Keyboard::Cancel,
                )
                .await?;
                info!("✅ User {chat_id} opened {code} balance: {current:.2}");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "create_currency_balance", &err);
                bot.send_message(
                    chat_id,
                    &format!("❌ Произошла ошибка при открытии баланса {code}"),
                    Keyboard::Currencies,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn process_currency_input(
        &self,
        bot: &dyn BotApi,
        chat_id: i64,
        code: &str,
        text: &str,
    ) -> Result<()> {
        // Negative values are accepted literally: that is how a withdrawal
        // is expressed for currency balances.
        let amount = match self.parser.parse_number(text) {
            Ok(value) => value,
            Err(_) => {
                bot.send_message(
                    chat_id,
                    &format!(
                        "❌ Неверный формат числа. Введите сумму в {code} (например: 100 или 150.50):"
                    ),
                    Keyboard::Cancel,
                )
                .await?;
                return Ok(());
            }
        };

        match self.db.update_user_currency(chat_id, code, amount).await {
            Ok(value) => {
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    &format!(
                        "✅ Баланс {code} успешно установлен: {}",
                        Formatter::format_currency(code, value)
                    ),
                    Keyboard::Currencies,
                )
                .await?;
                info!("✅ User {chat_id} set {code} balance to: {value:.2}");
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "update_user_currency", &err);
                self.states.clear(chat_id).await;
                bot.send_message(
                    chat_id,
                    &format!("❌ Произошла ошибка при установке баланса {code}"),
                    Keyboard::Currencies,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn show_delete_currency_menu(&self, bot: &dyn BotApi, chat_id: i64) -> Result<()> {
        match self.db.get_user_currencies(chat_id).await {
            Ok(currencies) => {
                if currencies.is_empty() {
                    bot.send_message(
                        chat_id,
                        "❌ У вас нет валютных балансов для удаления",
                        Keyboard::Currencies,
                    )
                    .await?;
                    return Ok(());
                }

                let codes = currencies
                    .into_iter()
                    .map(|currency| currency.currency)
                    .collect();
                bot.send_message(
                    chat_id,
                    "Выберите валюту для удаления:",
                    Keyboard::DeleteCurrency(codes),
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "show_delete_currency_menu", &err);
                bot.send_message(chat_id, err.user_message(), Keyboard::Currencies)
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete_currency(&self, bot: &dyn BotApi, chat_id: i64, code: &str) -> Result<()> {
        match self.db.delete_user_currency(chat_id, code).await {
            Ok(true) => {
                bot.send_message(
                    chat_id,
                    &format!("✅ Баланс {code} успешно удален"),
                    Keyboard::Currencies,
                )
                .await?;
                info!("✅ User {chat_id} deleted {code} balance");
            }
            Ok(false) => {
                bot.send_message(
                    chat_id,
                    &format!("❌ Баланс {code} не найден"),
                    Keyboard::Currencies,
                )
                .await?;
            }
            Err(err) => {
                Logger::log_store_failure(chat_id, "delete_user_currency", &err);
                bot.send_message(
                    chat_id,
                    &format!("❌ Произошла ошибка при удалении баланса {code}"),
                    Keyboard::Currencies,
                )
                .await?;
            }
        }
        Ok(())
    }
}
