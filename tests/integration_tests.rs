use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local};
use serial_test::serial;
use teloxide::RequestError;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use budgetbot::bot::keyboards::Keyboard;
use budgetbot::bot::labels;
use budgetbot::bot::traits::BotApi;
use budgetbot::bot::MessageHandler;
use budgetbot::database::models::TransactionKind;
use budgetbot::database::Database;
use budgetbot::parser::message::{AMOUNT_ERROR_TEXT, FORMAT_ERROR_TEXT};
use budgetbot::parser::MessageParser;

// Records outgoing messages instead of talking to Telegram.
#[derive(Debug, Clone, Default)]
pub struct MockBotApi {
    pub sent_messages: Arc<Mutex<Vec<MockSentMessage>>>,
}

#[derive(Debug, Clone)]
pub struct MockSentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Keyboard,
}

impl MockBotApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<MockSentMessage> {
        self.sent_messages.lock().await.clone()
    }

    pub async fn last_message(&self) -> MockSentMessage {
        self.sent_messages
            .lock()
            .await
            .last()
            .expect("no message was sent")
            .clone()
    }
}

#[async_trait]
impl BotApi for MockBotApi {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<(), RequestError> {
        self.sent_messages.lock().await.push(MockSentMessage {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }
}

const TEST_CHAT_ID: i64 = 12345;

async fn create_test_db() -> Result<Database> {
    // Persist (don't delete on drop): the SQLite connection stays open for the
    // whole test, and unlinking the file would make subsequent writes fail with
    // a read-only error.
    let (_file, path) = NamedTempFile::new()?.keep()?;
    let db_path = path.to_str().unwrap();
    Ok(Database::new(db_path, Duration::from_secs(5)).await?)
}

fn test_parser() -> MessageParser {
    MessageParser::new(vec![
        "зарплата".to_string(),
        "аванс".to_string(),
        "пополнение".to_string(),
        "доход".to_string(),
        "премия".to_string(),
    ])
}

async fn create_test_handler() -> Result<(MessageHandler, Database)> {
    let db = create_test_db().await?;
    Ok((MessageHandler::new(db.clone(), test_parser()), db))
}

#[tokio::test]
#[serial]
async fn test_expense_transaction_updates_balance() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "Продукты, 1500")
        .await?;

    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, -1500.0);

    let transactions = db.get_transactions(TEST_CHAT_ID).await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].category, "продукты");
    assert_eq!(transactions[0].amount, 1500.0);
    assert_eq!(transactions[0].kind, TransactionKind::Expense);

    let reply = bot.last_message().await;
    assert_eq!(reply.chat_id, TEST_CHAT_ID);
    assert_eq!(
        reply.text,
        "✅ Запись добавлена: продукты - 1500.00 руб. (расход)"
    );
    assert_eq!(reply.keyboard, Keyboard::Main);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_income_transaction_updates_balance() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "Зарплата, 50000")
        .await?;

    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 50000.0);

    let transactions = db.get_transactions(TEST_CHAT_ID).await?;
    assert_eq!(transactions[0].kind, TransactionKind::Income);
    assert!(bot.last_message().await.text.contains("(доход)"));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_parse_errors_are_shown_and_nothing_persists() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "просто текст")
        .await?;
    assert_eq!(bot.last_message().await.text, FORMAT_ERROR_TEXT);

    handler
        .handle_message(&bot, TEST_CHAT_ID, "еда, много")
        .await?;
    assert_eq!(bot.last_message().await.text, AMOUNT_ERROR_TEXT);

    assert!(db.get_transactions(TEST_CHAT_ID).await?.is_empty());
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 0.0);
    assert_eq!(bot.sent().await.len(), 2);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_set_balance_overrides_transaction_history() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "Продукты, 1500")
        .await?;
    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::SET_BALANCE)
        .await?;
    assert_eq!(bot.last_message().await.keyboard, Keyboard::Cancel);

    handler.handle_message(&bot, TEST_CHAT_ID, "500").await?;

    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 500.0);
    assert!(bot
        .last_message()
        .await
        .text
        .contains("✅ Баланс успешно установлен: 500.00 руб."));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_invalid_balance_input_keeps_the_mode() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::SET_BALANCE)
        .await?;
    handler.handle_message(&bot, TEST_CHAT_ID, "abc").await?;
    assert!(bot
        .last_message()
        .await
        .text
        .contains("❌ Неверный формат числа"));

    // A transaction-looking line is still mode input while the flag is set.
    handler
        .handle_message(&bot, TEST_CHAT_ID, "еда, 100")
        .await?;
    assert!(bot
        .last_message()
        .await
        .text
        .contains("❌ Неверный формат числа"));
    assert!(db.get_transactions(TEST_CHAT_ID).await?.is_empty());

    // The retry loop has no attempt limit; a valid number completes it.
    handler
        .handle_message(&bot, TEST_CHAT_ID, "1 500,50")
        .await?;
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 1500.50);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_cancel_clears_mode_and_frees_the_parser() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::SET_BALANCE)
        .await?;
    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::CANCEL)
        .await?;
    assert!(bot.last_message().await.text.contains("Операция отменена"));

    // Free text after cancel goes to the transaction parser, not the mode.
    handler
        .handle_message(&bot, TEST_CHAT_ID, "Такси, 250")
        .await?;
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, -250.0);
    assert_eq!(db.get_transactions(TEST_CHAT_ID).await?.len(), 1);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_reset_balance_requires_confirmation_word() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "Зарплата, 1000")
        .await?;
    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::RESET_BALANCE)
        .await?;

    handler.handle_message(&bot, TEST_CHAT_ID, "нет").await?;
    assert!(bot.last_message().await.text.contains("Введите 'ДА'"));
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 1000.0);

    handler.handle_message(&bot, TEST_CHAT_ID, "да").await?;
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 0.0);
    assert!(bot
        .last_message()
        .await
        .text
        .contains("✅ Баланс успешно сброшен до 0 руб."));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_delete_all_data_blocks_free_text_until_confirmed() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler
        .handle_message(&bot, TEST_CHAT_ID, "Продукты, 1500")
        .await?;
    db.create_currency_balance(TEST_CHAT_ID, "USD").await?;

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::DELETE_ALL_DATA)
        .await?;
    assert!(bot.last_message().await.text.contains("УДАЛИТ ВСЕ"));

    // Free text does not fall through to transaction parsing here.
    handler
        .handle_message(&bot, TEST_CHAT_ID, "удалить всё")
        .await?;
    let reminder = bot.last_message().await;
    assert!(reminder.text.contains("используйте кнопки"));
    assert_eq!(reminder.keyboard, Keyboard::Confirmation);
    assert_eq!(db.get_transactions(TEST_CHAT_ID).await?.len(), 1);

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::CONFIRM_DELETE_ALL)
        .await?;

    assert!(db.get_transactions(TEST_CHAT_ID).await?.is_empty());
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 0.0);
    assert!(db.get_user_currencies(TEST_CHAT_ID).await?.is_empty());

    let report = bot.last_message().await.text;
    assert!(report.contains("Операций расходов/доходов: 1"));
    assert!(report.contains("Записей баланса: 1"));
    assert!(report.contains("Валютных балансов: 1"));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_currency_flow_open_set_and_overwrite() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler.handle_message(&bot, TEST_CHAT_ID, "💵 USD").await?;
    assert!(bot.last_message().await.text.contains("Текущий баланс: 0.00$"));

    handler.handle_message(&bot, TEST_CHAT_ID, "100").await?;
    assert!(bot
        .last_message()
        .await
        .text
        .contains("✅ Баланс USD успешно установлен: 100.00$"));

    // Reopening is idempotent and shows the stored amount.
    handler.handle_message(&bot, TEST_CHAT_ID, "💵 USD").await?;
    assert!(bot.last_message().await.text.contains("Текущий баланс: 100.00$"));

    // The amount is a full overwrite, not a delta.
    handler.handle_message(&bot, TEST_CHAT_ID, "40").await?;
    let currencies = db.get_user_currencies(TEST_CHAT_ID).await?;
    assert_eq!(currencies.len(), 1);
    assert_eq!(currencies[0].amount, 40.0);

    // Negative literals are how a withdrawal below zero is expressed.
    handler.handle_message(&bot, TEST_CHAT_ID, "💵 USD").await?;
    handler.handle_message(&bot, TEST_CHAT_ID, "-30").await?;
    assert_eq!(db.get_user_currencies(TEST_CHAT_ID).await?[0].amount, -30.0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_delete_currency_reports_missing_balance() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    db.create_currency_balance(TEST_CHAT_ID, "USD").await?;

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::DELETE_CURRENCY_MENU)
        .await?;
    assert_eq!(
        bot.last_message().await.keyboard,
        Keyboard::DeleteCurrency(vec!["USD".to_string()])
    );

    handler
        .handle_message(&bot, TEST_CHAT_ID, "❌ Удалить USD")
        .await?;
    assert!(bot.last_message().await.text.contains("✅ Баланс USD успешно удален"));
    assert!(db.get_user_currencies(TEST_CHAT_ID).await?.is_empty());

    handler
        .handle_message(&bot, TEST_CHAT_ID, "❌ Удалить USD")
        .await?;
    assert!(bot.last_message().await.text.contains("❌ Баланс USD не найден"));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_day_statistics_report() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    handler.handle_message(&bot, TEST_CHAT_ID, "еда, 100").await?;
    handler
        .handle_message(&bot, TEST_CHAT_ID, "Зарплата, 1000")
        .await?;
    handler.handle_message(&bot, TEST_CHAT_ID, "еда, 50").await?;

    handler
        .handle_message(&bot, TEST_CHAT_ID, labels::STATS_DAY)
        .await?;

    let report = bot.last_message().await;
    assert!(report.text.contains("• еда: 150.00 руб."));
    assert!(report.text.contains("• зарплата: 1000.00 руб."));
    assert!(report.text.contains("📈 Прибыль за период: +850.00 руб."));
    assert!(report.text.contains("💵 Текущий баланс: 850.00 руб."));
    assert_eq!(report.keyboard, Keyboard::Statistics);

    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 850.0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_statistics_respect_period_bounds() -> Result<()> {
    let db = create_test_db().await?;
    let today = Local::now().date_naive();

    db.add_transaction(TEST_CHAT_ID, today, "еда", 100.0, false)
        .await?;
    db.add_transaction(
        TEST_CHAT_ID,
        today - ChronoDuration::days(3),
        "кино",
        400.0,
        false,
    )
    .await?;
    db.add_transaction(
        TEST_CHAT_ID,
        today - ChronoDuration::days(20),
        "ремонт",
        5000.0,
        false,
    )
    .await?;

    let day = db
        .get_transactions_by_period(TEST_CHAT_ID, today, today)
        .await?;
    assert_eq!(day.len(), 1);

    let week = db
        .get_transactions_by_period(TEST_CHAT_ID, today - ChronoDuration::days(7), today)
        .await?;
    assert_eq!(week.len(), 2);

    let all = db.get_transactions(TEST_CHAT_ID).await?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_gateway_reset_and_counts() -> Result<()> {
    let db = create_test_db().await?;
    let today = Local::now().date_naive();

    db.add_transaction(TEST_CHAT_ID, today, "еда", 100.0, false)
        .await?;
    db.add_transaction(TEST_CHAT_ID, today, "зарплата", 1000.0, true)
        .await?;
    db.create_currency_balance(TEST_CHAT_ID, "USD").await?;
    db.create_currency_balance(TEST_CHAT_ID, "CNY").await?;

    // Override semantics: the set value wins over derived history.
    assert_eq!(db.reset_user_balance(TEST_CHAT_ID, 500.0).await?, 500.0);
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 500.0);

    let (transactions, balances, currencies) = db.delete_all_user_data(TEST_CHAT_ID).await?;
    assert_eq!((transactions, balances, currencies), (2, 1, 2));
    assert_eq!(db.get_user_balance(TEST_CHAT_ID).await?, 0.0);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_create_currency_balance_is_idempotent() -> Result<()> {
    let db = create_test_db().await?;

    assert_eq!(db.create_currency_balance(TEST_CHAT_ID, "USD").await?, 0.0);
    db.update_user_currency(TEST_CHAT_ID, "USD", 75.5).await?;
    assert_eq!(db.create_currency_balance(TEST_CHAT_ID, "USD").await?, 75.5);

    let currencies = db.get_user_currencies(TEST_CHAT_ID).await?;
    assert_eq!(currencies.len(), 1);
    assert_eq!(currencies[0].currency, "USD");
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_chats_do_not_share_state_or_data() -> Result<()> {
    let (handler, db) = create_test_handler().await?;
    let bot = MockBotApi::new();

    // Chat 1 is mid-flow; chat 2 records a transaction undisturbed.
    handler.handle_message(&bot, 1, labels::SET_BALANCE).await?;
    handler.handle_message(&bot, 2, "еда, 100").await?;

    assert_eq!(db.get_user_balance(2).await?, -100.0);
    assert_eq!(db.get_user_balance(1).await?, 0.0);

    handler.handle_message(&bot, 1, "900").await?;
    assert_eq!(db.get_user_balance(1).await?, 900.0);
    assert_eq!(db.get_user_balance(2).await?, -100.0);
    Ok(())
}
