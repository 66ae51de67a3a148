use anyhow::Result;
use dotenv::dotenv;
use log::info;

use budgetbot::bot::dispatcher::start_bot;
use budgetbot::bot::{Commands, MessageHandler};
use budgetbot::config::Settings;
use budgetbot::database::Database;
use budgetbot::parser::MessageParser;
use budgetbot::retry::{retry_with_interval, RetryConfig};
use budgetbot::utils::Logger;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    Logger::log_operation_start("BudgetBot", "Initializing application");

    let settings = match Settings::new() {
        Ok(s) => {
            Logger::log_operation_success("Configuration", "Settings loaded successfully");
            s
        }
        Err(e) => {
            Logger::log_operation_failure("Configuration", &e.to_string());
            return Err(e);
        }
    };

    if let Err(e) = settings.validate() {
        Logger::log_operation_failure("Configuration validation", &e.to_string());
        return Err(e);
    }

    // The store container may still be coming up; retry on a fixed interval.
    let db = match retry_with_interval(
        || async { Database::new(&settings.database_url, settings.store_timeout()).await },
        RetryConfig {
            max_attempts: settings.max_retry_attempts,
            interval: settings.retry_interval(),
        },
        "database connect",
    )
    .await
    {
        Ok(db) => {
            Logger::log_operation_success("Database", "Database initialized successfully");
            db
        }
        Err(e) => {
            Logger::log_operation_failure("Database", &e.to_string());
            return Err(e.into());
        }
    };

    let parser = MessageParser::new(settings.income_categories.clone());
    let message_handler = MessageHandler::new(db.clone(), parser);
    let commands = Commands::new(db, settings.income_categories.clone());
    Logger::log_operation_success("MessageHandler", "Handler initialized successfully");

    info!("🤖 {} initialized successfully!", settings.bot_name);
    info!("📊 Configuration:");
    info!("  - Database: {}", settings.database_url);
    info!("  - Bot Name: {}", settings.bot_name);
    info!(
        "  - Income categories: {}",
        settings.income_categories.join(", ")
    );
    info!("  - Max Retry Attempts: {}", settings.max_retry_attempts);
    info!("  - Store Timeout: {}s", settings.store_timeout_secs);

    start_bot(&settings.bot_token, message_handler, commands).await?;

    Ok(())
}
