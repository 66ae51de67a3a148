use crate::calculator::Period;

// Button captions are a contract with the keyboards: the dispatcher matches
// incoming text against these exact strings.
pub const STATISTICS_MENU: &str = "📊 Статистика";
pub const SETTINGS_MENU: &str = "⚙️ Настройки";
pub const STATS_DAY: &str = "📅 День";
pub const STATS_WEEK: &str = "📆 Неделя";
pub const STATS_MONTH: &str = "📈 Месяц";
pub const SET_BALANCE: &str = "💰 Установить баланс";
pub const RESET_BALANCE: &str = "🔄 Сбросить баланс";
pub const CURRENCIES_MENU: &str = "💱 Валюты";
pub const DELETE_ALL_DATA: &str = "🗑️ Сбросить все данные";
pub const BACK: &str = "⬅️ Назад";
pub const CANCEL: &str = "❌ Отмена";
pub const CONFIRM_DELETE_ALL: &str = "✅ ДА, удалить все";
pub const DELETE_CURRENCY_MENU: &str = "🗑️ Удалить валюту";

pub struct CurrencyLabels {
    pub code: &'static str,
    pub open: &'static str,
    pub delete: &'static str,
}

/// Supported secondary currencies. Extending the set means adding a row here
/// and a row to the currencies keyboard; everything downstream is keyed by
/// the code.
pub const CURRENCIES: &[CurrencyLabels] = &[
    CurrencyLabels {
        code: "USD",
        open: "💵 USD",
        delete: "❌ Удалить USD",
    },
    CurrencyLabels {
        code: "CNY",
        open: "💴 CNY",
        delete: "❌ Удалить CNY",
    },
];

pub fn delete_caption(code: &str) -> Option<&'static str> {
    CURRENCIES
        .iter()
        .find(|labels| labels.code == code)
        .map(|labels| labels.delete)
}

/// Handler identity behind a recognized button caption. Kept as data so the
/// routing table is testable without the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    StatisticsMenu,
    SettingsMenu,
    Statistics(Period),
    SetBalance,
    ResetBalance,
    CurrenciesMenu,
    DeleteAllData,
    Back,
    Cancel,
    ConfirmDeleteAll,
    OpenCurrency(&'static str),
    DeleteCurrencyMenu,
    DeleteCurrency(&'static str),
}

impl Label {
    /// Exact caption match; anything else is not a button press.
    pub fn from_caption(text: &str) -> Option<Label> {
        if let Some(labels) = CURRENCIES.iter().find(|labels| labels.open == text) {
            return Some(Label::OpenCurrency(labels.code));
        }
        if let Some(labels) = CURRENCIES.iter().find(|labels| labels.delete == text) {
            return Some(Label::DeleteCurrency(labels.code));
        }

        match text {
            STATISTICS_MENU => Some(Label::StatisticsMenu),
            SETTINGS_MENU => Some(Label::SettingsMenu),
            STATS_DAY => Some(Label::Statistics(Period::Day)),
            STATS_WEEK => Some(Label::Statistics(Period::Week)),
            STATS_MONTH => Some(Label::Statistics(Period::Month)),
            SET_BALANCE => Some(Label::SetBalance),
            RESET_BALANCE => Some(Label::ResetBalance),
            CURRENCIES_MENU => Some(Label::CurrenciesMenu),
            DELETE_ALL_DATA => Some(Label::DeleteAllData),
            BACK => Some(Label::Back),
            CANCEL => Some(Label::Cancel),
            CONFIRM_DELETE_ALL => Some(Label::ConfirmDeleteAll),
            DELETE_CURRENCY_MENU => Some(Label::DeleteCurrencyMenu),
            _ => None,
        }
    }
}
