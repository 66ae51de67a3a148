use crate::bot::labels;
use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};

/// Reply keyboard attached to an outgoing message. Built from the same
/// caption constants the dispatcher matches against, so the two cannot
/// drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Main,
    Statistics,
    Settings,
    Currencies,
    /// Delete buttons only for the currencies the chat actually has.
    DeleteCurrency(Vec<String>),
    Cancel,
    Confirmation,
}

impl Keyboard {
    pub fn markup(&self) -> ReplyMarkup {
        ReplyMarkup::Keyboard(self.layout())
    }

    fn layout(&self) -> KeyboardMarkup {
        let rows: Vec<Vec<KeyboardButton>> = match self {
            Keyboard::Main => vec![
                vec![button(labels::STATISTICS_MENU)],
                vec![button(labels::SETTINGS_MENU)],
            ],
            Keyboard::Statistics => vec![
                vec![button(labels::STATS_DAY)],
                vec![button(labels::STATS_WEEK)],
                vec![button(labels::STATS_MONTH)],
                vec![button(labels::BACK)],
            ],
            Keyboard::Settings => vec![
                vec![button(labels::SET_BALANCE)],
                vec![button(labels::RESET_BALANCE)],
                vec![button(labels::CURRENCIES_MENU)],
                vec![button(labels::DELETE_ALL_DATA)],
                vec![button(labels::BACK)],
            ],
            Keyboard::Currencies => {
                let mut rows: Vec<Vec<KeyboardButton>> = labels::CURRENCIES
                    .iter()
                    .map(|currency| vec![button(currency.open)])
                    .collect();
                rows.push(vec![button(labels::DELETE_CURRENCY_MENU)]);
                rows.push(vec![button(labels::BACK)]);
                rows
            }
            Keyboard::DeleteCurrency(codes) => {
                let mut rows: Vec<Vec<KeyboardButton>> = codes
                    .iter()
                    .filter_map(|code| labels::delete_caption(code))
                    .map(|caption| vec![button(caption)])
                    .collect();
                rows.push(vec![button(labels::BACK)]);
                rows
            }
            Keyboard::Cancel => vec![vec![button(labels::CANCEL)]],
            Keyboard::Confirmation => vec![
                vec![button(labels::CONFIRM_DELETE_ALL)],
                vec![button(labels::CANCEL)],
            ],
        };

        KeyboardMarkup::new(rows).resize_keyboard(true)
    }
}

fn button(caption: &str) -> KeyboardButton {
    KeyboardButton::new(caption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::labels::Label;

    fn captions(keyboard: &Keyboard) -> Vec<String> {
        keyboard
            .layout()
            .keyboard
            .iter()
            .flatten()
            .map(|button| button.text.clone())
            .collect()
    }

    #[test]
    fn every_keyboard_caption_is_dispatchable() {
        let keyboards = [
            Keyboard::Main,
            Keyboard::Statistics,
            Keyboard::Settings,
            Keyboard::Currencies,
            Keyboard::DeleteCurrency(vec!["USD".to_string(), "CNY".to_string()]),
            Keyboard::Cancel,
            Keyboard::Confirmation,
        ];

        for keyboard in &keyboards {
            for caption in captions(keyboard) {
                assert!(
                    Label::from_caption(&caption).is_some(),
                    "caption {caption:?} has no handler"
                );
            }
        }
    }

    #[test]
    fn delete_keyboard_skips_unknown_codes() {
        let keyboard = Keyboard::DeleteCurrency(vec!["USD".to_string(), "EUR".to_string()]);
        let captions = captions(&keyboard);
        assert_eq!(captions, vec!["❌ Удалить USD", "⬅️ Назад"]);
    }
}
