use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug)]
pub struct Patterns {
    /// Splits "Категория, Сумма" on the comma, swallowing surrounding spaces.
    pub split_regex: Regex,
    /// Whitespace inside amounts ("1 500" style thousands separators).
    pub whitespace_regex: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            split_regex: Regex::new(r"\s*,\s*").unwrap(),
            whitespace_regex: Regex::new(r"\s+").unwrap(),
        }
    }

    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<Patterns> = OnceLock::new();
        INSTANCE.get_or_init(Patterns::new)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}
