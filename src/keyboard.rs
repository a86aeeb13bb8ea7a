use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub(crate) fn choices_keyboard(choices: &[(String, String)]) -> InlineKeyboardMarkup {
    let keyboard = choices
        .iter()
        .map(|(label, data)| vec![InlineKeyboardButton::callback(label.clone(), data.clone())]);

    InlineKeyboardMarkup::new(keyboard)
}
