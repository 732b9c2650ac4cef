use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// Single row of suggested answers that hides once one is picked.
pub fn reply_keyboard(buttons: Vec<String>) -> KeyboardMarkup {
    let row: Vec<KeyboardButton> = buttons.into_iter().map(KeyboardButton::new).collect();
    KeyboardMarkup::new([row]).resize_keyboard().one_time_keyboard()
}
