use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Main menu shown by /start
pub fn create_main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "💱 Get Today's Rates",
            "get_rates",
        )],
        vec![InlineKeyboardButton::callback("🔔 Set Alert", "set_alert")],
        vec![InlineKeyboardButton::callback(
            "⏰ Start Alert Monitoring",
            "schedule_alert",
        )],
    ])
}
