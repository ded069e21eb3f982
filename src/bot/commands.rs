use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start interacting with the bot")]
    Start,

    #[command(description = "Get today's exchange rates")]
    Rate,

    #[command(description = "Set an alert: /alert <PAIR> <THRESHOLD>")]
    Alert(String),

    #[command(description = "Cancel alert monitoring")]
    Cancel,

    #[command(description = "Get help")]
    Help,
}
