pub mod callback;
pub mod command;
pub mod menu;

pub use callback::CallbackHandler;
pub use command::CommandHandler;
pub use menu::create_main_menu;
