pub mod alerts;
pub mod bot;
pub mod constants;
pub mod errors;
pub mod notify;
pub mod rates;
pub mod utils;
