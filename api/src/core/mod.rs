pub mod app_settings;
pub mod app_state;
pub mod http;
pub mod session;
pub mod startup;
