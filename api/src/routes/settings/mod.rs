pub mod settings_request;
pub mod settings_route;
