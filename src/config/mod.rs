pub mod manager;
pub mod models;
pub mod settings;
pub mod url_resolver;
