pub mod bindings;
pub mod cache;
pub mod config;
pub mod i18n;
pub mod translation;
