pub mod api_utils;
pub mod components;
pub mod config;
pub mod date_utils;
pub mod dom;
pub mod export;
pub mod icons;
pub mod notifications;
pub mod number_format;
pub mod storage;
pub mod theme;
