pub mod config;
pub mod layout_state;
pub mod markup;
pub mod sse;
pub mod storage;
pub mod text;
pub mod theme;
