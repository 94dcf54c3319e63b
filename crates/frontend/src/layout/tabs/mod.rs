//! Tab pages: registry of tab keys to views plus their labels.

pub mod page;
pub mod registry;
pub mod tab_labels;

pub use page::TabPage;
pub use tab_labels::tab_label;
