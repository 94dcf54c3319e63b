pub mod modal;
pub mod page_header;
pub mod pagination_controls;
pub mod rich_text;
pub mod sortable_header;
pub mod stat_card;
pub mod tab_group;

pub use modal::Modal;
pub use page_header::PageHeader;
pub use pagination_controls::PaginationControls;
pub use rich_text::RichText;
pub use sortable_header::SortableHeader;
pub use stat_card::StatCard;
pub use tab_group::TabGroup;
