pub mod charts;
pub mod dto;
pub mod export;
pub mod queue;
pub mod report;
pub mod search;
pub mod table;

pub use dto::{CatalogType, PriceItem, PriceResearchResult, PriceStatistics};
pub use report::{QuotationReport, ReportStatistics, VariationLevel};
pub use table::{PriceFilters, PriceTable, SortColumn, SortDirection};

use crate::usecases::common::UseCaseMetadata;

/// Pesquisa de preços CATMAT/CATSERV
pub struct PriceResearch;

impl UseCaseMetadata for PriceResearch {
    fn usecase_index() -> &'static str {
        "p901"
    }

    fn usecase_name() -> &'static str {
        "price_research"
    }

    fn display_name() -> &'static str {
        "Pesquisa de Preços"
    }
}
