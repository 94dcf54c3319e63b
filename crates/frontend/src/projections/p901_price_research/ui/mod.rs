mod charts;
mod detail;
mod model;
mod queue;
mod report;
mod view;
mod view_model;

pub use view::PriceResearchView;
