mod model;
mod selector;

pub use model::fetch_models;
pub use selector::{use_model_catalog, ModelCatalog, ModelSelector};
