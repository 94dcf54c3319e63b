use contracts::projections::p901_price_research::report::SaveQuotationRequest;
use contracts::projections::p901_price_research::search::{
    contract_detail_url, ContractDetailResponse, PriceSearch,
};
use contracts::projections::p901_price_research::{PriceItem, PriceResearchResult};
use serde_json::Value;

use crate::shared::api_utils::{get_json, post_json};

/// `GET /api/v1/precos/{codigo}`
pub async fn fetch_prices(base: &str, search: &PriceSearch) -> Result<PriceResearchResult, String> {
    let url = search.url(base).map_err(|e| e.to_string())?;
    get_json(&url).await
}

/// `GET /api/v1/contratacao/{idCompra}`
pub async fn fetch_contract_detail(
    base: &str,
    item: &PriceItem,
) -> Result<ContractDetailResponse, String> {
    get_json(&contract_detail_url(base, item)).await
}

/// `POST /api/pesquisa_precos/salvar`
pub async fn save_quotation(endpoint: &str, request: &SaveQuotationRequest) -> Result<Value, String> {
    post_json(endpoint, request).await
}
