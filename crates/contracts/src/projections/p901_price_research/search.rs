//! Search request building and contract detail lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dto::{CatalogType, PriceItem};
use crate::usecases::common::{UseCaseError, UseCaseResult};

pub const EMPTY_CODE_MESSAGE: &str = "Digite um código CATMAT/CATSERV";
pub const NEW_SEARCH_CONFIRM: &str = "Realizar nova pesquisa? Seleção atual será perdida.";
pub const SEARCH_FAILED_MESSAGE: &str = "Erro ao consultar API";
pub const DETAIL_UNAVAILABLE_MESSAGE: &str = "Detalhes não disponíveis no momento.";
pub const PNCP_NOT_FOUND_MESSAGE: &str = "Link não encontrado";
pub const PNCP_ORIGIN: &str = "https://pncp.gov.br";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSearch {
    pub codigo: String,
    pub tipo: CatalogType,
    /// UF opcional repassada ao servidor
    pub estado: Option<String>,
}

impl PriceSearch {
    pub fn new(codigo: impl Into<String>, tipo: CatalogType, estado: Option<String>) -> Self {
        Self {
            codigo: codigo.into().trim().to_string(),
            tipo,
            estado: estado.filter(|uf| !uf.trim().is_empty()),
        }
    }

    pub fn validate(&self) -> UseCaseResult<()> {
        if self.codigo.is_empty() {
            return Err(UseCaseError::validation(EMPTY_CODE_MESSAGE));
        }
        Ok(())
    }

    /// `GET {base}/{codigo}?tipo=..&pesquisar_familia_pdm=false[&estado=..]`
    pub fn url(&self, base: &str) -> UseCaseResult<String> {
        self.validate()?;
        let mut url = format!(
            "{}/{}?tipo={}&pesquisar_familia_pdm=false",
            base.trim_end_matches('/'),
            urlencoding::encode(&self.codigo),
            self.tipo.as_str()
        );
        if let Some(uf) = &self.estado {
            url.push_str("&estado=");
            url.push_str(&urlencoding::encode(uf));
        }
        Ok(url)
    }
}

/// `GET {base}/{idCompra}[?codigo_item_catalogo=..]`
pub fn contract_detail_url(base: &str, item: &PriceItem) -> String {
    let mut url = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(item.purchase_id())
    );
    if let Some(code) = item.codigo_item_catalogo.as_deref().filter(|c| !c.is_empty()) {
        url.push_str("?codigo_item_catalogo=");
        url.push_str(&urlencoding::encode(code));
    }
    url
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contratacao {
    #[serde(default)]
    pub orgao_entidade_nome: Option<String>,
    #[serde(default)]
    pub uasg: Option<Value>,
    #[serde(default)]
    pub modalidade_nome: Option<String>,
    #[serde(default)]
    pub objeto_compra: Option<String>,
    #[serde(default)]
    pub link_pncp: Option<String>,
    #[serde(default, rename = "link_pncp")]
    pub link_pncp_snake: Option<String>,
    #[serde(default)]
    pub uri_pncp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContratacaoItem {
    #[serde(default)]
    pub descricao_item: Option<String>,
    #[serde(default)]
    pub quantidade: Option<f64>,
    #[serde(default)]
    pub valor_unitario_homologado: Option<f64>,
    #[serde(default)]
    pub valor_total_homologado: Option<f64>,
}

/// Resposta do detalhe de contratação
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractDetailResponse {
    #[serde(default)]
    pub contratacao: Option<Contratacao>,
    #[serde(default)]
    pub itens: Vec<ContratacaoItem>,
    #[serde(default, rename = "urlPncp")]
    pub url_pncp_camel: Option<String>,
    #[serde(default)]
    pub url_pncp: Option<String>,
}

impl ContractDetailResponse {
    /// First non-empty link among the known spellings. Site-relative links
    /// are made absolute.
    pub fn pncp_link(&self) -> Option<String> {
        let c = self.contratacao.as_ref();
        let link = [
            self.url_pncp_camel.as_deref(),
            self.url_pncp.as_deref(),
            c.and_then(|c| c.link_pncp.as_deref()),
            c.and_then(|c| c.link_pncp_snake.as_deref()),
            c.and_then(|c| c.uri_pncp.as_deref()),
        ]
        .into_iter()
        .flatten()
        .find(|l| !l.is_empty())?;
        if link.starts_with('/') {
            Some(format!("{PNCP_ORIGIN}{link}"))
        } else {
            Some(link.to_string())
        }
    }
}

/// Linha rótulo/valor exibida no modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    pub section: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Merges the detail response with the table row; the server value wins
/// and the row fills the gaps. Money values are handed to `money`.
pub fn detail_entries(
    detail: &ContractDetailResponse,
    item: &PriceItem,
    money: impl Fn(Option<f64>) -> String,
) -> Vec<DetailEntry> {
    let c = detail.contratacao.clone().unwrap_or_default();
    let i = detail.itens.first().cloned().unwrap_or_default();
    let or_dash = |v: Option<String>| v.filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string());
    let uasg = c
        .uasg
        .as_ref()
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| item.codigo_uasg.clone());
    let total = i
        .valor_total_homologado
        .filter(|v| *v != 0.0)
        .or_else(|| item.preco_unitario.zip(item.quantidade).map(|(p, q)| p * q));
    let entry = |section, label, value| DetailEntry { section, label, value };
    vec![
        entry("Dados da Compra", "Órgão", or_dash(c.orgao_entidade_nome.or_else(|| item.nome_uasg.clone()))),
        entry("Dados da Compra", "UASG", or_dash(uasg)),
        entry("Dados da Compra", "Modalidade", or_dash(c.modalidade_nome.or_else(|| item.modalidade_nome.clone()))),
        entry("Dados da Compra", "Objeto", or_dash(c.objeto_compra)),
        entry("Dados do Item", "Descrição", or_dash(i.descricao_item.or_else(|| item.descricao_item.clone()))),
        entry(
            "Dados do Item",
            "Quantidade",
            or_dash(i.quantidade.filter(|q| *q != 0.0).or(item.quantidade).map(|q| q.to_string())),
        ),
        entry(
            "Dados do Item",
            "Valor Unitário",
            money(i.valor_unitario_homologado.filter(|v| *v != 0.0).or(item.preco_unitario)),
        ),
        entry("Dados do Item", "Valor Total", money(total)),
        entry("Fornecedor", "Razão Social", or_dash(item.nome_fornecedor.clone())),
        entry("Fornecedor", "CNPJ", or_dash(item.ni_fornecedor.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        let search = PriceSearch::new(" 150 ", CatalogType::Material, Some("SP".into()));
        assert_eq!(
            search.url("/api/v1/precos").unwrap(),
            "/api/v1/precos/150?tipo=material&pesquisar_familia_pdm=false&estado=SP"
        );
        let no_uf = PriceSearch::new("9", CatalogType::Servico, Some(String::new()));
        assert_eq!(
            no_uf.url("/api/v1/precos/").unwrap(),
            "/api/v1/precos/9?tipo=servico&pesquisar_familia_pdm=false"
        );
    }

    #[test]
    fn test_empty_code_rejected() {
        let err = PriceSearch::new("  ", CatalogType::Material, None).url("/x").unwrap_err();
        assert_eq!(err.message, EMPTY_CODE_MESSAGE);
    }

    #[test]
    fn test_contract_detail_url_encodes_id() {
        let item = PriceItem {
            id_compra: Some("123/2024 A".into()),
            codigo_item_catalogo: Some("445".into()),
            ..Default::default()
        };
        assert_eq!(
            contract_detail_url("/api/v1/contratacao", &item),
            "/api/v1/contratacao/123%2F2024%20A?codigo_item_catalogo=445"
        );
    }

    #[test]
    fn test_pncp_link_resolution_order() {
        let detail: ContractDetailResponse = serde_json::from_str(
            r#"{"url_pncp": "", "contratacao": {"link_pncp": "/app/editais/1", "uriPncp": "https://x"}}"#,
        )
        .unwrap();
        assert_eq!(
            detail.pncp_link().as_deref(),
            Some("https://pncp.gov.br/app/editais/1")
        );
        let direct: ContractDetailResponse =
            serde_json::from_str(r#"{"urlPncp": "https://pncp.gov.br/a"}"#).unwrap();
        assert_eq!(direct.pncp_link().as_deref(), Some("https://pncp.gov.br/a"));
        assert!(ContractDetailResponse::default().pncp_link().is_none());
    }

    #[test]
    fn test_detail_entries_fall_back_to_row() {
        let detail: ContractDetailResponse = serde_json::from_str(
            r#"{"contratacao": {"uasg": 160001, "objetoCompra": "Papel"}, "itens": [{"valorUnitarioHomologado": 0}]}"#,
        )
        .unwrap();
        let item = PriceItem {
            nome_uasg: Some("Base Aérea".into()),
            preco_unitario: Some(2.0),
            quantidade: Some(5.0),
            ..Default::default()
        };
        let entries = detail_entries(&detail, &item, |v| v.map(|n| format!("{n}")).unwrap_or("-".into()));
        let get = |label: &str| entries.iter().find(|e| e.label == label).map(|e| e.value.clone());
        assert_eq!(get("Órgão").as_deref(), Some("Base Aérea"));
        assert_eq!(get("UASG").as_deref(), Some("160001"));
        assert_eq!(get("Objeto").as_deref(), Some("Papel"));
        assert_eq!(get("Valor Unitário").as_deref(), Some("2"));
        assert_eq!(get("Valor Total").as_deref(), Some("10"));
        assert_eq!(get("CNPJ").as_deref(), Some("-"));
    }
}
