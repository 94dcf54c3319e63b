use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catálogo do item pesquisado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogType {
    #[default]
    Material,
    Servico,
}

impl CatalogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogType::Material => "material",
            CatalogType::Servico => "servico",
        }
    }

    /// Sigla exibida no cabeçalho do resultado
    pub fn label(&self) -> &'static str {
        match self {
            CatalogType::Material => "CATMAT",
            CatalogType::Servico => "CATSERV",
        }
    }

    /// Anything other than `material` is a service catalogue.
    pub fn from_str(s: &str) -> Self {
        if s == "material" {
            CatalogType::Material
        } else {
            CatalogType::Servico
        }
    }
}

/// Registro de compra retornado pela pesquisa de preços
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id_compra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_uasg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub codigo_uasg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_resultado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_fornecedor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ni_fornecedor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preco_unitario: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantidade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigla_unidade_fornecimento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_number")]
    pub codigo_item_catalogo: Option<String>,
    #[serde(default)]
    pub is_outlier: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_pncp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modalidade_nome: Option<String>,
    #[serde(default, rename = "nome_classe", skip_serializing_if = "Option::is_none")]
    pub nome_classe: Option<String>,
    /// Campos não mapeados, preservados na exportação
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceItem {
    pub fn price(&self) -> f64 {
        self.preco_unitario.unwrap_or(0.0)
    }

    pub fn quantity(&self) -> f64 {
        self.quantidade.unwrap_or(0.0)
    }

    /// Data do resultado; aceita `YYYY-MM-DD` com ou sem horário.
    pub fn result_date(&self) -> Option<NaiveDate> {
        self.data_resultado.as_deref().and_then(parse_date)
    }

    /// Chave `YYYY-MM` usada na série mensal
    pub fn month_key(&self) -> Option<&str> {
        self.data_resultado
            .as_deref()
            .filter(|d| d.len() >= 7 && d.is_char_boundary(7))
            .map(|d| &d[..7])
    }

    pub fn supplier(&self) -> &str {
        self.nome_fornecedor.as_deref().unwrap_or("")
    }

    pub fn purchase_id(&self) -> &str {
        self.id_compra.as_deref().unwrap_or("")
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Estatísticas calculadas pelo servidor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceStatistics {
    #[serde(default)]
    pub preco_minimo: Option<f64>,
    #[serde(default)]
    pub q1: Option<f64>,
    #[serde(default)]
    pub preco_mediana: Option<f64>,
    #[serde(default)]
    pub preco_medio: Option<f64>,
    #[serde(default)]
    pub q3: Option<f64>,
    #[serde(default)]
    pub preco_maximo: Option<f64>,
    #[serde(default)]
    pub desvio_padrao: Option<f64>,
    #[serde(default)]
    pub coeficiente_variacao: Option<f64>,
    #[serde(default)]
    pub quantidade_outliers: Option<u32>,
    #[serde(default)]
    pub limite_inferior: Option<f64>,
    #[serde(default)]
    pub limite_superior: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceStatistics {
    pub fn outlier_count(&self) -> u32 {
        self.quantidade_outliers.unwrap_or(0)
    }
}

/// Resultado completo de uma pesquisa por código CATMAT/CATSERV
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceResearchResult {
    #[serde(default, deserialize_with = "string_or_number")]
    pub codigo_catmat: Option<String>,
    #[serde(default)]
    pub descricao_item: Option<String>,
    #[serde(default)]
    pub tipo_catalogo: Option<String>,
    #[serde(default)]
    pub total_registros: Option<u64>,
    #[serde(default)]
    pub itens: Vec<PriceItem>,
    #[serde(default)]
    pub estatisticas: Option<PriceStatistics>,
    #[serde(default)]
    pub estatisticas_sem_outliers: Option<PriceStatistics>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PriceResearchResult {
    pub fn catalog_type(&self) -> CatalogType {
        CatalogType::from_str(self.tipo_catalogo.as_deref().unwrap_or(""))
    }

    pub fn code(&self) -> &str {
        self.codigo_catmat.as_deref().unwrap_or("")
    }

    pub fn total(&self) -> u64 {
        self.total_registros.unwrap_or(self.itens.len() as u64)
    }

    /// Itens considerados pela visão atual
    pub fn items(&self, include_outliers: bool) -> Vec<&PriceItem> {
        self.itens
            .iter()
            .filter(|item| include_outliers || !item.is_outlier)
            .collect()
    }

    /// With outliers excluded the server's trimmed variant is preferred.
    pub fn statistics(&self, include_outliers: bool) -> Option<&PriceStatistics> {
        if include_outliers {
            self.estatisticas.as_ref()
        } else {
            self.estatisticas_sem_outliers
                .as_ref()
                .or(self.estatisticas.as_ref())
        }
    }

    /// UFs distintas presentes no resultado, ordenadas
    pub fn states(&self) -> Vec<String> {
        let mut states: Vec<String> = self
            .itens
            .iter()
            .filter_map(|item| item.estado.clone())
            .filter(|uf| !uf.is_empty())
            .collect();
        states.sort();
        states.dedup();
        states
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_parses_backend_shape() {
        let item: PriceItem = serde_json::from_str(
            r#"{"idCompra": 9001, "estado": "SP", "dataResultado": "2024-03-05T10:00:00",
                "precoUnitario": 12.5, "isOutlier": true, "nome_classe": "Papel", "origem": "x"}"#,
        )
        .unwrap();
        assert_eq!(item.purchase_id(), "9001");
        assert_eq!(item.result_date(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(item.month_key(), Some("2024-03"));
        assert!(item.is_outlier);
        assert_eq!(item.nome_classe.as_deref(), Some("Papel"));
        assert_eq!(item.extra.get("origem"), Some(&Value::from("x")));
    }

    #[test]
    fn test_outlier_view_uses_trimmed_statistics() {
        let result: PriceResearchResult = serde_json::from_str(
            r#"{"codigo_catmat": 123, "tipo_catalogo": "servico",
                "itens": [{"precoUnitario": 1, "estado": "RJ"},
                          {"precoUnitario": 900, "isOutlier": true, "estado": "AC"}],
                "estatisticas": {"preco_medio": 450.5},
                "estatisticas_sem_outliers": {"preco_medio": 1}}"#,
        )
        .unwrap();
        assert_eq!(result.code(), "123");
        assert_eq!(result.catalog_type().label(), "CATSERV");
        assert_eq!(result.items(false).len(), 1);
        assert_eq!(result.items(true).len(), 2);
        assert_eq!(result.statistics(false).and_then(|s| s.preco_medio), Some(1.0));
        assert_eq!(result.statistics(true).and_then(|s| s.preco_medio), Some(450.5));
        assert_eq!(result.states(), vec!["AC".to_string(), "RJ".to_string()]);
    }
}
