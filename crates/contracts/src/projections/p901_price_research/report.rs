//! Consolidated quotation built from the selected rows.

use serde::{Deserialize, Serialize};

use super::dto::{PriceItem, PriceResearchResult};
use crate::usecases::common::{UseCaseError, UseCaseResult};

pub const EMPTY_SELECTION_MESSAGE: &str = "Selecione pelo menos um item para gerar o relatório.";

/// Estatísticas recalculadas sobre a seleção
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub minimo: f64,
    pub q1: f64,
    pub mediana: f64,
    pub media: f64,
    pub q3: f64,
    pub maximo: f64,
    pub desvio: f64,
    pub cv: f64,
    pub quantidade: usize,
}

impl ReportStatistics {
    /// Population standard deviation; quartiles and median are picked by
    /// index over the sorted prices.
    pub fn compute(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }
        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let media = sorted.iter().sum::<f64>() / n as f64;
        let variance = sorted.iter().map(|p| (p - media).powi(2)).sum::<f64>() / n as f64;
        let desvio = variance.sqrt();
        let cv = if media > 0.0 { desvio / media * 100.0 } else { 0.0 };
        let at = |fraction: f64| sorted[((n as f64 * fraction).floor() as usize).min(n - 1)];
        Some(Self {
            minimo: sorted[0],
            q1: at(0.25),
            mediana: sorted[n / 2],
            media,
            q3: at(0.75),
            maximo: sorted[n - 1],
            desvio,
            cv,
            quantidade: n,
        })
    }

    pub fn cv_label(&self) -> String {
        format!("{:.2}%", self.cv)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationLevel {
    Baixo,
    Medio,
    Alto,
}

impl VariationLevel {
    pub fn from_cv(cv: f64) -> Self {
        if cv < 15.0 {
            VariationLevel::Baixo
        } else if cv < 30.0 {
            VariationLevel::Medio
        } else {
            VariationLevel::Alto
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VariationLevel::Baixo => "Baixo",
            VariationLevel::Medio => "Médio",
            VariationLevel::Alto => "Alto",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            VariationLevel::Baixo => "cv-badge cv-low",
            VariationLevel::Medio => "cv-badge cv-medium",
            VariationLevel::Alto => "cv-badge cv-high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    pub codigo: String,
    pub tipo: String,
    pub descricao: String,
    pub unidade: String,
}

/// Campos preenchidos pelo usuário no modal do relatório
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub objeto: String,
    pub justificativa: String,
    pub responsavel: String,
    pub setor: String,
    pub observacoes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotationStatistics {
    pub minimo: f64,
    pub media: f64,
    pub mediana: f64,
    pub maximo: f64,
    pub quantidade_itens: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationLine {
    pub fornecedor: Option<String>,
    pub cnpj: Option<String>,
    pub preco_unitario: Option<f64>,
    pub quantidade: Option<f64>,
    pub unidade: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub observacao: String,
}

impl QuotationLine {
    pub fn from_item(item: &PriceItem) -> Self {
        Self {
            fornecedor: item.nome_fornecedor.clone(),
            cnpj: item.ni_fornecedor.clone(),
            preco_unitario: item.preco_unitario,
            quantidade: item.quantidade,
            unidade: item.sigla_unidade_fornecimento.clone(),
            observacao: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub item: QuotationItem,
    pub document_header: DocumentHeader,
    pub estatisticas: QuotationStatistics,
    pub itens: Vec<QuotationLine>,
}

impl Quotation {
    pub fn valor_total(&self) -> f64 {
        self.estatisticas.media
    }
}

/// Rascunho do relatório consolidado aberto a partir da seleção
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationReport {
    pub item: QuotationItem,
    pub header: DocumentHeader,
    pub statistics: ReportStatistics,
    pub lines: Vec<QuotationLine>,
}

impl QuotationReport {
    pub fn open(result: &PriceResearchResult, selected: &[&PriceItem]) -> UseCaseResult<Self> {
        let prices: Vec<f64> = selected.iter().map(|item| item.price()).collect();
        let statistics = ReportStatistics::compute(&prices)
            .ok_or_else(|| UseCaseError::validation(EMPTY_SELECTION_MESSAGE))?;
        Ok(Self {
            item: QuotationItem {
                codigo: result.code().to_string(),
                tipo: result.catalog_type().label().to_string(),
                descricao: result.descricao_item.clone().unwrap_or_default(),
                unidade: String::new(),
            },
            header: DocumentHeader::default(),
            statistics,
            lines: selected.iter().map(|item| QuotationLine::from_item(item)).collect(),
        })
    }

    pub fn set_observation(&mut self, index: usize, text: impl Into<String>) {
        if let Some(line) = self.lines.get_mut(index) {
            line.observacao = text.into();
        }
    }

    pub fn quotation(&self) -> Quotation {
        let s = &self.statistics;
        Quotation {
            item: self.item.clone(),
            document_header: self.header.clone(),
            estatisticas: QuotationStatistics {
                minimo: s.minimo,
                media: s.media,
                mediana: s.mediana,
                maximo: s.maximo,
                quantidade_itens: s.quantidade,
            },
            itens: self.lines.clone(),
        }
    }

    pub fn save_request(&self, projeto_id: i64) -> SaveQuotationRequest {
        let quotation = self.quotation();
        SaveQuotationRequest {
            projeto_id,
            artefato_data: SavedQuotation {
                valor_total: quotation.valor_total(),
                quotation,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQuotation {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub valor_total: f64,
}

/// Corpo de `POST /api/pesquisa_precos/salvar`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveQuotationRequest {
    pub projeto_id: i64,
    pub artefato_data: SavedQuotation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_statistics_population_stddev() {
        let stats = ReportStatistics::compute(&[30.0, 10.0, 20.0]).unwrap();
        assert_eq!(stats.media, 20.0);
        assert_eq!(stats.mediana, 20.0);
        assert_eq!(stats.minimo, 10.0);
        assert_eq!(stats.maximo, 30.0);
        // sqrt(200/3) / 20 * 100
        assert!((stats.desvio - 8.164_965_809).abs() < 1e-6);
        assert!((stats.cv - 40.824_829_046).abs() < 1e-6);
        assert_eq!(stats.cv_label(), "40.82%");
        assert_eq!(VariationLevel::from_cv(stats.cv), VariationLevel::Alto);
    }

    #[test]
    fn test_quartiles_by_index() {
        let stats = ReportStatistics::compute(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.mediana, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert!(ReportStatistics::compute(&[]).is_none());
    }

    #[test]
    fn test_variation_thresholds() {
        assert_eq!(VariationLevel::from_cv(14.99).label(), "Baixo");
        assert_eq!(VariationLevel::from_cv(15.0).label(), "Médio");
        assert_eq!(VariationLevel::from_cv(30.0).label(), "Alto");
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = QuotationReport::open(&PriceResearchResult::default(), &[]).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message, EMPTY_SELECTION_MESSAGE);
    }

    #[test]
    fn test_save_request_carries_mean_as_total() {
        let result = PriceResearchResult {
            codigo_catmat: Some("150".into()),
            tipo_catalogo: Some("material".into()),
            ..Default::default()
        };
        let items: Vec<PriceItem> = [10.0, 20.0, 30.0]
            .iter()
            .map(|p| PriceItem {
                preco_unitario: Some(*p),
                nome_fornecedor: Some("F".into()),
                ..Default::default()
            })
            .collect();
        let refs: Vec<&PriceItem> = items.iter().collect();
        let mut report = QuotationReport::open(&result, &refs).unwrap();
        report.header.objeto = "Resmas".into();
        report.set_observation(1, "entrega lenta");

        let body = serde_json::to_value(report.save_request(7)).unwrap();
        assert_eq!(body["projeto_id"], 7);
        assert_eq!(body["artefato_data"]["valor_total"], 20.0);
        assert_eq!(body["artefato_data"]["item"]["tipo"], "CATMAT");
        assert_eq!(body["artefato_data"]["document_header"]["objeto"], "Resmas");
        assert_eq!(body["artefato_data"]["estatisticas"]["quantidade_itens"], 3);
        assert_eq!(body["artefato_data"]["itens"][1]["observacao"], "entrega lenta");
    }
}
