//! Client-side exports of the current result.

use super::dto::{PriceItem, PriceResearchResult};
use super::report::Quotation;
use crate::usecases::common::UseCaseResult;

pub const CSV_FILENAME: &str = "precos.csv";
pub const QUOTATION_FILENAME: &str = "cotacao.json";
pub const CSV_MIME: &str = "text/csv;charset=utf-8";
pub const JSON_MIME: &str = "application/json";

const CSV_HEADERS: [&str; 7] = ["UASG", "UF", "Data", "Fornecedor", "Preço Unit.", "Qtd", "Unidade"];

/// Arquivo pronto para download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
}

/// Full result as pretty JSON, unknown fields included.
pub fn result_json(result: &PriceResearchResult) -> UseCaseResult<ExportFile> {
    Ok(ExportFile {
        filename: format!("precos_{}.json", result.code()),
        mime: JSON_MIME,
        content: serde_json::to_string_pretty(result)?,
    })
}

pub fn quotation_json(quotation: &Quotation) -> UseCaseResult<ExportFile> {
    Ok(ExportFile {
        filename: QUOTATION_FILENAME.to_string(),
        mime: JSON_MIME,
        content: serde_json::to_string_pretty(quotation)?,
    })
}

/// Semicolon separated, BOM prefixed so spreadsheet tools pick UTF-8.
/// Outliers follow the table toggle.
pub fn result_csv(result: &PriceResearchResult, include_outliers: bool) -> ExportFile {
    let mut csv = String::from('\u{feff}');
    csv.push_str(&CSV_HEADERS.join(";"));
    csv.push('\n');
    for item in result.items(include_outliers) {
        csv.push_str(&csv_row(item));
        csv.push('\n');
    }
    ExportFile {
        filename: CSV_FILENAME.to_string(),
        mime: CSV_MIME,
        content: csv,
    }
}

fn csv_row(item: &PriceItem) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let number = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
    [
        text(&item.nome_uasg),
        text(&item.estado),
        item.result_date()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        quote(item.supplier()),
        number(item.preco_unitario),
        number(item.quantidade),
        text(&item.sigla_unidade_fornecimento),
    ]
    .join(";")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PriceResearchResult {
        serde_json::from_str(
            r#"{"codigo_catmat": "4500", "tipo_catalogo": "material", "total_registros": 2,
                "itens": [
                  {"idCompra": "1", "nomeUasg": "UASG A", "estado": "SP", "dataResultado": "2024-01-31",
                   "nomeFornecedor": "ACME \"Ltda\"", "precoUnitario": 10, "quantidade": 3,
                   "siglaUnidadeFornecimento": "UN", "fonte": {"sistema": "compras"}},
                  {"idCompra": "2", "precoUnitario": 999.5, "isOutlier": true}
                ],
                "estatisticas": {"preco_medio": 504.75, "mediana_extra": 1},
                "gerado_em": "2024-02-01"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_json_export_round_trips() {
        let result = sample();
        let file = result_json(&result).unwrap();
        assert_eq!(file.filename, "precos_4500.json");
        let back: PriceResearchResult = serde_json::from_str(&file.content).unwrap();
        assert_eq!(back, result);
        assert_eq!(back.extra["gerado_em"], "2024-02-01");
        assert_eq!(back.itens[0].extra["fonte"]["sistema"], "compras");
    }

    #[test]
    fn test_csv_layout() {
        let file = result_csv(&sample(), false);
        let mut lines = file.content.lines();
        assert_eq!(
            lines.next(),
            Some("\u{feff}UASG;UF;Data;Fornecedor;Preço Unit.;Qtd;Unidade")
        );
        assert_eq!(
            lines.next(),
            Some("UASG A;SP;31/01/2024;\"ACME \"\"Ltda\"\"\";10;3;UN")
        );
        assert_eq!(lines.next(), None);

        let with_outliers = result_csv(&sample(), true);
        assert_eq!(with_outliers.content.lines().count(), 3);
        assert!(with_outliers.content.contains(";-;\"\";999.5;;"));
    }
}
