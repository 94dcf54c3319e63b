//! Filter, sort, pagination and selection over an already fetched result.
//!
//! Nothing here talks to the network: a search replaces the result and every
//! later interaction re-derives the visible page from it. Row ids combine the
//! purchase id with the item's position in the full list, so a selection
//! survives filter, sort and page changes.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dto::{parse_date, PriceItem, PriceResearchResult};
use crate::shared::text::fold;

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Uasg,
    Uf,
    Data,
    Fornecedor,
    Preco,
    Quantidade,
    Unidade,
}

impl SortColumn {
    pub fn all() -> &'static [SortColumn] {
        &[
            SortColumn::Uasg,
            SortColumn::Uf,
            SortColumn::Data,
            SortColumn::Fornecedor,
            SortColumn::Preco,
            SortColumn::Quantidade,
            SortColumn::Unidade,
        ]
    }

    pub fn header(&self) -> &'static str {
        match self {
            SortColumn::Uasg => "UASG",
            SortColumn::Uf => "UF",
            SortColumn::Data => "Data",
            SortColumn::Fornecedor => "Fornecedor",
            SortColumn::Preco => "Preço Unit.",
            SortColumn::Quantidade => "Qtd",
            SortColumn::Unidade => "Unidade",
        }
    }

    fn compare(&self, a: &PriceItem, b: &PriceItem) -> Ordering {
        match self {
            SortColumn::Data => a.result_date().cmp(&b.result_date()),
            SortColumn::Preco => a.price().total_cmp(&b.price()),
            SortColumn::Quantidade => a.quantity().total_cmp(&b.quantity()),
            SortColumn::Uasg => locale_cmp(opt(&a.nome_uasg), opt(&b.nome_uasg)),
            SortColumn::Uf => locale_cmp(opt(&a.estado), opt(&b.estado)),
            SortColumn::Fornecedor => locale_cmp(a.supplier(), b.supplier()),
            SortColumn::Unidade => locale_cmp(
                opt(&a.sigla_unidade_fornecimento),
                opt(&b.sigla_unidade_fornecimento),
            ),
        }
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Data,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Same column while ascending flips to descending; anything else starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        self.direction = if self.column == column && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.column = column;
    }

    pub fn indicator(&self, column: SortColumn) -> &'static str {
        if self.column == column {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

/// Filtros aplicados sobre a lista em memória
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFilters {
    pub fornecedor: String,
    pub uf: String,
    pub preco_min: Option<f64>,
    pub preco_max: Option<f64>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

impl PriceFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, item: &PriceItem) -> bool {
        let supplier = self.fornecedor.trim();
        if !supplier.is_empty()
            && !item
                .supplier()
                .to_lowercase()
                .contains(&supplier.to_lowercase())
        {
            return false;
        }
        if !self.uf.is_empty() && item.estado.as_deref() != Some(self.uf.as_str()) {
            return false;
        }
        let price = item.price();
        if self.preco_min.is_some_and(|min| price < min) {
            return false;
        }
        if self.preco_max.is_some_and(|max| price > max) {
            return false;
        }
        if self.data_inicio.is_some() || self.data_fim.is_some() {
            let Some(date) = item.result_date() else {
                return false;
            };
            if self.data_inicio.is_some_and(|start| date < start) {
                return false;
            }
            if self.data_fim.is_some_and(|end| date > end) {
                return false;
            }
        }
        true
    }
}

/// Raw text of the filter inputs, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub fornecedor: String,
    pub uf: String,
    pub preco_min: String,
    pub preco_max: String,
    pub data_inicio: String,
    pub data_fim: String,
}

/// Accepts `1234.5` and `1.234,5`; blank or unparsable reads as unset.
fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.to_string()
    };
    normalized.parse().ok().filter(|v: &f64| v.is_finite())
}

impl From<&FilterInputs> for PriceFilters {
    fn from(inputs: &FilterInputs) -> Self {
        Self {
            fornecedor: inputs.fornecedor.trim().to_string(),
            uf: inputs.uf.trim().to_string(),
            preco_min: parse_price(&inputs.preco_min),
            preco_max: parse_price(&inputs.preco_max),
            data_inicio: parse_date(inputs.data_inicio.trim()),
            data_fim: parse_date(inputs.data_fim.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PriceRow<'a> {
    pub id: &'a str,
    pub item: &'a PriceItem,
}

#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub rows: Vec<PriceRow<'a>>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub start: usize,
    pub end: usize,
}

impl PageView<'_> {
    pub fn info(&self) -> String {
        if self.total == 0 {
            return "Nenhum registro encontrado".to_string();
        }
        format!(
            "Mostrando {}-{} de {} registros",
            self.start + 1,
            self.end,
            self.total
        )
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Estado da tabela de preços
#[derive(Debug, Clone)]
pub struct PriceTable {
    result: PriceResearchResult,
    row_ids: Vec<String>,
    pub include_outliers: bool,
    filters: PriceFilters,
    sort: SortState,
    page: usize,
    page_size: usize,
    selected: BTreeSet<String>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(PriceResearchResult::default(), DEFAULT_PAGE_SIZE)
    }
}

impl PriceTable {
    pub fn new(result: PriceResearchResult, page_size: usize) -> Self {
        let row_ids = row_ids(&result);
        Self {
            result,
            row_ids,
            include_outliers: false,
            filters: PriceFilters::default(),
            sort: SortState::default(),
            page: 1,
            page_size: page_size.max(1),
            selected: BTreeSet::new(),
        }
    }

    /// Replaces the result after a new search. Filters are kept, the page
    /// and selection are reset.
    pub fn load(&mut self, result: PriceResearchResult) {
        self.row_ids = row_ids(&result);
        self.result = result;
        self.page = 1;
        self.selected.clear();
    }

    pub fn result(&self) -> &PriceResearchResult {
        &self.result
    }

    pub fn filters(&self) -> &PriceFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_filters(&mut self, filters: PriceFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(PriceFilters::default());
    }

    pub fn set_include_outliers(&mut self, include: bool) {
        self.include_outliers = include;
        self.page = 1;
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort.toggle(column);
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 1;
    }

    pub fn go_to(&mut self, page: usize) {
        let total_pages = self.total_pages();
        self.page = page.clamp(1, total_pages);
    }

    pub fn next_page(&mut self) {
        self.go_to(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to(self.page.saturating_sub(1));
    }

    /// Linhas filtradas e ordenadas, sem paginação
    pub fn rows(&self) -> Vec<PriceRow<'_>> {
        let mut rows: Vec<PriceRow<'_>> = self
            .result
            .itens
            .iter()
            .zip(self.row_ids.iter())
            .filter(|(item, _)| self.include_outliers || !item.is_outlier)
            .filter(|(item, _)| self.filters.matches(item))
            .map(|(item, id)| PriceRow { id: id.as_str(), item })
            .collect();
        let SortState { column, direction } = self.sort;
        rows.sort_by(|a, b| {
            let ord = column.compare(a.item, b.item);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        rows
    }

    pub fn total_pages(&self) -> usize {
        let total = self.rows().len();
        total.div_ceil(self.page_size).max(1)
    }

    pub fn page_view(&self) -> PageView<'_> {
        let rows = self.rows();
        let total = rows.len();
        let total_pages = total.div_ceil(self.page_size).max(1);
        let page = self.page.clamp(1, total_pages);
        let start = ((page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        PageView {
            rows: rows[start..end].to_vec(),
            page,
            total_pages,
            total,
            start,
            end,
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_row(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Header checkbox: selects every row of the current page, or clears
    /// them when all are already selected.
    pub fn toggle_page(&mut self) {
        let ids: Vec<String> = self
            .page_view()
            .rows
            .iter()
            .map(|row| row.id.to_string())
            .collect();
        let all_selected = !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id));
        for id in ids {
            if all_selected {
                self.selected.remove(&id);
            } else {
                self.selected.insert(id);
            }
        }
    }

    pub fn page_fully_selected(&self) -> bool {
        let view = self.page_view();
        !view.rows.is_empty() && view.rows.iter().all(|row| self.selected.contains(row.id))
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Itens selecionados na ordem da lista original
    pub fn selected_items(&self) -> Vec<&PriceItem> {
        self.result
            .itens
            .iter()
            .zip(self.row_ids.iter())
            .filter(|(_, id)| self.selected.contains(id.as_str()))
            .map(|(item, _)| item)
            .collect()
    }
}

fn row_ids(result: &PriceResearchResult) -> Vec<String> {
    result
        .itens
        .iter()
        .enumerate()
        .map(|(index, item)| format!("{}-{}", item.purchase_id(), index))
        .collect()
}

/// Case and accent insensitive comparison, with the raw text as tie-breaker.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, preco: f64, data: &str) -> PriceItem {
        PriceItem {
            id_compra: Some(id.to_string()),
            preco_unitario: Some(preco),
            data_resultado: Some(data.to_string()),
            ..Default::default()
        }
    }

    fn table() -> PriceTable {
        let result = PriceResearchResult {
            itens: vec![item("A", 10.0, "2024-01-01"), item("B", 5.0, "2024-02-01")],
            ..Default::default()
        };
        PriceTable::new(result, 25)
    }

    fn prices(table: &PriceTable) -> Vec<f64> {
        table.rows().iter().map(|r| r.item.price()).collect()
    }

    #[test]
    fn test_sort_by_price_ascending() {
        let mut t = table();
        t.toggle_sort(SortColumn::Preco);
        assert_eq!(t.sort().direction, SortDirection::Asc);
        assert_eq!(prices(&t), vec![5.0, 10.0]);
    }

    #[test]
    fn test_default_sort_is_date_descending() {
        let t = table();
        let dates: Vec<&str> = t
            .rows()
            .iter()
            .map(|r| r.item.data_resultado.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn test_sort_toggle_cycle() {
        let mut s = SortState::default();
        s.toggle(SortColumn::Data);
        assert_eq!(s.direction, SortDirection::Asc);
        s.toggle(SortColumn::Data);
        assert_eq!(s.direction, SortDirection::Desc);
        s.toggle(SortColumn::Preco);
        assert_eq!((s.column, s.direction), (SortColumn::Preco, SortDirection::Asc));
    }

    #[test]
    fn test_min_price_filter_excludes_cheaper_item() {
        let mut t = table();
        t.go_to(1);
        t.set_filters(PriceFilters {
            preco_min: Some(6.0),
            ..Default::default()
        });
        assert_eq!(prices(&t), vec![10.0]);
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn test_page_size_one_second_page() {
        let mut t = table();
        t.toggle_sort(SortColumn::Preco);
        t.set_page_size(1);
        t.next_page();
        let view = t.page_view();
        assert_eq!(view.page, 2);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].item.price(), 10.0);
        assert!(view.has_prev());
        assert!(!view.has_next());
        assert_eq!(view.info(), "Mostrando 2-2 de 2 registros");
    }

    #[test]
    fn test_outliers_hidden_by_default() {
        let mut result = table().result().clone();
        result.itens[0].is_outlier = true;
        let mut t = PriceTable::new(result, 25);
        assert_eq!(prices(&t), vec![5.0]);
        t.set_include_outliers(true);
        assert_eq!(t.rows().len(), 2);
    }

    #[test]
    fn test_supplier_and_date_filters() {
        let mut t = table();
        let mut result = t.result().clone();
        result.itens[0].nome_fornecedor = Some("Papelaria Central".into());
        t.load(result);
        t.set_filters(PriceFilters {
            fornecedor: "central".into(),
            ..Default::default()
        });
        assert_eq!(prices(&t), vec![10.0]);
        t.set_filters(PriceFilters {
            data_inicio: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..Default::default()
        });
        assert_eq!(prices(&t), vec![5.0]);
    }

    #[test]
    fn test_selection_survives_sort_and_filter() {
        let mut t = table();
        let id = t.rows()[0].id.to_string();
        assert_eq!(id, "B-1");
        t.toggle_row(&id);
        t.toggle_sort(SortColumn::Preco);
        t.set_filters(PriceFilters {
            preco_min: Some(6.0),
            ..Default::default()
        });
        assert!(t.is_selected("B-1"));
        assert_eq!(t.selected_items().len(), 1);
        assert_eq!(t.selected_items()[0].price(), 5.0);
    }

    #[test]
    fn test_toggle_page_selects_then_clears() {
        let mut t = table();
        t.toggle_page();
        assert_eq!(t.selected_count(), 2);
        assert!(t.page_fully_selected());
        t.toggle_page();
        assert!(!t.has_selection());
    }

    #[test]
    fn test_filter_inputs_parse_locale_numbers() {
        let filters = PriceFilters::from(&FilterInputs {
            preco_min: "1.234,50".into(),
            preco_max: "2000.5".into(),
            data_inicio: "2024-03-01".into(),
            data_fim: "ontem".into(),
            ..Default::default()
        });
        assert_eq!(filters.preco_min, Some(1234.5));
        assert_eq!(filters.preco_max, Some(2000.5));
        assert_eq!(filters.data_inicio, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(filters.data_fim, None);
        assert!(PriceFilters::from(&FilterInputs::default()).is_empty());
    }

    #[test]
    fn test_locale_cmp_folds_accents() {
        assert_eq!(locale_cmp("Ávila", "Bahia"), Ordering::Less);
        assert_eq!(locale_cmp("árvore", "Arroz"), Ordering::Greater);
        assert_eq!(fold("Ceará"), fold("ceara"));
    }
}
