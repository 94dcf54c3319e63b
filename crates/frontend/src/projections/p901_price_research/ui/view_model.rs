//! ViewModel for the price research page

use contracts::projections::p901_price_research::export::{quotation_json, result_csv, result_json};
use contracts::projections::p901_price_research::queue::{
    QueuedSearch, SearchQueue, CLEAR_QUEUE_CONFIRM, EMPTY_QUEUE_MESSAGE,
};
use contracts::projections::p901_price_research::search::{
    ContractDetailResponse, PriceSearch, NEW_SEARCH_CONFIRM, PNCP_NOT_FOUND_MESSAGE,
    SEARCH_FAILED_MESSAGE,
};
use contracts::projections::p901_price_research::table::FilterInputs;
use contracts::projections::p901_price_research::{
    CatalogType, PriceFilters, PriceItem, PriceTable, QuotationReport, SortColumn,
};
use contracts::shared::config::ClientConfig;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::model::{fetch_contract_detail, fetch_prices, save_quotation};
use crate::shared::dom::{confirm, element_value, open_in_new_window, print_page, redirect};
use crate::shared::export::download;
use crate::shared::notifications::NotificationContext;
use crate::shared::storage::BrowserStorage;

const PROJECT_ID_ELEMENT: &str = "projetoId";

/// Contract detail modal of one table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailDialog {
    pub item: PriceItem,
    pub state: DetailState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(ContractDetailResponse),
    Failed,
}

#[derive(Clone)]
struct Endpoints {
    price_search: String,
    contract_detail: String,
    quotation_save: String,
}

#[derive(Clone, Copy)]
pub struct PriceResearchVm {
    pub table: RwSignal<PriceTable>,
    pub has_result: RwSignal<bool>,
    pub codigo: RwSignal<String>,
    pub tipo: RwSignal<String>,
    pub estado: RwSignal<String>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    pub filter_inputs: RwSignal<FilterInputs>,
    pub detail: RwSignal<Option<DetailDialog>>,
    pub report: RwSignal<Option<QuotationReport>>,
    pub saving: RwSignal<bool>,
    /// Persisted queue snapshot, refreshed after every queue change
    pub queue: RwSignal<Vec<QueuedSearch>>,
    pub page_size_options: StoredValue<Vec<usize>>,
    pub histogram_bins: usize,
    notifications: NotificationContext,
    endpoints: StoredValue<Endpoints>,
}

impl PriceResearchVm {
    pub fn new(config: &ClientConfig, notifications: NotificationContext) -> Self {
        let queue = SearchQueue::new(BrowserStorage).items();
        Self {
            table: RwSignal::new(PriceTable::new(Default::default(), config.price_table.page_size)),
            has_result: RwSignal::new(false),
            codigo: RwSignal::new(String::new()),
            tipo: RwSignal::new(CatalogType::Material.as_str().to_string()),
            estado: RwSignal::new(String::new()),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            filter_inputs: RwSignal::new(FilterInputs::default()),
            detail: RwSignal::new(None),
            report: RwSignal::new(None),
            saving: RwSignal::new(false),
            queue: RwSignal::new(queue),
            page_size_options: StoredValue::new(config.price_table.page_size_options.clone()),
            histogram_bins: config.price_table.histogram_bins,
            notifications,
            endpoints: StoredValue::new(Endpoints {
                price_search: config.endpoints.price_search.clone(),
                contract_detail: config.endpoints.contract_detail.clone(),
                quotation_save: config.endpoints.quotation_save.clone(),
            }),
        }
    }

    // ---- search ----

    pub fn search(&self) {
        if self.loading.get_untracked() {
            return;
        }
        let search = PriceSearch::new(
            self.codigo.get_untracked(),
            CatalogType::from_str(&self.tipo.get_untracked()),
            Some(self.estado.get_untracked()),
        );
        if let Err(e) = search.validate() {
            self.notifications.warning(e.user_message().to_string());
            return;
        }
        if self.table.with_untracked(|t| t.has_selection()) && !confirm(NEW_SEARCH_CONFIRM) {
            return;
        }

        let vm = *self;
        let base = self.endpoints.with_value(|e| e.price_search.clone());
        vm.loading.set(true);
        vm.error.set(None);
        vm.table.update(|t| t.clear_selection());
        spawn_local(async move {
            match fetch_prices(&base, &search).await {
                Ok(result) => {
                    vm.table.update(|t| t.load(result));
                    vm.has_result.set(true);
                }
                Err(e) => {
                    log::error!("price search failed: {}", e);
                    let message = if e.is_empty() { SEARCH_FAILED_MESSAGE.to_string() } else { e };
                    vm.error.set(Some(message));
                    vm.has_result.set(false);
                }
            }
            vm.loading.set(false);
        });
    }

    pub fn clear_form(&self) {
        self.codigo.set(String::new());
        self.tipo.set(CatalogType::Material.as_str().to_string());
        self.estado.set(String::new());
        self.error.set(None);
        self.has_result.set(false);
        self.table.update(|t| {
            t.clear_selection();
            t.load(Default::default());
        });
    }

    // ---- table ----

    pub fn apply_filters(&self) {
        let filters = self.filter_inputs.with_untracked(|inputs| PriceFilters::from(inputs));
        self.table.update(|t| t.set_filters(filters));
    }

    pub fn clear_filters(&self) {
        self.filter_inputs.set(FilterInputs::default());
        self.table.update(|t| t.clear_filters());
    }

    pub fn set_include_outliers(&self, include: bool) {
        self.table.update(|t| t.set_include_outliers(include));
    }

    pub fn sort_by(&self, column: SortColumn) {
        self.table.update(|t| t.toggle_sort(column));
    }

    pub fn go_to(&self, page: usize) {
        self.table.update(|t| t.go_to(page));
    }

    pub fn set_page_size(&self, size: usize) {
        self.table.update(|t| t.set_page_size(size));
    }

    pub fn toggle_row(&self, id: &str) {
        self.table.update(|t| t.toggle_row(id));
    }

    pub fn toggle_page(&self) {
        self.table.update(|t| t.toggle_page());
    }

    // ---- exports ----

    pub fn export_json(&self) {
        if !self.has_result.get_untracked() {
            return;
        }
        let file = self.table.with_untracked(|t| result_json(t.result()));
        if let Err(e) = file.map_err(|e| e.to_string()).and_then(|f| download(&f)) {
            self.notifications.error(format!("Erro ao exportar: {}", e));
        }
    }

    pub fn export_csv(&self) {
        if !self.has_result.get_untracked() {
            return;
        }
        let file = self
            .table
            .with_untracked(|t| result_csv(t.result(), t.include_outliers));
        if let Err(e) = download(&file) {
            self.notifications.error(format!("Erro ao exportar: {}", e));
        }
    }

    // ---- detail / PNCP ----

    pub fn open_detail(&self, item: PriceItem) {
        let vm = *self;
        let base = self.endpoints.with_value(|e| e.contract_detail.clone());
        vm.detail.set(Some(DetailDialog {
            item: item.clone(),
            state: DetailState::Loading,
        }));
        spawn_local(async move {
            let state = match fetch_contract_detail(&base, &item).await {
                Ok(detail) => DetailState::Loaded(detail),
                Err(e) => {
                    log::warn!("contract detail unavailable: {}", e);
                    DetailState::Failed
                }
            };
            // The dialog may have been closed or reopened for another row.
            vm.detail.update(|d| {
                if let Some(dialog) = d.as_mut().filter(|d| d.item == item) {
                    dialog.state = state;
                }
            });
        });
    }

    pub fn close_detail(&self) {
        self.detail.set(None);
    }

    pub fn open_pncp(&self, item: PriceItem) {
        let vm = *self;
        let base = self.endpoints.with_value(|e| e.contract_detail.clone());
        spawn_local(async move {
            match fetch_contract_detail(&base, &item).await {
                Ok(detail) => match detail.pncp_link() {
                    Some(link) => open_in_new_window(&link),
                    None => {
                        vm.notifications.warning(PNCP_NOT_FOUND_MESSAGE);
                    }
                },
                Err(e) => {
                    log::error!("PNCP lookup failed: {}", e);
                    vm.notifications.error("Erro ao buscar PNCP");
                }
            }
        });
    }

    // ---- quotation report ----

    pub fn open_report(&self) {
        let opened = self
            .table
            .with_untracked(|t| QuotationReport::open(t.result(), &t.selected_items()));
        match opened {
            Ok(report) => self.report.set(Some(report)),
            Err(e) => {
                self.notifications.warning(e.user_message().to_string());
            }
        }
    }

    pub fn close_report(&self) {
        if !self.saving.get_untracked() {
            self.report.set(None);
        }
    }

    pub fn update_report(&self, f: impl FnOnce(&mut QuotationReport)) {
        self.report.update(|r| {
            if let Some(report) = r.as_mut() {
                f(report);
            }
        });
    }

    pub fn export_quotation(&self) {
        let Some(quotation) = self.report.with_untracked(|r| r.as_ref().map(|r| r.quotation())) else {
            return;
        };
        if let Err(e) = quotation_json(&quotation)
            .map_err(|e| e.to_string())
            .and_then(|f| download(&f))
        {
            self.notifications.error(format!("Erro ao exportar: {}", e));
        }
    }

    pub fn print_report(&self) {
        print_page();
    }

    /// Saves the quotation into the project embedded in the page and
    /// navigates back to it.
    pub fn save_report(&self) {
        let Some(projeto_id) = element_value(PROJECT_ID_ELEMENT).and_then(|v| v.trim().parse::<i64>().ok())
        else {
            self.notifications.error("Erro: projeto não identificado.");
            return;
        };
        let Some(request) = self
            .report
            .with_untracked(|r| r.as_ref().map(|r| r.save_request(projeto_id)))
        else {
            return;
        };

        let vm = *self;
        let endpoint = self.endpoints.with_value(|e| e.quotation_save.clone());
        vm.saving.set(true);
        spawn_local(async move {
            match save_quotation(&endpoint, &request).await {
                Ok(_) => {
                    vm.saving.set(false);
                    vm.report.set(None);
                    redirect(&format!("/projetos/{}", projeto_id));
                }
                Err(e) => {
                    log::error!("quotation save failed: {}", e);
                    vm.notifications.error(format!("Erro: {}", e));
                    vm.saving.set(false);
                }
            }
        });
    }

    // ---- queue ----

    fn queue_store(&self) -> SearchQueue<BrowserStorage> {
        SearchQueue::new(BrowserStorage)
    }

    fn refresh_queue(&self) {
        self.queue.set(self.queue_store().items());
    }

    /// Queues the code currently shown in the result header.
    pub fn enqueue_current(&self) {
        let entry = self.table.with_untracked(|t| {
            let result = t.result();
            QueuedSearch::new(result.code(), result.descricao_item.clone().unwrap_or_default())
        });
        if entry.codigo.is_empty() {
            return;
        }
        if self.queue_store().add([entry]) > 0 {
            self.notifications.success("Item adicionado à fila.");
        } else {
            self.notifications.info("Item já está na fila.");
        }
        self.refresh_queue();
    }

    pub fn remove_from_queue(&self, codigo: &str) {
        self.queue_store().remove(codigo);
        self.refresh_queue();
    }

    /// Fills the form with the head of the queue and searches it. The entry
    /// stays queued until removed.
    pub fn next_in_queue(&self) {
        match self.queue_store().next() {
            Ok(entry) => {
                self.codigo.set(entry.codigo);
                self.tipo.set(CatalogType::Material.as_str().to_string());
                self.search();
            }
            Err(_) => {
                self.notifications.warning(EMPTY_QUEUE_MESSAGE);
            }
        }
    }

    pub fn clear_queue(&self) {
        if confirm(CLEAR_QUEUE_CONFIRM) {
            self.queue_store().clear();
            self.refresh_queue();
        }
    }
}
