use contracts::projections::p901_price_research::table::FilterInputs;
use contracts::projections::p901_price_research::{
    CatalogType, PriceItem, PriceStatistics, SortColumn, VariationLevel,
};
use leptos::prelude::*;
use thaw::*;

use super::charts::PriceCharts;
use super::detail::ContractDetailModal;
use super::queue::SearchQueuePanel;
use super::report::QuotationReportModal;
use super::view_model::PriceResearchVm;
use crate::shared::components::{PageHeader, PaginationControls, SortableHeader, StatCard};
use crate::shared::config::use_config;
use crate::shared::date_utils::{format_date, truncate};
use crate::shared::icons::icon;
use crate::shared::notifications::use_notifications;
use crate::shared::number_format::{format_brl, format_count, format_percent};

const UFS: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA", "PB", "PE",
    "PI", "PR", "RJ", "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

#[component]
fn SearchForm(vm: PriceResearchVm) -> impl IntoView {
    view! {
        <div
            class="filter-panel search-form"
            on:keydown=move |ev: web_sys::KeyboardEvent| {
                if ev.key() == "Enter" {
                    ev.prevent_default();
                    vm.search();
                }
            }
        >
            <Flex gap=FlexGap::Small align=FlexAlign::End>
                <div style="min-width: 220px;">
                    <Flex vertical=true gap=FlexGap::Small>
                        <Label>"Código CATMAT/CATSERV"</Label>
                        <Input value=vm.codigo placeholder="Ex.: 150384" />
                    </Flex>
                </div>
                <div style="min-width: 160px;">
                    <Flex vertical=true gap=FlexGap::Small>
                        <Label>"Catálogo"</Label>
                        <Select value=vm.tipo>
                            <option value=CatalogType::Material.as_str()>"Material (CATMAT)"</option>
                            <option value=CatalogType::Servico.as_str()>"Serviço (CATSERV)"</option>
                        </Select>
                    </Flex>
                </div>
                <div style="min-width: 120px;">
                    <Flex vertical=true gap=FlexGap::Small>
                        <Label>"UF"</Label>
                        <Select value=vm.estado>
                            <option value="">"Todas"</option>
                            {UFS.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
                        </Select>
                    </Flex>
                </div>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=Signal::derive(move || vm.loading.get())
                    on_click=move |_| vm.search()
                >
                    {icon("search")}
                    {move || if vm.loading.get() { " Pesquisando..." } else { " Pesquisar" }}
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.clear_form()>
                    "Limpar"
                </Button>
            </Flex>
        </div>
    }
}

#[component]
fn ItemInfo(vm: PriceResearchVm) -> impl IntoView {
    let info = move || {
        vm.table.with(|t| {
            let r = t.result();
            (
                r.code().to_string(),
                r.catalog_type().label(),
                r.descricao_item
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| "Descrição não disponível".to_string()),
                r.itens.first().and_then(|i| i.nome_classe.clone()).unwrap_or_default(),
                r.total(),
            )
        })
    };

    view! {
        <div class="item-info">
            {move || {
                let (code, catalog, description, class_name, total) = info();
                view! {
                    <div class="item-info__header">
                        <span class="item-info__code">{code}</span>
                        <span class="badge badge--brand">{catalog}</span>
                        <span class="badge">{format!("{} registros", format_count(total as usize))}</span>
                    </div>
                    <p class="item-info__description">{description}</p>
                    <small class="item-info__class">{class_name}</small>
                }
            }}
        </div>
    }
}

#[component]
fn StatisticsStrip(vm: PriceResearchVm) -> impl IntoView {
    let stats = Memo::new(move |_| {
        vm.table
            .with(|t| t.result().statistics(t.include_outliers).cloned())
            .unwrap_or_default()
    });
    // Outlier limits come from the full-sample statistics.
    let full = Memo::new(move |_| {
        vm.table
            .with(|t| t.result().estatisticas.clone())
            .unwrap_or_default()
    });
    let money = move |f: fn(&PriceStatistics) -> Option<f64>| {
        Signal::derive(move || stats.with(|s| format_brl(f(s))))
    };
    let cv = move || stats.with(|s| s.coeficiente_variacao.unwrap_or(0.0));

    view! {
        <div class="stats-strip">
            <StatCard label="Mínimo" value=money(|s| s.preco_minimo) />
            <StatCard label="Q1" value=money(|s| s.q1) />
            <StatCard label="Mediana" value=money(|s| s.preco_mediana) variant="stat-card--accent" />
            <StatCard label="Média" value=money(|s| s.preco_medio) />
            <StatCard label="Q3" value=money(|s| s.q3) />
            <StatCard label="Máximo" value=money(|s| s.preco_maximo) />
            <StatCard label="Desvio padrão" value=money(|s| s.desvio_padrao) />
            <div class="stat-card">
                <div class="stat-card__label">"Coef. de variação"</div>
                <div class="stat-card__value">{move || format_percent(cv())}</div>
                {move || {
                    let level = VariationLevel::from_cv(cv());
                    view! { <span class=format!("badge {}", level.css_class())>{level.label()}</span> }
                }}
            </div>
        </div>

        <div class="outliers">
            <span>
                {move || format!("Outliers: {}", full.with(|s| s.outlier_count()))}
            </span>
            <span>
                {move || format!(
                    "Limites: {} a {}",
                    full.with(|s| format_brl(s.limite_inferior)),
                    full.with(|s| format_brl(s.limite_superior)),
                )}
            </span>
            <label class="outliers__toggle">
                <input
                    type="checkbox"
                    prop:checked=move || vm.table.with(|t| t.include_outliers)
                    on:change=move |ev| vm.set_include_outliers(event_target_checked(&ev))
                />
                " Incluir outliers"
            </label>
        </div>
    }
}

#[component]
fn FiltersPanel(vm: PriceResearchVm) -> impl IntoView {
    let states = Memo::new(move |_| vm.table.with(|t| t.result().states()));
    let bind = move |get: fn(&FilterInputs) -> String, set: fn(&mut FilterInputs, String)| {
        (
            move || vm.filter_inputs.with(get),
            move |ev: leptos::ev::Event| {
                let text = event_target_value(&ev);
                vm.filter_inputs.update(|f| set(f, text));
            },
        )
    };
    let (supplier, on_supplier) = bind(|f| f.fornecedor.clone(), |f, v| f.fornecedor = v);
    let (uf, on_uf) = bind(|f| f.uf.clone(), |f, v| f.uf = v);
    let (min, on_min) = bind(|f| f.preco_min.clone(), |f, v| f.preco_min = v);
    let (max, on_max) = bind(|f| f.preco_max.clone(), |f, v| f.preco_max = v);
    let (start, on_start) = bind(|f| f.data_inicio.clone(), |f, v| f.data_inicio = v);
    let (end, on_end) = bind(|f| f.data_fim.clone(), |f, v| f.data_fim = v);

    view! {
        <div class="filter-panel filters-inline">
            <div class="filter-panel-header">
                <span class="filter-panel__title">"Filtros"</span>
            </div>
            <div class="filter-panel-content">
                <label>
                    "Fornecedor"
                    <input type="text" prop:value=supplier on:input=on_supplier />
                </label>
                <label>
                    "UF"
                    <select prop:value=uf on:change=on_uf>
                        <option value="">"Todos"</option>
                        {move || {
                            states
                                .get()
                                .into_iter()
                                .map(|s| view! { <option value=s.clone()>{s.clone()}</option> })
                                .collect_view()
                        }}
                    </select>
                </label>
                <label>
                    "Preço mín."
                    <input type="text" inputmode="decimal" prop:value=min on:input=on_min />
                </label>
                <label>
                    "Preço máx."
                    <input type="text" inputmode="decimal" prop:value=max on:input=on_max />
                </label>
                <label>
                    "De"
                    <input type="date" prop:value=start on:input=on_start />
                </label>
                <label>
                    "Até"
                    <input type="date" prop:value=end on:input=on_end />
                </label>
                <Flex gap=FlexGap::Small>
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.apply_filters()>
                        "Aplicar"
                    </Button>
                    <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.clear_filters()>
                        "Limpar filtros"
                    </Button>
                </Flex>
            </div>
        </div>
    }
}

#[component]
fn Toolbar(vm: PriceResearchVm) -> impl IntoView {
    let selected = move || vm.table.with(|t| t.selected_count());

    view! {
        <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center class="results-toolbar">
            <span class="results-toolbar__selected">
                {move || format!("{} selecionado(s)", format_count(selected()))}
            </span>
            <Flex gap=FlexGap::Small>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=Signal::derive(move || selected() == 0)
                    on_click=move |_| vm.open_report()
                >
                    {icon("file-text")}
                    " Gerar relatório"
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.enqueue_current()>
                    "Adicionar à fila"
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.export_json()>
                    {icon("download")}
                    " JSON"
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.export_csv()>
                    {icon("download")}
                    " CSV"
                </Button>
            </Flex>
        </Flex>
    }
}

#[component]
fn PriceRowsTable(vm: PriceResearchVm) -> impl IntoView {
    let sort = Signal::derive(move || vm.table.with(|t| t.sort()));
    let on_sort = Callback::new(move |column: SortColumn| vm.sort_by(column));

    let rows = move || {
        let rows: Vec<(String, PriceItem, bool)> = vm.table.with(|t| {
            t.page_view()
                .rows
                .iter()
                .map(|r| (r.id.to_string(), r.item.clone(), t.is_selected(r.id)))
                .collect()
        });
        if rows.is_empty() {
            return view! {
                <tr>
                    <td colspan="9" class="text-muted">"Nenhum registro encontrado"</td>
                </tr>
            }
            .into_any();
        }
        rows.into_iter()
            .map(|(id, item, selected)| {
                let detail_item = item.clone();
                let pncp_item = item.clone();
                view! {
                    <tr class:table__row--selected=selected class:table__row--outlier=item.is_outlier>
                        <td>
                            <input
                                type="checkbox"
                                prop:checked=selected
                                on:change=move |_| vm.toggle_row(&id)
                            />
                        </td>
                        <td title=item.nome_uasg.clone().unwrap_or_default()>
                            {truncate(item.nome_uasg.as_deref(), 40)}
                        </td>
                        <td>{item.estado.clone().unwrap_or_else(|| "-".to_string())}</td>
                        <td>{format_date(item.data_resultado.as_deref())}</td>
                        <td title=item.nome_fornecedor.clone().unwrap_or_default()>
                            {truncate(item.nome_fornecedor.as_deref(), 40)}
                        </td>
                        <td class="table__cell--right">{format_brl(item.preco_unitario)}</td>
                        <td class="table__cell--right">
                            {item.quantidade.map(|q| q.to_string()).unwrap_or_else(|| "-".to_string())}
                        </td>
                        <td>{item.sigla_unidade_fornecimento.clone().unwrap_or_else(|| "-".to_string())}</td>
                        <td class="table__actions">
                            <button title="Detalhes" on:click=move |_| vm.open_detail(detail_item.clone())>
                                {icon("search")}
                            </button>
                            <button title="Abrir no PNCP" on:click=move |_| vm.open_pncp(pncp_item.clone())>
                                {icon("chevron-right")}
                            </button>
                        </td>
                    </tr>
                }
            })
            .collect_view()
            .into_any()
    };

    let page_size_options = vm.page_size_options.get_value();

    view! {
        <div class="table-container">
            <table class="table">
                <thead>
                    <tr>
                        <th>
                            <input
                                type="checkbox"
                                title="Selecionar página"
                                prop:checked=move || vm.table.with(|t| t.page_fully_selected())
                                on:change=move |_| vm.toggle_page()
                            />
                        </th>
                        {SortColumn::all()
                            .iter()
                            .map(|column| view! { <SortableHeader column=*column sort=sort on_sort=on_sort /> })
                            .collect_view()}
                        <th></th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </div>
        <PaginationControls
            current_page=Signal::derive(move || vm.table.with(|t| t.page()))
            total_pages=Signal::derive(move || vm.table.with(|t| t.total_pages()))
            info=Signal::derive(move || vm.table.with(|t| t.page_view().info()))
            page_size=Signal::derive(move || vm.table.with(|t| t.page_size()))
            on_page_change=Callback::new(move |page| vm.go_to(page))
            on_page_size_change=Callback::new(move |size| vm.set_page_size(size))
            page_size_options=page_size_options
        />
    }
}

/// Price research page: search, statistics, charts and the selectable
/// result table.
#[component]
pub fn PriceResearchView() -> impl IntoView {
    let vm = PriceResearchVm::new(&use_config(), use_notifications());

    view! {
        <div class="page page--wide price-research">
            <PageHeader title="Pesquisa de Preços" subtitle="Painel de preços CATMAT/CATSERV">
                {()}
            </PageHeader>

            <SearchQueuePanel vm=vm />
            <SearchForm vm=vm />

            {move || vm.error.get().map(|e| view! {
                <div class="warning-box warning-box--error">
                    <span class="warning-box__icon">"⚠"</span>
                    <span class="warning-box__text">{e}</span>
                </div>
            })}

            <Show when=move || vm.loading.get()>
                <div class="loading"><Spinner /></div>
            </Show>

            <Show when=move || vm.has_result.get() && !vm.loading.get()>
                <ItemInfo vm=vm />
                <StatisticsStrip vm=vm />
                <PriceCharts vm=vm />
                <FiltersPanel vm=vm />
                <Toolbar vm=vm />
                <PriceRowsTable vm=vm />
            </Show>

            <Show when=move || vm.detail.with(|d| d.is_some())>
                <ContractDetailModal vm=vm />
            </Show>
            <Show when=move || vm.report.with(|r| r.is_some())>
                <QuotationReportModal vm=vm />
            </Show>
        </div>
    }
}
