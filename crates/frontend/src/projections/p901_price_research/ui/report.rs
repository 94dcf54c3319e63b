//! Consolidated quotation over the selected rows.

use contracts::projections::p901_price_research::report::DocumentHeader;
use contracts::projections::p901_price_research::{QuotationReport, ReportStatistics, VariationLevel};
use leptos::prelude::*;
use thaw::*;

use super::view_model::PriceResearchVm;
use crate::shared::components::Modal;
use crate::shared::date_utils::truncate;
use crate::shared::icons::icon;
use crate::shared::number_format::{format_brl, format_count};

#[derive(Clone, Copy)]
enum HeaderField {
    Objeto,
    Justificativa,
    Responsavel,
    Setor,
    Observacoes,
}

impl HeaderField {
    fn label(self) -> &'static str {
        match self {
            HeaderField::Objeto => "Objeto",
            HeaderField::Justificativa => "Justificativa",
            HeaderField::Responsavel => "Responsável",
            HeaderField::Setor => "Setor",
            HeaderField::Observacoes => "Observações",
        }
    }

    fn value(self, header: &DocumentHeader) -> String {
        match self {
            HeaderField::Objeto => header.objeto.clone(),
            HeaderField::Justificativa => header.justificativa.clone(),
            HeaderField::Responsavel => header.responsavel.clone(),
            HeaderField::Setor => header.setor.clone(),
            HeaderField::Observacoes => header.observacoes.clone(),
        }
    }

    fn slot(self, header: &mut DocumentHeader) -> &mut String {
        match self {
            HeaderField::Objeto => &mut header.objeto,
            HeaderField::Justificativa => &mut header.justificativa,
            HeaderField::Responsavel => &mut header.responsavel,
            HeaderField::Setor => &mut header.setor,
            HeaderField::Observacoes => &mut header.observacoes,
        }
    }

    fn multiline(self) -> bool {
        matches!(self, HeaderField::Justificativa | HeaderField::Observacoes)
    }
}

#[component]
fn HeaderInput(vm: PriceResearchVm, field: HeaderField) -> impl IntoView {
    let value = move || {
        vm.report
            .with(|r| r.as_ref().map(|r| field.value(&r.header)).unwrap_or_default())
    };
    let on_input = move |ev: leptos::ev::Event| {
        let text = event_target_value(&ev);
        vm.update_report(|r| *field.slot(&mut r.header) = text);
    };
    let control = if field.multiline() {
        view! { <textarea rows="2" prop:value=value on:input=on_input></textarea> }.into_any()
    } else {
        view! { <input type="text" prop:value=value on:input=on_input /> }.into_any()
    };
    view! {
        <label class="report__field">
            <span>{field.label()}</span>
            {control}
        </label>
    }
}

fn stat_rows(s: &ReportStatistics) -> Vec<(&'static str, String)> {
    vec![
        ("Mínimo", format_brl(Some(s.minimo))),
        ("Q1", format_brl(Some(s.q1))),
        ("Mediana", format_brl(Some(s.mediana))),
        ("Média", format_brl(Some(s.media))),
        ("Q3", format_brl(Some(s.q3))),
        ("Máximo", format_brl(Some(s.maximo))),
        ("Desvio padrão", format_brl(Some(s.desvio))),
        ("CV", s.cv_label()),
    ]
}

#[component]
pub fn QuotationReportModal(vm: PriceResearchVm) -> impl IntoView {
    let item_field = move |f: fn(&QuotationReport) -> String| {
        move || vm.report.with(|r| r.as_ref().map(f).unwrap_or_default())
    };

    // Header edits leave these untouched, so the table keeps its inputs.
    let stats = Memo::new(move |_| vm.report.with(|r| r.as_ref().map(|r| r.statistics)));
    let report_lines = Memo::new(move |_| {
        vm.report
            .with(|r| r.as_ref().map(|r| r.lines.clone()).unwrap_or_default())
    });

    let statistics = move || {
        stats.get().map(|s| {
            let level = VariationLevel::from_cv(s.cv);
            view! {
                <div class="report__stats">
                    {stat_rows(&s)
                        .into_iter()
                        .map(|(label, value)| view! {
                            <div class="report__stat">
                                <span class="report__stat-label">{label}</span>
                                <span class="report__stat-value">{value}</span>
                            </div>
                        })
                        .collect_view()}
                    <span class=format!("badge {}", level.css_class())>{level.label()}</span>
                </div>
            }
        })
    };

    let lines = move || {
        report_lines
            .get()
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                view! {
                    <tr>
                        <td title=line.fornecedor.clone().unwrap_or_default()>
                            {truncate(line.fornecedor.as_deref(), 30)}
                        </td>
                        <td>{line.cnpj.clone().unwrap_or_else(|| "-".to_string())}</td>
                        <td class="table__cell--right">{format_brl(line.preco_unitario)}</td>
                        <td class="table__cell--right">
                            {line.quantidade.map(|q| q.to_string()).unwrap_or_else(|| "-".to_string())}
                        </td>
                        <td>{line.unidade.clone().unwrap_or_else(|| "-".to_string())}</td>
                        <td>
                            <input
                                type="text"
                                placeholder="Obs..."
                                prop:value=line.observacao.clone()
                                on:change=move |ev| {
                                    let text = event_target_value(&ev);
                                    vm.update_report(|r| r.set_observation(index, text));
                                }
                            />
                        </td>
                    </tr>
                }
            })
            .collect_view()
    };

    let count = move || report_lines.with(|l| l.len());

    view! {
        <Modal
            title="Relatório de Cotação"
            modal_class="report-modal"
            on_close=Callback::new(move |_| vm.close_report())
        >
            <section class="report__item">
                <label class="report__field">
                    <span>"Código"</span>
                    <input type="text" readonly prop:value=item_field(|r| r.item.codigo.clone()) />
                </label>
                <label class="report__field">
                    <span>"Catálogo"</span>
                    <input type="text" readonly prop:value=item_field(|r| r.item.tipo.clone()) />
                </label>
                <label class="report__field report__field--wide">
                    <span>"Descrição"</span>
                    <input
                        type="text"
                        prop:value=item_field(|r| r.item.descricao.clone())
                        on:input=move |ev| {
                            let text = event_target_value(&ev);
                            vm.update_report(|r| r.item.descricao = text);
                        }
                    />
                </label>
                <label class="report__field">
                    <span>"Unidade de medida"</span>
                    <input
                        type="text"
                        prop:value=item_field(|r| r.item.unidade.clone())
                        on:input=move |ev| {
                            let text = event_target_value(&ev);
                            vm.update_report(|r| r.item.unidade = text);
                        }
                    />
                </label>
            </section>

            <section class="report__header">
                {[
                    HeaderField::Objeto,
                    HeaderField::Justificativa,
                    HeaderField::Responsavel,
                    HeaderField::Setor,
                    HeaderField::Observacoes,
                ]
                    .into_iter()
                    .map(|field| view! { <HeaderInput vm=vm field=field /> })
                    .collect_view()}
            </section>

            {statistics}

            <h5 class="report__lines-title">
                {move || format!("Itens selecionados ({})", format_count(count()))}
            </h5>
            <div class="table-container">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Fornecedor"</th>
                            <th>"CNPJ"</th>
                            <th>"Preço Unit."</th>
                            <th>"Qtd"</th>
                            <th>"Unidade"</th>
                            <th>"Observação"</th>
                        </tr>
                    </thead>
                    <tbody>{lines}</tbody>
                </table>
            </div>

            <Flex justify=FlexJustify::End gap=FlexGap::Small class="report__actions">
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.export_quotation()>
                    {icon("download")}
                    " Exportar JSON"
                </Button>
                <Button appearance=ButtonAppearance::Secondary on_click=move |_| vm.print_report()>
                    {icon("file-text")}
                    " Imprimir"
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=Signal::derive(move || vm.saving.get())
                    on_click=move |_| vm.save_report()
                >
                    {move || if vm.saving.get() { "Salvando..." } else { "Salvar no projeto" }}
                </Button>
            </Flex>
        </Modal>
    }
}
