use contracts::projections::p901_price_research::search::{
    detail_entries, ContractDetailResponse, DetailEntry, DETAIL_UNAVAILABLE_MESSAGE,
};
use leptos::prelude::*;
use thaw::*;

use super::view_model::{DetailState, PriceResearchVm};
use crate::shared::components::Modal;
use crate::shared::number_format::format_brl;

fn render_sections(entries: Vec<DetailEntry>) -> impl IntoView {
    let mut sections: Vec<(&'static str, Vec<DetailEntry>)> = Vec::new();
    for entry in entries {
        match sections.last_mut() {
            Some((section, rows)) if *section == entry.section => rows.push(entry),
            _ => sections.push((entry.section, vec![entry])),
        }
    }
    sections
        .into_iter()
        .map(|(section, rows)| {
            view! {
                <h5 class="detail__section">{section}</h5>
                <dl class="detail__grid">
                    {rows
                        .into_iter()
                        .map(|row| view! {
                            <dt>{row.label}</dt>
                            <dd>{row.value}</dd>
                        })
                        .collect_view()}
                </dl>
            }
        })
        .collect_view()
}

/// Contract detail of the clicked row.
#[component]
pub fn ContractDetailModal(vm: PriceResearchVm) -> impl IntoView {
    let body = move || {
        let dialog = vm.detail.get()?;
        let content = match &dialog.state {
            DetailState::Loading => {
                view! { <div class="detail__loading"><Spinner /></div> }.into_any()
            }
            DetailState::Loaded(detail) => {
                render_sections(detail_entries(detail, &dialog.item, format_brl)).into_any()
            }
            DetailState::Failed => view! {
                <div class="warning-box">
                    <span class="warning-box__icon">"⚠"</span>
                    <span class="warning-box__text">{DETAIL_UNAVAILABLE_MESSAGE}</span>
                </div>
                {render_sections(detail_entries(
                    &ContractDetailResponse::default(),
                    &dialog.item,
                    format_brl,
                ))}
            }
            .into_any(),
        };
        let link = dialog
            .item
            .link_pncp
            .clone()
            .filter(|l| !l.is_empty())
            .map(|href| view! {
                <a class="detail__pncp" href=href target="_blank" rel="noopener">
                    "Ver no PNCP"
                </a>
            });
        Some(view! {
            {content}
            {link}
        })
    };

    view! {
        <Modal
            title="Detalhes da Contratação"
            on_close=Callback::new(move |_| vm.close_detail())
        >
            {body}
        </Modal>
    }
}
