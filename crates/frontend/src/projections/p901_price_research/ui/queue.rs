use contracts::projections::p901_price_research::queue::QUEUE_PREVIEW_LEN;
use leptos::prelude::*;
use thaw::*;

use super::view_model::PriceResearchVm;
use crate::shared::date_utils::truncate;
use crate::shared::icons::icon;

/// Pending searches; hidden while the queue is empty.
#[component]
pub fn SearchQueuePanel(vm: PriceResearchVm) -> impl IntoView {
    let chips = move || {
        vm.queue.with(|queue| {
            let hidden = queue.len().saturating_sub(QUEUE_PREVIEW_LEN);
            let chips = queue
                .iter()
                .take(QUEUE_PREVIEW_LEN)
                .map(|entry| {
                    let codigo = entry.codigo.clone();
                    view! {
                        <span class="queue__chip" title=entry.descricao.clone()>
                            {format!("{} - {}", entry.codigo, truncate(Some(entry.descricao.as_str()), 20))}
                            <button
                                class="queue__remove"
                                title="Remover da fila"
                                on:click=move |_| vm.remove_from_queue(&codigo)
                            >
                                {icon("x")}
                            </button>
                        </span>
                    }
                })
                .collect_view();
            let more = (hidden > 0)
                .then(|| view! { <span class="queue__more">{format!("+{} mais", hidden)}</span> });
            view! {
                {chips}
                {more}
            }
        })
    };

    view! {
        <Show when=move || vm.queue.with(|q| !q.is_empty())>
            <div class="queue">
                <div class="queue__header">
                    <span class="queue__title">
                        "Fila de pesquisa "
                        <span class="badge">{move || vm.queue.with(|q| q.len())}</span>
                    </span>
                    <Flex gap=FlexGap::Small>
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=Signal::derive(move || vm.loading.get())
                            on_click=move |_| vm.next_in_queue()
                        >
                            {icon("chevron-right")}
                            " Próximo"
                        </Button>
                        <Button appearance=ButtonAppearance::Subtle on_click=move |_| vm.clear_queue()>
                            {icon("trash")}
                            " Limpar"
                        </Button>
                    </Flex>
                </div>
                <div class="queue__list">{chips}</div>
            </div>
        </Show>
    }
}
