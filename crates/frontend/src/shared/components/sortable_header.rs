use contracts::projections::p901_price_research::table::{SortColumn, SortState};
use leptos::prelude::*;

/// Clickable `<th>` showing ▲/▼ on the active sort column.
#[component]
pub fn SortableHeader(
    column: SortColumn,
    #[prop(into)]
    sort: Signal<SortState>,
    on_sort: Callback<SortColumn>,
) -> impl IntoView {
    view! {
        <th
            class="table__sortable-header"
            class:table__sortable-header--active=move || sort.get().column == column
            on:click=move |_| on_sort.run(column)
        >
            {column.header()}
            <span class="table__sort-indicator">{move || sort.get().indicator(column)}</span>
        </th>
    }
}
