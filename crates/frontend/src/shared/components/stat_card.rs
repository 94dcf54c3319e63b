use leptos::prelude::*;

/// Summary tile used on the price statistics strip.
#[component]
pub fn StatCard(
    /// Label displayed above the value
    #[prop(into)]
    label: String,
    /// Already formatted value
    #[prop(into)]
    value: Signal<String>,
    /// Extra css modifier, e.g. `stat-card--accent`
    #[prop(optional, into)]
    variant: Option<String>,
    /// Optional subtitle below the value
    #[prop(optional, into)]
    subtitle: MaybeProp<String>,
) -> impl IntoView {
    let class = match variant {
        Some(v) => format!("stat-card {v}"),
        None => "stat-card".to_string(),
    };

    view! {
        <div class=class>
            <div class="stat-card__label">{label}</div>
            <div class="stat-card__value">{move || value.get()}</div>
            {move || subtitle.get().map(|s| view! { <div class="stat-card__subtitle">{s}</div> })}
        </div>
    }
}
