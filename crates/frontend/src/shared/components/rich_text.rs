use contracts::shared::markup::{segments, Segment};
use leptos::prelude::*;

/// Renders `**bold**` and line breaks without interpreting HTML.
#[component]
pub fn RichText(#[prop(into)] text: String) -> impl IntoView {
    segments(&text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(t) => view! { <span>{t}</span> }.into_any(),
            Segment::Bold(t) => view! { <strong>{t}</strong> }.into_any(),
            Segment::LineBreak => view! { <br /> }.into_any(),
        })
        .collect_view()
}
