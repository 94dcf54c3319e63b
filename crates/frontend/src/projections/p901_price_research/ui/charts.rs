//! Inline SVG charts over the visible items.

use contracts::projections::p901_price_research::charts::{
    by_month, by_state, histogram, ramp_color, BoxPlot, ChartSeries,
};
use leptos::prelude::*;

use super::view_model::PriceResearchVm;
use crate::shared::number_format::{format_brl, format_decimal};

const WIDTH: f64 = 100.0;
const HEIGHT: f64 = 60.0;
const BAR_GAP: f64 = 0.15;

#[derive(Clone, Copy, PartialEq)]
enum Palette {
    Primary,
    Ramp,
}

fn bar_fill(palette: Palette, index: usize, len: usize) -> String {
    match palette {
        Palette::Primary => "var(--chart-primary)".to_string(),
        Palette::Ramp => ramp_color(index, len),
    }
}

#[component]
fn BarChart(
    #[prop(into)] title: String,
    #[prop(into)] series: Signal<ChartSeries>,
    palette: Palette,
    /// Tooltip value format
    format_value: fn(f64) -> String,
) -> impl IntoView {
    let bars = move || {
        let series = series.get();
        let len = series.values.len();
        if len == 0 {
            return view! { <p class="chart__empty">"Sem dados"</p> }.into_any();
        }
        let slot = WIDTH / len as f64;
        let width = slot * (1.0 - BAR_GAP);
        let rects = series
            .ratios()
            .into_iter()
            .enumerate()
            .map(|(i, ratio)| {
                let height = ratio * HEIGHT;
                let tooltip = format!("{}: {}", series.labels[i], format_value(series.values[i]));
                view! {
                    <rect
                        x=format!("{:.3}", i as f64 * slot + slot * BAR_GAP / 2.0)
                        y=format!("{:.3}", HEIGHT - height)
                        width=format!("{:.3}", width)
                        height=format!("{:.3}", height)
                        fill=bar_fill(palette, i, len)
                    >
                        <title>{tooltip}</title>
                    </rect>
                }
            })
            .collect_view();
        let labels = series
            .labels
            .iter()
            .map(|label| view! { <span class="chart__label">{label.clone()}</span> })
            .collect_view();
        view! {
            <svg class="chart__svg" viewBox=format!("0 0 {} {}", WIDTH, HEIGHT) preserveAspectRatio="none">
                {rects}
            </svg>
            <div class="chart__labels">{labels}</div>
        }
        .into_any()
    };

    view! {
        <div class="chart">
            <h4 class="chart__title">{title}</h4>
            {bars}
        </div>
    }
}

#[component]
fn TimelineChart(#[prop(into)] series: Signal<ChartSeries>) -> impl IntoView {
    let body = move || {
        let series = series.get();
        let len = series.values.len();
        if len == 0 {
            return view! { <p class="chart__empty">"Sem dados"</p> }.into_any();
        }
        let step = if len > 1 { WIDTH / (len - 1) as f64 } else { 0.0 };
        let point = |i: usize, ratio: f64| {
            let x = if len > 1 { i as f64 * step } else { WIDTH / 2.0 };
            (x, HEIGHT - ratio * (HEIGHT - 4.0) - 2.0)
        };
        let ratios = series.ratios();
        let points = ratios
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let (x, y) = point(i, *r);
                format!("{:.3},{:.3}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ");
        let dots = ratios
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let (x, y) = point(i, *r);
                let tooltip = format!("{}: {}", series.labels[i], format_brl(Some(series.values[i])));
                view! {
                    <circle cx=format!("{:.3}", x) cy=format!("{:.3}", y) r="1.2" class="chart__dot">
                        <title>{tooltip}</title>
                    </circle>
                }
            })
            .collect_view();
        let first = series.labels.first().cloned().unwrap_or_default();
        let last = series.labels.last().cloned().unwrap_or_default();
        view! {
            <svg class="chart__svg" viewBox=format!("0 0 {} {}", WIDTH, HEIGHT) preserveAspectRatio="none">
                <polyline class="chart__line" points=points fill="none" />
                {dots}
            </svg>
            <div class="chart__labels chart__labels--ends">
                <span class="chart__label">{first}</span>
                <span class="chart__label">{last}</span>
            </div>
        }
        .into_any()
    };

    view! {
        <div class="chart">
            <h4 class="chart__title">"Preço médio por mês"</h4>
            {body}
        </div>
    }
}

/// Whiskers from min to max, box from Q1 to Q3, median mark.
#[component]
fn BoxPlotChart(#[prop(into)] plot: Signal<Option<BoxPlot>>) -> impl IntoView {
    let body = move || {
        let Some(p) = plot.get() else {
            return view! { <p class="chart__empty">"Sem dados"</p> }.into_any();
        };
        let x = |v: f64| format!("{:.3}", p.position(v) * WIDTH);
        let box_width = (p.position(p.q3) - p.position(p.q1)) * WIDTH;
        let lower_box = (p.position(p.median) - p.position(p.q1)) * WIDTH;
        view! {
            <svg class="chart__svg chart__svg--boxplot" viewBox="0 0 100 20" preserveAspectRatio="none">
                <line class="chart__whisker" x1=x(p.min) x2=x(p.q1) y1="10" y2="10" />
                <line class="chart__whisker" x1=x(p.q3) x2=x(p.max) y1="10" y2="10" />
                <line class="chart__whisker" x1=x(p.min) x2=x(p.min) y1="4" y2="16" />
                <line class="chart__whisker" x1=x(p.max) x2=x(p.max) y1="4" y2="16" />
                <rect x=x(p.q1) y="3" width=format!("{:.3}", lower_box) height="14" fill="var(--chart-primary)" />
                <rect
                    x=x(p.median)
                    y="3"
                    width=format!("{:.3}", (box_width - lower_box).max(0.0))
                    height="14"
                    fill="var(--chart-success)"
                />
                <line class="chart__median" x1=x(p.median) x2=x(p.median) y1="1" y2="19" />
            </svg>
            <div class="chart__labels chart__labels--ends">
                <span class="chart__label">{format_brl(Some(p.min))}</span>
                <span class="chart__label">{format!("Mediana {}", format_brl(Some(p.median)))}</span>
                <span class="chart__label">{format_brl(Some(p.max))}</span>
            </div>
        }
        .into_any()
    };

    view! {
        <div class="chart">
            <h4 class="chart__title">"Distribuição (box plot)"</h4>
            {body}
        </div>
    }
}

fn count_label(v: f64) -> String {
    format!("{} registros", format_decimal(v, 0, 0))
}

fn money_label(v: f64) -> String {
    format_brl(Some(v))
}

/// The four charts of the result panel. Series follow the outlier toggle.
#[component]
pub fn PriceCharts(vm: PriceResearchVm) -> impl IntoView {
    let bins = vm.histogram_bins;
    let histogram_series = Memo::new(move |_| {
        vm.table
            .with(|t| histogram(&t.result().items(t.include_outliers), bins))
    });
    let month_series = Memo::new(move |_| {
        vm.table.with(|t| by_month(&t.result().items(t.include_outliers)))
    });
    let state_series = Memo::new(move |_| {
        vm.table.with(|t| by_state(&t.result().items(t.include_outliers)))
    });
    let box_plot = Memo::new(move |_| {
        vm.table.with(|t| {
            t.result()
                .statistics(t.include_outliers)
                .and_then(BoxPlot::from_statistics)
        })
    });

    view! {
        <div class="charts-grid">
            <BarChart
                title="Distribuição de preços"
                series=histogram_series
                palette=Palette::Primary
                format_value=count_label
            />
            <BoxPlotChart plot=box_plot />
            <TimelineChart series=month_series />
            <BarChart
                title="Preço médio por UF"
                series=state_series
                palette=Palette::Ramp
                format_value=money_label
            />
        </div>
    }
}
