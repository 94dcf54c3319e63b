//! Series behind the price charts. Rendering lives in the frontend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dto::{PriceItem, PriceStatistics};

pub const DEFAULT_HISTOGRAM_BINS: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Bar heights relative to the tallest bar, in `0.0..=1.0`.
    pub fn ratios(&self) -> Vec<f64> {
        let max = self.max();
        self.values
            .iter()
            .map(|v| if max > 0.0 { v / max } else { 0.0 })
            .collect()
    }
}

/// Rótulo compacto do eixo do histograma
pub fn compact_label(value: f64) -> String {
    if value >= 1000.0 {
        format!("{:.1}k", value / 1000.0)
    } else if value >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Equal-width bins over `[min, max]`. Zero prices are ignored; the maximum
/// lands in the last bin.
pub fn histogram(items: &[&PriceItem], bins: usize) -> ChartSeries {
    let values: Vec<f64> = items
        .iter()
        .filter_map(|item| item.preco_unitario)
        .filter(|p| *p != 0.0 && !p.is_nan())
        .collect();
    if values.is_empty() || bins == 0 {
        return ChartSeries::default();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = match (max - min) / bins as f64 {
        w if w > 0.0 => w,
        _ => 1.0,
    };
    let mut counts = vec![0.0; bins];
    for v in &values {
        let index = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1.0;
    }
    ChartSeries {
        labels: (0..bins)
            .map(|i| compact_label(min + i as f64 * width))
            .collect(),
        values: counts,
    }
}

/// Preço médio por mês (`YYYY-MM`), em ordem cronológica
pub fn by_month(items: &[&PriceItem]) -> ChartSeries {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for item in items {
        if let Some(month) = item.month_key() {
            let entry = groups.entry(month).or_insert((0.0, 0));
            entry.0 += item.price();
            entry.1 += 1;
        }
    }
    ChartSeries {
        labels: groups.keys().map(|k| k.to_string()).collect(),
        values: groups.values().map(|(sum, n)| sum / *n as f64).collect(),
    }
}

/// Preço médio por UF, do menor para o maior
pub fn by_state(items: &[&PriceItem]) -> ChartSeries {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for item in items {
        let uf = item.estado.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A");
        let entry = groups.entry(uf).or_insert((0.0, 0));
        entry.0 += item.price();
        entry.1 += 1;
    }
    let mut rows: Vec<(&str, f64)> = groups
        .into_iter()
        .map(|(uf, (sum, n))| (uf, sum / n as f64))
        .collect();
    rows.sort_by(|a, b| a.1.total_cmp(&b.1));
    ChartSeries {
        labels: rows.iter().map(|(uf, _)| uf.to_string()).collect(),
        values: rows.iter().map(|(_, mean)| *mean).collect(),
    }
}

/// Green to red ramp used for the per-state bars.
pub fn ramp_color(index: usize, len: usize) -> String {
    let ratio = index as f64 / len.saturating_sub(1).max(1) as f64;
    if ratio < 0.5 {
        format!("rgb({}, 180, 80)", (255.0 * ratio * 2.0).round() as u8)
    } else {
        format!("rgb(255, {}, 80)", (180.0 * (1.0 - (ratio - 0.5) * 2.0)).round() as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxPlot {
    pub fn from_statistics(stats: &PriceStatistics) -> Option<Self> {
        Some(Self {
            min: stats.preco_minimo?,
            q1: stats.q1?,
            median: stats.preco_mediana?,
            q3: stats.q3?,
            max: stats.preco_maximo?,
        })
    }

    /// Position of `value` along the whisker span, in `0.0..=1.0`.
    pub fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(preco: f64, uf: &str, data: &str) -> PriceItem {
        PriceItem {
            preco_unitario: Some(preco),
            estado: (!uf.is_empty()).then(|| uf.to_string()),
            data_resultado: Some(data.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_histogram_bins_and_labels() {
        let items: Vec<PriceItem> = [0.0, 10.0, 16.0, 22.0]
            .iter()
            .map(|p| priced(*p, "SP", "2024-01-01"))
            .collect();
        let refs: Vec<&PriceItem> = items.iter().collect();
        let series = histogram(&refs, 3);
        // zero is dropped; min 10, max 22, width 4
        assert_eq!(series.labels, vec!["10.00", "14.00", "18.00"]);
        assert_eq!(series.values, vec![1.0, 1.0, 1.0]);
        assert_eq!(series.values.iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let items = [priced(1500.0, "SP", "2024-01-01")];
        let refs: Vec<&PriceItem> = items.iter().collect();
        let series = histogram(&refs, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(series.values[0], 1.0);
        assert_eq!(series.labels[0], "1.5k");
        assert_eq!(series.labels.len(), 12);
    }

    #[test]
    fn test_compact_label() {
        assert_eq!(compact_label(2500.0), "2.5k");
        assert_eq!(compact_label(150.4), "150");
        assert_eq!(compact_label(9.5), "9.50");
    }

    #[test]
    fn test_monthly_and_state_means() {
        let items = [
            priced(10.0, "SP", "2024-02-10"),
            priced(20.0, "SP", "2024-02-20"),
            priced(4.0, "", "2024-01-05"),
        ];
        let refs: Vec<&PriceItem> = items.iter().collect();
        let months = by_month(&refs);
        assert_eq!(months.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(months.values, vec![4.0, 15.0]);

        let states = by_state(&refs);
        assert_eq!(states.labels, vec!["N/A", "SP"]);
        assert_eq!(states.values, vec![4.0, 15.0]);
        assert_eq!(states.ratios(), vec![4.0 / 15.0, 1.0]);
    }

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ramp_color(0, 3), "rgb(0, 180, 80)");
        assert_eq!(ramp_color(2, 3), "rgb(255, 0, 80)");
        assert_eq!(ramp_color(0, 1), "rgb(0, 180, 80)");
    }

    #[test]
    fn test_boxplot_requires_all_quartiles() {
        let mut stats = PriceStatistics {
            preco_minimo: Some(1.0),
            q1: Some(2.0),
            preco_mediana: Some(3.0),
            q3: Some(4.0),
            preco_maximo: Some(5.0),
            ..Default::default()
        };
        let plot = BoxPlot::from_statistics(&stats).unwrap();
        assert_eq!(plot.position(3.0), 0.5);
        stats.q3 = None;
        assert!(BoxPlot::from_statistics(&stats).is_none());
    }
}
