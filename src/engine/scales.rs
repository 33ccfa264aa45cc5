use std::collections::HashMap;
use std::f64::consts::PI;

use crate::config::LayoutConfig;
use crate::model::Topic;

use super::ranking::Ranking;

const POSITION_PADDING: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 || !span.is_finite() {
            return self.range.0;
        }

        let t = (value - self.domain.0) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Extends the domain outwards to multiples of a round tick step.
    pub fn nice(mut self, tick_hint: usize) -> Self {
        for _ in 0..2 {
            let Some(step) = tick_step(self.domain, tick_hint) else {
                return self;
            };
            let (low, high) = ordered(self.domain);
            let (low, high) = ((low / step).floor() * step, (high / step).ceil() * step);
            self.domain = if self.domain.0 <= self.domain.1 {
                (low, high)
            } else {
                (high, low)
            };
        }
        self
    }

    pub fn ticks(&self, tick_hint: usize) -> Vec<f64> {
        let Some(step) = tick_step(self.domain, tick_hint) else {
            return Vec::new();
        };
        let (low, high) = ordered(self.domain);
        let start = (low / step).ceil();
        let stop = (high / step).floor();

        let mut ticks = Vec::new();
        let mut index = start;
        while index <= stop {
            ticks.push(index * step);
            index += 1.0;
        }
        ticks
    }
}

fn ordered(domain: (f64, f64)) -> (f64, f64) {
    if domain.0 <= domain.1 {
        domain
    } else {
        (domain.1, domain.0)
    }
}

/// Power-of-ten step scaled by 1, 2 or 5 so that about `tick_hint` ticks cover the domain.
fn tick_step(domain: (f64, f64), tick_hint: usize) -> Option<f64> {
    let (low, high) = ordered(domain);
    let span = high - low;
    if !(span.is_finite() && span > 0.0) || tick_hint == 0 {
        return None;
    }

    let hint = tick_hint as f64;
    let mut step = 10f64.powf((span / hint).log10().floor());
    let error = hint / span * step;
    if error <= 0.15 {
        step *= 10.0;
    } else if error <= 0.35 {
        step *= 5.0;
    } else if error <= 0.75 {
        step *= 2.0;
    }
    Some(step)
}

/// Ordinal scale mapping each key to an evenly spaced band, with start offsets and band width
/// rounded to whole pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct BandScale {
    index: HashMap<String, usize>,
    starts: Vec<f64>,
    band: f64,
}

impl BandScale {
    pub fn rounded(keys: &[String], range: (f64, f64), padding: f64) -> Self {
        let count = keys.len();
        let index = keys
            .iter()
            .enumerate()
            .map(|(position, key)| (key.clone(), position))
            .collect::<HashMap<_, _>>();

        if count == 0 {
            return Self {
                index,
                starts: Vec::new(),
                band: 0.0,
            };
        }

        let (start, stop) = ordered(range);
        let slots = count as f64 - padding + 2.0 * padding;
        let step = ((stop - start) / slots).floor();
        let error = stop - start - (count as f64 - padding) * step;
        let first = start + (error / 2.0).round();

        Self {
            index,
            starts: (0..count).map(|slot| first + slot as f64 * step).collect(),
            band: (step * (1.0 - padding)).round(),
        }
    }

    pub fn position(&self, key: &str) -> Option<f64> {
        self.index
            .get(key)
            .and_then(|&slot| self.starts.get(slot))
            .copied()
    }

    pub fn band_width(&self) -> f64 {
        self.band
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.starts.len()
    }
}

/// Maps MDS coordinates to the scatter panel. The shorter data dimension is padded so one data
/// unit has the same length on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionScale {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl PositionScale {
    pub fn from_topics(topics: &[Topic], width: f64, height: f64) -> Self {
        let (x_low, x_high) = extent(topics.iter().map(|topic| topic.x));
        let (y_low, y_high) = extent(topics.iter().map(|topic| topic.y));
        let x_diff = x_high - x_low;
        let y_diff = y_high - y_low;

        let (x_domain, y_domain) = if x_diff > y_diff {
            let widen = 0.5 * (x_diff - y_diff);
            (
                (x_low - POSITION_PADDING * x_diff, x_high + POSITION_PADDING * x_diff),
                (
                    y_low - widen - POSITION_PADDING * x_diff,
                    y_high + widen + POSITION_PADDING * x_diff,
                ),
            )
        } else {
            let widen = 0.5 * (y_diff - x_diff);
            (
                (
                    x_low - widen - POSITION_PADDING * y_diff,
                    x_high + widen + POSITION_PADDING * y_diff,
                ),
                (y_low - POSITION_PADDING * y_diff, y_high + POSITION_PADDING * y_diff),
            )
        };

        Self {
            x: LinearScale::new(x_domain, (0.0, width)),
            y: LinearScale::new(y_domain, (height, 0.0)),
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x.apply(x), self.y.apply(y))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (low, high) = values
        .filter(|value| value.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
            (low.min(value), high.max(value))
        });

    if low > high { (0.0, 0.0) } else { (low, high) }
}

/// Circle radius whose area is `share * proportion` of the plot area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaRadiusScale {
    pub plot_area: f64,
    pub proportion: f64,
}

impl AreaRadiusScale {
    pub fn radius(&self, share: f64) -> f64 {
        if !share.is_finite() || share <= 0.0 {
            return 0.0;
        }
        (share * self.plot_area * self.proportion / PI).sqrt()
    }
}

/// Bar length and row band scales for one ranked slice.
#[derive(Clone, Debug, PartialEq)]
pub struct BarScales {
    pub length: LinearScale,
    pub rows: BandScale,
    pub ticks: Vec<f64>,
}

impl BarScales {
    pub fn for_ranking(ranking: &Ranking, config: &LayoutConfig) -> Self {
        let max_total = ranking.max_total().unwrap_or(1.0);
        let length = LinearScale::new((1.0, max_total), (0.0, config.bar_width)).nice(10);
        let rows = BandScale::rounded(
            &ranking.term_list(),
            (0.0, config.bar_height),
            config.band_padding,
        );
        let ticks = length.ticks(config.axis_ticks);

        Self {
            length,
            rows,
            ticks,
        }
    }

    pub fn width(&self, value: f64) -> f64 {
        if value.is_finite() {
            self.length.apply(value).max(0.0)
        } else {
            0.0
        }
    }
}
