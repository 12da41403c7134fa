//! Fridge temperature readings and history analysis

use fridge_protocol::TemperatureData;
use std::fmt;
use tracing::warn;

use crate::client::SensorBackend;
use crate::error::Result;
use crate::utils::format_hour;

/// Number of graduations on the chart's temperature axis
pub const Y_AXIS_TICKS: usize = 6;

/// Degrees added above the maximum and below the minimum of a chart
pub const CHART_MARGIN: f64 = 1.0;

/// What the dashboard shows for the current fridge temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FridgeTemperature {
    Reading(i64),
    /// The endpoint could not be reached
    NetworkError,
    /// The endpoint answered with something unusable
    DataError,
}

impl FridgeTemperature {
    pub fn is_reading(&self) -> bool {
        matches!(self, FridgeTemperature::Reading(_))
    }
}

impl fmt::Display for FridgeTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FridgeTemperature::Reading(celsius) => write!(f, "{}°C", celsius),
            FridgeTemperature::NetworkError => f.write_str("Network error"),
            FridgeTemperature::DataError => f.write_str("Data error"),
        }
    }
}

pub struct SensorService<'a, S: SensorBackend> {
    backend: &'a S,
}

impl<'a, S: SensorBackend> SensorService<'a, S> {
    pub fn new(backend: &'a S) -> Self {
        Self { backend }
    }

    /// Current temperature; failures become display states rather than errors
    pub async fn current(&self) -> FridgeTemperature {
        match self.backend.current_temperature().await {
            Ok(response) => FridgeTemperature::Reading(response.data.temperature),
            Err(e) if e.is_network_error() => {
                warn!(error = %e, "temperature endpoint unreachable");
                FridgeTemperature::NetworkError
            }
            Err(e) => {
                warn!(error = %e, "temperature endpoint returned unusable data");
                FridgeTemperature::DataError
            }
        }
    }

    pub async fn history(&self) -> Result<Vec<TemperatureData>> {
        self.backend.temperature_history().await
    }
}

/// Vertical scale of the temperature chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScale {
    pub min: f64,
    pub max: f64,
}

impl ChartScale {
    /// Scale covering `samples`; `None` when there is nothing to plot
    pub fn from_samples(samples: &[TemperatureData]) -> Option<Self> {
        let mut temperatures = samples.iter().map(|s| s.temperature);
        let first = temperatures.next()?;
        let (min, max) = temperatures.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(Self { min, max })
    }

    pub fn adjusted_min(&self) -> f64 {
        self.min - CHART_MARGIN
    }

    pub fn adjusted_max(&self) -> f64 {
        self.max + CHART_MARGIN
    }

    /// Never zero thanks to the margins
    pub fn adjusted_range(&self) -> f64 {
        self.adjusted_max() - self.adjusted_min()
    }

    /// Axis labels from top to bottom, truncated towards zero
    pub fn ticks(&self) -> [i64; Y_AXIS_TICKS] {
        let step = self.adjusted_range() / (Y_AXIS_TICKS - 1) as f64;
        let mut ticks = [0i64; Y_AXIS_TICKS];
        for (i, tick) in ticks.iter_mut().enumerate() {
            *tick = (self.adjusted_max() - step * i as f64).trunc() as i64;
        }
        ticks
    }

    /// Position of `temperature` within the scale, 0.0 at the bottom and 1.0 at the top
    pub fn position(&self, temperature: f64) -> f64 {
        ((temperature - self.adjusted_min()) / self.adjusted_range()).clamp(0.0, 1.0)
    }

    /// Row of `temperature` on a grid of `rows` rows, row 0 being the top
    pub fn row(&self, temperature: f64, rows: usize) -> usize {
        if rows <= 1 {
            return 0;
        }
        let from_bottom = (self.position(temperature) * (rows - 1) as f64).round() as usize;
        (rows - 1) - from_bottom
    }
}

/// Aggregate figures over a history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub samples: usize,
    pub latest: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub average_humidity: f64,
}

impl HistoryStats {
    pub fn from_samples(samples: &[TemperatureData]) -> Option<Self> {
        let scale = ChartScale::from_samples(samples)?;
        let count = samples.len() as f64;
        let latest = samples.last()?.temperature;

        Some(Self {
            samples: samples.len(),
            latest,
            average: samples.iter().map(|s| s.temperature).sum::<f64>() / count,
            min: scale.min,
            max: scale.max,
            average_humidity: samples.iter().map(|s| s.humidity as f64).sum::<f64>() / count,
        })
    }
}

/// Text grid of the temperature chart, ready to be printed line by line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartGrid {
    /// Plot rows, top first; each has a y-axis label column then one cell per sample
    pub rows: Vec<String>,
    /// Hour labels under the plot
    pub x_axis: String,
}

pub const POINT_GLYPH: char = '●';
const LINK_GLYPH: char = '│';
const CELL_WIDTH: usize = 6;
const AXIS_WIDTH: usize = 6;

impl ChartGrid {
    /// Lay out `samples` on `height` rows; `height` is rounded up so every tick gets its own row
    pub fn render(samples: &[TemperatureData], height: usize) -> Option<Self> {
        let scale = ChartScale::from_samples(samples)?;
        let height = tick_aligned_height(height);
        let tick_every = (height - 1) / (Y_AXIS_TICKS - 1);
        let ticks = scale.ticks();

        let points: Vec<usize> = samples
            .iter()
            .map(|s| scale.row(s.temperature, height))
            .collect();

        let mut rows = Vec::with_capacity(height);
        for row in 0..height {
            let label = if row % tick_every == 0 {
                format!("{:>4}°", ticks[row / tick_every])
            } else {
                String::new()
            };
            let mut line = format!("{:>width$}┤", label, width = AXIS_WIDTH - 1);

            for (index, &point_row) in points.iter().enumerate() {
                let glyph = if point_row == row {
                    POINT_GLYPH
                } else if index > 0 && between(row, points[index - 1], point_row) {
                    LINK_GLYPH
                } else {
                    ' '
                };
                line.push_str(&center(glyph, CELL_WIDTH));
            }
            rows.push(line.trim_end().to_string());
        }

        let mut x_axis = " ".repeat(AXIS_WIDTH);
        for sample in samples {
            x_axis.push_str(&format!("{:^width$}", format_hour(&sample.timestamp), width = CELL_WIDTH));
        }

        Some(Self {
            rows,
            x_axis: x_axis.trim_end().to_string(),
        })
    }
}

/// Smallest height >= `height` where ticks fall on whole rows
fn tick_aligned_height(height: usize) -> usize {
    let intervals = Y_AXIS_TICKS - 1;
    let height = height.max(Y_AXIS_TICKS);
    let per_tick = (height - 1).div_ceil(intervals);
    per_tick * intervals + 1
}

/// Strictly between the previous point's row and this point's row
fn between(row: usize, previous: usize, current: usize) -> bool {
    let (lo, hi) = if previous < current {
        (previous, current)
    } else {
        (current, previous)
    };
    row > lo && row < hi
}

fn center(glyph: char, width: usize) -> String {
    let left = (width - 1) / 2;
    format!("{}{}{}", " ".repeat(left), glyph, " ".repeat(width - 1 - left))
}
