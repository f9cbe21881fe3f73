//! Chart description built from a series snapshot
//!
//! [`render`] is a pure function of the samples it is given. The resulting
//! [`ChartDescription`] serializes to the `{data, layout}` figure shape that
//! Plotly.js draws directly, but nothing here depends on the renderer.

use crate::series::SeriesBuffer;
use crate::types::Sample;
use serde::{Deserialize, Serialize};

/// Chart title
pub const CHART_TITLE: &str = "Real-Time Data Stream";
/// X-axis title
pub const X_AXIS_TITLE: &str = "Time";
/// Y-axis title
pub const Y_AXIS_TITLE: &str = "Value";
/// Line colour of the series
pub const LINE_COLOR: &str = "#4b86b4";
/// Marker diameter in pixels
pub const MARKER_SIZE: u32 = 6;

/// Everything the front end needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartDescription {
    /// The series trace; `None` for a decoded figure without traces
    pub fn trace(&self) -> Option<&Trace> {
        self.data.first()
    }

    /// X-axis range
    pub fn x_range(&self) -> [u64; 2] {
        self.layout.xaxis.range.unwrap_or([0, 0])
    }
}

/// Point list with its style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Vec<u64>,
    pub y: Vec<f64>,
    pub mode: String,
    pub line: LineStyle,
    pub marker: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[u64; 2]>,
}

/// Plot margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            l: 40,
            r: 10,
            t: 40,
            b: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub margin: Margin,
    pub hovermode: String,
}

/// X-axis range covering `samples`, `[0, 0]` when there are none
fn x_range<'a>(mut samples: impl Iterator<Item = &'a Sample>) -> [u64; 2] {
    let Some(first) = samples.next() else {
        return [0, 0];
    };
    let last = samples.last().unwrap_or(first);
    // x never goes negative, so max(0, first.x) is first.x
    [first.x, last.x]
}

/// Build the chart description for a series
pub fn render(series: &SeriesBuffer) -> ChartDescription {
    render_samples(series.snapshot().iter())
}

/// Build the chart description for samples in insertion order
pub fn render_samples<'a>(samples: impl Iterator<Item = &'a Sample> + Clone) -> ChartDescription {
    let (x, y): (Vec<u64>, Vec<f64>) = samples.clone().map(|s| (s.x, s.y)).unzip();

    ChartDescription {
        data: vec![Trace {
            kind: "scatter".to_string(),
            x,
            y,
            mode: "lines+markers".to_string(),
            line: LineStyle {
                color: LINE_COLOR.to_string(),
            },
            marker: MarkerStyle { size: MARKER_SIZE },
        }],
        layout: Layout {
            title: Title::new(CHART_TITLE),
            xaxis: Axis {
                title: Title::new(X_AXIS_TITLE),
                range: Some(x_range(samples)),
            },
            yaxis: Axis {
                title: Title::new(Y_AXIS_TITLE),
                range: None,
            },
            margin: Margin::default(),
            hovermode: "closest".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_series() {
        let chart = render(&SeriesBuffer::default());

        assert_eq!(chart.x_range(), [0, 0]);
        assert!(chart.trace().unwrap().x.is_empty());
        assert!(chart.trace().unwrap().y.is_empty());
    }

    #[test]
    fn test_render_points_in_order() {
        let mut series = SeriesBuffer::new(3);
        for (x, y) in [(0, 1.0), (1, 2.0), (2, 1.5), (3, 0.5)] {
            series.append(Sample::new(x, y));
        }

        let chart = render(&series);
        assert_eq!(chart.trace().unwrap().x, vec![1, 2, 3]);
        assert_eq!(chart.trace().unwrap().y, vec![2.0, 1.5, 0.5]);
        assert_eq!(chart.x_range(), [1, 3]);
    }

    #[test]
    fn test_render_single_sample_range() {
        let mut series = SeriesBuffer::default();
        series.append(Sample::new(0, 3.3));

        assert_eq!(render(&series).x_range(), [0, 0]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut series = SeriesBuffer::default();
        series.append(Sample::new(0, 3.3));
        series.append(Sample::new(1, 4.1));

        assert_eq!(render(&series), render(&series));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_decoded_figure_without_traces() {
        let mut json = serde_json::to_value(render(&SeriesBuffer::default())).unwrap();
        json["data"] = serde_json::json!([]);

        let chart: ChartDescription = serde_json::from_value(json).unwrap();
        assert!(chart.trace().is_none());
        assert_eq!(chart.x_range(), [0, 0]);
    }

    #[test]
    fn test_figure_json_shape() {
        let mut series = SeriesBuffer::default();
        series.append(Sample::new(0, 1.25));

        let json = serde_json::to_value(render(&series)).unwrap();
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["mode"], "lines+markers");
        assert_eq!(json["data"][0]["line"]["color"], "#4b86b4");
        assert_eq!(json["data"][0]["marker"]["size"], 6);
        assert_eq!(json["layout"]["title"]["text"], "Real-Time Data Stream");
        assert_eq!(json["layout"]["xaxis"]["title"]["text"], "Time");
        assert_eq!(json["layout"]["xaxis"]["range"], serde_json::json!([0, 0]));
        assert_eq!(json["layout"]["yaxis"]["title"]["text"], "Value");
        assert!(json["layout"]["yaxis"].get("range").is_none());
        assert_eq!(
            json["layout"]["margin"],
            serde_json::json!({"l": 40, "r": 10, "t": 40, "b": 40})
        );
        assert_eq!(json["layout"]["hovermode"], "closest");
    }
}
