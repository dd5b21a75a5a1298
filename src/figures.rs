// TMPRED: Per-Flow Traffic Matrix Prediction on Backbone Topologies
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Catalogue of the comparison figures, and rendering to PNG (plotters) or HTML (plotly).
//!
//! Every figure compares a fixed group of model variants. Each variant is a column of a metric
//! table, drawn either as an empirical CDF or as a scatter over the flow index.

use std::path::Path;

use clap::ValueEnum;
use plotters::prelude::*;
use plotters::style::Color as _;
use serde::Serialize;

use tmpred_utils::cdf;

use crate::records::{self, MetricTable};

/// Kind of metric plotted.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    /// CDF of the per-snapshot RMSE.
    #[strum(serialize = "RMSE")]
    Rmse,
    /// CDF of the per-snapshot MAE.
    #[strum(serialize = "MAE")]
    Mae,
    /// Per-flow prediction bias, flows ordered by decreasing mean.
    #[strum(serialize = "Bias")]
    Bias,
    /// CDF of the bias in maximum link utilization after routing on the predicted matrix.
    #[strum(serialize = "MLU_bias")]
    MluBias,
}

impl PlotKind {
    /// File name of the metric table drawn by this kind. `scenario` is only used for
    /// [`PlotKind::MluBias`] and is the routing scenario as named in the results, e.g.,
    /// `SDN_split`.
    pub fn input_file(self, topology: &str, scenario: &str) -> String {
        match self {
            Self::Rmse => records::RMSE_FILE.to_string(),
            Self::Mae => records::MAE_FILE.to_string(),
            Self::Bias => records::BIAS_FILE.to_string(),
            Self::MluBias => format!("{scenario}_MLU_bias_{topology}.csv"),
        }
    }
}

/// Output format of the rendered figures.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    Png,
    Html,
    Both,
}

/// Routing scenario in which the MLU bias was measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum RoutingScenario {
    /// Multi-commodity flow routing (`SDN_split`).
    #[strum(serialize = "MCF")]
    Mcf,
    /// Hybrid routing (`hybrid`).
    #[strum(serialize = "SOTE")]
    Sote,
    #[strum(serialize = "OSPF")]
    Ospf,
}

impl RoutingScenario {
    /// Scenario named as in the result file names. Unknown names fall back to OSPF.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SDN_split" => Self::Mcf,
            "hybrid" => Self::Sote,
            _ => Self::Ospf,
        }
    }

    /// Default x ranges of the MLU bias figures of the TM, the OD, and the KEC groups.
    pub fn default_x_ranges(self) -> [Option<(f64, f64)>; 3] {
        match self {
            Self::Mcf => [Some((0.0, 0.8)); 3],
            Self::Sote => [Some((-0.35, 0.6)), Some((-0.35, 0.8)), Some((-0.35, 0.8))],
            Self::Ospf => [Some((-0.3, 1.0)); 3],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Orange,
    Green,
    DeepSkyBlue,
    Coral,
    Purple,
    Gold,
}

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red => (255, 0, 0),
            Self::Blue => (0, 0, 255),
            Self::Orange => (255, 165, 0),
            Self::Green => (0, 128, 0),
            Self::DeepSkyBlue => (0, 191, 255),
            Self::Coral => (255, 127, 80),
            Self::Purple => (128, 0, 128),
            Self::Gold => (255, 215, 0),
        }
    }

    fn plotters(self) -> RGBColor {
        let (r, g, b) = self.rgb();
        RGBColor(r, g, b)
    }

    fn plotly(self) -> plotly::color::Rgb {
        let (r, g, b) = self.rgb();
        plotly::color::Rgb::new(r, g, b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
    Star,
    Plus,
    TriangleUp,
    Diamond,
    TriangleLeft,
}

/// Group of variants compared in one figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum Group {
    /// Models predicting the whole traffic matrix at once.
    #[strum(serialize = "TM")]
    Tm,
    /// Models predicting each OD flow, compared to whole-matrix models.
    #[strum(serialize = "OD")]
    Od,
    /// LSTM with key element correlation at different shares of flows.
    #[strum(serialize = "LSTM-EKM-KEC")]
    LstmEkmKec,
    /// GRU with key element correlation at different shares of flows.
    #[strum(serialize = "GRU-EKM-KEC")]
    GruEkmKec,
}

/// Style of a variant drawn as a CDF.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineVariant {
    pub column: &'static str,
    pub color: Color,
    pub style: LineStyle,
    pub width: f64,
}

/// Style of a variant drawn as a scatter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterVariant {
    pub column: &'static str,
    pub color: Color,
    pub marker: Marker,
}

const THIN: f64 = 1.5;
const THICK: f64 = 2.5;

fn line(column: &'static str, color: Color, style: LineStyle, width: f64) -> LineVariant {
    LineVariant {
        column,
        color,
        style,
        width,
    }
}

fn scatter(column: &'static str, color: Color, marker: Marker) -> ScatterVariant {
    ScatterVariant {
        column,
        color,
        marker,
    }
}

impl Group {
    /// Variants of this group with their CDF line style, in legend order.
    pub fn line_variants(self) -> Vec<LineVariant> {
        use self::Color::*;
        use LineStyle::*;
        match self {
            Self::Tm => vec![
                line("LSTM", Red, Solid, THIN),
                line("GRU", Blue, Dashed, THIN),
                line("CNN_LSTM", Orange, DashDot, THIN),
                line("TCN", Green, Dotted, THIN),
            ],
            Self::Od => vec![
                line("LSTM", DeepSkyBlue, Solid, THIN),
                line("GRU", Blue, Dashed, THIN),
                line("DBN", Green, DashDot, THIN),
                line("LSTM_OD_pair", Orange, Dotted, THICK),
                line("GRU_OD_pair", Coral, DashDot, THICK),
                line("LSTM-EKM_OD_pair", Red, Dashed, THICK),
                line("GRU-EKM_OD_pair", Purple, Solid, THICK),
            ],
            Self::LstmEkmKec => vec![
                line("LSTM", DeepSkyBlue, Solid, THIN),
                line("LSTM_OD_pair", Red, DashDot, THIN),
                line("LSTM-EKM_OD_pair", Blue, Dashed, THIN),
                line("LSTM_EKM_KEC_10", Orange, Dotted, THIN),
                line("LSTM_EKM_KEC_20", Green, Solid, THICK),
                line("LSTM_EKM_KEC_40", Purple, Dashed, THICK),
                line("LSTM_EKM_KEC_78", Coral, DashDot, THICK),
            ],
            Self::GruEkmKec => vec![
                line("GRU", DeepSkyBlue, Solid, THIN),
                line("GRU_OD_pair", Red, DashDot, THIN),
                line("GRU-EKM_OD_pair", Blue, Dashed, THIN),
                line("GRU_EKM_KEC_10", Orange, Dotted, THIN),
                line("GRU_EKM_KEC_20", Green, Solid, THICK),
                line("GRU_EKM_KEC_40", Purple, Dashed, THICK),
                line("GRU_EKM_KEC_78", Coral, DashDot, THICK),
            ],
        }
    }

    /// Variants of this group with their scatter marker, in legend order.
    pub fn scatter_variants(self) -> Vec<ScatterVariant> {
        use self::Color::*;
        use Marker as M;
        match self {
            Self::Tm => vec![
                scatter("LSTM", Red, M::Circle),
                scatter("GRU", Blue, M::Cross),
                scatter("CNN_LSTM", Orange, M::Star),
                scatter("TCN", Green, M::Plus),
            ],
            Self::Od => vec![
                scatter("LSTM", Red, M::Circle),
                scatter("GRU", Blue, M::Cross),
                scatter("DBN", Orange, M::Star),
                scatter("LSTM_OD_pair", Green, M::Plus),
                scatter("GRU_OD_pair", Purple, M::TriangleUp),
                scatter("LSTM-EKM_OD_pair", Coral, M::Diamond),
                scatter("GRU-EKM_OD_pair", Gold, M::TriangleLeft),
            ],
            Self::LstmEkmKec => vec![
                scatter("LSTM", DeepSkyBlue, M::Circle),
                scatter("LSTM_OD_pair", Red, M::TriangleLeft),
                scatter("LSTM-EKM_OD_pair", Blue, M::Cross),
                scatter("LSTM_EKM_KEC_10", Orange, M::Star),
                scatter("LSTM_EKM_KEC_20", Green, M::Plus),
                scatter("LSTM_EKM_KEC_40", Purple, M::TriangleUp),
                scatter("LSTM_EKM_KEC_78", Coral, M::Diamond),
            ],
            Self::GruEkmKec => vec![
                scatter("GRU", DeepSkyBlue, M::Circle),
                scatter("GRU_OD_pair", Red, M::TriangleLeft),
                scatter("GRU-EKM_OD_pair", Blue, M::Cross),
                scatter("GRU_EKM_KEC_10", Orange, M::Star),
                scatter("GRU_EKM_KEC_20", Green, M::Plus),
                scatter("GRU_EKM_KEC_40", Purple, M::TriangleUp),
                scatter("GRU_EKM_KEC_78", Coral, M::Diamond),
            ],
        }
    }
}

/// Legend name of a result column, e.g., `GRU_EKM_KEC_20` becomes `GRU-EKM-KEC-10%`.
pub fn display_name(column: &str) -> String {
    match column {
        "CNN_LSTM" => return "LRCN".to_string(),
        "LSTM" | "GRU" => return format!("{column}-TM"),
        "DBN" => return "DBN-OD".to_string(),
        _ => {}
    }
    for (suffix, share) in [("10", 5), ("20", 10), ("40", 20), ("78", 30)] {
        if let Some(model) = column.strip_suffix(&format!("_EKM_KEC_{suffix}")) {
            return format!("{model}-EKM-KEC-{share}%");
        }
    }
    if column.contains("_OD_pair") {
        let model = column.split('_').next().unwrap_or(column);
        return format!("{model}-OD");
    }
    column.to_string()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceKind {
    Line { style: LineStyle, width: f64 },
    Markers { marker: Marker },
}

/// One named series of points.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub name: String,
    pub color: Color,
    pub kind: TraceKind,
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPosition {
    LowerRight,
    UpperRight,
}

/// A figure ready to be rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// File name without extension.
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    /// Use scientific notation for the ticks of the value axis.
    pub scientific: bool,
    pub legend: LegendPosition,
    pub traces: Vec<Trace>,
}

impl Figure {
    fn data_range(&self, axis: impl Fn(&(f64, f64)) -> f64) -> (f64, f64) {
        let (lo, hi) = self
            .traces
            .iter()
            .flat_map(|t| t.points.iter().map(&axis))
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            (0.0, 1.0)
        } else if lo == hi {
            (lo - 0.5, hi + 0.5)
        } else {
            let pad = (hi - lo) * 0.02;
            (lo - pad, hi + pad)
        }
    }

    pub fn x_bounds(&self) -> (f64, f64) {
        self.x_range.unwrap_or_else(|| self.data_range(|p| p.0))
    }

    pub fn y_bounds(&self) -> (f64, f64) {
        self.y_range.unwrap_or_else(|| self.data_range(|p| p.1))
    }
}

/// Build a CDF figure of `group` from `table`. Values are divided by `scale`. Variants missing
/// from the table are skipped.
pub fn cdf_figure(
    table: &MetricTable,
    group: Group,
    scale: f64,
    name: String,
    x_label: &str,
    x_range: Option<(f64, f64)>,
) -> Figure {
    let traces = group
        .line_variants()
        .into_iter()
        .filter_map(|v| {
            let Some(values) = table.column(v.column) else {
                log::warn!("Skipping {} in {name}: no such column", v.column);
                return None;
            };
            let scaled: Vec<f64> = values.iter().map(|x| x / scale).collect();
            Some(Trace {
                name: display_name(v.column),
                color: v.color,
                kind: TraceKind::Line {
                    style: v.style,
                    width: v.width,
                },
                points: cdf::build(&scaled),
            })
        })
        .collect();

    Figure {
        name,
        x_label: x_label.to_string(),
        y_label: "CDF".to_string(),
        x_range,
        y_range: Some((0.0, 1.0)),
        scientific: scale != 1.0,
        legend: LegendPosition::LowerRight,
        traces,
    }
}

/// Build a scatter figure of `group` from `table`, one point per row, at the row index.
pub fn scatter_figure(
    table: &MetricTable,
    group: Group,
    scale: f64,
    name: String,
    y_label: &str,
    x_range: Option<(f64, f64)>,
) -> Figure {
    let traces = group
        .scatter_variants()
        .into_iter()
        .filter_map(|v| {
            let Some(values) = table.column(v.column) else {
                log::warn!("Skipping {} in {name}: no such column", v.column);
                return None;
            };
            Some(Trace {
                name: display_name(v.column),
                color: v.color,
                kind: TraceKind::Markers { marker: v.marker },
                points: values
                    .iter()
                    .enumerate()
                    .map(|(i, x)| (i as f64, x / scale))
                    .collect(),
            })
        })
        .collect();

    Figure {
        name,
        x_label: "Flow ID, From Largest to Smallest in Mean".to_string(),
        y_label: y_label.to_string(),
        x_range,
        y_range: None,
        scientific: true,
        legend: LegendPosition::UpperRight,
        traces,
    }
}

/// Flow index range shown in the bias figures.
pub const BIAS_X_RANGE: (f64, f64) = (0.0, 169.0);

/// Build all figures of `kind` for `topology`.
///
/// `scenario` and `x_ranges` are only used for [`PlotKind::MluBias`]: the ranges apply to the
/// TM, the OD, and both KEC figures (in this order).
pub fn figures_for(
    kind: PlotKind,
    table: &MetricTable,
    topology: &str,
    scenario: RoutingScenario,
    x_ranges: [Option<(f64, f64)>; 3],
) -> Vec<Figure> {
    match kind {
        PlotKind::Rmse | PlotKind::Mae => [Group::Tm, Group::Od, Group::GruEkmKec]
            .into_iter()
            .map(|group| {
                cdf_figure(
                    table,
                    group,
                    1000.0,
                    format!("{kind}_{group}_{topology}"),
                    &format!("{kind}(Mbps)"),
                    None,
                )
            })
            .collect(),
        PlotKind::Bias => [Group::Tm, Group::Od, Group::GruEkmKec]
            .into_iter()
            .map(|group| {
                scatter_figure(
                    table,
                    group,
                    1000.0,
                    format!("{kind}_{group}_{topology}"),
                    "Bias(Mbps)",
                    Some(BIAS_X_RANGE),
                )
            })
            .collect(),
        PlotKind::MluBias => [
            (Group::Tm, x_ranges[0]),
            (Group::Od, x_ranges[1]),
            (Group::LstmEkmKec, x_ranges[2]),
            (Group::GruEkmKec, x_ranges[2]),
        ]
        .into_iter()
        .map(|(group, x_range)| {
            cdf_figure(
                table,
                group,
                1.0,
                format!("{scenario}_{kind}_{group}_{topology}"),
                "Bias of Maximum Link Utilization",
                x_range,
            )
        })
        .collect(),
    }
}

/// Tick label, in scientific notation outside of `[0.1, 100)` if `scientific` is set.
pub fn tick_label(v: f64, scientific: bool) -> String {
    if scientific && v != 0.0 && !(0.1..100.0).contains(&v.abs()) {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}

fn render_error(e: impl std::fmt::Display) -> FigureError {
    FigureError::Render(e.to_string())
}

/// Render `figure` as an 800x600 PNG image at `path`.
pub fn render_png(figure: &Figure, path: impl AsRef<Path>) -> Result<(), FigureError> {
    let path = path.as_ref();
    log::debug!("Plotting {path:?}");

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let (x0, x1) = figure.x_bounds();
    let (y0, y1) = figure.y_bounds();
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_error)?;

    // the value axis is x for CDFs and y for scatters
    let sci_x = figure.scientific && figure.y_range == Some((0.0, 1.0));
    let sci_y = figure.scientific && !sci_x;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_label_formatter(&|x| tick_label(*x, sci_x))
        .y_label_formatter(&|y| tick_label(*y, sci_y))
        .draw()
        .map_err(render_error)?;

    for trace in figure.traces.iter() {
        let color = trace.color.plotters();
        let points = trace.points.iter().copied();
        match trace.kind {
            TraceKind::Line { style, width } => {
                let stroke = color.stroke_width(width.round() as u32);
                let anno = match style {
                    LineStyle::Solid => chart.draw_series(LineSeries::new(points, stroke)),
                    LineStyle::Dashed => {
                        chart.draw_series(DashedLineSeries::new(points, 8, 5, stroke))
                    }
                    LineStyle::DashDot => {
                        chart.draw_series(DashedLineSeries::new(points, 12, 4, stroke))
                    }
                    LineStyle::Dotted => {
                        chart.draw_series(DashedLineSeries::new(points, 2, 4, stroke))
                    }
                }
                .map_err(render_error)?;
                anno.label(trace.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
            }
            TraceKind::Markers { marker } => {
                let filled = color.filled();
                let stroke = color.stroke_width(1);
                let anno = match marker {
                    Marker::Circle | Marker::Diamond => chart
                        .draw_series(points.map(|p| Circle::new(p, 3, filled)))
                        .map_err(render_error)?,
                    Marker::Cross | Marker::Star | Marker::Plus => chart
                        .draw_series(points.map(|p| Cross::new(p, 3, stroke)))
                        .map_err(render_error)?,
                    Marker::TriangleUp | Marker::TriangleLeft => chart
                        .draw_series(points.map(|p| TriangleMarker::new(p, 4, filled)))
                        .map_err(render_error)?,
                };
                anno.label(trace.name.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 3, filled));
            }
        }
    }

    chart
        .configure_series_labels()
        .position(match figure.legend {
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        })
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

/// Render `figure` as an interactive HTML page at `path`.
pub fn render_html(figure: &Figure, path: impl AsRef<Path>) {
    use plotly::{
        common::{DashType, Line, Mode, Title},
        layout::{Axis, Layout},
        Scatter,
    };

    let path = path.as_ref();
    log::debug!("Plotting {path:?}");

    let mut plot = plotly::Plot::new();
    for trace in figure.traces.iter() {
        let (xs, ys): (Vec<f64>, Vec<f64>) = trace.points.iter().copied().unzip();
        let scatter = match trace.kind {
            TraceKind::Line { style, width } => Scatter::new(xs, ys).mode(Mode::Lines).line(
                Line::new()
                    .color(trace.color.plotly())
                    .width(width)
                    .dash(match style {
                        LineStyle::Solid => DashType::Solid,
                        LineStyle::Dashed => DashType::Dash,
                        LineStyle::DashDot => DashType::DashDot,
                        LineStyle::Dotted => DashType::Dot,
                    }),
            ),
            TraceKind::Markers { marker } => Scatter::new(xs, ys).mode(Mode::Markers).marker(
                plotly::common::Marker::new()
                    .color(trace.color.plotly())
                    .size(6)
                    .symbol(plotly_symbol(marker)),
            ),
        };
        plot.add_trace(scatter.name(trace.name.as_str()));
    }

    let (x0, x1) = figure.x_bounds();
    let (y0, y1) = figure.y_bounds();
    plot.set_layout(
        Layout::new()
            .x_axis(
                Axis::new()
                    .title(Title::with_text(figure.x_label.as_str()))
                    .range(vec![x0, x1]),
            )
            .y_axis(
                Axis::new()
                    .title(Title::with_text(figure.y_label.as_str()))
                    .range(vec![y0, y1]),
            ),
    );
    plot.write_html(path);
}

fn plotly_symbol(marker: Marker) -> plotly::common::MarkerSymbol {
    use plotly::common::MarkerSymbol;
    match marker {
        Marker::Circle => MarkerSymbol::Circle,
        Marker::Cross => MarkerSymbol::X,
        Marker::Star => MarkerSymbol::Star,
        Marker::Plus => MarkerSymbol::Cross,
        Marker::TriangleUp => MarkerSymbol::TriangleUp,
        Marker::Diamond => MarkerSymbol::Diamond,
        Marker::TriangleLeft => MarkerSymbol::TriangleLeft,
    }
}

/// Render `figure` into `dir` in the requested `format`.
pub fn render(figure: &Figure, dir: impl AsRef<Path>, format: Format) -> Result<(), FigureError> {
    let dir = dir.as_ref();
    if matches!(format, Format::Png | Format::Both) {
        render_png(figure, dir.join(format!("{}.png", figure.name)))?;
    }
    if matches!(format, Format::Html | Format::Both) {
        render_html(figure, dir.join(format!("{}.html", figure.name)));
    }
    Ok(())
}

/// Error type for rendering figures.
#[derive(Debug, thiserror::Error)]
pub enum FigureError {
    #[error("Cannot render the figure: {0}")]
    Render(String),
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    fn table() -> MetricTable {
        let mut table = MetricTable::default();
        table.upsert("LSTM", vec![1000.0, 2000.0, 2000.0, 4000.0]);
        table.upsert("GRU", vec![500.0, 1500.0]);
        table
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("CNN_LSTM"), "LRCN");
        assert_eq!(display_name("LSTM"), "LSTM-TM");
        assert_eq!(display_name("GRU"), "GRU-TM");
        assert_eq!(display_name("DBN"), "DBN-OD");
        assert_eq!(display_name("TCN"), "TCN");
        assert_eq!(display_name("LSTM_OD_pair"), "LSTM-OD");
        assert_eq!(display_name("GRU-EKM_OD_pair"), "GRU-EKM-OD");
        assert_eq!(display_name("GRU_EKM_KEC_10"), "GRU-EKM-KEC-5%");
        assert_eq!(display_name("GRU_EKM_KEC_20"), "GRU-EKM-KEC-10%");
        assert_eq!(display_name("LSTM_EKM_KEC_40"), "LSTM-EKM-KEC-20%");
        assert_eq!(display_name("LSTM_EKM_KEC_78"), "LSTM-EKM-KEC-30%");
    }

    #[test]
    fn groups_are_consistent() {
        for group in Group::iter() {
            let lines = group.line_variants();
            let scatters = group.scatter_variants();
            assert_eq!(lines.len(), scatters.len());
            for (l, s) in lines.iter().zip(scatters.iter()) {
                assert_eq!(l.column, s.column);
            }
        }
    }

    #[test]
    fn cdf_traces() {
        let fig = cdf_figure(
            &table(),
            Group::Tm,
            1000.0,
            "RMSE_TM_Abilene".to_string(),
            "RMSE(Mbps)",
            None,
        );
        // CNN_LSTM and TCN are missing
        assert_eq!(fig.traces.len(), 2);
        assert_eq!(fig.traces[0].name, "LSTM-TM");
        assert_eq!(fig.traces[0].points, vec![(1.0, 0.25), (2.0, 0.75), (4.0, 1.0)]);
        assert_eq!(fig.traces[1].color, Color::Blue);
        assert_eq!(fig.y_bounds(), (0.0, 1.0));
        let (x0, x1) = fig.x_bounds();
        assert!(x0 < 0.5 && x1 > 4.0);
    }

    #[test]
    fn scatter_traces() {
        let fig = scatter_figure(
            &table(),
            Group::Tm,
            1000.0,
            "Bias_TM_Abilene".to_string(),
            "Bias(Mbps)",
            Some(BIAS_X_RANGE),
        );
        assert_eq!(fig.traces[1].points, vec![(0.0, 0.5), (1.0, 1.5)]);
        assert_eq!(fig.x_bounds(), (0.0, 169.0));
        assert_eq!(fig.legend, LegendPosition::UpperRight);
    }

    #[test]
    fn figure_names() {
        let names = |kind, scenario| {
            figures_for(kind, &table(), "CERNET", scenario, [None; 3])
                .into_iter()
                .map(|f| f.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(PlotKind::Rmse, RoutingScenario::Ospf),
            vec!["RMSE_TM_CERNET", "RMSE_OD_CERNET", "RMSE_GRU-EKM-KEC_CERNET"]
        );
        assert_eq!(
            names(PlotKind::Bias, RoutingScenario::Ospf),
            vec!["Bias_TM_CERNET", "Bias_OD_CERNET", "Bias_GRU-EKM-KEC_CERNET"]
        );
        assert_eq!(
            names(PlotKind::MluBias, RoutingScenario::from_name("SDN_split")),
            vec![
                "MCF_MLU_bias_TM_CERNET",
                "MCF_MLU_bias_OD_CERNET",
                "MCF_MLU_bias_LSTM-EKM-KEC_CERNET",
                "MCF_MLU_bias_GRU-EKM-KEC_CERNET"
            ]
        );
        assert_eq!(
            PlotKind::MluBias.input_file("CERNET", "SDN_split"),
            "SDN_split_MLU_bias_CERNET.csv"
        );
        assert_eq!(PlotKind::Bias.input_file("CERNET", "OSPF"), "bias_OD_result.csv");
        assert_eq!(RoutingScenario::from_name("hybrid"), RoutingScenario::Sote);
        assert_eq!(RoutingScenario::from_name("OSPF"), RoutingScenario::Ospf);
    }

    #[test]
    fn ticks() {
        assert_eq!(tick_label(0.5, true), "0.50");
        assert_eq!(tick_label(1500.0, true), "1.5e3");
        assert_eq!(tick_label(1500.0, false), "1500.00");
        assert_eq!(tick_label(0.0, true), "0.00");
    }

    #[test]
    fn every_kind_has_figures() {
        for kind in PlotKind::iter() {
            let figures =
                figures_for(kind, &table(), "Abilene", RoutingScenario::Ospf, [None; 3]);
            assert!(!figures.is_empty());
        }
    }
}
