use std::ops::Range;
use std::path::Path;

use anyhow::{ensure, Result};
use ndarray::Array2;
use plotters::prelude::*;

use crate::table;

/// Output raster density and figure size. plotters carries no DPI metadata,
/// so the density is realized as pixel dimensions.
const DPI: u32 = 300;
const FIG_WIDTH_IN: u32 = 8;
const FIG_HEIGHT_IN: u32 = 6;

/// The discretisation schemes whose error tables the solver writes,
/// in the order they are plotted.
pub const SCHEMES: [Scheme; 5] =
    [Scheme::AdvX, Scheme::AdvY, Scheme::DifX, Scheme::DifY, Scheme::Pres];

/// A discretisation scheme with a saved `<name>.dat` error table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    AdvX,
    AdvY,
    DifX,
    DifY,
    Pres,
}

impl Scheme {
    pub fn to_str(&self) -> &'static str {
        match self {
            Scheme::AdvX => "advx",
            Scheme::AdvY => "advy",
            Scheme::DifX => "difx",
            Scheme::DifY => "dify",
            Scheme::Pres => "pres",
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            Scheme::AdvX => RED,
            Scheme::AdvY => BLUE,
            Scheme::DifX => GREEN,
            Scheme::DifY => MAGENTA,
            Scheme::Pres => CYAN,
        }
    }
}

/// Error norm columns of a scheme table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Norm {
    L2,
    Linf,
}

impl Norm {
    pub fn to_str(&self) -> &'static str {
        match self {
            Norm::L2 => "L2",
            Norm::Linf => "Linf",
        }
    }

    fn column(&self) -> usize {
        match self {
            Norm::L2 => 1,
            Norm::Linf => 2,
        }
    }
}

/// One labeled series of the convergence chart.
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub style: CurveStyle,
}

pub enum CurveStyle {
    /// The shared `x^-2` slope line.
    Reference,
    /// A measured error norm, drawn with the scheme's color and the
    /// norm's marker.
    Measured { scheme: Scheme, norm: Norm },
}

/// Loads every scheme table under `root`, in plot order. All tables are read
/// before any rendering starts so a missing file never leaves a partial
/// image behind.
pub fn load_runs(root: &Path) -> Result<Vec<(Scheme, Array2<f64>)>> {
    SCHEMES
        .iter()
        .map(|&scheme| {
            let path = root.join(format!("{}.dat", scheme.to_str()));
            let data = table::load_table(&path)?;
            ensure!(
                data.ncols() >= 3,
                "{}: expected at least 3 columns (resolution, L2, Linf), found {}",
                path.display(),
                data.ncols()
            );
            Ok((scheme, data))
        })
        .collect()
}

/// Builds the full curve set: one second-order reference slope evaluated at
/// the first scheme's resolutions, then an L2 and an Linf series per scheme.
pub fn build_curves(runs: &[(Scheme, Array2<f64>)]) -> Vec<Curve> {
    let mut curves = Vec::with_capacity(1 + 2 * runs.len());

    if let Some((_, first)) = runs.first() {
        let points = first.column(0).iter().map(|&n| (n, n.powi(-2))).collect();
        curves.push(Curve {
            label: "2nd order".to_string(),
            points,
            style: CurveStyle::Reference,
        });
    }

    for &(scheme, ref data) in runs {
        for norm in [Norm::L2, Norm::Linf] {
            let points = data
                .column(0)
                .iter()
                .zip(data.column(norm.column()).iter())
                .map(|(&x, &y)| (x, y))
                .collect();
            curves.push(Curve {
                label: format!("{} {}", scheme.to_str(), norm.to_str()),
                points,
                style: CurveStyle::Measured { scheme, norm },
            });
        }
    }

    curves
}

fn axis_ranges(curves: &[Curve]) -> Result<(Range<f64>, Range<f64>)> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for curve in curves {
        for &(x, y) in &curve.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    ensure!(x_min.is_finite() && y_min.is_finite(), "no data points to plot");
    ensure!(x_min > 0.0 && y_min > 0.0, "log axes need strictly positive data");
    // Pad both ends so markers at the extremes stay inside the frame.
    Ok((x_min * 0.8..x_max * 1.25, y_min * 0.8..y_max * 1.25))
}

/// Renders the curve set to a raster image at `output`.
pub fn render(curves: &[Curve], output: &Path) -> Result<()> {
    let (x_range, y_range) = axis_ranges(curves)?;
    let size = (FIG_WIDTH_IN * DPI, FIG_HEIGHT_IN * DPI);

    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Convergence", ("sans-serif", 60).into_font())
        .margin(40)
        .x_label_area_size(90)
        .y_label_area_size(120)
        .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())?;

    chart
        .configure_mesh()
        .x_desc("resolution")
        .y_desc("error")
        .label_style(("sans-serif", 32).into_font())
        .draw()?;

    for curve in curves {
        match curve.style {
            CurveStyle::Reference => {
                chart
                    .draw_series(LineSeries::new(
                        curve.points.iter().copied(),
                        BLACK.stroke_width(3),
                    ))?
                    .label(&curve.label)
                    .legend(|(x, y)| {
                        PathElement::new(vec![(x, y), (x + 30, y)], BLACK.stroke_width(3))
                    });
            }
            CurveStyle::Measured { scheme, norm } => {
                let color = scheme.color();
                chart
                    .draw_series(LineSeries::new(
                        curve.points.iter().copied(),
                        color.stroke_width(2),
                    ))?
                    .label(&curve.label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(2))
                    });
                match norm {
                    Norm::L2 => {
                        chart.draw_series(
                            curve
                                .points
                                .iter()
                                .map(|&(x, y)| Circle::new((x, y), 8, color.filled())),
                        )?;
                    }
                    Norm::Linf => {
                        chart.draw_series(
                            curve
                                .points
                                .iter()
                                .map(|&(x, y)| TriangleMarker::new((x, y), 9, color.filled())),
                        )?;
                    }
                }
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 32).into_font())
        .draw()?;

    root.present()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn synthetic_runs() -> Vec<(Scheme, Array2<f64>)> {
        SCHEMES
            .iter()
            .map(|&scheme| {
                let data = array![
                    [8.0, 1.5e-2, 3.0e-2],
                    [16.0, 3.8e-3, 7.5e-3],
                    [32.0, 9.4e-4, 1.9e-3],
                ];
                (scheme, data)
            })
            .collect()
    }

    #[test]
    fn scheme_names_match_table_files() {
        let names: Vec<_> = SCHEMES.iter().map(|s| s.to_str()).collect();
        assert_eq!(names, ["advx", "advy", "difx", "dify", "pres"]);
    }

    #[test]
    fn curve_set_has_one_reference_plus_two_per_scheme() {
        let curves = build_curves(&synthetic_runs());
        assert_eq!(curves.len(), 11);
        assert!(matches!(curves[0].style, CurveStyle::Reference));
        assert_eq!(curves[1].label, "advx L2");
        assert_eq!(curves[2].label, "advx Linf");
        assert_eq!(curves[10].label, "pres Linf");
    }

    #[test]
    fn reference_curve_is_inverse_square_of_resolution() {
        let curves = build_curves(&synthetic_runs());
        let reference = &curves[0];
        assert_eq!(reference.points.len(), 3);
        for &(x, y) in &reference.points {
            assert!((y - x.powi(-2)).abs() < 1e-15);
        }
        assert_eq!(reference.points[0].0, 8.0);
    }

    #[test]
    fn norm_curves_pair_resolution_with_their_column() {
        let curves = build_curves(&synthetic_runs());
        // advx L2 takes column 1, advx Linf takes column 2.
        assert_eq!(curves[1].points[1], (16.0, 3.8e-3));
        assert_eq!(curves[2].points[1], (16.0, 7.5e-3));
    }

    #[test]
    fn empty_run_list_builds_no_curves() {
        assert!(build_curves(&[]).is_empty());
    }

    #[test]
    fn axis_ranges_reject_non_positive_data() {
        let curves = vec![Curve {
            label: "zero".to_string(),
            points: vec![(8.0, 0.0)],
            style: CurveStyle::Reference,
        }];
        assert!(axis_ranges(&curves).is_err());
    }
}
