use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::Array2;
use ndarray_npy::read_npy;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};

/// Number of discrete color bands in a filled-contour panel.
const CONTOUR_BANDS: usize = 16;

/// Velocity components saved for one timestep.
#[derive(Debug)]
pub struct Snapshot {
    pub name: String,
    pub ux: Array2<f64>,
    pub uy: Array2<f64>,
}

impl Snapshot {
    /// Loads `ux.npy` and `uy.npy` from a timestep directory. Either file
    /// missing or unreadable is an error; nothing is skipped.
    pub fn load(dir: &Path) -> Result<Self> {
        let ux_path = dir.join("ux.npy");
        let uy_path = dir.join("uy.npy");
        let ux: Array2<f64> =
            read_npy(&ux_path).with_context(|| format!("reading {}", ux_path.display()))?;
        let uy: Array2<f64> =
            read_npy(&uy_path).with_context(|| format!("reading {}", uy_path.display()))?;
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Snapshot { name, ux, uy })
    }
}

/// Immediate subdirectories of `root`, sorted lexicographically by name.
/// Saved timesteps use zero-padded names, so string order is replay order.
pub fn discover_timesteps(root: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("listing {}", root.display()))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", root.display()))?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Renders a snapshot as two stacked filled-contour panels into an RGB byte
/// buffer of `width * height * 3` bytes.
pub fn render_frame(snapshot: &Snapshot, buf: &mut [u8], width: u32, height: u32) -> Result<()> {
    let root = BitMapBackend::with_buffer(buf, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (top, bottom) = root.split_vertically((height / 2) as i32);
    draw_panel(&top, &snapshot.ux)?;
    draw_panel(&bottom, &snapshot.uy)?;

    root.present()?;
    Ok(())
}

/// Draws one field as a band-quantized filled contour, centered in `area`
/// with the field's own aspect ratio (equal cell width and height).
fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, field: &Array2<f64>) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (nrows, ncols) = field.dim();
    let (area_w, area_h) = area.dim_in_pixel();

    let cell = (f64::from(area_w) / ncols as f64).min(f64::from(area_h) / nrows as f64);
    let plot_w = (cell * ncols as f64) as u32;
    let plot_h = (cell * nrows as f64) as u32;
    let pad_x = ((area_w - plot_w) / 2) as i32;
    let pad_y = ((area_h - plot_h) / 2) as i32;
    let area = area.margin(pad_y, pad_y, pad_x, pad_x);

    let mut chart =
        ChartBuilder::on(&area).build_cartesian_2d(0..ncols as i32, 0..nrows as i32)?;

    let (lo, hi) = value_range(field);
    chart.draw_series(field.indexed_iter().map(|((row, col), &value)| {
        Rectangle::new(
            [(col as i32, row as i32), (col as i32 + 1, row as i32 + 1)],
            band_color(value, lo, hi).filled(),
        )
    }))?;

    Ok(())
}

fn value_range(field: &Array2<f64>) -> (f64, f64) {
    field.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// Quantizes a value into one of the contour bands and returns the band's
/// color. A constant field maps to the middle band.
fn band_color(value: f64, lo: f64, hi: f64) -> RGBColor {
    let t = if hi > lo { (value - lo) / (hi - lo) } else { 0.5 };
    let band = ((t * CONTOUR_BANDS as f64) as usize).min(CONTOUR_BANDS - 1);
    ViridisRGB.get_color((band as f64 + 0.5) / CONTOUR_BANDS as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;
    use ndarray_npy::write_npy;
    use tempfile::TempDir;

    fn write_snapshot(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        let ux = Array::from_shape_fn((8, 12), |(r, c)| (r * c) as f64);
        let uy = Array::from_shape_fn((8, 12), |(r, c)| (r + c) as f64);
        write_npy(dir.join("ux.npy"), &ux).unwrap();
        write_npy(dir.join("uy.npy"), &uy).unwrap();
    }

    #[test]
    fn timesteps_sort_lexicographically_not_numerically() {
        let root = TempDir::new().unwrap();
        for name in ["010", "000", "001"] {
            fs::create_dir(root.path().join(name)).unwrap();
        }
        // A stray file must not show up as a timestep.
        fs::write(root.path().join("log.txt"), "x").unwrap();

        let dirs = discover_timesteps(root.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["000", "001", "010"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        assert!(discover_timesteps(&root.path().join("absent")).is_err());
    }

    #[test]
    fn snapshot_loads_both_components() {
        let root = TempDir::new().unwrap();
        let step = root.path().join("000");
        write_snapshot(&step);

        let snapshot = Snapshot::load(&step).unwrap();
        assert_eq!(snapshot.name, "000");
        assert_eq!(snapshot.ux.dim(), (8, 12));
        assert_eq!(snapshot.uy[[2, 3]], 5.0);
    }

    #[test]
    fn snapshot_with_missing_component_fails() {
        let root = TempDir::new().unwrap();
        let step = root.path().join("000");
        fs::create_dir_all(&step).unwrap();
        let ux = Array::from_elem((4, 4), 1.0);
        write_npy(step.join("ux.npy"), &ux).unwrap();

        let err = Snapshot::load(&step).unwrap_err();
        assert!(format!("{err:#}").contains("uy.npy"));
    }

    #[test]
    fn rendered_frame_is_not_blank() {
        let root = TempDir::new().unwrap();
        let step = root.path().join("000");
        write_snapshot(&step);
        let snapshot = Snapshot::load(&step).unwrap();

        let (width, height) = (120u32, 180u32);
        let mut buf = vec![0u8; (width * height * 3) as usize];
        render_frame(&snapshot, &mut buf, width, height).unwrap();

        assert!(buf.iter().any(|&b| b != 0xff));
    }

    #[test]
    fn constant_field_uses_middle_band() {
        let mid = ViridisRGB.get_color(0.5 + 0.5 / CONTOUR_BANDS as f64);
        assert_eq!(band_color(3.0, 3.0, 3.0), mid);
    }

    #[test]
    fn band_color_clamps_to_last_band() {
        let top = band_color(1.0, 0.0, 1.0);
        let last = ViridisRGB.get_color((CONTOUR_BANDS as f64 - 0.5) / CONTOUR_BANDS as f64);
        assert_eq!(top, last);
    }
}
