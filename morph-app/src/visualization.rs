//! Turns the panel images of one snapshot into a frame.

use crate::colormap::{ColormapKind, Norm};
use crate::config::RenderSettings;
use crate::error::AppError;
use morph_core::{DerivedField, Image2D, SpatialAxis};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::path::Path;

/// Family every frame's text is drawn in.
const FONT_FAMILY: &str = "sans-serif";
/// DejaVu Sans, so rendering needs no system fonts.
static EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Physical bounds of the image axes, in kpc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub horizontal_axis: SpatialAxis,
    pub vertical_axis: SpatialAxis,
    pub horizontal: (f64, f64),
    pub vertical: (f64, f64),
}

impl Extent {
    /// Extent of images taken along `line_of_sight` through a box centred on
    /// the origin with edge lengths `box_kpc`.
    #[must_use]
    pub fn centred(box_kpc: [f64; 3], line_of_sight: SpatialAxis) -> Self {
        let (horizontal_axis, vertical_axis) = line_of_sight.others();
        let half = |axis: SpatialAxis| box_kpc[axis.index()] / 2.0;
        Self {
            horizontal_axis,
            vertical_axis,
            horizontal: (-half(horizontal_axis), half(horizontal_axis)),
            vertical: (-half(vertical_axis), half(vertical_axis)),
        }
    }
}

/// One coloured image of a frame.
#[derive(Debug, Clone)]
pub struct Panel {
    pub field: DerivedField,
    pub label: String,
    pub colormap: ColormapKind,
    pub norm: Norm,
    pub image: Image2D,
}

/// Everything drawn for one snapshot.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Snapshot index, in Myr.
    pub time: u32,
    pub extent: Extent,
    pub panels: Vec<Panel>,
}

impl Frame {
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} Myr", self.time)
    }
}

/// Trait for types that can present a rendered frame.
pub trait FrameRenderer {
    /// Draws `frame`; file-based renderers write it to `output`.
    fn render(&mut self, frame: &Frame, output: &Path) -> Result<(), AppError>;

    /// Whether [`FrameRenderer::render`] writes to `output`.
    fn writes_files(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Draws frames to PNG files: one column per panel, each with a horizontal
/// colour bar on top.
#[derive(Debug)]
pub struct PlottersRenderer {
    settings: RenderSettings,
}

impl PlottersRenderer {
    /// Creates the renderer and registers the embedded font.
    pub fn new(settings: RenderSettings) -> Result<Self, AppError> {
        register_font(FONT_FAMILY, FontStyle::Normal, EMBEDDED_FONT).map_err(|_| AppError::render("invalid font"))?;
        Ok(Self { settings })
    }

    /// Pixel size of the canvas for `frame`.
    #[must_use]
    pub fn canvas_size(&self, frame: &Frame) -> (u32, u32) {
        let columns = frame.panels.len().max(1) as u32;
        (
            self.settings.panel_width * columns,
            self.settings.panel_height + self.settings.title_font_size * 2,
        )
    }

    /// Draws `frame` into an RGB buffer of [`PlottersRenderer::canvas_size`].
    pub fn render_to_buffer(&self, frame: &Frame, buffer: &mut [u8]) -> Result<(), AppError> {
        let size = self.canvas_size(frame);
        let expected = size.0 as usize * size.1 as usize * 3;
        if buffer.len() != expected {
            return Err(AppError::Render(format!(
                "Buffer holds {} bytes, a {}x{} canvas needs {expected}",
                buffer.len(),
                size.0,
                size.1
            )));
        }
        let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
        self.draw_frame(&root, frame)?;
        root.present().map_err(AppError::render)
    }

    fn text(size: u32) -> TextStyle<'static> {
        TextStyle::from((FONT_FAMILY, f64::from(size)).into_font())
    }

    fn draw_frame<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        frame: &Frame,
    ) -> Result<(), AppError> {
        root.fill(&WHITE).map_err(AppError::render)?;
        let content = root
            .titled(&frame.title(), Self::text(self.settings.title_font_size))
            .map_err(AppError::render)?;

        let areas = content.split_evenly((1, frame.panels.len().max(1)));
        for (index, (area, panel)) in areas.iter().zip(&frame.panels).enumerate() {
            let (bar, plot) = area.split_vertically(self.settings.colorbar_height as i32);
            self.draw_colorbar(&bar, panel)?;
            self.draw_image(&plot, panel, &frame.extent, index == 0)?;
        }
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
    ) -> Result<(), AppError> {
        let label_size = self.settings.label_font_size;
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.label, Self::text(label_size))
            .margin(10)
            .x_label_area_size(24)
            .build_cartesian_2d(0.0..1.0, 0.0..1.0)
            .map_err(AppError::render)?;

        let norm = panel.norm;
        let formatter = |t: &f64| format_tick(norm.denormalize(*t));
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_y_axis()
            .x_labels(3)
            .x_label_formatter(&formatter)
            .label_style(Self::text(label_size * 3 / 4))
            .draw()
            .map_err(AppError::render)?;

        let steps: u32 = 256;
        chart
            .draw_series((0..steps).map(|step| {
                let t0 = f64::from(step) / f64::from(steps);
                let t1 = f64::from(step + 1) / f64::from(steps);
                let color = panel.colormap.color((t0 + t1) / 2.0);
                Rectangle::new([(t0, 0.0), (t1, 1.0)], color.filled())
            }))
            .map_err(AppError::render)?;
        Ok(())
    }

    fn draw_image<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        extent: &Extent,
        first: bool,
    ) -> Result<(), AppError> {
        let label_size = self.settings.label_font_size;
        let (x0, x1) = extent.horizontal;
        let (z0, z1) = extent.vertical;
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(if first { 55 } else { 35 })
            .build_cartesian_2d(x0..x1, z0..z1)
            .map_err(AppError::render)?;

        let x_desc = format!("{} (kpc)", extent.horizontal_axis);
        let y_desc = format!("{} (kpc)", extent.vertical_axis);
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_desc(x_desc)
            .label_style(Self::text(label_size * 3 / 4))
            .axis_desc_style(Self::text(label_size));
        if first {
            mesh.y_desc(y_desc);
        }
        mesh.draw().map_err(AppError::render)?;

        let image = &panel.image;
        let dx = (x1 - x0) / image.width().max(1) as f64;
        let dz = (z1 - z0) / image.height().max(1) as f64;
        chart
            .draw_series(image.pixels().map(|(column, row, value)| {
                let color = panel.colormap.color(panel.norm.normalize(value));
                let left = x0 + column as f64 * dx;
                let bottom = z0 + row as f64 * dz;
                Rectangle::new([(left, bottom), (left + dx, bottom + dz)], color.filled())
            }))
            .map_err(AppError::render)?;
        Ok(())
    }
}

impl FrameRenderer for PlottersRenderer {
    fn render(&mut self, frame: &Frame, output: &Path) -> Result<(), AppError> {
        let size = self.canvas_size(frame);
        let root = BitMapBackend::new(output, size).into_drawing_area();
        self.draw_frame(&root, frame)?;
        root.present().map_err(AppError::render)?;
        log::debug!("Rendered {:?} ({}x{} px)", output, size.0, size.1);
        Ok(())
    }

    fn writes_files(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "plotters"
    }
}

/// Prints a text summary of every frame with a coarse character preview.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    preview_width: usize,
}

const SHADES: &[u8] = b" .:-=+*#%@";

impl TerminalRenderer {
    #[must_use]
    pub const fn new(preview_width: usize) -> Self {
        Self { preview_width }
    }

    /// Character preview of a panel, top row first. Empty for width 0.
    #[must_use]
    pub fn preview(&self, panel: &Panel) -> Vec<String> {
        let image = &panel.image;
        if self.preview_width == 0 || image.width() == 0 || image.height() == 0 {
            return Vec::new();
        }
        // Terminal cells are about twice as tall as wide.
        let width = self.preview_width.min(image.width());
        let height = (image.height() * width / image.width() / 2).clamp(1, image.height());
        let small = image.resample(width, height);
        (0..height)
            .rev()
            .map(|row| {
                (0..width)
                    .map(|column| {
                        let t = panel.norm.normalize(small.get(column, row).unwrap_or(0.0));
                        let index = (t * (SHADES.len() - 1) as f64).round() as usize;
                        char::from(SHADES[index.min(SHADES.len() - 1)])
                    })
                    .collect()
            })
            .collect()
    }
}

impl FrameRenderer for TerminalRenderer {
    fn render(&mut self, frame: &Frame, _output: &Path) -> Result<(), AppError> {
        println!("--- {} ---", frame.title());
        for panel in &frame.panels {
            let range = panel
                .image
                .finite_range()
                .map_or_else(|| "no finite values".to_string(), |(lo, hi)| {
                    format!("{lo:.3e} .. {hi:.3e}")
                });
            println!(
                "{:<18} {}x{} px  range {}",
                panel.label,
                panel.image.width(),
                panel.image.height(),
                range
            );
            for line in self.preview(panel) {
                println!("  |{line}|");
            }
        }
        println!("---------------------------");
        Ok(())
    }

    fn writes_files(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e3).contains(&magnitude) {
        format!("{value:.0e}")
    } else {
        format!("{value:.2}")
    }
}
