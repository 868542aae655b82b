//! Attendance chart rendering.
//!
//! plotters draws into an RGB buffer that is then encoded as PNG. Text needs
//! a registered TTF font; without `CHART_FONT_PATH` the chart is drawn with
//! lines and grid only.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::domain::AttendancePoint;
use crate::errors::{AppError, AppResult};

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;
const FONT_FAMILY: &str = "chart";

const TITLE: &str = "Посещаемость смен";
const X_DESC: &str = "Дата";
const Y_DESC: &str = "Количество отметок";
const MORNING_LABEL: &str = "Утро";
const EVENING_LABEL: &str = "Вечер";

/// PNG line chart of morning vs evening check-ins
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer {
    with_text: bool,
}

impl ChartRenderer {
    /// Load and register the caption font. A missing or broken font is
    /// logged and the renderer falls back to a text-less chart.
    pub fn new(font_path: Option<&str>) -> Self {
        let Some(path) = font_path else {
            return Self::default();
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Chart font not readable");
                return Self::default();
            }
        };

        // plotters keeps registered fonts for the lifetime of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => Self { with_text: true },
            Err(_) => {
                tracing::warn!(path = %path, "Chart font is not a valid TTF");
                Self::default()
            }
        }
    }

    pub fn render(&self, points: &[AttendancePoint]) -> AppResult<Vec<u8>> {
        let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
        self.draw(&mut buffer, points)?;

        let image = RgbImage::from_raw(WIDTH, HEIGHT, buffer)
            .ok_or_else(|| AppError::internal("Chart buffer has unexpected size"))?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| AppError::internal(format!("Failed to encode chart: {}", e)))?;

        Ok(png.into_inner())
    }

    fn draw(&self, buffer: &mut [u8], points: &[AttendancePoint]) -> AppResult<()> {
        let root = BitMapBackend::with_buffer(buffer, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let x_max = points.len().max(2) as i32 - 1;
        let y_max = points
            .iter()
            .map(|p| p.morning.max(p.evening))
            .max()
            .unwrap_or(0)
            + 1;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(24);
        if self.with_text {
            builder
                .caption(TITLE, (FONT_FAMILY, 28))
                .x_label_area_size(50)
                .y_label_area_size(60);
        }
        let mut chart = builder
            .build_cartesian_2d(0..x_max, 0..y_max)
            .map_err(chart_error)?;

        let date_label = |index: &i32| {
            points
                .get(*index as usize)
                .map(|p| p.date.format("%d.%m").to_string())
                .unwrap_or_default()
        };
        let mut mesh = chart.configure_mesh();
        if self.with_text {
            mesh.x_desc(X_DESC)
                .y_desc(Y_DESC)
                .x_labels(points.len().min(12))
                .x_label_formatter(&date_label)
                .label_style((FONT_FAMILY, 16))
                .axis_desc_style((FONT_FAMILY, 18));
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw().map_err(chart_error)?;

        let series = [
            (MORNING_LABEL, BLUE, points.iter().map(|p| p.morning).collect::<Vec<_>>()),
            (EVENING_LABEL, RED, points.iter().map(|p| p.evening).collect::<Vec<_>>()),
        ];
        for (label, color, values) in series {
            let line = LineSeries::new(
                values.into_iter().enumerate().map(|(i, v)| (i as i32, v)),
                color.stroke_width(2),
            )
            .point_size(4);
            let annotation = chart.draw_series(line).map_err(chart_error)?;
            if self.with_text {
                annotation.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        if self.with_text {
            chart
                .configure_series_labels()
                .label_font((FONT_FAMILY, 16))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
        Ok(())
    }
}

fn chart_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> AppError {
    AppError::internal(format!("Failed to draw chart: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_renders_png_without_font() {
        let points: Vec<AttendancePoint> = (1..=5)
            .map(|d| AttendancePoint {
                date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
                morning: d as i32,
                evening: 5 - d as i32,
            })
            .collect();

        let png = ChartRenderer::new(None).render(&points).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_single_day_chart() {
        let point = AttendancePoint {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            morning: 0,
            evening: 0,
        };
        let png = ChartRenderer::default().render(&[point]).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_missing_font_falls_back() {
        let renderer = ChartRenderer::new(Some("/nonexistent/font.ttf"));
        assert!(!renderer.with_text);
    }
}
