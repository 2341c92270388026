// src/renderer.rs

use crate::cli::Args;
use crate::error::Result;
use crate::model::{Growth, TimeSeries, Timestamp};
use image::{Rgb, RgbImage};
use palette::{FromColor, Lch, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

const MARGIN: u32 = 40;
const LINE_WIDTH: i64 = 2;
const POINT_RADIUS: i64 = 3;
const GRID_LINES: u32 = 5;

const BACKGROUND: Rgb<u8> = Rgb([8, 8, 12]);
const AXIS: Rgb<u8> = Rgb([120, 120, 130]);
const GRID: Rgb<u8> = Rgb([32, 32, 40]);
const TOTAL: Rgb<u8> = Rgb([235, 235, 235]);

/// One plotted line
#[derive(Debug, Clone)]
pub struct Series<'a> {
    pub label: &'a str,
    pub points: &'a TimeSeries,
    pub color: Rgb<u8>,
}

/// Picks the series to plot: the total, plus every selected language when
/// `all` is set.
pub fn series(growth: &Growth, all: bool) -> Vec<Series<'_>> {
    let mut out = Vec::new();
    if all {
        let colors = generate_series_colors(growth.languages.len());
        for (language, color) in growth.languages.iter().zip(colors) {
            out.push(Series { label: &language.language, points: &language.points, color });
        }
    }
    out.push(Series { label: "Total", points: &growth.total, color: TOTAL });
    out
}

/// Draws the growth chart to `args.output` and returns the plotted series
pub fn render_chart<'a>(growth: &'a Growth, args: &Args) -> Result<Vec<Series<'a>>> {
    let plotted = series(growth, args.all);
    let image = draw_chart(&plotted, args.width, args.height);
    image.save(&args.output)?;
    info!("chart written to {}", args.output.display());
    Ok(plotted)
}

/// Maps data coordinates onto the plot area of a `width` x `height` image
struct Projection {
    t0: Timestamp,
    t1: Timestamp,
    y_max: u64,
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl Projection {
    fn new(series: &[Series<'_>], width: u32, height: u32) -> Self {
        let times = series.iter().flat_map(|s| s.points.iter().map(|&(t, _)| t));
        let t0 = times.clone().min().unwrap_or(0);
        let t1 = times.max().unwrap_or(0).max(t0 + 1);
        let y_max = series
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, v)| v))
            .max()
            .unwrap_or(0)
            .max(1);

        let margin = MARGIN.min(width / 4).min(height / 4) as i64;
        Self {
            t0,
            t1,
            y_max,
            left: margin,
            right: width as i64 - 1 - margin,
            top: margin,
            bottom: height as i64 - 1 - margin,
        }
    }

    fn point(&self, t: Timestamp, value: u64) -> (i64, i64) {
        let fx = (t - self.t0) as f64 / (self.t1 - self.t0) as f64;
        let fy = value as f64 / self.y_max as f64;
        let x = self.left as f64 + fx * (self.right - self.left) as f64;
        let y = self.bottom as f64 - fy * (self.bottom - self.top) as f64;
        (x.round() as i64, y.round() as i64)
    }
}

pub fn draw_chart(series: &[Series<'_>], width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let proj = Projection::new(series, width, height);

    for i in 1..=GRID_LINES {
        let y = proj.bottom - (proj.bottom - proj.top) * i as i64 / GRID_LINES as i64;
        draw_line(&mut image, (proj.left, y), (proj.right, y), 1, GRID);
    }
    draw_line(&mut image, (proj.left, proj.bottom), (proj.right, proj.bottom), 1, AXIS);
    draw_line(&mut image, (proj.left, proj.top), (proj.left, proj.bottom), 1, AXIS);

    for s in series {
        let points: Vec<(i64, i64)> = s.points.iter().map(|&(t, v)| proj.point(t, v)).collect();
        for pair in points.windows(2) {
            draw_line(&mut image, pair[0], pair[1], LINE_WIDTH, s.color);
        }
        for &(x, y) in &points {
            fill_square(&mut image, x, y, POINT_RADIUS, s.color);
        }
    }
    image
}

fn put(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_square(image: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
    for y in cy - radius..=cy + radius {
        for x in cx - radius..=cx + radius {
            put(image, x, y, color);
        }
    }
}

// Bresenham, thickened by stamping a square brush
fn draw_line(image: &mut RgbImage, from: (i64, i64), to: (i64, i64), width: i64, color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let brush = width / 2;

    loop {
        fill_square(image, x, y, brush, color);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn generate_series_colors(count: usize) -> Vec<Rgb<u8>> {
    let mut rng = StdRng::seed_from_u64(42); // Seed for deterministic colors
    let offset = rng.gen_range(0.0f32..360.0f32);
    (0..count)
        .map(|n| {
            // Evenly spaced hues from a seeded start
            let hue = (offset + n as f32 * 360.0f32 / count.max(1) as f32) % 360.0f32;
            let color = Lch::new(70.0f32, 80.0f32, hue);
            let srgb: Srgb<f32> = Srgb::from_color(color);
            let (r, g, b) = srgb.into_components();
            Rgb([to_u8(r), to_u8(g), to_u8(b)])
        })
        .collect()
}

fn to_u8(component: f32) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0f32) as u8
}

/// `#rrggbb` form used in the printed legend
pub fn hex(color: Rgb<u8>) -> String {
    let Rgb([r, g, b]) = color;
    format!("#{r:02x}{g:02x}{b:02x}")
}
