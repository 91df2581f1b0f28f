use std::path::Path;

use image::{Rgb, RgbImage};

use super::RenderError;
use super::font::{draw_text, draw_text_vertical, text_height, text_width};
use crate::ml::metrics::ConfusionMatrix;

/// Figure size in inches; pixel size is this times the DPI.
pub const FIGURE_INCHES: (f64, f64) = (8.0, 6.0);

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const AXIS: Rgb<u8> = Rgb([64, 64, 64]);

/// Stops of the sequential "Blues" colour map, light to dark.
const BLUES: [[u8; 3]; 9] = [
    [247, 251, 255],
    [222, 235, 247],
    [198, 219, 239],
    [158, 202, 225],
    [107, 174, 214],
    [66, 146, 198],
    [33, 113, 181],
    [8, 81, 156],
    [8, 48, 107],
];

/// Layout in pixels for a figure rendered at 100 DPI; scaled linearly for other DPIs.
struct Layout {
    scale: f64,
}

impl Layout {
    fn px(&self, base: f64) -> i64 {
        (base * self.scale).round() as i64
    }

    fn font(&self, base: u32) -> u32 {
        ((f64::from(base) * self.scale).round() as u32).max(1)
    }
}

/// Colour for `t` in `[0, 1]` on the Blues ramp.
pub fn blues(t: f64) -> Rgb<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (BLUES.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = pos - lo as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    Rgb([
        mix(BLUES[lo][0], BLUES[hi][0]),
        mix(BLUES[lo][1], BLUES[hi][1]),
        mix(BLUES[lo][2], BLUES[hi][2]),
    ])
}

/// Annotation colour: light text when the count is strictly above half the maximum.
pub fn annotation_color(value: u32, max: u32) -> Rgb<u8> {
    if f64::from(value) > f64::from(max) / 2.0 {
        WHITE
    } else {
        DARK
    }
}

/// Pixel dimensions of the figure at `dpi`.
pub fn figure_size(dpi: u32) -> (u32, u32) {
    let dpi = f64::from(dpi);
    (
        (FIGURE_INCHES.0 * dpi).round() as u32,
        (FIGURE_INCHES.1 * dpi).round() as u32,
    )
}

/// Render the matrix as an annotated heat-map raster.
pub fn draw_confusion_heatmap(
    cm: &ConfusionMatrix,
    class_names: &[String],
    dpi: u32,
) -> Result<RgbImage, RenderError> {
    let n = cm.n_classes();
    if n == 0 {
        return Err(RenderError::EmptyMatrix);
    }
    if class_names.len() != n {
        return Err(RenderError::ClassNames {
            expected: n,
            found: class_names.len(),
        });
    }
    let (width, height) = figure_size(dpi);
    let layout = Layout {
        scale: f64::from(dpi) / 100.0,
    };
    let mut image = RgbImage::from_pixel(width, height, WHITE);

    let grid_left = layout.px(160.0);
    let grid_top = layout.px(70.0);
    let grid_size = layout.px(440.0);
    let cell = grid_size / n as i64;
    let grid_size = cell * n as i64;
    let max = cm.max();

    let title = "Confusion Matrix - Decision Tree";
    let title_scale = layout.font(3);
    draw_text(
        &mut image,
        i64::from(width) / 2 - i64::from(text_width(title, title_scale)) / 2,
        layout.px(22.0),
        title,
        title_scale,
        DARK,
    );

    let value_scale = layout.font(4);
    for truth in 0..n {
        for pred in 0..n {
            let value = cm.get(truth, pred);
            let t = if max == 0 {
                0.0
            } else {
                f64::from(value) / f64::from(max)
            };
            let x0 = grid_left + pred as i64 * cell;
            let y0 = grid_top + truth as i64 * cell;
            fill_rect(&mut image, x0, y0, cell, cell, blues(t));
            let text = value.to_string();
            draw_text(
                &mut image,
                x0 + cell / 2 - i64::from(text_width(&text, value_scale)) / 2,
                y0 + cell / 2 - i64::from(text_height(value_scale)) / 2,
                &text,
                value_scale,
                annotation_color(value, max),
            );
        }
    }
    stroke_rect(&mut image, grid_left, grid_top, grid_size, grid_size, layout.px(1.0).max(1), AXIS);

    let tick_scale = layout.font(2);
    let tick_gap = layout.px(10.0);
    for (idx, name) in class_names.iter().enumerate() {
        let center = idx as i64 * cell + cell / 2;
        let name_width = i64::from(text_width(name, tick_scale));
        draw_text(
            &mut image,
            grid_left + center - name_width / 2,
            grid_top + grid_size + tick_gap,
            name,
            tick_scale,
            DARK,
        );
        draw_text(
            &mut image,
            grid_left - tick_gap - name_width,
            grid_top + center - i64::from(text_height(tick_scale)) / 2,
            name,
            tick_scale,
            DARK,
        );
    }

    let label_scale = layout.font(2);
    let x_label = "Predicted";
    draw_text(
        &mut image,
        grid_left + grid_size / 2 - i64::from(text_width(x_label, label_scale)) / 2,
        grid_top + grid_size + layout.px(45.0),
        x_label,
        label_scale,
        DARK,
    );
    let y_label = "True";
    let widest_tick = class_names
        .iter()
        .map(|name| i64::from(text_width(name, tick_scale)))
        .max()
        .unwrap_or(0);
    draw_text_vertical(
        &mut image,
        row_title_left(&layout, grid_left - tick_gap - widest_tick, label_scale),
        grid_top + grid_size / 2 + i64::from(text_width(y_label, label_scale)) / 2,
        y_label,
        label_scale,
        DARK,
    );

    draw_colorbar(&mut image, &layout, grid_left + grid_size + layout.px(30.0), grid_top, grid_size, max);
    Ok(image)
}

/// Left edge of the rotated row-axis title, kept clear of the row tick labels that start at `ticks_left`.
fn row_title_left(layout: &Layout, ticks_left: i64, label_scale: u32) -> i64 {
    (ticks_left - layout.px(8.0) - i64::from(text_height(label_scale))).max(0)
}

fn draw_colorbar(image: &mut RgbImage, layout: &Layout, left: i64, top: i64, height: i64, max: u32) {
    let bar_width = layout.px(22.0).max(1);
    for row in 0..height {
        let t = 1.0 - row as f64 / (height - 1).max(1) as f64;
        fill_rect(image, left, top + row, bar_width, 1, blues(t));
    }
    stroke_rect(image, left, top, bar_width, height, layout.px(1.0).max(1), AXIS);

    let tick_scale = layout.font(2);
    let tick_len = layout.px(5.0).max(1);
    let steps = max.min(5);
    for step in 0..=steps {
        let value = if steps == 0 { 0 } else { max * step / steps };
        let fraction = if max == 0 {
            0.0
        } else {
            f64::from(value) / f64::from(max)
        };
        let y = top + ((1.0 - fraction) * (height - 1) as f64).round() as i64;
        fill_rect(image, left + bar_width, y, tick_len, layout.px(1.0).max(1), AXIS);
        draw_text(
            image,
            left + bar_width + tick_len + layout.px(4.0),
            y - i64::from(text_height(tick_scale)) / 2,
            &value.to_string(),
            tick_scale,
            DARK,
        );
    }
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    for py in y.max(0)..(y + h).min(height) {
        for px in x.max(0)..(x + w).min(width) {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn stroke_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, thickness: i64, color: Rgb<u8>) {
    fill_rect(image, x, y, w, thickness, color);
    fill_rect(image, x, y + h - thickness, w, thickness, color);
    fill_rect(image, x, y, thickness, h, color);
    fill_rect(image, x + w - thickness, y, thickness, h, color);
}

/// Render the heat-map and write it as a PNG at `path`, creating parent directories.
pub fn render_confusion_heatmap(
    cm: &ConfusionMatrix,
    class_names: &[String],
    path: &Path,
    dpi: u32,
) -> Result<(), RenderError> {
    let image = draw_confusion_heatmap(cm, class_names, dpi)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    image.save(path).map_err(|source| RenderError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "Saved confusion matrix heat-map ({}x{}) to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names() -> Vec<String> {
        vec!["Setosa".into(), "Versicolor".into(), "Virginica".into()]
    }

    fn matrix() -> ConfusionMatrix {
        let truth = [1, 1, 1, 1, 2, 2, 3];
        let pred = [1, 1, 1, 1, 2, 3, 3];
        ConfusionMatrix::from_labels(&[1, 2, 3], &truth, &pred)
    }

    #[test]
    fn ramp_endpoints_are_light_and_dark() {
        assert_eq!(blues(0.0), Rgb([247, 251, 255]));
        assert_eq!(blues(1.0), Rgb([8, 48, 107]));
        assert_eq!(blues(f64::NAN), blues(0.0));
    }

    #[test]
    fn annotation_switches_strictly_above_half() {
        assert_eq!(annotation_color(5, 10), DARK);
        assert_eq!(annotation_color(6, 10), WHITE);
        assert_eq!(annotation_color(0, 0), DARK);
    }

    #[test]
    fn figure_is_eight_by_six_inches() {
        assert_eq!(figure_size(300), (2400, 1800));
        assert_eq!(figure_size(100), (800, 600));
    }

    #[test]
    fn darkest_cell_holds_the_maximum() {
        let image = draw_confusion_heatmap(&matrix(), &names(), 100).unwrap();
        assert_eq!(image.dimensions(), (800, 600));
        // Near the top-left corner of cell (0, 0), clear of the annotation.
        assert_eq!(*image.get_pixel(165, 75), blues(1.0));
        // Cell (0, 2) is empty.
        let cell = 440 / 3;
        assert_eq!(*image.get_pixel(160 + 2 * cell + 5, 75), blues(0.0));
    }

    #[test]
    fn row_title_clears_the_widest_tick_label() {
        for dpi in [50, 100, 300] {
            let layout = Layout {
                scale: f64::from(dpi) / 100.0,
            };
            let tick_scale = layout.font(2);
            let label_scale = layout.font(2);
            let widest = names()
                .iter()
                .map(|name| i64::from(text_width(name, tick_scale)))
                .max()
                .unwrap();
            let ticks_left = layout.px(160.0) - layout.px(10.0) - widest;
            let left = row_title_left(&layout, ticks_left, label_scale);
            assert!(left >= 0, "dpi {dpi}");
            assert!(
                left + i64::from(text_height(label_scale)) < ticks_left,
                "dpi {dpi}: title ends at {}, ticks start at {ticks_left}",
                left + i64::from(text_height(label_scale))
            );
        }
    }

    #[test]
    fn row_title_pixels_stay_left_of_tick_labels() {
        let image = draw_confusion_heatmap(&matrix(), &names(), 100).unwrap();
        let widest = i64::from(text_width("Versicolor", 2));
        let ticks_left = (160 - 10 - widest) as u32;
        let title_right = (row_title_left(&Layout { scale: 1.0 }, i64::from(ticks_left), 2)
            + i64::from(text_height(2))) as u32;
        // The gap between the title and the tick labels holds only background.
        for x in title_right..ticks_left {
            for y in 70..510 {
                assert_eq!(*image.get_pixel(x, y), WHITE, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn mismatched_names_are_rejected() {
        let err = draw_confusion_heatmap(&matrix(), &names()[..2], 100).unwrap_err();
        assert!(matches!(err, RenderError::ClassNames { expected: 3, found: 2 }));
    }

    #[test]
    fn writes_png_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/confusion_matrix.png");
        render_confusion_heatmap(&matrix(), &names(), &path, 50).unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (400, 300));
    }
}
