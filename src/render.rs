//! Raster preview of a traced skeleton.
//!
//! Strokes the polylines in red over a grey rendering of the source
//! bitmap, producing a PNG for visual inspection. The chunks the tracer
//! visited can be outlined underneath.

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::error::TraceError;
use crate::geom::{Point, Rect};
use crate::polyline::{Fragments, Polyline};

/// Canvas position of a pixel's center.
fn pixel_center(p: Point, scale: f32) -> (f32, f32) {
    ((p.x as f32 + 0.5) * scale, (p.y as f32 + 0.5) * scale)
}

/// Open tiny-skia path through the polyline's points.
fn polyline_path(line: &Polyline<'_>, scale: f32) -> Option<tiny_skia::Path> {
    let mut points = line.points().map(|p| pixel_center(p, scale));
    let (x, y) = points.next()?;
    let mut pb = tiny_skia::PathBuilder::new();
    pb.move_to(x, y);
    for (x, y) in points {
        pb.line_to(x, y);
    }
    pb.finish()
}

/// Encode a pixmap to PNG bytes.
fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, TraceError> {
    let mut buf = Vec::new();
    let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| TraceError::Encode(e.to_string()))?;
    writer
        .write_image_data(pixmap.data())
        .map_err(|e| TraceError::Encode(e.to_string()))?;
    drop(writer);
    Ok(buf)
}

/// Render the skeleton over its source bitmap at `scale` pixels per source
/// pixel.
///
/// Foreground pixels are light grey, chunk outlines blue, polylines red,
/// zero-length polylines a red dot. Pass an empty `chunks` to skip the
/// outlines.
pub fn render_overlay(
    bitmap: &Bitmap,
    polylines: &Fragments,
    chunks: &[Rect],
    scale: u32,
) -> Result<tiny_skia::Pixmap, TraceError> {
    let scale = scale.max(1);
    let (w, h) = (bitmap.width() as u32, bitmap.height() as u32);
    let (cw, ch) = (w * scale, h * scale);
    let mut pixmap = tiny_skia::Pixmap::new(cw, ch)
        .ok_or_else(|| TraceError::Encode(format!("cannot allocate {}x{} canvas", cw, ch)))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    // ── Source pixels ──
    let mut grey = tiny_skia::Paint::default();
    grey.set_color_rgba8(200, 200, 200, 255);
    grey.anti_alias = false;
    let s = scale as f32;
    for y in 0..bitmap.height() {
        for x in 0..bitmap.width() {
            if bitmap.get(x, y) == 0 {
                continue;
            }
            if let Some(rect) = tiny_skia::Rect::from_xywh(x as f32 * s, y as f32 * s, s, s) {
                pixmap.fill_rect(rect, &grey, tiny_skia::Transform::identity(), None);
            }
        }
    }

    // ── Chunks ──
    let mut blue = tiny_skia::Paint::default();
    blue.set_color_rgba8(80, 120, 220, 255);
    blue.anti_alias = false;
    let outline = tiny_skia::Stroke {
        width: 1.0,
        ..tiny_skia::Stroke::default()
    };
    for chunk in chunks {
        let rect = tiny_skia::Rect::from_xywh(
            chunk.x as f32 * s + 0.5,
            chunk.y as f32 * s + 0.5,
            chunk.width as f32 * s - 1.0,
            chunk.height as f32 * s - 1.0,
        );
        if let Some(rect) = rect {
            let path = tiny_skia::PathBuilder::from_rect(rect);
            pixmap.stroke_path(&path, &blue, &outline, tiny_skia::Transform::identity(), None);
        }
    }

    // ── Skeleton ──
    let mut red = tiny_skia::Paint::default();
    red.set_color_rgba8(220, 0, 0, 255);
    red.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: (s / 3.0).max(1.0),
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };

    for line in polylines {
        let Some(first) = line.head() else {
            continue;
        };
        if line.points().all(|p| p == first) {
            let (cx, cy) = pixel_center(first, s);
            if let Some(dot) = tiny_skia::PathBuilder::from_circle(cx, cy, stroke.width) {
                pixmap.fill_path(
                    &dot,
                    &red,
                    tiny_skia::FillRule::Winding,
                    tiny_skia::Transform::identity(),
                    None,
                );
            }
            continue;
        }
        if let Some(path) = polyline_path(&line, s) {
            pixmap.stroke_path(&path, &red, &stroke, tiny_skia::Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

/// Render the overlay and write it as a PNG.
pub fn write_overlay(
    bitmap: &Bitmap,
    polylines: &Fragments,
    chunks: &[Rect],
    scale: u32,
    output_path: &Path,
) -> Result<(), TraceError> {
    let pixmap = render_overlay(bitmap, polylines, chunks, scale)?;
    std::fs::write(output_path, encode_png(&pixmap)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_marks_skeleton_in_red() {
        let mut bm = Bitmap::blank(10, 6);
        for x in 1..9 {
            bm.set(x, 3, true);
        }
        let mut f = Fragments::new();
        f.add(&[Point::new(1, 3), Point::new(8, 3)]);
        let pixmap = render_overlay(&bm, &f, &[], 4).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 24));

        // Center of pixel (4, 3) is on the stroke.
        let px = pixmap.pixel(4 * 4 + 2, 3 * 4 + 2).unwrap();
        assert!(px.red() > 150 && px.green() < 100);
        // Pixel (4, 0) is background.
        let bg = pixmap.pixel(4 * 4 + 2, 2).unwrap();
        assert_eq!((bg.red(), bg.green(), bg.blue()), (255, 255, 255));
    }

    #[test]
    fn png_bytes_have_signature() {
        let pixmap = render_overlay(&Bitmap::blank(3, 3), &Fragments::new(), &[], 1).unwrap();
        let bytes = encode_png(&pixmap).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn chunk_outlines_are_drawn_under_the_skeleton() {
        let bm = Bitmap::blank(10, 10);
        let chunks = [Rect::new(0, 0, 5, 10), Rect::new(5, 0, 5, 10)];
        let pixmap = render_overlay(&bm, &Fragments::new(), &chunks, 4).unwrap();

        // Left edge of the second chunk.
        let edge = pixmap.pixel(5 * 4, 20).unwrap();
        assert!(edge.blue() > edge.red(), "{edge:?}");
        // Inside the first chunk.
        let inside = pixmap.pixel(10, 20).unwrap();
        assert_eq!((inside.red(), inside.green(), inside.blue()), (255, 255, 255));
    }

    #[test]
    fn zero_length_polyline_is_a_dot() {
        let mut f = Fragments::new();
        f.add(&[Point::new(2, 2), Point::new(2, 2)]);
        let pixmap = render_overlay(&Bitmap::blank(5, 5), &f, &[], 6).unwrap();
        let px = pixmap.pixel(2 * 6 + 3, 2 * 6 + 3).unwrap();
        assert!(px.red() > 150 && px.green() < 100);
    }
}
