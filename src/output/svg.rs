//! Write traced polylines as an SVG document.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::TraceError;
use crate::polyline::Fragments;

/// Render `polylines` as a standalone SVG document sized `width × height`.
///
/// Each polyline becomes one unfilled, black-stroked `<path>`.
pub fn to_svg(polylines: &Fragments, width: usize, height: usize) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" fill=\"none\" stroke=\"black\" stroke-width=\"1\">\n"
    );
    for line in polylines {
        if line.is_empty() {
            continue;
        }
        let _ = writeln!(svg, "  <path d=\"{}\"/>", line.to_bezpath().to_svg());
    }
    svg.push_str("</svg>\n");
    svg
}

/// Write the SVG document for `polylines` to `path`.
pub fn write_svg(
    path: &Path,
    polylines: &Fragments,
    width: usize,
    height: usize,
) -> Result<(), TraceError> {
    std::fs::write(path, to_svg(polylines, width, height))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    #[test]
    fn one_path_per_polyline() {
        let mut f = Fragments::new();
        f.add(&[Point::new(2, 10), Point::new(17, 10)]);
        f.add(&[Point::new(5, 5), Point::new(5, 5)]);
        let svg = to_svg(&f, 20, 20);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"20\""));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("M2"));
        assert!(svg.contains("L17"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_collection_is_an_empty_document() {
        let svg = to_svg(&Fragments::new(), 4, 3);
        assert_eq!(svg.matches("<path").count(), 0);
        assert!(svg.contains("viewBox=\"0 0 4 3\""));
    }
}
