use std::fmt::Write as _;
use std::path::Path;

use crate::{
    error::{DrawingError, Result},
    types::VectorDrawing,
};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

impl VectorDrawing {
    /// Render as an SVG 1.1 document: global stroke styling on the root,
    /// one `<path>` per polyline.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="{SVG_NAMESPACE}" width="{w}" height="{h}" viewBox="0 0 {w} {h}" fill="none" stroke="{stroke}" stroke-width="{stroke_width}">"#,
            w = self.width,
            h = self.height,
            stroke = escape_attribute(&self.style.stroke_color),
            stroke_width = self.style.stroke_width,
        );
        for path in &self.paths {
            let _ = writeln!(svg, r#"  <path d="{}"/>"#, path.to_path_data());
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write the SVG document to `path`
    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_svg(path, &self.to_svg())
    }

    /// Serialize the path data to a JSON string
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write already rendered SVG text to `path`.
pub fn write_svg<P: AsRef<Path>>(path: P, svg: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, svg).map_err(|source| DrawingError::EncodeFailure {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
