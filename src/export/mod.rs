/// Plotter-ready SVG output for vertex streams.
pub mod svg;
