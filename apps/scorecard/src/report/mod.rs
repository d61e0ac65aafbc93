// Report export: results page tree, rasterization, pagination, PDF encoding.
// Pagination and PDF encoding are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod exporter;
pub mod pagination;
pub mod pdf;
pub mod raster;
pub mod text;
pub mod view;

pub use exporter::{ExportError, ExportOptions, ReportExporter};
pub use raster::{BlockRasterizer, Rasterizer};
pub use text::render_text;
pub use view::{build_results_view, ResultsView, CAPTURE_REGION_ID};
