//! Captures the results region into a paginated PDF.
//!
//! Export-excluded chrome is hidden for the duration of the capture by a
//! `VisibilityGuard`; its `Drop` puts every touched element back to its prior
//! visibility whether the export succeeds, fails, or is dropped mid-await.

use std::ops::Deref;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::report::pagination::{paginate, PageSpec};
use crate::report::pdf::write_pdf;
use crate::report::raster::{RasterError, Rasterizer, Rgb, WHITE};
use crate::report::view::{ResultsView, REPORT_TITLE};

pub const DEFAULT_FILE_NAME: &str = "resume-analysis-results.pdf";
pub const DEFAULT_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Capture region '{0}' not found")]
    RegionNotFound(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Export task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub file_name: String,
    pub scale: f32,
    pub background: Rgb,
    pub page: PageSpec,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            scale: DEFAULT_SCALE,
            background: WHITE,
            page: PageSpec::a4_portrait(),
        }
    }
}

impl ExportOptions {
    pub fn in_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

/// Hides export-excluded elements until dropped.
struct VisibilityGuard<'a> {
    view: &'a mut ResultsView,
    prior: Vec<(String, bool)>,
}

impl<'a> VisibilityGuard<'a> {
    fn hide(view: &'a mut ResultsView) -> Self {
        let prior = view.hide_export_excluded();
        debug!(hidden = prior.len(), "Export chrome hidden");
        Self { view, prior }
    }
}

impl Deref for VisibilityGuard<'_> {
    type Target = ResultsView;

    fn deref(&self) -> &ResultsView {
        self.view
    }
}

impl Drop for VisibilityGuard<'_> {
    fn drop(&mut self) {
        self.view.restore_visibility(&self.prior);
        debug!(restored = self.prior.len(), "Export chrome restored");
    }
}

pub struct ReportExporter<R: Rasterizer> {
    rasterizer: R,
}

impl<R: Rasterizer> ReportExporter<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Exports `region_id` of `view` to `options.output_path()` and returns that path.
    pub async fn export(
        &self,
        view: &mut ResultsView,
        region_id: &str,
        options: &ExportOptions,
    ) -> Result<PathBuf, ExportError> {
        let guard = VisibilityGuard::hide(view);

        let region = guard
            .find(region_id)
            .ok_or_else(|| ExportError::RegionNotFound(region_id.to_string()))?;

        let raster = self
            .rasterizer
            .rasterize(region, options.scale, options.background)
            .await?;
        debug!(width = raster.width, height = raster.height, "Region rasterized");

        let spec = options.page;
        let bytes = tokio::task::spawn_blocking(move || {
            let slices = paginate(raster.width, raster.height, &spec);
            write_pdf(&raster, &slices, &spec, REPORT_TITLE)
        })
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;

        let path = options.output_path();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), bytes = bytes.len(), "Report exported");
        Ok(path)
    }
}
