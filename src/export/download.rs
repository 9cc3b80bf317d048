//! Download orchestration: render the requested format and hand it to a saver.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use super::{ExportArtifact, ExportFormat};
use crate::error::ExportError;
use crate::render::{
    DEFAULT_PIXEL_RATIO, Rasterizer, SvgPreview, document_from_raster, svg_bytes,
};

// ============================================================================
// FileSaver
// ============================================================================

/// Delivers a finished artifact to the user.
pub trait FileSaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<(), ExportError>;
}

impl<S: FileSaver + ?Sized> FileSaver for &S {
    fn save(&self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        (**self).save(artifact)
    }
}

/// Saves artifacts as files in a directory.
///
/// Files are written under a temporary name and renamed into place, so a
/// failed save never leaves a truncated artifact behind.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact named `filename` is saved to.
    ///
    /// The name is reduced to a single file name inside [`Self::dir`]: path
    /// separators, reserved and control characters become `_` and leading
    /// dots are dropped.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(sanitize_file_name(filename))
    }
}

fn sanitize_file_name(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "export".to_string(),
        name => name.to_string(),
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, artifact: &ExportArtifact) -> Result<(), ExportError> {
        let name = sanitize_file_name(&artifact.filename);
        let target = self.dir.join(&name);
        let partial = self.dir.join(format!(".{name}.part"));

        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&partial, &artifact.bytes))
            .and_then(|()| fs::rename(&partial, &target));

        if let Err(err) = result {
            let _ = fs::remove_file(&partial);
            return Err(ExportError::Save(format!("{}: {err}", target.display())));
        }

        info!(path = target.display().to_string(); "Saved export");
        Ok(())
    }
}

// ============================================================================
// Download
// ============================================================================

/// Progress of one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Idle,
    Rendering,
    Success,
    Failed,
}

/// One download invocation and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    format: ExportFormat,
    filename: String,
    state: DownloadState,
    error: Option<ExportError>,
}

impl Download {
    fn new(format: ExportFormat, filename: String) -> Self {
        Self {
            format,
            filename,
            state: DownloadState::Idle,
            error: None,
        }
    }

    fn begin(&mut self) {
        debug_assert_eq!(self.state, DownloadState::Idle);
        self.state = DownloadState::Rendering;
    }

    fn finish(&mut self, result: Result<(), ExportError>) {
        debug_assert_eq!(self.state, DownloadState::Rendering);
        match result {
            Ok(()) => self.state = DownloadState::Success,
            Err(err) => {
                self.state = DownloadState::Failed;
                self.error = Some(err);
            }
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Name the artifact was (or would have been) saved under.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn state(&self) -> DownloadState {
        self.state
    }

    pub fn is_success(&self) -> bool {
        self.state == DownloadState::Success
    }

    /// The failure, if the download failed.
    pub fn error(&self) -> Option<&ExportError> {
        self.error.as_ref()
    }

    /// The message to show the user if the download failed.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ExportError::user_message)
    }
}

// ============================================================================
// Exporter
// ============================================================================

/// Produces and saves export artifacts.
///
/// Takes only shared references to the editor state, so an export can never
/// alter the color mapping or the derived markup. Invocations are
/// independent: nothing is queued or deduplicated.
#[derive(Debug, Clone)]
pub struct Exporter<R, S> {
    rasterizer: R,
    saver: S,
    pixel_ratio: f32,
}

impl<R: Rasterizer, S: FileSaver> Exporter<R, S> {
    pub fn new(rasterizer: R, saver: S) -> Self {
        Self {
            rasterizer,
            saver,
            pixel_ratio: DEFAULT_PIXEL_RATIO,
        }
    }

    /// Sets the oversampling factor for raster formats.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Builds the artifact for `format` without saving it.
    ///
    /// SVG comes straight from `derived_svg`; PNG and PDF are rendered from
    /// `preview` and need it to be laid out.
    pub fn render(
        &self,
        format: ExportFormat,
        title: &str,
        derived_svg: &str,
        preview: &SvgPreview,
    ) -> Result<ExportArtifact, ExportError> {
        if format.needs_layout() && !preview.is_laid_out() {
            return Err(ExportError::EmptyRenderTarget);
        }

        let bytes = match format {
            ExportFormat::Svg => svg_bytes(derived_svg)?,
            ExportFormat::Png => self
                .rasterizer
                .rasterize(preview, self.pixel_ratio)?
                .encode_png()?,
            ExportFormat::Pdf => {
                let raster = self.rasterizer.rasterize(preview, self.pixel_ratio)?;
                document_from_raster(&raster, title)?
            }
        };

        Ok(ExportArtifact::new(title, format, bytes))
    }

    /// Renders `format` and saves it, reporting the outcome.
    pub fn download(
        &self,
        format: ExportFormat,
        title: &str,
        derived_svg: &str,
        preview: &SvgPreview,
    ) -> Download {
        let mut download = Download::new(format, super::export_filename(title, format));
        download.begin();
        debug!(format = format.extension(); "Starting download");

        let result = self
            .render(format, title, derived_svg, preview)
            .and_then(|artifact| self.saver.save(&artifact));

        match &result {
            Ok(()) => info!(file = download.filename(); "Download complete"),
            Err(err) => error!(format = format.extension(), error = err.to_string(); "Download failed"),
        }

        download.finish(result);
        download
    }
}
