use crate::rasterizer::{RasterImage, Rasterizer, RenderableDocument};
use pdf_nup::{NupError, Result};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

/// Where to look for the pdfium shared library
#[derive(Debug, Clone, Default)]
pub struct PdfiumConfig {
    /// Directory holding the platform library. `None` uses `vendor/pdfium/lib`
    /// under the current directory when present.
    pub library_dir: Option<PathBuf>,
}

/// [`Rasterizer`] backed by pdfium
#[derive(Debug)]
pub struct PdfiumRasterizer {
    /// Resolved library directory, or `None` for the system library
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    fn bind(&self) -> std::result::Result<Pdfium, PdfiumError> {
        match &self.library_dir {
            Some(dir) => bind_at(dir),
            None => Pdfium::bind_to_system_library().map(Pdfium::new),
        }
    }
}

fn bind_at(dir: &Path) -> std::result::Result<Pdfium, PdfiumError> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).map(Pdfium::new)
}

fn vendor_dir() -> Option<PathBuf> {
    // Relative to the workspace root when launched through cargo
    std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    })
}

impl Rasterizer for PdfiumRasterizer {
    type Config = PdfiumConfig;

    /// Try the configured or vendored library first, then fall back to system
    fn initialize(config: &PdfiumConfig) -> Result<Self> {
        let candidate = config.library_dir.clone().or_else(vendor_dir);

        if let Some(dir) = candidate {
            match bind_at(&dir) {
                Ok(_) => {
                    log::info!("Loaded pdfium from {}", dir.display());
                    return Ok(Self {
                        library_dir: Some(dir),
                    });
                }
                Err(e) => log::warn!("Could not load pdfium from {}: {:?}", dir.display(), e),
            }
        }

        Pdfium::bind_to_system_library()
            .map_err(|e| NupError::RendererInit(format!("{:?}", e)))?;
        log::info!("Loaded system pdfium library");
        Ok(Self { library_dir: None })
    }

    fn with_document(
        &self,
        pdf: &[u8],
        visit: &mut dyn FnMut(&mut dyn RenderableDocument) -> Result<()>,
    ) -> Result<()> {
        let pdfium = self
            .bind()
            .map_err(|e| NupError::RendererInit(format!("{:?}", e)))?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| NupError::Render {
                page: None,
                message: format!("{:?}", e),
            })?;

        let mut renderable = PdfiumDocument { document };
        visit(&mut renderable)
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RenderableDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage> {
        let render_error = |message: String| NupError::Render {
            page: Some(index),
            message,
        };

        let page_index =
            u16::try_from(index).map_err(|_| render_error("page index out of range".into()))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| render_error(format!("{:?}", e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| render_error(format!("{:?}", e)))?;

        Ok(RasterImage {
            width: bitmap.width() as u32,
            height: bitmap.height() as u32,
            rgba: bitmap.as_rgba_bytes().to_vec(),
        })
    }
}
