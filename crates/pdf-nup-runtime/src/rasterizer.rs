//! Rasterizer seam used by the preview controller

use pdf_nup::Result;

/// RGBA8 pixels of one rendered page
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// A document opened by a [`Rasterizer`], valid only inside
/// [`Rasterizer::with_document`].
pub trait RenderableDocument {
    fn page_count(&self) -> usize;

    /// Render one page at `scale` times its natural size (72 dpi).
    ///
    /// Page resources are released before this returns.
    fn render_page(&mut self, index: usize, scale: f32) -> Result<RasterImage>;
}

/// Turns PDF bytes into page images.
///
/// Implementations run on the blocking pool. Library setup happens once in
/// [`Rasterizer::initialize`]; document handles never outlive `with_document`.
pub trait Rasterizer: Send + Sync + Sized + 'static {
    type Config: Clone + Send + Sync + 'static;

    fn initialize(config: &Self::Config) -> Result<Self>;

    fn with_document(
        &self,
        pdf: &[u8],
        visit: &mut dyn FnMut(&mut dyn RenderableDocument) -> Result<()>,
    ) -> Result<()>;
}
