mod logger;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_nup::{Layout, NupOptions, Orientation, PaperSize, Spacing};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pdfnup", about = "Place 2 or 4 PDF pages on each sheet", version)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose an N-up PDF
    Compose {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file (defaults to <name>-<layout>-<orientation>.pdf next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Save the effective options as JSON
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Show how many sheets a composition would produce
    Stats {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Render the first sheets of the composition to PNG files
    Preview {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving sheet-N.png files
        #[arg(long)]
        out_dir: PathBuf,

        /// Directory containing the pdfium library
        #[arg(long)]
        pdfium_dir: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Composition options; explicit flags override a loaded config file
#[derive(Args)]
struct LayoutArgs {
    /// Pages per sheet
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Margin and gap size
    #[arg(long, value_enum)]
    spacing: Option<SpacingArg>,

    /// Output orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Load options from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    #[value(name = "2-up")]
    TwoUp,
    #[value(name = "4-up")]
    FourUp,
}

#[derive(Clone, Copy, ValueEnum)]
enum SpacingArg {
    Snug,
    Regular,
    Spacious,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Landscape,
    Portrait,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::TwoUp => Self::TwoUp,
            LayoutArg::FourUp => Self::FourUp,
        }
    }
}

impl From<SpacingArg> for Spacing {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Snug => Self::Snug,
            SpacingArg::Regular => Self::Regular,
            SpacingArg::Spacious => Self::Spacious,
        }
    }
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Portrait => Self::Portrait,
        }
    }
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl LayoutArgs {
    async fn resolve(&self) -> Result<NupOptions> {
        let mut options = match &self.config {
            Some(path) => NupOptions::load(path)
                .await
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => NupOptions::default(),
        };

        if let Some(layout) = self.layout {
            options.layout = layout.into();
        }
        if let Some(spacing) = self.spacing {
            options.spacing = spacing.into();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation.into();
        }
        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }

        options.validate()?;
        Ok(options)
    }
}

async fn read_input(path: &Path) -> Result<pdf_nup::WorkingDocument> {
    pdf_nup::compose::read_working_document(path)
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_statistics(document: &pdf_nup::WorkingDocument, options: &NupOptions) {
    let stats = pdf_nup::calculate_statistics(document.page_count, options.layout);
    println!("N-up Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Pages per sheet: {}", stats.pages_per_sheet);
    println!("  Output sheets: {}", stats.output_sheets);
    println!("  Empty slots: {}", stats.empty_slots);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::CliLogger::from_verbosity(cli.verbose).init()?;

    match cli.command {
        Commands::Compose {
            input,
            output,
            layout,
            save_config,
            stats_only,
        } => {
            let options = layout.resolve().await?;
            if let Some(path) = &save_config {
                options.save(path).await?;
                log::info!("Saved options to {}", path.display());
            }

            let document = read_input(&input).await?;
            print_statistics(&document, &options);

            if stats_only {
                return Ok(());
            }

            let output = output.unwrap_or_else(|| {
                input.with_file_name(options.output_file_name(&document.file_name))
            });

            let composed = pdf_nup::compose(document.bytes.to_vec(), &options)
                .await
                .map_err(|e| anyhow::anyhow!("{} ({})", e.user_message(), e))?;
            pdf_nup::save_pdf(&composed, &output).await?;
            println!("Composed → {}", output.display());
        }

        Commands::Stats { input, layout } => {
            let options = layout.resolve().await?;
            let document = read_input(&input).await?;
            print_statistics(&document, &options);
        }

        Commands::Preview {
            input,
            out_dir,
            pdfium_dir,
            layout,
        } => {
            let options = layout.resolve().await?;
            let document = read_input(&input).await?;
            preview(&document, options, out_dir, pdfium_dir).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "pdf-viewer")]
async fn preview(
    document: &pdf_nup::WorkingDocument,
    options: NupOptions,
    out_dir: PathBuf,
    pdfium_dir: Option<PathBuf>,
) -> Result<()> {
    use pdf_nup_runtime::{
        PdfiumConfig, PdfiumRasterizer, PreviewController, PreviewPage, PreviewState,
    };

    let config = PdfiumConfig {
        library_dir: pdfium_dir,
    };
    let (controller, _updates) = PreviewController::<PdfiumRasterizer>::new(config);
    controller.request(document, options).await?;

    let result = match controller.state() {
        PreviewState::Ready(result) => result,
        PreviewState::Failed(failure) => anyhow::bail!(failure.message()),
        other => anyhow::bail!("Preview did not finish: {:?}", other),
    };

    tokio::fs::create_dir_all(&out_dir).await?;
    for page in &result.pages {
        match page {
            PreviewPage::Rendered { index, image } => {
                let path = out_dir.join(format!("sheet-{}.png", index + 1));
                let buffer =
                    image::RgbaImage::from_raw(image.width, image.height, image.rgba.clone())
                        .context("Rendered image has unexpected size")?;
                buffer.save(&path)?;
                println!("Sheet {} → {}", index + 1, path.display());
            }
            PreviewPage::Failed { index, message } => {
                println!("Sheet {} failed: {}", index + 1, message);
            }
        }
    }
    println!(
        "Previewed {} of {} sheet(s)",
        result.pages.len(),
        result.total_sheets
    );

    Ok(())
}

#[cfg(not(feature = "pdf-viewer"))]
async fn preview(
    _document: &pdf_nup::WorkingDocument,
    _options: NupOptions,
    _out_dir: PathBuf,
    _pdfium_dir: Option<PathBuf>,
) -> Result<()> {
    anyhow::bail!("pdfnup was built without the pdf-viewer feature")
}
