use anyhow::Context;
use bi1docs::content::ContentSource;
use bi1docs::rendering::layout::Cover;
use bi1docs::persist::persist_capture;
use bi1docs::{capture, DocumentSurface, ExportConfig, Exporter, SectionRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "bi1docs", version, about = "BI1 documentation viewer tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SurfaceArgs {
    /// JSON export configuration; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory with `<section-id>.html` fragments
    #[arg(long)]
    content_dir: Option<PathBuf>,
    /// Date printed on the cover
    #[arg(long)]
    date: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the documentation as a paginated PDF
    Export {
        #[command(flatten)]
        surface: SurfaceArgs,
        /// Output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Raster density multiplier
        #[arg(long)]
        scale: Option<u32>,
        /// Leave cross-origin images out of the capture
        #[arg(long)]
        no_external: bool,
    },
    /// Write the raw capture of the documentation surface as a PNG
    Capture {
        #[command(flatten)]
        surface: SurfaceArgs,
        /// Output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// File name of the image
        #[arg(long, default_value = "BI1_Bot_I_Documentation.png")]
        name: String,
    },
    /// List the registered sections
    Sections,
    /// Show section anchors and the expected page count
    Outline {
        #[command(flatten)]
        surface: SurfaceArgs,
    },
}

fn load(args: &SurfaceArgs) -> anyhow::Result<(ExportConfig, DocumentSurface)> {
    let config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)?,
        None => ExportConfig::default(),
    };
    let registry = SectionRegistry::global();
    let content = match &args.content_dir {
        Some(dir) => ContentSource::from_dir(dir, registry)?,
        None => ContentSource::builtin(),
    };
    let cover = Cover {
        date: args.date.clone(),
        ..Default::default()
    };
    let surface = DocumentSurface::build_with_cover(registry, &content, &cover, config.viewport)
        .context("failed to lay out documentation surface")?;
    Ok((config, surface))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            surface,
            out_dir,
            scale,
            no_external,
        } => {
            let (mut config, surface) = load(&surface)?;
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            if let Some(s) = scale {
                config.scale = s;
            }
            if no_external {
                config.allow_external_content = false;
            }
            let exporter = Exporter::new(config, Arc::new(surface))?;
            let report = exporter.export().await.context("export failed")?;
            println!(
                "{} ({} pages, {}x{} px capture)",
                report.path.display(),
                report.page_count,
                report.image_width,
                report.image_height
            );
        }
        Commands::Capture {
            surface,
            out_dir,
            name,
        } => {
            let (config, surface) = load(&surface)?;
            let image = capture(&surface, &config.capture_options()).context("capture failed")?;
            let dir = out_dir.unwrap_or(config.output_dir);
            let path = persist_capture(Arc::new(image), &dir, &name).await?;
            println!("{}", path.display());
        }
        Commands::Sections => {
            for (i, entry) in SectionRegistry::global().list().iter().enumerate() {
                println!("{:>2}. {} {:<28} #{}", i + 1, entry.glyph.symbol(), entry.title, entry.id);
            }
        }
        Commands::Outline { surface } => {
            let (config, surface) = load(&surface)?;
            println!("surface {}x{} px", surface.width(), surface.height());
            for anchor in surface.anchors() {
                println!("{:>7}  #{}", anchor.y, anchor.id);
            }
            // Scale cancels out of the page count, so the CSS size is enough.
            let pages = config.geometry.page_count(surface.width(), surface.height())?;
            println!("expected pages: {}", pages);
        }
    }
    Ok(())
}
