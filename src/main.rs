use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use m3u_reconcile::{
    artwork::{ArtworkBackfiller, HttpArtworkProbe},
    batch::{self, BatchContext},
    compare::{PlaylistComparator, report},
    config::Config,
    coverage,
    discovery::{self, M3U_EXTENSIONS, STREAM_LIST_EXTENSIONS},
    generator::{ExportFormat, M3uWriter, export, write_export},
    mapping::ChannelResolver,
    models::{PlaylistDocument, PlaylistHeader},
    observability,
    reconcile::{Reconciler, TemplateMode, dedup_by_url, renumber},
    sources::{PlaylistFormat, load_playlist, load_playlist_as},
};

#[derive(Parser)]
#[command(name = "m3u-reconcile")]
#[command(version)]
#[command(about = "Merge, reconcile and compare TV channel playlists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (defaults to $CONFIG_FILE, then config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Channel catalog (overrides catalog.path)
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Skip artwork backfill
    #[arg(long, global = true)]
    no_artwork: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge several playlists into one
    Merge {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Playlist name written to the header
        #[arg(long)]
        name: Option<String>,
    },
    /// Reconcile a template playlist against one stream source
    Template {
        template: PathBuf,
        source: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "filter-only")]
        mode: TemplateMode,
    },
    /// Reconcile a template against every stream list in a directory
    BatchTemplate {
        template: PathBuf,
        sources_dir: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[arg(long, default_value = "filter-only")]
        mode: TemplateMode,
        /// Write the list of channels still missing artwork here
        #[arg(long, value_name = "FILE")]
        missing_report: Option<PathBuf>,
    },
    /// Backfill artwork (and optionally dedup) every M3U in a directory
    Refresh {
        input_dir: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[arg(long)]
        dedup: bool,
    },
    /// Merge same-named playlists from several directories
    MergeDirs {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
        #[arg(short, long)]
        output_dir: PathBuf,
    },
    /// Compare two playlists by standard channel name
    Compare {
        left: PathBuf,
        right: PathBuf,
        /// Write the detailed report here instead of stdout
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Export a playlist as JSON, CSV or M3U
    Export {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Print playlist statistics instead of exporting
        #[arg(long)]
        summary: bool,
    },
    /// Remove duplicate stream URLs from an M3U playlist
    Dedup {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List region/operator playlists missing from a directory
    Coverage { dir: PathBuf },
}

struct App {
    config: Config,
    resolver: Arc<ChannelResolver>,
    no_artwork: bool,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load()?,
        };
        if let Some(catalog) = &cli.catalog {
            config.catalog.path = Some(catalog.clone());
        }

        let catalog = config.load_catalog()?;
        let resolver = Arc::new(ChannelResolver::from_catalog(
            &catalog,
            config.catalog.default_group.clone(),
        ));

        Ok(Self {
            config,
            resolver,
            no_artwork: cli.no_artwork,
        })
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.resolver.clone())
    }

    fn backfiller(&self) -> Result<Option<Arc<ArtworkBackfiller>>> {
        if self.no_artwork || !self.config.artwork.enabled {
            return Ok(None);
        }
        let probe = HttpArtworkProbe::new(&self.config.artwork.user_agent)?;
        Ok(Some(Arc::new(ArtworkBackfiller::from_config(
            Arc::new(probe),
            &self.config.artwork,
        ))))
    }

    fn batch_context(&self) -> Result<BatchContext> {
        Ok(BatchContext {
            reconciler: self.reconciler(),
            backfiller: self.backfiller()?,
            epg_url: self.config.output.epg_url.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    observability::init(&cli.log_level, cli.log_json);

    info!("Starting m3u-reconcile v{}", env!("CARGO_PKG_VERSION"));
    let app = App::new(&cli)?;

    match cli.command {
        Command::Merge {
            inputs,
            output,
            name,
        } => merge(&app, &inputs, &output, name).await,
        Command::Template {
            template,
            source,
            output,
            mode,
        } => template_one(&app, &template, &source, &output, mode).await,
        Command::BatchTemplate {
            template,
            sources_dir,
            output_dir,
            mode,
            missing_report,
        } => {
            let sources =
                discovery::list_files(&sources_dir, &STREAM_LIST_EXTENSIONS).await?;
            let ctx = app.batch_context()?;
            let report =
                batch::run_template_batch(&ctx, &template, &sources, &output_dir, mode).await?;
            println!(
                "Processed {} sources, {} failed",
                report.processed.len(),
                report.failed.len()
            );
            for item in &report.processed {
                println!(
                    "  {} -> {} ({} channels, {} without artwork)",
                    item.source.display(),
                    item.output.display(),
                    item.channels,
                    item.missing_artwork.len()
                );
            }
            print_failures(&report.failed);
            if let Some(path) = missing_report {
                let text = batch::render_missing_artwork_report(&report.processed);
                tokio::fs::write(&path, text)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Missing artwork report: {}", path.display());
            }
            Ok(())
        }
        Command::Refresh {
            input_dir,
            output_dir,
            dedup,
        } => {
            let inputs = discovery::list_files(&input_dir, &M3U_EXTENSIONS).await?;
            let ctx = app.batch_context()?;
            let report = batch::run_refresh_batch(&ctx, &inputs, &output_dir, dedup).await?;
            println!(
                "Refreshed {} playlists, {} failed: {} channels, {} artwork added",
                report.processed.len(),
                report.failed.len(),
                report.total_channels(),
                report.total_artwork_added()
            );
            print_failures(&report.failed);
            Ok(())
        }
        Command::MergeDirs { dirs, output_dir } => {
            let groups = discovery::group_by_stem(&dirs).await?;
            let ctx = app.batch_context()?;
            let report = batch::run_group_merge(&ctx, &groups, &output_dir).await?;
            for item in &report.processed {
                println!(
                    "  {} <- {} files ({} channels, {} duplicates removed)",
                    item.output.display(),
                    item.inputs.len(),
                    item.channels,
                    item.duplicates_removed
                );
            }
            print_failures(&report.failed);
            Ok(())
        }
        Command::Compare {
            left,
            right,
            report: report_path,
        } => {
            let left_doc = load_playlist(&left).await?;
            let right_doc = load_playlist(&right).await?;
            let result = PlaylistComparator::new(app.resolver.clone())
                .compare(&left_doc.records, &right_doc.records);
            let text = report::render(&result, &label(&left), &label(&right));
            match report_path {
                Some(path) => {
                    tokio::fs::write(&path, text)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!(
                        "only left: {}, only right: {}, same: {}, differing: {}",
                        result.only_in_left_count(),
                        result.only_in_right_count(),
                        result.same_count(),
                        result.differing_count()
                    );
                    println!("Report written to {}", path.display());
                }
                None => print!("{text}"),
            }
            Ok(())
        }
        Command::Export {
            input,
            output,
            format,
            summary,
        } => {
            let document = load_playlist(&input).await?;
            if summary {
                print!("{}", document.summary().render());
                return Ok(());
            }
            match output {
                Some(path) => write_export(&document, format, &path).await?,
                None => print!("{}", export::render(&document, format)?),
            }
            Ok(())
        }
        Command::Dedup { input, output } => {
            let document = load_playlist_as(&input, PlaylistFormat::M3u).await?;
            let PlaylistDocument { header, records } = document;
            let (mut records, dedup_report) = dedup_by_url(records);
            renumber(&mut records);
            M3uWriter::new()
                .write_to(&PlaylistDocument::new(header, records), &output)
                .await?;
            print!("{}", dedup_report.render());
            Ok(())
        }
        Command::Coverage { dir } => {
            let files = discovery::list_files(&dir, &M3U_EXTENSIONS).await?;
            let stems: HashSet<String> = files.iter().filter_map(|p| discovery::stem_of(p)).collect();
            let operators = &app.config.coverage.operators;
            let regions = if app.config.coverage.regions.is_empty() {
                regions_from_stems(&files, operators)
            } else {
                app.config.coverage.regions.clone()
            };
            print!("{}", coverage::check(&regions, operators, &stems).render());
            Ok(())
        }
    }
}

async fn merge(app: &App, inputs: &[PathBuf], output: &Path, name: Option<String>) -> Result<()> {
    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        sources.push(load_playlist(input).await?.records);
    }

    let reconciliation = app.reconciler().merge_sources(sources);
    let mut records = reconciliation.records;
    if let Some(backfiller) = app.backfiller()? {
        backfiller.backfill(&mut records).await;
    }

    let header = PlaylistHeader::new(name.unwrap_or_default(), app.config.output.epg_url.clone());
    let document = PlaylistDocument::new(header, records);
    M3uWriter::new().write_to(&document, output).await?;

    println!(
        "Wrote {} channels to {} ({} duplicates removed)",
        document.len(),
        output.display(),
        reconciliation.dedup.duplicates()
    );
    Ok(())
}

async fn template_one(
    app: &App,
    template: &Path,
    source: &Path,
    output: &Path,
    mode: TemplateMode,
) -> Result<()> {
    let template_doc = load_playlist_as(template, PlaylistFormat::M3u).await?;
    let source_doc = load_playlist(source).await?;

    let PlaylistDocument { header, records } = template_doc;
    let reconciliation = app
        .reconciler()
        .merge_template(records, &source_doc.records, mode);
    let mut records = reconciliation.records;
    if let Some(backfiller) = app.backfiller()? {
        backfiller.backfill(&mut records).await;
    }

    let document = PlaylistDocument::new(header, records);
    M3uWriter::new().write_to(&document, output).await?;

    if let Some(stats) = &reconciliation.template {
        println!(
            "Matched {} of {} template channels, {} appended",
            stats.matched, stats.template_records, stats.appended
        );
    }
    println!("Wrote {} channels to {}", document.len(), output.display());
    Ok(())
}

fn print_failures(failed: &[batch::BatchFailure]) {
    for failure in failed {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.error);
    }
}

fn label(path: &Path) -> String {
    discovery::stem_of(path).unwrap_or_else(|| path.display().to_string())
}

/// Regions implied by existing `<region><operator>` playlist stems
fn regions_from_stems(files: &[PathBuf], operators: &[String]) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for stem in files.iter().filter_map(|p| discovery::stem_of(p)) {
        if let Some((region, _)) = coverage::split_stem(&stem, operators)
            && !regions.iter().any(|r| r == region)
        {
            regions.push(region.to_string());
        }
    }
    regions
}
