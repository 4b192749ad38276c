//! restitch CLI - document reconstruction from page-extracted content

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use restitch::{
    render, FixerOptions, PageContent, PageStore, Pipeline, PipelineOptions, PromoteOptions,
    RenderOptions, StoredPages, StructureFixer,
};

#[derive(Parser)]
#[command(name = "restitch")]
#[command(version)]
#[command(about = "Reconstruct reading-ordered documents from page-extracted content", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a directory of per-page content files into a reconstructed document
    Process {
        /// Directory holding page_<n>_content.json files
        #[arg(value_name = "CONTENT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "output")]
        output: PathBuf,

        /// Produce the cross-page merged view alongside per-page output
        #[arg(long)]
        merge: bool,

        /// Skip key-value table promotion
        #[arg(long)]
        no_promote: bool,

        /// Omit embedded styles from generated HTML
        #[arg(long)]
        no_styles: bool,

        /// Maximum parallel page workers
        #[arg(long, default_value = "4")]
        workers: usize,

        /// Section heading lookahead window
        #[arg(long, default_value = "2")]
        lookahead: usize,

        /// Split-table merge gap in percentage points
        #[arg(long, default_value = "5.0")]
        merge_gap: f32,

        /// Minimum records for key-value promotion
        #[arg(long, default_value = "2")]
        min_records: usize,

        /// Document title for the rendered HTML
        #[arg(long)]
        title: Option<String>,
    },

    /// Repair one page's structure and print or write the fixed JSON
    Fix {
        /// Page content JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Section heading lookahead window
        #[arg(long, default_value = "2")]
        lookahead: usize,

        /// Split-table merge gap in percentage points
        #[arg(long, default_value = "5.0")]
        merge_gap: f32,
    },

    /// Render one page's content JSON to HTML
    Render {
        /// Page content JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Omit embedded styles
        #[arg(long)]
        no_styles: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            merge,
            no_promote,
            no_styles,
            workers,
            lookahead,
            merge_gap,
            min_records,
            title,
        } => process_dir(
            input,
            output,
            merge,
            no_promote,
            no_styles,
            workers,
            lookahead,
            merge_gap,
            min_records,
            title,
        ),
        Commands::Fix {
            input,
            output,
            lookahead,
            merge_gap,
        } => fix_file(input, output, lookahead, merge_gap),
        Commands::Render {
            input,
            output,
            no_styles,
        } => render_file(input, output, no_styles),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn process_dir(
    input: PathBuf,
    output: PathBuf,
    merge: bool,
    no_promote: bool,
    no_styles: bool,
    workers: usize,
    lookahead: usize,
    merge_gap: f32,
    min_records: usize,
    title: Option<String>,
) -> restitch::Result<()> {
    let stored = StoredPages::new(&input)?;
    let page_nums = stored.page_numbers()?;
    if page_nums.is_empty() {
        return Err(restitch::Error::Store(format!(
            "no page_<n>_content.json files in {}",
            input.display()
        )));
    }

    println!(
        "{} {} pages from {}",
        "Processing".green().bold(),
        page_nums.len(),
        input.display()
    );

    let options = PipelineOptions::new()
        .with_max_workers(workers)
        .with_promotion(!no_promote)
        .with_page_merging(merge)
        .with_fixer(
            FixerOptions::new()
                .with_lookahead(lookahead)
                .with_merge_gap(merge_gap),
        )
        .with_promoter(PromoteOptions::new().with_min_records(min_records));

    let pipeline = Pipeline::with_options(options);
    let run = pipeline.run(&stored, &page_nums)?;

    let mut render_options = RenderOptions::new().with_styles(!no_styles);
    if let Some(title) = title {
        render_options = render_options.with_title(title);
    }

    fs::create_dir_all(&output)?;
    let pb = ProgressBar::new(run.document.pages.len() as u64 + 2);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Per-page HTML
    for page in &run.document.pages {
        pb.set_message(format!("page {}", page.page_num));
        let html = render::to_page_html(page, &render_options)?;
        fs::write(output.join(format!("page_{}.html", page.page_num)), html)?;
        pb.inc(1);
    }

    // Combined flowing document
    pb.set_message("document");
    let html = render::to_document_html(&run.document, &render_options)?;
    fs::write(output.join("reconstructed_document.html"), html)?;
    pb.inc(1);

    // Merged logical view
    if let Some(view) = &run.document.merged {
        let json = serde_json::to_string_pretty(view)
            .map_err(|e| restitch::Error::Render(e.to_string()))?;
        fs::write(output.join("merged_content.json"), json)?;

        let html = render::to_merged_html(view, &render_options)?;
        fs::write(output.join("merged_document.html"), html)?;
        println!(
            "  {} {} logical items span {} pages",
            "merged:".cyan(),
            view.len(),
            view.total_pages
        );
    }

    // Processing report
    pb.set_message("report");
    let summary = run.summary();
    let report = serde_json::to_string_pretty(&summary)
        .map_err(|e| restitch::Error::Render(e.to_string()))?;
    fs::write(output.join("processing_report.json"), report)?;
    pb.inc(1);
    pb.finish_and_clear();

    let failed = summary.pages.iter().filter(|p| p.failed).count();
    println!(
        "{} {} pages, {} fragments, {} tables, {} images",
        "Done:".green().bold(),
        summary.total_pages,
        summary.total_fragments,
        summary.total_tables,
        summary.total_images
    );
    if failed > 0 {
        println!(
            "{} {} pages degraded to empty content (see processing_report.json)",
            "warning:".yellow().bold(),
            failed
        );
    }
    println!("Output written to {}", output.display());

    Ok(())
}

fn fix_file(
    input: PathBuf,
    output: Option<PathBuf>,
    lookahead: usize,
    merge_gap: f32,
) -> restitch::Result<()> {
    let page = load_page(&input)?;

    let fixer = StructureFixer::with_options(
        FixerOptions::new()
            .with_lookahead(lookahead)
            .with_merge_gap(merge_gap),
    );
    let fixed = fixer.fix_page(&page);

    let json = serde_json::to_string_pretty(&fixed)
        .map_err(|e| restitch::Error::Store(e.to_string()))?;

    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!(
                "{} fixed page written to {}",
                "Done:".green().bold(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn render_file(
    input: PathBuf,
    output: Option<PathBuf>,
    no_styles: bool,
) -> restitch::Result<()> {
    let page = load_page(&input)?;
    let options = RenderOptions::new().with_styles(!no_styles);
    let html = render::to_page_html(&page, &options)?;

    match output {
        Some(path) => {
            fs::write(&path, html)?;
            println!(
                "{} HTML written to {}",
                "Done:".green().bold(),
                path.display()
            );
        }
        None => println!("{}", html),
    }

    Ok(())
}

/// Load one page file, inferring the page number from the store's naming
/// scheme when present.
fn load_page(input: &PathBuf) -> restitch::Result<PageContent> {
    let raw = fs::read_to_string(input)?;
    let page_num = input
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(page_num_from_name)
        .unwrap_or(1);
    restitch::parse_page_payload(&raw, page_num)
}

fn page_num_from_name(name: &str) -> Option<u32> {
    name.strip_prefix("page_")?
        .strip_suffix("_content.json")?
        .parse()
        .ok()
}
