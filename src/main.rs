use std::path::PathBuf;

use clap::Parser;
use review_cloud::app::{LoadOptions, ReviewCloudApp};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON term file; a demo corpus is generated when omitted.
    #[arg(long)]
    terms: Option<PathBuf>,

    /// Seed for the demo corpus and the layout jitter.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file overriding layout constants.
    #[arg(long)]
    layout_params: Option<PathBuf>,

    /// Open the first cloud in expanded view.
    #[arg(long)]
    expanded: bool,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("review_cloud=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_tracing();

    let load_options = LoadOptions {
        terms_path: args.terms,
        params_path: args.layout_params,
        seed: args.seed,
        start_expanded: args.expanded,
    };
    tracing::info!(?load_options, "starting review cloud dashboard");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "review-cloud",
        options,
        Box::new(move |cc| Ok(Box::new(ReviewCloudApp::new(cc, load_options.clone())))),
    )
}
