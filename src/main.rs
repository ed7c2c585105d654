//! tumorscope CLI: MRI tumor classification from intensity-cluster features.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tumorscope::dataset::discover;
use tumorscope::features::{
    extract_features, image_elbow_curve, render_cluster_map, ClusterCountPolicy, FeatureConfig,
};
use tumorscope::imaging::{augment_class, load_grayscale, save_image};
use tumorscope::model_selection::shuffle_indices;
use tumorscope::pipeline::{Pipeline, PipelineConfig, ThresholdPolicy};
use tumorscope::{kneedle, logging, TumorscopeError};

/// CLI error types
#[derive(Error, Debug)]
enum CliError {
    /// Library failure
    #[error("{0}")]
    Tumorscope(#[from] TumorscopeError),

    /// Logging could not be installed
    #[error("{0}")]
    Logging(#[from] logging::LoggingError),

    /// Invalid combination of arguments
    #[error("Invalid arguments: {0}")]
    Usage(String),
}

type Result<T> = std::result::Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tumorscope")]
#[command(about = "Classify MRI scans as tumor / non-tumor from intensity-cluster features")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: augment, split, extract, train, evaluate
    Run {
        /// JSON configuration file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory of tumor scans
        #[arg(long)]
        tumor: Option<PathBuf>,

        /// Directory of non-tumor scans
        #[arg(long)]
        healthy: Option<PathBuf>,

        /// Output root for augmented images
        #[arg(long)]
        augmented: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Fixed number of intensity clusters
        #[arg(short, long, conflicts_with = "elbow")]
        k: Option<usize>,

        /// Choose k from the elbow curve instead of a fixed value
        #[arg(long)]
        elbow: bool,

        /// Round cap for the validation-monitored fit
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Fixed decision threshold
        #[arg(long, conflicts_with = "tune_threshold")]
        threshold: Option<f32>,

        /// Tune the decision threshold on the validation split
        #[arg(long)]
        tune_threshold: bool,

        /// Write the feature table as CSV
        #[arg(long)]
        features_csv: Option<PathBuf>,

        /// Write the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write flipped and rotated copies of every image in a directory
    Augment {
        /// Source directory
        #[arg(short, long)]
        input: PathBuf,

        /// Destination directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the k-means elbow curve and its knee
    Elbow {
        /// Directory of tumor scans
        #[arg(long)]
        tumor: PathBuf,

        /// Directory of non-tumor scans
        #[arg(long)]
        healthy: PathBuf,

        /// Largest k on the curve
        #[arg(long, default_value = "10")]
        max_k: usize,

        /// Number of images sampled for the curve
        #[arg(long, default_value = "20")]
        sample: usize,

        /// k-means++ restarts per image
        #[arg(long, default_value = "50")]
        restarts: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Render an image with every pixel replaced by its cluster's mean intensity
    Cluster {
        /// Image to cluster
        image: PathBuf,

        /// Output image
        #[arg(short, long)]
        output: PathBuf,

        /// Number of clusters
        #[arg(short, default_value = "3")]
        k: usize,

        /// k-means++ restarts
        #[arg(long, default_value = "50")]
        restarts: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = logging::init(if cli.verbose { "debug" } else { "info" })
        .map_err(CliError::from)
        .and_then(|()| match cli.command {
            Commands::Run {
                config,
                tumor,
                healthy,
                augmented,
                seed,
                k,
                elbow,
                max_rounds,
                threshold,
                tune_threshold,
                features_csv,
                report,
            } => {
                let overrides = RunOverrides {
                    tumor,
                    healthy,
                    augmented,
                    seed,
                    k,
                    elbow,
                    max_rounds,
                    threshold,
                    tune_threshold,
                    features_csv,
                    report,
                };
                cmd_run(config.as_deref(), overrides)
            }
            Commands::Augment { input, output } => cmd_augment(&input, &output),
            Commands::Elbow {
                tumor,
                healthy,
                max_k,
                sample,
                restarts,
                seed,
            } => cmd_elbow(&[tumor, healthy], max_k, sample, restarts, seed),
            Commands::Cluster {
                image,
                output,
                k,
                restarts,
                seed,
            } => cmd_cluster(&image, &output, k, restarts, seed),
        });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// `run` flags that override the config file.
struct RunOverrides {
    tumor: Option<PathBuf>,
    healthy: Option<PathBuf>,
    augmented: Option<PathBuf>,
    seed: Option<u64>,
    k: Option<usize>,
    elbow: bool,
    max_rounds: Option<usize>,
    threshold: Option<f32>,
    tune_threshold: bool,
    features_csv: Option<PathBuf>,
    report: Option<PathBuf>,
}

impl RunOverrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(dir) = self.tumor {
            config.tumor_dir = dir;
        }
        if let Some(dir) = self.healthy {
            config.healthy_dir = dir;
        }
        if let Some(dir) = self.augmented {
            config.augmented_dir = dir;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(k) = self.k {
            config.cluster_count = ClusterCountPolicy::Fixed(k);
        }
        if self.elbow {
            config.cluster_count = ClusterCountPolicy::Elbow;
        }
        if let Some(rounds) = self.max_rounds {
            config.boosting.max_rounds = rounds;
        }
        if let Some(t) = self.threshold {
            config.threshold = ThresholdPolicy::Fixed(t);
        }
        if self.tune_threshold {
            config.threshold = ThresholdPolicy::TuneOnValidation;
        }
        if self.features_csv.is_some() {
            config.features_csv = self.features_csv;
        }
        if self.report.is_some() {
            config.report_path = self.report;
        }
    }
}

fn cmd_run(config_path: Option<&Path>, overrides: RunOverrides) -> Result<()> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    overrides.apply(&mut config);

    let report = Pipeline::new(config).run()?;
    println!("{report}");
    Ok(())
}

fn cmd_augment(input: &Path, output: &Path) -> Result<()> {
    let sources = discover(input)?;
    let written = augment_class(&sources, output)?;
    println!(
        "Augmented {} images into {} files in {}",
        sources.len(),
        written.len(),
        output.display()
    );
    Ok(())
}

fn cmd_elbow(
    dirs: &[PathBuf],
    max_k: usize,
    sample: usize,
    restarts: usize,
    seed: u64,
) -> Result<()> {
    if max_k == 0 || sample == 0 {
        return Err(CliError::Usage("--max-k and --sample must be >= 1".into()));
    }

    let mut paths = Vec::new();
    for dir in dirs {
        paths.extend(discover(dir)?);
    }
    let images = shuffle_indices(paths.len(), seed)
        .into_iter()
        .take(sample)
        .map(|i| load_grayscale(&paths[i]))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let curve = image_elbow_curve(&images, max_k, seed, restarts)?;
    println!("Elbow curve ({} images)", images.len());
    println!("  k   mean inertia");
    for p in &curve {
        println!("  {:<3} {:.2}", p.k, p.mean_inertia);
    }
    match kneedle(&curve) {
        Some(k) => println!("Knee at k = {k}"),
        None => println!("No knee found"),
    }
    Ok(())
}

fn cmd_cluster(image: &Path, output: &Path, k: usize, restarts: usize, seed: u64) -> Result<()> {
    let gray = load_grayscale(image)?;
    let config = FeatureConfig {
        n_clusters: k,
        n_init: restarts,
        seed,
    };
    let features = extract_features(&gray, &config)?;
    save_image(
        &image::DynamicImage::ImageLuma8(render_cluster_map(&features)),
        output,
    )?;

    println!("Clusters of {} (darkest first):", image.display());
    for (i, c) in features.clusters().iter().enumerate() {
        println!(
            "  {i}: {:>7} px  intensity {:>6.1}  centroid ({:.1}, {:.1})",
            c.size, c.intensity, c.x, c.y
        );
    }
    println!("Wrote {}", output.display());
    Ok(())
}
