use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::FeatureRecord;

#[derive(Parser, Debug)]
#[command(version, about = "Predict m6A modification sites with a pre-trained random forest", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubArgs,

    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "PATH",
        help = "JSON configuration file (model path, threshold, output directory)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum SubArgs {
    /// Score every row of a feature CSV
    #[command(name = "batch")]
    Batch {
        #[command(flatten)]
        args: BatchArgs,
    },
    /// Score a single site given on the command line
    #[command(name = "single")]
    Single {
        #[command(flatten)]
        args: SingleArgs,
    },
    /// Print a summary of a serialized model
    #[command(name = "inspect")]
    Inspect {
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Debug, Parser)]
pub struct ModelArgs {
    #[arg(
        short = 'm',
        long = "model",
        required = false,
        value_name = "PATH",
        help = "Path to the random forest JSON [overrides config]"
    )]
    pub model: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "threshold",
        required = false,
        value_name = "PROB",
        help = "Probability above which a site is called Positive [overrides config]"
    )]
    pub threshold: Option<f64>,
}

#[derive(Debug, Parser)]
pub struct BatchArgs {
    #[arg(
        short = 'i',
        long = "input",
        required = true,
        value_name = "PATH",
        help = "CSV with gc_content, RNA_type, RNA_region, exon_length, distance_to_junction, evolutionary_conservation and DNA_5mer"
    )]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        required = false,
        value_name = "PATH",
        help = "Output CSV [default: <output_dir>/<input stem>_predictions.csv]"
    )]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Parser)]
pub struct SingleArgs {
    #[arg(long = "gc-content", value_name = "FLOAT")]
    pub gc_content: f64,

    #[arg(long = "rna-type", value_name = "TYPE", help = "mRNA, lincRNA, lncRNA or pseudogene")]
    pub rna_type: String,

    #[arg(long = "rna-region", value_name = "REGION", help = "CDS, intron, 3'UTR or 5'UTR")]
    pub rna_region: String,

    #[arg(long = "exon-length", value_name = "FLOAT")]
    pub exon_length: f64,

    #[arg(long = "distance-to-junction", value_name = "FLOAT")]
    pub distance_to_junction: f64,

    #[arg(long = "evolutionary-conservation", value_name = "FLOAT")]
    pub evolutionary_conservation: f64,

    #[arg(long = "dna-5mer", value_name = "SEQ")]
    pub dna_5mer: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl SingleArgs {
    pub fn record(&self) -> FeatureRecord {
        FeatureRecord {
            gc_content: self.gc_content,
            rna_type: self.rna_type.clone(),
            rna_region: self.rna_region.clone(),
            exon_length: self.exon_length,
            distance_to_junction: self.distance_to_junction,
            evolutionary_conservation: self.evolutionary_conservation,
            dna_5mer: self.dna_5mer.clone(),
        }
    }
}
