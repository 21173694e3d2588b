// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definition.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about = "Crop scanned book PDFs to their main text", long_about = None)]
pub struct Cli {
    /// Configuration file (JSON); missing sections use defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show page count, media box and crop box of every page
    Info {
        /// Input PDF file path
        input: PathBuf,
    },

    /// Crop every page to its own detected main-text box
    Auto {
        /// Input PDF file path
        input: PathBuf,

        /// Word geometry JSON for the same PDF
        #[arg(long)]
        words: PathBuf,

        /// Header/footer band preset
        #[arg(long, value_enum)]
        preset: Option<Preset>,

        /// Padding around the detected text, in points
        #[arg(long)]
        margin: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Crop all pages to the median text box of a sample, per page parity
    Uniform {
        /// Input PDF file path
        input: PathBuf,

        /// Word geometry JSON for the same PDF
        #[arg(long)]
        words: PathBuf,

        /// Number of leading pages to sample
        #[arg(long)]
        sample_size: Option<usize>,

        /// Use one box for all pages instead of one per parity
        #[arg(long)]
        single: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Cut away the footnote block at the bottom of each page
    Footnotes {
        /// Input PDF file path
        input: PathBuf,

        /// Word geometry JSON for the same PDF
        #[arg(long)]
        words: PathBuf,

        /// Smallest line gap accepted as a footnote separator, in points
        #[arg(long)]
        min_gap: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Split each page at a given fraction of its height
    Split {
        /// Input PDF file path
        input: PathBuf,

        /// One ratio per page, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ratios: Vec<f64>,

        #[command(flatten)]
        split: SplitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Adjust margins interactively with commands read from stdin
    Manual {
        /// Input PDF file path
        input: PathBuf,

        /// Output PDF (default: <input>_cropped.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Click the crop row on the first pages, then confirm predictions
    Train {
        /// Input PDF file path
        input: PathBuf,

        /// Directory with one rendered image per page
        #[arg(long)]
        images: PathBuf,

        /// Number of pages clicked before prediction starts
        #[arg(long)]
        training_pages: Option<usize>,

        #[command(flatten)]
        split: SplitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output PDF (default: <input>_cropped.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON crop report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct SplitArgs {
    /// Measure the ratio from the bottom edge (true) or the top edge (false)
    #[arg(long, action = ArgAction::Set)]
    pub cut_bottom: Option<bool>,

    /// Keep the part above the split line (true) or below it (false)
    #[arg(long, action = ArgAction::Set)]
    pub keep_top: Option<bool>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// 10% header and footer bands, small-font filtering, 3pt padding
    Standard,
    /// 5% header band, no font filtering, no padding
    Relaxed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn split_parses_ratio_list_and_flags() {
        let cli = Cli::try_parse_from([
            "folio", "split", "book.pdf", "--ratios", "0.1,0.2,0.3", "--cut-bottom", "false",
        ])
        .expect("valid");
        match cli.command {
            Commands::Split { ratios, split, .. } => {
                assert_eq!(ratios, vec![0.1, 0.2, 0.3]);
                assert_eq!(split.cut_bottom, Some(false));
                assert_eq!(split.keep_top, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["folio", "info", "book.pdf", "--config", "folio.json"])
            .expect("valid");
        assert_eq!(cli.config, Some(PathBuf::from("folio.json")));
    }

    #[test]
    fn auto_requires_word_geometry() {
        assert!(Cli::try_parse_from(["folio", "auto", "book.pdf"]).is_err());
    }
}
