// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use folio_core::config::{DetectionConfig, Grouping, SplitMode, TrainingConfig};
use folio_core::diagnostics::humanize_error;
use folio_core::{CropBatch, CropSink, FolioConfig, GeometrySource, PageGeometry, SessionId};
use folio_document::integrity::{build_report, write_report};
use folio_document::{ImageDirectory, PdfCropWriter, PdfReader, WordGeometryFile};
use folio_engine::command::read_line;
use folio_engine::{
    AdjustmentSession, CropStrategy, PageImageSource, TrainPredictSession, TrainingEvent,
    TrainingPhase, plan,
};
use tracing::{info, warn};

use crate::cli::{Cli, Commands, OutputArgs, Preset, SplitArgs};

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => info_command(&input),

        Commands::Auto {
            input,
            words,
            preset,
            margin,
            output,
        } => {
            let detection = detection_config(&config, preset, margin);
            detection.validate()?;
            batch_command(&input, Some(&words), CropStrategy::PerPage(detection), &output)
        }

        Commands::Uniform {
            input,
            words,
            sample_size,
            single,
            output,
        } => {
            let mut aggregation = config.aggregation;
            if let Some(sample_size) = sample_size {
                aggregation.sample_size = sample_size;
            }
            if single {
                aggregation.grouping = Grouping::Single;
            }
            aggregation.validate()?;
            let strategy = CropStrategy::Uniform {
                detection: config.detection,
                aggregation,
            };
            batch_command(&input, Some(&words), strategy, &output)
        }

        Commands::Footnotes {
            input,
            words,
            min_gap,
            output,
        } => {
            let mut footnote = config.footnote;
            if let Some(min_gap) = min_gap {
                footnote.min_gap = min_gap;
            }
            footnote.validate()?;
            batch_command(&input, Some(&words), CropStrategy::Footnotes(footnote), &output)
        }

        Commands::Split {
            input,
            ratios,
            split,
            output,
        } => {
            let strategy = CropStrategy::Ratios {
                ratios,
                split: split_mode(config.training.split, split),
            };
            batch_command(&input, None, strategy, &output)
        }

        Commands::Manual { input, output } => manual_command(&input, output),

        Commands::Train {
            input,
            images,
            training_pages,
            split,
            output,
        } => {
            let mut training = config.training;
            if let Some(training_pages) = training_pages {
                training.training_pages = training_pages;
            }
            training.split = split_mode(training.split, split);
            training.validate()?;
            train_command(&input, &images, training, &output)
        }
    }
}

// -- Configuration ----------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<FolioConfig> {
    match path {
        Some(path) => FolioConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(FolioConfig::default()),
    }
}

fn detection_config(config: &FolioConfig, preset: Option<Preset>, margin: Option<f64>) -> DetectionConfig {
    let mut detection = match preset {
        Some(Preset::Standard) => DetectionConfig::standard(),
        Some(Preset::Relaxed) => DetectionConfig::relaxed_header(),
        None => config.detection,
    };
    if let Some(margin) = margin {
        detection.edge_margin = margin.max(0.0);
    }
    detection
}

fn split_mode(base: SplitMode, args: SplitArgs) -> SplitMode {
    SplitMode {
        cut_bottom: args.cut_bottom.unwrap_or(base.cut_bottom),
        keep_top: args.keep_top.unwrap_or(base.keep_top),
    }
}

/// `<dir>/<stem>_cropped.pdf` next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_cropped.pdf"))
}

// -- Subcommands ------------------------------------------------------------

fn info_command(input: &Path) -> Result<()> {
    let reader =
        PdfReader::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let pages = reader.pages()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}: {} pages", input.display(), pages.len())?;
    for page in &pages {
        let crop = page
            .crop_box
            .map(|rect| rect.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(out, "  page {:>4}  media {}  crop {}", page.page_index + 1, page.media_box, crop)?;
    }
    Ok(())
}

/// Run a non-interactive strategy and save the result.
fn batch_command(
    input: &Path,
    words: Option<&Path>,
    strategy: CropStrategy,
    output: &OutputArgs,
) -> Result<()> {
    let reader =
        PdfReader::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let pages = load_pages(&reader, words)?;

    let batch = plan(&pages, &strategy);
    let output_path = output.output.clone().unwrap_or_else(|| default_output(input));
    let mut writer = PdfCropWriter::new(reader, &output_path);
    writer
        .save(&batch)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    print_summary(&batch, &output_path)?;
    if let Some(report_path) = &output.report {
        save_report(input, strategy.name(), &batch, report_path)?;
    }
    Ok(())
}

fn manual_command(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let reader =
        PdfReader::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let pages = reader.pages()?;
    let output_path = output.unwrap_or_else(|| default_output(input));

    let mut session = AdjustmentSession::new(pages);
    let mut writer = PdfCropWriter::new(reader, &output_path);

    eprintln!(
        "Commands: l/r/t/b <value> (all pages), o <value> (odd pages), \
         <page><side><value> (one page), reset, exit"
    );
    let stdin = io::stdin();
    session.run(stdin.lock(), &mut writer, io::stdout().lock())?;
    info!(output = %output_path.display(), "manual session finished");
    Ok(())
}

fn train_command(
    input: &Path,
    images: &Path,
    training: TrainingConfig,
    output: &OutputArgs,
) -> Result<()> {
    let reader =
        PdfReader::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let source = ImageDirectory::open(images, training.display_width, training.display_height)
        .with_context(|| format!("failed to read page images from {}", images.display()))?;
    if source.page_count() != reader.page_count() {
        bail!(
            "{} has {} pages but {} contains {} page images",
            input.display(),
            reader.page_count(),
            images.display(),
            source.page_count()
        );
    }

    let mut session = TrainPredictSession::new(source, training)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    drive_training(&mut session, stdin.lock(), &mut stdout.lock())?;

    let ratios = session.finish();
    let pages = reader.pages()?;
    let strategy = CropStrategy::Ratios {
        ratios,
        split: training.split,
    };
    let batch = plan(&pages, &strategy);

    let output_path = output.output.clone().unwrap_or_else(|| default_output(input));
    let mut writer = PdfCropWriter::new(reader, &output_path);
    writer
        .save(&batch)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    print_summary(&batch, &output_path)?;
    if let Some(report_path) = &output.report {
        save_report(input, "train", &batch, report_path)?;
    }
    Ok(())
}

// -- Helpers ----------------------------------------------------------------

/// Page boxes from the PDF, words from the geometry file when given.
fn load_pages(reader: &PdfReader, words: Option<&Path>) -> Result<Vec<PageGeometry>> {
    match words {
        Some(path) => {
            let geometry = WordGeometryFile::load(path)
                .with_context(|| format!("failed to load word geometry {}", path.display()))?;
            Ok(geometry.with_page_boxes(reader)?.pages)
        }
        None => Ok(reader.pages()?),
    }
}

/// Feed `input` lines to `session` until it finishes or the input ends.
///
/// Lines that do not parse, including undecodable ones, are reported and
/// the same page is prompted again.
fn drive_training<S: PageImageSource, R: BufRead, W: Write>(
    session: &mut TrainPredictSession<S>,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    while let Some(page_index) = session.current_page() {
        prompt(session, page_index, out)?;
        let Some(line) = read_line(&mut input)? else {
            break;
        };
        let event = match TrainingEvent::parse(&line) {
            Ok(event) => event,
            Err(err) => {
                report_error(&err, out)?;
                continue;
            }
        };
        if let Err(err) = session.handle(event) {
            report_error(&err, out)?;
        }
    }
    Ok(())
}

fn prompt<S: PageImageSource>(
    session: &TrainPredictSession<S>,
    page_index: usize,
    out: &mut impl Write,
) -> Result<()> {
    let page = page_index + 1;
    match session.phase() {
        TrainingPhase::Training => {
            writeln!(out, "page {page}: click the crop row ('click <y>')")?;
        }
        TrainingPhase::Predicting => match session.predict() {
            Ok(prediction) => writeln!(
                out,
                "page {page}: predicted {:.4}, template match at {:.4} (score {:.3}); \
                 'confirm' or 'click <y>'",
                prediction.ratio, prediction.matched_ratio, prediction.score
            )?,
            Err(err) => {
                warn!(page, error = %err, "no template prediction");
                writeln!(
                    out,
                    "page {page}: predicted {:.4}; 'confirm' or 'click <y>'",
                    session.average().unwrap_or_default()
                )?;
                report_error(&err, out)?;
            }
        },
        TrainingPhase::Finished => {}
    }
    out.flush()?;
    Ok(())
}

fn report_error(err: &folio_core::FolioError, out: &mut impl Write) -> Result<()> {
    let human = humanize_error(err);
    writeln!(out, "{} {}", human.message, human.suggestion)?;
    Ok(())
}

fn print_summary(batch: &CropBatch, output_path: &Path) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "cropped {} of {} pages -> {}",
        batch.cropped_count(),
        batch.page_count(),
        output_path.display()
    )?;
    for diagnostic in &batch.diagnostics {
        writeln!(out, "  {diagnostic}")?;
    }
    Ok(())
}

fn save_report(input: &Path, strategy: &str, batch: &CropBatch, path: &Path) -> Result<()> {
    let report = build_report(SessionId::new(), input, strategy, batch)?;
    write_report(&report, path).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
