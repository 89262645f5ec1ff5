use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::errors::Diagnostic;
use crate::export::Exporter;
use crate::file_utils::{ASS_EXTENSION, FileManager};
use crate::pipeline::{self, FileState};
use crate::text_reader;

// @module: Batch controller for ASS processing jobs

/// Name of the directory created inside an input directory when no usable
/// output directory is configured
pub const DEFAULT_OUTPUT_DIR: &str = "new";

/// Counters collected over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files processed successfully by a job
    pub processed: usize,
    /// Files skipped without being processed
    pub skipped: usize,
    /// Files that failed with a fatal error
    pub failed: usize,
    /// Output files written
    pub outputs_written: usize,
    /// Non-fatal diagnostics reported
    pub diagnostics: usize,
}

impl RunSummary {
    fn merge(&mut self, other: RunSummary) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.outputs_written += other.outputs_written;
        self.diagnostics += other.diagnostics;
    }
}

/// Main application controller for batch jobs
pub struct Controller {
    /// App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every enabled job over every configured input
    ///
    /// A failing file is logged and counted; the batch carries on with the
    /// next file.
    pub fn run(&self) -> Result<RunSummary> {
        if !self.config.export.enabled && !self.config.delete.enabled {
            return Err(anyhow!("No job enabled: use the export and/or delete options"));
        }

        let start_time = std::time::Instant::now();
        let exporter = Exporter::new(self.config.export_options());
        let sections = self.config.sections_to_delete();
        let mut summary = RunSummary::default();

        if self.config.limited_output && self.config.outputs.is_empty() {
            warn!("At least one output must be specified, limited output is ignored");
        }

        for (index, input) in self.config.inputs.iter().enumerate() {
            let (input_dir, files) = match Self::collect_inputs(input) {
                Ok(found) => found,
                Err(e) => {
                    error!("{}", e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if files.is_empty() {
                warn!("No .{} files found in {}", ASS_EXTENSION, input.display());
                continue;
            }

            let output_dir = if self.needs_output_dir() {
                match self.resolve_output_dir(index, &input_dir) {
                    Ok(dir) => dir,
                    Err(e) => {
                        error!("{:#}", e);
                        summary.skipped += files.len();
                        continue;
                    }
                }
            } else {
                input_dir.clone()
            };
            info!("Processing {} file(s) from {}", files.len(), input_dir.display());
            summary.merge(self.process_files(&files, &input_dir, &output_dir, &exporter, &sections));
        }

        info!(
            "Batch completed in {:.2}s: {} processed, {} skipped, {} errors, {} file(s) written, {} warning(s)",
            start_time.elapsed().as_secs_f64(),
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.outputs_written,
            summary.diagnostics
        );

        Ok(summary)
    }

    /// Resolve an input path to its directory and the subtitle files to process
    fn collect_inputs(input: &Path) -> Result<(PathBuf, Vec<PathBuf>)> {
        if FileManager::dir_exists(input) {
            let files = FileManager::find_files(input, ASS_EXTENSION)?;
            return Ok((input.to_path_buf(), files));
        }
        if FileManager::file_exists(input) {
            let dir = input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok((dir, vec![input.to_path_buf()]));
        }
        Err(anyhow!("Input: \"{}\" does not exist", input.display()))
    }

    /// Whether any enabled job writes into an output directory
    ///
    /// Deletion with overwrite writes back over its inputs.
    pub fn needs_output_dir(&self) -> bool {
        self.config.export.enabled || (self.config.delete.enabled && !self.config.delete.overwrite)
    }

    /// Pick the output directory for the input at `index`
    ///
    /// Outputs pair with inputs by position. A missing or nonexistent output
    /// falls back to `<input_dir>/new`, which is created when needed.
    pub fn resolve_output_dir(&self, index: usize, input_dir: &Path) -> Result<PathBuf> {
        let configured = if self.config.limited_output {
            self.config.outputs.first()
        } else {
            self.config.outputs.get(index)
        };

        match configured {
            Some(dir) if FileManager::dir_exists(dir) => Ok(dir.clone()),
            Some(dir) => {
                let fallback = input_dir.join(DEFAULT_OUTPUT_DIR);
                warn!(
                    "Output directory {} doesn't exist, using {} instead",
                    dir.display(),
                    fallback.display()
                );
                FileManager::ensure_dir(&fallback)?;
                Ok(fallback)
            }
            None => {
                let fallback = input_dir.join(DEFAULT_OUTPUT_DIR);
                warn!("Not enough outputs configured, using {} instead", fallback.display());
                FileManager::ensure_dir(&fallback)?;
                Ok(fallback)
            }
        }
    }

    fn process_files(
        &self,
        files: &[PathBuf],
        input_dir: &Path,
        output_dir: &Path,
        exporter: &Exporter,
        sections: &HashSet<String>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        let progress_bar = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for file in files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(format!("Processing: {}", file_name));

            if self.config.export.enabled {
                match self.export_file(file, output_dir, exporter) {
                    Ok(file_summary) => summary.merge(file_summary),
                    Err(e) => {
                        error!("Error exporting {}: {:#}", file_name, e);
                        summary.failed += 1;
                    }
                }
            }

            if self.config.delete.enabled {
                match self.delete_file(file, input_dir, output_dir, sections) {
                    Ok(file_summary) => summary.merge(file_summary),
                    Err(e) => {
                        error!("Error deleting sections in {}: {:#}", file_name, e);
                        summary.failed += 1;
                    }
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();
        summary
    }

    /// Export the events of one file into text files inside `output_dir`
    pub fn export_file(&self, input_file: &Path, output_dir: &Path, exporter: &Exporter) -> Result<RunSummary> {
        let context = input_file.display().to_string();
        let source = text_reader::decode(&FileManager::read_bytes(input_file)?)?;
        debug!("{}: decoded as {}", context, source.encoding.name());

        let mut outcome = pipeline::export_text(&source, &FileManager::file_stem(input_file), &context, exporter)?;

        for output in &outcome.files {
            let path = output_dir.join(&output.file_name);
            FileManager::write_bytes(&path, &output.bytes)?;
            debug!("Wrote {} event(s) to {}", output.record_count, path.display());
        }
        outcome.state.advance(FileState::Written, &context);

        Self::report(&outcome.diagnostics);
        info!("Exported {} file(s) from {}", outcome.files.len(), context);

        Ok(RunSummary {
            processed: 1,
            outputs_written: outcome.files.len(),
            diagnostics: outcome.diagnostics.len(),
            ..Default::default()
        })
    }

    /// Remove the configured sections from one file
    ///
    /// Writes `<stem><name_tail>.ass` into `output_dir`, or back over the
    /// input when overwriting is enabled. Writing onto the input file without
    /// the overwrite option is refused.
    pub fn delete_file(
        &self,
        input_file: &Path,
        input_dir: &Path,
        output_dir: &Path,
        sections: &HashSet<String>,
    ) -> Result<RunSummary> {
        let context = input_file.display().to_string();

        let output_path = if self.config.delete.overwrite {
            input_file.to_path_buf()
        } else {
            let path = FileManager::generate_output_path(
                input_file,
                output_dir,
                &self.config.delete.name_tail,
                ASS_EXTENSION,
            );
            if FileManager::same_path(&path, input_file) {
                error!(
                    "{}: attempt to overwrite the input in {} refused, enable overwrite to allow it",
                    context,
                    input_dir.display()
                );
                return Ok(RunSummary {
                    skipped: 1,
                    ..Default::default()
                });
            }
            path
        };

        let source = text_reader::decode(&FileManager::read_bytes(input_file)?)?;
        let mut outcome = pipeline::delete_text(
            &source,
            sections,
            self.config.output.keep_source_encoding,
            &context,
        )?;

        FileManager::write_bytes(&output_path, &outcome.bytes)?;
        outcome.state.advance(FileState::Written, &context);

        Self::report(&outcome.diagnostics);
        info!(
            "Removed {} section(s): {}",
            outcome.removed_sections,
            output_path.display()
        );

        Ok(RunSummary {
            processed: 1,
            outputs_written: 1,
            diagnostics: outcome.diagnostics.len(),
            ..Default::default()
        })
    }

    fn report(diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            warn!("{}", diagnostic);
        }
    }
}
