//! Stage composition.
//!
//! `run` wires Discovery → Relevance → Redaction → (optional Compression)
//! → Token Count → Budget → Render → Write, aggregating stats and per-stage
//! wall-clock timings. The pipeline never exits the process; the caller
//! maps `RunResult::exit_code` onto its own boundary. Nothing here is
//! process-global: two sequential runs are fully independent.

mod cancel;
mod compress;

pub use cancel::CancelToken;
pub use compress::{
    COMPRESSION_MARKER, CompressionOutput, CompressionStats, Compressor, Signature,
    SignatureKind, apply as apply_compression,
};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::budget::{BudgetEnforcer, BudgetOutcome, BudgetStrategy};
use crate::config::{Profile, ResolvedConfig};
use crate::descriptor::FileDescriptor;
use crate::discovery::{self, SkipStats};
use crate::error::Result;
use crate::language::LanguageRegistry;
use crate::output::{
    OutputTarget, RenderContext, Renderer, SidecarInputs, SummaryStats, TreeOptions,
    build_sidecar, content_fingerprint, file_hash, render_sidecar, render_tree, renderer_for,
    sidecar_path, write_atomic, write_output,
};
use crate::redact::{RedactionReport, Redactor};
use crate::relevance::TierMatcher;
use crate::tokenizer::{Tokenizer, count_all, create_tokenizer};
use crate::{EXIT_ERROR, EXIT_PARTIAL, EXIT_SUCCESS};

/// Which stages to execute. Defaults to all; profile switches still apply.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub struct Stages {
    pub redact: bool,
    pub compress: bool,
    pub enforce_budget: bool,
    pub write: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            redact: true,
            compress: true,
            enforce_budget: true,
            write: true,
        }
    }
}

/// Input to [`run`].
pub struct RunOptions {
    pub root: PathBuf,
    pub config: ResolvedConfig,
    /// Subcommand-level budget override.
    pub max_tokens_override: Option<i64>,
    /// Extra include globs restricting the run to matching paths.
    pub paths: Vec<String>,
    /// Caller-supplied clock; omitted from output when `None` so rendering
    /// stays deterministic.
    pub generated_at: Option<String>,
    pub stages: Stages,
    pub compressor: Option<Arc<dyn Compressor>>,
    /// Write a `.harvx/state/<profile>.json` snapshot after a successful run.
    pub write_state: bool,
    pub cancel: CancelToken,
}

impl RunOptions {
    #[must_use]
    pub fn new(root: PathBuf, config: ResolvedConfig) -> Self {
        Self {
            root,
            config,
            max_tokens_override: None,
            paths: Vec::new(),
            generated_at: None,
            stages: Stages::default(),
            compressor: None,
            write_state: false,
            cancel: CancelToken::new(),
        }
    }
}

/// Per-stage wall-clock timings, in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub discovery_ms: u128,
    pub relevance_ms: u128,
    pub redaction_ms: u128,
    pub compression_ms: u128,
    pub tokenize_ms: u128,
    pub budget_ms: u128,
    pub render_ms: u128,
    pub write_ms: u128,
    pub total_ms: u128,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetSummary {
    pub max_tokens: i64,
    pub overhead: usize,
    pub remaining: i64,
    pub truncated: Option<String>,
    pub excluded_files: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub total_files: usize,
    pub error_files: usize,
    pub total_tokens: usize,
    pub total_bytes: u64,
    pub tier_histogram: BTreeMap<u8, usize>,
    pub skipped: SkipStats,
    pub redactions: RedactionReport,
    pub tokenizer: String,
    pub compression: CompressionStats,
}

/// Output of [`run`].
pub struct RunResult {
    /// Included descriptors, relevance-ordered, contents processed.
    pub files: Vec<FileDescriptor>,
    /// Descriptors dropped for per-file errors (read failures).
    pub errors: Vec<FileDescriptor>,
    /// The rendered document.
    pub document: String,
    pub content_hash: String,
    pub stats: RunStats,
    pub budget: BudgetSummary,
    pub timings: StageTimings,
    pub warnings: Vec<String>,
    /// 0 success, 1 error (`fail_on_redaction`), 2 partial.
    pub exit_code: i32,
}

fn elapsed_ms(since: Instant) -> u128 {
    since.elapsed().as_millis()
}

/// Rendered document plus the figures derived alongside it.
struct Rendered {
    document: String,
    stats: SummaryStats,
    content_hash: String,
}

/// Everything the write stage needs, bundled to keep the call site flat.
struct WriteInputs<'a> {
    profile: &'a Profile,
    included: &'a [FileDescriptor],
    rendered: &'a Rendered,
    redactions: &'a RedactionReport,
    tokenizer_name: &'a str,
    max_tokens: i64,
    generation_time_ms: u128,
}

/// Execute the pipeline.
///
/// # Errors
/// Fatal configuration, root, git, tokenizer, write, and cancellation
/// errors. Per-file failures surface in `RunResult::errors` and exit
/// code 2 instead.
pub fn run(opts: &RunOptions) -> Result<RunResult> {
    let started = Instant::now();
    let mut timings = StageTimings::default();
    opts.cancel.check()?;

    let mut profile = opts.config.profile.clone();
    if !opts.paths.is_empty() {
        profile.include.extend(opts.paths.iter().cloned());
    }
    let max_tokens = opts.max_tokens_override.unwrap_or(profile.max_tokens);
    let mut warnings = opts.config.warnings.clone();

    let tokenizer = create_tokenizer(&profile.tokenizer)?;

    let (mut files, error_files, skipped) =
        discover_and_classify(opts, &profile, &mut warnings, &mut timings)?;
    let redactions = redact_files(opts, &profile, &mut files, &mut timings)?;
    let compression = compress_files(opts, &profile, &mut files, &mut timings)?;

    // The processed content is now final; fingerprint each file.
    for fd in &mut files {
        fd.content_hash = file_hash(&fd.content);
    }

    // Parallel token counting.
    let stage = Instant::now();
    count_all(&mut files, tokenizer.as_ref(), &opts.cancel)?;
    timings.tokenize_ms = elapsed_ms(stage);

    let (included, budget) =
        enforce_budget(opts, &profile, max_tokens, files, tokenizer.as_ref(), &mut timings);

    let rendered = render_document(
        opts,
        &profile,
        &included,
        &redactions,
        &skipped,
        tokenizer.name(),
        &mut timings,
    )?;

    write_outputs(
        opts,
        &WriteInputs {
            profile: &profile,
            included: &included,
            rendered: &rendered,
            redactions: &redactions,
            tokenizer_name: tokenizer.name(),
            max_tokens,
            generation_time_ms: elapsed_ms(started),
        },
        &mut timings,
    )?;

    if opts.write_state {
        crate::state::write_snapshot(
            &opts.root,
            &opts.config.profile_name,
            opts.generated_at.as_deref(),
            &included,
        )?;
    }

    timings.total_ms = elapsed_ms(started);

    let exit_code = if profile.redaction.fail_on_redaction && redactions.total > 0 {
        EXIT_ERROR
    } else if error_files.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    };

    tracing::info!(
        files = included.len(),
        tokens = rendered.stats.total_tokens,
        redactions = redactions.total,
        exit_code,
        "pipeline run complete"
    );

    Ok(RunResult {
        stats: RunStats {
            total_files: included.len(),
            error_files: error_files.len(),
            total_tokens: rendered.stats.total_tokens,
            total_bytes: rendered.stats.total_bytes,
            tier_histogram: rendered.stats.tier_histogram.clone(),
            skipped,
            redactions,
            tokenizer: tokenizer.name().to_string(),
            compression,
        },
        files: included,
        errors: error_files,
        document: rendered.document,
        content_hash: rendered.content_hash,
        budget,
        timings,
        warnings,
        exit_code,
    })
}

/// Discovery (phase 1 walk + phase 2 parallel load) followed by relevance:
/// partitions out per-file errors and returns the tier-sorted slice.
fn discover_and_classify(
    opts: &RunOptions,
    profile: &Profile,
    warnings: &mut Vec<String>,
    timings: &mut StageTimings,
) -> Result<(Vec<FileDescriptor>, Vec<FileDescriptor>, SkipStats)> {
    let registry = LanguageRegistry::default();
    let stage = Instant::now();
    let discovered = discovery::discover(&opts.root, profile, &registry, &opts.cancel)?;
    timings.discovery_ms = elapsed_ms(stage);
    warnings.extend(discovered.warnings.iter().cloned());
    let skipped = discovered.stats();

    let (ok_files, error_files): (Vec<FileDescriptor>, Vec<FileDescriptor>) = discovered
        .files
        .into_iter()
        .partition(|fd| fd.error.is_none());

    let stage = Instant::now();
    let matcher = TierMatcher::from_profile(profile)?;
    let files = matcher.sorted_by_relevance(&ok_files);
    timings.relevance_ms = elapsed_ms(stage);

    Ok((files, error_files, skipped))
}

/// Redaction, on the caller's thread.
fn redact_files(
    opts: &RunOptions,
    profile: &Profile,
    files: &mut [FileDescriptor],
    timings: &mut StageTimings,
) -> Result<RedactionReport> {
    if !(profile.redact && opts.stages.redact) {
        return Ok(RedactionReport::default());
    }
    let redactor = Redactor::from_config(&profile.redaction)?;
    let stage = Instant::now();
    for fd in files.iter_mut() {
        opts.cancel.check()?;
        let (content, matches) = redactor.redact_file(&fd.path, &fd.content);
        fd.content = content;
        fd.redactions = matches.len();
    }
    timings.redaction_ms = elapsed_ms(stage);
    Ok(redactor.report())
}

/// Optional structural compression through the external collaborator.
fn compress_files(
    opts: &RunOptions,
    profile: &Profile,
    files: &mut [FileDescriptor],
    timings: &mut StageTimings,
) -> Result<CompressionStats> {
    let stage = Instant::now();
    let stats = match (&opts.compressor, profile.compress && opts.stages.compress) {
        (Some(compressor), true) => {
            apply_compression(files, compressor.as_ref(), &opts.cancel)?
        }
        _ => CompressionStats::default(),
    };
    timings.compression_ms = elapsed_ms(stage);
    Ok(stats)
}

/// Budget enforcement over the relevance-sorted slice.
fn enforce_budget(
    opts: &RunOptions,
    profile: &Profile,
    max_tokens: i64,
    files: Vec<FileDescriptor>,
    tokenizer: &dyn Tokenizer,
    timings: &mut StageTimings,
) -> (Vec<FileDescriptor>, BudgetSummary) {
    let stage = Instant::now();
    let strategy = BudgetStrategy::parse(&profile.budget_strategy).unwrap_or_default();
    let effective_max = if opts.stages.enforce_budget { max_tokens } else { 0 };
    let outcome: BudgetOutcome =
        BudgetEnforcer::new(effective_max, strategy).enforce(files, tokenizer);
    timings.budget_ms = elapsed_ms(stage);

    let budget = BudgetSummary {
        max_tokens,
        overhead: outcome.overhead,
        remaining: outcome.budget_remaining,
        truncated: outcome.truncated,
        excluded_files: outcome.excluded.len(),
    };
    (outcome.included, budget)
}

/// Build the tree, fingerprint, and render the document.
fn render_document(
    opts: &RunOptions,
    profile: &Profile,
    included: &[FileDescriptor],
    redactions: &RedactionReport,
    skipped: &SkipStats,
    tokenizer_name: &str,
    timings: &mut StageTimings,
) -> Result<Rendered> {
    let stage = Instant::now();
    opts.cancel.check()?;
    let stats = SummaryStats::from_files(included, redactions.total, skipped.total);
    let tree = render_tree(
        included,
        &TreeOptions {
            annotate: false,
            max_depth: profile.tree_depth,
        },
    );
    let content_hash = content_fingerprint(included);
    let project = project_name(&opts.root);
    let renderer = renderer_for(&profile.format);
    let document = renderer.render(&RenderContext {
        project: &project,
        generated_at: opts.generated_at.as_deref(),
        profile_name: &opts.config.profile_name,
        tokenizer_name,
        content_hash: &content_hash,
        files: included,
        stats: &stats,
        tree: &tree,
        line_numbers: profile.line_numbers,
    });
    timings.render_ms = elapsed_ms(stage);
    Ok(Rendered {
        document,
        stats,
        content_hash,
    })
}

/// Write the document (and sidecar) atomically to the selected target.
fn write_outputs(
    opts: &RunOptions,
    inputs: &WriteInputs<'_>,
    timings: &mut StageTimings,
) -> Result<()> {
    let stage = Instant::now();
    opts.cancel.check()?;
    let target = output_target(inputs.profile);
    if opts.stages.write
        && let Some(target) = &target
    {
        write_output(target, inputs.rendered.document.as_bytes())?;
        if inputs.profile.metadata
            && let OutputTarget::File(path) = target
        {
            let sidecar = build_sidecar(&SidecarInputs {
                files: inputs.included,
                stats: &inputs.rendered.stats,
                redaction: inputs.redactions,
                generated_at: opts.generated_at.as_deref(),
                profile: &opts.config.profile_name,
                tokenizer: inputs.tokenizer_name,
                format: &inputs.profile.format,
                target: &inputs.profile.target,
                content_hash: &inputs.rendered.content_hash,
                max_tokens: inputs.max_tokens,
                generation_time_ms: inputs.generation_time_ms,
            });
            write_atomic(&sidecar_path(path), render_sidecar(&sidecar)?.as_bytes())?;
        }
    }
    timings.write_ms = elapsed_ms(stage);
    Ok(())
}

fn project_name(root: &std::path::Path) -> String {
    let canonical = dunce::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    canonical
        .file_name()
        .map_or_else(|| "repository".to_string(), |n| n.to_string_lossy().into_owned())
}

fn output_target(profile: &Profile) -> Option<OutputTarget> {
    if profile.stdout {
        Some(OutputTarget::Stdout)
    } else {
        profile
            .output
            .as_ref()
            .map(|path| OutputTarget::File(PathBuf::from(path)))
    }
}
