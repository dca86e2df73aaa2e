//! The per-line redaction scanner.
//!
//! Order per line: keyword pre-filter, rule regexes at or above the active
//! confidence threshold, then entropy over the value side of suspicious
//! assignments. Multi-line PEM blocks collapse to a single marker. Spans
//! already holding a marker are never re-scanned, which makes the whole
//! transform idempotent.

use std::sync::atomic::{AtomicUsize, Ordering};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::Gitignore;
use indexmap::IndexMap;
use regex::Regex;

use crate::config::RedactionConfig;
use crate::discovery::sensitive_matcher;
use crate::error::{HarvxError, Result};

use super::entropy::{MIN_TOKEN_LEN, is_high_entropy};
use super::rules::{
    Confidence, HIGH_ENTROPY_TYPE, PRIVATE_KEY_BLOCK_TYPE, RedactionRule, builtin_rules,
};

/// Identifier substrings marking an assignment as suspicious.
const SUSPICIOUS_IDENTIFIERS: &[&str] = &["key", "secret", "token", "password", "credential"];

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_PRIVATE_SUFFIX: &str = " PRIVATE KEY-----";
const PEM_END: &str = "-----END ";

/// A recorded hit. Captures position and length only — never the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionMatch {
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column.
    pub column: usize,
    pub rule_id: &'static str,
    pub secret_type: &'static str,
    pub length: usize,
    pub confidence: Confidence,
}

/// Aggregate counters, updated through `&self` so workers can share the
/// redactor.
#[derive(Debug, Default)]
pub struct RedactionStats {
    total: AtomicUsize,
    by_rule: IndexMap<&'static str, AtomicUsize>,
    by_type: IndexMap<&'static str, AtomicUsize>,
}

impl RedactionStats {
    fn new(rules: &[RedactionRule]) -> Self {
        let mut by_rule = IndexMap::new();
        let mut by_type = IndexMap::new();
        for rule in rules {
            by_rule.insert(rule.id, AtomicUsize::new(0));
            by_type.insert(rule.secret_type, AtomicUsize::new(0));
        }
        for extra in [HIGH_ENTROPY_TYPE, PRIVATE_KEY_BLOCK_TYPE] {
            by_rule.entry(extra).or_insert_with(|| AtomicUsize::new(0));
            by_type.entry(extra).or_insert_with(|| AtomicUsize::new(0));
        }
        Self {
            total: AtomicUsize::new(0),
            by_rule,
            by_type,
        }
    }

    fn record(&self, m: &RedactionMatch) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.by_rule.get(m.rule_id) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(counter) = self.by_type.get(m.secret_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Point-in-time snapshot of the aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionReport {
    pub total: usize,
    pub by_rule: IndexMap<String, usize>,
    pub by_type: IndexMap<String, usize>,
}

struct Candidate {
    start: usize,
    end: usize,
    rule_id: &'static str,
    secret_type: &'static str,
    confidence: Confidence,
    from_rule: bool,
}

/// The redactor. Immutable after construction apart from its atomic
/// counters; safe to share across workers.
pub struct Redactor {
    rules: Vec<RedactionRule>,
    keywords: Vec<&'static str>,
    exclude: GlobSet,
    threshold: Confidence,
    entropy_enabled: bool,
    sensitive: Gitignore,
    marker_pattern: Regex,
    stats: RedactionStats,
}

impl Redactor {
    /// Build from the profile's `[redaction]` table with the built-in rules.
    pub fn from_config(config: &RedactionConfig) -> Result<Self> {
        let rules = builtin_rules()?;
        Self::new(config, rules)
    }

    pub fn new(config: &RedactionConfig, rules: Vec<RedactionRule>) -> Result<Self> {
        let threshold =
            Confidence::parse(&config.confidence_threshold).ok_or_else(|| {
                HarvxError::Config(format!(
                    "redaction.confidence_threshold has invalid value '{}'. Valid values: high, medium, low",
                    config.confidence_threshold
                ))
            })?;

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_paths {
            let glob = Glob::new(pattern).map_err(|e| HarvxError::InvalidPattern {
                pattern: pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|e| HarvxError::InvalidPattern {
            pattern: "redaction.exclude_paths".to_string(),
            source: e,
        })?;

        let mut keywords: Vec<&'static str> = rules.iter().flat_map(|r| r.keywords).copied().collect();
        keywords.sort_unstable();
        keywords.dedup();

        let stats = RedactionStats::new(&rules);
        Ok(Self {
            rules,
            keywords,
            exclude,
            threshold,
            entropy_enabled: config.entropy,
            sensitive: sensitive_matcher(),
            marker_pattern: Regex::new(r"\[REDACTED:[a-z0-9_]+\]")
                .map_err(|e| HarvxError::Config(e.to_string()))?,
            stats,
        })
    }

    /// Whether this path runs in heightened mode.
    #[must_use]
    pub fn is_heightened(&self, path: &str) -> bool {
        matches!(self.sensitive.matched(path, false), ignore::Match::Ignore(_))
    }

    /// Redact one file's content. Returns the transformed text and the
    /// matches applied, in document order.
    #[must_use]
    pub fn redact_file(&self, path: &str, content: &str) -> (String, Vec<RedactionMatch>) {
        if self.exclude.is_match(path) {
            return (content.to_string(), Vec::new());
        }

        let heightened = self.is_heightened(path);
        let active_threshold = if heightened {
            self.threshold.lowered()
        } else {
            self.threshold
        };

        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let mut out = String::with_capacity(content.len());
        let mut matches = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if let Some(begin_col) = find_pem_begin(line) {
                let end = find_pem_end(&lines, i);
                let span_len: usize = lines[i..=end].iter().map(|l| l.len()).sum();
                let terminator = line_terminator(lines[end]);

                out.push_str(&line[..begin_col]);
                out.push_str(&marker(PRIVATE_KEY_BLOCK_TYPE));
                out.push_str(terminator);

                let m = RedactionMatch {
                    file: path.to_string(),
                    line: i + 1,
                    column: begin_col + 1,
                    rule_id: PRIVATE_KEY_BLOCK_TYPE,
                    secret_type: PRIVATE_KEY_BLOCK_TYPE,
                    length: span_len,
                    confidence: Confidence::High,
                };
                self.stats.record(&m);
                matches.push(m);
                i = end + 1;
                continue;
            }

            let redacted =
                self.redact_line(path, line, i + 1, heightened, active_threshold, &mut matches);
            out.push_str(&redacted);
            i += 1;
        }

        (out, matches)
    }

    fn redact_line(
        &self,
        path: &str,
        line: &str,
        line_no: usize,
        heightened: bool,
        active_threshold: Confidence,
        matches: &mut Vec<RedactionMatch>,
    ) -> String {
        let terminator = line_terminator(line);
        let body = &line[..line.len() - terminator.len()];
        let lower = body.to_lowercase();

        // Spans already redacted are off-limits; this is what makes the
        // transform idempotent.
        let marker_spans: Vec<(usize, usize)> = self
            .marker_pattern
            .find_iter(body)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut candidates: Vec<Candidate> = Vec::new();

        // Keyword pre-filter gates the regex pass. Mandatory: it removes
        // the overwhelming majority of lines before any automaton runs.
        if self.keywords.iter().any(|k| lower.contains(k)) {
            for rule in &self.rules {
                if rule.confidence < active_threshold {
                    continue;
                }
                if !rule.keywords.iter().any(|k| lower.contains(k)) {
                    continue;
                }
                for caps in rule.pattern.captures_iter(body) {
                    let Some(m) = caps.get(rule.group).or_else(|| caps.get(0)) else {
                        continue;
                    };
                    if overlaps_any(m.start(), m.end(), &marker_spans) {
                        continue;
                    }
                    if let Some(validate) = rule.validate
                        && !validate(m.as_str())
                    {
                        continue;
                    }
                    candidates.push(Candidate {
                        start: m.start(),
                        end: m.end(),
                        rule_id: rule.id,
                        secret_type: rule.secret_type,
                        confidence: rule.confidence,
                        from_rule: true,
                    });
                }
            }
        }

        // Entropy pass: heightened mode scans the whole line, otherwise
        // only the value side of a suspicious assignment.
        if self.entropy_enabled && Confidence::Medium >= active_threshold {
            let region_start = if heightened {
                Some(0)
            } else {
                suspicious_value_start(&lower)
            };
            if let Some(region_start) = region_start {
                for (start, end) in alnum_runs(body, region_start) {
                    if end - start < MIN_TOKEN_LEN
                        || overlaps_any(start, end, &marker_spans)
                        || !is_high_entropy(&body[start..end])
                    {
                        continue;
                    }
                    candidates.push(Candidate {
                        start,
                        end,
                        rule_id: HIGH_ENTROPY_TYPE,
                        secret_type: HIGH_ENTROPY_TYPE,
                        confidence: Confidence::Medium,
                        from_rule: false,
                    });
                }
            }
        }

        if candidates.is_empty() {
            return line.to_string();
        }

        let selected = resolve_overlaps(candidates);
        let mut rebuilt = String::with_capacity(line.len());
        let mut cursor = 0;
        for candidate in &selected {
            rebuilt.push_str(&body[cursor..candidate.start]);
            rebuilt.push_str(&marker(candidate.secret_type));
            cursor = candidate.end;

            let m = RedactionMatch {
                file: path.to_string(),
                line: line_no,
                column: candidate.start + 1,
                rule_id: candidate.rule_id,
                secret_type: candidate.secret_type,
                length: candidate.end - candidate.start,
                confidence: candidate.confidence,
            };
            self.stats.record(&m);
            matches.push(m);
        }
        rebuilt.push_str(&body[cursor..]);
        rebuilt.push_str(terminator);
        rebuilt
    }

    /// Snapshot the aggregate counters.
    #[must_use]
    pub fn report(&self) -> RedactionReport {
        let load = |map: &IndexMap<&'static str, AtomicUsize>| {
            map.iter()
                .filter(|(_, v)| v.load(Ordering::Relaxed) > 0)
                .map(|(k, v)| ((*k).to_string(), v.load(Ordering::Relaxed)))
                .collect()
        };
        RedactionReport {
            total: self.stats.total.load(Ordering::Relaxed),
            by_rule: load(&self.stats.by_rule),
            by_type: load(&self.stats.by_type),
        }
    }
}

/// Render the literal replacement marker.
#[must_use]
pub fn marker(secret_type: &str) -> String {
    format!("[REDACTED:{secret_type}]")
}

fn line_terminator(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

fn find_pem_begin(line: &str) -> Option<usize> {
    let begin = line.find(PEM_BEGIN)?;
    line[begin..].contains(PEM_PRIVATE_SUFFIX).then_some(begin)
}

/// Index of the matching `-----END ... PRIVATE KEY-----` line, or the last
/// line when the block never closes.
fn find_pem_end(lines: &[&str], start: usize) -> usize {
    lines[start..]
        .iter()
        .position(|l| l.contains(PEM_END) && l.contains(PEM_PRIVATE_SUFFIX))
        .map_or(lines.len() - 1, |offset| start + offset)
}

fn overlaps_any(start: usize, end: usize, spans: &[(usize, usize)]) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

/// Byte offset just past the `=`/`:` of an assignment whose identifier side
/// contains a suspicious name.
fn suspicious_value_start(lower: &str) -> Option<usize> {
    let sep = lower.find(['=', ':'])?;
    let ident = &lower[..sep];
    SUSPICIOUS_IDENTIFIERS
        .iter()
        .any(|name| ident.contains(name))
        .then_some(sep + 1)
}

/// (start, end) byte ranges of ASCII-alphanumeric runs at or after `from`.
fn alnum_runs(body: &str, from: usize) -> Vec<(usize, usize)> {
    let bytes = body.as_bytes();
    let mut runs = Vec::new();
    let mut start = None;
    for i in from..bytes.len() {
        if bytes[i].is_ascii_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            runs.push((s, i));
        }
    }
    if let Some(s) = start {
        runs.push((s, bytes.len()));
    }
    runs
}

/// Left-to-right selection with overlap resolution: higher confidence wins,
/// ties go to the longer span, then to specific rules over entropy.
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.confidence.cmp(&a.confidence))
            .then_with(|| (b.end - b.start).cmp(&(a.end - a.start)))
            .then_with(|| b.from_rule.cmp(&a.from_rule))
    });

    let mut selected: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        match selected
            .iter()
            .position(|kept| candidate.start < kept.end && kept.start < candidate.end)
        {
            None => selected.push(candidate),
            Some(idx) => {
                let kept = &selected[idx];
                let wins = candidate
                    .confidence
                    .cmp(&kept.confidence)
                    .then_with(|| (candidate.end - candidate.start).cmp(&(kept.end - kept.start)))
                    .then_with(|| candidate.from_rule.cmp(&kept.from_rule))
                    .is_gt();
                if wins {
                    selected[idx] = candidate;
                }
            }
        }
    }
    selected.sort_by_key(|c| c.start);
    selected
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
