// ============================================================
// Layer 4 — Annotation Merger
// ============================================================
// Turns many per-document annotation files into one ordered list
// of validated TrainingExamples.
//
// Per span, checks run in this order; the first failure drops
// the span and records a warning (never aborts the merge):
//
//   1. bounds     0 <= start < end <= char_len(text)
//   2. trim       leading/trailing whitespace is cut off the span;
//                 a span with nothing left is dropped
//   3. label      must parse (PERSON / NAME / EMAIL) and be in the
//                 configured whitelist
//   4. overlap    surviving spans sorted by
//                   (start asc, length desc, input position asc)
//                 and kept greedily: the earliest start wins, and
//                 on a tied start the longer span wins
//
// Kept spans are emitted sorted by start. A record whose spans
// were all dropped is still emitted with an empty span list; it
// is a useful "no entity here" example.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::annotation::{
    AnnotationFile, Label, RawSpan, Span, SpanIssue, TrainingExample,
};

/// Spans that survived validation plus the reasons others did not.
#[derive(Debug, Default)]
pub struct CleanedSpans {
    pub spans:  Vec<Span>,
    pub issues: Vec<SpanIssue>,
}

/// Validate, trim, whitelist, and de-overlap the raw spans of one text.
pub fn clean_spans(text: &str, raw: &[RawSpan], whitelist: &[Label]) -> CleanedSpans {
    let chars: Vec<char> = text.chars().collect();
    let len              = chars.len();
    let mut out          = CleanedSpans::default();
    let mut candidates   = Vec::with_capacity(raw.len());

    for span in raw {
        let (start, end, label) = span.parts();

        if start < 0 || end < 0 || start as usize > len || end as usize > len {
            out.issues.push(SpanIssue::OutOfBounds { start, end, len });
            continue;
        }
        if start >= end {
            out.issues.push(SpanIssue::Empty { start, end });
            continue;
        }

        let (mut s, mut e) = (start as usize, end as usize);
        while s < e && chars[s].is_whitespace() { s += 1; }
        while e > s && chars[e - 1].is_whitespace() { e -= 1; }
        if s == e {
            out.issues.push(SpanIssue::Blank { start, end });
            continue;
        }

        let label = match label.parse::<Label>() {
            Ok(l) => l,
            Err(_) => {
                out.issues.push(SpanIssue::UnknownLabel { start, end, label: label.to_string() });
                continue;
            }
        };
        if !whitelist.contains(&label) {
            out.issues.push(SpanIssue::DisabledLabel { start, end, label });
            continue;
        }

        candidates.push(Span::new(s, e, label));
    }

    // sort_by is stable, so equal (start, len) keeps input order
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));

    for span in candidates {
        match out.spans.last() {
            Some(kept) if span.start < kept.end => {
                out.issues.push(SpanIssue::Overlap { dropped: span, kept: *kept });
            }
            _ => out.spans.push(span),
        }
    }

    out
}

// ─── MergeSummary ─────────────────────────────────────────────────────────────
/// Counts written next to the training artifact.
/// Contains no timestamps so re-runs produce identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeSummary {
    pub files_seen:   usize,
    pub files_merged: usize,
    pub files_failed: usize,
    pub examples:     usize,
    pub spans_seen:   usize,
    pub spans_kept:   usize,
    /// reason → count; BTreeMap keeps key order stable on disk
    pub spans_dropped: BTreeMap<String, usize>,
    pub warnings:     Vec<String>,
}

impl MergeSummary {
    pub fn total_dropped(&self) -> usize {
        self.spans_dropped.values().sum()
    }

    pub fn overlaps_resolved(&self) -> usize {
        self.spans_dropped.get("overlap").copied().unwrap_or(0)
    }
}

// ─── AnnotationMerger ─────────────────────────────────────────────────────────
/// Accumulates examples file by file. Call order = artifact order.
pub struct AnnotationMerger {
    whitelist: Vec<Label>,
    examples:  Vec<TrainingExample>,
    summary:   MergeSummary,
}

impl AnnotationMerger {
    pub fn new(whitelist: Vec<Label>) -> Self {
        Self {
            whitelist,
            examples: Vec::new(),
            summary:  MergeSummary::default(),
        }
    }

    /// Add every record of one parsed annotation file.
    pub fn add_file(&mut self, name: &str, file: AnnotationFile) {
        self.summary.files_seen   += 1;
        self.summary.files_merged += 1;

        for (idx, record) in file.into_records().into_iter().enumerate() {
            let text    = record.0;
            let raw     = record.1.entities;
            let cleaned = clean_spans(&text, &raw, &self.whitelist);

            self.summary.spans_seen += raw.len();
            self.summary.spans_kept += cleaned.spans.len();

            for issue in &cleaned.issues {
                let warning = format!("{name}#{idx}: {issue}");
                tracing::warn!("{warning}");
                *self.summary.spans_dropped.entry(issue.reason().to_string()).or_insert(0) += 1;
                self.summary.warnings.push(warning);
            }

            self.examples.push(TrainingExample::new(text, cleaned.spans));
        }
    }

    /// Record a file that could not be read or parsed.
    pub fn add_failed(&mut self, name: &str, reason: &str) {
        self.summary.files_seen   += 1;
        self.summary.files_failed += 1;
        let warning = format!("{name}: skipped, {reason}");
        tracing::warn!("{warning}");
        self.summary.warnings.push(warning);
    }

    pub fn finish(mut self) -> (Vec<TrainingExample>, MergeSummary) {
        self.summary.examples = self.examples.len();
        (self.examples, self.summary)
    }
}
