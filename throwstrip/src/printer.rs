//! Turns a rewritten tree back into source text.
//!
//! The original and rewritten trees are walked side by side. Shared `Arc`s are
//! skipped without looking inside; each difference becomes a deletion applied
//! through `ByteRangeRewriter`, so untouched text keeps its exact formatting.

use crate::fix::{ByteRangeRewriter, Edit, RewriteError};
use crate::tree::{CompilationUnit, Import, Member, MethodDecl, Span, TypeDecl, TypeRef};
use std::sync::Arc;

/// Print `rewritten` by editing `source`, the text `original` was parsed from.
///
/// # Errors
///
/// Returns `RewriteError` if the edits conflict or the result no longer parses.
pub fn print(
    source: &str,
    original: &Arc<CompilationUnit>,
    rewritten: &Arc<CompilationUnit>,
) -> Result<String, RewriteError> {
    if Arc::ptr_eq(original, rewritten) {
        return Ok(source.to_owned());
    }

    let mut edits = Vec::new();
    for (before, after) in original.types.iter().zip(&rewritten.types) {
        diff_type(before, after, &mut edits);
    }
    import_edits(source, original, rewritten, &mut edits);

    let mut rewriter = ByteRangeRewriter::new(source);
    rewriter.add_edits(edits);
    tracing::trace!(edits = rewriter.edit_count(), "applying edits");
    rewriter.apply_verified()
}

fn diff_type(before: &Arc<TypeDecl>, after: &Arc<TypeDecl>, edits: &mut Vec<Edit>) {
    if Arc::ptr_eq(before, after) {
        return;
    }
    for pair in before.members.iter().zip(&after.members) {
        match pair {
            (Member::Method(b), Member::Method(a)) => diff_method(b, a, edits),
            (Member::Type(b), Member::Type(a)) => diff_type(b, a, edits),
            _ => {}
        }
    }
}

fn diff_method(before: &Arc<MethodDecl>, after: &Arc<MethodDecl>, edits: &mut Vec<Edit>) {
    if Arc::ptr_eq(before, after) {
        return;
    }
    for (b, a) in before.local_types.iter().zip(&after.local_types) {
        diff_type(b, a, edits);
    }
    if before.throws == after.throws {
        return;
    }

    let Some(clause) = before.throws_span else {
        return;
    };
    match &after.throws {
        None => edits.push(
            Edit::delete(before.header_end, clause.end)
                .describe(format!("remove throws clause of {}", before.name)),
        ),
        Some(kept) => throws_entry_edits(before.throws_entries(), kept, edits),
    }
}

/// Delete each run of removed entries together with one adjacent separator.
fn throws_entry_edits(entries: &[TypeRef], kept: &[TypeRef], edits: &mut Vec<Edit>) {
    let is_kept = |entry: &TypeRef| kept.iter().any(|k| k.span == entry.span);

    let mut i = 0;
    while i < entries.len() {
        if is_kept(&entries[i]) {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < entries.len() && !is_kept(&entries[i]) {
            i += 1;
        }
        let run_end = i - 1;

        let span = if i < entries.len() {
            // A kept entry follows: take the separator after the run.
            Span::new(entries[run_start].span.start, entries[i].span.start)
        } else if run_start > 0 {
            // The run ends the list: take the separator before it.
            Span::new(entries[run_start - 1].span.end, entries[run_end].span.end)
        } else {
            continue;
        };
        edits.push(
            Edit::delete(span.start, span.end)
                .describe(format!("remove throws entry {}", entries[run_start].text)),
        );
    }
}

fn import_edits(
    source: &str,
    original: &CompilationUnit,
    rewritten: &CompilationUnit,
    edits: &mut Vec<Edit>,
) {
    let removed: Vec<&Arc<Import>> = original
        .imports
        .iter()
        .filter(|i| !rewritten.imports.iter().any(|r| Arc::ptr_eq(r, *i)))
        .collect();
    let Some(&last) = removed.last() else {
        return;
    };

    let block_emptied = rewritten.imports.is_empty();
    for &import in &removed {
        let mut span = import.line_span;
        if block_emptied && Arc::ptr_eq(import, last) && span.end > import.span.end {
            span.end = skip_blank_lines(source, span.end);
        }
        edits.push(
            Edit::delete(span.start, span.end).describe(format!("remove import {}", import.path)),
        );
    }
}

/// First offset at or after `pos` that starts a non-blank line.
fn skip_blank_lines(source: &str, mut pos: usize) -> usize {
    while pos < source.len() {
        let rest = &source[pos..];
        let Some(newline) = rest.find('\n') else {
            break;
        };
        if !rest[..newline].trim().is_empty() {
            break;
        }
        pos += newline + 1;
    }
    pos
}
