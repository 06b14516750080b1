//! Character-level diff for on-screen comparison.
//!
//! Lines are matched first; each replaced block of lines is then diffed
//! character by character. Concatenating the non-removed segments yields the
//! duplicate, the non-added segments yield the original.

use difflib::sequencematcher::SequenceMatcher;

use crate::wire::DiffSegment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

pub fn diff_chars(original: &str, duplicate: &str) -> Vec<DiffSegment> {
    let mut out = Vec::new();
    if original == duplicate {
        push(&mut out, DiffSegment::unchanged(original));
        return out;
    }

    let a: Vec<&str> = original.split_inclusive('\n').collect();
    let b: Vec<&str> = duplicate.split_inclusive('\n').collect();
    let mut matcher = SequenceMatcher::new(a.as_slice(), b.as_slice());

    for op in matcher.get_opcodes() {
        let old = a[op.first_start..op.first_end].concat();
        let new = b[op.second_start..op.second_end].concat();
        match op.tag.as_str() {
            "equal" => push(&mut out, DiffSegment::unchanged(old)),
            "delete" => push(&mut out, DiffSegment::removed(old)),
            "insert" => push(&mut out, DiffSegment::added(new)),
            _ => diff_block(&old, &new, &mut out),
        }
    }
    out
}

/// Char-level pass over one replaced block. Common prefix and suffix are
/// peeled off first so the matcher only sees the part that changed.
fn diff_block(old: &str, new: &str, out: &mut Vec<DiffSegment>) {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let max_suffix = a.len().min(b.len()) - prefix;
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    push(out, DiffSegment::unchanged(a[..prefix].iter().collect::<String>()));

    let mut matcher = SequenceMatcher::new(a_mid, b_mid);
    for op in matcher.get_opcodes() {
        let old_part: String = a_mid[op.first_start..op.first_end].iter().collect();
        let new_part: String = b_mid[op.second_start..op.second_end].iter().collect();
        match op.tag.as_str() {
            "equal" => push(out, DiffSegment::unchanged(old_part)),
            "delete" => push(out, DiffSegment::removed(old_part)),
            "insert" => push(out, DiffSegment::added(new_part)),
            _ => {
                push(out, DiffSegment::removed(old_part));
                push(out, DiffSegment::added(new_part));
            }
        }
    }

    push(out, DiffSegment::unchanged(a[a.len() - suffix..].iter().collect::<String>()));
}

/// Appends `seg`, merging it into the previous segment when both carry the
/// same tag. Empty segments are dropped.
fn push(out: &mut Vec<DiffSegment>, seg: DiffSegment) {
    if seg.value.is_empty() {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.added == seg.added && last.removed == seg.removed {
            last.value.push_str(&seg.value);
            return;
        }
    }
    out.push(seg);
}

pub fn reconstruct_original(segments: &[DiffSegment]) -> String {
    segments.iter().filter(|s| !s.added).map(|s| s.value.as_str()).collect()
}

pub fn reconstruct_duplicate(segments: &[DiffSegment]) -> String {
    segments.iter().filter(|s| !s.removed).map(|s| s.value.as_str()).collect()
}

/// Character counts per segment kind.
pub fn stats(segments: &[DiffSegment]) -> DiffStats {
    let mut st = DiffStats::default();
    for s in segments {
        let n = s.value.chars().count();
        if s.added {
            st.added += n;
        } else if s.removed {
            st.removed += n;
        } else {
            st.unchanged += n;
        }
    }
    st
}
