//! Splitting of long chat answers into transport-sized fragments.
//!
//! Chat transports cap message length (4096 chars on the common ones; we
//! stay at 4000 for headroom). Answers over the cap are split on paragraph
//! boundaries where possible and labeled `Part i/N:` so readers can follow
//! the sequence. All lengths are measured in `char`s, not bytes, since the
//! corpus and answers are routinely non-ASCII.

/// Maximum fragment length, label included.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Characters reserved for the `Part i/N:\n` label line.
///
/// `Part 999/999:\n` is 14 chars; 16 leaves slack. Reserving the label
/// budget up front keeps every labeled fragment within the transport limit
/// (splitting at the full limit and prefixing afterwards would overflow it).
const PART_LABEL_RESERVE: usize = 16;

/// Paragraph separator used for both splitting and re-accumulation.
const PARAGRAPH_SEP: &str = "\n\n";

/// Split `text` into an ordered sequence of fragments, each at most
/// `max_len` chars including its label.
///
/// Text that already fits is returned as a single unlabeled fragment.
/// Longer text is accumulated paragraph-by-paragraph into chunks; a single
/// paragraph that exceeds the per-chunk budget is sliced at raw character
/// offsets with no regard for word boundaries. Every chunk is then labeled
/// with its 1-based position and the total count.
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let budget = max_len.saturating_sub(PART_LABEL_RESERVE).max(1);

    let chunks = accumulate_paragraphs(text, budget);

    let mut sliced: Vec<String> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.chars().count() > budget {
            sliced.extend(slice_chars(&chunk, budget));
        } else {
            sliced.push(chunk);
        }
    }

    let total = sliced.len();
    tracing::debug!(chars = text.chars().count(), fragments = total, "answer split for delivery");
    sliced
        .into_iter()
        .enumerate()
        .map(|(i, content)| format!("Part {}/{total}:\n{content}", i + 1))
        .collect()
}

/// Split `text` with the default transport limit.
pub fn segment_default(text: &str) -> Vec<String> {
    segment(text, MAX_MESSAGE_LEN)
}

/// Greedily pack paragraphs into chunks of at most `budget` chars.
///
/// A paragraph joins the current chunk when chunk + paragraph + separator
/// still fits; otherwise the chunk is closed (right-trimmed) and the
/// paragraph starts a new one. Empty paragraphs from consecutive separators
/// cost only the re-appended separator and vanish at the trim.
fn accumulate_paragraphs(text: &str, budget: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in text.split(PARAGRAPH_SEP) {
        let para_len = para.chars().count();

        if current_len + para_len + PARAGRAPH_SEP.len() <= budget {
            current.push_str(para);
            current.push_str(PARAGRAPH_SEP);
            current_len += para_len + PARAGRAPH_SEP.len();
        } else {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
            }
            current = format!("{para}{PARAGRAPH_SEP}");
            current_len = para_len + PARAGRAPH_SEP.len();
        }
    }

    if !current.is_empty() {
        let trimmed = current.trim_end();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }

    chunks
}

/// Slice a string into pieces of at most `size` chars, on char boundaries.
fn slice_chars(s: &str, size: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in s.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            pieces.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
