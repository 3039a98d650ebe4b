//! Sentence-aware overlapping chunker.
//!
//! Walks the text in windows of `chunk_size` characters. Every window
//! except the final one is cut back to the nearest sentence-ending
//! punctuation within 100 characters of the naive boundary, so chunks end
//! on natural boundaries when possible. The next window starts `overlap`
//! characters before the previous cut.
//!
//! The iterator is lazy and finite; restarting means
//! recomputing from scratch, there is no partial-resume state. Termination
//! is guaranteed even for pathological parameters (overlap >= chunk_size):
//! the walk stops as soon as the advancing start would not move forward.

/// Sentence-ending punctuation, Latin and CJK.
pub const SENTENCE_ENDERS: [char; 7] = ['.', '!', '?', '\n', '。', '？', '！'];

/// How far back from the naive cut the boundary search may scan.
const BOUNDARY_LOOKBACK: usize = 100;

/// One chunk of text plus its character offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPiece {
    pub content: String,
    /// Character offset of the chunk start within the source text.
    pub position: usize,
}

/// Split `text` into overlapping, sentence-aligned chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> ChunkIter {
    ChunkIter {
        chars: text.chars().collect(),
        chunk_size,
        overlap,
        start: 0,
        done: chunk_size == 0,
    }
}

/// Lazy chunk iterator. Counts in characters, not bytes, so CJK text and
/// its full-width punctuation behave the same as ASCII.
#[derive(Debug, Clone)]
pub struct ChunkIter {
    chars: Vec<char>,
    chunk_size: usize,
    overlap: usize,
    start: usize,
    done: bool,
}

impl Iterator for ChunkIter {
    type Item = ChunkPiece;

    fn next(&mut self) -> Option<ChunkPiece> {
        if self.done || self.start >= self.chars.len() {
            return None;
        }
        let len = self.chars.len();
        let naive_end = (self.start + self.chunk_size).min(len);

        let mut end = naive_end;
        if naive_end < len {
            // Non-final window: prefer a sentence boundary. The scan is
            // clamped to the window start so a short chunk_size can never
            // push the cut before the window itself.
            let floor = naive_end
                .saturating_sub(BOUNDARY_LOOKBACK)
                .max(self.start + 1);
            for i in (floor..naive_end).rev() {
                if SENTENCE_ENDERS.contains(&self.chars[i]) {
                    end = i + 1;
                    break;
                }
            }
        }

        let piece = ChunkPiece {
            content: self.chars[self.start..end].iter().collect(),
            position: self.start,
        };

        if end >= len {
            self.done = true;
        } else {
            let next_start = end.saturating_sub(self.overlap);
            if next_start <= self.start {
                // Start would not move forward (overlap >= window length).
                // Stop rather than loop forever.
                self.done = true;
            } else {
                self.start = next_start;
            }
        }

        Some(piece)
    }
}
