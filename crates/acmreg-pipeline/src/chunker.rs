//! Document chunking for oversized registers
//!
//! Splits document text into bounded-size chunks the model can handle
//! in one call. Chunks are exact, consecutive substrings of the input:
//! concatenating them reproduces the document byte-for-byte, which
//! keeps re-chunking deterministic and lossless.

use crate::config::HeaderPatterns;
use regex::Regex;
use tracing::debug;

/// Splits document text at safe boundaries within a size budget
///
/// Boundary preference, best first: page-boundary markers from the
/// upstream converter, blank-line paragraph breaks, line breaks, raw
/// character budget. A page marker line is never split and a chunk
/// never starts or ends mid-line unless a single line exceeds the
/// whole budget.
pub struct Chunker {
    page_marker: Regex,
    max_chunk_chars: usize,
}

impl Chunker {
    /// Create a chunker from the configured page-marker pattern
    pub fn new(patterns: &HeaderPatterns, max_chunk_chars: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            page_marker: Regex::new(&patterns.page_marker)?,
            max_chunk_chars,
        })
    }

    /// Split the document into ordered chunks within the size budget
    ///
    /// Documents that already fit return a single chunk equal to the
    /// input, with no splitting work done.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.len() <= self.max_chunk_chars {
            return vec![text.to_string()];
        }

        // Reduce the document to atoms no larger than the budget, then
        // greedily pack consecutive atoms back together.
        let mut atoms: Vec<&str> = Vec::new();
        for page in self.split_pages(text) {
            if page.len() <= self.max_chunk_chars {
                atoms.push(page);
            } else {
                self.split_paragraphs(page, &mut atoms);
            }
        }

        let chunks = pack(&atoms, self.max_chunk_chars);
        debug!("Split {} chars into {} chunks", text.len(), chunks.len());
        chunks
    }

    /// Split at page-boundary markers; each marker line starts a new page
    fn split_pages<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut pages = Vec::new();
        let mut page_start = 0;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            if self.page_marker.is_match(line.trim_end_matches(['\n', '\r'])) && offset > page_start
            {
                pages.push(&text[page_start..offset]);
                page_start = offset;
            }
            offset += line.len();
        }
        if page_start < text.len() {
            pages.push(&text[page_start..]);
        }
        pages
    }

    /// Split an oversized page at blank-line boundaries
    fn split_paragraphs<'a>(&self, page: &'a str, atoms: &mut Vec<&'a str>) {
        let mut para_start = 0;
        let mut offset = 0;
        let mut in_blank_run = false;

        for line in page.split_inclusive('\n') {
            let blank = line.trim().is_empty();
            // A paragraph ends where a blank-line run ends; the blank
            // lines stay attached to the preceding paragraph
            if in_blank_run && !blank && offset > para_start {
                self.push_paragraph(&page[para_start..offset], atoms);
                para_start = offset;
            }
            in_blank_run = blank;
            offset += line.len();
        }
        if para_start < page.len() {
            self.push_paragraph(&page[para_start..], atoms);
        }
    }

    fn push_paragraph<'a>(&self, paragraph: &'a str, atoms: &mut Vec<&'a str>) {
        if paragraph.len() <= self.max_chunk_chars {
            atoms.push(paragraph);
        } else {
            self.split_lines(paragraph, atoms);
        }
    }

    /// Split an oversized paragraph at line boundaries, and a single
    /// oversized line at the raw character budget as a last resort
    fn split_lines<'a>(&self, paragraph: &'a str, atoms: &mut Vec<&'a str>) {
        for line in paragraph.split_inclusive('\n') {
            if line.len() <= self.max_chunk_chars {
                atoms.push(line);
            } else {
                let mut rest = line;
                while rest.len() > self.max_chunk_chars {
                    let cut = floor_char_boundary(rest, self.max_chunk_chars);
                    let (head, tail) = rest.split_at(cut);
                    atoms.push(head);
                    rest = tail;
                }
                if !rest.is_empty() {
                    atoms.push(rest);
                }
            }
        }
    }
}

/// Greedily combine consecutive atoms without exceeding the budget
fn pack(atoms: &[&str], max_chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for atom in atoms {
        if !current.is_empty() && current.len() + atom.len() > max_chunk_chars {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(atom);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Largest index `<= max` that lands on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    // A budget smaller than one char still has to make progress
    if idx == 0 {
        idx = s
            .char_indices()
            .nth(1)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
    }
    idx
}
