use crate::lines::lossy_lines;
use crate::tokenizer::tokenize;
use crate::DocId;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;
use std::time::Instant;

/// Occurrences of one token in one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocHit {
    pub docid: DocId,
    pub hit_count: usize,
}

/// Bounds applied while building an index.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexLimits {
    /// Build fails once the corpus exceeds this many documents.
    pub max_documents: Option<usize>,
}

/// Token to posting list map over a fixed corpus.
///
/// Built in a single pass and never mutated afterwards; a rebuild always
/// produces a fresh instance.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<DocHit>>, // sorted by docid
    docs: Vec<String>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index every line of `documents`; line `i` becomes docid `i`.
    pub fn build<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Builder::default();
        for doc in documents {
            builder.add(doc.into());
        }
        builder.finish()
    }

    /// Index a line reader, stopping at the first I/O error.
    ///
    /// Invalid UTF-8 is decoded lossily rather than rejected.
    pub fn from_reader<R: BufRead>(reader: R, limits: IndexLimits) -> Result<Self> {
        let start = Instant::now();
        let mut builder = Builder::default();
        for (lineno, line) in lossy_lines(reader).enumerate() {
            let line = line.with_context(|| format!("reading document line {}", lineno + 1))?;
            if let Some(max) = limits.max_documents {
                if builder.docs.len() >= max {
                    bail!("corpus exceeds the limit of {max} documents");
                }
            }
            builder
                .docs
                .try_reserve(1)
                .context("out of memory while storing documents")?;
            builder.add(line);
        }
        let index = builder.finish();
        tracing::info!(
            num_docs = index.document_count(),
            num_terms = index.term_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index built"
        );
        Ok(index)
    }

    /// Posting list for `token`, empty when the token never occurs.
    pub fn lookup(&self, token: &str) -> &[DocHit] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self, docid: DocId) -> Option<&str> {
        self.docs.get(docid).map(String::as_str)
    }

    pub fn document_count(&self) -> usize { self.docs.len() }

    pub fn term_count(&self) -> usize { self.postings.len() }

    /// All tokens with their posting lists, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[DocHit])> + '_ {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }
}

#[derive(Default)]
struct Builder {
    postings: HashMap<String, Vec<DocHit>>,
    docs: Vec<String>,
}

impl Builder {
    fn add(&mut self, document: String) {
        let docid = self.docs.len();
        for token in tokenize(&document) {
            if let Some(hits) = self.postings.get_mut(token) {
                // Documents arrive in docid order, so only the last entry can match.
                match hits.last_mut() {
                    Some(last) if last.docid == docid => last.hit_count += 1,
                    _ => hits.push(DocHit { docid, hit_count: 1 }),
                }
            } else {
                self.postings.insert(token.to_owned(), vec![DocHit { docid, hit_count: 1 }]);
            }
        }
        self.docs.push(document);
    }

    fn finish(self) -> InvertedIndex {
        InvertedIndex { postings: self.postings, docs: self.docs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn counts_hits_per_document() {
        let idx = InvertedIndex::build(["is is is is", "this is it"]);
        assert_eq!(
            idx.lookup("is"),
            &[DocHit { docid: 0, hit_count: 4 }, DocHit { docid: 1, hit_count: 1 }]
        );
        assert_eq!(idx.lookup("it"), &[DocHit { docid: 1, hit_count: 1 }]);
        assert!(idx.lookup("missing").is_empty());
    }

    #[test]
    fn empty_document_consumes_docid() {
        let idx = InvertedIndex::build(["alpha", "", "   ", "alpha beta"]);
        assert_eq!(idx.document_count(), 4);
        assert_eq!(idx.document(1), Some(""));
        assert_eq!(
            idx.lookup("alpha"),
            &[DocHit { docid: 0, hit_count: 1 }, DocHit { docid: 3, hit_count: 1 }]
        );
        assert_eq!(idx.term_count(), 2);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        let idx = InvertedIndex::build(["Rust rust RUST"]);
        assert_eq!(idx.term_count(), 3);
        assert_eq!(idx.lookup("rust"), &[DocHit { docid: 0, hit_count: 1 }]);
    }

    #[test]
    fn from_reader_strips_crlf() {
        let idx = InvertedIndex::from_reader(Cursor::new("a b\r\nc\r\n"), IndexLimits::default())
            .unwrap();
        assert_eq!(idx.document_count(), 2);
        assert_eq!(idx.document(0), Some("a b"));
        assert_eq!(idx.document(1), Some("c"));
    }

    #[test]
    fn from_reader_accepts_invalid_utf8() {
        let bytes: &[u8] = b"ok line\n\xff\xfe broken\nlast ok\n";
        let idx = InvertedIndex::from_reader(bytes, IndexLimits::default()).unwrap();
        assert_eq!(idx.document_count(), 3);
        assert_eq!(idx.lookup("broken"), &[DocHit { docid: 1, hit_count: 1 }]);
        assert_eq!(
            idx.lookup("ok"),
            &[DocHit { docid: 0, hit_count: 1 }, DocHit { docid: 2, hit_count: 1 }]
        );
    }

    #[test]
    fn from_reader_enforces_document_limit() {
        let limits = IndexLimits { max_documents: Some(2) };
        let err = InvertedIndex::from_reader(Cursor::new("a\nb\nc\n"), limits).unwrap_err();
        assert!(err.to_string().contains("limit of 2"));

        let ok = InvertedIndex::from_reader(Cursor::new("a\nb\n"), limits).unwrap();
        assert_eq!(ok.document_count(), 2);
    }

    #[test]
    fn from_reader_matches_build() {
        let text = "london is the capital of great britain\ni am travelling down the river";
        let a = InvertedIndex::from_reader(Cursor::new(text), IndexLimits::default()).unwrap();
        let b = InvertedIndex::build(text.lines());
        assert_eq!(a.document_count(), b.document_count());
        for (term, hits) in b.terms() {
            assert_eq!(a.lookup(term), hits);
        }
    }
}
