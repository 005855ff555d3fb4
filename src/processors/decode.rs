//! CTC greedy sequence decoding.
//!
//! The recognition network emits one class distribution per timestep. After
//! argmax this becomes a stream of class indices; decoding collapses
//! consecutive repeats and drops blanks. A blank between two runs of the
//! same symbol resets adjacency, so both runs emit.

use crate::core::errors::{OcrError, ProcessingStage};
use std::path::Path;

/// Index reserved for the CTC blank class.
pub const BLANK_INDEX: usize = 0;

/// An ordered, read-only symbol table.
///
/// Class index 0 is the implicit blank; class `i` for `i ≥ 1` maps to
/// `symbols[i - 1]`. Loaded once at startup and shared read-only across
/// concurrent pipeline invocations.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from an ordered sequence of symbols.
    ///
    /// Rejects empty sequences and duplicate symbols; both are fatal
    /// configuration errors.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, OcrError> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(OcrError::config("alphabet must not be empty"));
        }
        let mut seen = std::collections::HashSet::with_capacity(symbols.len());
        for &symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(OcrError::config(format!(
                    "duplicate symbol {symbol:?} in alphabet"
                )));
            }
        }
        Ok(Self { symbols })
    }

    /// Loads an alphabet from a dictionary file with one symbol per line.
    ///
    /// Only the first character of each line is used; empty lines are
    /// rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OcrError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mut symbols = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            let Some(symbol) = line.chars().next() else {
                return Err(OcrError::config(format!(
                    "empty line {} in alphabet file {}",
                    lineno + 1,
                    path.as_ref().display()
                )));
            };
            symbols.push(symbol);
        }
        Self::new(symbols)
    }

    /// Number of symbols, excluding the blank.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the alphabet holds no symbols. Always false for a
    /// successfully constructed alphabet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Total class count the recognition network must emit: symbols + blank.
    pub fn class_count(&self) -> usize {
        self.symbols.len() + 1
    }

    /// Symbol for a non-blank class index, or `None` when out of range.
    pub fn symbol(&self, class_index: usize) -> Option<char> {
        if class_index == BLANK_INDEX {
            return None;
        }
        self.symbols.get(class_index - 1).copied()
    }
}

/// Greedy CTC decoder over argmax index streams.
#[derive(Debug, Clone)]
pub struct CtcDecoder {
    alphabet: Alphabet,
}

impl CtcDecoder {
    /// Creates a decoder over the given alphabet.
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    /// The alphabet backing this decoder.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Collapses a per-timestep class-index stream into a string.
    ///
    /// Emits the symbol for every non-blank index that differs from the
    /// immediately preceding timestep's index, then trims surrounding
    /// whitespace. An empty result means "no text found" and is not an
    /// error. A class index outside the alphabet is a malformed executor
    /// output and fails decoding.
    pub fn decode(&self, indices: &[usize]) -> Result<String, OcrError> {
        let mut text = String::new();
        let mut previous = BLANK_INDEX;
        for &index in indices {
            if index != BLANK_INDEX && index != previous {
                let symbol = self.alphabet.symbol(index).ok_or_else(|| {
                    OcrError::processing(
                        ProcessingStage::Decoding,
                        format!(
                            "class index {} out of range for alphabet of {} symbols",
                            index,
                            self.alphabet.len()
                        ),
                    )
                })?;
                text.push(symbol);
            }
            previous = index;
        }
        Ok(text.trim().to_string())
    }
}
