/// Split a line into whitespace-delimited tokens.
///
/// Tokens are borrowed from `text` unchanged: no case folding, no
/// normalization, no stopwords. Runs of whitespace (including leading and
/// trailing) never produce empty tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split_whitespace()
}
