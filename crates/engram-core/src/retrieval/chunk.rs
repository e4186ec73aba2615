//! Query chunking (spec section 4.6): split the query on newline, period,
//! and the word "and"; keep chunks longer than [`MIN_CHUNK_LEN`].

/// Chunks at or under this length (Unicode scalar count) are dropped as
/// too weak to carry retrieval signal on their own.
pub const MIN_CHUNK_LEN: usize = 8;

/// Split a user query into chunks. An empty result means the query carried
/// no retrievable signal at all (spec: "Empty set ⇒ return `{episodic: [],
/// factual: []}`").
pub fn chunk_query(query: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    for line in query.split('\n') {
        for sentence in line.split('.') {
            for piece in split_on_and(sentence) {
                let trimmed = piece.trim();
                if trimmed.chars().count() > MIN_CHUNK_LEN {
                    chunks.push(trimmed.to_string());
                }
            }
        }
    }
    chunks
}

/// Split on the standalone word "and", case-insensitive, word-boundary
/// aware so "Andrea" isn't split mid-token.
fn split_on_and(text: &str) -> Vec<String> {
    let mut groups = vec![String::new()];
    for word in text.split_whitespace() {
        if word.eq_ignore_ascii_case("and") {
            groups.push(String::new());
        } else {
            let current = groups.last_mut().expect("groups always has at least one entry");
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    groups
}
