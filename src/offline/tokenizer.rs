//! Vocabulary tokenizer bounded to the training-time sequence length.

use std::collections::HashMap;

use super::artifacts::ClassifierConfig;

/// Fixed-length encoding: `ids` is always `max_len` long, with `len` real
/// tokens followed by padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub ids: Vec<usize>,
    pub len: usize,
}

impl Encoding {
    /// The non-padding prefix; padding must carry no weight downstream.
    pub fn token_ids(&self) -> &[usize] {
        &self.ids[..self.len]
    }
}

#[derive(Debug)]
pub struct Tokenizer {
    vocab: HashMap<String, usize>,
    max_len: usize,
    pad_id: usize,
    unk_id: usize,
}

impl Tokenizer {
    pub fn new(vocab: HashMap<String, usize>, config: &ClassifierConfig) -> Self {
        Self {
            vocab,
            max_len: config.max_len,
            pad_id: config.pad_id,
            unk_id: config.unk_id,
        }
    }

    /// Lowercase, split on non-alphanumeric (apostrophes stay inside words),
    /// look each token up, then truncate or pad to `max_len`.
    pub fn encode(&self, text: &str) -> Encoding {
        let mut ids: Vec<usize> = split_tokens(text)
            .map(|token| *self.vocab.get(&token).unwrap_or(&self.unk_id))
            .take(self.max_len)
            .collect();
        let len = ids.len();
        ids.resize(self.max_len, self.pad_id);
        Encoding { ids, len }
    }
}

fn split_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '’')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(max_len: usize) -> Tokenizer {
        let vocab = HashMap::from([
            ("<pad>".to_string(), 0),
            ("<unk>".to_string(), 1),
            ("i".to_string(), 2),
            ("can't".to_string(), 3),
            ("sleep".to_string(), 4),
        ]);
        let config = ClassifierConfig {
            num_labels: 2,
            max_len,
            pad_id: 0,
            unk_id: 1,
        };
        Tokenizer::new(vocab, &config)
    }

    #[test]
    fn lowercases_and_keeps_apostrophes_inside_words() {
        let encoding = tokenizer(8).encode("I CAN'T sleep!!!");
        assert_eq!(encoding.token_ids(), &[2, 3, 4]);
    }

    #[test]
    fn unknown_tokens_map_to_unk() {
        let encoding = tokenizer(8).encode("i never sleep");
        assert_eq!(encoding.token_ids(), &[2, 1, 4]);
    }

    #[test]
    fn short_input_pads_to_max_len() {
        let encoding = tokenizer(6).encode("sleep");
        assert_eq!(encoding.len, 1);
        assert_eq!(encoding.ids, vec![4, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn long_input_truncates_to_max_len() {
        let encoding = tokenizer(2).encode("i can't sleep i can't sleep");
        assert_eq!(encoding.len, 2);
        assert_eq!(encoding.ids, vec![2, 3]);
    }

    #[test]
    fn empty_input_is_all_padding() {
        let encoding = tokenizer(4).encode("   ");
        assert_eq!(encoding.len, 0);
        assert_eq!(encoding.ids, vec![0; 4]);
    }
}
