/*!
 * Key allocation for blocks and entities.
 */

use rand::Rng;
use rand::distr::Alphanumeric;

use super::model::Document;

/// Length of generated block keys, same as the rich-text editor's own keys
const BLOCK_KEY_LEN: usize = 5;

/// Generate a random block key for which `taken` returns false.
pub fn generate_key<F>(taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut rng = rand::rng();
    loop {
        let key: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(BLOCK_KEY_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        if !taken(&key) {
            return key;
        }
    }
}

/// Generate a block key that is not used by any block of `document`.
pub fn fresh_block_key(document: &Document) -> String {
    let keys = document.block_keys();
    generate_key(|candidate| keys.contains(candidate))
}

/// Next unused entity key: one past the highest numeric key in the map, or
/// the lowest free number once the highest key is `u64::MAX`.
pub fn next_entity_key(document: &Document) -> String {
    let highest = document
        .entity_map
        .keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max();
    match highest {
        None => "0".to_string(),
        Some(max) => match max.checked_add(1) {
            Some(next) => next.to_string(),
            None => (0..=u64::MAX)
                .map(|n| n.to_string())
                .find(|candidate| !document.entity_map.contains_key(candidate))
                .unwrap_or_else(|| generate_key(|k| document.entity_map.contains_key(k))),
        },
    }
}
