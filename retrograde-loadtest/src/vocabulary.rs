//! Word lists used to synthesize card descriptions

use crate::random::RandomSource;

pub const ADJECTIVES: [&str; 8] = [
    "adorable",
    "clueless",
    "dirty",
    "odd",
    "stupid",
    "smart",
    "excited",
    "uncoordinated",
];

pub const NOUNS: [&str; 8] = [
    "puppy",
    "car",
    "rabbit",
    "girl",
    "boy",
    "government",
    "monkey",
    "person",
];

pub const VERBS: [&str; 10] = [
    "runs", "hits", "jumps", "drives", "barfs", "codes", "tests", "juggles", "builds", "mines",
];

pub const ADVERBS: [&str; 7] = [
    "crazily.",
    "dutifully.",
    "foolishly.",
    "merrily.",
    "occasionally.",
    "unexceptionally.",
    "amazingly",
];

/// The four lists in sentence order
pub const WORD_LISTS: [&[&str]; 4] = [&ADJECTIVES, &NOUNS, &VERBS, &ADVERBS];

/// One random word from each list, in order, joined by single spaces
pub fn describe(rng: &mut impl RandomSource) -> String {
    WORD_LISTS
        .iter()
        .map(|words| words[rng.index(words.len())])
        .collect::<Vec<_>>()
        .join(" ")
}
