//! Human-friendly session ids of the form `adverb-adjective-noun`.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

const ADVERBS: &[&str] = &[
    "boldly", "briskly", "calmly", "cleverly", "eagerly", "gently", "gladly", "happily",
    "keenly", "lazily", "loudly", "merrily", "neatly", "oddly", "proudly", "quietly",
    "rarely", "slowly", "softly", "swiftly", "warmly", "wildly",
];

const ADJECTIVES: &[&str] = &[
    "amber", "ancient", "brave", "bright", "crimson", "curious", "dusty", "fancy",
    "frozen", "gentle", "golden", "hidden", "humble", "lucky", "mellow", "misty",
    "noble", "rustic", "silver", "sleepy", "tidy", "velvet",
];

const NOUNS: &[&str] = &[
    "anchor", "badger", "beacon", "canyon", "comet", "falcon", "forest", "harbor",
    "island", "lantern", "meadow", "otter", "pebble", "pirate", "river", "saddle",
    "summit", "teapot", "thistle", "tower", "walrus", "willow",
];

/// Generates a passphrase with the thread-local RNG.
pub fn generate() -> String {
    generate_with(&mut rand::thread_rng())
}

/// Generates a passphrase from the given RNG.
#[instrument(skip(rng))]
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let pick = |words: &[&'static str], rng: &mut R| -> &'static str {
        words.choose(rng).copied().unwrap_or("draft")
    };
    let phrase = format!(
        "{}-{}-{}",
        pick(ADVERBS, rng),
        pick(ADJECTIVES, rng),
        pick(NOUNS, rng)
    );
    debug!(phrase = %phrase, "Generated passphrase");
    phrase
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn passphrase_has_three_known_words() {
        let mut rng = StdRng::seed_from_u64(42);
        let phrase = generate_with(&mut rng);
        let parts: Vec<_> = phrase.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(ADVERBS.contains(&parts[0]));
        assert!(ADJECTIVES.contains(&parts[1]));
        assert!(NOUNS.contains(&parts[2]));
    }

    #[test]
    fn same_seed_same_phrase() {
        let a = generate_with(&mut StdRng::seed_from_u64(3));
        let b = generate_with(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
