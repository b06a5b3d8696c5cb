//! Random password generation from selectable character classes

use rand::Rng;
use thiserror::Error;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const SPECIAL: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("No character classes selected - enable at least one of upper, lower, special")]
    EmptyAlphabet,
}

/// Which character classes to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    pub upper: bool,
    pub lower: bool,
    pub special: bool,
}

impl Charset {
    pub fn new(upper: bool, lower: bool, special: bool) -> Self {
        Self {
            upper,
            lower,
            special,
        }
    }

    /// Number of classes switched on
    pub fn class_count(&self) -> usize {
        [self.upper, self.lower, self.special]
            .iter()
            .filter(|on| **on)
            .count()
    }

    /// Upper, then lower, then special
    pub fn alphabet(&self) -> Vec<char> {
        let mut chars = Vec::new();
        if self.upper {
            chars.extend(UPPER.chars());
        }
        if self.lower {
            chars.extend(LOWER.chars());
        }
        if self.special {
            chars.extend(SPECIAL.chars());
        }
        chars
    }
}

/// Generate a password of `length` characters using the thread RNG
pub fn generate(
    length: usize,
    use_upper: bool,
    use_lower: bool,
    use_special: bool,
) -> Result<String, GeneratorError> {
    generate_with(
        &mut rand::thread_rng(),
        length,
        Charset::new(use_upper, use_lower, use_special),
    )
}

/// Generate with a caller-supplied RNG
///
/// Characters are drawn uniformly and independently, so repeats are allowed.
pub fn generate_with<R: Rng>(
    rng: &mut R,
    length: usize,
    charset: Charset,
) -> Result<String, GeneratorError> {
    let alphabet = charset.alphabet();
    if alphabet.is_empty() {
        return Err(GeneratorError::EmptyAlphabet);
    }

    Ok((0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_alphabet_is_an_error() {
        assert_eq!(generate(5, false, false, false), Err(GeneratorError::EmptyAlphabet));
        // Even when nothing would be drawn
        assert_eq!(generate(0, false, false, false), Err(GeneratorError::EmptyAlphabet));
    }

    #[test]
    fn test_length() {
        assert_eq!(generate(0, true, true, true).unwrap(), "");
        assert_eq!(generate(32, true, false, false).unwrap().chars().count(), 32);
    }

    #[test]
    fn test_respects_classes() {
        let upper = generate(200, true, false, false).unwrap();
        assert!(upper.chars().all(|c| c.is_ascii_uppercase()));

        let lower = generate(200, false, true, false).unwrap();
        assert!(lower.chars().all(|c| c.is_ascii_lowercase()));

        let special = generate(200, false, false, true).unwrap();
        assert!(special.chars().all(|c| SPECIAL.contains(c)));
    }

    #[test]
    fn test_alphabet_order() {
        let alphabet = Charset::new(true, true, true).alphabet();
        assert_eq!(alphabet.len(), 26 + 26 + SPECIAL.chars().count());
        assert_eq!(alphabet[0], 'A');
        assert_eq!(alphabet[26], 'a');
        assert_eq!(alphabet[52], '!');
        assert_eq!(Charset::new(false, true, true).class_count(), 2);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let charset = Charset::new(true, true, false);
        let a = generate_with(&mut StdRng::seed_from_u64(7), 24, charset).unwrap();
        let b = generate_with(&mut StdRng::seed_from_u64(7), 24, charset).unwrap();
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphabetic()));
    }
}
