//! Reversible XOR obfuscation for stored secrets
//!
//! Every character is XORed with a single key byte. Applying the transform
//! twice gives back the input, so "encrypt" and "decrypt" are the same call.
//! This is NOT encryption; it only keeps secrets from being read at a glance.

/// Key used when none is configured
pub const DEFAULT_KEY: u8 = 10;

/// XOR every character of `value` with `key`
///
/// Works per Unicode scalar value. Only the low eight bits of a code point
/// change, which keeps the result a valid `char` (surrogates sit in an
/// aligned 0x800 block) and makes ASCII input identical to a byte-wise XOR.
pub fn transform(value: &str, key: u8) -> String {
    value
        .chars()
        .map(|c| {
            char::from_u32(c as u32 ^ u32::from(key))
                .expect("flipping the low byte of a char never yields a surrogate")
        })
        .collect()
}
