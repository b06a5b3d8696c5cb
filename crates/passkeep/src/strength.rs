//! Password strength heuristic shown after `passkeep add`

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Weak => write!(f, "Weak"),
            Strength::Moderate => write!(f, "Moderate"),
            Strength::Strong => write!(f, "Strong"),
        }
    }
}

/// Under 6 characters is weak. Otherwise an ASCII uppercase letter plus a
/// lowercase letter or digit is strong, anything else moderate.
pub fn check(password: &str) -> Strength {
    if password.chars().count() < 6 {
        return Strength::Weak;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_upper && (has_lower || has_digit) {
        Strength::Strong
    } else {
        Strength::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        assert_eq!(check(""), Strength::Weak);
        assert_eq!(check("Ab1!x"), Strength::Weak);
        assert_eq!(check("abcdef"), Strength::Moderate);
        assert_eq!(check("ABCDEF"), Strength::Moderate);
        assert_eq!(check("!!!!!!"), Strength::Moderate);
        assert_eq!(check("Abcdef"), Strength::Strong);
        assert_eq!(check("ABCDE1"), Strength::Strong);
    }

    #[test]
    fn test_display() {
        assert_eq!(Strength::Moderate.to_string(), "Moderate");
    }
}
