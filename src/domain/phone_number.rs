/// Shortest accepted number, in digits.
const MIN_DIGITS: usize = 8;
/// Longest accepted number, in digits. Same bound as E.164.
const MAX_DIGITS: usize = 15;

/// A normalized phone number: ASCII digits only, no leading `+`,
/// between 8 and 15 digits long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalizes a single token such as `+1 (415) 555-2671`.
    ///
    /// Everything except ASCII digits is dropped, so separators, spaces and
    /// the `+` prefix never reach the canonical form. There is no country
    /// code table; the only check is the digit count.
    pub fn parse(token: &str) -> Result<PhoneNumber, String> {
        let token = token.trim();
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(format!("{} does not contain any digits.", token));
        }

        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return Err(format!(
                "{} has {} digits, expected between {} and {}.",
                token,
                digits.len(),
                MIN_DIGITS,
                MAX_DIGITS
            ));
        }

        Ok(Self(digits))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
