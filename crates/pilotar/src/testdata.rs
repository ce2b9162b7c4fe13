//! Disposable test data: plausible-looking emails, names, passwords,
//! phone numbers, addresses, and company names.
//!
//! The generator owns its rng and is constructed explicitly at each call
//! site; there is no process-wide instance. Seed one with
//! [`DataGenerator::with_seed`] when a test needs reproducible values.
//! No uniqueness is guaranteed across calls, so tests should assert on
//! format, never on a specific value.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Password length used when callers have no preference
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bruno", "Carmen", "Diego", "Elena", "Felix", "Grace", "Hugo", "Ines", "Jonas",
    "Klara", "Lucia", "Marco", "Nadia", "Oscar", "Paula", "Quinn", "Rosa", "Sven", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Becker", "Castillo", "Dupont", "Eriksen", "Fischer", "Garcia", "Hansen",
    "Ivanov", "Jensen", "Keller", "Lopez", "Moreau", "Novak", "Ortega", "Petrov", "Quintana",
    "Rossi", "Schmidt", "Torres",
];

const MAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "testmail.dev",
    "mailinator.test",
];

const STREET_NAMES: &[&str] = &[
    "Maple Avenue", "Oak Street", "Cedar Lane", "Elm Drive", "Pine Road", "Birch Boulevard",
    "Willow Way", "Harbor Street", "Sunset Avenue", "Station Road",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Lakewood", "Fairview", "Georgetown", "Ashland", "Milton",
    "Clayton", "Dayton", "Salem",
];

const COMPANY_STEMS: &[&str] = &[
    "Vertex", "Bluepeak", "Northwind", "Quantum", "Harbor", "Atlas", "Pinnacle", "Redwood",
    "Summit", "Lighthouse",
];

const COMPANY_SUFFIXES: &[&str] = &["Labs", "Systems", "Group", "Industries", "Partners", "Co"];

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_";

/// Generates random realistic values for disposable test fixtures.
#[derive(Debug)]
pub struct DataGenerator {
    rng: StdRng,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DataGenerator {
    /// Create an entropy-seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator for reproducible tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A random email address on a reserved test domain.
    pub fn email(&mut self) -> String {
        let first = self.pick(FIRST_NAMES).to_lowercase();
        let last = self.pick(LAST_NAMES).to_lowercase();
        let n = self.rng.gen_range(1..1000);
        let domain = self.pick(MAIL_DOMAINS);
        format!("{first}.{last}{n}@{domain}")
    }

    /// A random full name.
    pub fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    /// A random password of `length` characters.
    ///
    /// Contains at least one lowercase letter, one uppercase letter, one
    /// digit, and one symbol whenever `length >= 4`.
    pub fn password(&mut self, length: usize) -> String {
        let mut chars: Vec<char> = Vec::with_capacity(length);
        for class in [LOWER, UPPER, DIGITS, SYMBOLS] {
            if chars.len() < length {
                chars.push(self.pick_byte(class));
            }
        }
        let all: Vec<u8> = [LOWER, UPPER, DIGITS, SYMBOLS].concat();
        while chars.len() < length {
            chars.push(self.pick_byte(&all));
        }
        chars.shuffle(&mut self.rng);
        chars.into_iter().collect()
    }

    /// A random North American phone number.
    pub fn phone(&mut self) -> String {
        format!(
            "+1-{:03}-{:03}-{:04}",
            self.rng.gen_range(200..1000),
            self.rng.gen_range(200..1000),
            self.rng.gen_range(0..10_000)
        )
    }

    /// A random postal address.
    pub fn postal_address(&mut self) -> String {
        format!(
            "{} {}, {}, {:05}",
            self.rng.gen_range(1..2000),
            self.pick(STREET_NAMES),
            self.pick(CITIES),
            self.rng.gen_range(10_000..100_000)
        )
    }

    /// A random company name.
    pub fn company(&mut self) -> String {
        format!("{} {}", self.pick(COMPANY_STEMS), self.pick(COMPANY_SUFFIXES))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.gen_range(0..items.len())]
    }

    fn pick_byte(&mut self, set: &[u8]) -> char {
        set[self.rng.gen_range(0..set.len())] as char
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let mut a = DataGenerator::with_seed(42);
        let mut b = DataGenerator::with_seed(42);
        assert_eq!(a.email(), b.email());
        assert_eq!(a.full_name(), b.full_name());
        assert_eq!(a.password(16), b.password(16));
        assert_eq!(a.phone(), b.phone());
    }

    #[test]
    fn test_email_format() {
        let mut gen = DataGenerator::with_seed(7);
        for _ in 0..20 {
            let email = gen.email();
            let (local, domain) = email.split_once('@').unwrap();
            assert!(local.contains('.'));
            assert!(domain.contains('.'));
        }
    }

    #[test]
    fn test_full_name_has_two_words() {
        let mut gen = DataGenerator::with_seed(7);
        assert_eq!(gen.full_name().split_whitespace().count(), 2);
    }

    #[test]
    fn test_password_length_and_classes() {
        let mut gen = DataGenerator::with_seed(7);
        for length in [4, DEFAULT_PASSWORD_LENGTH, 32] {
            let pw = gen.password(length);
            assert_eq!(pw.chars().count(), length);
            assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
            assert!(pw.chars().any(|c| !c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_short_password_respects_length() {
        let mut gen = DataGenerator::with_seed(7);
        assert_eq!(gen.password(2).chars().count(), 2);
    }

    #[test]
    fn test_phone_format() {
        let mut gen = DataGenerator::with_seed(7);
        let phone = gen.phone();
        assert!(phone.starts_with("+1-"));
        assert_eq!(phone.split('-').count(), 4);
    }

    #[test]
    fn test_postal_address_has_city_and_zip() {
        let mut gen = DataGenerator::with_seed(7);
        let addr = gen.postal_address();
        assert_eq!(addr.split(", ").count(), 3);
    }

    #[test]
    fn test_company_name() {
        let mut gen = DataGenerator::with_seed(7);
        let name = gen.company();
        assert!(COMPANY_SUFFIXES.iter().any(|s| name.ends_with(s)));
    }
}
