use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::Deserialize;

use super::{normalize, EngineError};

pub const DEFAULT_K: usize = 10;
pub const DEFAULT_BASE: u64 = 256;
pub const DEFAULT_MODULUS: u64 = 1_000_003;

/// The `(k, base, modulus)` triple of the polynomial hash.
///
/// The triple travels inside the [`Fingerprint`] so that construction and
/// scoring can never disagree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Window length in chars.
    pub k: usize,
    pub base: u64,
    pub modulus: u64,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            base: DEFAULT_BASE,
            modulus: DEFAULT_MODULUS,
        }
    }
}

impl HashParams {
    pub fn new(k: usize, base: u64, modulus: u64) -> Self {
        Self { k, base, modulus }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.k == 0 {
            return Err(EngineError::InvalidParameter("k must be at least 1"));
        }
        if self.base <= 1 {
            return Err(EngineError::InvalidParameter("base must be greater than 1"));
        }
        if self.modulus <= 1 {
            return Err(EngineError::InvalidParameter("modulus must be greater than 1"));
        }
        Ok(())
    }
}

/// How matches are confirmed at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// Store only window hashes. Distinct k-grams that collide merge
    /// silently, so false positives are possible.
    Fast,
    /// Store the literal k-gram per hash bucket and require exact substring
    /// membership, eliminating collision false positives.
    Verified,
}

impl FingerprintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintMode::Fast => "fast",
            FingerprintMode::Verified => "verified",
        }
    }
}

impl FromStr for FingerprintMode {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(FingerprintMode::Fast),
            "verified" => Ok(FingerprintMode::Verified),
            _ => Err(EngineError::InvalidParameter(
                "mode must be \"fast\" or \"verified\"",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Store {
    Fast(HashSet<u64>),
    Verified(HashMap<u64, HashSet<String>>),
}

/// Compact representation of a reference text's k-gram hashes.
///
/// Built once, immutable afterwards; two fingerprints over texts that
/// normalize identically compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    params: HashParams,
    store: Store,
}

impl Fingerprint {
    /// Build a fingerprint over every k-char window of the normalized text.
    ///
    /// Text shorter than `k` after normalization yields an empty fingerprint;
    /// only parameter violations are errors.
    pub fn build(
        text: &str,
        params: HashParams,
        mode: FingerprintMode,
    ) -> Result<Self, EngineError> {
        params.validate()?;

        let mut store = match mode {
            FingerprintMode::Fast => Store::Fast(HashSet::new()),
            FingerprintMode::Verified => Store::Verified(HashMap::new()),
        };

        let chars: Vec<char> = normalize(text).chars().collect();
        if chars.len() >= params.k {
            let k = params.k;
            let mut hash = RollingHash::seed(&chars[..k], &params);
            record(&mut store, hash.value(), &chars[..k]);
            for i in 1..=chars.len() - k {
                hash.roll(chars[i - 1], chars[i + k - 1]);
                record(&mut store, hash.value(), &chars[i..i + k]);
            }
        }

        Ok(Self { params, store })
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    pub fn mode(&self) -> FingerprintMode {
        match self.store {
            Store::Fast(_) => FingerprintMode::Fast,
            Store::Verified(_) => FingerprintMode::Verified,
        }
    }

    /// True when the reference text had no window of length `k`.
    pub fn is_empty(&self) -> bool {
        match &self.store {
            Store::Fast(set) => set.is_empty(),
            Store::Verified(map) => map.is_empty(),
        }
    }

    /// Coverage ratio of the candidate: the fraction of its k-char windows
    /// found in this fingerprint, in `[0.0, 1.0]`.
    ///
    /// Intentionally asymmetric (candidate covered by reference): ranking
    /// treats the reference as ground truth, so this is not a Jaccard
    /// similarity and must not be symmetrized.
    pub fn score(&self, candidate: &str) -> f64 {
        let chars: Vec<char> = normalize(candidate).chars().collect();
        let k = self.params.k;
        if chars.len() < k {
            return 0.0;
        }

        let total = chars.len() - k + 1;
        let mut matches = 0usize;

        let mut hash = RollingHash::seed(&chars[..k], &self.params);
        if self.contains(hash.value(), &chars[..k]) {
            matches += 1;
        }
        for i in 1..total {
            hash.roll(chars[i - 1], chars[i + k - 1]);
            if self.contains(hash.value(), &chars[i..i + k]) {
                matches += 1;
            }
        }

        matches as f64 / total as f64
    }

    fn contains(&self, hash: u64, window: &[char]) -> bool {
        match &self.store {
            Store::Fast(set) => set.contains(&hash),
            Store::Verified(map) => match map.get(&hash) {
                Some(bucket) => bucket.contains(&window.iter().collect::<String>()),
                None => false,
            },
        }
    }
}

fn record(store: &mut Store, hash: u64, window: &[char]) {
    match store {
        Store::Fast(set) => {
            set.insert(hash);
        }
        Store::Verified(map) => {
            map.entry(hash)
                .or_default()
                .insert(window.iter().collect());
        }
    }
}

/// Rolling polynomial hash whose value stays within `[0, modulus)` at every
/// step. Removing the departing char is expressed as adding
/// `modulus - weighted` in `u64`, so no signed re-normalization can be
/// forgotten.
#[derive(Debug, Clone, Copy)]
struct RollingHash {
    value: u64,
    base: u64,
    modulus: u64,
    /// `base^(k-1) mod modulus`, weight of the window's leading char.
    lead_weight: u64,
}

impl RollingHash {
    /// Hash the first window with Horner's scheme.
    fn seed(window: &[char], params: &HashParams) -> Self {
        let mut value = 0u64;
        for &ch in window {
            value = mul_mod(value, params.base, params.modulus);
            value = (value + ch as u64) % params.modulus;
        }
        Self {
            value,
            base: params.base,
            modulus: params.modulus,
            lead_weight: mod_pow(params.base, params.k as u64 - 1, params.modulus),
        }
    }

    /// Shift the window one char to the right in O(1).
    fn roll(&mut self, departing: char, incoming: char) {
        let dropped = mul_mod(departing as u64 % self.modulus, self.lead_weight, self.modulus);
        self.value = (self.value + self.modulus - dropped) % self.modulus;
        self.value = mul_mod(self.value, self.base, self.modulus);
        self.value = (self.value + incoming as u64) % self.modulus;
    }

    fn value(&self) -> u64 {
        self.value
    }
}

fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// Fast exponentiation; O(log exp) multiplications.
fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1 % modulus;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exp >>= 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horner(window: &[char], params: &HashParams) -> u64 {
        let mut value = 0u64;
        for &ch in window {
            value = (value * params.base + ch as u64) % params.modulus;
        }
        value
    }

    #[test]
    fn rolling_hash_matches_direct_horner() {
        let params = HashParams::new(4, 256, 101);
        let text = "The quick brown Fox jumps  over the lazy dog";
        let chars: Vec<char> = normalize(text).chars().collect();

        let fp = Fingerprint::build(text, params, FingerprintMode::Fast).unwrap();
        let expected: HashSet<u64> = chars
            .windows(params.k)
            .map(|w| horner(w, &params))
            .collect();

        match &fp.store {
            Store::Fast(set) => assert_eq!(set, &expected),
            Store::Verified(_) => unreachable!(),
        }
    }

    #[test]
    fn worked_example_scores_one_fifth() {
        let params = HashParams::new(4, 256, 101);
        let fast = Fingerprint::build("abcdabcd", params, FingerprintMode::Fast).unwrap();

        let abcd: Vec<char> = "abcd".chars().collect();
        let hash = horner(&abcd, &params);
        match &fast.store {
            Store::Fast(set) => assert!(set.contains(&hash)),
            Store::Verified(_) => unreachable!(),
        }

        // candidate windows: "abcd", "bcdx", "cdxx", "dxxx", "xxxx";
        // only "abcd" is a literal match
        let verified = Fingerprint::build("abcdabcd", params, FingerprintMode::Verified).unwrap();
        let score = verified.score("abcdxxxx");
        assert!((score - 0.2).abs() < 1e-12, "score was {score}");

        // with modulus 101 the window "xxxx" collides with "dabc" (both hash
        // to 85), so fast mode also counts the false positive
        let score = fast.score("abcdxxxx");
        assert!((score - 0.4).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn self_similarity_is_exact() {
        for mode in [FingerprintMode::Fast, FingerprintMode::Verified] {
            let text = "no two snowflakes are alike";
            let fp = Fingerprint::build(text, HashParams::default(), mode).unwrap();
            assert_eq!(fp.score(text), 1.0);
        }
    }

    #[test]
    fn disjoint_texts_score_zero() {
        let params = HashParams::new(4, 256, 1_000_003);
        let fp = Fingerprint::build("aaaaaaaa", params, FingerprintMode::Verified).unwrap();
        assert_eq!(fp.score("bbbbbbbb"), 0.0);
    }

    #[test]
    fn normalization_invariance() {
        let params = HashParams::new(5, 256, 1_000_003);
        let fp_spaced =
            Fingerprint::build("Hello   World", params, FingerprintMode::Fast).unwrap();
        let fp_plain = Fingerprint::build("hello world", params, FingerprintMode::Fast).unwrap();

        assert_eq!(fp_spaced, fp_plain);
        assert_eq!(fp_spaced.score("hello world"), fp_plain.score("hello   World"));
        assert_eq!(fp_spaced.score("hello world"), 1.0);
    }

    #[test]
    fn verified_score_never_exceeds_fast() {
        // k=1, modulus=2: 'a' (97) and 'c' (99) collide in bucket 1,
        // 'b' (98) and 'd' (100) in bucket 0.
        let params = HashParams::new(1, 256, 2);
        let fast = Fingerprint::build("ab", params, FingerprintMode::Fast).unwrap();
        let verified = Fingerprint::build("ab", params, FingerprintMode::Verified).unwrap();

        let fast_score = fast.score("cd");
        let verified_score = verified.score("cd");
        assert_eq!(fast_score, 1.0);
        assert_eq!(verified_score, 0.0);
        assert!(verified_score <= fast_score);

        // on honest matches both modes agree
        assert_eq!(fast.score("ab"), verified.score("ab"));
    }

    #[test]
    fn short_text_is_a_boundary_not_an_error() {
        let params = HashParams::new(10, 256, 1_000_003);
        let fp = Fingerprint::build("tiny", params, FingerprintMode::Fast).unwrap();
        assert!(fp.is_empty());
        assert_eq!(fp.score("also tiny"), 0.0);

        let full = Fingerprint::build("long enough reference text", params, FingerprintMode::Fast)
            .unwrap();
        assert_eq!(full.score("shrt"), 0.0);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        for params in [
            HashParams::new(0, 256, 101),
            HashParams::new(4, 1, 101),
            HashParams::new(4, 0, 101),
            HashParams::new(4, 256, 1),
            HashParams::new(4, 256, 0),
        ] {
            let err = Fingerprint::build("abcdef", params, FingerprintMode::Fast).unwrap_err();
            assert!(matches!(err, EngineError::InvalidParameter(_)));
        }
    }

    #[test]
    fn equivalent_texts_build_equal_fingerprints() {
        let params = HashParams::default();
        for mode in [FingerprintMode::Fast, FingerprintMode::Verified] {
            let a = Fingerprint::build("  Rolling HASH   windows ", params, mode).unwrap();
            let b = Fingerprint::build("rolling hash windows", params, mode).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!(" Fast ".parse::<FingerprintMode>(), Ok(FingerprintMode::Fast));
        assert_eq!(
            "verified".parse::<FingerprintMode>(),
            Ok(FingerprintMode::Verified)
        );
        assert!("fuzzy".parse::<FingerprintMode>().is_err());
    }

    #[test]
    fn mod_pow_matches_naive_multiplication() {
        for modulus in [2u64, 101, 1_000_003] {
            for exp in 0..20u64 {
                let mut naive = 1 % modulus;
                for _ in 0..exp {
                    naive = mul_mod(naive, 256, modulus);
                }
                assert_eq!(mod_pow(256, exp, modulus), naive);
            }
        }
    }
}
