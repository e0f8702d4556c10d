//! Turns raw survey cells into taxon candidates.
use once_cell::sync::Lazy;
use regex::Regex;

// Applied in order. Connectives become value separators, rank markers are dropped.
static NOISE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)\band\b").expect("valid connective regex"),
            ",",
        ),
        (
            Regex::new(r"(?i)\bspp\b\.?").expect("valid plural rank marker regex"),
            "",
        ),
        (
            Regex::new(r"(?i)\bsp\b\.?").expect("valid rank marker regex"),
            "",
        ),
    ]
});

/// How many noise patterns are stripped from a cell.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseMode {
    /// Strip every noise pattern.
    #[default]
    #[value(name = "all")]
    All,
    /// Stop after the first pattern that changed the cell.
    #[value(name = "first-match")]
    FirstMatch,
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    noise_mode: NoiseMode,
}

impl Normalizer {
    pub fn new(noise_mode: NoiseMode) -> Self {
        Self { noise_mode }
    }

    /// Splits a raw cell into title-cased candidates, in cell order.
    ///
    /// Duplicates are kept; de-duplication happens once candidates resolve to
    /// canonical names.
    pub fn candidates(&self, raw: &str) -> Vec<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);
        let cleaned = self.strip_noise(trimmed);

        cleaned
            .split(',')
            .map(|piece| piece.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|piece| !piece.is_empty())
            .map(|piece| title_case(&piece))
            .collect()
    }

    fn strip_noise(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for (pattern, replacement) in NOISE_PATTERNS.iter() {
            if !pattern.is_match(&cleaned) {
                continue;
            }
            cleaned = pattern.replace_all(&cleaned, *replacement).into_owned();
            if self.noise_mode == NoiseMode::FirstMatch {
                break;
            }
        }
        cleaned
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(ch);
            in_word = false;
        }
    }
    titled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_mixed_cell_into_candidates() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.candidates("Acropora sp., staghorn acropora, Acropora and pocilloporidae"),
            vec!["Acropora", "Staghorn Acropora", "Acropora", "Pocilloporidae"]
        );
    }

    #[test]
    fn trims_and_title_cases() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.candidates("acropora  "), vec!["Acropora"]);
        assert_eq!(normalizer.candidates("acropora  spp."), vec!["Acropora"]);
        assert_eq!(normalizer.candidates("Acropora,"), vec!["Acropora"]);
        assert_eq!(
            normalizer.candidates("  staghorn    ACROPORA "),
            vec!["Staghorn Acropora"]
        );
    }

    #[test]
    fn noise_is_matched_on_word_boundaries() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.candidates("Acropora aspera"), vec!["Acropora Aspera"]);
        assert_eq!(normalizer.candidates("Sandalolitha"), vec!["Sandalolitha"]);
        assert_eq!(normalizer.candidates("Porites SPP"), vec!["Porites"]);
    }

    #[test]
    fn connective_across_line_break() {
        let normalizer = Normalizer::default();
        assert_eq!(
            normalizer.candidates("Porites and\nFavia"),
            vec!["Porites", "Favia"]
        );
    }

    #[test]
    fn first_match_mode_stops_after_one_pattern() {
        let normalizer = Normalizer::new(NoiseMode::FirstMatch);
        assert_eq!(
            normalizer.candidates("Acropora sp., staghorn acropora, Acropora and pocilloporidae"),
            vec!["Acropora Sp.", "Staghorn Acropora", "Acropora", "Pocilloporidae"]
        );
        assert_eq!(normalizer.candidates("Acropora spp."), vec!["Acropora"]);
    }

    #[test]
    fn empty_cells_yield_nothing() {
        let normalizer = Normalizer::default();
        assert!(normalizer.candidates("").is_empty());
        assert!(normalizer.candidates("   ").is_empty());
        assert!(normalizer.candidates(", ,").is_empty());
        assert!(normalizer.candidates("sp.").is_empty());
    }

    #[test]
    fn title_case_restarts_after_punctuation() {
        assert_eq!(
            title_case("MONTIPORA (submassive encrusting)"),
            "Montipora (Submassive Encrusting)"
        );
        assert_eq!(title_case("fungiid (fungia"), "Fungiid (Fungia");
    }
}
