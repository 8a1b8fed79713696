//! Normalized quote text and the text predicates evaluators share.
//!
//! Every keyword check runs against lowercase, accent-folded text so that
//! "Décennale", "DECENNALE" and "decennale" are the same signal.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::Quote;

static SIRET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{3})\s?(\d{3})\s?(\d{3})\s?(\d{5})\b").expect("static regex")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("static regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+33\s?|\b0)[1-9](?:[\s.-]?\d{2}){4}\b").expect("static regex")
});
static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}\b").expect("static regex"));
static VAT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfr\s?[0-9a-z]{2}\s?\d{9}\b").expect("static regex"));
static DEPOSIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"acompte[^0-9%.;]{0,40}?(\d{1,3}(?:[.,]\d+)?)\s?%|(\d{1,3}(?:[.,]\d+)?)\s?%\s*(?:d'|de\s)?(?:l')?acompte",
    )
    .expect("static regex")
});
static COMMERCIAL_WARRANTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"garantie\s+(?:commerciale|constructeur|fabricant|pieces|materiel|contractuelle)[^.;]{0,40}?(\d{1,2})\s?ans",
    )
    .expect("static regex")
});
static DTU_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdtu\s?\d{1,2}(?:\.\d{1,2})?").expect("static regex"));
static POLICY_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:police|contrat)\s*(?:n\s?°|no|numero)\s*:?\s*[a-z0-9][a-z0-9/-]{3,}")
        .expect("static regex")
});

/// Words carrying no meaning for overlap checks.
const STOPWORDS: &[&str] = &[
    "les", "des", "une", "pour", "avec", "sur", "dans", "par", "aux", "the", "and", "est", "sans",
];

/// Fold a character to its unaccented lowercase ASCII form where one exists.
fn fold_char(c: char, out: &mut String) {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'ã' => out.push('a'),
        'é' | 'è' | 'ê' | 'ë' => out.push('e'),
        'î' | 'ï' | 'í' | 'ì' => out.push('i'),
        'ô' | 'ö' | 'ó' | 'ò' | 'õ' => out.push('o'),
        'û' | 'ü' | 'ù' | 'ú' => out.push('u'),
        'ç' => out.push('c'),
        'ÿ' => out.push('y'),
        'ñ' => out.push('n'),
        'œ' => out.push_str("oe"),
        'æ' => out.push_str("ae"),
        '\u{2019}' | '\u{2018}' | '`' => out.push('\''),
        '\u{00a0}' | '\u{202f}' => out.push(' '),
        other => out.push(other),
    }
}

/// Lowercase, fold accents and collapse whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        fold_char(c, &mut folded);
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keywords of at most this many characters must match a whole word.
const SHORT_TERM_LEN: usize = 3;

/// Whether `needle` occurs in `haystack` as a term.
///
/// The start is always anchored on a word boundary. Longer keywords may run
/// on so that singulars also match their plural ("garantie" matches
/// "garanties"). Short keywords are acronyms ("sav", "rcs", "nf") and must
/// end on a word boundary too. Both sides must be normalized.
#[must_use]
pub fn contains_term(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let whole_word = needle.chars().count() <= SHORT_TERM_LEN;
    haystack.match_indices(needle).any(|(idx, _)| {
        let starts = haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let ends = !whole_word
            || haystack[idx + needle.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        starts && ends
    })
}

/// Meaningful tokens of a normalized string.
fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .collect()
}

/// Share of the tokens of `reference` found (fuzzily) in `candidate`.
///
/// Tokens match when their Jaro-Winkler similarity reaches 0.9, which
/// absorbs plurals and small spelling variants ("carrelage"/"carrelages").
#[must_use]
pub fn token_coverage(reference: &str, candidate: &str) -> f64 {
    let reference = normalize_text(reference);
    let candidate = normalize_text(candidate);
    let wanted = tokens(&reference);
    if wanted.is_empty() {
        return 0.0;
    }
    let available = tokens(&candidate);
    let found = wanted
        .iter()
        .filter(|w| {
            available
                .iter()
                .any(|a| a == *w || strsim::jaro_winkler(w, a) >= 0.9)
        })
        .count();
    found as f64 / wanted.len() as f64
}

/// Keep only the digits of an identifier.
#[must_use]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Validate a SIRET: 14 digits passing the Luhn checksum.
///
/// Establishments of La Poste (SIREN 356000000) use a digit-sum rule instead.
#[must_use]
pub fn is_valid_siret(value: &str) -> bool {
    let digits = digits_only(value);
    if digits.len() != 14 || digits.len() != value.chars().filter(|c| !c.is_whitespace()).count()
    {
        return false;
    }
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.starts_with("356000000") {
        return values.iter().sum::<u32>() % 5 == 0;
    }
    let sum: u32 = values
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Searchable, normalized view of a quote.
#[derive(Debug, Clone)]
pub struct QuoteText {
    full: String,
    lines: Vec<String>,
}

impl QuoteText {
    /// Index every textual part of the quote.
    #[must_use]
    pub fn from_quote(quote: &Quote) -> Self {
        let data = &quote.extracted_data;
        let lines: Vec<String> = data
            .line_items
            .iter()
            .map(|item| normalize_text(&item.description))
            .collect();

        let mut parts: Vec<String> = lines.clone();
        parts.extend(data.legal_mentions.text.iter().map(|t| normalize_text(t)));
        let optional = [
            data.payment_terms.as_deref(),
            data.free_text.as_deref(),
            data.issuer.name.as_deref(),
            data.issuer.address.as_deref(),
            data.issuer.phone.as_deref(),
            data.issuer.email.as_deref(),
        ];
        parts.extend(optional.into_iter().flatten().map(normalize_text));

        Self {
            full: parts.join(" \n "),
            lines,
        }
    }

    /// All normalized text, parts separated by newlines.
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Normalized line-item descriptions, in quote order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether a normalized keyword appears anywhere.
    #[must_use]
    pub fn contains(&self, keyword: &str) -> bool {
        contains_term(&self.full, keyword)
    }

    /// Keywords from a table that appear in the text, in table order.
    #[must_use]
    pub fn matched<'k>(&self, keywords: &[&'k str]) -> Vec<&'k str> {
        keywords
            .iter()
            .copied()
            .filter(|k| self.contains(k))
            .collect()
    }

    /// First keyword of a table that appears in the text.
    #[must_use]
    pub fn first_match<'k>(&self, keywords: &[&'k str]) -> Option<&'k str> {
        keywords.iter().copied().find(|k| self.contains(k))
    }

    /// First SIRET-shaped number in the text.
    #[must_use]
    pub fn find_siret(&self) -> Option<String> {
        SIRET_RE
            .captures(&self.full)
            .map(|caps| caps.iter().skip(1).flatten().map(|m| m.as_str()).collect())
    }

    #[must_use]
    pub fn has_email(&self) -> bool {
        EMAIL_RE.is_match(&self.full)
    }

    #[must_use]
    pub fn has_phone(&self) -> bool {
        PHONE_RE.is_match(&self.full)
    }

    #[must_use]
    pub fn has_postcode(&self) -> bool {
        POSTCODE_RE.is_match(&self.full)
    }

    /// Intra-community VAT number (FR + key + SIREN).
    #[must_use]
    pub fn has_vat_number(&self) -> bool {
        VAT_NUMBER_RE.is_match(&self.full)
    }

    #[must_use]
    pub fn has_dtu_code(&self) -> bool {
        DTU_CODE_RE.is_match(&self.full)
    }

    #[must_use]
    pub fn has_policy_number(&self) -> bool {
        POLICY_NUMBER_RE.is_match(&self.full)
    }

    /// Highest deposit percentage stated ("acompte de 30 %", "40% d'acompte").
    #[must_use]
    pub fn deposit_percentage(&self) -> Option<f64> {
        DEPOSIT_RE
            .captures_iter(&self.full)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter_map(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
            .filter(|pct| (0.0..=100.0).contains(pct))
            .reduce(f64::max)
    }

    /// Longest commercial warranty stated, in years.
    #[must_use]
    pub fn commercial_warranty_years(&self) -> Option<u32> {
        COMMERCIAL_WARRANTY_RE
            .captures_iter(&self.full)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtractedData, LineItem};

    fn quote_with(lines: &[&str], free_text: &str) -> Quote {
        Quote {
            extracted_data: ExtractedData {
                line_items: lines
                    .iter()
                    .map(|d| LineItem {
                        description: (*d).to_string(),
                        ..Default::default()
                    })
                    .collect(),
                free_text: Some(free_text.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_folds_accents() {
        assert_eq!(
            normalize_text("Garantie  DÉCENNALE\tmain d’œuvre"),
            "garantie decennale main d'oeuvre"
        );
    }

    #[test]
    fn test_contains_term_anchors_word_start() {
        assert!(contains_term("garanties legales", "garantie"));
        assert!(!contains_term("pose de carrelage", "age"));
    }

    #[test]
    fn test_short_terms_match_whole_words() {
        assert!(!contains_term("notre savoir-faire artisanal", "sav"));
        assert!(contains_term("sav assure 7j/7", "sav"));
        assert!(!contains_term("mme dupont", "mm"));
        assert!(contains_term("isolant de 100 mm", "mm"));
        assert!(!contains_term("sasu dupont", "sas"));
        assert!(contains_term("fenetres certifiees nf", "nf"));
        assert!(contains_term("inscrite au rm", "rm"));
    }

    #[test]
    fn test_siret_luhn() {
        assert!(is_valid_siret("73282932000074"));
        assert!(is_valid_siret("732 829 320 00074"));
        assert!(!is_valid_siret("73282932000075"));
        assert!(!is_valid_siret("7328293200007"));
        assert!(!is_valid_siret("7328293200007A"));
    }

    #[test]
    fn test_find_siret_in_text() {
        let text = QuoteText::from_quote(&quote_with(&[], "SIRET : 732 829 320 00074"));
        assert_eq!(text.find_siret().as_deref(), Some("73282932000074"));
    }

    #[test]
    fn test_deposit_percentage() {
        let text = QuoteText::from_quote(&quote_with(
            &[],
            "Acompte de 30 % à la commande, solde à la réception",
        ));
        assert_eq!(text.deposit_percentage(), Some(30.0));

        let text = QuoteText::from_quote(&quote_with(&[], "40% d'acompte"));
        assert_eq!(text.deposit_percentage(), Some(40.0));
    }

    #[test]
    fn test_commercial_warranty_years() {
        let text = QuoteText::from_quote(&quote_with(
            &[],
            "Garantie constructeur pompe à chaleur 5 ans",
        ));
        assert_eq!(text.commercial_warranty_years(), Some(5));
    }

    #[test]
    fn test_token_coverage_tolerates_plurals() {
        let coverage = token_coverage("pose carrelage sol", "Pose de carrelages au sol");
        assert!((coverage - 1.0).abs() < f64::EPSILON);
        assert!(token_coverage("peinture murs", "remplacement chaudière") < 0.5);
    }

    #[test]
    fn test_contacts_detected() {
        let text = QuoteText::from_quote(&quote_with(
            &[],
            "Tél. 01 23 45 67 89 - contact@dupont-renov.fr - 75011 Paris",
        ));
        assert!(text.has_phone());
        assert!(text.has_email());
        assert!(text.has_postcode());
    }
}
