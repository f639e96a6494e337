//! Profanity masking for rendered text.

/// Words masked when no list is configured.
pub const DEFAULT_FORBIDDEN_WORDS: &[&str] = &["редиска", "оболтус", "каналья"];

const MASK_CHAR: char = '*';

/// Masks forbidden words, keeping the first letter of each match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Censor {
    words: Vec<String>,
}

impl Default for Censor {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_WORDS.iter().map(|w| w.to_string()))
    }
}

impl Censor {
    pub fn new(words: impl IntoIterator<Item = String>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated word list.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::to_string))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Mask every forbidden word in `text`.
    ///
    /// Per word the variants as given, capitalized and uppercase are tried in
    /// that order; only the first variant present is masked, everywhere it
    /// occurs.
    pub fn censor(&self, text: &str) -> String {
        let mut text = text.to_string();
        for word in &self.words {
            let variant = variants(word).into_iter().find(|v| text.contains(v.as_str()));
            if let Some(variant) = variant {
                text = text.replace(&variant, &mask(&variant));
            }
        }
        text
    }

    /// Censor an optional value. A missing value is passed through unchanged
    /// with a diagnostic rather than failing the caller.
    pub fn censor_opt(&self, text: Option<&str>) -> Option<String> {
        match text {
            Some(text) => Some(self.censor(text)),
            None => {
                tracing::warn!("censor received no text, leaving value unchanged");
                None
            }
        }
    }
}

fn variants(word: &str) -> [String; 3] {
    [word.to_string(), capitalize(word), word.to_uppercase()]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// First character followed by one asterisk per remaining character.
fn mask(variant: &str) -> String {
    let mut chars = variant.chars();
    match chars.next() {
        Some(first) => std::iter::once(first)
            .chain(chars.map(|_| MASK_CHAR))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_lowercase_word() {
        let censor = Censor::default();
        assert_eq!(censor.censor("Ты редиска"), "Ты р******");
    }

    #[test]
    fn test_already_masked_text_is_stable() {
        let censor = Censor::default();
        let once = censor.censor("Ты редиска");
        assert_eq!(censor.censor(&once), once);
    }

    #[test]
    fn test_capitalized_and_uppercase_variants() {
        let censor = Censor::default();
        assert_eq!(censor.censor("Оболтус пришёл"), "О****** пришёл");
        assert_eq!(censor.censor("КАНАЛЬЯ!"), "К******!");
    }

    #[test]
    fn test_only_first_present_variant_is_masked() {
        let censor = Censor::new(["oaf".to_string()]);
        assert_eq!(censor.censor("oaf and Oaf"), "o** and Oaf");
        assert_eq!(censor.censor("Oaf and OAF"), "O** and OAF");
    }

    #[test]
    fn test_every_occurrence_of_the_variant_is_masked() {
        let censor = Censor::new(["oaf".to_string()]);
        assert_eq!(censor.censor("oaf, oaf"), "o**, o**");
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let censor = Censor::default();
        assert_eq!(censor.censor("Доброе утро"), "Доброе утро");
    }

    #[test]
    fn test_missing_text_passes_through() {
        let censor = Censor::default();
        assert_eq!(censor.censor_opt(None), None);
        assert_eq!(censor.censor_opt(Some("редиска")), Some("р******".to_string()));
    }

    #[test]
    fn test_word_list_is_configurable() {
        let censor = Censor::from_list("darn, heck ,");
        assert_eq!(censor.words(), ["darn".to_string(), "heck".to_string()]);
        assert_eq!(censor.censor("heck no"), "h*** no");
    }
}
