use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::config::SanitizerConfig;

/// Base vocabulary flagged in any language.
const BASE_DICTIONARY: &[&str] = &[
    "ass", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap", "cunt", "damn", "dick",
    "douche", "fuck", "fucked", "fucker", "fucking", "jackass", "motherfucker", "piss", "prick",
    "pussy", "shit", "slut", "twat", "wanker", "whore",
];

/// Spanish insults hosts most often type in comments.
const SUPPLEMENTAL_WORDS: &[&str] = &[
    "boludo", "cabron", "cabrón", "carajo", "chingada", "chingar", "culero", "estupido",
    "estúpido", "estupida", "estúpida", "gilipollas", "huevon", "huevón", "idiota", "imbecil",
    "imbécil", "joder", "maldito", "maldita", "mamon", "mamón", "mierda", "pelotudo", "pendeja",
    "pendejo", "puta", "puto", "tarado", "verga",
];

const MASK: char = '*';

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{M}]+").expect("word pattern compiles"))
}

/// Dictionary-backed comment filter. Build one per process and share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CommentSanitizer {
    words: HashSet<String>,
}

impl Default for CommentSanitizer {
    fn default() -> Self {
        Self::with_words(std::iter::empty::<&str>())
    }
}

impl CommentSanitizer {
    /// Built-in dictionaries plus `extra` words.
    pub fn with_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sanitizer = Self {
            words: HashSet::new(),
        };
        sanitizer.add_words(BASE_DICTIONARY.iter().chain(SUPPLEMENTAL_WORDS));
        sanitizer.add_words(extra);
        sanitizer
    }

    pub fn from_config(config: &SanitizerConfig) -> Self {
        Self::with_words(&config.extra_words)
    }

    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(
            words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty()),
        );
    }

    pub fn is_listed(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Masks every listed word with asterisks, keeping the text length in characters.
    pub fn clean(&self, text: &str) -> String {
        word_pattern()
            .replace_all(text, |caps: &Captures<'_>| {
                let word = &caps[0];
                if self.is_listed(word) {
                    MASK.to_string().repeat(word.chars().count())
                } else {
                    word.to_string()
                }
            })
            .into_owned()
    }

    pub fn is_offensive(&self, text: &str) -> bool {
        self.clean(text) != text
    }
}
