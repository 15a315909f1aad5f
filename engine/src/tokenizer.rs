use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Turns raw text into an ordered sequence of index terms.
pub trait Tokenizer: Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// NFKC + lowercase + stopword removal, with optional English stemming.
///
/// The settings are persisted alongside the index so queries are analyzed the
/// same way documents were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    pub stem: bool,
    pub stopwords: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self { stem: true, stopwords: true }
    }
}

impl Tokenizer for Analyzer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        RE.find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|token| !(self.stopwords && is_stopword(token)))
            .map(|token| if self.stem { STEMMER.stem(token).into_owned() } else { token.to_string() })
            .collect()
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }
