//! Lexicon-based sentiment scoring for the conversation monitor.
//!
//! Polarity is the mean score of the opinion words in a text, in [-1, 1].
//! An intensifier directly before a word scales it; a negation within the
//! three words before it flips and halves it.

/// Opinion words and their polarity.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brave", 0.8),
    ("calm", 0.3),
    ("confident", 0.5),
    ("excellent", 1.0),
    ("excited", 0.4),
    ("fantastic", 0.4),
    ("fine", 0.4),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("grateful", 0.6),
    ("great", 0.8),
    ("happy", 0.8),
    ("hopeful", 0.5),
    ("love", 0.5),
    ("nice", 0.6),
    ("okay", 0.5),
    ("perfect", 1.0),
    ("positive", 0.23),
    ("proud", 0.8),
    ("strong", 0.43),
    ("wonderful", 1.0),
    ("afraid", -0.6),
    ("angry", -0.5),
    ("anxious", -0.3),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("depressed", -0.8),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("exhausted", -0.4),
    ("frustrated", -0.6),
    ("hard", -0.3),
    ("hopeless", -0.8),
    ("horrible", -1.0),
    ("hurt", -0.4),
    ("lonely", -0.5),
    ("miserable", -1.0),
    ("negative", -0.3),
    ("painful", -0.7),
    ("sad", -0.5),
    ("scared", -0.5),
    ("sorry", -0.5),
    ("stressed", -0.4),
    ("terrible", -1.0),
    ("tired", -0.4),
    ("upset", -0.5),
    ("worried", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("pretty", 1.1),
    ("slightly", 0.7),
    ("somewhat", 0.7),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
    "can't", "won't", "couldn't", "shouldn't",
];

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_REACH: usize = 3;

fn tokens(text: &str) -> Vec<String> {
    text.replace('\u{2019}', "'")
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

/// Polarity of `text` in [-1, 1]; 0 when it has no opinion words.
pub fn polarity(text: &str) -> f64 {
    let tokens = tokens(text);
    let mut total = 0.0;
    let mut count = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some(mut score) = lookup(LEXICON, token) else {
            continue;
        };
        if let Some(factor) = i.checked_sub(1).and_then(|p| lookup(INTENSIFIERS, &tokens[p])) {
            score *= factor;
        }
        let start = i.saturating_sub(NEGATION_REACH);
        if tokens[start..i].iter().any(|t| NEGATIONS.contains(&t.as_str())) {
            score *= NEGATION_FACTOR;
        }
        total += score.clamp(-1.0, 1.0);
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        (total / count as f64).clamp(-1.0, 1.0)
    }
}

/// Least-squares slope of `values` against their index; 0 below two points.
pub fn trend_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = values.iter().sum::<f64>() / n as f64;
    let (num, den) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
        let dx = i as f64 - mean_x;
        (num + dx * (y - mean_y), den + dx * dx)
    });
    num / den
}
