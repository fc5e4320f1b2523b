//! Heuristic 0-100 score of how conversational a text reads.
//!
//! | Signal                                   | Points        |
//! |------------------------------------------|---------------|
//! | question marks                           | 10 each, ≤ 20 |
//! | ellipses (runs of 3+ dots)               | 8 each, ≤ 15  |
//! | em-dash asides (`—like this—`)           | 8 each, ≤ 15  |
//! | filler words present                     | 5 each, ≤ 20  |
//! | spread of sentence lengths > 5 / > 3     | 15 / 10       |
//! | an emoji or emoticon                     | 15            |

const FILLERS: &[&str] = &[
    "bueno", "mira", "verdad", "pues", "entonces", "claro", "honestly", "actually",
    "you know", "i mean",
];

const EMOTICONS: &[&str] = &[":)", ":(", ":D", ";)", ";-)"];

/// Score `text` from 0 to 100.
pub fn humanness_score(text: &str) -> u32 {
    let questions = text.matches('?').count() as u32;
    let lower = text.to_lowercase();
    let fillers = FILLERS.iter().filter(|f| lower.contains(*f)).count() as u32;

    let mut score = (questions * 10).min(20)
        + (ellipses(text) * 8).min(15)
        + (dash_asides(text) * 8).min(15)
        + (fillers * 5).min(20)
        + sentence_spread_points(text);
    if has_emoji(text) {
        score += 15;
    }
    score.min(100)
}

fn ellipses(text: &str) -> u32 {
    let mut count = 0;
    let mut run = 0;
    for c in text.chars().chain(std::iter::once(' ')) {
        if c == '.' {
            run += 1;
        } else {
            if run >= 3 {
                count += 1;
            }
            run = 0;
        }
    }
    count
}

/// Non-overlapping `—…—` pairs with at least one character between them.
fn dash_asides(text: &str) -> u32 {
    let mut count = 0;
    let mut rest = text;
    while let Some(open) = rest.find('—') {
        let after = &rest[open + '—'.len_utf8()..];
        let mut inner = after.char_indices();
        let Some((_, first)) = inner.next() else {
            break;
        };
        let skip = first.len_utf8();
        match after[skip..].find('—') {
            Some(close) => {
                count += 1;
                rest = &after[skip + close + '—'.len_utf8()..];
            }
            None => break,
        }
    }
    count
}

fn sentence_spread_points(text: &str) -> u32 {
    let lengths: Vec<usize> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.split_whitespace().count())
        .collect();
    if lengths.len() < 2 {
        return 0;
    }
    let longest = lengths.iter().max().copied().unwrap_or(0);
    let shortest = lengths.iter().min().copied().unwrap_or(0);
    match longest - shortest {
        s if s > 5 => 15,
        s if s > 3 => 10,
        _ => 0,
    }
}

fn has_emoji(text: &str) -> bool {
    text.chars().any(|c| ('\u{1F600}'..='\u{1F64F}').contains(&c))
        || EMOTICONS.iter().any(|e| text.contains(e))
}
