//! Beta Code Transliteration
//!
//! Bridges Greek script and the flat Beta Code alphabet used by the lexicon
//! markup. Both directions pass unmappable characters through unchanged and
//! never fail.
//!
//! | Beta | Greek | Beta | Greek | Beta | Mark            |
//! |------|-------|------|-------|------|-----------------|
//! | a    | α     | n    | ν     | )    | smooth breathing |
//! | b    | β     | c    | ξ     | (    | rough breathing  |
//! | g    | γ     | o    | ο     | /    | acute            |
//! | d    | δ     | p    | π     | \    | grave            |
//! | e    | ε     | r    | ρ     | =    | circumflex       |
//! | z    | ζ     | s    | σ/ς   | +    | diaeresis        |
//! | h    | η     | t    | τ     | \|   | iota subscript   |
//! | q    | θ     | u    | υ     | _    | macron           |
//! | i    | ι     | f    | φ     | ^    | breve            |
//! | k    | κ     | x    | χ     |      |                 |
//! | l    | λ     | y    | ψ     |      |                 |
//! | m    | μ     | w    | ω     |      |                 |
//!
//! Capitals are written with a leading `*`, optionally followed by the
//! diacritics before the letter (`*)/a` is `Ἄ`).

use unicode_normalization::UnicodeNormalization;

const LETTERS: &[(char, char)] = &[
    ('a', 'α'),
    ('b', 'β'),
    ('g', 'γ'),
    ('d', 'δ'),
    ('e', 'ε'),
    ('z', 'ζ'),
    ('h', 'η'),
    ('q', 'θ'),
    ('i', 'ι'),
    ('k', 'κ'),
    ('l', 'λ'),
    ('m', 'μ'),
    ('n', 'ν'),
    ('c', 'ξ'),
    ('o', 'ο'),
    ('p', 'π'),
    ('r', 'ρ'),
    ('s', 'σ'),
    ('t', 'τ'),
    ('u', 'υ'),
    ('f', 'φ'),
    ('x', 'χ'),
    ('y', 'ψ'),
    ('w', 'ω'),
    ('v', 'ϝ'),
];

const MARKS: &[(char, char)] = &[
    (')', '\u{0313}'),
    ('(', '\u{0314}'),
    ('/', '\u{0301}'),
    ('\\', '\u{0300}'),
    ('=', '\u{0342}'),
    ('+', '\u{0308}'),
    ('|', '\u{0345}'),
    ('_', '\u{0304}'),
    ('^', '\u{0306}'),
];

const RAISED_DOT: char = '\u{00b7}';

fn beta_letter(c: char) -> Option<char> {
    let lower = c.to_ascii_lowercase();
    LETTERS.iter().find(|(b, _)| *b == lower).map(|(_, g)| *g)
}

fn beta_mark(c: char) -> Option<char> {
    MARKS.iter().find(|(b, _)| *b == c).map(|(_, m)| *m)
}

fn greek_letter(c: char) -> Option<(char, bool)> {
    let lower = match c {
        'ς' | 'ϲ' => 's',
        _ => {
            let lowered = c.to_lowercase().next().unwrap_or(c);
            return LETTERS
                .iter()
                .find(|(_, g)| *g == lowered)
                .map(|(b, _)| (*b, lowered != c));
        }
    };
    Some((lower, false))
}

fn greek_mark(c: char) -> Option<char> {
    MARKS.iter().find(|(_, m)| *m == c).map(|(b, _)| *b)
}

/// Greek script to Beta Code.
///
/// Works on the canonical decomposition so precomposed polytonic letters map
/// to letter plus diacritic sequences. Final and lunate sigma both flatten to
/// `s`; the native direction restores the final form from position.
pub fn to_flat(native: &str) -> String {
    let mut out = String::with_capacity(native.len());
    let mut chars = native.nfd().peekable();

    while let Some(c) = chars.next() {
        if let Some((letter, upper)) = greek_letter(c) {
            let mut marks = String::new();
            while let Some(beta) = chars.peek().copied().and_then(greek_mark) {
                marks.push(beta);
                chars.next();
            }
            if upper {
                out.push('*');
                out.push_str(&marks);
                out.push(letter);
            } else {
                out.push(letter);
                out.push_str(&marks);
            }
        } else if c == RAISED_DOT {
            out.push(':');
        } else {
            out.push(c);
        }
    }

    out.nfc().collect()
}

/// Beta Code to Greek script (greedy, NFC composed).
///
/// Diacritic symbols are only read as marks when attached to a letter, so
/// bibliographic parentheses and slashes in running text survive intact.
pub fn to_native(flat: &str) -> String {
    let chars: Vec<char> = flat.nfc().collect();
    let mut out = String::with_capacity(flat.len() * 2);
    let mut attached = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '*' {
            let mut j = i + 1;
            let mut marks = Vec::new();
            while let Some(m) = chars.get(j).copied().and_then(beta_mark) {
                marks.push(m);
                j += 1;
            }
            if let Some(letter) = chars.get(j).copied().and_then(beta_letter) {
                let (letter, consumed) = resolve_sigma(letter, &chars, j);
                out.extend(letter.to_uppercase());
                out.extend(marks);
                attached = true;
                i = j + consumed;
                continue;
            }
            out.push(c);
            attached = false;
            i += 1;
            continue;
        }

        if let Some(letter) = beta_letter(c) {
            let (letter, consumed) = resolve_sigma(letter, &chars, i);
            out.push(letter);
            attached = true;
            i += consumed;
            continue;
        }

        if attached {
            if let Some(mark) = beta_mark(c) {
                out.push(mark);
                i += 1;
                continue;
            }
        }

        out.push(if c == ':' { RAISED_DOT } else { c });
        attached = false;
        i += 1;
    }

    out.nfc().collect()
}

/// Pick the sigma variant for an `s` at `pos`; returns the letter and the
/// number of input characters consumed. Digits after a headword are homonym
/// numbers, not sigma variants, so `lo/gos1` keeps its final sigma.
fn resolve_sigma(letter: char, chars: &[char], pos: usize) -> (char, usize) {
    if letter != 'σ' {
        return (letter, 1);
    }
    let next = chars[pos + 1..]
        .iter()
        .copied()
        .find(|c| beta_mark(*c).is_none());
    match next {
        Some(n) if beta_letter(n).is_some() => ('σ', 1),
        _ => ('ς', 1),
    }
}
