//! Text normalization before synthesis
//!
//! The synthesis engine mispronounces raw digits, so every maximal digit run
//! (optionally grouped with `.` or `,` thousand separators) is rewritten into
//! spoken Indonesian words. Tokens that don't parse as a number are left
//! verbatim rather than failing the call.

use std::sync::LazyLock;

use regex::Regex;

/// Digit runs of 1-3 digits, optionally followed by separator-grouped triples
/// (e.g. "17", "1.000", "2,500,000")
static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:[.,]\d{3})*\b").expect("valid number pattern"));

/// Replace every recognized digit run with its spoken-word expansion.
///
/// Idempotent on text without digit runs.
pub fn expand_numbers(text: &str) -> String {
    NUMBER_RUN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let raw = &caps[0];
            let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
            digits
                .parse::<u64>()
                .map_or_else(|_| raw.to_string(), spell_out)
        })
        .into_owned()
}

/// Spell a number in Indonesian (terbilang)
fn spell_out(n: u64) -> String {
    const UNITS: [&str; 12] = [
        "nol", "satu", "dua", "tiga", "empat", "lima", "enam", "tujuh", "delapan", "sembilan",
        "sepuluh", "sebelas",
    ];

    match n {
        0..=11 => UNITS[n as usize].to_string(),
        12..=19 => format!("{} belas", UNITS[(n - 10) as usize]),
        20..=99 => join(&format!("{} puluh", UNITS[(n / 10) as usize]), n % 10),
        100..=199 => join("seratus", n % 100),
        200..=999 => join(&format!("{} ratus", UNITS[(n / 100) as usize]), n % 100),
        1_000..=1_999 => join("seribu", n % 1_000),
        2_000..=999_999 => join(&format!("{} ribu", spell_out(n / 1_000)), n % 1_000),
        1_000_000..=999_999_999 => {
            join(&format!("{} juta", spell_out(n / 1_000_000)), n % 1_000_000)
        }
        1_000_000_000..=999_999_999_999 => join(
            &format!("{} miliar", spell_out(n / 1_000_000_000)),
            n % 1_000_000_000,
        ),
        _ => join(
            &format!("{} triliun", spell_out(n / 1_000_000_000_000)),
            n % 1_000_000_000_000,
        ),
    }
}

fn join(head: &str, rest: u64) -> String {
    if rest == 0 {
        head.to_string()
    } else {
        format!("{head} {}", spell_out(rest))
    }
}
