// src/content/slug.rs
// =============================================================================
// Turns a page title into the slug the page is expected to declare.
//
// Examples:
//   "C# Basics"                   -> "c-sharp-basics"
//   "About the .NET Framework?"   -> "about-the-dot-net-framework"
//   "C++ I/O & Streams"           -> "cpp-io-and-streams"
//
// The final step runs the `slug` crate, which transliterates anything that is
// not ASCII and leaves only [a-z0-9-].
// =============================================================================

use regex::Regex;
use std::sync::OnceLock;

static ABBREVIATION: OnceLock<Regex> = OnceLock::new();
static REMOVE: OnceLock<Regex> = OnceLock::new();
static REDUCE: OnceLock<Regex> = OnceLock::new();
static DASHES: OnceLock<Regex> = OnceLock::new();

fn abbreviation_regex() -> &'static Regex {
    ABBREVIATION.get_or_init(|| Regex::new(r" ([A-Z])\. ").expect("abbreviation regex"))
}

fn remove_regex() -> &'static Regex {
    REMOVE.get_or_init(|| Regex::new(r#"['"\\]"#).expect("remove regex"))
}

fn reduce_regex() -> &'static Regex {
    REDUCE.get_or_init(|| Regex::new(r"[:,/?! ]").expect("reduce regex"))
}

fn dashes_regex() -> &'static Regex {
    DASHES.get_or_init(|| Regex::new(r"-{2,}").expect("dashes regex"))
}

// Applied in order, after lower-casing
const REPLACEMENTS: &[(&str, &str)] = &[
    ("c++", "cpp"),
    ("(", ""),
    (")", ""),
    ("i/o", "io"),
    ("#", "-sharp-"),
    ("&", "-and-"),
];

/// Deterministic slug of a title. `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(title: &str) -> String {
    // " J. " -> " J " so a middle initial does not turn into "-dot-"
    let mut slug = abbreviation_regex().replace_all(title, " $1 ").to_lowercase();

    for (from, to) in REPLACEMENTS {
        slug = slug.replace(from, to);
    }

    if let Some(stripped) = slug.strip_suffix('.') {
        slug = stripped.to_string();
    }
    slug = slug.replace('.', "-dot-");

    let slug = remove_regex().replace_all(&slug, "");
    let slug = reduce_regex().replace_all(&slug, "-");
    let slug = dashes_regex().replace_all(&slug, "-");

    ::slug::slugify(&*slug)
        .trim_matches('-')
        .to_string()
}
