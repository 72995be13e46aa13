// Noun lemmatizer in the style of WordNet's morphy, without the dictionary.
//
// Every token is treated as a noun: there is no part-of-speech tagging, so
// "attacking" stays "attacking" while "attacks" becomes "attack". Irregular
// plurals come from a small exception table; regular plurals go through
// suffix detachment. Without a dictionary to validate candidates the rules
// are guarded conservatively (short words and -ss/-us/-is endings are left
// alone), which keeps the function idempotent: lemmatizing a lemma is a no-op.

/// Irregular plural → singular.
const EXCEPTIONS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("data", "datum"),
    ("criteria", "criterion"),
];

/// Suffix rules, longest first. Applied to the first match only.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("ies", "y"),
    ("s", ""),
];

/// Endings that look plural but aren't ("glass", "bus", "crisis").
const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];

/// Minimum length a word must have before suffix rules apply.
const MIN_RULE_LEN: usize = 4;

/// Reduce a lowercase token to its noun lemma.
pub fn lemmatize(word: &str) -> String {
    if let Some((_, lemma)) = EXCEPTIONS.iter().find(|(plural, _)| *plural == word) {
        return (*lemma).to_string();
    }

    if word.chars().count() < MIN_RULE_LEN || !word.chars().all(|c| c.is_ascii_alphabetic()) {
        return word.to_string();
    }

    if PROTECTED_ENDINGS.iter().any(|end| word.ends_with(end)) {
        return word.to_string();
    }

    for (suffix, replacement) in SUFFIX_RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            // "lies" → "ly" would be wrong; fall through to the bare -s rule
            if *suffix == "ies" && stem.len() < 3 {
                continue;
            }
            return format!("{stem}{replacement}");
        }
    }

    word.to_string()
}
