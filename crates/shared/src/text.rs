//! Text helpers used by the save-time transforms.

use deunicode::deunicode;

/// Turns a human title into a URL-safe slug.
///
/// The title is transliterated to ASCII first ("Çocuk Sağlığı" becomes
/// "cocuk-sagligi"). ASCII letters and digits are kept (lower-cased); every
/// other run of characters collapses into a single `-`. Leading and trailing
/// separators are dropped.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode(input);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Truncates to at most `max` characters, counting `char`s rather than bytes.
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}

/// Lower-cases and trims tags, dropping blanks and duplicates.
///
/// The first occurrence of each tag keeps its position.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Returns `None` for empty or whitespace-only strings.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Cardiology Services"), "cardiology-services");
        assert_eq!(slugify("  Our Team!  "), "our-team");
        assert_eq!(slugify("COVID-19 & You"), "covid-19-you");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a -- b__c"), "a-b-c");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_transliterates_accents() {
        assert_eq!(slugify("Café Médical"), "cafe-medical");
        assert_eq!(slugify("Çocuk Sağlığı"), "cocuk-sagligi");
        assert_eq!(slugify("Göz Hastalıkları Bölümü"), "goz-hastaliklari-bolumu");
    }

    #[test]
    fn test_slugify_non_latin_titles_not_empty() {
        for title in ["Ёлка", "Кардиология", "心臓病学", "Καρδιολογία"] {
            let slug = slugify(title);
            assert!(!slug.is_empty(), "empty slug for {}", title);
            assert!(
                slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "bad slug {} for {}",
                slug,
                title
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_normalize_tags_keeps_first_occurrence() {
        let tags = normalize_tags(["Cardio", "heart", "CARDIO", " Heart ", "", "kids"]);
        assert_eq!(tags, vec!["cardio", "heart", "kids"]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ")), Some("x"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
