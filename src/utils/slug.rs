//! URL-safe identifiers derived from display names

/// Lowercase, drop anything outside `[a-z0-9\s_-]`, collapse separator runs
/// into one hyphen and trim hyphens from both ends.
///
/// Non-Latin names reduce to an empty string; callers pick a fallback.
pub fn generate(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c);
        } else if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = true;
        }
    }

    out
}

/// `^[a-z0-9]+(-[a-z0-9]+)*$`
pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// First of `base`, `base-1`, `base-2`, ... that is not already taken.
pub fn make_unique<S: AsRef<str>>(base: &str, existing: &[S]) -> String {
    let taken = |candidate: &str| existing.iter().any(|s| s.as_ref() == candidate);
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1u64;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_from_display_names() {
        assert_eq!(generate("Bionic Hand Pro"), "bionic-hand-pro");
        assert_eq!(generate("  Knee -- Joint__v2!  "), "knee-joint-v2");
        assert_eq!(generate("C'est la vie"), "cest-la-vie");
        assert_eq!(generate("---"), "");
        assert_eq!(generate("Протез руки"), "");
    }

    #[test]
    fn generated_slugs_are_valid() {
        for name in ["Bionic Hand Pro", "a_b c-d", "X1  2"] {
            assert!(is_valid(&generate(name)), "{name}");
        }
    }

    #[test]
    fn validates_shape() {
        assert!(is_valid("bionic-hand-2"));
        assert!(!is_valid(""));
        assert!(!is_valid("-lead"));
        assert!(!is_valid("trail-"));
        assert!(!is_valid("double--hyphen"));
        assert!(!is_valid("Upper"));
    }

    #[test]
    fn make_unique_picks_first_free_suffix() {
        let existing = vec!["hand", "hand-1", "hand-3"];
        assert_eq!(make_unique("arm", &existing), "arm");
        assert_eq!(make_unique("hand", &existing), "hand-2");
    }

    #[test]
    fn make_unique_never_repeats() {
        let mut existing: Vec<String> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5 {
            let next = make_unique("leg", &existing);
            assert!(!existing.contains(&next));
            assert!(seen.insert(next.clone()));
            existing.push(next);
        }
    }
}
