/// Normalize text before fingerprinting or scoring: lowercase, collapse
/// whitespace runs to a single space, trim both ends.
///
/// Idempotent, so formatting differences between two submissions of the
/// same content never affect their hashes.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut space_pending = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            // leading whitespace stays pending until a real char arrives
            if !out.is_empty() {
                space_pending = true;
            }
        } else {
            if space_pending {
                out.push(' ');
                space_pending = false;
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("Hello   World"), "hello world");
        assert_eq!(normalize("  A\tB\nC  "), "a b c");
    }

    #[test]
    fn is_idempotent() {
        let samples = ["  MiXeD \t CaSe \n text  ", "", "one", "ÅÄÖ  åäö"];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }
}
