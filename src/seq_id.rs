//! Human-facing sequential display ids (`ID001`, `ID002`, ...).

/// Next display id given every `sequential_id` currently in the store.
/// Malformed suffixes count as 0 for max-computation; past 999 the counter
/// keeps incrementing and the rendered id widens beyond three digits.
pub fn next_sequential_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .map(|s| {
            s.strip_prefix("ID")
                .unwrap_or(s)
                .parse::<u64>()
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0);
    format!("ID{:03}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after_gaps() {
        let existing = ["ID001", "ID004", "ID002"];
        assert_eq!(next_sequential_id(existing), "ID005");
    }

    #[test]
    fn test_first_id() {
        assert_eq!(next_sequential_id([]), "ID001");
    }

    #[test]
    fn test_malformed_suffix_counts_as_zero() {
        assert_eq!(next_sequential_id(["IDabc"]), "ID001");
        assert_eq!(next_sequential_id(["IDabc", "ID002"]), "ID003");
        assert_eq!(next_sequential_id(["garbage"]), "ID001");
    }

    #[test]
    fn test_counter_widens_past_999() {
        assert_eq!(next_sequential_id(["ID999"]), "ID1000");
        assert_eq!(next_sequential_id(["ID1000"]), "ID1001");
    }
}
