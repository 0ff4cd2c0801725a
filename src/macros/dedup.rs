//! Rightmost-wins collapsing of repeated CLI flags
//!
//! A token starting with `-` opens a flag; the contiguous non-flag tokens after it
//! are its values. When a flag repeats, only its last occurrence (with that
//! occurrence's values) survives, at the position where it last appeared.
//!
//! Known limitation: a value that starts with `-` (e.g. `--temp -1`) is read as a
//! new flag, not as a value.

use std::collections::{BTreeSet, HashMap};

/// Deduplicate repeated flags in a whitespace-separated parameter string
pub fn dedup_params(input: &str) -> String {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    // flag -> (flag index, value indices) of its latest occurrence
    let mut latest: HashMap<&str, (usize, Vec<usize>)> = HashMap::new();
    let mut standalone = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if !is_flag(token) {
            standalone.push(i);
            i += 1;
            continue;
        }

        let mut values = Vec::new();
        let mut j = i + 1;
        while j < tokens.len() && !is_flag(tokens[j]) {
            values.push(j);
            j += 1;
        }
        latest.insert(token, (i, values));
        i = j;
    }

    let keep: BTreeSet<usize> = latest
        .into_values()
        .flat_map(|(flag, values)| std::iter::once(flag).chain(values))
        .chain(standalone)
        .collect();

    keep.into_iter()
        .map(|idx| tokens[idx])
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_last_value() {
        assert_eq!(
            dedup_params("--ctx-size 32768 --ctx-size 65536"),
            "--ctx-size 65536"
        );
    }

    #[test]
    fn test_positional_order() {
        let out = dedup_params("--flag1 --flag2 --flag3 --flag2 --flag4");
        assert_eq!(out, "--flag1 --flag3 --flag2 --flag4");
    }

    #[test]
    fn test_multi_value_flags() {
        let out = dedup_params("--lora a.bin b.bin --jinja --lora c.bin");
        assert_eq!(out, "--jinja --lora c.bin");
    }

    #[test]
    fn test_leading_standalone_tokens_kept() {
        let out = dedup_params("value --port ${PORT}");
        assert_eq!(out, "value --port ${PORT}");

        let out = dedup_params("prefix   inner-value\tsuffix");
        assert_eq!(out, "prefix inner-value suffix");
    }

    #[test]
    fn test_negative_values_are_flags() {
        // `-1` opens its own flag, so `--seed` is left without a value
        let out = dedup_params("--seed -1 --seed 42");
        assert_eq!(out, "-1 --seed 42");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "--a 1 --b 2 --a 3 x",
            "lead --x --y 1 2 --x 9",
            "--cache-type-k q8_0 --cache-type-v q8_0 --cache-type-k q4_0",
            "",
        ];
        for input in inputs {
            let once = dedup_params(input);
            assert_eq!(dedup_params(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(dedup_params(""), "");
        assert_eq!(dedup_params("   "), "");
    }
}
