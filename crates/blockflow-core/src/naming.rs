//! Unique name allocation for new and duplicated blocks.

use std::collections::HashSet;

/// Split a name into its base and an optional trailing numeric suffix.
///
/// `"value3"` splits into `("value", Some(3))`; `"value"` into
/// `("value", None)`. A purely numeric name keeps one digit as its
/// base so the base is never empty.
fn split_suffix(name: &str) -> (&str, Option<u32>) {
    let digits = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return (name, None);
    }
    let cut = (name.len() - digits).max(1);
    match name[cut..].parse::<u32>() {
        Ok(n) => (&name[..cut], Some(n)),
        Err(_) => (name, None), // suffix too large to matter
    }
}

/// Derive a unique, human-friendly name from `base`.
///
/// Any trailing numeric suffix on `base` is stripped first, so
/// duplicating `"value3"` proposes from `"value"`. The bare base
/// counts as suffix 0; the lowest unused non-negative suffix wins
/// (`base` for 0, `base<N>` otherwise). Freed suffixes are reused.
///
/// Batch callers must insert each returned name into `existing` before
/// the next call so duplicates within one group operation never
/// collide.
pub fn next_name(base: &str, existing: &HashSet<String>) -> String {
    let (stem, _) = split_suffix(base);
    let stem = if stem.is_empty() { base } else { stem };

    let mut used: HashSet<u32> = HashSet::new();
    for name in existing {
        if name == stem {
            used.insert(0);
        } else if let Some(rest) = name.strip_prefix(stem) {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(n) = rest.parse::<u32>() {
                    used.insert(n);
                }
            }
        }
    }

    let mut suffix = 0u32;
    while used.contains(&suffix) {
        suffix += 1;
    }
    if suffix == 0 {
        stem.to_string()
    } else {
        format!("{stem}{suffix}")
    }
}
