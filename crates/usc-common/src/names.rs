//! Synthetic identifier handling.
//!
//! The upstream compiler marks names it invents (switch temporaries, capture
//! records, value-type temporaries) with `$`, a character that cannot appear
//! in a source identifier. Rewrite passes that surface such names as real
//! locals strip the marker and make the result unique in its scope.

use rustc_hash::FxHashSet;

pub const SYNTHETIC_MARKER: char = '$';

/// Check whether `name` was invented by the upstream compiler.
pub fn is_synthetic_name(name: &str) -> bool {
    name.contains(SYNTHETIC_MARKER)
}

/// Strip synthetic markers from `name`, producing a legal identifier.
///
/// `$switch$1` becomes `switch1`; a result that is empty or starts with a
/// digit gets a leading underscore.
pub fn sanitize_synthetic_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .filter(|&c| c != SYNTHETIC_MARKER)
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Names already taken in one scope.
#[derive(Debug, Default, Clone)]
pub struct NameScope {
    taken: FxHashSet<String>,
}

impl NameScope {
    pub fn new() -> Self {
        NameScope::default()
    }

    /// Record a name declared by the source.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claim `base`, or `base_1`, `base_2`, ... if it is already taken.
    pub fn unique(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
