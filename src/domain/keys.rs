/// Held-key snapshot handed to controllers each tick.
///
/// Keys are lowercase names (`"w"`, `"arrowup"`, `"escape"`). Writes are
/// last-write-wins; unknown names are simply never read.

use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    held: HashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState { held: HashMap::with_capacity(16) }
    }

    pub fn set(&mut self, key: &str, held: bool) {
        self.held.insert(key.to_lowercase(), held);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.get(key).copied().unwrap_or(false)
    }

    pub fn any_held(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.is_held(k))
    }
}

impl<'a> FromIterator<&'a str> for KeyState {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut keys = KeyState::new();
        for k in iter {
            keys.set(k, true);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased() {
        let mut k = KeyState::new();
        k.set("W", true);
        assert!(k.is_held("w"));
    }

    #[test]
    fn last_write_wins() {
        let mut k = KeyState::new();
        k.set("d", true);
        k.set("d", false);
        assert!(!k.is_held("d"));
        assert!(!k.is_held("nonsense"));
    }

    #[test]
    fn collect_from_names() {
        let k: KeyState = ["w", "d"].into_iter().collect();
        assert!(k.any_held(&["s", "d"]));
        assert!(!k.any_held(&["a", "s"]));
    }
}
