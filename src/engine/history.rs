use super::codec::NavigationMode;

/// Session-local list of visited fragments with a cursor for back/forward navigation.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl FragmentHistory {
    pub fn new(initial: String) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    /// `Replace` overwrites the current entry. `Push` keeps the current entry for back
    /// navigation, drops any forward entries and appends. Pushing the same fragment twice in a
    /// row adds a single entry.
    pub fn record(&mut self, fragment: String, mode: NavigationMode) {
        match mode {
            NavigationMode::Replace => self.entries[self.cursor] = fragment,
            NavigationMode::Push => {
                let kept = self.cursor > 0 && self.entries[self.cursor - 1] == self.current();
                if kept && fragment == self.current() {
                    return;
                }
                self.entries.truncate(self.cursor + 1);
                self.entries.push(fragment);
                self.cursor += 1;
            }
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> FragmentHistory {
        FragmentHistory::new("topic=0&lambda=1&term=".to_owned())
    }

    #[test]
    fn replace_keeps_a_single_entry() {
        let mut history = history();
        history.record("topic=1&lambda=1&term=".to_owned(), NavigationMode::Replace);
        history.record("topic=2&lambda=1&term=".to_owned(), NavigationMode::Replace);

        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), "topic=2&lambda=1&term=");
        assert!(!history.can_go_back());
    }

    #[test]
    fn push_enables_back_and_forward() {
        let mut history = history();
        history.record("topic=1&lambda=1&term=".to_owned(), NavigationMode::Push);
        history.record("topic=2&lambda=1&term=".to_owned(), NavigationMode::Push);

        assert_eq!(history.back(), Some("topic=1&lambda=1&term="));
        assert_eq!(history.back(), Some("topic=0&lambda=1&term="));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some("topic=1&lambda=1&term="));
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let mut history = history();
        history.record("topic=1&lambda=1&term=".to_owned(), NavigationMode::Push);
        history.record("topic=2&lambda=1&term=".to_owned(), NavigationMode::Push);
        history.back();
        history.record("topic=3&lambda=1&term=".to_owned(), NavigationMode::Push);

        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
        assert_eq!(history.current(), "topic=3&lambda=1&term=");
    }

    #[test]
    fn pushing_the_current_fragment_keeps_it_once() {
        let mut history = history();
        history.record("topic=0&lambda=1&term=".to_owned(), NavigationMode::Push);
        history.record("topic=0&lambda=1&term=".to_owned(), NavigationMode::Push);
        assert_eq!(history.len(), 2);

        history.record("topic=1&lambda=1&term=".to_owned(), NavigationMode::Replace);
        assert_eq!(history.back(), Some("topic=0&lambda=1&term="));
    }
}
