//! Tab list and view routing.
//!
//! The visible view is a pure function of the session's global flags and the
//! active tab. `App` calls [`route`] after every change to any of them and
//! never sets its view any other way.

/// Top-level tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Home,
    Users,
    Routines,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Home, Tab::Users, Tab::Routines];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Users => "Users",
            Tab::Routines => "Routines",
        }
    }

    /// Tab at `index`, wrapping modulo the tab count.
    pub fn from_index(index: usize) -> Tab {
        Tab::ALL[index % Tab::ALL.len()]
    }
}

/// Index of the tab after `active`, wrapping.
pub fn next_index(active: usize) -> usize {
    (active + 1) % Tab::ALL.len()
}

/// Index of the tab before `active`, wrapping.
pub fn prev_index(active: usize) -> usize {
    (active + Tab::ALL.len() - 1) % Tab::ALL.len()
}

/// What the content area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Error,
    Home,
    Users,
    Routines,
}

/// Loading beats error, error beats the tab's own view.
pub fn route(loading: bool, has_error: bool, tab: Tab) -> View {
    if loading {
        return View::Loading;
    }
    if has_error {
        return View::Error;
    }
    match tab {
        Tab::Users => View::Users,
        Tab::Routines => View::Routines,
        Tab::Home => View::Home,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_route_priority() {
        assert_eq!(route(true, true, Tab::Users), View::Loading);
        assert_eq!(route(false, true, Tab::Users), View::Error);
        assert_eq!(route(false, false, Tab::Users), View::Users);
        assert_eq!(route(false, false, Tab::Routines), View::Routines);
        assert_eq!(route(false, false, Tab::Home), View::Home);
    }

    #[test]
    fn test_tab_labels() {
        let labels: Vec<&str> = Tab::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Home", "Users", "Routines"]);
    }

    proptest! {
        #[test]
        fn prop_next_then_prev_is_identity(start in 0usize..3, steps in 0usize..50) {
            let mut idx = start;
            for _ in 0..steps {
                idx = next_index(idx);
            }
            for _ in 0..steps {
                idx = prev_index(idx);
            }
            prop_assert_eq!(idx, start);
        }

        #[test]
        fn prop_next_matches_modular_arithmetic(start in 0usize..3, steps in 0usize..50) {
            let mut idx = start;
            for _ in 0..steps {
                idx = next_index(idx);
            }
            prop_assert_eq!(idx, (start + steps) % 3);
        }

        #[test]
        fn prop_prev_wraps_from_zero(steps in 1usize..50) {
            let mut idx = 0;
            for _ in 0..steps {
                idx = prev_index(idx);
            }
            prop_assert_eq!(idx, (3 - steps % 3) % 3);
        }
    }
}
