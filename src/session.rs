//! Comparison session state
//!
//! Owns the pieces that survive re-renders of the same comparison: the
//! navigation index and the JSON expansion set, plus the diff options and
//! view mode. Everything mutates only through the methods here.

use crate::engine::DiffOptions;
use crate::json_view::ExpansionSet;
use crate::render::ViewMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Cyclic index over the block sequence
#[derive(Debug, Default)]
pub struct NavigationState {
    current: usize,
}

impl NavigationState {
    pub fn index(&self) -> usize {
        self.current
    }

    /// Advance cyclically; a no-op returning 0 when there are no blocks.
    pub fn next(&mut self, count: usize) -> usize {
        if count == 0 {
            self.current = 0;
        } else {
            self.current = (self.current + 1) % count;
        }
        self.current
    }

    pub fn previous(&mut self, count: usize) -> usize {
        if count == 0 {
            self.current = 0;
        } else {
            self.current = (self.current + count - 1) % count;
        }
        self.current
    }

    /// Pull the index back into range after the block sequence changed.
    pub fn clamp(&mut self, count: usize) {
        if count == 0 {
            self.current = 0;
        } else if self.current >= count {
            self.current = count - 1;
        }
    }
}

/// State for one active comparison
pub struct Session {
    pub nav: NavigationState,
    pub expansion: ExpansionSet,
    pub options: DiffOptions,
    pub view_mode: ViewMode,
}

impl Session {
    pub fn new(options: DiffOptions, view_mode: ViewMode) -> Self {
        Self {
            nav: NavigationState::default(),
            expansion: ExpansionSet::new(),
            options,
            view_mode,
        }
    }

    pub fn navigate(&mut self, direction: Direction, block_count: usize) -> usize {
        match direction {
            Direction::Next => self.nav.next(block_count),
            Direction::Previous => self.nav.previous(block_count),
        }
    }

    pub fn toggle_expansion(&mut self, path: &str) {
        self.expansion.toggle(path);
    }

    /// Callers must recompute blocks (and clamp navigation) after this.
    pub fn toggle_only_diffs(&mut self) -> bool {
        self.options.show_only_diffs = !self.options.show_only_diffs;
        self.options.show_only_diffs
    }

    /// Callers must recompute blocks (and clamp navigation) after this.
    pub fn toggle_whitespace(&mut self) -> bool {
        self.options.ignore_whitespace = !self.options.ignore_whitespace;
        self.options.ignore_whitespace
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = match self.view_mode {
            ViewMode::Unified => ViewMode::Split,
            ViewMode::Split => ViewMode::Unified,
        };
        self.view_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_wraps_both_ways() {
        let mut nav = NavigationState::default();
        assert_eq!(nav.next(3), 1);
        assert_eq!(nav.next(3), 2);
        assert_eq!(nav.next(3), 0);
        assert_eq!(nav.previous(3), 2);
    }

    #[test]
    fn full_cycle_returns_to_the_start() {
        let mut nav = NavigationState::default();
        nav.next(5);
        let origin = nav.index();
        for _ in 0..5 {
            nav.next(5);
        }
        assert_eq!(nav.index(), origin);
    }

    #[test]
    fn empty_sequence_is_a_no_op_at_zero() {
        let mut nav = NavigationState::default();
        assert_eq!(nav.next(0), 0);
        assert_eq!(nav.previous(0), 0);
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn clamp_after_shrinking() {
        let mut nav = NavigationState::default();
        for _ in 0..4 {
            nav.next(5);
        }
        assert_eq!(nav.index(), 4);

        nav.clamp(2);
        assert_eq!(nav.index(), 1);
        nav.clamp(0);
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn session_toggles_flip_state() {
        let mut session = Session::new(DiffOptions::default(), ViewMode::Split);
        assert!(session.toggle_only_diffs());
        assert!(!session.toggle_only_diffs());
        assert!(session.toggle_whitespace());
        assert_eq!(session.toggle_view_mode(), ViewMode::Unified);
        assert_eq!(session.toggle_view_mode(), ViewMode::Split);

        session.toggle_expansion(".a");
        assert!(session.expansion.is_expanded(".a"));
        session.toggle_expansion(".a");
        assert!(!session.expansion.is_expanded(".a"));
    }
}
