use crate::cloud::{HoverTracker, LayoutParams, LayoutSession, TickOutcome, ViewMode};
use crate::terms::{Category, Term};

use super::CloudCard;
use super::ui::finder_matches;

mod interaction;
mod view;

impl CloudCard {
    pub(in crate::app) fn new(
        category: Category,
        terms: Vec<Term>,
        params: &LayoutParams,
        seed: Option<u64>,
    ) -> Self {
        let mut session = match seed {
            Some(seed) => LayoutSession::seeded(params.clone(), ViewMode::Compact, seed),
            None => LayoutSession::new(params.clone(), ViewMode::Compact),
        };
        session.set_terms(terms);
        let word_limit = session.selection().word_limit;

        Self {
            category,
            hover: HoverTracker::new(session.params()),
            session,
            inspected: None,
            word_limit,
            filter: String::new(),
            finder_query: String::new(),
            overlay_cells: Vec::new(),
        }
    }

    pub(in crate::app) fn view_mode(&self) -> ViewMode {
        self.session.view_mode()
    }

    /// Switches view mode and picks up the word limit the session reset to.
    pub(in crate::app) fn set_view_mode(&mut self, mode: ViewMode) {
        self.session.set_view_mode(mode);
        self.word_limit = self.session.selection().word_limit;
        self.inspected = None;
    }

    pub(in crate::app) fn word_limit_range(&self) -> std::ops::RangeInclusive<usize> {
        let params = self.session.params();
        let max = params
            .mode(self.view_mode())
            .word_limit_slider_max
            .min(params.word_limit_cap)
            .max(5);
        5..=max
    }

    pub(in crate::app) fn apply_word_limit(&mut self) {
        self.session.set_word_limit(self.word_limit);
    }

    pub(in crate::app) fn apply_filter(&mut self) {
        self.session.set_filter(self.filter.trim());
    }

    pub(in crate::app) fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_owned();
        self.apply_filter();
    }

    /// Sizes the session to the canvas and runs this frame's tick. Returns
    /// true while the solve still needs another frame.
    pub(in crate::app) fn advance(&mut self, width: f32, height: f32) -> bool {
        self.session.set_viewport(width, height);
        matches!(self.session.tick(), TickOutcome::Advanced { settled: false, .. })
    }

    pub(in crate::app) fn finder_suggestions(&self, limit: usize) -> Vec<&Term> {
        finder_matches(self.session.terms(), &self.finder_query, limit)
    }

    pub(in crate::app) fn status_text(&self) -> String {
        format!(
            "{}: {} · {}/{} ticks",
            self.category.label(),
            self.session.phase().label(),
            self.session.ticks(),
            self.session.params().max_ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(category: Category) -> CloudCard {
        let terms = vec![
            Term::new("Pizza", 80.0, category),
            Term::new("Pasta", 60.0, category),
            Term::new("Cold", 10.0, category),
        ];
        CloudCard::new(category, terms, &LayoutParams::default(), Some(7))
    }

    #[test]
    fn advance_keeps_ticking_across_a_rebuild() {
        let mut card = card(Category::Positive);
        assert!(card.advance(800.0, 400.0));
        assert_eq!(card.session.ticks(), 1);

        card.word_limit = 2;
        card.apply_word_limit();
        let generation = card.session.generation();
        assert!(card.advance(800.0, 400.0));
        assert_eq!(card.session.generation(), generation);
        assert_eq!(card.session.ticks(), 1);
        assert_eq!(card.session.frame().map(|frame| frame.generation), Some(generation));
    }

    #[test]
    fn advance_stops_requesting_frames_once_settled() {
        let mut card = card(Category::Neutral);
        let mut frames = 0;
        while card.advance(800.0, 400.0) {
            frames += 1;
            assert!(frames <= 300);
        }
        assert!(!card.advance(800.0, 400.0));
    }

    #[test]
    fn finder_query_belongs_to_its_card() {
        let mut positive = card(Category::Positive);
        let negative = card(Category::Negative);
        positive.finder_query = "piz".to_owned();

        let found = positive.finder_suggestions(8);
        assert_eq!(found.first().map(|term| term.text.as_str()), Some("Pizza"));
        assert!(negative.finder_query.is_empty());
        assert!(negative.finder_suggestions(8).is_empty());
    }
}
