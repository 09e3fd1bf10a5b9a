use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::terms::Term;

use super::super::ViewModel;
use super::super::render_utils::{category_color, format_mentions};

const FINDER_SUGGESTIONS: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Best fuzzy matches for `query`, highest score first and heavier terms
/// breaking ties.
pub(in crate::app) fn finder_matches<'a>(terms: &'a [Term], query: &str, limit: usize) -> Vec<&'a Term> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = terms
        .iter()
        .filter_map(|term| fuzzy_match_score(&matcher, &term.text, query).map(|score| (score, term)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.weight.total_cmp(&a.1.weight)));
    scored.into_iter().take(limit).map(|(_, term)| term).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Cloud Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.horizontal_wrapped(|ui| {
            for index in 0..self.cards.len() {
                let category = self.cards[index].category;
                ui.selectable_value(
                    &mut self.active_card,
                    index,
                    RichText::new(category.label()).color(category_color(category)),
                )
                .on_hover_text("Choose which cloud these controls adjust.");
            }
        });

        let expanded = self.expanded;
        let Some(card) = self.cards.get_mut(self.active_card) else {
            return;
        };

        ui.separator();

        let word_limit_range = card.word_limit_range();
        let word_limit_slider = ui
            .add(egui::Slider::new(&mut card.word_limit, word_limit_range).text("Word limit"))
            .on_hover_text("How many of the heaviest terms are laid out.");
        if word_limit_slider.changed() {
            card.apply_word_limit();
        }

        ui.label("Filter (substring)")
            .on_hover_text("Only terms containing this text, ignoring case, are shown.");
        ui.horizontal(|ui| {
            if ui.text_edit_singleline(&mut card.filter).changed() {
                card.apply_filter();
            }
            if ui
                .add_enabled(!card.filter.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                card.set_filter("");
            }
        });

        ui.separator();

        ui.label("Find a term")
            .on_hover_text("Fuzzy search over every term of this cloud; pick one to filter to it.");
        ui.text_edit_singleline(&mut card.finder_query);
        let mut picked = None;
        for term in card.finder_suggestions(FINDER_SUGGESTIONS) {
            let label = format!("{}  ({} mentions)", term.text, format_mentions(term.weight));
            if ui.selectable_label(card.filter == term.text, label).clicked() {
                picked = Some(term.text.clone());
            }
        }
        if let Some(text) = picked {
            card.set_filter(&text);
        }

        ui.separator();

        let mut toggle_expanded = false;
        ui.horizontal(|ui| {
            if ui
                .button("Restart layout")
                .on_hover_text("Re-seed positions and settle again.")
                .clicked()
            {
                card.session.restart();
            }
            let expand_label = if expanded == Some(self.active_card) {
                "Collapse"
            } else {
                "Expand"
            };
            if ui.button(expand_label).clicked() {
                toggle_expanded = true;
            }
        });

        ui.add_space(6.0);
        egui::Grid::new("layout_stats").num_columns(2).show(ui, |ui| {
            ui.label("Phase");
            ui.label(card.session.phase().label());
            ui.end_row();
            ui.label("Generation");
            ui.label(card.session.generation().to_string());
            ui.end_row();
            ui.label("Ticks");
            ui.label(card.session.ticks().to_string());
            ui.end_row();
            ui.label("Activity");
            ui.label(format!("{:.4}", card.session.activity()));
            ui.end_row();
            ui.label("Placed");
            ui.label(format!("{} / {}", card.session.nodes().len(), card.session.terms().len()));
            ui.end_row();
        });

        ui.separator();

        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the repulsion quadtree over each cloud.");
        ui.checkbox(&mut self.show_fps_bar, "FPS Display")
            .on_hover_text("Show a live FPS readout in the header.");

        if toggle_expanded {
            self.toggle_expanded(self.active_card);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::Category;

    fn terms() -> Vec<Term> {
        vec![
            Term::new("Pizza", 80.0, Category::Positive),
            Term::new("Pasta", 60.0, Category::Positive),
            Term::new("Delicious", 40.0, Category::Positive),
        ]
    }

    #[test]
    fn finder_ranks_fuzzy_matches() {
        let terms = terms();
        let found = finder_matches(&terms, "piz", 8);
        assert_eq!(found.first().map(|term| term.text.as_str()), Some("Pizza"));
        assert!(found.iter().all(|term| term.text != "Delicious"));
    }

    #[test]
    fn finder_ignores_blank_queries_and_respects_limit() {
        let terms = terms();
        assert!(finder_matches(&terms, "   ", 8).is_empty());
        assert!(finder_matches(&terms, "a", 1).len() <= 1);
    }
}
