use std::collections::VecDeque;
use std::ops::Range;

use eframe::egui::{self, Align, Context, Key, Layout, RichText, vec2};

use crate::cloud::ViewMode;
use crate::terms::Category;

use super::super::render_utils::category_color;
use super::super::{CloudCard, LoadOptions, LoadedData, ViewModel};

impl ViewModel {
    const CARD_HEADER_HEIGHT: f32 = 28.0;
    const COMPACT_CARD_MIN_HEIGHT: f32 = 260.0;

    pub(in crate::app) fn new(data: LoadedData, options: &LoadOptions) -> Self {
        let LoadedData {
            mut terms,
            params,
            source_label,
        } = data;

        let cards = Category::ALL
            .iter()
            .enumerate()
            .map(|(offset, &category)| {
                let seed = options.seed.map(|seed| seed.wrapping_add(offset as u64 + 1));
                CloudCard::new(
                    category,
                    std::mem::take(terms.get_mut(category)),
                    &params,
                    seed,
                )
            })
            .collect::<Vec<_>>();

        let mut model = Self {
            source_label,
            cards,
            expanded: None,
            active_card: 0,
            show_quadtree_overlay: false,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        };

        if options.start_expanded {
            model.toggle_expanded(0);
        }
        model
    }

    pub(in crate::app) fn visible_cards(&self) -> Range<usize> {
        match self.expanded {
            Some(index) => index..(index + 1),
            None => 0..self.cards.len(),
        }
    }

    /// Expands `index`, collapsing whichever card was expanded before. Expanding
    /// the already expanded card collapses it.
    pub(in crate::app) fn toggle_expanded(&mut self, index: usize) {
        if index >= self.cards.len() {
            return;
        }

        let previous = self.expanded.take();
        if let Some(previous) = previous {
            self.cards[previous].set_view_mode(ViewMode::Compact);
        }

        if previous != Some(index) {
            self.cards[index].set_view_mode(ViewMode::Expanded);
            self.expanded = Some(index);
            self.active_card = index;
        }

        tracing::debug!(expanded = ?self.expanded, "changed expanded card");
    }

    pub(in crate::app) fn collapse_expanded(&mut self) {
        if let Some(index) = self.expanded {
            self.toggle_expanded(index);
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        self.update_fps_counter(ctx);

        if self.expanded.is_some() && ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.collapse_expanded();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Review keyword clouds");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));
                    let total_terms = self
                        .cards
                        .iter()
                        .map(|card| card.session.terms().len())
                        .sum::<usize>();
                    ui.label(format!("terms: {total_terms}"));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                            ui.separator();
                        }
                        ui.label(self.layout_stats_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading review terms...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_cards(ui);
            }
        });
    }

    fn draw_cards(&mut self, ui: &mut egui::Ui) {
        let show_quadtree_overlay = self.show_quadtree_overlay;
        let mut toggle = None;

        if let Some(index) = self.expanded {
            let card = &mut self.cards[index];
            if Self::draw_card_header(ui, card, true) {
                toggle = Some(index);
            }
            let size = ui.available_size();
            card.draw_canvas(ui, size, show_quadtree_overlay);
        } else {
            let card_count = self.cards.len().max(1);
            let spacing = ui.spacing().item_spacing.x;
            let width = (ui.available_width() - spacing * (card_count as f32 - 1.0)) / card_count as f32;
            let height = (ui.available_height() - Self::CARD_HEADER_HEIGHT)
                .max(Self::COMPACT_CARD_MIN_HEIGHT)
                .min(width * 0.75);

            ui.horizontal_top(|ui| {
                for (index, card) in self.cards.iter_mut().enumerate() {
                    ui.vertical(|ui| {
                        ui.set_width(width);
                        if Self::draw_card_header(ui, card, false) {
                            toggle = Some(index);
                        }
                        card.draw_canvas(ui, vec2(width, height), show_quadtree_overlay);
                    });
                }
            });
        }

        if let Some(index) = toggle {
            self.toggle_expanded(index);
        }
    }

    /// Returns true when the expand/collapse button was clicked.
    fn draw_card_header(ui: &mut egui::Ui, card: &CloudCard, expanded: bool) -> bool {
        let mut clicked = false;
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{} keywords", card.category.label()))
                    .strong()
                    .color(category_color(card.category)),
            );
            ui.label(
                RichText::new(format!(
                    "{} shown · {}",
                    card.session.nodes().len(),
                    card.session.phase().label()
                ))
                .weak(),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let label = if expanded { "Collapse (Esc)" } else { "Expand" };
                clicked = ui.button(label).clicked();
            });
        });
        clicked
    }
}
