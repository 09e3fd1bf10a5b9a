use eframe::egui::{self, Rect, Response, Ui};

use super::super::CloudCard;

impl CloudCard {
    /// Feeds the pointer, in canvas-local coordinates, to the hover tracker.
    pub(in crate::app) fn handle_canvas_hover(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let pointer = if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
                .filter(|pointer| rect.contains(*pointer))
                .map(|pointer| pointer - rect.min.to_vec2())
        } else {
            None
        };

        let change = self.hover.update(
            pointer,
            self.session.nodes(),
            self.session.generation(),
        );
        if let Some(change) = change {
            if let Some(term) = &change.inspected {
                tracing::trace!(
                    category = self.category.label(),
                    term = %term.text,
                    weight = term.weight,
                    "hovered term"
                );
            }
            self.inspected = change.inspected;
        }

        if self.hover.hovered().is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
    }
}
