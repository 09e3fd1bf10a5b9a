use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2, vec2};

use crate::cloud::{ForceSolver, SessionPhase};

use super::super::CloudCard;
use super::super::render_utils::{
    category_color, draw_background, draw_label, format_mentions, with_opacity,
};

impl CloudCard {
    /// Sizes the session to the allocated canvas, advances it one tick and
    /// paints the current frame.
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui, size: Vec2, show_quadtree_overlay: bool) {
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        let accent = category_color(self.category);

        draw_background(&painter, rect, accent);

        if self.advance(rect.width(), rect.height()) {
            ui.ctx().request_repaint();
        }

        let placeholder = match self.session.phase() {
            SessionPhase::Idle | SessionPhase::Building => Some("Waiting for terms..."),
            SessionPhase::NotReady => Some("Waiting for a canvas size..."),
            SessionPhase::Empty => Some("No data"),
            SessionPhase::Ticking | SessionPhase::Settled => None,
        };
        if let Some(placeholder) = placeholder {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                placeholder,
                FontId::proportional(15.0),
                Color32::from_gray(150),
            );
            self.inspected = None;
            return;
        }

        self.handle_canvas_hover(ui, rect, &response);

        if show_quadtree_overlay {
            ForceSolver::quadtree_cells(self.session.nodes(), &mut self.overlay_cells);
            for cell in &self.overlay_cells {
                let half = vec2(cell.half_extent, cell.half_extent);
                let cell_rect = Rect::from_min_max(
                    rect.min + (cell.center - half),
                    rect.min + (cell.center + half),
                );
                let alpha = if cell.is_leaf { 110 } else { 55 };
                let line_width = (1.4_f32 - (cell.depth as f32 * 0.09)).clamp(0.45, 1.4);
                painter.rect_stroke(
                    cell_rect,
                    0.0,
                    Stroke::new(line_width, Color32::from_rgba_unmultiplied(106, 198, 255, alpha)),
                    StrokeKind::Middle,
                );
            }
        }

        let nodes = self.session.nodes();
        let count = nodes.len();
        let hovered = self.hover.hovered();

        // Lightest first so heavy labels end up on top; the hovered one last.
        for (index, node) in nodes.iter().enumerate().rev() {
            if hovered == Some(index) {
                continue;
            }
            draw_label(
                &painter,
                rect.min + node.pos,
                &node.text,
                node.font_size,
                node.weight_class,
                accent,
                self.hover.presentation(index, count),
            );
        }
        if let Some(index) = hovered
            && let Some(node) = nodes.get(index)
        {
            draw_label(
                &painter,
                rect.min + node.pos,
                &node.text,
                node.font_size,
                node.weight_class,
                accent,
                self.hover.presentation(index, count),
            );
        }

        if let Some(term) = &self.inspected {
            let text = format!("{} | {} mentions", term.text, format_mentions(term.weight));
            let galley = painter.layout_no_wrap(text, FontId::proportional(13.0), Color32::from_gray(240));
            let text_pos = rect.left_top() + vec2(10.0, 10.0);
            let backdrop = Rect::from_min_size(text_pos, galley.size()).expand(5.0);
            painter.rect_filled(backdrop, 4.0, with_opacity(Color32::BLACK, 0.7));
            painter.galley(text_pos, galley, Color32::from_gray(240));
        }
    }
}
