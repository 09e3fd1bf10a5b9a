use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, StrokeKind, vec2};

use crate::cloud::{Presentation, WeightClass};
use crate::terms::Category;

pub(super) const CANVAS_FILL: Color32 = Color32::from_rgb(19, 23, 29);

pub(super) fn category_color(category: Category) -> Color32 {
    let [_, r, g, b] = category.rgb().to_be_bytes();
    Color32::from_rgb(r, g, b)
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, accent: Color32) {
    painter.rect_filled(rect, 6.0, CANVAS_FILL);

    let step = 48.0;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));

    let mut x = rect.left() + step;
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = rect.top() + step;
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }

    painter.rect_stroke(
        rect,
        6.0,
        Stroke::new(1.0, with_opacity(accent, 0.45)),
        StrokeKind::Inside,
    );
}

/// The default fonts ship a single weight, so heavier classes are drawn as
/// extra hairline-offset passes.
fn weight_offsets(weight_class: WeightClass) -> &'static [(f32, f32)] {
    static OFFSETS: [(f32, f32); 5] = [(0.0, 0.0), (0.45, 0.0), (0.0, 0.45), (0.45, 0.45), (-0.45, 0.0)];
    &OFFSETS[..=weight_class.index()]
}

pub(super) fn draw_label(
    painter: &Painter,
    center: Pos2,
    text: &str,
    font_size: f32,
    weight_class: WeightClass,
    color: Color32,
    presentation: Presentation,
) {
    let font = FontId::proportional(font_size * presentation.scale);

    if presentation.shadow {
        painter.text(
            center + vec2(1.5, 2.0),
            Align2::CENTER_CENTER,
            text,
            font.clone(),
            Color32::from_rgba_unmultiplied(0, 0, 0, 110),
        );
    }

    let color = with_opacity(color, presentation.opacity);
    for &(dx, dy) in weight_offsets(weight_class) {
        painter.text(
            center + vec2(dx, dy),
            Align2::CENTER_CENTER,
            text,
            font.clone(),
            color,
        );
    }
}

pub(super) fn format_mentions(weight: f32) -> String {
    if weight.fract().abs() < 1.0e-3 {
        format!("{weight:.0}")
    } else {
        format!("{weight:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_palette_matches_brand_colors() {
        assert_eq!(category_color(Category::Positive), Color32::from_rgb(0x25, 0x63, 0xeb));
        assert_eq!(category_color(Category::Negative), Color32::from_rgb(0xdc, 0x26, 0x26));
        assert_eq!(category_color(Category::Neutral), Color32::from_rgb(0xd9, 0x77, 0x06));
    }

    #[test]
    fn heavier_classes_draw_more_passes() {
        assert_eq!(weight_offsets(WeightClass::Regular).len(), 1);
        assert_eq!(weight_offsets(WeightClass::ExtraBold).len(), 5);
    }

    #[test]
    fn mentions_drop_trailing_zeroes() {
        assert_eq!(format_mentions(42.0), "42");
        assert_eq!(format_mentions(7.4), "7.4");
    }
}
