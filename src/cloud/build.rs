use eframe::egui::{Pos2, Vec2, vec2};
use rand::Rng;

use crate::terms::{Category, Term};

use super::metric::{MetricMapper, WeightClass, sanitize_weight};
use super::{LayoutParams, SelectionConfig, ViewportConfig};

const MIN_COLLISION_RADIUS: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub text: String,
    pub category: Category,
    pub weight: f32,
    pub font_size: f32,
    pub weight_class: WeightClass,
    pub box_width: f32,
    pub box_height: f32,
    pub collision_radius: f32,
    pub pos: Vec2,
    pub(super) velocity: Vec2,
}

impl LayoutNode {
    pub fn half_extents(&self) -> Vec2 {
        vec2(self.box_width * 0.5, self.box_height * 0.5)
    }

    pub fn contains(&self, point: Pos2) -> bool {
        let half = self.half_extents();
        (point.x - self.pos.x).abs() <= half.x && (point.y - self.pos.y).abs() <= half.y
    }
}

pub fn select_terms<'a>(
    terms: &'a [Term],
    selection: &SelectionConfig,
    params: &LayoutParams,
) -> Vec<&'a Term> {
    let limit = selection.word_limit.min(params.word_limit_cap);
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked = terms.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| sanitize_weight(b.weight).total_cmp(&sanitize_weight(a.weight)));

    let needle = selection.filter.to_lowercase();
    ranked
        .into_iter()
        .filter(|term| needle.is_empty() || term.text.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

pub fn estimate_box(text: &str, font_size: f32, params: &LayoutParams) -> (f32, f32) {
    let chars = text.chars().count() as f32;
    let width = chars * font_size * params.glyph_factor;
    let height = font_size * params.line_factor;
    (width.max(0.0), height.max(0.0))
}

pub fn collision_radius(box_width: f32, params: &LayoutParams) -> f32 {
    let radius = box_width * params.collision_scale + params.collision_padding;
    if radius.is_finite() {
        radius.max(MIN_COLLISION_RADIUS)
    } else {
        MIN_COLLISION_RADIUS
    }
}

pub fn build_nodes<R: Rng>(
    selected: &[&Term],
    mapper: &MetricMapper,
    viewport: &ViewportConfig,
    params: &LayoutParams,
    rng: &mut R,
) -> Vec<LayoutNode> {
    let center = viewport.center();
    let jitter = params.jitter_radius;

    selected
        .iter()
        .map(|term| {
            let weight = sanitize_weight(term.weight);
            let font_size = mapper.font_size(weight);
            let (box_width, box_height) = estimate_box(&term.text, font_size, params);
            let offset = if jitter > 0.0 {
                vec2(
                    rng.random_range(-jitter..=jitter),
                    rng.random_range(-jitter..=jitter),
                )
            } else {
                Vec2::ZERO
            };

            LayoutNode {
                text: term.text.clone(),
                category: term.category,
                weight,
                font_size,
                weight_class: mapper.weight_class(weight),
                box_width,
                box_height,
                collision_radius: collision_radius(box_width, params),
                pos: center + offset,
                velocity: Vec2::ZERO,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cloud::ViewMode;

    fn sample_terms() -> Vec<Term> {
        vec![
            Term::new("Cold", 10.0, Category::Negative),
            Term::new("Pizza", 80.0, Category::Positive),
            Term::new("Tasty", 75.0, Category::Positive),
            Term::new("pizza crust", 30.0, Category::Positive),
        ]
    }

    #[test]
    fn selection_ranks_by_weight_then_limits() {
        let terms = sample_terms();
        let params = LayoutParams::default();
        let picked = select_terms(&terms, &SelectionConfig::new(2, ""), &params);
        let texts = picked.iter().map(|t| t.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["Pizza", "Tasty"]);
    }

    #[test]
    fn filter_is_case_insensitive_and_applied_before_limit() {
        let terms = sample_terms();
        let params = LayoutParams::default();
        let picked = select_terms(&terms, &SelectionConfig::new(5, "PIZ"), &params);
        let texts = picked.iter().map(|t| t.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["Pizza", "pizza crust"]);

        let none = select_terms(&terms, &SelectionConfig::new(5, "sushi"), &params);
        assert!(none.is_empty());
    }

    #[test]
    fn zero_limit_and_cap() {
        let terms = (0..150)
            .map(|i| Term::new(format!("w{i}"), i as f32, Category::Neutral))
            .collect::<Vec<_>>();
        let params = LayoutParams::default();
        assert!(select_terms(&terms, &SelectionConfig::new(0, ""), &params).is_empty());
        assert_eq!(
            select_terms(&terms, &SelectionConfig::new(500, ""), &params).len(),
            100
        );
    }

    #[test]
    fn box_estimate_uses_glyph_and_line_factors() {
        let params = LayoutParams::default();
        let (width, height) = estimate_box("Pizza", 20.0, &params);
        assert!((width - 55.0).abs() < 1.0e-4);
        assert!((height - 22.0).abs() < 1.0e-4);
        assert!((collision_radius(width, &params) - 43.0).abs() < 1.0e-4);
        assert_eq!(collision_radius(f32::NAN, &params), MIN_COLLISION_RADIUS);
        assert_eq!(collision_radius(-500.0, &params), MIN_COLLISION_RADIUS);
    }

    #[test]
    fn nodes_start_near_center_with_zero_velocity() {
        let terms = sample_terms();
        let params = LayoutParams::default();
        let viewport = ViewportConfig::new(800.0, 400.0, ViewMode::Compact);
        let picked = select_terms(&terms, &SelectionConfig::new(4, ""), &params);
        let mapper = MetricMapper::new(picked.iter().map(|t| t.weight), &viewport, &params);
        let mut rng = StdRng::seed_from_u64(3);
        let nodes = build_nodes(&picked, &mapper, &viewport, &params, &mut rng);

        assert_eq!(nodes.len(), 4);
        for node in &nodes {
            assert!((node.pos.x - 400.0).abs() <= 25.0);
            assert!((node.pos.y - 200.0).abs() <= 25.0);
            assert_eq!(node.velocity, Vec2::ZERO);
        }
        assert!(nodes.windows(2).all(|pair| pair[0].font_size >= pair[1].font_size));
    }
}
