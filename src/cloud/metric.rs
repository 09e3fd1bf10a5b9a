use super::{LayoutParams, ViewportConfig};

const EMPTY_DOMAIN: (f32, f32) = (0.0, 100.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeightClass {
    Regular,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
}

impl WeightClass {
    pub const ALL: [WeightClass; 5] = [
        Self::Regular,
        Self::Medium,
        Self::SemiBold,
        Self::Bold,
        Self::ExtraBold,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn font_weight(self) -> u16 {
        400 + (self.index() as u16) * 100
    }
}

pub fn sanitize_weight(weight: f32) -> f32 {
    if weight.is_finite() {
        weight.max(0.0)
    } else {
        0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontRange {
    pub min: f32,
    pub max: f32,
}

impl FontRange {
    pub fn for_viewport(viewport: &ViewportConfig, params: &LayoutParams) -> Self {
        let mode = params.mode(viewport.mode);
        let shorter_side = viewport.shorter_side().max(0.0);
        let max = mode.max_font.min(shorter_side * mode.max_font_fraction).max(1.0);
        let min = mode.min_font.min(max);
        Self { min, max }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MetricMapper {
    domain_min: f32,
    domain_max: f32,
    fonts: FontRange,
}

impl MetricMapper {
    pub fn new<I>(weights: I, viewport: &ViewportConfig, params: &LayoutParams) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for weight in weights {
            let weight = sanitize_weight(weight);
            min = min.min(weight);
            max = max.max(weight);
        }

        let (domain_min, domain_max) = if min.is_finite() && max.is_finite() {
            (min, max)
        } else {
            EMPTY_DOMAIN
        };

        Self::from_domain(
            domain_min,
            domain_max,
            FontRange::for_viewport(viewport, params),
        )
    }

    pub fn from_domain(domain_min: f32, domain_max: f32, fonts: FontRange) -> Self {
        let domain_min = sanitize_weight(domain_min);
        let domain_max = sanitize_weight(domain_max).max(domain_min);
        Self {
            domain_min,
            domain_max,
            fonts,
        }
    }

    pub fn fonts(&self) -> FontRange {
        self.fonts
    }

    pub fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn is_degenerate(&self) -> bool {
        (self.domain_max - self.domain_min) <= f32::EPSILON * self.domain_max.max(1.0)
    }

    /// Square-root scale, so label area tracks weight rather than label height.
    pub fn font_size(&self, weight: f32) -> f32 {
        if self.is_degenerate() {
            return self.fonts.max;
        }

        let low = self.domain_min.sqrt();
        let high = self.domain_max.sqrt();
        let t = ((sanitize_weight(weight).sqrt() - low) / (high - low)).clamp(0.0, 1.0);
        self.fonts.min + (self.fonts.max - self.fonts.min) * t
    }

    pub fn weight_class(&self, weight: f32) -> WeightClass {
        if self.is_degenerate() {
            return WeightClass::ExtraBold;
        }

        let t = (sanitize_weight(weight) - self.domain_min) / (self.domain_max - self.domain_min);
        let buckets = WeightClass::ALL.len();
        let index = (t.clamp(0.0, 1.0) * buckets as f32).floor() as usize;
        WeightClass::from_index(index)
    }
}
