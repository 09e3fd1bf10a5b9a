mod corpus;
mod load;

use serde::{Deserialize, Serialize};

pub use corpus::{generate_category_terms, generate_term_set};
pub use load::{load_term_set, parse_term_set};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Positive,
    Negative,
    Neutral,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn label(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }

    /// Text color used by the dashboard, as packed `0xRRGGBB`.
    pub fn rgb(self) -> u32 {
        match self {
            Self::Positive => 0x2563eb,
            Self::Negative => 0xdc2626,
            Self::Neutral => 0xd97706,
        }
    }
}

/// A weighted label produced by the analytics pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub text: String,
    #[serde(alias = "value")]
    pub weight: f32,
    pub category: Category,
}

impl Term {
    pub fn new(text: impl Into<String>, weight: f32, category: Category) -> Self {
        Self {
            text: text.into(),
            weight,
            category,
        }
    }
}

/// Terms grouped by category; each group feeds one independent cloud.
#[derive(Clone, Debug, Default)]
pub struct TermSet {
    pub positive: Vec<Term>,
    pub negative: Vec<Term>,
    pub neutral: Vec<Term>,
}

impl TermSet {
    pub fn get(&self, category: Category) -> &[Term] {
        match category {
            Category::Positive => &self.positive,
            Category::Negative => &self.negative,
            Category::Neutral => &self.neutral,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut Vec<Term> {
        match category {
            Category::Positive => &mut self.positive,
            Category::Negative => &mut self.negative,
            Category::Neutral => &mut self.neutral,
        }
    }

    pub fn push(&mut self, term: Term) {
        self.get_mut(term.category).push(term);
    }

    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len() + self.neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Orders every group by weight, heaviest first.
    pub fn sort_by_weight(&mut self) {
        for category in Category::ALL {
            self.get_mut(category)
                .sort_by(|a, b| b.weight.total_cmp(&a.weight));
        }
    }
}
