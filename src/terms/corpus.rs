use rand::Rng;

use super::{Category, Term, TermSet};

const MAX_TERMS_PER_CATEGORY: usize = 100;

const FOOD_ITEMS: &[&str] = &[
    "Biryani", "Butter Chicken", "Pizza", "Burger", "Sushi", "Pasta", "Dimsum", "Tacos", "Dosa",
    "Thali", "Momos", "Waffles", "Coffee", "Dessert", "Curry", "Naan", "Ramen", "Salad",
    "Sandwich", "Kebab", "Shawarma", "Falafel", "Paneer", "Dal Makhani", "Fried Rice", "Noodles",
    "Manchurian", "Soup", "Steak", "Fries", "Milkshake", "Ice Cream", "Cake", "Donut",
    "Croissant", "Bagel", "Burrito", "Nachos", "Hot Dog", "Lasagna", "Risotto", "Tandoori",
    "Samosa", "Chaat", "Idli", "Vada", "Uttapam", "Paratha", "Brownie", "Tea", "Bhature", "Rolls",
    "Dumplings",
];

const POSITIVE_ADJECTIVES: &[&str] = &[
    "delicious", "excellent", "fast", "polite", "fresh", "authentic", "yummy", "superb", "clean",
    "tasty", "amazing", "loved", "great", "warm", "perfect", "scrumptious", "delightful",
    "flavorful", "heavenly", "fantastic", "brilliant", "top-notch", "wonderful", "satisfying",
    "rich", "spicy", "creamy", "succulent", "juicy", "crispy", "hot", "appetizing", "impressive",
    "splendid", "fabulous", "outstanding", "terrific", "awesome", "generous", "prompt",
    "courteous", "classy", "efficient", "hygienic", "premium", "worth-it",
];

const NEGATIVE_ADJECTIVES: &[&str] = &[
    "cold", "stale", "late", "rude", "expensive", "salty", "worst", "bad", "messy", "raw",
    "burnt", "pathetic", "slow", "missing", "oily", "horrible", "terrible", "disgusting", "awful",
    "bland", "tasteless", "undercooked", "overcooked", "soggy", "greasy", "stinky", "sour",
    "bitter", "rotten", "unhygienic", "dirty", "filthy", "nasty", "gross", "revolting",
    "inedible", "dry", "hard", "tough", "chewy", "rubbery", "watery", "flavorless",
    "disappointing", "waste", "horrendous", "appalling", "dreadful",
];

const NEUTRAL_ADJECTIVES: &[&str] = &[
    "okay", "average", "decent", "edible", "standard", "fine", "moderate", "passable", "basic",
    "typical", "mediocre", "so-so", "alright", "fair", "plain", "simple", "ordinary",
    "acceptable", "satisfactory", "tolerable", "bearable", "unremarkable", "expected",
    "reasonable", "sufficient", "ok", "manageable",
];

const CONTEXT_WORDS: &[&str] = &[
    "delivery", "packaging", "rider", "app", "discount", "service", "taste", "quality", "portion",
    "price", "hygiene", "experience", "presentation", "quantity", "temperature", "texture",
    "aroma", "flavor", "spices", "ingredients", "cutlery", "sauces", "waiting time", "refund",
    "support", "behavior", "timing", "promo code", "bill", "gps", "location",
];

fn adjectives_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Positive => POSITIVE_ADJECTIVES,
        Category::Negative => NEGATIVE_ADJECTIVES,
        Category::Neutral => NEUTRAL_ADJECTIVES,
    }
}

fn weight_in<R: Rng>(rng: &mut R, min: u32, max: u32) -> f32 {
    rng.random_range(min..=max) as f32
}

/// Synthetic mention counts for one category, heaviest first.
///
/// A few "trend" foods and "dominant" adjectives get much larger weights than
/// the rest so the cloud has a visible hierarchy.
pub fn generate_category_terms<R: Rng>(category: Category, rng: &mut R) -> Vec<Term> {
    let mut terms = Vec::new();

    for &item in FOOD_ITEMS {
        if rng.random_bool(0.4) {
            let weight = if rng.random_bool(0.05) {
                weight_in(rng, 180, 220)
            } else {
                weight_in(rng, 20, 80)
            };
            terms.push(Term::new(item, weight, category));
        }
    }

    for &adjective in adjectives_for(category) {
        if rng.random_bool(0.7) {
            let weight = if rng.random_bool(0.08) {
                weight_in(rng, 150, 200)
            } else {
                weight_in(rng, 30, 90)
            };
            terms.push(Term::new(adjective, weight, category));
        }
    }

    for &context in CONTEXT_WORDS {
        if rng.random_bool(0.5) {
            terms.push(Term::new(context, weight_in(rng, 20, 70), category));
        }
    }

    terms.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    terms.truncate(MAX_TERMS_PER_CATEGORY);
    terms
}

pub fn generate_term_set<R: Rng>(rng: &mut R) -> TermSet {
    let mut set = TermSet::default();
    for category in Category::ALL {
        *set.get_mut(category) = generate_category_terms(category, rng);
    }
    set
}
