use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use review_cloud::cloud::{
    ForceSolver, LayoutParams, MetricMapper, SelectionConfig, ViewMode, ViewportBounds,
    ViewportConfig, build_nodes, select_terms,
};
use review_cloud::terms::{Category, Term};

fn term_strategy() -> impl Strategy<Value = Term> {
    ("[a-z]{1,12}", 0.0f32..1000.0, 0usize..3).prop_map(|(text, weight, category)| {
        Term::new(text, weight, Category::ALL[category])
    })
}

fn viewport_strategy() -> impl Strategy<Value = ViewportConfig> {
    (200.0f32..1400.0, 150.0f32..900.0, any::<bool>()).prop_map(|(width, height, expanded)| {
        let mode = if expanded {
            ViewMode::Expanded
        } else {
            ViewMode::Compact
        };
        ViewportConfig::new(width, height, mode)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn font_size_is_monotonic_and_bounded(
        weights in prop::collection::vec(0.0f32..5000.0, 1..60),
        viewport in viewport_strategy(),
    ) {
        let params = LayoutParams::default();
        let mapper = MetricMapper::new(weights.iter().copied(), &viewport, &params);
        let fonts = mapper.fonts();

        let mut sorted = weights.clone();
        sorted.sort_by(f32::total_cmp);
        let sizes = sorted.iter().map(|&weight| mapper.font_size(weight)).collect::<Vec<_>>();

        for pair in sizes.windows(2) {
            prop_assert!(pair[0] <= pair[1] + 1.0e-4);
        }
        for size in &sizes {
            prop_assert!(*size >= fonts.min - 1.0e-4 && *size <= fonts.max + 1.0e-4);
        }

        let classes = sorted.iter().map(|&weight| mapper.weight_class(weight)).collect::<Vec<_>>();
        for pair in classes.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn selection_takes_heaviest_matching_terms(
        terms in prop::collection::vec(term_strategy(), 0..150),
        word_limit in 0usize..160,
        filter in "[a-z]{0,2}",
    ) {
        let params = LayoutParams::default();
        let selection = SelectionConfig::new(word_limit, filter.clone());
        let picked = select_terms(&terms, &selection, &params);

        let matching = terms.iter().filter(|term| term.text.contains(filter.as_str())).count();
        prop_assert_eq!(picked.len(), matching.min(word_limit).min(params.word_limit_cap));
        prop_assert!(picked.iter().all(|term| term.text.contains(filter.as_str())));
        for pair in picked.windows(2) {
            prop_assert!(pair[0].weight >= pair[1].weight);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_tick_respects_bounds_and_solve_settles(
        terms in prop::collection::vec(term_strategy(), 1..40),
        viewport in viewport_strategy(),
        seed in any::<u64>(),
    ) {
        let params = LayoutParams::default();
        let selection = SelectionConfig::for_mode(viewport.mode, &params);
        let picked = select_terms(&terms, &selection, &params);
        let mapper = MetricMapper::new(picked.iter().map(|term| term.weight), &viewport, &params);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut nodes = build_nodes(&picked, &mapper, &viewport, &params, &mut rng);

        let bounds = ViewportBounds::new(&viewport, &params);
        let mut solver = ForceSolver::new(&viewport, &params);

        let mut settled_at = None;
        for _ in 0..params.max_ticks + 10 {
            let outcome = solver.step(&mut nodes);
            for node in &nodes {
                prop_assert!(node.pos.is_finite());
                prop_assert!(bounds.contains(node, 1.0e-3), "{} escaped at tick {}", node.text, outcome.tick);
            }
            if outcome.settled {
                settled_at = Some(outcome.tick);
                break;
            }
        }

        let settled_at = settled_at.unwrap_or(u32::MAX);
        prop_assert!(settled_at <= params.max_ticks);
        prop_assert!(solver.activity() < params.settle_threshold || settled_at == params.max_ticks);
    }
}
