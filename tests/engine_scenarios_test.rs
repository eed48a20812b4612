use meal_optimizer_rs::catalog::IngredientCatalog;
use meal_optimizer_rs::engine::{
    EngineConfig, FALLBACK_SOLVER, analyze_gaps, optimize, select_supplements,
};
use meal_optimizer_rs::error::OptimError;
use meal_optimizer_rs::models::{
    Category, Ingredient, Macro, MacroTarget, Preferences, Provenance,
};
use meal_optimizer_rs::solvers::SolverBudget;

fn ingredient(
    name: &str,
    cal: f64,
    p: f64,
    c: f64,
    f: f64,
    category: Category,
    quantity: f64,
    max: Option<f64>,
) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        calories_per_100: cal,
        protein_per_100: p,
        carbs_per_100: c,
        fat_per_100: f,
        category,
        quantity,
        max_quantity: max,
        provenance: Provenance::Original,
    }
}

fn chicken(quantity: f64) -> Ingredient {
    ingredient(
        "chicken_breast",
        165.0,
        31.0,
        0.0,
        3.6,
        Category::Protein,
        quantity,
        Some(300.0),
    )
}

fn sample_catalog() -> IngredientCatalog {
    IngredientCatalog::new(vec![
        ingredient("Chicken Breast", 165.0, 31.0, 0.0, 3.6, Category::Protein, 0.0, None),
        ingredient("Greek Yogurt", 59.0, 10.0, 3.6, 0.4, Category::Protein, 0.0, None),
        ingredient("Brown Rice", 111.0, 2.6, 23.0, 0.9, Category::Carb, 0.0, None),
        ingredient("Sweet Potato", 86.0, 1.6, 20.0, 0.1, Category::Carb, 0.0, None),
        ingredient("Olive Oil", 884.0, 0.0, 0.0, 100.0, Category::Fat, 0.0, None),
        ingredient("Almonds", 579.0, 21.0, 22.0, 50.0, Category::Fat, 0.0, Some(50.0)),
        ingredient("Spinach", 23.0, 2.9, 3.6, 0.4, Category::Vegetable, 0.0, None),
    ])
}

fn seeded_config() -> EngineConfig {
    EngineConfig {
        seed: Some(42),
        ..Default::default()
    }
}

#[test]
fn test_single_ingredient_perfect_match() {
    // 100 g of chicken breast is exactly the target; the portfolio must find it.
    let ingredients = vec![chicken(0.0)];
    let target = MacroTarget::new(165.0, 31.0, 0.0, 3.6);

    let result = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &seeded_config(),
    )
    .unwrap();

    assert!(result.penalty < 1e-9, "penalty: {}", result.penalty);
    assert!(result.target_achieved);
    assert_eq!(result.items.len(), 1);
    assert!(
        (result.items[0].quantity - 100.0).abs() < 0.5,
        "quantity: {}",
        result.items[0].quantity
    );
    assert!(result.supplements.is_empty());
}

#[test]
fn test_empty_ingredient_list_is_supplemented() {
    let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);

    // Deficits of an empty set equal the full target.
    let report = analyze_gaps(&[], &target);
    assert_eq!(report.deficits.calories, 500.0);
    assert_eq!(report.deficits.protein, 50.0);
    assert_eq!(report.deficits.carbs, 45.0);
    assert_eq!(report.deficits.fat, 15.0);

    // One supplement per deficient macro category before any solver runs.
    let catalog = sample_catalog();
    let supplements = select_supplements(&report, &[], &catalog, &Preferences::default());
    let categories: Vec<Category> = supplements.iter().map(|s| s.category).collect();
    assert!(categories.contains(&Category::Protein));
    assert!(categories.contains(&Category::Carb));
    assert!(categories.contains(&Category::Fat));

    let result = optimize(
        &[],
        &target,
        &Preferences::default(),
        &catalog,
        &seeded_config(),
    )
    .unwrap();

    assert_eq!(result.items.len(), 3);
    assert_eq!(result.supplements.len(), 3);
    assert!(result.items.iter().all(|i| i.provenance == Provenance::Supplement));
}

#[test]
fn test_zero_calorie_target_policy() {
    // Calories are excluded from the penalty when their target is zero, and
    // the calories flag only passes for an effectively calorie-free meal.
    let ingredients = vec![chicken(0.0)];
    let target = MacroTarget::new(0.0, 50.0, 0.0, 0.0);

    let result = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &seeded_config(),
    )
    .unwrap();

    // Hitting 50 g protein forces real calories on board.
    assert!(result.totals.calories > 0.0);
    assert!(result.achievement.protein);
    assert!(!result.achievement.calories);
    assert!(!result.target_achieved);
    assert!(result.penalty < 1e-6, "penalty: {}", result.penalty);
}

#[test]
fn test_forced_solver_failure_uses_fallback() {
    // Zero budgets fail every solver; the deterministic scaling takes over.
    let ingredients = vec![
        ingredient("chicken_breast", 165.0, 31.0, 0.0, 3.6, Category::Protein, 100.0, Some(1000.0)),
        ingredient("brown_rice", 111.0, 2.6, 23.0, 0.9, Category::Carb, 50.0, Some(1000.0)),
    ];
    // Current calories: 165 + 55.5 = 220.5. Double it.
    let target = MacroTarget::new(441.0, 0.0, 0.0, 0.0);
    let config = EngineConfig {
        budget: SolverBudget::exhausted(),
        seed: Some(1),
        ..Default::default()
    };

    let result = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &config,
    )
    .unwrap();

    assert_eq!(result.solver, FALLBACK_SOLVER);
    assert!((result.totals.calories - 441.0).abs() < 1e-6);

    // Proportionality: the 2:1 quantity ratio survives the scaling.
    let q_chicken = result.items[0].quantity;
    let q_rice = result.items[1].quantity;
    assert!((q_chicken / q_rice - 2.0).abs() < 1e-9);
    assert!((q_chicken - 200.0).abs() < 1e-9);
}

#[test]
fn test_fallback_undefined_is_fatal() {
    // No starting calories, positive calorie target, and no solver budget:
    // the scale factor is undefined and must surface as an error.
    let ingredients = vec![chicken(0.0)];
    let target = MacroTarget::new(500.0, 0.0, 0.0, 0.0);
    let config = EngineConfig {
        budget: SolverBudget::exhausted(),
        seed: Some(1),
        ..Default::default()
    };

    let err = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &config,
    )
    .unwrap_err();

    assert!(matches!(err, OptimError::FallbackUndefined));
}

#[test]
fn test_empty_list_without_catalog_candidates_is_invalid() {
    let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);

    let err = optimize(
        &[],
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &seeded_config(),
    )
    .unwrap_err();

    match err {
        OptimError::InvalidInput { field, .. } => assert_eq!(field, "ingredients"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_quantities_stay_within_bounds() {
    // Protein target beyond what the bound allows: solvers saturate but never
    // exceed the box.
    let ingredients = vec![ingredient(
        "chicken_breast",
        165.0,
        31.0,
        0.0,
        3.6,
        Category::Protein,
        0.0,
        Some(100.0),
    )];
    let target = MacroTarget::new(600.0, 60.0, 0.0, 0.0);

    let result = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &IngredientCatalog::empty(),
        &seeded_config(),
    )
    .unwrap();

    for item in &result.items {
        assert!(item.quantity >= 0.0);
        assert!(item.quantity <= 100.0 + 1e-9, "quantity: {}", item.quantity);
    }
    assert!(!result.achievement.protein);
}

#[test]
fn test_same_seed_reproduces_result() {
    let ingredients = vec![chicken(0.0)];
    let target = MacroTarget::new(400.0, 45.0, 30.0, 12.0);
    let catalog = sample_catalog();

    let run = || {
        optimize(
            &ingredients,
            &target,
            &Preferences::default(),
            &catalog,
            &seeded_config(),
        )
        .unwrap()
    };

    let a = run();
    let b = run();

    assert_eq!(a.solver, b.solver);
    assert_eq!(a.items.len(), b.items.len());
    for (x, y) in a.items.iter().zip(&b.items) {
        assert_eq!(x.quantity, y.quantity);
    }
}

#[test]
fn test_preferences_steer_supplement_choice() {
    let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);
    let prefs = Preferences {
        excluded_categories: vec![],
        avoided_ingredients: vec!["olive".to_string()],
    };

    let result = optimize(
        &[],
        &target,
        &prefs,
        &sample_catalog(),
        &seeded_config(),
    )
    .unwrap();

    assert!(
        result
            .supplements
            .iter()
            .all(|name| !name.to_lowercase().contains("olive"))
    );
}

#[test]
fn test_gap_analyzer_is_idempotent() {
    let ingredients = vec![chicken(120.0)];
    let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);

    let first = analyze_gaps(&ingredients, &target);
    let second = analyze_gaps(&ingredients, &target);
    assert_eq!(first, second);
    assert_eq!(
        first.deficit(Macro::Protein),
        second.deficit(Macro::Protein)
    );
}
