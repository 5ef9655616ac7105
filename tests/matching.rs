use storefront_catalog_api::matching::{
    AddonProduct, AttributeKind, AttributeView, OptionTag, OptionView, resolve_addon_candidates,
};
use uuid::Uuid;

fn option(name: &str) -> OptionView {
    OptionView {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

fn addon(title: &str) -> AddonProduct {
    AddonProduct {
        id: Uuid::new_v4(),
        title: title.to_string(),
    }
}

fn tag(product: &AddonProduct, option: &OptionView) -> OptionTag {
    OptionTag {
        product_id: product.id,
        option_id: option.id,
    }
}

#[test]
fn groups_addons_by_attribute_and_option() {
    let face = Uuid::new_v4();
    let acne = option("Acne");
    let dryness = option("Dryness");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([
            (Some(face), acne.clone()),
            (Some(face), dryness.clone()),
        ]),
    };

    let clarifying = addon("Clarifying Booster");
    let hydrating = addon("Hydration Booster");
    let addons = [clarifying.clone(), hydrating.clone()];
    let tags = [
        tag(&clarifying, &acne),
        tag(&hydrating, &dryness),
        tag(&hydrating, &acne),
    ];

    let groups = resolve_addon_candidates(face, &[concerns], &addons, &tags);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].attribute_name, "Skin Concerns");
    assert_eq!(groups[0].options.len(), 2);
    assert_eq!(groups[0].options[0].option_name, "Acne");
    assert_eq!(
        groups[0].options[0]
            .addons
            .iter()
            .map(|a| a.title.as_str())
            .collect::<Vec<_>>(),
        vec!["Clarifying Booster", "Hydration Booster"]
    );
    assert_eq!(groups[0].options[1].option_name, "Dryness");
    assert_eq!(groups[0].options[1].addons, vec![hydrating]);
}

#[test]
fn excludes_options_scoped_to_other_categories() {
    let face = Uuid::new_v4();
    let eye = Uuid::new_v4();
    let acne = option("Acne");
    let dark_circles = option("Dark Circles");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([
            (Some(face), acne.clone()),
            (Some(eye), dark_circles.clone()),
        ]),
    };

    let booster = addon("Booster");
    let eye_booster = addon("Eye Booster");
    let addons = [booster.clone(), eye_booster.clone()];
    let tags = [tag(&booster, &acne), tag(&eye_booster, &dark_circles)];

    let groups = resolve_addon_candidates(face, &[concerns], &addons, &tags);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].options.len(), 1);
    assert_eq!(groups[0].options[0].option_name, "Acne");
    assert_eq!(groups[0].options[0].addons, vec![booster]);
}

#[test]
fn uncategorized_options_never_match() {
    let face = Uuid::new_v4();
    let unscoped = option("Unscoped");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([(None, unscoped.clone())]),
    };

    let booster = addon("Booster");
    let tags = [tag(&booster, &unscoped)];

    let groups = resolve_addon_candidates(face, &[concerns], &[booster], &tags);
    assert!(groups.is_empty());
}

#[test]
fn global_attributes_contribute_nothing() {
    let face = Uuid::new_v4();
    let finish = option("Matte");

    let texture = AttributeView {
        id: Uuid::new_v4(),
        name: "Texture".into(),
        kind: AttributeKind::Global(vec![finish.clone()]),
    };

    let booster = addon("Booster");
    let tags = [tag(&booster, &finish)];

    let groups = resolve_addon_candidates(face, &[texture], &[booster], &tags);
    assert!(groups.is_empty());
}

#[test]
fn prunes_empty_options_and_attributes() {
    let face = Uuid::new_v4();
    let acne = option("Acne");
    let dryness = option("Dryness");
    let wrinkles = option("Wrinkles");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([
            (Some(face), acne.clone()),
            (Some(face), dryness.clone()),
        ]),
    };
    let untagged = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Type".into(),
        kind: AttributeKind::category_linked([(Some(face), wrinkles.clone())]),
    };

    let booster = addon("Booster");
    let tags = [tag(&booster, &acne)];

    let groups =
        resolve_addon_candidates(face, &[concerns, untagged], &[booster], &tags);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].attribute_name, "Skin Concerns");
    assert_eq!(groups[0].options.len(), 1);
    assert_eq!(groups[0].options[0].option_name, "Acne");
}

#[test]
fn tags_for_unknown_products_are_ignored() {
    let face = Uuid::new_v4();
    let acne = option("Acne");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([(Some(face), acne.clone())]),
    };

    let stray = OptionTag {
        product_id: Uuid::new_v4(),
        option_id: acne.id,
    };

    let groups = resolve_addon_candidates(face, &[concerns], &[], &[stray]);
    assert!(groups.is_empty());
}

#[test]
fn no_options_for_category_yields_empty_result() {
    let face = Uuid::new_v4();
    let other = Uuid::new_v4();
    let acne = option("Acne");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([(Some(face), acne)]),
    };

    let groups = resolve_addon_candidates(other, &[concerns], &[], &[]);
    assert!(groups.is_empty());
}

#[test]
fn preserves_tag_insertion_order_within_an_option() {
    let face = Uuid::new_v4();
    let acne = option("Acne");

    let concerns = AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([(Some(face), acne.clone())]),
    };

    let first = addon("First Tagged");
    let second = addon("Second Tagged");
    let third = addon("Third Tagged");
    // Listing order differs from tagging order; tagging order wins.
    let addons = [third.clone(), first.clone(), second.clone()];
    let tags = [
        tag(&first, &acne),
        tag(&second, &acne),
        tag(&third, &acne),
    ];

    let groups = resolve_addon_candidates(face, &[concerns], &addons, &tags);
    assert_eq!(groups[0].options[0].addons, vec![first, second, third]);
}

#[test]
fn resolver_is_deterministic_for_a_fixed_snapshot() {
    let face = Uuid::new_v4();
    let acne = option("Acne");
    let dryness = option("Dryness");

    let attributes = vec![AttributeView {
        id: Uuid::new_v4(),
        name: "Skin Concerns".into(),
        kind: AttributeKind::category_linked([
            (Some(face), acne.clone()),
            (Some(face), dryness.clone()),
        ]),
    }];

    let a = addon("A");
    let b = addon("B");
    let c = addon("C");
    let addons = [a.clone(), b.clone(), c.clone()];
    let tags = [
        tag(&b, &acne),
        tag(&a, &dryness),
        tag(&c, &acne),
        tag(&a, &acne),
    ];

    let first = resolve_addon_candidates(face, &attributes, &addons, &tags);
    let second = resolve_addon_candidates(face, &attributes, &addons, &tags);
    assert_eq!(first, second);
}
