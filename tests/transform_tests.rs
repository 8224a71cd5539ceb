use serde_json::json;
use sync_service::{
    error::SyncError,
    models::{
        catalog::{ProductAttribute, ProductTemplate, VariantAttribute, VariantTemplate},
        storefront::MetafieldValue,
    },
    transform::{MAX_VARIANTS_PER_PRODUCT, to_product_set_input},
};

fn variant(sku: &str, attributes: &[(&str, &str)]) -> VariantTemplate {
    VariantTemplate {
        default_code: sku.to_string(),
        attributes: attributes
            .iter()
            .map(|(name, value)| VariantAttribute {
                name: (*name).to_string(),
                value: (*value).to_string(),
            })
            .collect(),
    }
}

fn template(variants: Vec<VariantTemplate>) -> ProductTemplate {
    ProductTemplate {
        id: "tpl-1".to_string(),
        name: "Pendant Light".to_string(),
        description_sale: Some("<p>Brushed brass pendant.</p>".to_string()),
        attributes: vec![],
        variants,
        main_image: None,
        images: vec![],
    }
}

/// Test: Known fields map directly onto the destination payload
#[test]
fn test_known_fields_map_directly() {
    let input = to_product_set_input(&template(vec![
        variant("SKU-1", &[("Color", "Black"), ("Size", "Small")]),
        variant("SKU-2", &[("Color", "Brass"), ("Size", "Small")]),
    ]))
    .unwrap();

    assert_eq!(input.title, "Pendant Light");
    assert_eq!(input.description_html, "<p>Brushed brass pendant.</p>");

    assert_eq!(input.product_options.len(), 2);
    // Options are sorted by name for deterministic output.
    assert_eq!(input.product_options[0].name, "Color");
    assert_eq!(input.product_options[1].name, "Size");

    let color_values: Vec<&str> = input.product_options[0]
        .values
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(color_values, vec!["Black", "Brass"]);

    assert_eq!(input.variants.len(), 2);
    assert_eq!(input.variants[0].sku, "SKU-1");
    assert_eq!(input.variants[0].option_values.len(), 2);
    assert_eq!(input.variants[0].option_values[0].option_name, "Color");
    assert_eq!(input.variants[0].option_values[0].name, "Black");
}

/// Test: The transform is deterministic for the same input template
#[test]
fn test_transform_is_deterministic() {
    let source = template(vec![
        variant("SKU-1", &[("Color", "Black"), ("Finish", "Matte")]),
        variant("SKU-2", &[("Color", "White"), ("Finish", "Gloss")]),
    ]);

    let first = to_product_set_input(&source).unwrap();
    let second = to_product_set_input(&source).unwrap();

    assert_eq!(first, second);
}

/// Test: A missing description maps to an empty string
#[test]
fn test_missing_description_maps_to_empty() {
    let mut source = template(vec![variant("SKU-1", &[])]);
    source.description_sale = None;

    let input = to_product_set_input(&source).unwrap();
    assert_eq!(input.description_html, "");
}

/// Test: Duplicate option values are removed, keeping first-seen order
#[test]
fn test_option_values_are_deduplicated() {
    let input = to_product_set_input(&template(vec![
        variant("SKU-1", &[("Size", "Large")]),
        variant("SKU-2", &[("Size", "Small")]),
        variant("SKU-3", &[("Size", "Large")]),
    ]))
    .unwrap();

    let values: Vec<&str> = input.product_options[0]
        .values
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(values, vec!["Large", "Small"]);
}

/// Test: Exactly three options is accepted
#[test]
fn test_three_options_accepted() {
    let input = to_product_set_input(&template(vec![variant(
        "SKU-1",
        &[("Color", "Black"), ("Size", "Small"), ("Finish", "Matte")],
    )]))
    .unwrap();

    assert_eq!(input.product_options.len(), 3);
}

/// Test: More than three options is rejected with a validation error
#[test]
fn test_more_than_three_options_rejected() {
    let result = to_product_set_input(&template(vec![variant(
        "SKU-1",
        &[
            ("Color", "Black"),
            ("Size", "Small"),
            ("Finish", "Matte"),
            ("Material", "Steel"),
        ],
    )]));

    match result {
        Err(SyncError::Validation(message)) => {
            assert!(message.contains("4 options"), "got: {message}");
        }
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

/// Test: Variants beyond the limit are truncated in catalog order
#[test]
fn test_excess_variants_are_truncated() {
    let variants: Vec<VariantTemplate> = (0..150)
        .map(|i| {
            let value = format!("v{}", i);
            variant(&format!("SKU-{}", i), &[("Size", value.as_str())])
        })
        .collect();

    let input = to_product_set_input(&template(variants)).unwrap();

    assert_eq!(input.variants.len(), MAX_VARIANTS_PER_PRODUCT);
    assert_eq!(input.variants[0].sku, "SKU-0");
    assert_eq!(input.variants[99].sku, "SKU-99");

    // Option values are derived from the full variant set, before the
    // variant list is cut.
    assert_eq!(input.product_options[0].values.len(), 150);
}

/// Test: Unmapped attributes land verbatim in the metafield bag
#[test]
fn test_unmapped_attributes_become_metafields() {
    let mut source = template(vec![variant("SKU-1", &[])]);
    source.attributes = vec![
        ProductAttribute {
            name: "wattage".to_string(),
            value: json!(60),
            category: Some("electrical".to_string()),
            description: Some("Bulb wattage".to_string()),
        },
        ProductAttribute {
            name: "dimmable".to_string(),
            value: json!(true),
            category: None,
            description: None,
        },
        ProductAttribute {
            name: "certifications".to_string(),
            value: json!(["UL", "CE"]),
            category: Some("compliance".to_string()),
            description: None,
        },
        ProductAttribute {
            name: "dimensions".to_string(),
            value: json!({"height": 30, "width": 12}),
            category: None,
            description: None,
        },
    ];

    let input = to_product_set_input(&source).unwrap();

    assert_eq!(input.metafields.len(), 4);

    assert_eq!(input.metafields[0].namespace, "electrical");
    assert_eq!(input.metafields[0].key, "wattage");
    assert_eq!(input.metafields[0].value, MetafieldValue::Number(60.0));

    // Attributes without a category fall into the default namespace.
    assert_eq!(input.metafields[1].namespace, "custom");
    assert_eq!(input.metafields[1].value, MetafieldValue::Boolean(true));

    assert_eq!(
        input.metafields[2].value,
        MetafieldValue::List(vec!["UL".to_string(), "CE".to_string()])
    );

    // Nested objects are carried as their JSON text.
    match &input.metafields[3].value {
        MetafieldValue::String(text) => {
            assert!(text.contains("height"), "got: {text}");
        }
        other => panic!("expected string metafield, got {:?}", other),
    }
}

/// Test: Metafield values serialize as a tagged type/value pair
#[test]
fn test_metafield_wire_shape() {
    let mut source = template(vec![variant("SKU-1", &[])]);
    source.attributes = vec![ProductAttribute {
        name: "finish".to_string(),
        value: json!("brushed"),
        category: Some("appearance".to_string()),
        description: None,
    }];

    let input = to_product_set_input(&source).unwrap();
    let wire = serde_json::to_value(&input.metafields[0]).unwrap();

    assert_eq!(
        wire,
        json!({
            "namespace": "appearance",
            "key": "finish",
            "type": "string",
            "value": "brushed",
        })
    );
}

/// Test: A template without variants still produces a valid payload
#[test]
fn test_template_without_variants() {
    let input = to_product_set_input(&template(vec![])).unwrap();

    assert!(input.product_options.is_empty());
    assert!(input.variants.is_empty());
}
