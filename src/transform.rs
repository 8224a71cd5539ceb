use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::{
    error::SyncError,
    models::{
        catalog::{ProductAttribute, ProductTemplate},
        storefront::{
            MetafieldInput, MetafieldValue, OptionValue, ProductOption, ProductSetInput,
            VariantInput, VariantOptionValue,
        },
    },
};

/// Storefront limit on distinct options per product. Templates exceeding
/// it are rejected, since dropping an option would corrupt variant
/// identity.
pub const MAX_PRODUCT_OPTIONS: usize = 3;

/// Storefront limit on variants per product. Variants past the limit are
/// truncated in catalog order.
pub const MAX_VARIANTS_PER_PRODUCT: usize = 100;

const DEFAULT_VENDOR: &str = "Vendor Name";

/// Maps a catalog product template to the storefront `productSet` input.
///
/// Pure and deterministic: options are ordered by name, option values
/// keep first-seen order with duplicates removed. Attributes with no
/// first-class mapping are carried verbatim in the metafield bag.
pub fn to_product_set_input(template: &ProductTemplate) -> Result<ProductSetInput, SyncError> {
    let option_names: BTreeSet<&str> = template
        .variants
        .iter()
        .flat_map(|variant| variant.attributes.iter().map(|attr| attr.name.as_str()))
        .collect();

    if option_names.len() > MAX_PRODUCT_OPTIONS {
        return Err(SyncError::Validation(format!(
            "product '{}' has {} options, storefront supports at most {}",
            template.id,
            option_names.len(),
            MAX_PRODUCT_OPTIONS
        )));
    }

    // Option values are collected over the full variant set, before the
    // variant list itself is truncated.
    let product_options = option_names
        .iter()
        .map(|name| {
            let mut values: Vec<OptionValue> = Vec::new();
            for variant in &template.variants {
                for attr in &variant.attributes {
                    if attr.name == *name && !values.iter().any(|v| v.name == attr.value) {
                        values.push(OptionValue {
                            name: attr.value.clone(),
                        });
                    }
                }
            }
            ProductOption {
                name: (*name).to_string(),
                values,
            }
        })
        .collect();

    let variants = template
        .variants
        .iter()
        .take(MAX_VARIANTS_PER_PRODUCT)
        .map(|variant| {
            let option_values = option_names
                .iter()
                .filter_map(|name| {
                    variant
                        .attributes
                        .iter()
                        .find(|attr| attr.name == *name)
                        .map(|attr| VariantOptionValue {
                            option_name: (*name).to_string(),
                            name: attr.value.clone(),
                        })
                })
                .collect();

            VariantInput {
                sku: variant.default_code.clone(),
                option_values,
            }
        })
        .collect();

    let metafields = template.attributes.iter().map(to_metafield).collect();

    Ok(ProductSetInput {
        title: template.name.clone(),
        vendor: DEFAULT_VENDOR.to_string(),
        description_html: template.description_sale.clone().unwrap_or_default(),
        product_options,
        variants,
        metafields,
    })
}

fn to_metafield(attribute: &ProductAttribute) -> MetafieldInput {
    MetafieldInput {
        namespace: attribute
            .category
            .clone()
            .unwrap_or_else(|| "custom".to_string()),
        key: attribute.name.clone(),
        description: attribute.description.clone(),
        value: to_metafield_value(&attribute.value),
    }
}

fn to_metafield_value(value: &JsonValue) -> MetafieldValue {
    match value {
        JsonValue::String(s) => MetafieldValue::String(s.clone()),
        JsonValue::Number(n) => MetafieldValue::Number(n.as_f64().unwrap_or(0.0)),
        JsonValue::Bool(b) => MetafieldValue::Boolean(*b),
        JsonValue::Null => MetafieldValue::String(String::new()),
        JsonValue::Array(items) if items.iter().all(|item| item.is_string() || item.is_number() || item.is_boolean()) => {
            MetafieldValue::List(items.iter().map(scalar_text).collect())
        }
        // Nested arrays and objects are carried as their JSON text.
        other => MetafieldValue::String(other.to_string()),
    }
}

fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
