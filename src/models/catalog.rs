use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One page of the catalog product listing. The sync chain always
/// requests a page of one; an empty `results` means end of catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    pub results: Vec<ProductTemplate>,
}

/// A catalog record describing one product and its variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description_sale: Option<String>,

    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,

    #[serde(default)]
    pub variants: Vec<VariantTemplate>,

    #[serde(default)]
    pub main_image: Option<String>,

    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Product-level attribute of arbitrary shape. Attributes with no
/// first-class mapping end up verbatim in the storefront metafield bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub value: JsonValue,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantTemplate {
    pub default_code: String,

    #[serde(default)]
    pub attributes: Vec<VariantAttribute>,
}

/// Name/value pair on a variant, e.g. `Color: Red`. These become the
/// storefront product options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
}
