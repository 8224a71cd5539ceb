use serde::{Deserialize, Serialize};

/// Input for the storefront `productSet` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSetInput {
    pub title: String,
    pub vendor: String,
    pub description_html: String,
    pub product_options: Vec<ProductOption>,
    pub variants: Vec<VariantInput>,
    pub metafields: Vec<MetafieldInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<OptionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub sku: String,
    pub option_values: Vec<VariantOptionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOptionValue {
    pub option_name: String,
    pub name: String,
}

/// Unstructured metafield carrying a catalog attribute that has no
/// first-class storefront mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetafieldInput {
    pub namespace: String,
    pub key: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub value: MetafieldValue,
}

/// Tagged value union for the metafield bag. Attribute values that are
/// neither scalars nor lists of scalars are carried as their JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetafieldValue {
    String(String),
    Number(f64),
    Boolean(bool),
    List(Vec<String>),
}

// Wire shapes for storefront GraphQL responses.

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,

    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSetData {
    pub product_set: ProductSetResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSetResult {
    pub product: Option<IdObject>,
    pub product_set_operation: Option<OperationHandle>,

    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationHandle {
    pub id: String,
    pub status: Option<String>,

    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOperationData {
    pub product_operation: Option<OperationStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub id: String,
    pub status: String,
    pub product: Option<IdObject>,

    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdObject {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub field: Option<serde_json::Value>,

    pub message: String,
}
