//! Response schemas sent to Gemini alongside structured queries.
//!
//! These are declarative only: Gemini uses them to shape its JSON output, and
//! the parsed payload is still checked locally (see `models::Validate`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subset of the OpenAPI types Gemini accepts in `responseSchema`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    String,
    Array,
}

/// A Gemini `Schema` object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Declaration order of `properties`; Gemini emits keys in this order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn leaf(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    /// Object whose properties are all required, in the given order.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let property_ordering: Vec<String> =
            properties.iter().map(|(name, _)| name.to_string()).collect();
        Self {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required: property_ordering.clone(),
            property_ordering,
            ..Self::leaf(SchemaType::Object)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Shape of the cultivation guide returned for a vegetable
pub fn vegetable_info_schema() -> Schema {
    let estimated_costs = Schema::object(vec![
        (
            "seeds",
            Schema::string().describe("Estimated cost of seeds per acre/hectare."),
        ),
        (
            "infrastructure",
            Schema::string().describe(
                "Estimated cost for necessary infrastructure like irrigation, trellising, etc.",
            ),
        ),
        (
            "other",
            Schema::string()
                .describe("Other associated costs like fertilizers, pesticides, and labor."),
        ),
    ]);

    Schema::object(vec![
        (
            "howToGrow",
            Schema::string().describe(
                "A detailed step-by-step guide on how to grow the vegetable, from seed to harvest. \
                 Use numbered lists for steps (e.g., '1. Soil Preparation...\\n2. Sowing...').",
            ),
        ),
        (
            "keyConsiderations",
            Schema::string().describe(
                "Important factors to consider during cultivation, like soil type, climate, \
                 watering schedule, and pest control. Use bullet points for key points \
                 (e.g., '- Soil: Well-drained sandy loam...\\n- Climate: ...').",
            ),
        ),
        (
            "marketPriceIndia",
            Schema::string().describe(
                "The current average market price for the vegetable in India, specified in INR \
                 per kg or quintal. Mention the price range.",
            ),
        ),
        (
            "growthTime",
            Schema::string().describe(
                "The typical time required for the vegetable to grow from planting to first harvest.",
            ),
        ),
        ("estimatedCosts", estimated_costs),
        (
            "postHarvest",
            Schema::string().describe(
                "Tips and best practices for post-harvest handling, storage, and preservation to \
                 maximize shelf life and value. Use bullet points for tips.",
            ),
        ),
        (
            "cropPairings",
            Schema::array(Schema::string()).describe(
                "A list of companion plants or crop pairings that can enhance yield and profitability.",
            ),
        ),
        (
            "highDemandRegions",
            Schema::string().describe(
                "A summary of regions or major cities in India with high market demand for this \
                 vegetable. Use bullet points for clarity.",
            ),
        ),
    ])
}

/// Shape of the yield estimate and alternative crop suggestions
pub fn calculator_schema() -> Schema {
    let crop = Schema::object(vec![
        (
            "name",
            Schema::string().describe("The name of a more profitable alternative crop."),
        ),
        (
            "reason",
            Schema::string().describe(
                "A brief explanation why this alternative crop is more profitable or suitable \
                 for the region.",
            ),
        ),
    ]);

    Schema::object(vec![
        (
            "potentialYield",
            Schema::string().describe(
                "An estimated potential yield for the specified vegetable on the given land size \
                 and region. E.g., '10-15 tonnes per acre'.",
            ),
        ),
        (
            "profitableCrops",
            Schema::array(crop).describe(
                "A list of alternative crops that could be more profitable in the specified region.",
            ),
        ),
    ])
}
