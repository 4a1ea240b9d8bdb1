use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{KisanError, KisanResult};

/// Post-parse checks for payloads returned by a structured query
pub trait Validate {
    fn validate(&self) -> KisanResult<()>;
}

fn require_text(field: &str, value: &str) -> KisanResult<()> {
    if value.trim().is_empty() {
        return Err(KisanError::MalformedResponse(format!(
            "required field '{}' is empty",
            field
        )));
    }
    Ok(())
}

/// Cultivation guide for a single vegetable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VegetableInfo {
    pub how_to_grow: String,
    pub key_considerations: String,
    pub market_price_india: String,
    pub growth_time: String,
    pub estimated_costs: EstimatedCosts,
    pub post_harvest: String,
    pub crop_pairings: Vec<String>,
    pub high_demand_regions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedCosts {
    pub seeds: String,
    pub infrastructure: String,
    pub other: String,
}

impl Validate for VegetableInfo {
    fn validate(&self) -> KisanResult<()> {
        require_text("howToGrow", &self.how_to_grow)?;
        require_text("keyConsiderations", &self.key_considerations)?;
        require_text("marketPriceIndia", &self.market_price_india)?;
        require_text("growthTime", &self.growth_time)?;
        require_text("estimatedCosts.seeds", &self.estimated_costs.seeds)?;
        require_text(
            "estimatedCosts.infrastructure",
            &self.estimated_costs.infrastructure,
        )?;
        require_text("estimatedCosts.other", &self.estimated_costs.other)?;
        require_text("postHarvest", &self.post_harvest)?;
        require_text("highDemandRegions", &self.high_demand_regions)
    }
}

/// Yield estimate plus alternative crops for a plot of land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResult {
    pub potential_yield: String,
    pub profitable_crops: Vec<ProfitableCrop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitableCrop {
    pub name: String,
    pub reason: String,
}

impl Validate for CalculatorResult {
    fn validate(&self) -> KisanResult<()> {
        // Crop entries are shaped by the response schema; their content is not checked here.
        require_text("potentialYield", &self.potential_yield)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One entry of the visible chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Units accepted by the land calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandUnit {
    #[default]
    Acre,
    Hectare,
    Bigha,
}

impl LandUnit {
    pub const ALL: [LandUnit; 3] = [LandUnit::Acre, LandUnit::Hectare, LandUnit::Bigha];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acre => "acre",
            Self::Hectare => "hectare",
            Self::Bigha => "bigha",
        }
    }
}

impl fmt::Display for LandUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandUnit {
    type Err = KisanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "acre" => Ok(Self::Acre),
            "hectare" => Ok(Self::Hectare),
            "bigha" => Ok(Self::Bigha),
            other => Err(KisanError::Validation(format!("unknown land unit '{}'", other))),
        }
    }
}

/// Rejects sizes that are not positive finite numbers.
pub fn validate_land_size(land_size: f64) -> KisanResult<()> {
    if !land_size.is_finite() || land_size <= 0.0 {
        return Err(KisanError::Validation(format!(
            "land size must be a positive number, got {}",
            land_size
        )));
    }
    Ok(())
}

/// States and union territories offered as calculator regions
pub const INDIAN_REGIONS: [&str; 36] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
    "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tomato_json() -> serde_json::Value {
        json!({
            "howToGrow": "1. Prepare soil\n2. Sow seeds",
            "keyConsiderations": "- Soil: loam",
            "marketPriceIndia": "INR 20-40 per kg",
            "growthTime": "60-80 days",
            "estimatedCosts": {
                "seeds": "INR 3,000 per acre",
                "infrastructure": "INR 25,000 per acre",
                "other": "INR 15,000 per acre"
            },
            "postHarvest": "- Store at 12C",
            "cropPairings": ["Basil", "Marigold"],
            "highDemandRegions": "- Mumbai\n- Delhi"
        })
    }

    #[test]
    fn test_vegetable_info_parses_and_validates() {
        let info: VegetableInfo = serde_json::from_value(tomato_json()).unwrap();
        assert!(info.validate().is_ok());
        assert_eq!(info.crop_pairings, vec!["Basil", "Marigold"]);
        assert_eq!(info.estimated_costs.seeds, "INR 3,000 per acre");
    }

    #[test]
    fn test_vegetable_info_missing_field_fails_to_parse() {
        let mut value = tomato_json();
        value.as_object_mut().unwrap().remove("growthTime");
        assert!(serde_json::from_value::<VegetableInfo>(value).is_err());

        let mut value = tomato_json();
        value["estimatedCosts"].as_object_mut().unwrap().remove("other");
        assert!(serde_json::from_value::<VegetableInfo>(value).is_err());
    }

    #[test]
    fn test_vegetable_info_empty_cost_is_rejected() {
        let mut value = tomato_json();
        value["estimatedCosts"]["infrastructure"] = json!("  ");
        let info: VegetableInfo = serde_json::from_value(value).unwrap();
        let err = info.validate().unwrap_err();
        assert!(matches!(err, KisanError::MalformedResponse(msg) if msg.contains("infrastructure")));
    }

    #[test]
    fn test_calculator_result_allows_empty_crop_list() {
        let result: CalculatorResult = serde_json::from_value(json!({
            "potentialYield": "10-15 tonnes",
            "profitableCrops": []
        }))
        .unwrap();
        assert!(result.validate().is_ok());

        let blank = CalculatorResult {
            potential_yield: String::new(),
            profitable_crops: vec![],
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_land_unit_parsing() {
        assert_eq!("Hectare".parse::<LandUnit>().unwrap(), LandUnit::Hectare);
        assert_eq!(" bigha ".parse::<LandUnit>().unwrap(), LandUnit::Bigha);
        assert!("furlong".parse::<LandUnit>().is_err());
        assert_eq!(serde_json::to_value(LandUnit::Acre).unwrap(), json!("acre"));
        assert_eq!(LandUnit::Bigha.to_string(), "bigha");
    }

    #[test]
    fn test_land_size_validation() {
        assert!(validate_land_size(5.0).is_ok());
        assert!(validate_land_size(0.25).is_ok());
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_land_size(bad),
                Err(KisanError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_chat_message_wire_format() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "user", "text": "Hello"})
        );
        assert_eq!(ChatMessage::model("Namaste").role, ChatRole::Model);
    }

    #[test]
    fn test_region_list() {
        assert!(INDIAN_REGIONS.contains(&"Maharashtra"));
        assert_eq!(INDIAN_REGIONS[0], "Andhra Pradesh");
    }
}
