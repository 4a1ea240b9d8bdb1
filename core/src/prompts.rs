use crate::models::LandUnit;

/// Persona for the conversational assistant
pub const KISAN_MITRA_INSTRUCTION: &str = "You are Kissan Mitra, a friendly and helpful farming \
expert. Your goal is to provide practical advice about exotic farming to farmers. You must \
automatically detect and respond in the user's language, supporting Hindi, English, and Marathi. \
Keep your responses concise and easy to understand.";

pub fn vegetable_info_prompt(vegetable_name: &str, region_context: &str) -> String {
    format!(
        "Provide a comprehensive farming guide for {name} in {region}. The response must be a \
         JSON object that conforms to the provided schema. Ensure the text for 'howToGrow', \
         'keyConsiderations', 'postHarvest', and 'highDemandRegions' is well-formatted for \
         readability using numbered or bulleted lists as specified in the schema. Ensure all \
         information is practical and relevant for farmers in {region}.",
        name = vegetable_name,
        region = region_context,
    )
}

pub fn calculation_prompt(
    vegetable_name: &str,
    land_size: f64,
    land_unit: LandUnit,
    region: &str,
    region_context: &str,
) -> String {
    format!(
        "Analyze the potential for growing {name} on a {size} {unit} plot of land in the \
         {region} region of {country}. Also, suggest up to 3 more profitable alternative crops \
         for this specific region and land size. The response must be a JSON object that \
         conforms to the provided schema. Provide the potential yield for {name} and for each \
         alternative crop, list its name and the reason it's a good choice.",
        name = vegetable_name,
        size = land_size,
        unit = land_unit,
        region = region,
        country = region_context,
    )
}
