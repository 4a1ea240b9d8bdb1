use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::config::KisanConfig;
use crate::errors::{KisanError, KisanResult};
use crate::models::Validate;
use crate::schema::Schema;
use crate::types::*;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini API client
    pub fn new(config: &KisanConfig) -> KisanResult<Self> {
        let api_key = config.require_api_key()?.to_string();

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                KisanError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            model_name: config.model_name().to_string(),
            base_url: config.api_base_url().to_string(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> KisanResult<GenerateContentResponse> {
        let url = self.generate_url();
        debug!(model = %self.model_name, turns = request.contents.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                KisanError::Upstream(format!("Failed to send request: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.map_err(|e| {
                KisanError::Upstream(format!(
                    "Failed to read error response: {}",
                    e.without_url()
                ))
            })?;

            error!(status = status.as_u16(), body = %error_body, "Gemini API request failed");
            return Err(KisanError::HttpStatus {
                status_code: status.as_u16(),
                message: format!("API request failed: {}", error_body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| {
                KisanError::Upstream(format!("Failed to read response: {}", e.without_url()))
            })?;

        serde_json::from_str::<GenerateContentResponse>(&body).map_err(|e| {
            KisanError::MalformedResponse(format!("Failed to parse response envelope: {}", e))
        })
    }

    /// Text of the first candidate, with all of its text parts concatenated
    pub fn extract_text(response: &GenerateContentResponse) -> KisanResult<String> {
        let candidate = response.candidates.first().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone())
                .unwrap_or_else(|| "none given".to_string());
            KisanError::MalformedResponse(format!(
                "No candidates in response (block reason: {})",
                reason
            ))
        })?;

        let content = candidate.content.as_ref().ok_or_else(|| {
            KisanError::MalformedResponse(format!(
                "No content in candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(KisanError::MalformedResponse(
                "No text in candidate parts".to_string(),
            ));
        }

        Ok(text)
    }

    /// Send a request and return the reply text
    pub async fn generate_text(&self, request: &GenerateContentRequest) -> KisanResult<String> {
        let response = self.generate_content(request).await?;
        Self::extract_text(&response)
    }

    /// One-shot query whose reply is constrained to `schema` and parsed into `T`
    pub async fn generate_structured<T>(&self, prompt: &str, schema: Schema) -> KisanResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        let request = GenerateContentRequest::from_prompt(prompt).with_response_schema(schema);
        let text = self.generate_text(&request).await?;
        parse_structured(&text)
    }
}

/// Parse model output that is supposed to be a JSON document of type `T`.
///
/// Tolerates surrounding whitespace and a Markdown code fence; anything else
/// that does not deserialize, or fails `Validate`, is a malformed response.
pub fn parse_structured<T>(text: &str) -> KisanResult<T>
where
    T: DeserializeOwned + Validate,
{
    let json = strip_code_fence(text.trim());

    let value: T = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, payload_len = text.len(), "Structured reply did not match schema");
        KisanError::MalformedResponse(format!("Failed to parse structured reply: {}", e))
    })?;

    value.validate()?;
    Ok(value)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => {
            let body = body.trim();
            body.strip_prefix("json")
                .or_else(|| body.strip_prefix("JSON"))
                .unwrap_or(body)
                .trim()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalculatorResult;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = KisanConfig {
            api_key: Some("test-key".to_string()),
            api_base_url: Some(server.uri()),
            ..KisanConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
    }

    #[test]
    fn test_new_requires_api_key() {
        let err = GeminiClient::new(&KisanConfig::default()).unwrap_err();
        assert!(matches!(err, KisanError::Configuration(_)));
    }

    #[test]
    fn test_parse_structured_variants() {
        let plain = r#"{"potentialYield": "12 t", "profitableCrops": []}"#;
        let fenced = format!("```json\n{}\n```", plain);

        let a: CalculatorResult = parse_structured(plain).unwrap();
        let b: CalculatorResult = parse_structured(&format!("  {}\n", plain)).unwrap();
        let c: CalculatorResult = parse_structured(&fenced).unwrap();
        let d: CalculatorResult = parse_structured(&format!("```json{}```", plain)).unwrap();
        let e: CalculatorResult = parse_structured(&format!("```{}```", plain)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
        assert_eq!(a, e);

        let truncated = r#"{"potentialYield": "12 t", "profitableCr"#;
        assert!(matches!(
            parse_structured::<CalculatorResult>(truncated),
            Err(KisanError::MalformedResponse(_))
        ));

        let prose = format!("Here is your answer: {}", plain);
        assert!(matches!(
            parse_structured::<CalculatorResult>(&prose),
            Err(KisanError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Nam"}, {"text": "aste"}]}}]
        }))
        .unwrap();
        assert_eq!(GeminiClient::extract_text(&response).unwrap(), "Namaste");

        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = GeminiClient::extract_text(&blocked).unwrap_err();
        assert!(matches!(err, KisanError::MalformedResponse(msg) if msg.contains("SAFETY")));
    }

    #[tokio::test]
    async fn test_generate_structured_sends_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(
                r#"{"potentialYield": "10-15 tonnes", "profitableCrops": [{"name": "Okra", "reason": "Short cycle"}]}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: CalculatorResult = client
            .generate_structured("prompt", crate::schema::calculator_schema())
            .await
            .unwrap();
        assert_eq!(result.potential_yield, "10-15 tonnes");
        assert_eq!(result.profitable_crops[0].name, "Okra");
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .generate_text(&GenerateContentRequest::from_prompt("hi"))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert!(
            matches!(err, KisanError::HttpStatus { status_code: 429, ref message } if message.contains("quota"))
        );
    }

    #[tokio::test]
    async fn test_garbage_envelope_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .generate_text(&GenerateContentRequest::from_prompt("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, KisanError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_upstream() {
        let config = KisanConfig {
            api_key: Some("test-key".to_string()),
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            ..KisanConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let err = client
            .generate_text(&GenerateContentRequest::from_prompt("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, KisanError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let config = KisanConfig {
            api_key: Some("SECRET-KEY-123".to_string()),
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            ..KisanConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        let err = client
            .generate_text(&GenerateContentRequest::from_prompt("hi"))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn test_api_key_travels_in_header_not_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .generate_text(&GenerateContentRequest::from_prompt("hi"))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests[0].url.query().is_none());
    }
}
