//! OpenRouter remote reasoning client.
//!
//! Used by the classification cascade (tier 1) and the optional summary
//! polish. Both calls return `None` on any failure (no credential, network
//! error, non-success status, malformed content) by contract; the caller
//! falls through to its next tier.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use clipsight_models::{Classification, ContentType, FrameDetections, Highlight, VideoMetadata};

use crate::config::LlmConfig;

const CLASSIFY_SYSTEM_PROMPT: &str = "You are a gameplay content classifier. Return JSON strictly in this shape:\n\
{\"type\": \"gameplay|tutorial|vlog|non-game|unknown\", \"confidence\": number, \"reasons\": string[], \"platform\": \"mobile|pc|console|unknown\"}\n\
- Use detections (object names) and metadata to infer if the clip shows gameplay.\n\
- Platform heuristic: keyboard/mouse/laptop => pc; cell phone => mobile; tv/console UI => console.\n\
- Be conservative: if unclear, choose \"unknown\" with lower confidence.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a gameplay analysis assistant. Respond concisely in JSON: {\"summary\": string, \"tips\": string[]}.\n\
- Write a one-paragraph narrative summary of the clip: what it shows and key moments.\n\
- Provide 3-5 coaching tips tailored to FPS fundamentals (aim, movement, positioning, decision-making).\n\
- If headshot rate seems high for a human (>=25%), avoid accusations; use neutral language and suggest verifying settings and practicing consistency.";

/// Compact detection signal handed to the remote classifier.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionSummary {
    pub frames_count: usize,
    /// Lowercased label -> number of frames-with-detections containing it
    pub object_counts: BTreeMap<String, usize>,
}

impl DetectionSummary {
    /// Reduce per-frame detections to counts the model can reason on.
    pub fn from_detections(detections: &[FrameDetections]) -> Self {
        let mut object_counts: BTreeMap<String, usize> = BTreeMap::new();
        for frame in detections {
            for object in &frame.objects {
                *object_counts
                    .entry(object.label.to_ascii_lowercase())
                    .or_default() += 1;
            }
        }
        Self {
            frames_count: detections.len(),
            object_counts,
        }
    }

    fn sample_objects(&self) -> Vec<&str> {
        self.object_counts.keys().take(12).map(|s| s.as_str()).collect()
    }
}

/// Gaming platform hint from the remote classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mobile,
    Pc,
    Console,
    Unknown,
}

impl Platform {
    fn from_label(label: &str) -> Self {
        match label {
            "mobile" => Self::Mobile,
            "pc" => Self::Pc,
            "console" => Self::Console,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Pc => "pc",
            Self::Console => "console",
            Self::Unknown => "unknown",
        }
    }
}

/// Parsed remote classification verdict.
#[derive(Debug, Clone)]
pub struct RemoteClassification {
    pub classification: Classification,
    pub platform: Platform,
}

/// Parsed remote summary polish.
#[derive(Debug, Clone)]
pub struct LlmPolish {
    pub summary: Option<String>,
    pub tips: Option<Vec<String>>,
}

/// Everything the summary polish call gets to see.
#[derive(Debug, Clone)]
pub struct SummaryRequest<'a> {
    pub classification: &'a Classification,
    pub metadata: &'a VideoMetadata,
    pub highlights: &'a [Highlight],
    pub headshot_rate: f64,
    pub base_summary: &'a str,
}

/// OpenRouter chat completions client.
#[derive(Debug, Clone)]
pub struct LlmClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Lenient shapes: models drift from the requested schema, so every field
/// is optional and non-string entries are filtered rather than rejected.
#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(rename = "type")]
    content_type: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    reasons: Vec<serde_json::Value>,
    platform: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPolish {
    summary: Option<serde_json::Value>,
    #[serde(default)]
    tips: Vec<serde_json::Value>,
}

impl LlmClient {
    /// Build a client from config; `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    /// Classify content remotely from aggregated detection statistics.
    ///
    /// Returns `None` on any failure, including a response without a
    /// usable `type` field.
    pub async fn classify(
        &self,
        summary: &DetectionSummary,
        metadata: &VideoMetadata,
    ) -> Option<RemoteClassification> {
        let payload = json!({
            "framesCount": summary.frames_count,
            "metadata": metadata,
            "objectCounts": summary.object_counts,
            "sampleObjects": summary.sample_objects(),
        });

        let content = self
            .chat(CLASSIFY_SYSTEM_PROMPT, &payload.to_string(), 0.1)
            .await?;
        let raw: RawClassification = serde_json::from_str(extract_json_object(&content)?)
            .map_err(|e| debug!(error = %e, "Unparsable remote classification"))
            .ok()?;

        // A response without a type field is a failed tier, not "unknown"
        let type_label = raw.content_type?;

        let reasons = raw
            .reasons
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        Some(RemoteClassification {
            classification: Classification::new(
                ContentType::from_label(&type_label),
                raw.confidence.unwrap_or(0.5),
                reasons,
            ),
            platform: raw
                .platform
                .as_deref()
                .map(Platform::from_label)
                .unwrap_or(Platform::Unknown),
        })
    }

    /// Ask for a polished narrative and extra coaching tips.
    pub async fn refine_summary(&self, request: &SummaryRequest<'_>) -> Option<LlmPolish> {
        let payload = json!({
            "classification": request.classification,
            "metadata": request.metadata,
            "highlights": request.highlights,
            "headshotRate": request.headshot_rate,
            "baseSummary": request.base_summary,
        });

        let content = self
            .chat(SUMMARY_SYSTEM_PROMPT, &payload.to_string(), 0.2)
            .await?;
        let raw: RawPolish = serde_json::from_str(extract_json_object(&content)?)
            .map_err(|e| debug!(error = %e, "Unparsable remote summary"))
            .ok()?;

        let tips: Vec<String> = raw
            .tips
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        Some(LlmPolish {
            summary: raw.summary.and_then(|v| v.as_str().map(str::to_string)),
            tips: (!tips.is_empty()).then_some(tips),
        })
    }

    /// One chat round-trip; `None` on any transport or shape failure.
    async fn chat(&self, system: &str, data: &str, temperature: f64) -> Option<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("DATA:\n{data}"),
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| warn!(error = %e, "Remote reasoning request failed"))
            .ok()?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Remote reasoning returned error status");
            return None;
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| warn!(error = %e, "Unparsable remote reasoning response"))
            .ok()?;

        parsed.choices.into_iter().next()?.message.content
    }
}

/// Slice the first JSON object out of model output, tolerating prose or
/// markdown fences around it.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end >= start).then(|| &content[start..=end])
}
