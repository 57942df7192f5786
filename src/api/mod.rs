use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body returned by `POST /chat`.
///
/// The server reports failures as `{"error": "..."}`, usually alongside a
/// non-2xx status, so the error shape is tried first.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatResponse {
    Failure {
        error: String,
    },
    Reply {
        response: String,
        /// `"success"` or `"warning"`; the latter marks off-topic questions.
        #[serde(rename = "type", default)]
        tone: Option<String>,
    },
}

impl ChatResponse {
    pub fn is_warning(&self) -> bool {
        matches!(self, ChatResponse::Reply { tone: Some(tone), .. } if tone.eq_ignore_ascii_case("warning"))
    }
}

/// Body returned by `POST /predict`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum IdentifyResponse {
    Failure { error: String },
    Identified(Identification),
}

/// A recognized plant as reported by the identification service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Identification {
    #[serde(alias = "plant")]
    pub plant_name: String,
    pub scientific_name: Option<String>,
    /// Either a fraction in `0.0..=1.0` or a percentage, depending on which
    /// model answered. Use [`Identification::confidence_percent`] to display it.
    pub confidence: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "care_tips_from_wire")]
    pub care_tips: Vec<String>,
    pub wiki_url: Option<String>,
    pub family: Option<String>,
    pub region: Option<String>,
    pub toxicity: Option<u32>,
    pub edible: Option<bool>,
    #[serde(default)]
    pub diseases: Vec<String>,
    #[serde(default)]
    pub common_names: Vec<String>,
    pub source: Option<String>,
}

impl Identification {
    /// Confidence on a 0-100 scale. Values up to 1.0 are read as fractions.
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| if value <= 1.0 { value * 100.0 } else { value })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CareTipsWire {
    List(Vec<String>),
    Single(String),
}

// Older servers send a single sentence instead of a list.
fn care_tips_from_wire<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tips = match Option::<CareTipsWire>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(CareTipsWire::List(tips)) => tips,
        Some(CareTipsWire::Single(tip)) if tip.trim().is_empty() => Vec::new(),
        Some(CareTipsWire::Single(tip)) => vec![tip],
    };
    Ok(tips)
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Option<String>,
}
