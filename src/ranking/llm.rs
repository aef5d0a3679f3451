use async_trait::async_trait;
use rapidfuzz::distance::jaro_winkler;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::Settings;
use crate::core::{CandidateRecord, MatchResult};
use crate::error::{MatchError, Result};
use crate::ranking::{RankRequest, Ranker};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Candidates sent to the model per request
pub const DEFAULT_MAX_CANDIDATES: usize = 20;

/// Policy characters quoted per candidate line
const POLICY_EXCERPT_CHARS: usize = 50;

/// Minimum Jaro-Winkler similarity to accept a model-returned name
const NAME_MATCH_THRESHOLD: f64 = 0.85;

fn system_prompt(top_n: usize) -> String {
    format!(
        "You are a political journalist. Pick the top-{} politicians closest to the user's positions and answer in JSON only.",
        top_n
    )
}

/// Ranker delegating the comparison to a chat-completion model
pub struct LlmRanker {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_candidates: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Shape the model is instructed to return
#[derive(Debug, Deserialize)]
struct RankReply {
    items: Vec<RankedItem>,
}

#[derive(Debug, Deserialize)]
struct RankedItem {
    name: String,
    score: f64,
    reason: String,
}

impl LlmRanker {
    /// Create new LLM ranker against the default endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(MatchError::HttpRequest)?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 400,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        })
    }

    /// Build from settings; requires an API key
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or_else(|| MatchError::Config("OPENAI_API_KEY is not set".to_string()))?;

        Ok(Self::new(api_key)?
            .with_base_url(settings.openai_base_url.clone())
            .with_model(settings.openai_model.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// User message: stance JSON, optional remarks, one line per candidate, reply format
    fn build_prompt(&self, request: &RankRequest<'_>, candidates: &[CandidateRecord]) -> Result<String> {
        let user_json = serde_json::to_string(request.user)?;

        let mut prompt = format!("[User stance]\n{}\n\n", user_json);

        if !request.comments.is_empty() {
            prompt.push_str("[User remarks]\n");
            for issue in request.issues.iter() {
                if let Some(text) = request.comments.get(&issue.key) {
                    prompt.push_str(&format!("{}: {}\n", issue.key, text));
                }
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!("[Candidates: {}]\n", candidates.len()));
        for candidate in candidates {
            let vector = serde_json::to_string(&candidate.stance)?;
            prompt.push_str(&format!(
                "{} {} : {}\n",
                candidate.display_name(),
                vector,
                candidate.policy_excerpt(POLICY_EXCERPT_CHARS)
            ));
        }

        prompt.push_str(&format!(
            "\nReturn the top {} as {{\"items\":[{{\"name\":\"...\",\"score\":0.85,\"reason\":\"one short sentence\"}}]}} only. \
             score is between 0 and 1.",
            request.top_n
        ));

        Ok(prompt)
    }

    /// Call the chat-completions endpoint and return the message content
    async fn complete(&self, system: &str, user_prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MatchError::LlmApi(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchError::LlmApi(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| MatchError::LlmApi(format!("Invalid JSON: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MatchError::MalformedReply("no message content".to_string()))
    }
}

/// Parse the model's content against the strict reply schema
fn parse_reply(content: &str) -> Result<Vec<RankedItem>> {
    let reply: RankReply = serde_json::from_str(content)
        .map_err(|e| MatchError::MalformedReply(e.to_string()))?;

    for item in &reply.items {
        if !item.score.is_finite() || !(0.0..=1.0).contains(&item.score) {
            return Err(MatchError::MalformedReply(format!(
                "score {} for '{}' is outside [0, 1]",
                item.score, item.name
            )));
        }
    }

    Ok(reply.items)
}

/// Find the candidate a model-returned name refers to
fn resolve<'a>(name: &str, candidates: &'a [CandidateRecord]) -> Option<&'a CandidateRecord> {
    let name = name.trim();
    if let Some(exact) = candidates.iter().find(|c| c.name == name) {
        return Some(exact);
    }

    let wanted = name.to_lowercase();
    candidates
        .iter()
        .map(|c| {
            let similarity = jaro_winkler::normalized_similarity(
                wanted.chars(),
                c.name.to_lowercase().chars(),
            );
            (c, similarity)
        })
        .filter(|(_, similarity)| *similarity >= NAME_MATCH_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, _)| c)
}

#[async_trait]
impl Ranker for LlmRanker {
    async fn rank(&self, request: RankRequest<'_>) -> Result<Vec<MatchResult>> {
        let limit = self.max_candidates.min(request.candidates.len());
        let candidates = &request.candidates[..limit];

        let prompt = self.build_prompt(&request, candidates)?;
        tracing::debug!("Sending {} candidates to {}", candidates.len(), self.model);

        let content = self.complete(&system_prompt(request.top_n), &prompt).await?;
        let items = parse_reply(&content)?;

        let mut seen = HashSet::new();
        let mut ranked = Vec::new();
        for item in items {
            let Some(candidate) = resolve(&item.name, candidates) else {
                tracing::warn!("Model returned unknown candidate '{}', dropping", item.name);
                continue;
            };
            if !seen.insert(candidate.name.clone()) {
                continue;
            }

            let score = (item.score * 100.0).round() as u8;
            ranked.push(
                MatchResult::new(candidate.clone(), score)
                    .with_raw(item.score)
                    .with_reason(item.reason),
            );
        }

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(request.top_n);

        Ok(ranked)
    }

    fn name(&self) -> &str {
        "llm"
    }

    fn candidate_limit(&self) -> Option<usize> {
        Some(self.max_candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IssueSet, StanceVector};
    use std::collections::BTreeMap;

    fn candidates() -> Vec<CandidateRecord> {
        vec![
            CandidateRecord::new("Yamada Taro", "Blue", "Lower taxes", StanceVector::new()),
            CandidateRecord::new("Suzuki Hanako", "Red", "More childcare", StanceVector::new()),
        ]
    }

    #[test]
    fn test_parse_reply_strict() {
        let ok = parse_reply(r#"{"items":[{"name":"A","score":0.5,"reason":"close"}]}"#).unwrap();
        assert_eq!(ok.len(), 1);

        assert!(matches!(parse_reply("not json"), Err(MatchError::MalformedReply(_))));
        assert!(matches!(parse_reply(r#"{"results":[]}"#), Err(MatchError::MalformedReply(_))));
        assert!(matches!(
            parse_reply(r#"{"items":[{"name":"A","score":"high","reason":""}]}"#),
            Err(MatchError::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"items":[{"name":"A","score":1.7,"reason":""}]}"#),
            Err(MatchError::MalformedReply(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"items":[{"name":"A","score":0.2}]}"#),
            Err(MatchError::MalformedReply(_))
        ));
    }

    #[test]
    fn test_resolve_exact_and_fuzzy() {
        let candidates = candidates();
        assert_eq!(resolve("Yamada Taro", &candidates).map(|c| c.party.as_str()), Some("Blue"));
        assert_eq!(resolve(" suzuki hanako ", &candidates).map(|c| c.party.as_str()), Some("Red"));
        assert!(resolve("Nobody Atall", &candidates).is_none());
    }

    #[test]
    fn test_prompt_contents() {
        let ranker = LlmRanker::new("key").unwrap();
        let issues = IssueSet::standard();
        let user = StanceVector::from_pairs(issues.keys().map(|k| (k, 1.0))).unwrap();
        let mut comments = BTreeMap::new();
        comments.insert("carbon_tax".to_string(), "only if dividends are paid".to_string());
        let candidates = candidates();

        let request = RankRequest {
            user: &user,
            issues: &issues,
            candidates: &candidates,
            top_n: 5,
            comments: &comments,
        };
        let prompt = ranker.build_prompt(&request, &candidates).unwrap();

        assert!(prompt.contains("\"tax_raise\":1.0"));
        assert!(prompt.contains("carbon_tax: only if dividends are paid"));
        assert!(prompt.contains("Yamada Taro (Blue) {} : Lower taxes…"));
        assert!(prompt.contains("Return the top 5"));
    }

    #[test]
    fn test_system_prompt_names_count() {
        assert!(system_prompt(3).contains("Pick the top-3 politicians"));
        assert!(system_prompt(10).contains("top-10"));
    }

    #[test]
    fn test_candidate_limit() {
        let ranker = LlmRanker::new("key").unwrap();
        assert_eq!(ranker.candidate_limit(), Some(DEFAULT_MAX_CANDIDATES));
        assert_eq!(ranker.with_max_candidates(2).candidate_limit(), Some(2));
    }
}
