//! Best-effort ticket advisor backed by an OpenAI-compatible chat endpoint.
//!
//! Every public operation degrades to the deterministic rules in
//! [`fallback`] on any internal failure — a missing credential, a timeout,
//! or an answer outside the valid sets. Nothing here ever fails a request.

pub mod fallback;

use std::time::Duration;

use anyhow::{Result, anyhow};
use campus_types::api::Suggestion;
use campus_types::models::Priority;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Unset or "placeholder" disables the remote backend entirely.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct Advisor {
    client: Client,
    config: AdvisorConfig,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn disabled() -> Self {
        Self::new(AdvisorConfig::default())
    }

    fn enabled(&self) -> bool {
        matches!(self.config.api_key.as_deref(), Some(key) if !key.is_empty() && key != "placeholder")
    }

    /// Priority guess for a ticket, High/Medium/Low.
    pub async fn suggest_priority(&self, title: &str, description: &str) -> Priority {
        let rule = fallback::priority_rule(title, description);
        if !self.enabled() {
            return rule;
        }

        let prompt = format!(
            "Aşağıdaki ticket başlığını ve açıklamasını incele ve sadece bir kelime ile \
             önceliği ver: High, Medium veya Low.\n\nBaşlık: {}\nAçıklama: {}",
            title, description
        );

        match self.chat(&prompt, 5, 0.0).await {
            Ok(answer) => {
                let answer = answer.trim();
                match answer.parse::<Priority>() {
                    Ok(p) => {
                        info!("AI suggest_priority success: {}", p);
                        p
                    }
                    Err(_) => {
                        warn!("AI suggest_priority returned '{}', using rule", answer);
                        rule
                    }
                }
            }
            Err(e) => {
                warn!("AI suggest_priority failed: {:#}", e);
                rule
            }
        }
    }

    /// Department guess, always one of `departments`. None only when no
    /// departments are configured.
    pub async fn categorize(
        &self,
        title: &str,
        description: &str,
        departments: &[String],
    ) -> Option<String> {
        let first = departments.first()?.clone();
        if !self.enabled() {
            return Some(first);
        }

        let prompt = format!(
            "Asagidaki ticket basligini ve aciklamasini analiz et. Ticket'in ait \
             olabilecegi departmanlar: {}. Sadece ve sadece bu departmanlardan birinin \
             adini dondur. Baska hicbir metin, aciklama veya ekleme yapma.\n\n\
             Baslik: {}\nAciklama: {}",
            departments.join(", "),
            title,
            description
        );

        match self.chat(&prompt, 20, 0.0).await {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                if departments.contains(&answer) {
                    info!("AI categorize success: {}", answer);
                    Some(answer)
                } else {
                    warn!("AI categorize returned unknown department '{}'", answer);
                    Some(first)
                }
            }
            Err(e) => {
                warn!("AI categorize failed: {:#}", e);
                Some(first)
            }
        }
    }

    /// Full suggestion bundle for ticket creation: title backfill, ordered
    /// department and priority options, and an explanation.
    pub async fn suggest(
        &self,
        title: Option<&str>,
        description: &str,
        departments: &[String],
    ) -> Suggestion {
        let title_str = title.unwrap_or("");
        let top_department = self.categorize(title_str, description, departments).await;
        let top_priority = self.suggest_priority(title_str, description).await;

        let mut suggestion = Suggestion {
            suggested_title: fallback::fallback_title(title, description),
            department_options: fallback::department_options(top_department.as_deref(), departments),
            priority_options: fallback::priority_options(top_priority),
            explanation: fallback::EXPLANATION.to_string(),
        };

        if !self.enabled() {
            return suggestion;
        }

        let prompt = format!(
            "Aşağıdaki ticket açıklamasını kullanarak JSON formatında öneriler oluştur.\n\
             JSON şu formatta olmalı: {{\"suggested_title\": string, \
             \"department_options\": [\"Dep1\",\"Dep2\"], \
             \"priority_options\": [\"High\",\"Medium\"], \"explanation\": string}}\n\
             Departman listesi: {}\n\nBaşlık: {}\nAçıklama: {}\n\
             Sadece geçerli JSON çıktısı ver, ekstra metin çıkışına izin verme.\n",
            departments.join(", "),
            title_str,
            description
        );

        match self.chat(&prompt, 200, 0.1).await {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(parsed) => {
                    info!("AI suggest success");
                    merge_suggestion(&mut suggestion, &parsed, departments);
                    suggestion
                }
                Err(_) => {
                    warn!("AI suggest returned non-JSON, using fallback");
                    suggestion
                }
            },
            Err(e) => {
                warn!("AI suggest failed: {:#}", e);
                suggestion
            }
        }
    }

    /// Short summary of a ticket, truncation fallback.
    pub async fn summarize(&self, title: &str, description: &str) -> String {
        let snippet = fallback::snippet(title, description);
        if !self.enabled() {
            return snippet;
        }

        let prompt = format!(
            "Aşağıdaki ticket başlığı ve açıklamasını kısa ve net bir şekilde Türkçe \
             olarak 1-2 cümleyle özetle. Sadece özeti döndür.\n\n\
             Başlık: {}\nAçıklama: {}",
            title, description
        );

        match self.chat(&prompt, 80, 0.2).await {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) => snippet,
            Err(e) => {
                warn!("AI summarize failed: {:#}", e);
                snippet
            }
        }
    }

    /// Reply draft for support staff, template fallback.
    pub async fn draft_response(&self, title: &str, description: &str) -> String {
        let template = fallback::reply_template(title, description);
        if !self.enabled() {
            info!("AI draft_response skipped, no API key configured");
            return template;
        }

        let prompt = format!(
            "Sen bir teknik destek temsilcisisin. Aşağıdaki ticket açıklamasına göre \
             kullanıcının anlayacağı, nazik ve çözüm odaklı bir cevap taslağı oluştur. \
             Cevap Türkçe, kısa ve net olsun; gerekli aksiyonları belirt.\n\n\
             Başlık: {}\nAçıklama: {}",
            title, description
        );

        match self.chat(&prompt, 250, 0.3).await {
            Ok(draft) if !draft.trim().is_empty() => draft.trim().to_string(),
            Ok(_) => template,
            Err(e) => {
                warn!("AI draft_response failed: {:#}", e);
                template
            }
        }
    }

    async fn chat(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("advisor backend not configured"))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .timeout(self.config.timeout)
            .json(&serde_json::json!({
                "model": self.config.model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": max_tokens,
                "temperature": temperature,
            }))
            .send()
            .await?
            .error_for_status()?;

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("chat response missing content"))?
            .to_string();

        Ok(content)
    }
}

/// Fold validated fields of a model-produced JSON object into the fallback
/// suggestion. Unknown departments and priorities are dropped; an empty
/// validated list keeps the fallback ordering.
fn merge_suggestion(suggestion: &mut Suggestion, parsed: &Value, departments: &[String]) {
    if let Some(title) = parsed["suggested_title"].as_str() {
        if !title.trim().is_empty() {
            suggestion.suggested_title = Some(title.trim().to_string());
        }
    }

    if let Some(options) = parsed["department_options"].as_array() {
        let valid: Vec<String> = options
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|d| departments.iter().any(|known| known == d))
            .map(|d| d.to_string())
            .collect();
        if !valid.is_empty() {
            suggestion.department_options = valid;
        }
    }

    if let Some(options) = parsed["priority_options"].as_array() {
        let valid: Vec<Priority> = options
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(|p| p.parse().ok())
            .collect();
        if !valid.is_empty() {
            suggestion.priority_options = valid;
        }
    }

    if let Some(explanation) = parsed["explanation"].as_str() {
        if !explanation.trim().is_empty() {
            suggestion.explanation = explanation.trim().to_string();
        }
    }
}
