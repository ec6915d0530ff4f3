//! HPI (History of Present Illness) drafting.
//!
//! `/generate-hpi` turns the assistant form into a prompt and hands it to an engine:
//!
//! - [`HpiEngine::Template`] assembles a deterministic draft straight from the fields. It
//!   exists so the assistant works end to end without any model configured.
//! - [`HpiEngine::Remote`] posts the prompt to an OpenAI-compatible chat-completion endpoint
//!   and returns the first choice unchanged.
//!
//! Prompt wording and the draft layout are fixed strings; nothing here interprets clinical
//! content.

use crate::config::{CoreConfig, HpiEngineConfig};
use crate::constants::NO_PMH_MARKERS;
use crate::{CoreError, CoreResult};
use api_shared::{HpiReq, HpiRes};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_MESSAGE: &str = "You are a medical scribe assistant writing the History of Present \
Illness for an adult emergency department note. Follow the sample's format, syntax and style. \
Use 24-hour times. When a fever temperature is given, write it as (Tmax = <value>). Keep NBNB as \
written when it describes vomiting. Correct grammar, spelling and terminology, and prefer \
sentence starters such as 'Patient reports that', 'States that' or 'Endorses' over 'The patient \
states that'. After the HPI, list 4-5 emergency medicine differential diagnoses by title only, \
optionally prefixed with 'Also consider', 'Doubt' or 'Considered but ruled out'.";

const USER_INSTRUCTIONS: &str = "Write the HPI in the same syntax as the sample. Begin with \
'with no significant past medical history' when the past medical history is empty or none, \
otherwise with 'with a past medical history of <pertinent PMH>'.\n\n\
Sample input:\n\
1. Gender: male\n\
2. Past medical history: hypertension, hyperlipidemia, CKD stage III, afib\n\
3. Chief complaint: generalized weakness\n\
4. Onset/timing: for the past week but worse since last night\n\
5. Accompanied by: wife\n\
6. Additional symptoms: fever, chills, mild itchy rash to the left elbow\n\
7. Context: wife noticed he has been more fatigued and lethargic over the past week, worse since last night\n\
8. Denies: nausea, vomiting, diarrhea, urinary symptoms\n\
9. Currently on eliquis\n\n\
Sample output:\n\
\"with a past medical history of hypertension, hyperlipidemia, and chronic kidney disease stage \
III who presents to the Emergency Department complaining of one week of generalized weakness, \
worse since yesterday evening. Per wife, who is providing additional history at bedside, he has \
been more fatigued and lethargic over the past week and worse since last night. Patient reports \
subjective fevers, chills, and a mild itchy rash to the left elbow. He denies nausea, vomiting, \
diarrhea, or urinary symptoms. Patient is currently taking Eliquis.\n\n\
Differential diagnoses includes:\n\
- Sepsis\n\
- Anemia\n\
- Adverse drug reaction\n\
- Viral syndrome\"\n\n\
--- Now, generate an HPI for the following patient ---\n";

/// System and user messages sent to a chat model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HpiPrompt {
    pub system: String,
    pub user: String,
}

impl HpiPrompt {
    pub fn build(req: &HpiReq) -> Self {
        let pmh = req.past_medical_history.trim();
        let patient = format!(
            "1. Gender: {}\n\
             2. Past medical history: {}\n\
             3. Chief complaint: {}\n\
             4. Onset/timing: {}\n\
             5. Accompanied by/history by: {}\n\
             6. Other symptoms: {}\n\
             7. Context: {}\n\
             8. Pertinent negatives: {}\n\
             9. Current medications: {}\n",
            req.gender,
            if pmh.is_empty() { "None" } else { pmh },
            req.chief_complaint,
            req.onset_timing,
            req.accompanied_by,
            req.additional_symptoms,
            req.other_notes,
            req.pertinent_negatives,
            req.current_medications,
        );

        Self {
            system: SYSTEM_MESSAGE.to_string(),
            user: format!("{USER_INSTRUCTIONS}{patient}"),
        }
    }

    /// Both messages as one block, for debugging output.
    pub fn transcript(&self) -> String {
        format!("System Message: {}\n\nUser Message:\n{}", self.system, self.user)
    }
}

/// Whether the past medical history says anything beyond "none".
pub fn has_meaningful_pmh(pmh: &str) -> bool {
    let pmh = pmh.trim().to_lowercase();
    !NO_PMH_MARKERS.contains(&pmh.as_str())
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Deterministic draft built from the form fields.
pub fn template_draft(req: &HpiReq) -> String {
    let pmh = req.past_medical_history.trim();
    let intro = if has_meaningful_pmh(pmh) {
        format!("with a past medical history of {pmh}")
    } else {
        "with no significant past medical history".to_string()
    };

    format!(
        "{intro} who presents to the ED complaining of {}. \
         The symptoms reportedly started {}. \
         Additional history provided by {}. \
         Patient endorses other symptoms including: {}. \
         Context: {}. \
         Patient denies {}. \
         Current medications include: {}.\n\n\
         Differential diagnoses includes:\n\
         - Diagnosis 1: Based on chief complaint and onset.\n\
         - Diagnosis 2: Considering other symptoms noted.\n\
         - Diagnosis 3: Contextual factors may suggest this.\n\
         - Diagnosis 4: Pertinent negatives might point away from alternatives, making this more likely.",
        req.chief_complaint.trim(),
        req.onset_timing.trim(),
        or_default(&req.accompanied_by, "patient"),
        req.additional_symptoms.trim(),
        req.other_notes.trim(),
        or_default(&req.pertinent_negatives, "any other acute complaints"),
        or_default(&req.current_medications, "none stated"),
    )
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone, Debug)]
pub struct RemoteEngine {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl RemoteEngine {
    pub fn new(
        endpoint: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> CoreResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    async fn complete(&self, prompt: &HpiPrompt) -> CoreResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::HpiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(CoreError::HpiEmptyResponse)
    }
}

#[derive(Clone, Debug)]
pub enum HpiEngine {
    Template,
    Remote(RemoteEngine),
}

impl HpiEngine {
    pub fn from_config(cfg: &HpiEngineConfig) -> CoreResult<Self> {
        match cfg {
            HpiEngineConfig::Template => Ok(Self::Template),
            HpiEngineConfig::Remote {
                endpoint,
                model,
                api_key,
                timeout,
            } => Ok(Self::Remote(RemoteEngine::new(
                endpoint.clone(),
                model.clone(),
                api_key.clone(),
                *timeout,
            )?)),
        }
    }

    pub async fn generate(&self, req: &HpiReq, prompt: &HpiPrompt) -> CoreResult<String> {
        match self {
            Self::Template => Ok(template_draft(req)),
            Self::Remote(remote) => remote.complete(prompt).await,
        }
    }
}

/// Builds the prompt, runs the engine and shapes the response.
#[derive(Clone, Debug)]
pub struct HpiService {
    engine: HpiEngine,
    debug_prompt: bool,
}

impl HpiService {
    pub fn new(engine: HpiEngine, debug_prompt: bool) -> Self {
        Self {
            engine,
            debug_prompt,
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> CoreResult<Self> {
        Ok(Self::new(
            HpiEngine::from_config(cfg.hpi_engine())?,
            cfg.hpi_debug_prompt(),
        ))
    }

    pub async fn generate(&self, req: &HpiReq) -> CoreResult<HpiRes> {
        let prompt = HpiPrompt::build(req);
        let generated_hpi = self.engine.generate(req, &prompt).await?;
        Ok(HpiRes {
            generated_hpi,
            debug_prompt: self.debug_prompt.then(|| prompt.transcript()),
        })
    }
}
