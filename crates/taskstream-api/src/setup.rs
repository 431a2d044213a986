use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use taskstream_core::SessionId;

use crate::client::{segment, ApiClient};
use crate::error::ApiError;
use crate::types::{
    ClarificationForm, ClarificationStatus, FormEnvelope, GeneratedGoals, Kpi, QuestionBlock,
    UploadFile,
};

/// Flatten answered question blocks into the `question -> answer` map the
/// clarify endpoint expects. Unanswered questions map to an empty string.
pub fn clarifications(blocks: &[QuestionBlock]) -> BTreeMap<String, String> {
    blocks
        .iter()
        .flat_map(|block| {
            block.questions.iter().enumerate().map(|(i, question)| {
                let answer = block.answers.get(i).cloned().unwrap_or_default();
                (question.clone(), answer)
            })
        })
        .collect()
}

impl ApiClient {
    /// Upload data files into a freshly started session. The backend answers
    /// with the clarification questions it has about the data, if any.
    #[instrument(skip(self, files), fields(session = %session, files = files.len()))]
    pub async fn upload_session_data(
        &self,
        session: &SessionId,
        files: Vec<UploadFile>,
    ) -> Result<Vec<QuestionBlock>, ApiError> {
        let mut form = Form::new();
        for file in files {
            form = form.part("files", Part::bytes(file.bytes).file_name(file.name));
        }
        let form = form.text("data_sources", json!({ "sources": [] }).to_string());

        let path = format!("/session/files/{}", segment(session.as_str()));
        let envelope: FormEnvelope = self
            .send_json(self.request(Method::POST, &path).multipart(form))
            .await?;
        let questions = envelope.form.map(|f| f.questions).unwrap_or_default();
        debug!(questions = questions.len(), "session data uploaded");
        Ok(questions)
    }

    /// Whether the clarification form of `session` has been answered.
    #[instrument(skip(self), fields(session = %session))]
    pub async fn clarification_submitted(&self, session: &SessionId) -> Result<bool, ApiError> {
        let path = format!("/session/{}/clarification_status", segment(session.as_str()));
        let status: ClarificationStatus = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(status.submitted)
    }

    #[instrument(skip(self), fields(session = %session))]
    pub async fn clarification_form(
        &self,
        session: &SessionId,
    ) -> Result<Vec<QuestionBlock>, ApiError> {
        let path = format!("/session/{}/form", segment(session.as_str()));
        let envelope: FormEnvelope = self.send_json(self.request(Method::GET, &path)).await?;
        Ok(envelope
            .form
            .map(|ClarificationForm { questions }| questions)
            .unwrap_or_default())
    }

    /// Submit answers to the clarification questions.
    #[instrument(skip(self, answers), fields(session = %session, answers = answers.len()))]
    pub async fn clarify_session(
        &self,
        session: &SessionId,
        answers: &BTreeMap<String, String>,
    ) -> Result<(), ApiError> {
        let path = format!("/session/clarify/{}", segment(session.as_str()));
        let req = self
            .request(Method::POST, &path)
            .json(&json!({ "clarifications": answers }));
        self.send_unit(req).await
    }

    /// Turn a free-form analysis goal into concrete KPIs.
    #[instrument(skip(self, goal), fields(session = %session))]
    pub async fn generate_goals(&self, session: &SessionId, goal: &str) -> Result<Vec<Kpi>, ApiError> {
        let path = format!("/session/generate_goals/{}", segment(session.as_str()));
        let req = self
            .request(Method::POST, &path)
            .json(&json!({ "goal": goal }));
        let generated: GeneratedGoals = self.send_json(req).await?;
        Ok(generated
            .tasks
            .map(|t| t.complex_kpis)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clarifications_pair_questions_with_answers() {
        let blocks = vec![
            QuestionBlock {
                field: "region".into(),
                source: "sales.csv".into(),
                questions: vec!["Which region?".into(), "Which year?".into()],
                answers: vec!["EMEA".into()],
            },
            QuestionBlock {
                field: "unit".into(),
                source: "sales.csv".into(),
                questions: vec!["Currency?".into()],
                answers: vec!["EUR".into()],
            },
        ];
        let map = clarifications(&blocks);
        assert_eq!(map.len(), 3);
        assert_eq!(map["Which region?"], "EMEA");
        assert_eq!(map["Which year?"], "");
        assert_eq!(map["Currency?"], "EUR");
    }
}
