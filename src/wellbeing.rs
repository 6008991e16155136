//! Mood and goal endpoints the UI calls. Nothing here is stored: posted
//! records are echoed back as sent and reads return fixed data.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MoodSubmission {
    #[serde(rename = "moodScore")]
    pub mood_score: Option<Value>,
    pub notes: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct MoodRecord {
    pub success: bool,
    #[serde(rename = "moodScore")]
    pub mood_score: Option<Value>,
    pub notes: Option<Value>,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalSubmission {
    pub title: Option<Value>,
    pub description: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Goal {
    pub id: i64,
    pub title: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    pub progress: u8,
    pub completed: bool,
}

// wrong method on a stub route, kept out of the chat gateway counters
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

pub async fn list_moods() -> Json<Vec<MoodRecord>> {
    Json(Vec::new())
}

pub async fn record_mood(
    payload: Result<Json<MoodSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<MoodRecord>), ApiError> {
    let Json(submission) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    Ok((
        StatusCode::CREATED,
        Json(MoodRecord {
            success: true,
            mood_score: submission.mood_score,
            notes: submission.notes,
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    ))
}

pub fn sample_goals() -> Vec<Goal> {
    vec![
        Goal {
            id: 1,
            title: Some(json!("Practice mindfulness daily")),
            description: None,
            progress: 60,
            completed: false,
        },
        Goal {
            id: 2,
            title: Some(json!("Journal before bed")),
            description: None,
            progress: 40,
            completed: false,
        },
    ]
}

pub async fn list_goals() -> Json<Vec<Goal>> {
    Json(sample_goals())
}

pub async fn create_goal(
    payload: Result<Json<GoalSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let Json(submission) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    Ok((
        StatusCode::CREATED,
        Json(Goal {
            id: Utc::now().timestamp_millis(),
            title: submission.title,
            description: submission.description,
            progress: 0,
            completed: false,
        }),
    ))
}
