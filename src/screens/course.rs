// src/screens/course.rs

use crate::{
    api::{ApiRequest, ApiResponse},
    config::MODULE_LIST_TIMEOUT,
    error::AppError,
    models::course::{Course, Module},
    state::ClientState,
};

/// Courses the signed-in student is enrolled in.
pub async fn list_courses(state: &ClientState) -> Result<Vec<Course>, AppError> {
    let session = state.sessions.require().await?;
    let url = state.routes.courses(&session.email)?;

    state
        .api
        .send_as::<Vec<Course>>(ApiRequest::get(url).bearer(session.bearer()))
        .await
        .into_data()
        .map_err(|e| state.report(e))
}

/// The meeting plan of one course.
///
/// A `success` without `rps_details` is reported with the server's message, the same
/// as an error response.
pub async fn load_module(state: &ClientState, course_id: &str) -> Result<Module, AppError> {
    let session = state.sessions.require().await?;
    let url = state.routes.module(course_id, &session.email)?;

    let res = state
        .api
        .send(
            ApiRequest::get(url)
                .timeout(MODULE_LIST_TIMEOUT)
                .bearer(session.bearer()),
        )
        .await;

    let module = match res {
        ApiResponse::Success {
            data: Some(data), ..
        } if data.get("rps_details").is_some_and(|v| v.is_array()) => {
            serde_json::from_value::<Module>(data).map_err(AppError::from)
        }
        other => Err(AppError::Api(other.message().to_string())),
    };

    module.map_err(|e| state.report(e))
}
