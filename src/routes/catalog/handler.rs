use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::Value;

use super::model::CareerResponse;
use crate::{
    AppState,
    cache::{CATALOG_CAREERS_KEY, DiskCache},
    catalog,
    error::AppError,
    utils::success_to_api_response,
};

/// 按领域分组的职业列表，结果走磁盘缓存
fn load_careers(cache: &DiskCache) -> Result<Value, AppError> {
    if let Some(cached) = cache.get::<Value>(CATALOG_CAREERS_KEY) {
        return Ok(cached);
    }
    let careers = serde_json::to_value(catalog::careers_by_domain())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    cache.set(CATALOG_CAREERS_KEY, &careers, None);
    Ok(careers)
}

#[axum::debug_handler]
pub async fn list_careers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cache = state.cache.clone();
    // 缓存读写是阻塞的文件操作
    let careers = tokio::task::spawn_blocking(move || load_careers(&cache))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(success_to_api_response(careers))
}

#[axum::debug_handler]
pub async fn get_career(Path(career_id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let career = catalog::career_by_id(&career_id).ok_or(AppError::NotFound("Career"))?;
    Ok(success_to_api_response(CareerResponse::from(career)))
}

#[axum::debug_handler]
pub async fn get_course(Path(course_id): Path<String>) -> Result<impl IntoResponse, AppError> {
    let course = catalog::course_by_id(&course_id).ok_or(AppError::NotFound("Course"))?;
    Ok(success_to_api_response(course))
}

#[axum::debug_handler]
pub async fn get_internship(
    Path(internship_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let internship =
        catalog::internship_by_id(&internship_id).ok_or(AppError::NotFound("Internship"))?;
    Ok(success_to_api_response(internship))
}
