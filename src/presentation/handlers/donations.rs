//! 捐赠管理处理器
//!
//! 处理捐赠记录的创建、查询和生命周期操作

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use tracing::{info, instrument};

use crate::business::domain::Donation;
use crate::presentation::dto::{
    AvailabilityParams, AvailabilityResponse, CreateDonationRequest, UpdateDonationRequest,
};
use crate::presentation::routes::AppState;
use crate::shared::constants::messages;
use crate::shared::types::{DonationId, MessageResponse};
use crate::shared::AppResult;

/// 创建捐赠记录，并在后台发送确认邮件
#[instrument(skip(state, payload))]
pub async fn create_donation(
    State(state): State<AppState>,
    payload: Result<Json<CreateDonationRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    let Json(request) = payload?;
    let submission = request.validate()?;

    let donation = state.donations.create(submission).await?;
    state.notifications.spawn_confirmation(donation.clone());

    Ok((StatusCode::CREATED, Json(donation)))
}

/// 获取全部捐赠记录
#[instrument(skip(state))]
pub async fn list_donations(State(state): State<AppState>) -> AppResult<Json<Vec<Donation>>> {
    let donations = state.donations.list().await?;
    info!("📋 返回 {} 条捐赠记录", donations.len());
    Ok(Json(donations))
}

/// 移入回收站
#[instrument(skip(state))]
pub async fn soft_delete_donation(
    State(state): State<AppState>,
    id: Result<Path<DonationId>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.donations.soft_delete(id).await?;
    Ok(Json(MessageResponse::new(messages::MOVED_TO_TRASH)))
}

/// 标记取件完成
#[instrument(skip(state))]
pub async fn complete_donation(
    State(state): State<AppState>,
    id: Result<Path<DonationId>, PathRejection>,
) -> AppResult<Json<Donation>> {
    let Path(id) = id?;
    Ok(Json(state.donations.complete(id).await?))
}

/// 从回收站恢复
#[instrument(skip(state))]
pub async fn restore_donation(
    State(state): State<AppState>,
    id: Result<Path<DonationId>, PathRejection>,
) -> AppResult<Json<Donation>> {
    let Path(id) = id?;
    Ok(Json(state.donations.restore(id).await?))
}

/// 部分更新
#[instrument(skip(state, payload))]
pub async fn update_donation(
    State(state): State<AppState>,
    id: Result<Path<DonationId>, PathRejection>,
    payload: Result<Json<UpdateDonationRequest>, JsonRejection>,
) -> AppResult<Json<Donation>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let patch = request.into_patch()?;

    Ok(Json(state.donations.update(id, patch).await?))
}

/// 检查时间段是否可预约
#[instrument(skip(state))]
pub async fn check_availability(
    State(state): State<AppState>,
    params: Result<Query<AvailabilityParams>, QueryRejection>,
) -> AppResult<Json<AvailabilityResponse>> {
    let Query(params) = params?;
    let available = state.donations.check_availability(&params.into()).await?;
    Ok(Json(AvailabilityResponse { available }))
}
