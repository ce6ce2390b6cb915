use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::notifications::dto::{NotificationDto, UnreadCountDto};
use crate::features::notifications::service::NotificationService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List the current user's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationDto>>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationDto>>>> {
    let (items, total) = service.list(user.id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Count unread notifications for the current user
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn unread_count(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let unread = service.unread_count(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread }),
        None,
        None,
    )))
}

/// Mark a single notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<NotificationDto>),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationDto>>> {
    let notification = service.mark_read(user.id, id).await?;
    Ok(Json(ApiResponse::success(Some(notification), None, None)))
}

/// Mark all of the current user's notifications as read
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked read", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_read(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let affected = service.mark_all_read(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread: affected }),
        Some("All notifications marked as read".to_string()),
        None,
    )))
}

/// Stream the current user's notifications over server-sent events
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notifications"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn stream(
    user: AuthenticatedUser,
    State(service): State<Arc<NotificationService>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = service.subscribe();
    let user_id = user.id;

    let stream = BroadcastStream::new(rx).filter_map(move |item| match item {
        Ok(notification) if notification.user_id == user_id => {
            match Event::default().event("notification").json_data(&notification) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    tracing::warn!("Failed to serialize notification event: {}", e);
                    None
                }
            }
        }
        // Lagged receivers skip missed items; clients re-sync via the list API.
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
