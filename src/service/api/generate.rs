use crate::pipeline::GenerateRequest;
use crate::service::error::{Result, ServiceError};
use crate::service::state::AppState;
use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Multipart, Request, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::IntoResponse,
};
use memo_core::{Asset, FieldSet};
use tokio::sync::OwnedSemaphorePermit;

pub const COVER_IMAGE_PART: &str = "coverImage";
pub const FOOTER_LOGO_PART: &str = "footerLogo";
pub const ATTACHMENT: &str = "attachment; filename=\"finance-memorandum.pdf\"";

/// Largest accepted JSON body.
pub const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// `POST /api/generate`: form fields in, PDF attachment out.
///
/// Multipart forms may carry the two uploads. JSON objects and url-encoded
/// forms carry text fields only.
pub async fn generate_memo(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse> {
    let request = read_request(&state, request).await?;
    tracing::info!(
        fields = request.fields.len(),
        cover_image = request.cover_image.is_some(),
        footer_logo = request.footer_logo.is_some(),
        "Memo generation request"
    );

    let _permit = admit(&state).await?;
    let pdf = state.pipeline.generate(request).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, ATTACHMENT),
        ],
        pdf,
    ))
}

/// Picks the body decoder from the media type, ignoring its parameters.
async fn read_request(state: &AppState, request: Request) -> Result<GenerateRequest> {
    let media_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match media_type.as_str() {
        "multipart/form-data" => {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|rejection| ServiceError::InvalidRequest(rejection.body_text()))?;
            read_form(multipart, state.config.max_upload_bytes()).await
        }
        "application/json" => {
            let body = Bytes::from_request(request, state)
                .await
                .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
            if body.len() > JSON_BODY_LIMIT {
                return Err(ServiceError::BodyTooLarge);
            }
            let fields: FieldSet = serde_json::from_slice(&body).map_err(|e| {
                ServiceError::InvalidRequest(format!("expected a JSON object of strings: {e}"))
            })?;
            Ok(GenerateRequest::new(fields))
        }
        "application/x-www-form-urlencoded" => {
            let Form(fields) = Form::<FieldSet>::from_request(request, state)
                .await
                .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
            Ok(GenerateRequest::new(fields))
        }
        "" => Err(ServiceError::UnsupportedMediaType("none".to_string())),
        other => Err(ServiceError::UnsupportedMediaType(other.to_string())),
    }
}

fn rejected(status: StatusCode, message: String) -> ServiceError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::BodyTooLarge
    } else {
        ServiceError::InvalidRequest(message)
    }
}

/// Splits the form into text fields and the two optional uploads. Empty file
/// parts are treated as not uploaded.
async fn read_form(mut multipart: Multipart, max_file_bytes: usize) -> Result<GenerateRequest> {
    let mut request = GenerateRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            COVER_IMAGE_PART | FOOTER_LOGO_PART => {
                let media_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    continue;
                }
                if bytes.len() > max_file_bytes {
                    return Err(ServiceError::UploadTooLarge {
                        part: name,
                        limit_bytes: max_file_bytes,
                    });
                }
                let asset = Asset::new(bytes.to_vec(), media_type.as_deref());
                if name == COVER_IMAGE_PART {
                    request.cover_image = Some(asset);
                } else {
                    request.footer_logo = Some(asset);
                }
            }
            _ if field.file_name().is_some() => {
                tracing::debug!(part = %name, "Ignoring unexpected file part");
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                request.fields.insert(name, value);
            }
        }
    }

    Ok(request)
}

fn multipart_error(err: MultipartError) -> ServiceError {
    rejected(err.status(), err.body_text())
}

/// Takes a render slot, queueing for at most one render timeout.
async fn admit(state: &AppState) -> Result<OwnedSemaphorePermit> {
    let semaphore = state.render_semaphore.clone();
    if let Ok(permit) = semaphore.clone().try_acquire_owned() {
        return Ok(permit);
    }

    tracing::debug!("All render slots busy, queueing request");
    match tokio::time::timeout(state.config.render_timeout(), semaphore.acquire_owned()).await {
        Ok(Ok(permit)) => Ok(permit),
        _ => {
            tracing::warn!("Render queue wait expired");
            Err(ServiceError::ServiceOverloaded)
        }
    }
}
