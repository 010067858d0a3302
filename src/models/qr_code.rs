use crate::entities::{QrCodeStatus, qr_code_entity};
use crate::models::MemorialResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrCodesRequest {
    #[schema(example = 10)]
    pub number_of_codes: Option<u32>,
    #[schema(example = "MEM")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrCodeResponse {
    pub id: String,
    pub memorial_url: String,
    pub status: QrCodeStatus,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub memorial_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<qr_code_entity::Model> for QrCodeResponse {
    fn from(m: qr_code_entity::Model) -> Self {
        Self {
            id: m.id,
            memorial_url: m.memorial_url,
            status: m.status,
            claimed_by: m.claimed_by,
            claimed_at: m.claimed_at,
            memorial_id: m.memorial_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedQrCode {
    #[serde(flatten)]
    pub qr_code: QrCodeResponse,
    /// `data:image/svg+xml;base64,...`; absent when rendering failed.
    pub qr_image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateQrCodesResponse {
    pub count: usize,
    pub codes: Vec<GeneratedQrCode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrCodeQuery {
    pub status: Option<QrCodeStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportQrCodeItem {
    pub id: String,
    pub code: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportQrCodesRequest {
    pub codes: Vec<ExportQrCodeItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: String,
    /// Base64 file contents
    pub data: String,
    /// False when the QR could not be rendered and a placeholder was used.
    pub rendered: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportQrCodesResponse {
    pub files: Vec<ExportedFile>,
    pub bundle_filename: String,
    /// Base64 encoded JSON manifest holding every file.
    pub bundle: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ClaimQrCodeRequest {
    #[schema(example = "In Loving Memory of Mary")]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimQrCodeResponse {
    pub qr_code: QrCodeResponse,
    pub memorial: MemorialResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QrLandingResponse {
    pub code: String,
    pub status: QrCodeStatus,
    pub memorial_url: String,
    pub can_claim: bool,
    pub can_edit: bool,
    pub memorial: Option<MemorialResponse>,
}
