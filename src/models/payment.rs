use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[schema(example = "prod_memorial_plaque")]
    pub product_id: Option<String>,
    #[schema(example = "price_1PqExample")]
    pub price_id: Option<String>,
    #[schema(example = "Memorial QR Plaque")]
    pub product_name: Option<String>,
    pub quantity: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: String,
}
