use crate::config::AppConfig;
use crate::entities::{QrCodeStatus, memorial_entity as memorials, qr_code_entity as qr_codes};
use crate::error::{AppError, AppResult};
use crate::external::{QrImageRenderer, placeholder_svg, svg_data_url};
use crate::models::*;
use crate::services::ActivityLogService;
use crate::utils::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

pub const MAX_CODES_PER_BATCH: u32 = 500;
const DEFAULT_PREFIX: &str = "MEM";
const DEFAULT_MEMORIAL_TITLE: &str = "In Loving Memory";
const MAX_ID_ATTEMPTS: usize = 5;

/// QR plaque codes: batch generation and export for admins, public landing and claim.
#[derive(Clone)]
pub struct QrCodeService {
    pool: DatabaseConnection,
    activity_log: ActivityLogService,
    renderer: Arc<dyn QrImageRenderer>,
    app: AppConfig,
}

fn normalize_prefix(prefix: Option<&str>) -> AppResult<String> {
    let prefix = prefix
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PREFIX)
        .to_ascii_uppercase();
    if prefix.len() > 10 || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::ValidationError(
            "prefix must be 1 to 10 letters or digits".to_string(),
        ));
    }
    Ok(prefix)
}

impl QrCodeService {
    pub fn new(
        pool: DatabaseConnection,
        activity_log: ActivityLogService,
        renderer: Arc<dyn QrImageRenderer>,
        app: AppConfig,
    ) -> Self {
        Self {
            pool,
            activity_log,
            renderer,
            app,
        }
    }

    /// Inserts the whole batch in one transaction. A failed insert rolls the batch
    /// back; a failed render only drops that code's image.
    pub async fn generate(
        &self,
        admin_id: &str,
        request: GenerateQrCodesRequest,
    ) -> AppResult<GenerateQrCodesResponse> {
        let count = match request.number_of_codes {
            Some(n) if (1..=MAX_CODES_PER_BATCH).contains(&n) => n,
            _ => {
                return Err(AppError::ValidationError(format!(
                    "numberOfCodes must be between 1 and {MAX_CODES_PER_BATCH}"
                )));
            }
        };
        let prefix = normalize_prefix(request.prefix.as_deref())?;

        let txn = self.pool.begin().await?;
        let codes = match self.insert_batch(&txn, &prefix, count).await {
            Ok(codes) => codes,
            Err(e) => {
                log::error!("QR batch with prefix {} aborted: {}", prefix, e);
                txn.rollback().await?;
                return Err(e);
            }
        };
        txn.commit().await?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "generate_qr_codes",
                "qr_code",
                None,
                Some(json!({ "count": count, "prefix": prefix })),
            )
            .await;

        log::info!("Generated {} QR codes with prefix {}", codes.len(), prefix);
        Ok(GenerateQrCodesResponse {
            count: codes.len(),
            codes,
        })
    }

    /// Inserts `count` fresh codes on `txn`; any failure leaves the batch to be rolled back.
    async fn insert_batch<C: ConnectionTrait>(
        &self,
        txn: &C,
        prefix: &str,
        count: u32,
    ) -> AppResult<Vec<GeneratedQrCode>> {
        let mut issued = HashSet::new();
        let mut codes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let code = Self::unused_code(txn, prefix, &issued).await?;
            issued.insert(code.clone());

            let row = qr_codes::ActiveModel {
                id: Set(code.clone()),
                memorial_url: Set(self.app.memorial_url(&code)),
                status: Set(QrCodeStatus::Unclaimed),
                claimed_by: Set(None),
                claimed_at: Set(None),
                memorial_id: Set(None),
                created_at: Set(Utc::now()),
            }
            .insert(txn)
            .await?;

            let qr_image = match self.renderer.render_svg(&row.memorial_url) {
                Ok(svg) => Some(svg_data_url(&svg)),
                Err(e) => {
                    log::warn!("QR image for {} not rendered: {}", code, e);
                    None
                }
            };
            codes.push(GeneratedQrCode {
                qr_code: row.into(),
                qr_image,
            });
        }
        Ok(codes)
    }

    async fn unused_code<C: ConnectionTrait>(
        conn: &C,
        prefix: &str,
        issued: &HashSet<String>,
    ) -> AppResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = format!("{}-{}", prefix, generate_code_suffix());
            if issued.contains(&candidate) {
                continue;
            }
            let taken = qr_codes::Entity::find_by_id(candidate.clone())
                .one(conn)
                .await?
                .is_some();
            if !taken {
                return Ok(candidate);
            }
        }
        Err(AppError::InternalError(
            "Could not allocate a unique QR code".to_string(),
        ))
    }

    /// One SVG per code (a labelled placeholder when rendering fails) plus a bundle
    /// holding every file as a base64 JSON manifest.
    pub async fn export(
        &self,
        admin_id: &str,
        request: ExportQrCodesRequest,
    ) -> AppResult<ExportQrCodesResponse> {
        if request.codes.is_empty() {
            return Err(AppError::ValidationError(
                "No QR codes selected for export".to_string(),
            ));
        }
        if request.codes.len() > MAX_CODES_PER_BATCH as usize {
            return Err(AppError::ValidationError(format!(
                "At most {MAX_CODES_PER_BATCH} codes can be exported at once"
            )));
        }

        let mut files = Vec::with_capacity(request.codes.len());
        let mut manifest = Vec::with_capacity(request.codes.len());
        for item in &request.codes {
            let code = require_field(Some(&item.code), "code")?;
            let (svg, rendered) = match self.renderer.render_svg(&self.app.memorial_url(&code)) {
                Ok(svg) => (svg, true),
                Err(e) => {
                    log::warn!("Exporting placeholder for {}: {}", code, e);
                    (placeholder_svg(&code), false)
                }
            };

            let file = ExportedFile {
                filename: format!("{code}.svg"),
                content_type: "image/svg+xml".to_string(),
                data: STANDARD.encode(svg.as_bytes()),
                rendered,
            };
            manifest.push(json!({
                "id": item.id,
                "code": code,
                "created_at": item.created_at,
                "filename": file.filename,
                "content_type": file.content_type,
                "data": file.data,
            }));
            files.push(file);
        }

        let exported_at = Utc::now();
        let bundle = serde_json::to_vec(&json!({
            "exported_at": exported_at,
            "count": files.len(),
            "files": manifest,
        }))?;

        let _ = self
            .activity_log
            .record(
                admin_id,
                "export_qr_codes",
                "qr_code",
                None,
                Some(json!({ "count": files.len() })),
            )
            .await;

        Ok(ExportQrCodesResponse {
            bundle_filename: format!("qr-codes-{}.json", exported_at.format("%Y%m%d-%H%M%S")),
            bundle: STANDARD.encode(bundle),
            files,
        })
    }

    pub async fn list(&self, query: &QrCodeQuery) -> AppResult<PaginatedResponse<QrCodeResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = qr_codes::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(qr_codes::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .order_by_desc(qr_codes::Column::CreatedAt)
            .offset(params.get_offset())
            .limit(params.get_limit())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(QrCodeResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Only unclaimed codes can be deleted; a claimed code backs a live memorial.
    pub async fn delete(&self, admin_id: &str, code: &str) -> AppResult<()> {
        let qr = self.find(code).await?;
        if qr.status == QrCodeStatus::Claimed {
            return Err(AppError::ValidationError(
                "Claimed QR codes cannot be deleted".to_string(),
            ));
        }

        let result = qr_codes::Entity::delete_many()
            .filter(qr_codes::Column::Id.eq(code))
            .filter(qr_codes::Column::Status.eq(QrCodeStatus::Unclaimed))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::ValidationError(
                "Claimed QR codes cannot be deleted".to_string(),
            ));
        }

        let _ = self
            .activity_log
            .record(admin_id, "delete_qr_code", "qr_code", Some(code), None)
            .await;
        Ok(())
    }

    /// The memorial is shown when it is public or belongs to the viewer.
    pub async fn landing(&self, code: &str, viewer_id: Option<&str>) -> AppResult<QrLandingResponse> {
        let qr = self.find(code).await?;
        let is_claimant = viewer_id.is_some() && qr.claimed_by.as_deref() == viewer_id;

        let memorial = match (&qr.memorial_id, qr.status) {
            (Some(memorial_id), QrCodeStatus::Claimed) => memorials::Entity::find_by_id(memorial_id.clone())
                .one(&self.pool)
                .await?
                .filter(|m| m.is_public || Some(m.owner_id.as_str()) == viewer_id)
                .map(MemorialResponse::from),
            _ => None,
        };

        Ok(QrLandingResponse {
            code: qr.id,
            status: qr.status,
            memorial_url: qr.memorial_url,
            can_claim: qr.status == QrCodeStatus::Unclaimed,
            can_edit: is_claimant,
            memorial,
        })
    }

    /// Claims the code for `user_id` and creates its memorial in the same transaction.
    /// The status guard on the update lets exactly one concurrent claim win.
    pub async fn claim(
        &self,
        user_id: &str,
        code: &str,
        request: ClaimQrCodeRequest,
    ) -> AppResult<ClaimQrCodeResponse> {
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_MEMORIAL_TITLE)
            .to_string();
        validate_length(&title, "title", 1, 200)?;
        let already_claimed = || AppError::ValidationError("QR code has already been claimed".to_string());

        let txn = self.pool.begin().await?;
        let qr = qr_codes::Entity::find_by_id(code.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("QR code not found".to_string()))?;
        if qr.status == QrCodeStatus::Claimed {
            return Err(already_claimed());
        }

        let now = Utc::now();
        let memorial = memorials::ActiveModel {
            id: Set(new_id()),
            owner_id: Set(user_id.to_string()),
            qr_code_id: Set(Some(qr.id.clone())),
            title: Set(title),
            description: Set(None),
            birth_date: Set(None),
            death_date: Set(None),
            photos: Set(json!([])),
            profile_picture_url: Set(None),
            is_public: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let result = qr_codes::Entity::update_many()
            .set(qr_codes::ActiveModel {
                status: Set(QrCodeStatus::Claimed),
                claimed_by: Set(Some(user_id.to_string())),
                claimed_at: Set(Some(now)),
                memorial_id: Set(Some(memorial.id.clone())),
                ..Default::default()
            })
            .filter(qr_codes::Column::Id.eq(qr.id.clone()))
            .filter(qr_codes::Column::Status.eq(QrCodeStatus::Unclaimed))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(already_claimed());
        }

        let claimed = qr_codes::Entity::find_by_id(qr.id.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("QR code not found".to_string()))?;
        txn.commit().await?;

        log::info!("QR code {} claimed by {}", claimed.id, user_id);
        Ok(ClaimQrCodeResponse {
            qr_code: claimed.into(),
            memorial: memorial.into(),
        })
    }

    async fn find(&self, code: &str) -> AppResult<qr_codes::Model> {
        qr_codes::Entity::find_by_id(code.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("QR code not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserType;
    use crate::external::SvgQrRenderer;
    use crate::test_support::*;

    fn app_config() -> AppConfig {
        AppConfig {
            frontend_url: "https://workersmate.test".to_string(),
        }
    }

    fn service(db: &DatabaseConnection, renderer: Arc<dyn QrImageRenderer>) -> QrCodeService {
        QrCodeService::new(
            db.clone(),
            ActivityLogService::new(db.clone()),
            renderer,
            app_config(),
        )
    }

    fn generate_request(n: u32) -> GenerateQrCodesRequest {
        GenerateQrCodesRequest {
            number_of_codes: Some(n),
            prefix: Some("test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_batch() {
        let db = setup_test_db().await;
        let qr = service(&db, Arc::new(SvgQrRenderer));

        let response = qr.generate("admin-1", generate_request(3)).await.unwrap();
        assert_eq!(response.count, 3);
        for code in &response.codes {
            assert!(code.qr_code.id.starts_with("TEST-"));
            assert_eq!(
                code.qr_code.memorial_url,
                format!("https://workersmate.test/memory/{}", code.qr_code.id)
            );
            assert!(
                code.qr_image
                    .as_deref()
                    .is_some_and(|i| i.starts_with("data:image/svg+xml;base64,"))
            );
        }
        assert_eq!(qr_codes::Entity::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_generate_keeps_codes_when_rendering_fails() {
        let db = setup_test_db().await;
        let qr = service(&db, Arc::new(FailingRenderer));

        let response = qr.generate("admin-1", generate_request(2)).await.unwrap();
        assert_eq!(response.count, 2);
        assert!(response.codes.iter().all(|c| c.qr_image.is_none()));
        assert_eq!(qr_codes::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_generate_rolls_back_whole_batch_on_insert_failure() {
        let db = setup_test_db().await;
        db.execute_unprepared(
            "CREATE TRIGGER block_third_qr_code BEFORE INSERT ON qr_codes \
             WHEN (SELECT COUNT(*) FROM qr_codes) >= 2 \
             BEGIN SELECT RAISE(ABORT, 'qr insert blocked'); END;",
        )
        .await
        .unwrap();
        let qr = service(&db, Arc::new(SvgQrRenderer));

        let err = qr.generate("admin-1", generate_request(5)).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(qr_codes::Entity::find().count(&db).await.unwrap(), 0);

        db.execute_unprepared("DROP TRIGGER block_third_qr_code")
            .await
            .unwrap();
        let response = qr.generate("admin-1", generate_request(2)).await.unwrap();
        assert_eq!(response.count, 2);
    }

    #[tokio::test]
    async fn test_generate_validates_count_and_prefix() {
        let db = setup_test_db().await;
        let qr = service(&db, Arc::new(SvgQrRenderer));

        for n in [0, 501] {
            let err = qr.generate("admin-1", generate_request(n)).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        let err = qr
            .generate("admin-1", GenerateQrCodesRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = qr
            .generate(
                "admin-1",
                GenerateQrCodesRequest {
                    number_of_codes: Some(1),
                    prefix: Some("no spaces".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_export_falls_back_to_placeholder() {
        let db = setup_test_db().await;
        let qr = service(&db, Arc::new(FailingRenderer));
        let request = ExportQrCodesRequest {
            codes: vec![ExportQrCodeItem {
                id: "MEM-ABCDEFGH".to_string(),
                code: "MEM-ABCDEFGH".to_string(),
                created_at: None,
            }],
        };

        let response = qr.export("admin-1", request).await.unwrap();
        assert_eq!(response.files.len(), 1);
        let file = &response.files[0];
        assert!(!file.rendered);
        assert_eq!(file.filename, "MEM-ABCDEFGH.svg");
        let svg = String::from_utf8(STANDARD.decode(&file.data).unwrap()).unwrap();
        assert!(svg.contains("MEM-ABCDEFGH"));

        let bundle: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(&response.bundle).unwrap()).unwrap();
        assert_eq!(bundle["count"], 1);
        assert_eq!(bundle["files"][0]["filename"], "MEM-ABCDEFGH.svg");

        let empty = qr
            .export("admin-1", ExportQrCodesRequest { codes: vec![] })
            .await
            .unwrap_err();
        assert!(matches!(empty, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_claim_exactly_once() {
        let db = setup_test_db().await;
        let first = insert_user(&db, "first@example.com", UserType::Customer).await;
        let second = insert_user(&db, "second@example.com", UserType::Customer).await;
        insert_qr_code(&db, "MEM-CLAIM001").await;
        let qr = service(&db, Arc::new(SvgQrRenderer));

        let claimed = qr
            .claim(&first, "MEM-CLAIM001", ClaimQrCodeRequest::default())
            .await
            .unwrap();
        assert_eq!(claimed.qr_code.status, QrCodeStatus::Claimed);
        assert_eq!(claimed.qr_code.claimed_by.as_deref(), Some(first.as_str()));
        assert_eq!(claimed.memorial.title, "In Loving Memory");
        assert_eq!(claimed.memorial.owner_id, first);
        assert!(!claimed.memorial.is_public);

        let err = qr
            .claim(
                &second,
                "MEM-CLAIM001",
                ClaimQrCodeRequest {
                    title: Some("Mine now".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let row = qr_codes::Entity::find_by_id("MEM-CLAIM001".to_string())
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.claimed_by.as_deref(), Some(first.as_str()));
        assert_eq!(memorials::Entity::find().count(&db).await.unwrap(), 1);

        let missing = qr
            .claim(&first, "MEM-NOPE", ClaimQrCodeRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_landing_visibility() {
        let db = setup_test_db().await;
        let owner = insert_user(&db, "owner@example.com", UserType::Customer).await;
        let visitor = insert_user(&db, "visitor@example.com", UserType::Customer).await;
        insert_qr_code(&db, "MEM-LAND0001").await;
        let qr = service(&db, Arc::new(SvgQrRenderer));

        let fresh = qr.landing("MEM-LAND0001", None).await.unwrap();
        assert!(fresh.can_claim);
        assert!(fresh.memorial.is_none());

        qr.claim(&owner, "MEM-LAND0001", ClaimQrCodeRequest::default())
            .await
            .unwrap();

        let as_owner = qr.landing("MEM-LAND0001", Some(&owner)).await.unwrap();
        assert!(as_owner.can_edit);
        assert!(!as_owner.can_claim);
        assert!(as_owner.memorial.is_some());

        let as_visitor = qr.landing("MEM-LAND0001", Some(&visitor)).await.unwrap();
        assert!(!as_visitor.can_edit);
        assert!(as_visitor.memorial.is_none());
    }

    #[tokio::test]
    async fn test_delete_only_unclaimed() {
        let db = setup_test_db().await;
        let owner = insert_user(&db, "owner@example.com", UserType::Customer).await;
        insert_qr_code(&db, "MEM-KEEP0001").await;
        insert_qr_code(&db, "MEM-DROP0001").await;
        let qr = service(&db, Arc::new(SvgQrRenderer));
        qr.claim(&owner, "MEM-KEEP0001", ClaimQrCodeRequest::default())
            .await
            .unwrap();

        let err = qr.delete("admin-1", "MEM-KEEP0001").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        qr.delete("admin-1", "MEM-DROP0001").await.unwrap();

        let unclaimed = qr
            .list(&QrCodeQuery {
                status: Some(QrCodeStatus::Unclaimed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(unclaimed.total, 0);
        let all = qr.list(&QrCodeQuery::default()).await.unwrap();
        assert_eq!(all.total, 1);
    }
}
