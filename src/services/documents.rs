//! Uploaded documents: bytes in the object store, metadata in the `documents` table.

use crate::{
    entities::document::{self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity, Model as DocumentModel},
    errors::ServiceError,
    events::Event,
    services::{
        companies::find_company, db_error, fetch_page, quotations::find_quotation, PageParams,
        ServiceContext,
    },
    storage::{checksum_hex, ObjectStore, StorageError},
    PaginatedResponse,
};
use bytes::Bytes;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::IntoParams;
use uuid::Uuid;

pub(crate) const TABLE: &str = "documents";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An upload as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub company_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
pub struct DocumentFilter {
    pub company_id: Option<Uuid>,
    pub quotation_id: Option<Uuid>,
}

/// Replaces anything outside `[A-Za-z0-9._-]` so the name is safe as a key segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn storage_key(document_id: Uuid, company_id: Option<Uuid>, quotation_id: Option<Uuid>, file_name: &str) -> String {
    let owner = match (quotation_id, company_id) {
        (Some(quotation_id), _) => format!("quotations/{quotation_id}"),
        (None, Some(company_id)) => format!("companies/{company_id}"),
        (None, None) => "unassigned".to_string(),
    };
    format!("{owner}/{document_id}/{}", sanitize_file_name(file_name))
}

#[derive(Clone)]
pub struct DocumentService {
    ctx: ServiceContext,
    store: Arc<dyn ObjectStore>,
    max_upload_bytes: u64,
}

impl DocumentService {
    pub fn new(ctx: ServiceContext, store: Arc<dyn ObjectStore>, max_upload_bytes: u64) -> Self {
        Self {
            ctx,
            store,
            max_upload_bytes,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: PageParams,
        filter: DocumentFilter,
    ) -> Result<PaginatedResponse<DocumentModel>, ServiceError> {
        let key = format!(
            "{TABLE}:list:{}:c={}:q={}",
            params.cache_fragment(),
            filter.company_id.map(|id| id.to_string()).unwrap_or_default(),
            filter.quotation_id.map(|id| id.to_string()).unwrap_or_default()
        );
        let db = self.ctx.db.clone();
        self.ctx
            .cache
            .get_or_load(&key, || async move {
                let mut select = DocumentEntity::find().order_by_desc(document::Column::CreatedAt);
                if let Some(company_id) = filter.company_id {
                    select = select.filter(document::Column::CompanyId.eq(company_id));
                }
                if let Some(quotation_id) = filter.quotation_id {
                    select = select.filter(document::Column::QuotationId.eq(quotation_id));
                }
                if let Some(term) = &params.search {
                    select = select.filter(document::Column::FileName.contains(term));
                }
                fetch_page(&db, select, &params).await.map_err(db_error("document"))
            })
            .await
    }

    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<DocumentModel, ServiceError> {
        DocumentEntity::find_by_id(id)
            .one(self.ctx.db())
            .await
            .map_err(db_error("document"))?
            .ok_or_else(|| ServiceError::not_found("Document", id))
    }

    /// Stores the bytes, then records the row; the object is removed again if the insert fails.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.data.len()))]
    pub async fn upload(&self, upload: NewDocument, actor: Option<Uuid>) -> Result<DocumentModel, ServiceError> {
        if upload.file_name.trim().is_empty() {
            return Err(ServiceError::ValidationError("file_name: must not be blank".to_string()));
        }
        if upload.data.is_empty() {
            return Err(ServiceError::ValidationError("content: must not be empty".to_string()));
        }
        let size = upload.data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(ServiceError::PayloadTooLarge(format!(
                "Upload of {size} bytes exceeds the limit of {} bytes",
                self.max_upload_bytes
            )));
        }
        if let Some(company_id) = upload.company_id {
            find_company(self.ctx.db(), company_id).await?;
        }
        if let Some(quotation_id) = upload.quotation_id {
            find_quotation(self.ctx.db(), quotation_id).await?;
        }

        let document_id = Uuid::new_v4();
        let key = storage_key(document_id, upload.company_id, upload.quotation_id, &upload.file_name);
        let checksum = checksum_hex(&upload.data);
        let size_bytes = i64::try_from(size)
            .map_err(|_| ServiceError::PayloadTooLarge("Upload too large".to_string()))?;

        self.store.put(&key, upload.data).await?;

        let inserted = DocumentActiveModel {
            id: Set(document_id),
            company_id: Set(upload.company_id),
            quotation_id: Set(upload.quotation_id),
            file_name: Set(upload.file_name.trim().to_string()),
            content_type: Set(upload
                .content_type
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())),
            size_bytes: Set(size_bytes),
            storage_key: Set(key.clone()),
            checksum: Set(checksum),
            created_by: Set(actor),
            ..Default::default()
        }
        .insert(self.ctx.db())
        .await;

        let model = match inserted {
            Ok(model) => model,
            Err(e) => {
                warn!(key = %key, "Document row insert failed; removing stored object");
                if let Err(cleanup) = self.store.delete(&key).await {
                    error!(key = %key, error = %cleanup, "Failed to remove orphaned object");
                }
                return Err(db_error("document")(e));
            }
        };

        info!(document_id = %document_id, key = %key, "Document uploaded");
        self.ctx.invalidate(&[TABLE]);
        self.ctx
            .emit(Event::DocumentUploaded {
                document_id,
                size_bytes,
            })
            .await;
        Ok(model)
    }

    /// Returns the metadata with the stored bytes.
    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn content(&self, id: Uuid) -> Result<(DocumentModel, Bytes), ServiceError> {
        let document = self.get(id).await?;
        let data = self.store.get(&document.storage_key).await?;
        Ok((document, data))
    }

    #[instrument(skip(self), fields(document_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let document = self.get(id).await?;
        let key = document.storage_key.clone();
        document.delete(self.ctx.db()).await.map_err(db_error("document"))?;

        match self.store.delete(&key).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                warn!(key = %key, "Stored object was already missing");
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to remove stored object; row already deleted");
            }
        }

        info!(document_id = %id, "Document deleted");
        self.ctx.invalidate(&[TABLE]);
        self.ctx.emit(Event::DocumentDeleted(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("offer 2024.pdf"), "offer_2024.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\cennik.xlsx"), "cennik.xlsx");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name("zażółć.txt"), "za____.txt");
    }

    #[test]
    fn keys_are_grouped_by_owner() {
        let id = Uuid::nil();
        let company = Uuid::from_u128(7);
        let key = storage_key(id, Some(company), None, "a.pdf");
        assert_eq!(key, format!("companies/{company}/{id}/a.pdf"));
        assert!(storage_key(id, None, None, "a.pdf").starts_with("unassigned/"));
        let quotation = Uuid::from_u128(9);
        assert!(storage_key(id, Some(company), Some(quotation), "a.pdf").starts_with("quotations/"));
    }
}
