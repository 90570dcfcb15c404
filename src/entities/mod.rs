//! sea-orm entities for every CRM table.
//!
//! All rows carry a generated `id`, an optional `created_by` creator reference and UTC
//! `created_at`/`updated_at` timestamps maintained by [`timestamped_active_model!`].

/// Implements `ActiveModelBehavior` so inserts stamp `created_at`/`updated_at` unless the
/// caller already set them, and updates refresh `updated_at`.
macro_rules! timestamped_active_model {
    () => {
        #[async_trait::async_trait]
        impl ActiveModelBehavior for ActiveModel {
            async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
            where
                C: ConnectionTrait,
            {
                let mut active_model = self;
                let now = chrono::Utc::now();

                if insert {
                    if active_model.created_at.is_not_set() {
                        active_model.created_at = sea_orm::Set(now);
                    }
                    if active_model.updated_at.is_not_set() {
                        active_model.updated_at = sea_orm::Set(now);
                    }
                } else {
                    active_model.updated_at = sea_orm::Set(now);
                }

                Ok(active_model)
            }
        }
    };
}

pub mod company;
pub mod contact;
pub mod dictionary_entry;
pub mod document;
pub mod employee;
pub mod employee_role;
pub mod exhibition;
pub mod exhibition_cost;
pub mod note;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_category;
pub mod quotation;
pub mod quotation_item;
pub mod setting;
pub mod task;
