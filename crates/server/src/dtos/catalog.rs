use chrono::NaiveDateTime;
use database::entities::{faculties, programs, student_statuses};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Compact reference to a lookup record, embedded in student responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LookupRef {
    pub id: Uuid,
    pub name: String,
}

macro_rules! catalog_conversions {
    ($entity:ident) => {
        impl From<$entity::Model> for CatalogResponse {
            fn from(model: $entity::Model) -> Self {
                Self {
                    id: model.id,
                    name: model.name,
                    created_at: model.created_at,
                    updated_at: model.updated_at,
                }
            }
        }

        impl From<$entity::Model> for LookupRef {
            fn from(model: $entity::Model) -> Self {
                Self {
                    id: model.id,
                    name: model.name,
                }
            }
        }
    };
}

catalog_conversions!(faculties);
catalog_conversions!(programs);
catalog_conversions!(student_statuses);
