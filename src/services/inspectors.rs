//! # 监工人员服务

use chrono::Utc;
use entity::{inspectors, inspectors::Entity as Inspectors};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Context, Result, SiteLogError};

use super::shared::ServiceResponse;

/// 监工响应
#[derive(Debug, Serialize, Clone)]
pub struct InspectorView {
    pub id: i32,
    pub name: String,
    pub title: Option<String>,
}

impl InspectorView {
    #[must_use]
    pub fn from_model(inspector: inspectors::Model) -> Self {
        Self {
            id: inspector.id,
            name: inspector.name,
            title: inspector.title,
        }
    }
}

/// 新增与更新共用的监工载荷
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorPayload {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub title: Option<String>,
}

/// 监工服务
pub struct InspectorService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> InspectorService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 全部监工，依编号排序
    pub async fn list_all(&self) -> Result<Vec<InspectorView>> {
        let inspectors = Inspectors::find()
            .order_by_asc(inspectors::Column::Id)
            .all(self.db)
            .await
            .context("Failed to list inspectors")?;
        Ok(inspectors.into_iter().map(InspectorView::from_model).collect())
    }

    /// 新增监工，姓名加职称重复时拒绝
    pub async fn create(&self, payload: InspectorPayload) -> Result<ServiceResponse<InspectorView>> {
        let name = required_name(payload.name.as_deref())?;
        let title = normalize_title(payload.title);
        self.ensure_unique(&name, title.as_deref(), None).await?;

        let now = Utc::now().naive_utc();
        let model = inspectors::ActiveModel {
            name: Set(name.clone()),
            title: Set(title),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = Inspectors::insert(model)
            .exec(self.db)
            .await
            .context("Failed to create inspector")?;
        let created = self.fetch(inserted.last_insert_id).await?;

        info!(name = %name, "監工已新增");
        Ok(ServiceResponse::with_message(
            InspectorView::from_model(created),
            "監工新增成功",
        ))
    }

    /// 更新监工
    pub async fn update(&self, payload: InspectorPayload) -> Result<ServiceResponse<InspectorView>> {
        let id = payload
            .id
            .ok_or_else(|| SiteLogError::validation_field("缺少必要参数: id", "id"))?;
        let inspector = self.fetch(id).await?;

        let name = match payload.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => inspector.name.clone(),
        };
        let title = match payload.title {
            Some(t) => normalize_title(Some(t)),
            None => inspector.title.clone(),
        };
        self.ensure_unique(&name, title.as_deref(), Some(id)).await?;

        let mut active: inspectors::ActiveModel = inspector.into();
        active.name = Set(name);
        active.title = Set(title);
        active.updated_at = Set(Utc::now().naive_utc());
        let updated = active
            .update(self.db)
            .await
            .context("Failed to update inspector")?;

        info!(id, "監工已更新");
        Ok(ServiceResponse::with_message(
            InspectorView::from_model(updated),
            "監工更新成功",
        ))
    }

    /// 依编号批次取回监工，供报表将编号解析为姓名
    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<inspectors::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Inspectors::find()
            .filter(inspectors::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(inspectors::Column::Id)
            .all(self.db)
            .await
            .context("Failed to fetch inspectors by ids")
    }

    async fn fetch(&self, id: i32) -> Result<inspectors::Model> {
        Inspectors::find_by_id(id)
            .one(self.db)
            .await
            .context("Failed to fetch inspector")?
            .ok_or_else(|| SiteLogError::not_found("監工", id.to_string()))
    }

    async fn ensure_unique(
        &self,
        name: &str,
        title: Option<&str>,
        exclude_id: Option<i32>,
    ) -> Result<()> {
        let mut select = Inspectors::find().filter(inspectors::Column::Name.eq(name));
        select = match title {
            Some(title) => select.filter(inspectors::Column::Title.eq(title)),
            None => select.filter(inspectors::Column::Title.is_null()),
        };
        if let Some(id) = exclude_id {
            select = select.filter(inspectors::Column::Id.ne(id));
        }
        let existing = select
            .one(self.db)
            .await
            .context("Failed to check inspector uniqueness")?;
        if existing.is_some() {
            return Err(SiteLogError::business("同名同職稱的監工已存在"));
        }
        Ok(())
    }
}

fn required_name(name: Option<&str>) -> Result<String> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n.to_string()),
        _ => Err(SiteLogError::validation_field("姓名不得為空", "name")),
    }
}

fn normalize_title(title: Option<String>) -> Option<String> {
    title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
