//! # 灾害类型服务
//!
//! 种子目录依类别分组供填报表单使用，自订类型追加在「自訂」类别之下。

use chrono::Utc;
use entity::{disaster_types, disaster_types::Entity as DisasterTypes};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::info;

use crate::error::{Context, Result, SiteLogError};

use super::shared::ServiceResponse;

/// 依类别分组的灾害类型
#[derive(Debug, Serialize, Clone)]
pub struct DisasterTypeGroup {
    pub category: String,
    pub types: Vec<String>,
}

/// 自订类型写入结果
#[derive(Debug, Serialize)]
pub struct SaveCustomOutcome {
    pub created: bool,
}

/// 灾害类型服务
pub struct DisasterTypeService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DisasterTypeService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 全部灾害类型，依种子顺序分组
    pub async fn list_grouped(&self) -> Result<Vec<DisasterTypeGroup>> {
        let rows = DisasterTypes::find()
            .order_by_asc(disaster_types::Column::Id)
            .all(self.db)
            .await
            .context("Failed to list disaster types")?;

        // 保持类别首次出现的顺序
        let mut groups: Vec<DisasterTypeGroup> = Vec::new();
        for row in rows {
            match groups.iter_mut().find(|g| g.category == row.category) {
                Some(group) => group.types.push(row.type_name),
                None => groups.push(DisasterTypeGroup {
                    category: row.category,
                    types: vec![row.type_name],
                }),
            }
        }
        Ok(groups)
    }

    /// 新增自订灾害类型，重复写入不产生第二笔
    pub async fn save_custom(&self, custom_type: &str) -> Result<ServiceResponse<SaveCustomOutcome>> {
        let type_name = custom_type.trim();
        if type_name.is_empty() {
            return Err(SiteLogError::validation_field(
                "缺少必要参数: customType",
                "customType",
            ));
        }

        // 任何类别下已有同名类型即视为已存在
        let existing = DisasterTypes::find()
            .filter(disaster_types::Column::TypeName.eq(type_name))
            .one(self.db)
            .await
            .context("Failed to check disaster type existence")?;
        if existing.is_some() {
            return Ok(ServiceResponse::with_message(
                SaveCustomOutcome { created: false },
                "災害類型已存在",
            ));
        }

        let model = disaster_types::ActiveModel {
            category: Set(disaster_types::CATEGORY_CUSTOM.to_string()),
            type_name: Set(type_name.to_string()),
            is_custom: Set(true),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        DisasterTypes::insert(model)
            .exec(self.db)
            .await
            .context("Failed to insert custom disaster type")?;

        info!(type_name = %type_name, "自訂災害類型已新增");
        Ok(ServiceResponse::with_message(
            SaveCustomOutcome { created: true },
            "自訂災害類型已新增",
        ))
    }
}
