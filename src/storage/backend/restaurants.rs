//! 餐厅存储操作
//!
//! 目录数据的读写。列表排序在数据库完成，
//! 搜索过滤在服务层做（数据集是单城目录，量级很小）。

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::SeaOrmStorage;
use crate::errors::{HalalmapError, Result};
use migration::entities::restaurant;

/// 列表排序方式
#[derive(Debug, Clone, Copy, Default)]
pub enum RestaurantOrder {
    /// 按名称升序（默认）
    #[default]
    Name,
    /// 按浏览量降序（trending）
    ViewsDesc,
    /// 按创建时间降序（new）
    CreatedDesc,
}

impl SeaOrmStorage {
    /// 按排序取全部餐厅
    pub async fn all_restaurants(
        &self,
        order: RestaurantOrder,
    ) -> Result<Vec<restaurant::Model>> {
        let query = restaurant::Entity::find();
        let query = match order {
            RestaurantOrder::Name => query.order_by_asc(restaurant::Column::Name),
            RestaurantOrder::ViewsDesc => query.order_by_desc(restaurant::Column::TotalViews),
            RestaurantOrder::CreatedDesc => query.order_by_desc(restaurant::Column::CreatedAt),
        };
        query.all(&self.db).await.map_err(Into::into)
    }

    /// 按 id 查餐厅
    pub async fn find_restaurant(&self, id: &str) -> Result<Option<restaurant::Model>> {
        restaurant::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// 按 id 或 slug 查餐厅（详情页两种寻址都支持）
    pub async fn find_restaurant_by_key(&self, key: &str) -> Result<Option<restaurant::Model>> {
        if let Some(found) = self.find_restaurant(key).await? {
            return Ok(Some(found));
        }
        restaurant::Entity::find()
            .filter(restaurant::Column::Slug.eq(key))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    /// slug 是否已被其他餐厅占用
    pub async fn slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
        let mut query =
            restaurant::Entity::find().filter(restaurant::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(restaurant::Column::Id.ne(id));
        }
        Ok(query.one(&self.db).await?.is_some())
    }

    /// 插入餐厅
    pub async fn insert_restaurant(
        &self,
        model: restaurant::ActiveModel,
    ) -> Result<restaurant::Model> {
        model.insert(&self.db).await.map_err(|e| {
            HalalmapError::database_operation(format!("Insert restaurant failed: {}", e))
        })
    }

    /// 更新餐厅
    pub async fn update_restaurant(
        &self,
        model: restaurant::ActiveModel,
    ) -> Result<restaurant::Model> {
        model.update(&self.db).await.map_err(|e| {
            HalalmapError::database_operation(format!("Update restaurant failed: {}", e))
        })
    }

    /// 删除餐厅，返回是否确实删除了行
    ///
    /// 删除不会级联触碰事件日志：事件对餐厅是弱引用。
    pub async fn delete_restaurant(&self, id: &str) -> Result<bool> {
        let result = restaurant::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
