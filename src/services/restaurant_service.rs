//! Restaurant service layer
//!
//! 目录 CRUD 与列表过滤。分析核心只消费其中两件事：
//! 按 id 查名字、按 id 原子加计数器（见 storage::backend）。

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{HalalmapError, Result};
use crate::storage::SeaOrmStorage;
use crate::storage::backend::RestaurantOrder;
use crate::utils::{slugify, url_validator::validate_url};
use migration::entities::restaurant;

/// 列表过滤方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    /// 按浏览量排序
    Trending,
    /// 最近 7 天新增
    New,
}

impl ListFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "trending" => Self::Trending,
            "new" => Self::New,
            _ => Self::All,
        }
    }
}

/// 创建餐厅的输入
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub slug: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub halal_status: Option<String>,
    pub halal_note: Option<String>,
    pub price_range: Option<i32>,
    pub rating: Option<f64>,
    pub photos: Option<Vec<String>>,
    pub cuisines: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub hours: Option<serde_json::Value>,
}

/// 更新餐厅的输入（未提供的字段保持不变）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub halal_status: Option<String>,
    pub halal_note: Option<String>,
    pub price_range: Option<i32>,
    pub rating: Option<f64>,
    pub photos: Option<Vec<String>>,
    pub cuisines: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub hours: Option<serde_json::Value>,
}

/// 餐厅服务
pub struct RestaurantService {
    storage: Arc<SeaOrmStorage>,
}

impl RestaurantService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 列表 + 搜索/过滤
    pub async fn list(
        &self,
        search: Option<&str>,
        filter: ListFilter,
    ) -> Result<Vec<restaurant::Model>> {
        let order = match filter {
            ListFilter::Trending => RestaurantOrder::ViewsDesc,
            ListFilter::New => RestaurantOrder::CreatedDesc,
            ListFilter::All => RestaurantOrder::Name,
        };

        let mut restaurants = self.storage.all_restaurants(order).await?;

        if filter == ListFilter::New {
            let week_ago = Utc::now() - Duration::days(7);
            restaurants.retain(|r| r.created_at >= week_ago);
        }

        if let Some(search) = search {
            let needle = search.to_lowercase();
            restaurants.retain(|r| matches_search(r, &needle));
        }

        debug!("Restaurant list: {} rows after filtering", restaurants.len());
        Ok(restaurants)
    }

    /// 按 id 或 slug 取详情
    pub async fn get(&self, key: &str) -> Result<Option<restaurant::Model>> {
        self.storage.find_restaurant_by_key(key).await
    }

    /// 创建餐厅
    pub async fn create(&self, new: NewRestaurant) -> Result<restaurant::Model> {
        if new.name.trim().is_empty() {
            return Err(HalalmapError::validation("Restaurant name cannot be empty"));
        }
        if let Some(ref website) = new.website {
            validate_url(website)
                .map_err(|e| HalalmapError::validation(format!("Invalid website: {}", e)))?;
        }

        let slug = match new.slug {
            Some(s) if !s.trim().is_empty() => s,
            _ => slugify(&new.name),
        };
        if slug.is_empty() {
            return Err(HalalmapError::validation(
                "Cannot derive a slug from the restaurant name",
            ));
        }
        if self.storage.slug_taken(&slug, None).await? {
            return Err(HalalmapError::validation(format!(
                "Slug '{}' is already taken",
                slug
            )));
        }

        let now = Utc::now();
        let model = restaurant::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(new.name),
            slug: Set(slug.clone()),
            address: Set(new.address),
            phone: Set(new.phone),
            website: Set(new.website),
            lat: Set(new.lat),
            lng: Set(new.lng),
            halal_status: Set(new
                .halal_status
                .unwrap_or_else(|| "self-reported".to_string())),
            halal_note: Set(new.halal_note),
            price_range: Set(new.price_range.unwrap_or(2).clamp(1, 4)),
            rating: Set(new.rating),
            photos: Set(string_list_json(new.photos)),
            cuisines: Set(string_list_json(new.cuisines)),
            features: Set(string_list_json(new.features)),
            hours: Set(new.hours.unwrap_or_else(|| serde_json::json!({}))),
            created_at: Set(now),
            updated_at: Set(now),
            total_views: Set(0),
            total_directions: Set(0),
            total_calls: Set(0),
            total_website_clicks: Set(0),
        };

        let created = self.storage.insert_restaurant(model).await?;
        info!("Restaurant created: {} ('{}')", created.id, slug);
        Ok(created)
    }

    /// 更新餐厅；不存在时返回 NotFound
    pub async fn update(&self, id: &str, update: RestaurantUpdate) -> Result<restaurant::Model> {
        let existing = self
            .storage
            .find_restaurant(id)
            .await?
            .ok_or_else(|| HalalmapError::not_found(format!("Restaurant '{}' not found", id)))?;

        if let Some(ref website) = update.website {
            validate_url(website)
                .map_err(|e| HalalmapError::validation(format!("Invalid website: {}", e)))?;
        }
        if let Some(ref slug) = update.slug
            && self.storage.slug_taken(slug, Some(id)).await?
        {
            return Err(HalalmapError::validation(format!(
                "Slug '{}' is already taken",
                slug
            )));
        }

        let mut model: restaurant::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(slug) = update.slug {
            model.slug = Set(slug);
        }
        if let Some(address) = update.address {
            model.address = Set(address);
        }
        if update.phone.is_some() {
            model.phone = Set(update.phone);
        }
        if update.website.is_some() {
            model.website = Set(update.website);
        }
        if let Some(lat) = update.lat {
            model.lat = Set(lat);
        }
        if let Some(lng) = update.lng {
            model.lng = Set(lng);
        }
        if let Some(halal_status) = update.halal_status {
            model.halal_status = Set(halal_status);
        }
        if update.halal_note.is_some() {
            model.halal_note = Set(update.halal_note);
        }
        if let Some(price_range) = update.price_range {
            model.price_range = Set(price_range.clamp(1, 4));
        }
        if update.rating.is_some() {
            model.rating = Set(update.rating);
        }
        if let Some(photos) = update.photos {
            model.photos = Set(string_list_json(Some(photos)));
        }
        if let Some(cuisines) = update.cuisines {
            model.cuisines = Set(string_list_json(Some(cuisines)));
        }
        if let Some(features) = update.features {
            model.features = Set(string_list_json(Some(features)));
        }
        if let Some(hours) = update.hours {
            model.hours = Set(hours);
        }
        model.updated_at = Set(Utc::now());

        let updated = self.storage.update_restaurant(model).await?;
        info!("Restaurant updated: {}", updated.id);
        Ok(updated)
    }

    /// 删除餐厅；返回是否存在过
    ///
    /// 删除后引用该 id 的事件照常摄取，计数器更新静默跳过。
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.storage.delete_restaurant(id).await?;
        if deleted {
            info!("Restaurant deleted: {}", id);
        }
        Ok(deleted)
    }
}

/// 搜索命中：名称 / 地址 / halal 备注 / 菜系
fn matches_search(r: &restaurant::Model, needle: &str) -> bool {
    if r.name.to_lowercase().contains(needle) || r.address.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(ref note) = r.halal_note
        && note.to_lowercase().contains(needle)
    {
        return true;
    }
    if let Some(cuisines) = r.cuisines.as_array() {
        return cuisines
            .iter()
            .filter_map(|c| c.as_str())
            .any(|c| c.to_lowercase().contains(needle));
    }
    false
}

fn string_list_json(list: Option<Vec<String>>) -> serde_json::Value {
    serde_json::Value::Array(
        list.unwrap_or_default()
            .into_iter()
            .map(serde_json::Value::String)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filter_parse() {
        assert_eq!(ListFilter::parse("trending"), ListFilter::Trending);
        assert_eq!(ListFilter::parse("new"), ListFilter::New);
        assert_eq!(ListFilter::parse("anything"), ListFilter::All);
    }

    #[test]
    fn test_string_list_json() {
        let json = string_list_json(Some(vec!["Turkish".to_string(), "Kebab".to_string()]));
        assert_eq!(json, serde_json::json!(["Turkish", "Kebab"]));
        assert_eq!(string_list_json(None), serde_json::json!([]));
    }
}
