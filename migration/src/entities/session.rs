//! Session entity: one browsing episode, keyed by the client session token

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// 客户端生成的会话 token，服务端只做 lookup-or-create
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub visitor_id: i64,
    pub started_at: DateTimeUtc,
    /// 由生命周期关闭调用写入；未关闭的会话保持 NULL
    pub ended_at: Option<DateTimeUtc>,
    /// 会话时长（秒），与 ended_at 一起写入
    pub duration: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub user_agent: String,
    /// desktop / mobile / tablet，创建时从 User-Agent 推导
    pub device: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    pub landing_page: Option<String>,
    pub page_views: i64,
    pub exit_page: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
