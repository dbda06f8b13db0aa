//! 业务服务层
//!
//! HTTP API 之下、存储之上的业务逻辑。

mod analytics_service;
mod restaurant_service;
mod tracking_service;

pub use analytics_service::{
    AnalyticsService, ChartsData, DailyBucket, DashboardData, DeviceCount, HourlyBucket,
    NameCount, NameValue, OverviewStats, RangeSelector, RecentEvent, TopRestaurant,
};
pub use restaurant_service::{
    ListFilter, NewRestaurant, RestaurantService, RestaurantUpdate,
};
pub use tracking_service::{IngestRequest, TrackingService};
