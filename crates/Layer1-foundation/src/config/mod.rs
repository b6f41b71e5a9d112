//! Config - 통합 설정 관리
//!
//! - `gateway.rs` - GatewayConfig (타임아웃, 검색, 카탈로그 정책, 토큰 예산)

mod gateway;

pub use gateway::{
    BudgetSettings, CatalogSettings, GatewayConfig, PolicySettings, SearchSettings,
    DEFAULT_PROTOCOL_VERSION, GATEWAY_CONFIG_FILE, GATEWAY_CONFIG_TOML,
};
