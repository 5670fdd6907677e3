use crate::config::AppConfig;
use crate::security::jwt::JwtKeys;
use crate::shared::utils::DbPool;

pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub jwt: JwtKeys,
}
