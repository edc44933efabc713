use crate::settings::SettingsStore;
use database::config::LifecycleConfig;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub lifecycle: LifecycleConfig,
    pub settings: SettingsStore,
}
