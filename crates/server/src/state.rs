use crate::{config::Config, db::Database, openai::OpenAiClient};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub openai: OpenAiClient,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let openai = OpenAiClient::new(config.openai.clone());
        Self { db, config, openai }
    }
}
