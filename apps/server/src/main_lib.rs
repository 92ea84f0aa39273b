use std::sync::Arc;

use crate::{ai_environment::ServerAiEnvironment, config::Config};
use promptdeck_ai::{
    ChatConfig, ChatService, CompletionClientTrait, CompletionConfig, OpenAiCompletionClient,
};
use promptdeck_core::{
    conversations::{ConversationRepositoryTrait, ConversationService, ConversationServiceTrait},
    prompts::{PromptService, PromptServiceTrait},
};
use promptdeck_storage_sqlite::{
    conversations::ConversationRepository,
    db::{self, write_actor},
    prompts::PromptRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub prompt_service: Arc<dyn PromptServiceTrait>,
    pub conversation_service: Arc<dyn ConversationServiceTrait>,
    pub chat_service: Arc<ChatService<ServerAiEnvironment>>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("PD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Builds the state with the OpenAI completion client described by `config`.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    let completion_client = Arc::new(OpenAiCompletionClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        CompletionConfig::default(),
    ));
    build_state_with_completion_client(config, completion_client).await
}

pub async fn build_state_with_completion_client(
    config: &Config,
    completion_client: Arc<dyn CompletionClientTrait>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let prompt_repository = Arc::new(PromptRepository::new(pool.clone(), writer.clone()));
    let prompt_service: Arc<dyn PromptServiceTrait> =
        Arc::new(PromptService::new(prompt_repository));

    let conversation_repository: Arc<dyn ConversationRepositoryTrait> =
        Arc::new(ConversationRepository::new(pool.clone(), writer.clone()));
    let conversation_service: Arc<dyn ConversationServiceTrait> = Arc::new(
        ConversationService::new(conversation_repository.clone()),
    );

    let ai_environment = Arc::new(ServerAiEnvironment::new(
        conversation_repository,
        completion_client,
    ));
    let chat_config = ChatConfig {
        serialize_turns: config.serialize_turns,
        ..ChatConfig::default()
    };
    let chat_service = Arc::new(ChatService::new(ai_environment, chat_config));

    Ok(Arc::new(AppState {
        prompt_service,
        conversation_service,
        chat_service,
        db_path,
    }))
}
