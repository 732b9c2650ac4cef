use std::sync::Arc;

use crate::{config::AppConfig, gateway::Gateway, storage::Store};

pub mod content;
pub mod conversation;
pub mod game;
mod lock;
mod permission;
mod stats;

use content::ContentFetcher;
use conversation::{ConversationStore, HomeworkFlow};
use game::{Dice, DuelEngine, GrowthEngine};

pub use lock::KeyedLocks;
pub use permission::PermissionGuard;
pub use stats::StatsService;

/// Heads and tails pictures for the coin flip.
#[derive(Clone, Debug)]
pub struct FlipImages {
    pub heads: String,
    pub tails: String,
}

#[derive(Clone)]
pub struct ServiceRegistry {
    pub store: Arc<dyn Store>,
    pub gateway: Arc<dyn Gateway>,
    pub content: Arc<dyn ContentFetcher>,
    pub dice: Arc<dyn Dice>,
    pub permissions: PermissionGuard,
    pub stats: StatsService,
    pub conversations: ConversationStore,
    pub homework: HomeworkFlow,
    pub growth: GrowthEngine,
    pub duel: DuelEngine,
    pub locks: KeyedLocks,
    pub flip_images: Option<FlipImages>,
}

impl ServiceRegistry {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        gateway: Arc<dyn Gateway>,
        content: Arc<dyn ContentFetcher>,
        dice: Arc<dyn Dice>,
    ) -> Self {
        info!("Initializing service registry");

        let conversations = ConversationStore::new(config.conversation.ttl_secs);
        let homework = HomeworkFlow::new(
            conversations.clone(),
            Arc::clone(&store),
            config.conversation.homework_subjects.clone(),
        );

        let flip_images = match (&config.content.flip_heads_url, &config.content.flip_tails_url) {
            (Some(heads), Some(tails)) => Some(FlipImages {
                heads: heads.clone(),
                tails: tails.clone(),
            }),
            _ => None,
        };

        let registry = Self {
            permissions: PermissionGuard::new(Arc::clone(&gateway), config.admin.operator_ids.clone()),
            stats: StatsService::new(Arc::clone(&store)),
            growth: GrowthEngine::new(config.growth.clone(), Arc::clone(&dice)),
            duel: DuelEngine::new(config.duel.clone(), Arc::clone(&dice)),
            locks: KeyedLocks::new(),
            conversations,
            homework,
            flip_images,
            store,
            gateway,
            content,
            dice,
        };

        info!("Service registry initialized");
        registry
    }
}
