// region:    --- Imports
use maya_bazaar::app::{self, AppState};
use maya_bazaar::backend::{Backend, FileStorage, MemoryBackend, PostgresBackend};
use maya_bazaar::bidding::commands::BidRules;
use maya_bazaar::config::Config;
use maya_bazaar::database::DatabaseManager;
use maya_bazaar::message_broker::{KafkaNotifier, LogNotifier, Notifier};
use maya_bazaar::session::{FileSnapshotStorage, SessionRegistry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    // 백엔드 선택 (DATABASE_URL이 없으면 메모리 백엔드)
    let backend: Arc<dyn Backend> = match &config.database_url {
        Some(url) => {
            let db_manager = Arc::new(DatabaseManager::new(url, config.db_max_connections).await?);

            // 데이터베이스 초기화
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

            let storage = FileStorage::new(&config.storage_dir, &config.public_storage_url);
            Arc::new(PostgresBackend::new(db_manager, storage))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 없음: 메모리 백엔드(데모 모드)로 실행",
                "Main"
            );
            Arc::new(MemoryBackend::new(&config.public_storage_url))
        }
    };

    // 이벤트 발행기 (Kafka 연결 실패 시 로그 발행기로 대체)
    let notifier: Arc<dyn Notifier> = match &config.kafka_brokers {
        Some(brokers) => match KafkaNotifier::connect(brokers).await {
            Ok(notifier) => {
                info!("{:<12} --> Kafka 초기화 성공", "Main");
                Arc::new(notifier)
            }
            Err(e) => {
                error!("{:<12} --> Kafka 초기화 실패: {}", "Main", e);
                Arc::new(LogNotifier)
            }
        },
        None => Arc::new(LogNotifier),
    };

    // 저장된 세션 복원
    let sessions = SessionRegistry::hydrate(Arc::new(FileSnapshotStorage::new(
        &config.session_dir,
    )))
    .await?;

    let state = AppState {
        backend,
        sessions: Arc::new(sessions),
        notifier,
        rules: BidRules::new(config.min_bid_increment),
    };

    // 라우터 설정 (업로드 파일은 /storage 로 제공)
    let routes_all = app::router(state, config.body_limit_bytes)
        .nest_service("/storage", ServeDir::new(&config.storage_dir));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
