//! 마켓 이벤트 발행
//! KAFKA_BROKERS가 설정되어 있으면 Kafka로, 아니면 로그로만 남긴다.
//! 발행 실패는 사용자 요청을 실패시키지 않는다.

// region:    --- Imports
use crate::auction::events::MarketEvent;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

// endregion: --- Imports

/// 이벤트 토픽
pub const EVENTS_TOPIC: &str = "events";

// region:    --- Notifier
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String>;
}

/// 실패를 경고 로그로 흡수하는 발행
pub async fn notify(notifier: &dyn Notifier, event: MarketEvent) {
    if let Err(e) = notifier.publish(&event).await {
        warn!(
            "{:<12} --> {} 이벤트 발행 실패: {}",
            "Notify",
            event.event_type(),
            e
        );
    }
}

/// 로그 전용 발행기
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String> {
        info!("{:<12} --> 이벤트: {:?}", "Notify", event);
        Ok(())
    }
}

// endregion: --- Notifier

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, String> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| format!("Producer creation error: {:?}", e))?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    /// 메시지 전송
    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), String> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| format!("Error sending message: {:?}", e))?;

        Ok(())
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Notifier
pub struct KafkaNotifier {
    producer: KafkaProducer,
}

impl KafkaNotifier {
    /// 프로듀서 생성 후 이벤트 토픽 준비
    pub async fn connect(brokers: &str) -> Result<Self, String> {
        let producer = KafkaProducer::new(brokers)?;
        create_topic(brokers, EVENTS_TOPIC, 5, 1).await?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn publish(&self, event: &MarketEvent) -> Result<(), String> {
        let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
        self.producer
            .send_message(EVENTS_TOPIC, &event.aggregate_id().to_string(), &payload)
            .await
    }
}

/// 토픽 생성 (이미 있으면 브로커가 에러 없이 무시하거나 개별 결과로 알려준다)
async fn create_topic(
    brokers: &str,
    topic_name: &str,
    num_partitions: i32,
    replication_factor: i32,
) -> Result<(), String> {
    info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

    let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .create()
        .map_err(|e| format!("AdminClient 생성 실패: {:?}", e))?;

    let new_topic = NewTopic::new(
        topic_name,
        num_partitions,
        TopicReplication::Fixed(replication_factor),
    );

    match admin_client
        .create_topics(&[new_topic], &AdminOptions::new())
        .await
    {
        Ok(_) => {
            info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic_name);
            Ok(())
        }
        Err(e) => {
            error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", e);
            Err(format!("토픽 생성 실패: {:?}", e))
        }
    }
}

// endregion: --- Kafka Notifier

// region:    --- Tests
#[cfg(test)]
pub mod tests {
    use super::*;
    use tokio::sync::Mutex;

    /// 발행된 이벤트를 모아두는 테스트용 발행기
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub events: Mutex<Vec<MarketEvent>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, event: &MarketEvent) -> Result<(), String> {
            self.events.lock().await.push(event.clone());
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn publish(&self, _event: &MarketEvent) -> Result<(), String> {
            Err("broker down".to_string())
        }
    }

    #[tokio::test]
    async fn test_notify_swallows_failures() {
        let event = MarketEvent::BidPlaced {
            product_id: uuid::Uuid::new_v4(),
            bidder_id: uuid::Uuid::new_v4(),
            amount: 10,
            timestamp: chrono::Utc::now(),
        };
        notify(&FailingNotifier, event.clone()).await;

        let recorder = RecordingNotifier::default();
        notify(&recorder, event.clone()).await;
        assert_eq!(*recorder.events.lock().await, vec![event]);
    }
}
// endregion: --- Tests
