//! 实时事件分发
//!
//! 进程内使用 `tokio::sync::broadcast` 扇出给 WebSocket 订阅者；
//! 配置 `REDIS_URL` 后，事件同时经 Redis 频道在多个实例之间转发。

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::business::domain::DonationEvent;
use crate::business::services::EventPublisher;

/// 订阅断开后的重连间隔
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// 进程内事件总线
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DonationEvent>,
    relay: Option<Arc<RedisRelay>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, relay: None }
    }

    /// 挂载跨实例中继
    pub fn with_relay(mut self, relay: Arc<RedisRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DonationEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// 只在本实例内广播
    pub fn broadcast_local(&self, event: DonationEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!("📡 事件 {} 已推送给 {} 个订阅者", name, receivers),
            Err(_) => debug!("事件 {} 没有订阅者", name),
        }
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: DonationEvent) {
        if let Some(relay) = &self.relay {
            relay.forward(event.clone());
        }
        self.broadcast_local(event);
    }
}

/// 中继错误
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Redis错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("事件编码错误: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Redis 频道上的消息：带上来源实例，用于丢弃自身回声
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub origin: String,
    pub event: DonationEvent,
}

/// 基于 Redis PUBLISH/SUBSCRIBE 的跨实例中继
///
/// 所有发布都经过同一个队列和后台任务，保证事件按产生顺序到达其他实例
pub struct RedisRelay {
    client: redis::Client,
    outbound: mpsc::UnboundedSender<String>,
    channel: String,
    origin: String,
}

impl RedisRelay {
    pub async fn connect(redis_url: &str, channel: &str) -> Result<Self, RelayError> {
        let client = redis::Client::open(redis_url)?;
        let mut publisher = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, ()>(&mut publisher).await?;

        let (outbound, queue) = mpsc::unbounded_channel();
        tokio::spawn(publish_loop(publisher, channel.to_string(), queue));

        let relay = Self::with_outbound(client, channel, outbound);
        info!("🔗 Redis 事件中继已连接: channel={}, instance={}", channel, relay.origin);
        Ok(relay)
    }

    fn with_outbound(client: redis::Client, channel: &str, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            client,
            outbound,
            channel: channel.to_string(),
            origin: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// 放入发布队列，失败只记录日志
    pub fn forward(&self, event: DonationEvent) {
        let payload = match encode(&self.origin, event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("事件编码失败: {}", e);
                return;
            }
        };
        if self.outbound.send(payload).is_err() {
            warn!("⚠️ Redis 发布任务已停止，事件未转发");
        }
    }

    /// 订阅频道并把其他实例的事件转发到本地总线，断开后自动重连
    pub fn spawn_subscriber(self: &Arc<Self>, bus: EventBus) -> JoinHandle<()> {
        let relay = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if let Err(e) = relay.pump(&bus).await {
                    error!("Redis 订阅中断: {}，{} 秒后重试", e, RESUBSCRIBE_DELAY.as_secs());
                }
                tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            }
        })
    }

    async fn pump(&self, bus: &EventBus) -> Result<(), RelayError> {
        let mut pubsub = self.client.get_async_connection().await?.into_pubsub();
        pubsub.subscribe(&self.channel).await?;
        info!("👂 已订阅 Redis 事件频道: {}", self.channel);

        let mut messages = std::pin::pin!(pubsub.on_message());
        while let Some(message) = messages.next().await {
            let payload: String = message.get_payload()?;
            match decode_remote(&self.origin, &payload) {
                Ok(Some(event)) => bus.broadcast_local(event),
                Ok(None) => {}
                Err(e) => warn!("⚠️ 忽略无法解析的中继消息: {}", e),
            }
        }
        Ok(())
    }
}

/// 按入队顺序逐条 PUBLISH
async fn publish_loop(
    mut conn: redis::aio::MultiplexedConnection,
    channel: String,
    mut queue: mpsc::UnboundedReceiver<String>,
) {
    while let Some(payload) = queue.recv().await {
        let result = redis::cmd("PUBLISH")
            .arg(&channel)
            .arg(payload)
            .query_async::<_, i64>(&mut conn)
            .await;
        if let Err(e) = result {
            warn!("⚠️ Redis 事件发布失败: {}", e);
        }
    }
    debug!("Redis 发布队列已关闭");
}

fn encode(origin: &str, event: DonationEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RelayEnvelope {
        origin: origin.to_string(),
        event,
    })
}

/// 解析中继消息；来自本实例的消息返回 `None`
pub fn decode_remote(origin: &str, payload: &str) -> Result<Option<DonationEvent>, serde_json::Error> {
    let envelope: RelayEnvelope = serde_json::from_str(payload)?;
    if envelope.origin == origin {
        return Ok(None);
    }
    Ok(Some(envelope.event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::domain::{Donation, NewDonation, Title};

    fn event() -> DonationEvent {
        let donation = Donation::from_submission(
            uuid::Uuid::new_v4(),
            NewDonation::new(Title::Mr),
            chrono::Utc::now(),
        );
        DonationEvent::Added(donation)
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let event = event();

        bus.publish(event.clone());

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new(8);
        bus.publish(event());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_relay_drops_own_echo() {
        let event = event();
        let payload = encode("node-a", event.clone()).unwrap();

        assert_eq!(decode_remote("node-a", &payload).unwrap(), None);
        assert_eq!(decode_remote("node-b", &payload).unwrap(), Some(event));
    }

    #[tokio::test]
    async fn test_forwarded_events_are_queued_in_order() {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap();
        let (outbound, mut queue) = mpsc::unbounded_channel();
        let relay = RedisRelay::with_outbound(client, "donations", outbound);

        let mut donation = Donation::from_submission(
            uuid::Uuid::new_v4(),
            NewDonation::new(Title::Ms),
            chrono::Utc::now(),
        );
        let added = DonationEvent::Added(donation.clone());
        donation.attended_by = "Ravi".to_string();
        let updated = DonationEvent::Updated(donation);

        relay.forward(added.clone());
        relay.forward(updated.clone());

        let first = queue.recv().await.unwrap();
        let second = queue.recv().await.unwrap();
        assert_eq!(decode_remote("node-b", &first).unwrap(), Some(added));
        assert_eq!(decode_remote("node-b", &second).unwrap(), Some(updated));
        assert!(queue.try_recv().is_err());
    }

    #[test]
    fn test_relay_rejects_garbage() {
        assert!(decode_remote("node-a", "not json").is_err());
    }
}
