//! Donation Hub Rust 服务主入口

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donation_hub_rust::business::services::{DonationService, DonationStore, NotificationService};
use donation_hub_rust::infrastructure::config::StoreBackend;
use donation_hub_rust::infrastructure::mail::{MailTransport, SmtpMailer, UnconfiguredMailer};
use donation_hub_rust::infrastructure::{EventBus, MemoryDonationStore, RedisRelay};
use donation_hub_rust::{create_routes, AppState, Config, Database};

/// 命令行参数，优先级高于环境变量
#[derive(Debug, Parser)]
#[command(name = "donation-hub-rust", version, about = "捐赠预约管理服务")]
struct Cli {
    /// 监听地址
    #[arg(long)]
    host: Option<String>,

    /// 监听端口
    #[arg(long, short)]
    port: Option<u16>,

    /// 存储后端: postgres 或 memory
    #[arg(long)]
    store: Option<StoreBackend>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(store) = self.store {
            config.store_backend = store;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志 - 默认INFO等级
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "donation_hub_rust=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载环境变量
    dotenv::dotenv().ok();

    info!("🚀 启动 Donation Hub Rust 服务");

    // 加载配置
    let mut config = Config::load()?;
    Cli::parse().apply(&mut config);
    info!("✅ 配置加载成功");

    // 初始化存储
    let (store, database): (Arc<dyn DonationStore>, Option<Database>) = match config.store_backend {
        StoreBackend::Postgres => {
            let database = Database::new(&config).await?;
            info!("✅ 数据库连接成功");
            database.run_migrations().await?;
            (Arc::new(database.donations.clone()), Some(database))
        }
        StoreBackend::Memory => {
            warn!("⚠️ 使用内存存储，重启后数据将丢失");
            (Arc::new(MemoryDonationStore::new()), None)
        }
    };

    // 初始化事件总线和跨实例中继
    let mut bus = EventBus::new(config.realtime.bus_capacity);
    if let Some(redis_url) = &config.realtime.redis_url {
        match RedisRelay::connect(redis_url, &config.realtime.channel).await {
            Ok(relay) => {
                let relay = Arc::new(relay);
                bus = bus.with_relay(Arc::clone(&relay));
                relay.spawn_subscriber(bus.clone());
                info!("✅ Redis 事件中继已启用");
            }
            Err(e) => warn!("⚠️ Redis 事件中继不可用，仅使用进程内广播: {}", e),
        }
    }

    // 初始化邮件投递
    let mailer: Arc<dyn MailTransport> = if config.mail.has_credentials() {
        info!("✅ SMTP 邮件投递已配置: {}:{}", config.mail.smtp_host, config.mail.smtp_port);
        Arc::new(SmtpMailer::new(&config.mail)?)
    } else {
        warn!("⚠️ 未配置邮件凭据，邮件发送将失败");
        Arc::new(UnconfiguredMailer)
    };

    // 初始化业务服务
    let donations = Arc::new(DonationService::new(store.clone(), Arc::new(bus.clone())));
    let notifications = Arc::new(NotificationService::new(store, mailer, config.mail.batch_size));

    // 创建路由
    let app = create_routes(AppState {
        donations,
        notifications,
        bus,
    });
    info!("✅ 路由创建成功");

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 服务器启动成功，监听地址: {}", address);

    axum::serve(listener, app)
        .tcp_nodelay(true)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("🛑 接收到关闭信号，正在优雅关闭服务器...");
        })
        .await?;

    if let Some(database) = database {
        database.close().await;
    }

    Ok(())
}
