use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::animation::Easing;

/// Live match score viewer
#[derive(Parser, Debug, Clone)]
#[command(name = "match-tracker", version, about)]
pub struct Config {
    /// Match feed endpoint
    #[arg(
        long,
        env = "FEED_URL",
        default_value = "https://app.ftoyd.com/fronttemp-service/fronttemp"
    )]
    pub feed_url: String,

    /// Feed polling interval in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS", default_value = "3000")]
    pub poll_interval_ms: u64,

    /// Per-request timeout for the feed in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Duration of a score counter animation in milliseconds
    #[arg(long, env = "ANIMATION_MS", default_value = "500")]
    pub animation_ms: u64,

    /// How often running animations are advanced and pushed, in milliseconds
    #[arg(long, env = "FRAME_INTERVAL_MS", default_value = "50")]
    pub frame_interval_ms: u64,

    /// Interpolation curve for score counters
    #[arg(long, env = "EASING", value_enum, default_value_t = Easing::EaseOutCubic)]
    pub easing: Easing,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8080")]
    pub dashboard_addr: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.feed_url)
            .map_err(|e| anyhow::anyhow!("feed_url is not a valid URL: {}", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("feed_url must use http or https");
        }
        if self.poll_interval_ms < 100 {
            anyhow::bail!("poll_interval_ms must be at least 100");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.animation_ms == 0 {
            anyhow::bail!("animation_ms must be positive");
        }
        if self.frame_interval_ms == 0 {
            anyhow::bail!("frame_interval_ms must be positive");
        }
        self.dashboard_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("dashboard_addr is not a socket address: {}", e))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
