//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 1. **初始化**：打开浏览器会话、准备地理编码和结果写入
//! 2. **运行**：把会话交给 `DiscoveryOrchestrator`，拿回结果集
//! 3. **持久化**：结果集写成 CSV
//! 4. **清理**：无论写入是否成功都释放浏览器会话
//! 5. **统计**：输出本次运行的汇总
//! 6. **中断**：收到 Ctrl-C 时释放会话并以错误返回

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::{error, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::BrowserSession;
use crate::orchestrator::discovery::DiscoveryOrchestrator;
use crate::services::{NominatimGeocoder, ResultWriter};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    session: BrowserSession,
    geocoder: NominatimGeocoder,
    writer: ResultWriter,
    run_started: DateTime<Local>,
}

impl App {
    /// 初始化应用
    ///
    /// 浏览器会话打不开时直接返回错误，此时还没有任何结果可写。
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let session = BrowserSession::open(&config).await?;
        let geocoder = NominatimGeocoder::new(&config);
        let writer = ResultWriter::new(&config.output_dir);

        Ok(Self {
            config,
            session,
            geocoder,
            writer,
            run_started: Local::now(),
        })
    }

    /// 运行应用主逻辑，Ctrl-C 时中断
    ///
    /// # 返回
    /// 返回写出的 CSV 路径
    pub async fn run(self) -> AppResult<PathBuf> {
        self.run_until(ctrl_c()).await
    }

    /// 运行应用主逻辑，`shutdown` 先完成时中断
    ///
    /// 中断时不写结果，只释放会话并返回 `AppError::Interrupted`。
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> AppResult<PathBuf> {
        let report = {
            let orchestrator =
                DiscoveryOrchestrator::new(self.session.driver(), &self.geocoder, &self.config);
            until_shutdown(orchestrator.run(), shutdown).await
        };

        let Some(report) = report else {
            warn!("⚠️ 收到中断信号，停止运行");
            self.session.close().await;
            return Err(AppError::Interrupted);
        };

        let written = self.writer.write(&report.records, self.run_started).await;
        if let Err(e) = &written {
            error!("❌ 写入结果失败: {}", e);
        }

        self.session.close().await;

        print_final_stats(
            &report.stats,
            report.records.len(),
            written.as_ref().ok().map(PathBuf::as_path),
        );
        written
    }
}

/// 等待 Ctrl-C；信号注册失败时永不完成
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// `work` 先完成返回其结果，`shutdown` 先完成返回 `None`
async fn until_shutdown<T>(
    work: impl Future<Output = T>,
    shutdown: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        output = work => Some(output),
        _ = shutdown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_until_shutdown_returns_work_output() {
        let output = until_shutdown(async { 7 }, std::future::pending()).await;
        assert_eq!(output, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_until_shutdown_interrupts_long_work() {
        let work = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            7
        };
        let shutdown = tokio::time::sleep(Duration::from_secs(1));

        assert_eq!(until_shutdown(work, shutdown).await, None);
    }

    #[test]
    fn test_interrupted_is_an_error() {
        let err: anyhow::Error = AppError::Interrupted.into();
        assert_eq!(err.to_string(), "运行被中断");
    }
}
