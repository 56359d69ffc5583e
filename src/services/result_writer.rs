//! 结果写入服务 - 业务能力层
//!
//! 只负责"把结果集写成 CSV"能力，不关心流程

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::PropertyRecord;

/// 结果写入服务
///
/// 职责：
/// - 每次运行写一个 `property_data_<时间>.csv`
/// - 一行一条记录，一列一个字段
/// - 结果集为空时也写出只有表头的文件
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// 创建新的结果写入服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 本次运行的输出文件名
    pub fn file_name(run_started: DateTime<Local>) -> String {
        format!("property_data_{}.csv", run_started.format("%Y%m%d_%H%M%S"))
    }

    /// 写入结果集
    ///
    /// # 返回
    /// 返回写出的文件路径
    pub async fn write(
        &self,
        records: &[PropertyRecord],
        run_started: DateTime<Local>,
    ) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| {
                AppError::file_write_failed(self.output_dir.display().to_string(), source)
            })?;

        let path = self.output_dir.join(Self::file_name(run_started));
        debug!("写入 {} 条记录到 {}", records.len(), path.display());

        // csv 是同步 I/O，放到阻塞线程池
        let target = path.clone();
        let rows = records.to_vec();
        tokio::task::spawn_blocking(move || write_csv(&target, &rows))
            .await
            .map_err(|join_err| {
                AppError::file_write_failed(
                    path.display().to_string(),
                    std::io::Error::other(join_err),
                )
            })??;

        info!("💾 结果已保存至: {}", path.display());
        Ok(path)
    }
}

fn write_csv(path: &Path, records: &[PropertyRecord]) -> AppResult<()> {
    let csv_failed = |source: csv::Error| FileError::CsvFailed {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_failed)?;
    writer
        .write_record(PropertyRecord::csv_header())
        .map_err(csv_failed)?;
    for record in records {
        writer.write_record(record.csv_row()).map_err(csv_failed)?;
    }
    writer
        .flush()
        .map_err(|source| AppError::file_write_failed(path.display().to_string(), source))?;
    Ok(())
}
