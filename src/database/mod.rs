// 数据库模块
// 包含数据库实体定义、存储库接口以及 Postgres / 内存两种实现

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::AppError;

pub mod memory;
pub mod models; // 数据库实体定义
pub mod postgres;
pub mod repositories; // 存储库接口

// 重新导出常用类型，方便其他模块使用
pub use memory::MemoryDatabase;
pub use models::team::TeamMemberEntity;
pub use models::user::{NewUser, ProfileUpdate, UserEntity};
pub use postgres::PgDatabase;
pub use repositories::team::TeamRepository;
pub use repositories::user::UserRepository;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("unique constraint violated: {0}")]
    Duplicate(String),
    #[error("database unavailable: {0}")]
    Unavailable(String),
    #[error("invalid transaction state: {0}")]
    TransactionState(&'static str),
    #[error("connection already released")]
    Released,
}

/// 单个数据库连接，同一时间最多一个未结束的事务
#[async_trait]
pub trait DbConn: UserRepository + TeamRepository + Send {
    async fn begin(&mut self) -> Result<(), DbError>;

    async fn commit(&mut self) -> Result<(), DbError>;

    async fn rollback(&mut self) -> Result<(), DbError>;

    /// 归还连接，未结束的事务会被回滚。之后的任何操作都返回 `DbError::Released`
    async fn release(&mut self);
}

/// 连接来源
#[async_trait]
pub trait Database: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn DbConn>, DbError>;
}

/// 请求级数据库句柄，由拦截器在请求开始时创建、结束时归还
///
/// 连接的实现在 Drop 时也会归还，所以请求因 panic 中断时连接同样不会泄漏。
#[derive(Clone)]
pub struct DbHandle(Arc<Mutex<Box<dyn DbConn>>>);

impl DbHandle {
    pub fn new(conn: Box<dyn DbConn>) -> Self {
        Self(Arc::new(Mutex::new(conn)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, Box<dyn DbConn>> {
        self.0.lock().await
    }

    pub async fn release(&self) {
        self.0.lock().await.release().await;
    }
}

/// 结束 `begin` 开启的事务：`result` 成功则提交，失败则回滚并原样返回错误
pub async fn finish_transaction<T>(
    conn: &mut dyn DbConn,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            conn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.rollback().await {
                tracing::warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
