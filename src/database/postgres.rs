use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{Executor, Postgres};

use crate::config::Config;
use crate::database::models::team::TeamMemberEntity;
use crate::database::models::user::{NewUser, ProfileUpdate, UserEntity};
use crate::database::{Database, DbConn, DbError, TeamRepository, UserRepository};

/// Postgres 连接池
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'shop_management';")
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Unavailable(format!("migration failed: {}", e)))
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn acquire(&self) -> Result<Box<dyn DbConn>, DbError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgConn {
            conn: Some(conn),
            in_tx: false,
        }))
    }
}

/// 从连接池取出的单个连接，事务通过 BEGIN/COMMIT/ROLLBACK 语句管理
pub struct PgConn {
    conn: Option<PoolConnection<Postgres>>,
    in_tx: bool,
}

impl PgConn {
    fn conn(&mut self) -> Result<&mut PgConnection, DbError> {
        self.conn.as_deref_mut().ok_or(DbError::Released)
    }
}

fn map_unique_violation(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DbError::Duplicate(db_err.message().to_string());
        }
    }
    DbError::Sqlx(err)
}

#[async_trait]
impl DbConn for PgConn {
    async fn begin(&mut self) -> Result<(), DbError> {
        if self.in_tx {
            return Err(DbError::TransactionState("transaction already open"));
        }
        self.conn()?.execute("BEGIN").await?;
        self.in_tx = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if !self.in_tx {
            return Err(DbError::TransactionState("no open transaction"));
        }
        self.conn()?.execute("COMMIT").await?;
        self.in_tx = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        if !self.in_tx {
            return Ok(());
        }
        self.conn()?.execute("ROLLBACK").await?;
        self.in_tx = false;
        Ok(())
    }

    async fn release(&mut self) {
        if let Err(e) = self.rollback().await {
            // 回滚失败的连接不能再放回池中
            tracing::warn!(error = %e, "rollback on release failed, closing connection");
            if let Some(conn) = self.conn.take() {
                drop(conn.detach());
            }
        }
        self.in_tx = false;
        self.conn.take();
    }
}

impl Drop for PgConn {
    fn drop(&mut self) {
        if self.in_tx {
            if let Some(conn) = self.conn.take() {
                tracing::warn!("connection dropped inside a transaction, closing it");
                drop(conn.detach());
            }
        }
    }
}

#[async_trait]
impl UserRepository for PgConn {
    async fn find_user_by_id(&mut self, id: &str) -> Result<Option<UserEntity>, DbError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, phone, password_hash, email, avatar_url,
                   create_time, modify_time, deleted_time
            FROM users
            WHERE id = $1 AND deleted_time IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(user)
    }

    async fn find_user_by_phone(&mut self, phone: &str) -> Result<Option<UserEntity>, DbError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, phone, password_hash, email, avatar_url,
                   create_time, modify_time, deleted_time
            FROM users
            WHERE phone = $1 AND deleted_time IS NULL
            "#,
        )
        .bind(phone)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(user)
    }

    async fn find_users_by_ids(&mut self, ids: &[String]) -> Result<Vec<UserEntity>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, phone, password_hash, email, avatar_url,
                   create_time, modify_time, deleted_time
            FROM users
            WHERE id = ANY($1) AND deleted_time IS NULL
            "#,
        )
        .bind(ids)
        .fetch_all(self.conn()?)
        .await?;

        Ok(users)
    }

    async fn insert_user(&mut self, user: &NewUser) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, phone, password_hash, create_time, modify_time)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .execute(self.conn()?)
        .await
        .map_err(map_unique_violation)?;

        tracing::info!(user_id = %user.id, "Created user");
        Ok(())
    }

    async fn update_password(&mut self, id: &str, password_hash: &str) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, modify_time = NOW()
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn update_profile(&mut self, id: &str, profile: &ProfileUpdate) -> Result<(), DbError> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $1, email = $2, phone = $3, avatar_url = $4, modify_time = NOW()
            WHERE id = $5
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.avatar_url)
        .bind(id)
        .execute(self.conn()?)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }
}

#[async_trait]
impl TeamRepository for PgConn {
    async fn list_sub_users(
        &mut self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TeamMemberEntity>, DbError> {
        let members = sqlx::query_as::<_, TeamMemberEntity>(
            r#"
            SELECT id, user_id, sub_user_id, create_time, modify_time
            FROM user_team
            WHERE user_id = $1
            ORDER BY create_time DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.conn()?)
        .await?;

        Ok(members)
    }

    async fn count_sub_users(&mut self, user_id: &str) -> Result<i64, DbError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_team WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.conn()?)
            .await?;

        Ok(total)
    }

    async fn add_sub_user(&mut self, member: &TeamMemberEntity) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO user_team (id, user_id, sub_user_id, create_time, modify_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&member.id)
        .bind(&member.user_id)
        .bind(&member.sub_user_id)
        .bind(member.create_time)
        .bind(member.modify_time)
        .execute(self.conn()?)
        .await?;

        Ok(())
    }

    async fn del_sub_user(&mut self, user_id: &str, id: &str) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM user_team WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.conn()?)
            .await?;

        Ok(result.rows_affected())
    }
}
