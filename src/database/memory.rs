use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::database::models::team::TeamMemberEntity;
use crate::database::models::user::{NewUser, ProfileUpdate, UserEntity};
use crate::database::{Database, DbConn, DbError, TeamRepository, UserRepository};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<String, UserEntity>,
    /// 按插入顺序保存
    teams: Vec<TeamMemberEntity>,
}

/// 进程内数据库，供本地开发和测试使用
///
/// 每个连接在事务内记录撤销日志，`rollback` 只撤销本连接的写入。
/// 事务内的写入对其他连接立即可见，没有隔离。
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    open_connections: Arc<AtomicUsize>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尚未归还的连接数
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().users.len()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn acquire(&self) -> Result<Box<dyn DbConn>, DbError> {
        self.open_connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConn {
            tables: self.tables.clone(),
            open_connections: self.open_connections.clone(),
            journal: None,
            released: false,
        }))
    }
}

/// 撤销一次写入所需的信息
enum Undo {
    /// 写入前的用户，`None` 表示新插入
    User {
        id: String,
        previous: Option<UserEntity>,
    },
    TeamAdded {
        id: String,
    },
    TeamRemoved {
        index: usize,
        member: TeamMemberEntity,
    },
}

pub struct MemoryConn {
    tables: Arc<Mutex<Tables>>,
    open_connections: Arc<AtomicUsize>,
    /// 未结束事务的撤销日志
    journal: Option<Vec<Undo>>,
    released: bool,
}

impl MemoryConn {
    fn tables(&self) -> Result<parking_lot::MutexGuard<'_, Tables>, DbError> {
        if self.released {
            return Err(DbError::Released);
        }
        Ok(self.tables.lock())
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(undo);
        }
    }

    fn undo_journal(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let mut tables = self.tables.lock();
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::User {
                    id,
                    previous: Some(user),
                } => {
                    tables.users.insert(id, user);
                }
                Undo::User { id, previous: None } => {
                    tables.users.remove(&id);
                }
                Undo::TeamAdded { id } => tables.teams.retain(|m| m.id != id),
                Undo::TeamRemoved { index, member } => {
                    let index = index.min(tables.teams.len());
                    tables.teams.insert(index, member);
                }
            }
        }
    }

    fn close(&mut self) {
        if !self.released {
            self.undo_journal();
            self.released = true;
            self.open_connections.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MemoryConn {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl DbConn for MemoryConn {
    async fn begin(&mut self) -> Result<(), DbError> {
        if self.released {
            return Err(DbError::Released);
        }
        if self.journal.is_some() {
            return Err(DbError::TransactionState("transaction already open"));
        }
        self.journal = Some(Vec::new());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        if self.released {
            return Err(DbError::Released);
        }
        match self.journal.take() {
            Some(_) => Ok(()),
            None => Err(DbError::TransactionState("no open transaction")),
        }
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        if self.released {
            return Err(DbError::Released);
        }
        self.undo_journal();
        Ok(())
    }

    async fn release(&mut self) {
        self.close();
    }
}

#[async_trait]
impl UserRepository for MemoryConn {
    async fn find_user_by_id(&mut self, id: &str) -> Result<Option<UserEntity>, DbError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .get(id)
            .filter(|u| u.deleted_time.is_none())
            .cloned())
    }

    async fn find_user_by_phone(&mut self, phone: &str) -> Result<Option<UserEntity>, DbError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.phone == phone && u.deleted_time.is_none())
            .cloned())
    }

    async fn find_users_by_ids(&mut self, ids: &[String]) -> Result<Vec<UserEntity>, DbError> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .filter(|u| u.deleted_time.is_none())
            .cloned()
            .collect())
    }

    async fn insert_user(&mut self, user: &NewUser) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.phone == user.phone) {
            return Err(DbError::Duplicate(format!("phone {}", user.phone)));
        }
        let now = Utc::now();
        tables.users.insert(
            user.id.clone(),
            UserEntity {
                id: user.id.clone(),
                name: user.name.clone(),
                phone: user.phone.clone(),
                password_hash: user.password_hash.clone(),
                email: String::new(),
                avatar_url: String::new(),
                create_time: now,
                modify_time: now,
                deleted_time: None,
            },
        );
        drop(tables);
        self.record(Undo::User {
            id: user.id.clone(),
            previous: None,
        });
        Ok(())
    }

    async fn update_password(&mut self, id: &str, password_hash: &str) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        let Some(user) = tables.users.get_mut(id) else {
            return Ok(());
        };
        let previous = user.clone();
        user.password_hash = password_hash.to_string();
        user.modify_time = Utc::now();
        drop(tables);
        self.record(Undo::User {
            id: id.to_string(),
            previous: Some(previous),
        });
        Ok(())
    }

    async fn update_profile(&mut self, id: &str, profile: &ProfileUpdate) -> Result<(), DbError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .values()
            .any(|u| u.id != id && u.phone == profile.phone)
        {
            return Err(DbError::Duplicate(format!("phone {}", profile.phone)));
        }
        let Some(user) = tables.users.get_mut(id) else {
            return Ok(());
        };
        let previous = user.clone();
        user.name = profile.name.clone();
        user.email = profile.email.clone();
        user.phone = profile.phone.clone();
        user.avatar_url = profile.avatar_url.clone();
        user.modify_time = Utc::now();
        drop(tables);
        self.record(Undo::User {
            id: id.to_string(),
            previous: Some(previous),
        });
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for MemoryConn {
    async fn list_sub_users(
        &mut self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<TeamMemberEntity>, DbError> {
        let tables = self.tables()?;
        let mut members: Vec<TeamMemberEntity> = tables
            .teams
            .iter()
            .rev()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(members
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_sub_users(&mut self, user_id: &str) -> Result<i64, DbError> {
        let tables = self.tables()?;
        Ok(tables.teams.iter().filter(|m| m.user_id == user_id).count() as i64)
    }

    async fn add_sub_user(&mut self, member: &TeamMemberEntity) -> Result<(), DbError> {
        self.tables()?.teams.push(member.clone());
        self.record(Undo::TeamAdded {
            id: member.id.clone(),
        });
        Ok(())
    }

    async fn del_sub_user(&mut self, user_id: &str, id: &str) -> Result<u64, DbError> {
        let mut tables = self.tables()?;
        let mut removed = Vec::new();
        while let Some(index) = tables
            .teams
            .iter()
            .position(|m| m.id == id && m.user_id == user_id)
        {
            let member = tables.teams.remove(index);
            removed.push(Undo::TeamRemoved { index, member });
        }
        drop(tables);

        let count = removed.len() as u64;
        for undo in removed {
            self.record(undo);
        }
        Ok(count)
    }
}
