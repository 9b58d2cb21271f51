// Redis implementation of the store

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Script,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    log::Logger,
    log_info,
    models::{Attachment, Category, Project, Report, User, UserPatch},
    sequence::{number_prefix, pick_latest_number},
    store::{RecordKind, Store, StoreError},
};

use super::{RedisConfiguration, RedisKeys};

const USER_DOC_FIELD: &str = "doc";
const USER_SESSION_FIELD: &str = "session";

/// Merges a JSON patch (ARGV[2]) into the JSON document stored in
/// field ARGV[1] of hash KEYS[1], then sets the remaining ARGV pairs
/// as plain fields of the same hash. Returns the merged document,
/// or nil if the field does not exist.
const MERGE_DOCUMENT_SCRIPT: &str = r#"
local doc = redis.call('HGET', KEYS[1], ARGV[1])
if not doc then
    return false
end
local value = cjson.decode(doc)
for k, v in pairs(cjson.decode(ARGV[2])) do
    value[k] = v
end
doc = cjson.encode(value)
redis.call('HSET', KEYS[1], ARGV[1], doc)
for i = 3, #ARGV, 2 do
    redis.call('HSET', KEYS[1], ARGV[i], ARGV[i + 1])
end
return doc
"#;

/// Store backed by a Redis server
///
/// Unique indexes are hashes written with HSETNX.
/// Sequence counters are plain integer keys advanced with INCR.
/// Partial updates run as one server-side script, so they never
/// overwrite fields they do not change.
pub struct RedisStore {
    manager: ConnectionManager,
    keys: RedisKeys,
    merge_script: Script,
}

fn to_doc<T: Serialize>(value: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

fn from_doc<T: DeserializeOwned>(doc: &str) -> Result<T, StoreError> {
    Ok(serde_json::from_str(doc)?)
}

fn parse_docs<T: DeserializeOwned>(docs: Vec<String>) -> Result<Vec<T>, StoreError> {
    docs.iter().map(|d| from_doc(d)).collect()
}

impl RedisStore {
    /// Connects to the Redis server
    pub async fn connect(logger: &Logger, config: &RedisConfiguration) -> Result<RedisStore, StoreError> {
        let client = redis::Client::open(config.get_redis_url())?;

        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(3)
            .set_connection_timeout(Duration::from_secs(5));

        let manager = client
            .get_connection_manager_with_config(manager_config)
            .await?;

        log_info!(
            logger,
            format!("Connected: {}:{} (db {})", config.host, config.port, config.db)
        );

        Ok(RedisStore {
            manager,
            keys: RedisKeys::new(&config.key_prefix),
            merge_script: Script::new(MERGE_DOCUMENT_SCRIPT),
        })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    async fn load_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn();
        let fields: HashMap<String, String> = conn.hgetall(self.keys.user(id)).await?;

        let doc = match fields.get(USER_DOC_FIELD) {
            Some(d) => d,
            None => return Ok(None),
        };

        let mut user: User = from_doc(doc)?;
        user.active_session = fields.get(USER_SESSION_FIELD).cloned();

        Ok(Some(user))
    }

    /// Runs the merge script on a document stored in a hash field
    ///
    /// `extra` holds plain hash fields written in the same atomic step
    async fn merge_document(
        &self,
        key: &str,
        field: &str,
        patch: &str,
        extra: &[(&str, &str)],
    ) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn();
        let mut invocation = self.merge_script.prepare_invoke();

        invocation.key(key).arg(field).arg(patch);

        for (name, value) in extra {
            invocation.arg(*name).arg(*value);
        }

        let doc: Option<String> = invocation.invoke_async(&mut conn).await?;

        Ok(doc)
    }

    /// Claims the index entry of a unique value
    async fn claim_unique_entry(
        &self,
        index_key: &str,
        value: &str,
        id: &str,
        what: &str,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let owner: Option<String> = conn.hget(index_key, value).await?;

        if owner.as_deref() == Some(id) {
            return Ok(());
        }

        let claimed: bool = conn.hset_nx(index_key, value, id).await?;

        if !claimed {
            return Err(StoreError::Conflict(format!("{} {}", what, value)));
        }

        Ok(())
    }

    /// Moves a unique index entry from an old value to a new one
    ///
    /// Fails with Conflict if the new value is taken by another entity
    async fn move_unique_entry(
        &self,
        index_key: &str,
        old_value: &str,
        new_value: &str,
        id: &str,
        what: &str,
    ) -> Result<(), StoreError> {
        if old_value == new_value {
            return Ok(());
        }

        let mut conn = self.conn();
        let claimed: bool = conn.hset_nx(index_key, new_value, id).await?;

        if !claimed {
            return Err(StoreError::Conflict(format!("{} {}", what, new_value)));
        }

        let _: () = conn.hdel(index_key, old_value).await?;

        Ok(())
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut conn = self.conn();

        let email_claimed: bool = conn
            .hset_nx(self.keys.user_emails(), &user.email, &user.id)
            .await?;

        if !email_claimed {
            return Err(StoreError::Conflict(format!("email {}", user.email)));
        }

        let name_claimed: bool = conn
            .hset_nx(self.keys.user_names(), &user.username, &user.id)
            .await?;

        if !name_claimed {
            let _: () = conn.hdel(self.keys.user_emails(), &user.email).await?;
            return Err(StoreError::Conflict(format!("username {}", user.username)));
        }

        let _: () = conn
            .hset(self.keys.user(&user.id), USER_DOC_FIELD, to_doc(user)?)
            .await?;
        let _: () = conn.sadd(self.keys.users(), &user.id).await?;

        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.load_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn();
        let id: Option<String> = conn.hget(self.keys.user_emails(), email).await?;

        match id {
            Some(id) => self.load_user(&id).await,
            None => Ok(None),
        }
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn();
        let id: Option<String> = conn.hget(self.keys.user_names(), username).await?;

        match id {
            Some(id) => self.load_user(&id).await,
            None => Ok(None),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.smembers(self.keys.users()).await?;

        let mut users = Vec::with_capacity(ids.len());

        for id in ids {
            if let Some(user) = self.load_user(&id).await? {
                users.push(user);
            }
        }

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(users)
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        let existing = match self.load_user(id).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if let Some(email) = &patch.email {
            self.move_unique_entry(&self.keys.user_emails(), &existing.email, email, id, "email")
                .await?;
        }

        if let Some(username) = &patch.username {
            self.move_unique_entry(
                &self.keys.user_names(),
                &existing.username,
                username,
                id,
                "username",
            )
            .await?;
        }

        let merged = self
            .merge_document(&self.keys.user(id), USER_DOC_FIELD, &to_doc(patch)?, &[])
            .await?;

        match merged {
            Some(_) => self.load_user(id).await,
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        let existing = match self.load_user(id).await? {
            Some(u) => u,
            None => return Ok(false),
        };

        let mut conn = self.conn();

        let _: () = conn.del(self.keys.user(id)).await?;
        let _: () = conn.srem(self.keys.users(), id).await?;
        let _: () = conn.hdel(self.keys.user_emails(), &existing.email).await?;
        let _: () = conn.hdel(self.keys.user_names(), &existing.username).await?;

        Ok(true)
    }

    async fn set_active_session(
        &self,
        user_id: &str,
        marker: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn();
        let key = self.keys.user(user_id);

        let exists: bool = conn.hexists(&key, USER_DOC_FIELD).await?;

        if !exists {
            return Ok(false);
        }

        match marker {
            Some(m) => {
                let _: () = conn.hset(&key, USER_SESSION_FIELD, m).await?;
            }
            None => {
                let _: () = conn.hdel(&key, USER_SESSION_FIELD).await?;
            }
        }

        Ok(true)
    }

    async fn record_login(
        &self,
        user_id: &str,
        marker: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let patch = UserPatch {
            last_login: Some(at),
            ..Default::default()
        };

        let merged = self
            .merge_document(
                &self.keys.user(user_id),
                USER_DOC_FIELD,
                &to_doc(&patch)?,
                &[(USER_SESSION_FIELD, marker)],
            )
            .await?;

        match merged {
            Some(_) => self.load_user(user_id).await,
            None => Ok(None),
        }
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let _: () = conn
            .hset(self.keys.projects(), &project.id, to_doc(project)?)
            .await?;

        Ok(())
    }

    async fn find_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let mut conn = self.conn();
        let doc: Option<String> = conn.hget(self.keys.projects(), id).await?;

        doc.map(|d| from_doc(&d)).transpose()
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let mut conn = self.conn();
        let docs: Vec<String> = conn.hvals(self.keys.projects()).await?;

        let mut projects: Vec<Project> = parse_docs(docs)?;
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(projects)
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let exists: bool = conn.hexists(self.keys.projects(), &project.id).await?;

        if exists {
            let _: () = conn
                .hset(self.keys.projects(), &project.id, to_doc(project)?)
                .await?;
        }

        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn();
        let removed: u32 = conn.hdel(self.keys.projects(), id).await?;

        Ok(removed > 0)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut conn = self.conn();

        let claimed: bool = conn
            .hset_nx(self.keys.category_names(), &category.name, &category.id)
            .await?;

        if !claimed {
            return Err(StoreError::Conflict(format!("category {}", category.name)));
        }

        let _: () = conn
            .hset(self.keys.categories(), &category.id, to_doc(category)?)
            .await?;

        Ok(())
    }

    async fn find_category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        let mut conn = self.conn();
        let doc: Option<String> = conn.hget(self.keys.categories(), id).await?;

        doc.map(|d| from_doc(&d)).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut conn = self.conn();
        let docs: Vec<String> = conn.hvals(self.keys.categories()).await?;

        let mut categories: Vec<Category> = parse_docs(docs)?;
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(categories)
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        let existing = match self.find_category(&category.id).await? {
            Some(c) => c,
            None => return Ok(()),
        };

        self.move_unique_entry(
            &self.keys.category_names(),
            &existing.name,
            &category.name,
            &category.id,
            "category",
        )
        .await?;

        let mut conn = self.conn();
        let _: () = conn
            .hset(self.keys.categories(), &category.id, to_doc(category)?)
            .await?;

        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        let existing = match self.find_category(id).await? {
            Some(c) => c,
            None => return Ok(false),
        };

        let mut conn = self.conn();

        let _: () = conn.hdel(self.keys.categories(), id).await?;
        let _: () = conn.hdel(self.keys.category_names(), &existing.name).await?;

        Ok(true)
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        let mut conn = self.conn();

        let claimed: bool = conn
            .hset_nx(self.keys.report_numbers(), &report.report_number, &report.id)
            .await?;

        if !claimed {
            return Err(StoreError::DuplicateIdentifier(report.report_number.clone()));
        }

        let created = report.created_at.timestamp_millis();

        let _: () = redis::pipe()
            .atomic()
            .set(self.keys.report(&report.id), to_doc(report)?)
            .ignore()
            .zadd(self.keys.reports(), &report.id, created)
            .ignore()
            .zadd(
                self.keys.report_prefix(number_prefix(&report.report_number)),
                &report.report_number,
                created,
            )
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let mut conn = self.conn();
        let doc: Option<String> = conn.get(self.keys.report(id)).await?;

        doc.map(|d| from_doc(&d)).transpose()
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.zrevrange(self.keys.reports(), 0, -1).await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.keys.report(id)).collect();
        let docs: Vec<Option<String>> = conn.mget(keys).await?;

        parse_docs(docs.into_iter().flatten().collect())
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        let mut conn = self.conn();
        let key = self.keys.report(&report.id);
        let exists: bool = conn.exists(&key).await?;

        if exists {
            let _: () = conn.set(&key, to_doc(report)?).await?;
        }

        Ok(())
    }

    async fn delete_report(&self, id: &str) -> Result<bool, StoreError> {
        let existing = match self.find_report(id).await? {
            Some(r) => r,
            None => return Ok(false),
        };

        let mut conn = self.conn();
        let attachment_ids: Vec<String> = conn.smembers(self.keys.attachments(id)).await?;

        let mut pipe = redis::pipe();

        pipe.atomic()
            .del(self.keys.report(id))
            .ignore()
            .zrem(self.keys.reports(), id)
            .ignore()
            .zrem(
                self.keys.report_prefix(number_prefix(&existing.report_number)),
                &existing.report_number,
            )
            .ignore()
            .hdel(self.keys.report_numbers(), &existing.report_number)
            .ignore()
            .del(self.keys.attachments(id))
            .ignore();

        for attachment_id in attachment_ids.iter() {
            pipe.del(self.keys.attachment(attachment_id)).ignore();
        }

        let _: () = pipe.query_async(&mut conn).await?;

        Ok(true)
    }

    async fn latest_report_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn();
        let key = self.keys.report_prefix(prefix);

        let newest: Vec<(String, f64)> = conn.zrevrange_withscores(&key, 0, 0).await?;

        let score = match newest.first() {
            Some((_, score)) => *score,
            None => return Ok(None),
        };

        // Every number created in the same millisecond
        let tied: Vec<String> = conn.zrangebyscore(&key, score, score).await?;

        Ok(pick_latest_number(
            prefix,
            tied.iter().map(|number| (number.as_str(), score as i64)),
        ))
    }

    async fn current_sequence(&self, prefix: &str) -> Result<Option<u64>, StoreError> {
        let mut conn = self.conn();
        let value: Option<u64> = conn.get(self.keys.sequence(prefix)).await?;

        Ok(value)
    }

    async fn increment_sequence(&self, prefix: &str, floor: u64) -> Result<u64, StoreError> {
        let mut conn = self.conn();
        let key = self.keys.sequence(prefix);

        let (value,): (u64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(floor)
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        Ok(value)
    }

    async fn add_attachment(&self, attachment: &Attachment) -> Result<(), StoreError> {
        let mut conn = self.conn();

        let _: () = redis::pipe()
            .atomic()
            .set(self.keys.attachment(&attachment.id), to_doc(attachment)?)
            .ignore()
            .sadd(self.keys.attachments(&attachment.report_id), &attachment.id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn find_attachment(&self, id: &str) -> Result<Option<Attachment>, StoreError> {
        let mut conn = self.conn();
        let doc: Option<String> = conn.get(self.keys.attachment(id)).await?;

        doc.map(|d| from_doc(&d)).transpose()
    }

    async fn list_attachments(&self, report_id: &str) -> Result<Vec<Attachment>, StoreError> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.smembers(self.keys.attachments(report_id)).await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.keys.attachment(id)).collect();
        let docs: Vec<Option<String>> = conn.mget(keys).await?;

        let mut attachments: Vec<Attachment> = parse_docs(docs.into_iter().flatten().collect())?;
        attachments.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));

        Ok(attachments)
    }

    async fn delete_attachment(&self, id: &str) -> Result<bool, StoreError> {
        let existing = match self.find_attachment(id).await? {
            Some(a) => a,
            None => return Ok(false),
        };

        let mut conn = self.conn();

        let _: () = redis::pipe()
            .atomic()
            .del(self.keys.attachment(id))
            .ignore()
            .srem(self.keys.attachments(&existing.report_id), id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(true)
    }

    async fn insert_document(&self, kind: RecordKind, id: &str, doc: &Value) -> Result<(), StoreError> {
        if let Some(value) = kind.unique_value(doc) {
            self.claim_unique_entry(&self.keys.record_index(kind), value, id, kind.as_str())
                .await?;
        }

        let mut conn = self.conn();
        let _: () = conn
            .hset(self.keys.records(kind), id, serde_json::to_string(doc)?)
            .await?;

        Ok(())
    }

    async fn find_document(&self, kind: RecordKind, id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn();
        let doc: Option<String> = conn.hget(self.keys.records(kind), id).await?;

        doc.map(|d| from_doc(&d)).transpose()
    }

    async fn list_documents(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError> {
        let mut conn = self.conn();
        let docs: Vec<String> = conn.hvals(self.keys.records(kind)).await?;

        parse_docs(docs)
    }

    async fn patch_document(
        &self,
        kind: RecordKind,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let existing = match self.find_document(kind, id).await? {
            Some(d) => d,
            None => return Ok(None),
        };

        if let Some(new_value) = kind.unique_value(patch) {
            let index_key = self.keys.record_index(kind);

            match kind.unique_value(&existing) {
                Some(old_value) => {
                    self.move_unique_entry(&index_key, old_value, new_value, id, kind.as_str())
                        .await?
                }
                None => {
                    self.claim_unique_entry(&index_key, new_value, id, kind.as_str())
                        .await?
                }
            }
        }

        let merged = self
            .merge_document(
                &self.keys.records(kind),
                id,
                &serde_json::to_string(patch)?,
                &[],
            )
            .await?;

        merged.map(|d| from_doc(&d)).transpose()
    }

    async fn delete_document(&self, kind: RecordKind, id: &str) -> Result<bool, StoreError> {
        let existing = match self.find_document(kind, id).await? {
            Some(d) => d,
            None => return Ok(false),
        };

        let mut conn = self.conn();
        let _: () = conn.hdel(self.keys.records(kind), id).await?;

        if let Some(value) = kind.unique_value(&existing) {
            let _: () = conn.hdel(self.keys.record_index(kind), value).await?;
        }

        Ok(true)
    }
}

// Tests
//
// These need a Redis server at REDIS_HOST:REDIS_PORT.
// Run them with: cargo test -- --ignored

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::{
        models::{Role, Status},
        utils::{get_env_string, get_env_u32},
    };

    async fn test_store() -> RedisStore {
        let config = RedisConfiguration {
            host: get_env_string("REDIS_HOST", "127.0.0.1"),
            port: get_env_u32("REDIS_PORT", 6379),
            password: get_env_string("REDIS_PASSWORD", ""),
            db: get_env_u32("REDIS_DB", 0),
            key_prefix: format!("ekos-test-{}", hex::encode(rand::random::<[u8; 8]>())),
            tls: false,
        };

        RedisStore::connect(&Logger::new_disabled(), &config)
            .await
            .unwrap()
    }

    async fn cleanup(store: &RedisStore) {
        let mut conn = store.conn();
        let keys: Vec<String> = conn.keys(store.keys.all()).await.unwrap();

        if !keys.is_empty() {
            let _: () = conn.del(keys).await.unwrap();
        }
    }

    fn report(id: &str, number: &str, created_ms: i64) -> Report {
        let created = Utc.timestamp_millis_opt(created_ms).unwrap();

        Report {
            id: id.to_string(),
            report_number: number.to_string(),
            project_id: "p1".to_string(),
            project_name: "Depot".to_string(),
            city: "Ankara".to_string(),
            city_code: "ANK".to_string(),
            equipment_name: "Crane".to_string(),
            category: "Lifting".to_string(),
            subcategory: None,
            firm: "Acme".to_string(),
            location: None,
            brand_model: None,
            serial_number: None,
            period: None,
            valid_until: None,
            description: None,
            compliance: None,
            status: Status::Active,
            created_by: "u1".to_string(),
            created_by_username: "inspector1".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_sequence_counter_is_seeded_once_and_atomic() {
        let store = Arc::new(test_store().await);

        assert_eq!(store.current_sequence("PK2025-ANK").await.unwrap(), None);
        assert_eq!(store.increment_sequence("PK2025-ANK", 7).await.unwrap(), 8);
        assert_eq!(store.increment_sequence("PK2025-ANK", 0).await.unwrap(), 9);
        assert_eq!(store.current_sequence("PK2025-ANK").await.unwrap(), Some(9));

        let mut handles = Vec::new();

        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_sequence("PK2025-IST", 0).await.unwrap()
            }));
        }

        let mut values = HashSet::new();

        for handle in handles {
            values.insert(handle.await.unwrap());
        }

        assert_eq!(values, (1..=20).collect::<HashSet<u64>>());

        cleanup(&store).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_session_field_is_kept_apart_from_the_document() {
        let store = test_store().await;
        let user = User::new("insp", "insp@example.com", "hash".to_string(), Role::Inspector);

        store.insert_user(&user).await.unwrap();
        assert!(store.set_active_session(&user.id, Some("m1")).await.unwrap());

        let patched = store
            .patch_user(
                &user.id,
                &UserPatch {
                    role: Some(Role::Viewer),
                    verification_code: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.role, Role::Viewer);
        assert_eq!(patched.email, "insp@example.com");
        assert_eq!(patched.active_session.as_deref(), Some("m1"));

        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let logged_in = store.record_login(&user.id, "m2", at).await.unwrap().unwrap();

        assert_eq!(logged_in.role, Role::Viewer);
        assert_eq!(logged_in.last_login, Some(at));
        assert_eq!(logged_in.active_session.as_deref(), Some("m2"));

        let mut conn = store.conn();
        let doc: String = conn.hget(store.keys.user(&user.id), USER_DOC_FIELD).await.unwrap();
        assert!(!doc.contains("m2"));

        assert!(store.set_active_session(&user.id, None).await.unwrap());
        assert!(store.find_user(&user.id).await.unwrap().unwrap().active_session.is_none());

        assert!(store.record_login("missing", "m3", at).await.unwrap().is_none());
        assert!(store.patch_user("missing", &UserPatch::default()).await.unwrap().is_none());

        cleanup(&store).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_patch_user_moves_unique_entries() {
        let store = test_store().await;
        let a = User::new("a", "a@example.com", "h".to_string(), Role::Viewer);
        let b = User::new("b", "b@example.com", "h".to_string(), Role::Viewer);

        store.insert_user(&a).await.unwrap();
        store.insert_user(&b).await.unwrap();

        assert!(matches!(
            store
                .patch_user(
                    &b.id,
                    &UserPatch {
                        email: Some("a@example.com".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(StoreError::Conflict(_))
        ));

        store
            .patch_user(
                &b.id,
                &UserPatch {
                    email: Some("c@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(store.find_user_by_email("b@example.com").await.unwrap().is_none());
        assert_eq!(
            store.find_user_by_email("c@example.com").await.unwrap().unwrap().id,
            b.id
        );

        cleanup(&store).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_latest_report_number_uses_the_prefix_index() {
        let store = test_store().await;

        store.insert_report(&report("a", "PK2025-ANK003", 1_000)).await.unwrap();
        store.insert_report(&report("b", "PK2025-ANK999", 5_000)).await.unwrap();
        store.insert_report(&report("c", "PK2025-ANK1000", 5_000)).await.unwrap();
        store.insert_report(&report("d", "PK2025-IST010", 9_000)).await.unwrap();

        assert_eq!(
            store.latest_report_number("PK2025-ANK").await.unwrap(),
            Some("PK2025-ANK1000".to_string())
        );
        assert_eq!(store.latest_report_number("PK2024-ANK").await.unwrap(), None);

        assert!(matches!(
            store.insert_report(&report("e", "PK2025-ANK003", 6_000)).await,
            Err(StoreError::DuplicateIdentifier(_))
        ));

        store.delete_report("c").await.unwrap();
        store.delete_report("b").await.unwrap();

        assert_eq!(
            store.latest_report_number("PK2025-ANK").await.unwrap(),
            Some("PK2025-ANK003".to_string())
        );

        cleanup(&store).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_documents_and_attachments() {
        let store = test_store().await;
        let kind = RecordKind::Machine;

        store
            .insert_document(kind, "m1", &json!({ "id": "m1", "plate_or_serial": "06 A 1", "firm": "Acme" }))
            .await
            .unwrap();

        assert!(matches!(
            store
                .insert_document(kind, "m2", &json!({ "id": "m2", "plate_or_serial": "06 A 1" }))
                .await,
            Err(StoreError::Conflict(_))
        ));

        let patched = store
            .patch_document(kind, "m1", &json!({ "firm": "Globex", "description": null }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched["firm"], "Globex");
        assert_eq!(patched["plate_or_serial"], "06 A 1");
        assert!(patched["description"].is_null());

        assert!(store.delete_document(kind, "m1").await.unwrap());

        // The unique value is free again
        store
            .insert_document(kind, "m2", &json!({ "id": "m2", "plate_or_serial": "06 A 1" }))
            .await
            .unwrap();

        store.insert_report(&report("r1", "PK2025-ANK001", 1_000)).await.unwrap();

        let attachment = Attachment::new("r1", "photo.jpg", "uploads/photo.jpg");
        store.add_attachment(&attachment).await.unwrap();

        assert_eq!(
            store.find_attachment(&attachment.id).await.unwrap(),
            Some(attachment.clone())
        );
        assert_eq!(store.list_attachments("r1").await.unwrap().len(), 1);

        store.delete_report("r1").await.unwrap();
        assert!(store.find_attachment(&attachment.id).await.unwrap().is_none());
        assert!(store.list_attachments("r1").await.unwrap().is_empty());

        cleanup(&store).await;
    }
}
