use std::path::Path;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde_json::Value;

use crate::domains::chat::{
    title_from_message, Conversation, Feedback, FeedbackKind, MessageRole, StoredMessage,
};
use crate::error::{ConciergeError, Result};
use crate::interfaces::store::ConversationStore;

mod schema;
use schema::{conversations, feedback, messages};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
type SqlitePool = Pool<SqliteAsyncConn>;
type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

#[derive(Queryable)]
struct ConversationRow {
    id: i64,
    user_id: String,
    title: Option<String>,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

#[derive(Queryable)]
struct MessageRow {
    id: i64,
    conversation_id: i64,
    role: String,
    content: String,
    metadata: Option<String>,
    created_at: i64,
}

#[derive(Queryable)]
struct FeedbackRow {
    id: i64,
    message_id: i64,
    user_id: String,
    kind: String,
    comment: Option<String>,
    created_at: i64,
}

#[derive(QueryableByName)]
struct RowId {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    id: i64,
}

#[derive(Insertable)]
#[diesel(table_name = conversations)]
struct NewConversation<'a> {
    user_id: &'a str,
    title: &'a str,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = messages)]
struct NewMessage<'a> {
    conversation_id: i64,
    role: &'a str,
    content: &'a str,
    metadata: Option<String>,
    created_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = feedback)]
struct NewFeedback<'a> {
    message_id: i64,
    user_id: &'a str,
    kind: &'a str,
    comment: Option<&'a str>,
    created_at: i64,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = ConciergeError;

    fn try_from(row: ConversationRow) -> Result<Self> {
        Ok(Conversation {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<MessageRow> for StoredMessage {
    type Error = ConciergeError;

    fn try_from(row: MessageRow) -> Result<Self> {
        let role = MessageRole::parse(&row.role)
            .ok_or_else(|| ConciergeError::Storage(format!("unknown message role {}", row.role)))?;
        let metadata = row
            .metadata
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|e| ConciergeError::Serialization(e.to_string()))?;
        Ok(StoredMessage {
            id: row.id,
            conversation_id: row.conversation_id,
            role,
            content: row.content,
            metadata,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = ConciergeError;

    fn try_from(row: FeedbackRow) -> Result<Self> {
        let kind = FeedbackKind::parse(&row.kind)
            .ok_or_else(|| ConciergeError::Storage(format!("unknown feedback kind {}", row.kind)))?;
        Ok(Feedback {
            id: row.id,
            message_id: row.message_id,
            user_id: row.user_id,
            kind,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

/// Durable conversation store on sqlite, one transaction per trait call.
/// Foreign keys are enforced per connection so conversation deletes
/// cascade to messages and feedback at the database layer.
pub struct SqliteConversationStore {
    pool: SqlitePool,
}

impl SqliteConversationStore {
    pub async fn new(sqlite_path: &str) -> Result<Self> {
        ensure_parent_dir(sqlite_path)?;
        run_migrations(sqlite_path).await?;

        let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new(sqlite_path);
        let pool: SqlitePool = Pool::builder()
            .build(manager)
            .await
            .map_err(|e| ConciergeError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ConciergeError::Storage(e.to_string()))?;
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .await?;
        Ok(conn)
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
        }
    }
    Ok(())
}

async fn run_migrations(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)
            .map_err(|e| ConciergeError::Storage(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| ConciergeError::Storage(e.to_string()))?;
        Ok::<_, ConciergeError>(())
    })
    .await
    .map_err(|e| ConciergeError::Storage(e.to_string()))??;
    Ok(())
}

async fn owned_conversation(
    conn: &mut SqliteAsyncConn,
    conversation_id: i64,
    user_id: &str,
) -> Result<ConversationRow> {
    let row: Option<ConversationRow> = conversations::table
        .find(conversation_id)
        .first(conn)
        .await
        .optional()?;
    let row =
        row.ok_or_else(|| ConciergeError::NotFound(format!("conversation {conversation_id}")))?;
    if row.user_id != user_id {
        return Err(ConciergeError::NotAuthorized);
    }
    Ok(row)
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get_or_create(&self, user_id: &str, title_seed: &str) -> Result<Conversation> {
        let title = title_from_message(title_seed);
        let mut conn = self.conn().await?;
        let existing: Option<ConversationRow> = conversations::table
            .filter(conversations::user_id.eq(user_id))
            .filter(conversations::is_active.eq(true))
            .order(conversations::updated_at.desc())
            .then_order_by(conversations::id.desc())
            .first(&mut conn)
            .await
            .optional()?;
        if let Some(row) = existing {
            return row.try_into();
        }

        let now = now_ts();
        let new_conversation = NewConversation {
            user_id,
            title: &title,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let row: ConversationRow = conn
            .transaction::<_, ConciergeError, _>(|conn| {
                async move {
                    diesel::insert_into(conversations::table)
                        .values(&new_conversation)
                        .execute(conn)
                        .await?;
                    let row_id: RowId = diesel::sql_query("SELECT last_insert_rowid() as id")
                        .get_result(conn)
                        .await?;
                    let row: ConversationRow =
                        conversations::table.find(row_id.id).first(conn).await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;
        row.try_into()
    }

    async fn get(&self, conversation_id: i64, user_id: &str) -> Result<Conversation> {
        let mut conn = self.conn().await?;
        owned_conversation(&mut conn, conversation_id, user_id)
            .await?
            .try_into()
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Conversation>> {
        let mut conn = self.conn().await?;
        let rows: Vec<ConversationRow> = conversations::table
            .filter(conversations::user_id.eq(user_id))
            .filter(conversations::is_active.eq(true))
            .order(conversations::updated_at.desc())
            .then_order_by(conversations::id.desc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        metadata: Option<Value>,
    ) -> Result<StoredMessage> {
        let mut conn = self.conn().await?;
        let now = now_ts();
        let metadata_text = metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ConciergeError::Serialization(e.to_string()))?;
        let new_message = NewMessage {
            conversation_id,
            role: role.as_str(),
            content,
            metadata: metadata_text,
            created_at: now,
        };

        let id = conn
            .transaction::<_, ConciergeError, _>(|conn| {
                async move {
                    let touched = diesel::update(
                        conversations::table.filter(conversations::id.eq(conversation_id)),
                    )
                    .set(conversations::updated_at.eq(now))
                    .execute(conn)
                    .await?;
                    if touched == 0 {
                        return Err(ConciergeError::NotFound(format!(
                            "conversation {conversation_id}"
                        )));
                    }

                    diesel::insert_into(messages::table)
                        .values(&new_message)
                        .execute(conn)
                        .await?;
                    let row_id: RowId = diesel::sql_query("SELECT last_insert_rowid() as id")
                        .get_result(conn)
                        .await?;
                    Ok(row_id.id)
                }
                .scope_boxed()
            })
            .await?;

        Ok(StoredMessage {
            id,
            conversation_id,
            role,
            content: content.to_string(),
            metadata,
            created_at: now,
        })
    }

    async fn recent_history(
        &self,
        conversation_id: i64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>> {
        let mut conn = self.conn().await?;
        // Load newest-first so the LIMIT keeps the tail, then flip back
        // to chronological order for the prompt.
        let mut rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .order(messages::created_at.desc())
            .then_order_by(messages::id.desc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;
        rows.sort_by_key(|row| (row.created_at, row.id));
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn messages(&self, conversation_id: i64, user_id: &str) -> Result<Vec<StoredMessage>> {
        let mut conn = self.conn().await?;
        owned_conversation(&mut conn, conversation_id, user_id).await?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .order(messages::created_at.asc())
            .then_order_by(messages::id.asc())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn deactivate(&self, conversation_id: i64, user_id: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        owned_conversation(&mut conn, conversation_id, user_id).await?;
        diesel::update(conversations::table.filter(conversations::id.eq(conversation_id)))
            .set((
                conversations::is_active.eq(false),
                conversations::updated_at.eq(now_ts()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, conversation_id: i64, user_id: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        owned_conversation(&mut conn, conversation_id, user_id).await?;
        // ON DELETE CASCADE takes the messages and feedback with it.
        diesel::delete(conversations::table.filter(conversations::id.eq(conversation_id)))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn record_feedback(
        &self,
        message_id: i64,
        user_id: &str,
        kind: FeedbackKind,
        comment: Option<&str>,
    ) -> Result<Feedback> {
        let mut conn = self.conn().await?;
        let conversation_id: Option<i64> = messages::table
            .find(message_id)
            .select(messages::conversation_id)
            .first(&mut conn)
            .await
            .optional()?;
        let conversation_id = conversation_id
            .ok_or_else(|| ConciergeError::NotFound(format!("message {message_id}")))?;
        owned_conversation(&mut conn, conversation_id, user_id).await?;

        let new_feedback = NewFeedback {
            message_id,
            user_id,
            kind: kind.as_str(),
            comment,
            created_at: now_ts(),
        };
        diesel::insert_into(feedback::table)
            .values(&new_feedback)
            .on_conflict((feedback::message_id, feedback::user_id))
            .do_update()
            .set((
                feedback::kind.eq(kind.as_str()),
                feedback::comment.eq(comment),
            ))
            .execute(&mut conn)
            .await?;

        let row: FeedbackRow = feedback::table
            .filter(feedback::message_id.eq(message_id))
            .filter(feedback::user_id.eq(user_id))
            .first(&mut conn)
            .await?;
        row.try_into()
    }
}
