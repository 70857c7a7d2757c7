use sqlx::SqliteConnection;

use super::{Page, Store, StoreError, MESSAGE_COLUMNS};
use crate::models::ChatMessage;

impl Store {
    /// Appends a message; the store assigns id and timestamp.
    pub async fn add_message(
        &self,
        chatroom_id: i64,
        message: &ChatMessage,
    ) -> Result<ChatMessage, StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM chatrooms WHERE id = ?")
            .bind(chatroom_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound {
                entity: "chatroom",
                id: chatroom_id,
            });
        }

        let saved = insert_message(&mut tx, chatroom_id, message).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn message(&self, message_id: i64) -> Result<ChatMessage, StoreError> {
        let sql = format!("SELECT {} FROM messages WHERE id = ?", MESSAGE_COLUMNS);
        sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "message",
                id: message_id,
            })
    }

    /// Flags a message as viewed. Viewing twice is harmless.
    pub async fn mark_viewed(&self, message_id: i64) -> Result<ChatMessage, StoreError> {
        let sql = format!(
            "UPDATE messages SET viewed = 1 WHERE id = ? RETURNING {}",
            MESSAGE_COLUMNS
        );
        sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "message",
                id: message_id,
            })
    }

    /// The `page`-th window of the newest messages, returned oldest first.
    pub async fn messages_by_chatroom(
        &self,
        chatroom_id: i64,
        page: Page,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        // Cut the window out of the newest-first ordering, then flip it back
        // to chronological order for display.
        let sql = format!(
            r#"SELECT {cols} FROM (
                   SELECT {cols} FROM messages
                   WHERE chatroom_id = ?
                   ORDER BY timestamp DESC, id DESC
                   LIMIT ? OFFSET ?
               ) AS recent
               ORDER BY timestamp ASC, id ASC"#,
            cols = MESSAGE_COLUMNS
        );
        let messages = sqlx::query_as::<_, ChatMessage>(&sql)
            .bind(chatroom_id)
            .bind(page.page_size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }
}

pub(super) async fn insert_message(
    conn: &mut SqliteConnection,
    chatroom_id: i64,
    message: &ChatMessage,
) -> Result<ChatMessage, sqlx::Error> {
    let sql = format!(
        r#"INSERT INTO messages (chatroom_id, sender_user_id, text, attachment_url)
           VALUES (?, ?, ?, ?)
           RETURNING {}"#,
        MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, ChatMessage>(&sql)
        .bind(chatroom_id)
        .bind(message.sender_id)
        .bind(&message.text)
        .bind(message.attachment())
        .fetch_one(&mut *conn)
        .await
}
