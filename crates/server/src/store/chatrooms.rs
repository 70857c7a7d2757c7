use sqlx::SqliteConnection;

use super::messages::insert_message;
use super::{unique_ids, Page, Store, StoreError};
use crate::models::{ChatMessage, Chatroom, ChatroomRow, ChatroomView, UserSummary};

const CHATROOM_COLUMNS: &str = "id, is_group, group_name, created_at";

impl Store {
    /// Creates a 1:1 room, both participant rows and the opening message in
    /// one transaction.
    pub async fn create_private_chatroom(
        &self,
        participant_a: i64,
        participant_b: i64,
        first_message: &ChatMessage,
    ) -> Result<(Chatroom, ChatMessage), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = insert_chatroom(&mut tx, false, None).await?;
        insert_participants(&mut tx, row.id, &[participant_a, participant_b]).await?;
        let message = insert_message(&mut tx, row.id, first_message).await?;

        tx.commit().await?;

        tracing::debug!(
            "Created private chatroom {} for users {} and {}",
            row.id,
            participant_a,
            participant_b
        );

        let mut chatroom = Chatroom::from(row);
        chatroom.participants = self.participants(chatroom.id).await?;
        chatroom.messages = vec![message.clone()];
        Ok((chatroom, message))
    }

    pub async fn create_group_chatroom(
        &self,
        name: &str,
        participant_ids: &[i64],
    ) -> Result<Chatroom, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = insert_chatroom(&mut tx, true, Some(name.trim())).await?;
        insert_participants(&mut tx, row.id, &unique_ids(participant_ids)).await?;

        tx.commit().await?;

        let mut chatroom = Chatroom::from(row);
        chatroom.participants = self.participants(chatroom.id).await?;
        Ok(chatroom)
    }

    /// Renames the group when `name` is non-blank and adds any participant
    /// not already in it.
    pub async fn update_group_chatroom(
        &self,
        chatroom_id: i64,
        name: &str,
        participant_ids: &[i64],
    ) -> Result<Chatroom, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM chatrooms WHERE id = ? AND is_group = 1",
            CHATROOM_COLUMNS
        );
        let existing = sqlx::query_as::<_, ChatroomRow>(&sql)
            .bind(chatroom_id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut row = existing.ok_or(StoreError::NotFound {
            entity: "group chatroom",
            id: chatroom_id,
        })?;

        let name = name.trim();
        if !name.is_empty() {
            sqlx::query("UPDATE chatrooms SET group_name = ? WHERE id = ?")
                .bind(name)
                .bind(chatroom_id)
                .execute(&mut *tx)
                .await?;
            row.group_name = Some(name.to_string());
        }

        for user_id in unique_ids(participant_ids) {
            sqlx::query(
                "INSERT OR IGNORE INTO chatroom_participants (chatroom_id, user_id) VALUES (?, ?)",
            )
            .bind(chatroom_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut chatroom = Chatroom::from(row);
        chatroom.participants = self.participants(chatroom_id).await?;
        Ok(chatroom)
    }

    pub async fn participants(&self, chatroom_id: i64) -> Result<Vec<UserSummary>, StoreError> {
        let participants = sqlx::query_as::<_, UserSummary>(
            r#"SELECT u.id, u.nickname, u.avatar_url
               FROM users u
               JOIN chatroom_participants cp ON u.id = cp.user_id
               WHERE cp.chatroom_id = ?
               ORDER BY u.id"#,
        )
        .bind(chatroom_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }

    /// Messages in the room that `user_id` did not send and nobody has viewed.
    pub async fn unread_count(&self, chatroom_id: i64, user_id: i64) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM messages
               WHERE chatroom_id = ? AND sender_user_id != ? AND viewed = 0"#,
        )
        .bind(chatroom_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Every chatroom the user participates in. `page` applies to each
    /// room's message window, never to the room list.
    pub async fn chatrooms_by_user(
        &self,
        user_id: i64,
        page: Page,
    ) -> Result<Vec<ChatroomView>, StoreError> {
        let rows = sqlx::query_as::<_, ChatroomRow>(
            r#"SELECT c.id, c.is_group, c.group_name, c.created_at
               FROM chatrooms c
               INNER JOIN chatroom_participants cp ON c.id = cp.chatroom_id
               WHERE cp.user_id = ?
               ORDER BY c.created_at, c.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            views.push(self.view_of(row, user_id, page).await?);
        }
        Ok(views)
    }

    /// A single room as seen by `user_id`; `None` when the room is missing or
    /// the user is not in it.
    pub async fn chatroom_for_user(
        &self,
        chatroom_id: i64,
        user_id: i64,
        page: Page,
    ) -> Result<Option<ChatroomView>, StoreError> {
        let row = sqlx::query_as::<_, ChatroomRow>(
            r#"SELECT c.id, c.is_group, c.group_name, c.created_at
               FROM chatrooms c
               INNER JOIN chatroom_participants cp ON c.id = cp.chatroom_id
               WHERE c.id = ? AND cp.user_id = ?"#,
        )
        .bind(chatroom_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.view_of(row, user_id, page).await?)),
            None => Ok(None),
        }
    }

    /// Ids of every chatroom the user is in, oldest first.
    pub async fn chatroom_ids_by_user(&self, user_id: i64) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"SELECT c.id FROM chatrooms c
               INNER JOIN chatroom_participants cp ON c.id = cp.chatroom_id
               WHERE cp.user_id = ?
               ORDER BY c.created_at, c.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn is_participant(&self, chatroom_id: i64, user_id: i64) -> Result<bool, StoreError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM chatroom_participants WHERE chatroom_id = ? AND user_id = ?",
        )
        .bind(chatroom_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn view_of(
        &self,
        row: ChatroomRow,
        user_id: i64,
        page: Page,
    ) -> Result<ChatroomView, StoreError> {
        let mut chatroom = Chatroom::from(row);
        chatroom.messages = self.messages_by_chatroom(chatroom.id, page).await?;
        chatroom.participants = self.participants(chatroom.id).await?;
        let unread = self.unread_count(chatroom.id, user_id).await?;
        Ok(ChatroomView::new(chatroom, user_id, unread))
    }
}

async fn insert_chatroom(
    conn: &mut SqliteConnection,
    is_group: bool,
    group_name: Option<&str>,
) -> Result<ChatroomRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO chatrooms (is_group, group_name) VALUES (?, ?) RETURNING {}",
        CHATROOM_COLUMNS
    );
    sqlx::query_as::<_, ChatroomRow>(&sql)
        .bind(is_group)
        .bind(group_name)
        .fetch_one(&mut *conn)
        .await
}

async fn insert_participants(
    conn: &mut SqliteConnection,
    chatroom_id: i64,
    user_ids: &[i64],
) -> Result<(), sqlx::Error> {
    for &user_id in user_ids {
        sqlx::query("INSERT INTO chatroom_participants (chatroom_id, user_id) VALUES (?, ?)")
            .bind(chatroom_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
