//! Postgres-backed [`ContentStore`].
//!
//! Entities are read back as one JSON document per row via `row_to_json`, with
//! translations (and children) aggregated into nested arrays.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::models::{ContactSubmission, NewSubmission, NewUser, SubmissionStatus, User, UserPatch};
use super::query_builder::{escape_like, quote_ident, Params};
use super::store::{ContentStore, EntityQuery, Lookup, StoreError, StoreResult};
use crate::resources::{Column, EntityDraft, EntityPatch, FieldKind, Record, ResourceSchema, TranslationInput};
use crate::types::Language;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `SELECT b.*, <translations> [, <children>]` for one resource
fn projection(schema: &ResourceSchema, language: Option<&str>, with_children: bool) -> String {
    let tr = &schema.translations;
    let language_clause = language.map(|p| format!(" AND tr.language = {}", p)).unwrap_or_default();
    let mut sql = format!(
        "SELECT b.*, COALESCE((SELECT json_agg(tr ORDER BY tr.language) FROM {} tr WHERE tr.{} = b.id{}), '[]'::json) AS translations",
        quote_ident(tr.table),
        quote_ident(tr.foreign_key),
        language_clause
    );
    if let (true, Some(children)) = (with_children, &schema.children) {
        sql.push_str(&format!(
            ", COALESCE((SELECT json_agg(c ORDER BY c.{}) FROM {} c WHERE c.{} = b.id), '[]'::json) AS {}",
            quote_ident(children.order_by),
            quote_ident(children.table),
            quote_ident(children.foreign_key),
            quote_ident(children.key)
        ));
    }
    sql
}

/// One page of rows. Ordering and paging sit on the outermost select so
/// the row order survives `row_to_json`.
fn page_query(schema: &ResourceSchema, query: &EntityQuery, params: &mut Params) -> String {
    let language = params.push(Value::String(query.language.as_str().to_string()), FieldKind::Text);
    let filter = where_clause(schema, query, params);
    let limit = params.push(Value::from(query.limit), FieldKind::Int);
    let offset = params.push(Value::from(query.offset), FieldKind::Int);
    format!(
        "SELECT row_to_json(t) AS row FROM ({} FROM {} b{}) t ORDER BY t.{} {} NULLS LAST, t.id LIMIT {} OFFSET {}",
        projection(schema, Some(&language), false),
        quote_ident(schema.table),
        filter,
        quote_ident(query.sort_column),
        query.sort_order.to_sql(),
        limit,
        offset
    )
}

fn where_clause(schema: &ResourceSchema, query: &EntityQuery, params: &mut Params) -> String {
    let mut conditions = Vec::new();

    for (column, value) in &query.filters {
        let kind = schema.column(column).map(|c| c.kind).unwrap_or(FieldKind::Text);
        let placeholder = params.push(value.clone(), kind);
        conditions.push(format!("b.{} = {}", quote_ident(column), placeholder));
    }

    if let Some(search) = &query.search {
        let language = params.push(Value::String(query.language.as_str().to_string()), FieldKind::Text);
        let pattern = params.push(Value::String(format!("%{}%", escape_like(search))), FieldKind::Text);
        let matches: Vec<String> = schema
            .search_columns
            .iter()
            .map(|col| format!("s.{} ILIKE {}", quote_ident(col), pattern))
            .collect();
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM {} s WHERE s.{} = b.id AND s.language = {} AND ({}))",
            quote_ident(schema.translations.table),
            quote_ident(schema.translations.foreign_key),
            language,
            matches.join(" OR ")
        ));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn value_for(column: &Column, supplied: &Record) -> Value {
    supplied.get(column.name).cloned().unwrap_or_else(|| column.default.to_value())
}

async fn insert_translation(
    tx: &mut Transaction<'_, Postgres>,
    schema: &ResourceSchema,
    owner: Uuid,
    input: &TranslationInput,
    upsert: bool,
) -> StoreResult<()> {
    let tr = &schema.translations;
    let mut params = Params::new();
    let mut columns = vec![quote_ident(tr.foreign_key), "language".to_string()];
    let mut values = vec![
        params.push(Value::String(owner.to_string()), FieldKind::Uuid),
        params.push(Value::String(input.language.as_str().to_string()), FieldKind::Text),
    ];
    for column in tr.columns {
        columns.push(quote_ident(column.name));
        values.push(params.push(value_for(column, &input.fields), column.kind));
    }

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(tr.table),
        columns.join(", "),
        values.join(", ")
    );

    if upsert {
        let supplied: Vec<String> = tr
            .columns
            .iter()
            .filter(|c| input.fields.contains_key(c.name))
            .map(|c| format!("{0} = EXCLUDED.{0}", quote_ident(c.name)))
            .collect();
        sql.push_str(&format!(" ON CONFLICT ({}, language) DO ", quote_ident(tr.foreign_key)));
        if supplied.is_empty() {
            sql.push_str("NOTHING");
        } else {
            sql.push_str(&format!("UPDATE SET {}", supplied.join(", ")));
        }
    }

    params.bind(sqlx::query(&sql)).execute(&mut **tx).await?;
    Ok(())
}

async fn replace_children(
    tx: &mut Transaction<'_, Postgres>,
    schema: &ResourceSchema,
    owner: Uuid,
    items: &[Record],
) -> StoreResult<()> {
    let Some(children) = &schema.children else {
        return Ok(());
    };

    sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        quote_ident(children.table),
        quote_ident(children.foreign_key)
    ))
    .bind(owner)
    .execute(&mut **tx)
    .await?;

    for item in items {
        let mut params = Params::new();
        let mut columns = vec![quote_ident(children.foreign_key)];
        let mut values = vec![params.push(Value::String(owner.to_string()), FieldKind::Uuid)];
        for column in children.columns {
            columns.push(quote_ident(column.name));
            values.push(params.push(value_for(column, item), column.kind));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(children.table),
            columns.join(", "),
            values.join(", ")
        );
        params.bind(sqlx::query(&sql)).execute(&mut **tx).await?;
    }
    Ok(())
}

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, avatar_url, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, name, email, phone, subject, message, status, created_at, updated_at";

#[async_trait]
impl ContentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_entity(&self, schema: &'static ResourceSchema, id: Uuid, draft: EntityDraft) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let mut params = Params::new();
        let mut columns = vec!["id".to_string()];
        let mut values = vec![params.push(Value::String(id.to_string()), FieldKind::Uuid)];
        for column in schema.columns {
            columns.push(quote_ident(column.name));
            values.push(params.push(value_for(column, &draft.base), column.kind));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(schema.table),
            columns.join(", "),
            values.join(", ")
        );
        debug!("insert {}: {}", schema.table, sql);
        params.bind(sqlx::query(&sql)).execute(&mut *tx).await?;

        for input in &draft.translations {
            insert_translation(&mut tx, schema, id, input, false).await?;
        }
        if let Some(items) = &draft.children {
            replace_children(&mut tx, schema, id, items).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch_entity(
        &self,
        schema: &'static ResourceSchema,
        lookup: Lookup<'_>,
        language: Option<Language>,
    ) -> StoreResult<Option<Value>> {
        let mut params = Params::new();
        let condition = match lookup {
            Lookup::Id(id) => format!("b.id = {}", params.push(Value::String(id.to_string()), FieldKind::Uuid)),
            Lookup::Slug(slug) => format!("b.slug = {}", params.push(Value::String(slug.to_string()), FieldKind::Text)),
        };
        let language = language.map(|l| params.push(Value::String(l.as_str().to_string()), FieldKind::Text));

        let sql = format!(
            "SELECT row_to_json(t) AS row FROM ({} FROM {} b WHERE {}) t",
            projection(schema, language.as_deref(), true),
            quote_ident(schema.table),
            condition
        );
        let row = params
            .bind_scalar(sqlx::query_scalar::<_, Value>(&sql))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_entities(&self, schema: &'static ResourceSchema, query: &EntityQuery) -> StoreResult<(Vec<Value>, i64)> {
        let mut page_params = Params::new();
        let page_sql = page_query(schema, query, &mut page_params);

        let mut count_params = Params::new();
        let count_sql = format!(
            "SELECT COUNT(*) FROM {} b{}",
            quote_ident(schema.table),
            where_clause(schema, query, &mut count_params)
        );

        let (rows, total) = futures::try_join!(
            page_params
                .bind_scalar(sqlx::query_scalar::<_, Value>(&page_sql))
                .fetch_all(&self.pool),
            count_params
                .bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
                .fetch_one(&self.pool),
        )?;
        Ok((rows, total))
    }

    async fn existing_slugs(&self, schema: &'static ResourceSchema, base: &str) -> StoreResult<Vec<String>> {
        let sql = format!("SELECT slug FROM {} WHERE slug = $1 OR slug LIKE $2", quote_ident(schema.table));
        let slugs = sqlx::query_scalar::<_, String>(&sql)
            .bind(base)
            .bind(format!("{}-%", escape_like(base)))
            .fetch_all(&self.pool)
            .await?;
        Ok(slugs)
    }

    async fn update_entity(&self, schema: &'static ResourceSchema, id: Uuid, patch: EntityPatch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_scalar::<_, Uuid>(&format!(
            "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
            quote_ident(schema.table)
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound(format!("{} not found", schema.label)));
        }

        let mut params = Params::new();
        let mut assignments = vec!["updated_at = now()".to_string()];
        for column in schema.columns {
            if let Some(value) = patch.base.get(column.name) {
                let placeholder = params.push(value.clone(), column.kind);
                assignments.push(format!("{} = {}", quote_ident(column.name), placeholder));
            }
        }
        let target = params.push(Value::String(id.to_string()), FieldKind::Uuid);
        let sql = format!(
            "UPDATE {} SET {} WHERE id = {}",
            quote_ident(schema.table),
            assignments.join(", "),
            target
        );
        params.bind(sqlx::query(&sql)).execute(&mut *tx).await?;

        for input in &patch.translations {
            insert_translation(&mut tx, schema, id, input, true).await?;
        }
        if let Some(items) = &patch.children {
            replace_children(&mut tx, schema, id, items).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_entity(&self, schema: &'static ResourceSchema, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", quote_ident(schema.table)))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{} not found", schema.label)));
        }
        Ok(())
    }

    async fn increment_counter(&self, schema: &'static ResourceSchema, id: Uuid, column: &'static str) -> StoreResult<()> {
        let column = quote_ident(column);
        sqlx::query(&format!(
            "UPDATE {} SET {col} = {col} + 1 WHERE id = $1",
            quote_ident(schema.table),
            col = column
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<(Vec<User>, i64)> {
        let page_sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let (users, total) = futures::try_join!(
            sqlx::query_as::<_, User>(&page_sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )?;
        Ok((users, total))
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<User> {
        let sql = format!(
            "UPDATE users SET \
                role = COALESCE($2, role), \
                is_active = COALESCE($3, is_active), \
                first_name = CASE WHEN $4 THEN $5 ELSE first_name END, \
                last_name = CASE WHEN $6 THEN $7 ELSE last_name END, \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(patch.role.map(|r| r.as_str()))
            .bind(patch.is_active)
            .bind(patch.first_name.is_some())
            .bind(patch.first_name.flatten())
            .bind(patch.last_name.is_some())
            .bind(patch.last_name.flatten())
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| StoreError::NotFound("User not found".to_string()))
    }

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<ContactSubmission> {
        let created = sqlx::query_as::<_, ContactSubmission>(&format!(
            "INSERT INTO contact_submissions (name, email, phone, subject, message) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SUBMISSION_COLUMNS
        ))
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.subject)
        .bind(&submission.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<ContactSubmission>, i64)> {
        let status = status.map(|s| s.as_str());
        let page_sql = format!(
            "SELECT {} FROM contact_submissions WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            SUBMISSION_COLUMNS
        );
        let (rows, total) = futures::try_join!(
            sqlx::query_as::<_, ContactSubmission>(&page_sql)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool),
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM contact_submissions WHERE ($1::text IS NULL OR status = $1)"
            )
            .bind(status)
            .fetch_one(&self.pool),
        )?;
        Ok((rows, total))
    }

    async fn update_submission_status(&self, id: Uuid, status: SubmissionStatus) -> StoreResult<ContactSubmission> {
        let row = sqlx::query_as::<_, ContactSubmission>(&format!(
            "UPDATE contact_submissions SET status = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| StoreError::NotFound("Submission not found".to_string()))
    }

    async fn approved_ratings(&self, product_id: Uuid) -> StoreResult<Vec<i32>> {
        let ratings = sqlx::query_scalar::<_, i32>(
            "SELECT rating FROM reviews WHERE product_id = $1 AND status = 'approved'",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }
}
