//! In-process [`ContentStore`] used by tests and `serve --memory`.
//!
//! A single write lock covers each mutating call, so every operation is
//! atomic with respect to the others.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{ContactSubmission, NewSubmission, NewUser, SubmissionStatus, User, UserPatch};
use super::store::{ContentStore, EntityQuery, Lookup, StoreError, StoreResult};
use crate::resources::{Column, EntityDraft, EntityPatch, FieldKind, Record, ResourceSchema, TranslationInput};
use crate::types::{Language, SortOrder};

#[derive(Default)]
struct Tables {
    rows: HashMap<&'static str, Vec<Record>>,
    users: Vec<User>,
    submissions: Vec<ContactSubmission>,
}

impl Tables {
    fn table(&self, name: &'static str) -> &[Record] {
        self.rows.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, name: &'static str) -> &mut Vec<Record> {
        self.rows.entry(name).or_default()
    }
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away (and coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }
}

fn now_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn id_of(row: &Record) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn fill(columns: &[Column], supplied: &Record, row: &mut Record) {
    for column in columns {
        let value = supplied
            .get(column.name)
            .cloned()
            .unwrap_or_else(|| column.default.to_value());
        row.insert(column.name.to_string(), value);
    }
}

fn apply(columns: &[Column], supplied: &Record, row: &mut Record) {
    for column in columns {
        if let Some(value) = supplied.get(column.name) {
            row.insert(column.name.to_string(), value.clone());
        }
    }
}

fn translation_row(schema: &ResourceSchema, owner: &str, input: &TranslationInput) -> Record {
    let mut row = Map::new();
    row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    row.insert(schema.translations.foreign_key.into(), Value::String(owner.to_string()));
    row.insert("language".into(), Value::String(input.language.as_str().to_string()));
    fill(schema.translations.columns, &input.fields, &mut row);
    row
}

fn slug_taken(tables: &Tables, schema: &ResourceSchema, slug: &Value, except: Option<&str>) -> bool {
    tables
        .table(schema.table)
        .iter()
        .any(|row| row.get("slug") == Some(slug) && id_of(row) != except)
}

fn compare(kind: Option<FieldKind>, a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) if kind == Some(FieldKind::Timestamp) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn is_null(v: Option<&Value>) -> bool {
    matches!(v, None | Some(Value::Null))
}

impl MemoryStore {
    fn assemble(tables: &Tables, schema: &ResourceSchema, row: &Record, language: Option<Language>, with_children: bool) -> Value {
        let mut out = row.clone();
        let Some(id) = id_of(row) else {
            return Value::Object(out);
        };

        let translations: Vec<Value> = tables
            .table(schema.translations.table)
            .iter()
            .filter(|t| t.get(schema.translations.foreign_key).and_then(Value::as_str) == Some(id))
            .filter(|t| match language {
                Some(lang) => t.get("language").and_then(Value::as_str) == Some(lang.as_str()),
                None => true,
            })
            .cloned()
            .map(Value::Object)
            .collect();
        out.insert("translations".into(), Value::Array(translations));

        if let (true, Some(children)) = (with_children, &schema.children) {
            let mut rows: Vec<&Record> = tables
                .table(children.table)
                .iter()
                .filter(|c| c.get(children.foreign_key).and_then(Value::as_str) == Some(id))
                .collect();
            rows.sort_by(|a, b| compare(Some(FieldKind::Int), a.get(children.order_by), b.get(children.order_by)));
            out.insert(
                children.key.into(),
                Value::Array(rows.into_iter().cloned().map(Value::Object).collect()),
            );
        }

        Value::Object(out)
    }

    fn matches_search(tables: &Tables, schema: &ResourceSchema, id: &str, language: Language, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        tables.table(schema.translations.table).iter().any(|t| {
            t.get(schema.translations.foreign_key).and_then(Value::as_str) == Some(id)
                && t.get("language").and_then(Value::as_str) == Some(language.as_str())
                && schema.search_columns.iter().any(|col| {
                    t.get(*col)
                        .and_then(Value::as_str)
                        .map(|text| text.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
        })
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn insert_entity(&self, schema: &'static ResourceSchema, id: Uuid, draft: EntityDraft) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let id = id.to_string();
        let now = now_string();

        let mut row = Map::new();
        row.insert("id".into(), Value::String(id.clone()));
        fill(schema.columns, &draft.base, &mut row);
        row.insert("created_at".into(), Value::String(now.clone()));
        row.insert("updated_at".into(), Value::String(now));

        if schema.has_slug() {
            if let Some(slug) = row.get("slug") {
                if slug_taken(&tables, schema, slug, None) {
                    return Err(StoreError::Conflict(format!("{}_slug_key", schema.table)));
                }
            }
        }

        let mut seen = Vec::new();
        for t in &draft.translations {
            if seen.contains(&t.language) {
                return Err(StoreError::Conflict(format!("{}_language_key", schema.translations.table)));
            }
            seen.push(t.language);
        }

        let translations: Vec<Record> = draft
            .translations
            .iter()
            .map(|t| translation_row(schema, &id, t))
            .collect();

        tables.table_mut(schema.table).push(row);
        tables.table_mut(schema.translations.table).extend(translations);

        if let (Some(children), Some(items)) = (&schema.children, draft.children) {
            let rows: Vec<Record> = items
                .iter()
                .map(|item| {
                    let mut child = Map::new();
                    child.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
                    child.insert(children.foreign_key.into(), Value::String(id.clone()));
                    fill(children.columns, item, &mut child);
                    child
                })
                .collect();
            tables.table_mut(children.table).extend(rows);
        }

        Ok(())
    }

    async fn fetch_entity(
        &self,
        schema: &'static ResourceSchema,
        lookup: Lookup<'_>,
        language: Option<Language>,
    ) -> StoreResult<Option<Value>> {
        self.check()?;
        let tables = self.tables.read().await;
        let found = tables.table(schema.table).iter().find(|row| match lookup {
            Lookup::Id(id) => id_of(row) == Some(id.to_string().as_str()),
            Lookup::Slug(slug) => row.get("slug").and_then(Value::as_str) == Some(slug),
        });
        Ok(found.map(|row| Self::assemble(&tables, schema, row, language, true)))
    }

    async fn list_entities(&self, schema: &'static ResourceSchema, query: &EntityQuery) -> StoreResult<(Vec<Value>, i64)> {
        self.check()?;
        let tables = self.tables.read().await;

        let mut matching: Vec<&Record> = tables
            .table(schema.table)
            .iter()
            .filter(|row| query.filters.iter().all(|(column, value)| row.get(*column) == Some(value)))
            .filter(|row| match (&query.search, id_of(row)) {
                (Some(needle), Some(id)) => Self::matches_search(&tables, schema, id, query.language, needle),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .collect();

        let kind = schema.column(query.sort_column).map(|c| c.kind);
        matching.sort_by(|a, b| {
            let (x, y) = (a.get(query.sort_column), b.get(query.sort_column));
            match (is_null(x), is_null(y)) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => match query.sort_order {
                    SortOrder::Asc => compare(kind, x, y),
                    SortOrder::Desc => compare(kind, y, x),
                },
            }
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .map(|row| Self::assemble(&tables, schema, row, Some(query.language), false))
            .collect();

        Ok((page, total))
    }

    async fn existing_slugs(&self, schema: &'static ResourceSchema, base: &str) -> StoreResult<Vec<String>> {
        self.check()?;
        let tables = self.tables.read().await;
        let prefix = format!("{}-", base);
        Ok(tables
            .table(schema.table)
            .iter()
            .filter_map(|row| row.get("slug").and_then(Value::as_str))
            .filter(|slug| *slug == base || slug.starts_with(&prefix))
            .map(str::to_string)
            .collect())
    }

    async fn update_entity(&self, schema: &'static ResourceSchema, id: Uuid, patch: EntityPatch) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let id = id.to_string();

        let Some(index) = tables.table(schema.table).iter().position(|row| id_of(row) == Some(id.as_str())) else {
            return Err(StoreError::NotFound(format!("{} not found", schema.label)));
        };

        if let Some(slug) = patch.base.get("slug") {
            if schema.has_slug() && slug_taken(&tables, schema, slug, Some(id.as_str())) {
                return Err(StoreError::Conflict(format!("{}_slug_key", schema.table)));
            }
        }

        // Sequential per-language upserts keyed on (owner, language)
        for input in &patch.translations {
            let fk = schema.translations.foreign_key;
            let rows = tables.table_mut(schema.translations.table);
            let existing = rows.iter_mut().find(|t| {
                t.get(fk).and_then(Value::as_str) == Some(id.as_str())
                    && t.get("language").and_then(Value::as_str) == Some(input.language.as_str())
            });
            match existing {
                Some(row) => apply(schema.translations.columns, &input.fields, row),
                None => rows.push(translation_row(schema, &id, input)),
            }
        }

        if let (Some(children), Some(items)) = (&schema.children, patch.children) {
            let rows = tables.table_mut(children.table);
            rows.retain(|c| c.get(children.foreign_key).and_then(Value::as_str) != Some(id.as_str()));
            for item in &items {
                let mut child = Map::new();
                child.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
                child.insert(children.foreign_key.into(), Value::String(id.clone()));
                fill(children.columns, item, &mut child);
                rows.push(child);
            }
        }

        let row = &mut tables.table_mut(schema.table)[index];
        apply(schema.columns, &patch.base, row);
        row.insert("updated_at".into(), Value::String(now_string()));

        Ok(())
    }

    async fn delete_entity(&self, schema: &'static ResourceSchema, id: Uuid) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let id = id.to_string();

        let rows = tables.table_mut(schema.table);
        let before = rows.len();
        rows.retain(|row| id_of(row) != Some(id.as_str()));
        if rows.len() == before {
            return Err(StoreError::NotFound(format!("{} not found", schema.label)));
        }

        let fk = schema.translations.foreign_key;
        tables
            .table_mut(schema.translations.table)
            .retain(|t| t.get(fk).and_then(Value::as_str) != Some(id.as_str()));
        if let Some(children) = &schema.children {
            tables
                .table_mut(children.table)
                .retain(|c| c.get(children.foreign_key).and_then(Value::as_str) != Some(id.as_str()));
        }
        Ok(())
    }

    async fn increment_counter(&self, schema: &'static ResourceSchema, id: Uuid, column: &'static str) -> StoreResult<()> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let id = id.to_string();
        if let Some(row) = tables
            .table_mut(schema.table)
            .iter_mut()
            .find(|row| id_of(row) == Some(id.as_str()))
        {
            let next = row.get(column).and_then(Value::as_i64).unwrap_or(0) + 1;
            row.insert(column.to_string(), Value::from(next));
        }
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.check()?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: true,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<(Vec<User>, i64)> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = users.len() as i64;
        Ok((
            users.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect(),
            total,
        ))
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<User> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(active) = patch.is_active {
            user.is_active = active;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn insert_submission(&self, submission: NewSubmission) -> StoreResult<ContactSubmission> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let created = ContactSubmission {
            id: Uuid::new_v4(),
            name: submission.name,
            email: submission.email,
            phone: submission.phone,
            subject: submission.subject,
            message: submission.message,
            status: SubmissionStatus::New,
            created_at: now,
            updated_at: now,
        };
        tables.submissions.push(created.clone());
        Ok(created)
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<ContactSubmission>, i64)> {
        self.check()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<ContactSubmission> = tables
            .submissions
            .iter()
            .filter(|s| status.map_or(true, |wanted| s.status == wanted))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = rows.len() as i64;
        Ok((
            rows.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect(),
            total,
        ))
    }

    async fn update_submission_status(&self, id: Uuid, status: SubmissionStatus) -> StoreResult<ContactSubmission> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let submission = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound("Submission not found".to_string()))?;
        submission.status = status;
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }

    async fn approved_ratings(&self, product_id: Uuid) -> StoreResult<Vec<i32>> {
        self.check()?;
        let tables = self.tables.read().await;
        let product_id = product_id.to_string();
        Ok(tables
            .table(crate::resources::review::SCHEMA.table)
            .iter()
            .filter(|r| r.get("product_id").and_then(Value::as_str) == Some(product_id.as_str()))
            .filter(|r| r.get("status").and_then(Value::as_str) == Some("approved"))
            .filter_map(|r| r.get("rating").and_then(Value::as_i64))
            .map(|r| r as i32)
            .collect())
    }
}
