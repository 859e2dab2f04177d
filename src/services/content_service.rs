//! CRUD over any translatable resource, driven by its [`ResourceSchema`].

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{degrade, Listing, ServiceError, ServiceResult};
use crate::api::format::to_wire;
use crate::database::{ContentStore, Lookup};
use crate::error::FieldError;
use crate::resources::{EntityDraft, EntityPatch, ListQuery, Resource, ResourceSchema, TranslationInput};
use crate::types::Language;
use crate::utils::slug;

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    schema: &'static ResourceSchema,
}

/// Each language may appear once per payload
fn check_languages(translations: &[TranslationInput]) -> ServiceResult<()> {
    let mut errors = Vec::new();
    for (index, t) in translations.iter().enumerate() {
        if translations[..index].iter().any(|prev| prev.language == t.language) {
            errors.push(FieldError::new(
                format!("translations.{}.language", index),
                format!("Duplicate translation for language '{}'", t.language),
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, schema: &'static ResourceSchema) -> Self {
        Self { store, schema }
    }

    pub fn for_resource<R: Resource>(store: Arc<dyn ContentStore>) -> Self {
        Self::new(store, R::schema())
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    fn not_found(&self) -> ServiceError {
        ServiceError::NotFound(format!("{} not found", self.schema.label))
    }

    /// Explicit slug, else the English (or first) translation's display field.
    /// Collisions get the first free numeric suffix.
    async fn resolve_slug(&self, draft: &EntityDraft) -> ServiceResult<Option<String>> {
        let Some(source) = &self.schema.slug else {
            return Ok(None);
        };

        let candidate = match &draft.slug {
            Some(explicit) => explicit.clone(),
            None => {
                let text = draft
                    .translations
                    .iter()
                    .find(|t| t.language == Language::En)
                    .or_else(|| draft.translations.first())
                    .and_then(|t| t.fields.get(source.translation_field))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                slug::generate(text)
            }
        };
        let base = if candidate.is_empty() {
            self.schema.name.to_string()
        } else {
            candidate
        };

        let existing = self.store.existing_slugs(self.schema, &base).await?;
        Ok(Some(slug::make_unique(&base, &existing)))
    }

    pub async fn create(&self, mut draft: EntityDraft, actor: Option<Uuid>) -> ServiceResult<Value> {
        if self.schema.translations.required && draft.translations.is_empty() {
            return Err(ServiceError::field("translations", "At least one translation is required"));
        }
        check_languages(&draft.translations)?;

        if let Some(slug) = self.resolve_slug(&draft).await? {
            draft.base.insert("slug".to_string(), Value::String(slug));
        }
        if let (Some(column), Some(actor)) = (self.schema.author_column, actor) {
            draft
                .base
                .entry(column.to_string())
                .or_insert_with(|| Value::String(actor.to_string()));
        }

        let id = Uuid::new_v4();
        self.store.insert_entity(self.schema, id, draft).await?;
        info!("Created {} {}", self.schema.name, id);

        let created = self
            .store
            .fetch_entity(self.schema, Lookup::Id(id), None)
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("{} {} vanished after insert", self.schema.name, id)))?;
        Ok(to_wire(created))
    }

    /// Fetch one record with only `language`'s translation. Reading a published
    /// record of a counted resource bumps its view counter.
    pub async fn find(&self, lookup: Lookup<'_>, language: Language) -> ServiceResult<Value> {
        let mut record = self
            .store
            .fetch_entity(self.schema, lookup, Some(language))
            .await?
            .ok_or_else(|| self.not_found())?;

        if let Some(column) = self.schema.views_column {
            if record.get("status").and_then(Value::as_str) == Some("published") {
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .and_then(|s| Uuid::parse_str(s).ok());
                if let Some(id) = id {
                    match self.store.increment_counter(self.schema, id, column).await {
                        Ok(()) => {
                            let views = record.get(column).and_then(Value::as_i64).unwrap_or(0);
                            record[column] = Value::from(views + 1);
                        }
                        Err(e) => warn!("Failed to count view of {} {}: {}", self.schema.name, id, e),
                    }
                }
            }
        }

        Ok(to_wire(record))
    }

    pub async fn list(&self, list: &ListQuery) -> ServiceResult<Listing<Value>> {
        let result = self
            .store
            .list_entities(self.schema, &list.query)
            .await
            .map(|(rows, total)| Listing::new(rows.into_iter().map(to_wire).collect(), list.pagination.meta(total)))
            .map_err(ServiceError::from);
        degrade(result, list.pagination.page, list.pagination.limit)
    }

    pub async fn update(&self, id: Uuid, patch: EntityPatch) -> ServiceResult<Value> {
        check_languages(&patch.translations)?;

        self.store.update_entity(self.schema, id, patch).await?;
        info!("Updated {} {}", self.schema.name, id);

        let updated = self
            .store
            .fetch_entity(self.schema, Lookup::Id(id), None)
            .await?
            .ok_or_else(|| self.not_found())?;
        Ok(to_wire(updated))
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete_entity(self.schema, id).await.map_err(|e| match e {
            crate::database::StoreError::NotFound(_) => self.not_found(),
            other => other.into(),
        })?;
        info!("Deleted {} {}", self.schema.name, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::resources::news::NewsArticles;
    use crate::resources::partner::Partners;
    use crate::resources::product::Products;
    use serde_json::json;
    use std::collections::HashMap;

    fn setup() -> (Arc<MemoryStore>, ContentService, ContentService) {
        let store = Arc::new(MemoryStore::new());
        let products = ContentService::for_resource::<Products>(store.clone());
        let news = ContentService::for_resource::<NewsArticles>(store.clone());
        (store, products, news)
    }

    fn product(name: &str) -> EntityDraft {
        let input = serde_json::from_value(json!({
            "type": "upper_limb",
            "translations": [{ "language": "en", "name": name }]
        }))
        .unwrap();
        Products::draft(input)
    }

    #[tokio::test]
    async fn slugs_are_derived_and_deduplicated() {
        let (_, products, _) = setup();
        let first = products.create(product("Bionic Hand Pro"), None).await.unwrap();
        let second = products.create(product("Bionic Hand Pro"), None).await.unwrap();
        assert_eq!(first["slug"], "bionic-hand-pro");
        assert_eq!(second["slug"], "bionic-hand-pro-1");
    }

    #[tokio::test]
    async fn non_latin_names_fall_back_to_resource_name() {
        let (_, products, _) = setup();
        let input = serde_json::from_value(json!({
            "type": "lower_limb",
            "translations": [{ "language": "ru", "name": "Бионическая кисть" }]
        }))
        .unwrap();
        let created = products.create(Products::draft(input), None).await.unwrap();
        assert_eq!(created["slug"], "product");
    }

    #[tokio::test]
    async fn author_is_stamped_from_actor() {
        let (_, products, _) = setup();
        let actor = Uuid::new_v4();
        let created = products.create(product("Knee"), Some(actor)).await.unwrap();
        assert_eq!(created["createdBy"], actor.to_string());
    }

    #[tokio::test]
    async fn duplicate_languages_are_rejected() {
        let (_, products, _) = setup();
        let mut draft = product("Hand");
        draft.translations.push(draft.translations[0].clone());
        match products.create(draft, None).await {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "translations.1.language"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn translations_are_required_for_every_resource() {
        let (store, products, _) = setup();
        let mut draft = product("Hand");
        draft.translations.clear();
        assert!(matches!(products.create(draft, None).await, Err(ServiceError::Validation(_))));

        let partners = ContentService::for_resource::<Partners>(store);
        let input = serde_json::from_value(json!({ "name": "Ottobock" })).unwrap();
        match partners.create(Partners::draft(input), None).await {
            Err(ServiceError::Validation(errors)) => assert_eq!(errors[0].field, "translations"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn find_returns_only_requested_language() {
        let (_, products, _) = setup();
        let input = serde_json::from_value(json!({
            "type": "upper_limb",
            "translations": [
                { "language": "en", "name": "Hand", "description": "English" },
                { "language": "ru", "name": "Кисть", "description": "Русский" }
            ]
        }))
        .unwrap();
        let created = products.create(Products::draft(input), None).await.unwrap();
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let ru = products.find(Lookup::Id(id), Language::Ru).await.unwrap();
        let translations = ru["translations"].as_array().unwrap();
        assert_eq!(translations.len(), 1);
        assert_eq!(translations[0]["language"], "ru");
        assert_eq!(translations[0]["description"], "Русский");

        let arm = products.find(Lookup::Slug("hand"), Language::Arm).await.unwrap();
        assert_eq!(arm["translations"], json!([]));
    }

    #[tokio::test]
    async fn published_news_counts_views() {
        let (_, _, news) = setup();
        let input = serde_json::from_value(json!({
            "status": "published",
            "translations": [{ "language": "en", "title": "Launch", "content": "Body" }]
        }))
        .unwrap();
        let created = news.create(NewsArticles::draft(input), None).await.unwrap();
        assert!(created["publishedAt"].is_string());
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let first = news.find(Lookup::Id(id), Language::En).await.unwrap();
        let second = news.find(Lookup::Id(id), Language::En).await.unwrap();
        assert_eq!(first["viewsCount"], 1);
        assert_eq!(second["viewsCount"], 2);

        let draft = serde_json::from_value(json!({
            "translations": [{ "language": "en", "title": "Draft", "content": "Body" }]
        }))
        .unwrap();
        let draft = news.create(NewsArticles::draft(draft), None).await.unwrap();
        let draft_id = Uuid::parse_str(draft["id"].as_str().unwrap()).unwrap();
        let read = news.find(Lookup::Id(draft_id), Language::En).await.unwrap();
        assert_eq!(read["viewsCount"], 0);
    }

    #[tokio::test]
    async fn repeated_upserts_keep_one_row_per_language() {
        let (_, products, _) = setup();
        let created = products.create(product("Hand"), None).await.unwrap();
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let payload = json!({ "translations": [{ "language": "arm", "name": "Ձեռք" }] });
        for _ in 0..2 {
            let patch = Products::patch(serde_json::from_value(payload.clone()).unwrap());
            products.update(id, patch).await.unwrap();
        }

        let updated = products
            .update(id, Products::patch(serde_json::from_value(json!({})).unwrap()))
            .await
            .unwrap();
        let translations = updated["translations"].as_array().unwrap();
        assert_eq!(translations.len(), 2);
        let arm: Vec<_> = translations.iter().filter(|t| t["language"] == "arm").collect();
        assert_eq!(arm.len(), 1);
        assert_eq!(arm[0]["description"], Value::Null);
    }

    #[tokio::test]
    async fn update_patches_only_present_keys_and_replaces_specs() {
        let (_, products, _) = setup();
        let input = serde_json::from_value(json!({
            "type": "upper_limb",
            "sku": "BH-1",
            "translations": [{ "language": "en", "name": "Hand" }],
            "specs": [{ "specKey": "weight", "specValue": "400g" }, { "specKey": "dof", "specValue": "6" }]
        }))
        .unwrap();
        let created = products.create(Products::draft(input), None).await.unwrap();
        let id = Uuid::parse_str(created["id"].as_str().unwrap()).unwrap();

        let patch = Products::patch(
            serde_json::from_value(json!({
                "status": "published",
                "specs": [{ "specKey": "battery", "specValue": "12h", "displayOrder": 1 }]
            }))
            .unwrap(),
        );
        let updated = products.update(id, patch).await.unwrap();
        assert_eq!(updated["status"], "published");
        assert_eq!(updated["sku"], "BH-1");
        assert_eq!(updated["specs"].as_array().unwrap().len(), 1);
        assert_eq!(updated["specs"][0]["specKey"], "battery");

        let cleared = products
            .update(id, Products::patch(serde_json::from_value(json!({ "sku": null })).unwrap()))
            .await
            .unwrap();
        assert_eq!(cleared["sku"], Value::Null);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let (_, products, _) = setup();
        let id = Uuid::new_v4();
        let patch = Products::patch(serde_json::from_value(json!({ "sku": "X" })).unwrap());
        assert!(matches!(products.update(id, patch).await, Err(ServiceError::NotFound(_))));
        match products.delete(id).await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Product not found"),
            other => panic!("expected not found, got {:?}", other),
        }
        assert!(matches!(products.find(Lookup::Id(id), Language::En).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_filters_searches_and_pages() {
        let (_, products, _) = setup();
        for (name, kind) in [("Hand One", "upper_limb"), ("Hand Two", "upper_limb"), ("Knee", "lower_limb")] {
            let input = serde_json::from_value(json!({
                "type": kind,
                "translations": [{ "language": "en", "name": name }]
            }))
            .unwrap();
            products.create(Products::draft(input), None).await.unwrap();
        }

        let params: HashMap<String, String> = [("type", "upper_limb"), ("limit", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let list = ListQuery::parse(products.schema(), &params).unwrap();
        let page = products.list(&list).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.total_pages, 2);

        let params: HashMap<String, String> = [("search", "KNEE")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let list = ListQuery::parse(products.schema(), &params).unwrap();
        let page = products.list(&list).await.unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.items[0]["translations"][0]["name"], "Knee");
    }

    #[tokio::test]
    async fn outage_degrades_reads_and_fails_writes() {
        let (store, products, _) = setup();
        store.set_available(false);

        let params: HashMap<String, String> = [("page", "2"), ("limit", "5")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let list = ListQuery::parse(products.schema(), &params).unwrap();
        let page = products.list(&list).await.unwrap();
        assert!(page.degraded);
        assert!(page.items.is_empty());
        assert_eq!((page.meta.page, page.meta.limit, page.meta.total), (2, 5, 0));

        assert!(matches!(
            products.create(product("Hand"), None).await,
            Err(ServiceError::Unavailable(_))
        ));
    }
}
