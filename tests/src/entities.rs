use quarry::schema::{Descriptor, FieldType};
use quarry::stmt::{Row, Value};
use quarry::{Entity, Result};

use chrono::NaiveDateTime;
use std::sync::OnceLock;

/// Plain entity: no capability columns, storage-assigned integer key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub active: bool,
}

impl User {
    pub fn create(email: &str) -> User {
        User {
            id: None,
            email: email.to_string(),
            active: true,
        }
    }
}

impl Entity for User {
    fn descriptor() -> &'static Descriptor {
        static DESCRIPTOR: OnceLock<Descriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            Descriptor::builder("users")
                .field("users_id", FieldType::Int)
                .field("email", FieldType::Text)
                .field("active", FieldType::Bool)
                .build()
        })
    }

    fn load(row: &Row) -> Result<Self> {
        Ok(User {
            id: row.value("users_id").to_option_i64()?,
            email: row.value("email").to_string()?,
            active: row.value("active").to_bool()?,
        })
    }

    fn fill(&mut self, row: &Row) -> Result<()> {
        if let Some(value) = row.get("users_id") {
            self.id = value.clone().to_option_i64()?;
        }
        if let Some(value) = row.get("email") {
            self.email = value.clone().to_string()?;
        }
        if let Some(value) = row.get("active") {
            self.active = value.clone().to_bool()?;
        }
        Ok(())
    }

    fn extract(&self) -> Row {
        let mut row = Row::new();
        row.insert("users_id", self.id);
        row.insert("email", self.email.clone());
        row.insert("active", self.active);
        row
    }
}

/// Entity with every capability: timestamps, external id, and optimistic
/// locking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Article {
    pub id: Option<i64>,
    pub title: String,
    pub body: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub external_id: Option<String>,
    pub version: Option<i64>,
}

impl Article {
    pub fn create(title: &str) -> Article {
        Article {
            title: title.to_string(),
            body: "hello".to_string(),
            ..Article::default()
        }
    }
}

impl Entity for Article {
    fn descriptor() -> &'static Descriptor {
        static DESCRIPTOR: OnceLock<Descriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            Descriptor::builder("articles")
                .field("articles_id", FieldType::Int)
                .field("title", FieldType::Text)
                .field("body", FieldType::Text)
                .timestamped()
                .identified()
                .versioned()
                .build()
        })
    }

    fn load(row: &Row) -> Result<Self> {
        Ok(Article {
            id: row.value("articles_id").to_option_i64()?,
            title: row.value("title").to_string()?,
            body: row.value("body").to_string()?,
            created_at: optional_timestamp(row.value("created_at"))?,
            updated_at: optional_timestamp(row.value("updated_at"))?,
            external_id: row.value("external_id").to_option_string()?,
            version: row.value("version").to_option_i64()?,
        })
    }

    fn fill(&mut self, row: &Row) -> Result<()> {
        if let Some(value) = row.get("articles_id") {
            self.id = value.clone().to_option_i64()?;
        }
        if let Some(value) = row.get("title") {
            self.title = value.clone().to_string()?;
        }
        if let Some(value) = row.get("body") {
            self.body = value.clone().to_string()?;
        }
        if let Some(value) = row.get("created_at") {
            self.created_at = optional_timestamp(value.clone())?;
        }
        if let Some(value) = row.get("updated_at") {
            self.updated_at = optional_timestamp(value.clone())?;
        }
        if let Some(value) = row.get("external_id") {
            self.external_id = value.clone().to_option_string()?;
        }
        if let Some(value) = row.get("version") {
            self.version = value.clone().to_option_i64()?;
        }
        Ok(())
    }

    fn extract(&self) -> Row {
        let mut row = Row::new();
        row.insert("articles_id", self.id);
        row.insert("title", self.title.clone());
        row.insert("body", self.body.clone());
        row.insert("created_at", self.created_at);
        row.insert("updated_at", self.updated_at);
        row.insert("external_id", self.external_id.clone());
        row.insert("version", self.version);
        row
    }
}

fn optional_timestamp(value: Value) -> Result<Option<NaiveDateTime>> {
    match value {
        Value::Null => Ok(None),
        value => Ok(Some(value.to_timestamp()?)),
    }
}

/// Storage row for a [`User`], shaped like a driver result.
pub fn user_row(id: i64, email: &str) -> Row {
    let mut row = Row::new();
    row.insert("users_id", id);
    row.insert("email", email);
    row.insert("active", 1i64);
    row
}

/// Storage row for an [`Article`], shaped like a driver result.
pub fn article_row(id: i64, title: &str, version: i64) -> Row {
    let mut row = Row::new();
    row.insert("articles_id", id);
    row.insert("title", title);
    row.insert("body", "hello");
    row.insert("created_at", "2024-01-01 00:00:00");
    row.insert("updated_at", "2024-01-01 00:00:00");
    row.insert("external_id", "e4f0c4d2-3a86-4bd0-9b2f-0a4f6c3d8e10");
    row.insert("version", version);
    row
}
