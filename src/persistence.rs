//! Persistence collaborator boundary
//!
//! The engine hands a finalized [`CanonicalRecord`] to a
//! [`CanonicalRecordStore`] and does nothing else: no retries, no
//! timeouts, failures propagate unchanged. The Postgres store writes the
//! `identity_cards` table with typed columns, coercing the text-only
//! canonical record at the boundary (multi-format dates, integer age,
//! boolean signature flag).

use async_trait::async_trait;

use crate::resolution::CanonicalRecord;

/// Destination for finalized canonical records.
#[async_trait]
pub trait CanonicalRecordStore: Send + Sync {
    async fn save(&self, record: &CanonicalRecord) -> anyhow::Result<()>;
}

/// In-memory store for tests and wiring without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: tokio::sync::Mutex<Vec<CanonicalRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn saved(&self) -> Vec<CanonicalRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl CanonicalRecordStore for MemoryStore {
    async fn save(&self, record: &CanonicalRecord) -> anyhow::Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

#[cfg(feature = "database")]
pub use pg::PgIdentityCardStore;

#[cfg(feature = "database")]
mod pg {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sqlx::PgPool;
    use tracing::info;

    use crate::catalog::FieldKey;
    use crate::resolution::CanonicalRecord;

    use super::CanonicalRecordStore;

    /// Accepted date layouts, tried in order.
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

    /// Parse a date in any accepted layout; unparseable text is stored as
    /// NULL rather than failing the save.
    fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
        let value = value?;
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
    }

    fn parse_age(value: Option<&str>) -> Option<i32> {
        value.and_then(|v| v.trim().parse().ok())
    }

    fn parse_flag(value: Option<&str>) -> bool {
        matches!(
            value.map(|v| v.trim().to_lowercase()).as_deref(),
            Some("true") | Some("yes")
        )
    }

    /// Writes canonical records into the `identity_cards` table.
    #[derive(Clone, Debug)]
    pub struct PgIdentityCardStore {
        pool: PgPool,
    }

    impl PgIdentityCardStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl CanonicalRecordStore for PgIdentityCardStore {
        async fn save(&self, record: &CanonicalRecord) -> Result<()> {
            let get = |key: &str| record.get(&FieldKey::from(key)).map(str::to_string);

            sqlx::query(
                r#"
                INSERT INTO identity_cards (
                    issuing_country, authority, card_type, full_name, surname,
                    sex, date_of_birth, age, nationality, id_number,
                    issuing_date, expiry_date, signature_present
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(get("issuing_country"))
            .bind(get("authority"))
            .bind(get("card_type"))
            .bind(get("full_name"))
            .bind(get("surname"))
            .bind(get("sex"))
            .bind(parse_date(record.get(&FieldKey::from("date_of_birth"))))
            .bind(parse_age(record.get(&FieldKey::from("age"))))
            .bind(get("nationality"))
            .bind(get("id_number"))
            .bind(parse_date(record.get(&FieldKey::from("issuing_date"))))
            .bind(parse_date(record.get(&FieldKey::from("expiry_date"))))
            .bind(parse_flag(record.get(&FieldKey::from("signature_present"))))
            .execute(&self.pool)
            .await
            .context("inserting identity card record")?;

            info!("persisted identity card record");
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_date_formats() {
            let expected = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
            assert_eq!(parse_date(Some("1990-05-01")), Some(expected));
            assert_eq!(parse_date(Some("01/05/1990")), Some(expected));
            assert_eq!(parse_date(Some("01-05-1990")), Some(expected));
            assert_eq!(parse_date(Some("May 1st 1990")), None);
            assert_eq!(parse_date(None), None);
        }

        #[test]
        fn test_parse_age() {
            assert_eq!(parse_age(Some(" 34 ")), Some(34));
            assert_eq!(parse_age(Some("thirty")), None);
            assert_eq!(parse_age(None), None);
        }

        #[test]
        fn test_parse_flag() {
            assert!(parse_flag(Some("true")));
            assert!(parse_flag(Some("Yes")));
            assert!(!parse_flag(Some("no")));
            assert!(!parse_flag(None));
        }
    }
}
