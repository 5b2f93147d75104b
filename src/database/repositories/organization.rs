use anyhow::Result;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::{Credential, NewCredential, Organization, SignupInput};

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: SqlitePool,
}

impl OrganizationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT
                id,
                hospital_name,
                admin_name,
                admin_email,
                created_at
            FROM
                organizations
            WHERE
                id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    /// Indexed lookup of the credential a secret maps to.
    pub async fn find_credential_by_key(&self, credential_key: &str) -> Result<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT
                id,
                organization_id,
                role,
                credential_key,
                password_hash,
                created_at
            FROM
                credentials
            WHERE
                credential_key = ?
            "#,
        )
        .bind(credential_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    pub async fn credential_key_exists(&self, credential_key: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                COUNT(*)
            FROM
                credentials
            WHERE
                credential_key = ?
            "#,
        )
        .bind(credential_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Inserts the organization row and both of its credentials.
    pub async fn insert_with_credentials(
        conn: &mut SqliteConnection,
        input: &SignupInput,
        credentials: &[NewCredential],
    ) -> Result<Organization, sqlx::Error> {
        let now = Utc::now();
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO
                organizations (hospital_name, admin_name, admin_email, created_at)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                hospital_name,
                admin_name,
                admin_email,
                created_at
            "#,
        )
        .bind(&input.hospital_name)
        .bind(&input.admin_name)
        .bind(&input.admin_email)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        for credential in credentials {
            sqlx::query(
                r#"
                INSERT INTO
                    credentials (organization_id, role, credential_key, password_hash, created_at)
                VALUES
                    (?, ?, ?, ?, ?)
                "#,
            )
            .bind(organization.id)
            .bind(credential.role)
            .bind(&credential.credential_key)
            .bind(&credential.password_hash)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }

        Ok(organization)
    }
}
