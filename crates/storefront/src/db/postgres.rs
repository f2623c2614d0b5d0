//! `PostgreSQL` document store.
//!
//! User documents live in `storefront.users` with one JSONB column per
//! embedded array. Array operations run server side (`jsonb_set`,
//! `jsonb_array_elements`, `||`) so each call is a single statement, or a
//! single transaction where a count has to be returned.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};

use cartline_core::{Price, ProductId, UserId};

use super::{AppendOutcome, ArrayField, DocumentStore, RepositoryError};
use crate::models::{Product, UserDocument};

/// Document store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM storefront.users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

fn array_value<T: serde::Serialize>(items: &[T]) -> Result<Value, RepositoryError> {
    serde_json::to_value(items).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

fn decode_array<T: serde::de::DeserializeOwned>(
    value: Value,
    field: ArrayField,
    user: UserId,
) -> Result<Vec<T>, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("user {user} {field}: {e}")))
}

fn index_param(index: usize) -> Result<i32, RepositoryError> {
    i32::try_from(index).map_err(|_| RepositoryError::NotFound)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserDocument>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, cart, addresses, orders, version
            FROM storefront.users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserDocument {
            id: row.try_get("id")?,
            cart: decode_array(row.try_get("cart")?, ArrayField::Cart, id)?,
            addresses: decode_array(row.try_get("addresses")?, ArrayField::Addresses, id)?,
            orders: decode_array(row.try_get("orders")?, ArrayField::Orders, id)?,
            version: row.try_get("version")?,
        }))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, product_name, price, rating, image
            FROM storefront.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let rating: i16 = row.try_get("rating")?;
        let rating = u8::try_from(rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("product {id} has rating {rating}"))
        })?;

        Ok(Some(Product {
            id: row.try_get("id")?,
            name: row.try_get("product_name")?,
            price: row.try_get::<Price, _>("price")?,
            rating,
            image: row.try_get("image")?,
        }))
    }

    async fn insert_user(&self, user: &UserDocument) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.users (id, cart, addresses, orders, version)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user.id)
        .bind(array_value(&user.cart)?)
        .bind(array_value(&user.addresses)?)
        .bind(array_value(&user.orders)?)
        .bind(user.version)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user"))?;

        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.products (id, product_name, price, rating, image)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(i16::from(product.rating))
        .bind(&product.image)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        Ok(())
    }

    async fn append_to_array(
        &self,
        user: UserId,
        field: ArrayField,
        value: Value,
        max_len: Option<usize>,
    ) -> Result<AppendOutcome, RepositoryError> {
        let max_len = max_len.map(|n| i32::try_from(n).unwrap_or(i32::MAX));

        let col = field.name();
        let sql = format!(
            r"
            UPDATE storefront.users
            SET {col} = {col} || jsonb_build_array($2::jsonb),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
              AND ($3::int IS NULL OR jsonb_array_length({col}) < $3::int)
            "
        );

        let result = sqlx::query(&sql)
            .bind(user)
            .bind(value)
            .bind(max_len)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            Ok(AppendOutcome::Appended)
        } else if self.user_exists(user).await? {
            Ok(AppendOutcome::Full)
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    async fn overwrite_array(
        &self,
        user: UserId,
        field: ArrayField,
        values: Vec<Value>,
    ) -> Result<(), RepositoryError> {
        let col = field.name();
        let sql = format!(
            r"
            UPDATE storefront.users
            SET {col} = $2::jsonb,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            "
        );

        let result = sqlx::query(&sql)
            .bind(user)
            .bind(Value::Array(values))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_array_element_at(
        &self,
        user: UserId,
        field: ArrayField,
        index: usize,
        fields: Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        let index = index_param(index)?;
        let col = field.name();
        // Merging with `||` keeps keys of the element that are not in the patch.
        let sql = format!(
            r"
            UPDATE storefront.users
            SET {col} = jsonb_set({col}, $2::text[], ({col} -> $3::int) || $4::jsonb, false),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
              AND jsonb_array_length({col}) > $3::int
            "
        );

        let result = sqlx::query(&sql)
            .bind(user)
            .bind(vec![index.to_string()])
            .bind(index)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn remove_matching_from_array(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        value: Value,
    ) -> Result<usize, RepositoryError> {
        let col = field.name();
        let mut tx = self.pool.begin().await?;

        let lock_sql = format!(
            r"
            SELECT jsonb_array_length(u.{col}),
                   (SELECT COUNT(*)
                    FROM jsonb_array_elements(u.{col}) AS elem
                    WHERE elem -> $2::text IS NOT DISTINCT FROM $3::jsonb)
            FROM storefront.users u
            WHERE u.id = $1
            FOR UPDATE
            "
        );
        let locked: Option<(i32, i64)> = sqlx::query_as(&lock_sql)
            .bind(user)
            .bind(key)
            .bind(&value)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((before, matching)) = locked else {
            return Err(RepositoryError::NotFound);
        };
        if matching == 0 {
            tx.commit().await?;
            return Ok(0);
        }

        let update_sql = format!(
            r"
            UPDATE storefront.users
            SET {col} = COALESCE(
                    (SELECT jsonb_agg(t.elem ORDER BY t.ord)
                     FROM jsonb_array_elements({col}) WITH ORDINALITY AS t(elem, ord)
                     WHERE t.elem -> $2::text IS DISTINCT FROM $3::jsonb),
                    '[]'::jsonb),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING jsonb_array_length({col})
            "
        );
        let after: i32 = sqlx::query_scalar(&update_sql)
            .bind(user)
            .bind(key)
            .bind(value)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        usize::try_from(before - after)
            .map_err(|_| RepositoryError::DataCorruption(format!("{field} grew during removal")))
    }

    async fn sum_field(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        at_version: Option<i64>,
    ) -> Result<Decimal, RepositoryError> {
        let col = field.name();
        let sql = format!(
            r"
            SELECT COALESCE(SUM((elem ->> $2::text)::numeric), 0) AS total, u.version
            FROM storefront.users u
            LEFT JOIN LATERAL jsonb_array_elements(u.{col}) AS elem ON TRUE
            WHERE u.id = $1
            GROUP BY u.id, u.version
            "
        );

        let row: Option<(Decimal, i64)> = sqlx::query_as(&sql)
            .bind(user)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        let (total, version) = row.ok_or(RepositoryError::NotFound)?;

        match at_version {
            Some(expected) if expected != version => Err(RepositoryError::Conflict(format!(
                "user {user} changed before summing {field} (expected version {expected}, found {version})"
            ))),
            _ => Ok(total),
        }
    }

    async fn append_order(
        &self,
        user: UserId,
        order: Value,
        clear_cart_at_version: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.users
            SET orders = orders || jsonb_build_array($2::jsonb),
                cart = CASE WHEN $3::bigint IS NULL THEN cart ELSE '[]'::jsonb END,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
              AND ($3::bigint IS NULL OR version = $3::bigint)
            ",
        )
        .bind(user)
        .bind(order)
        .bind(clear_cart_at_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        if self.user_exists(user).await? {
            Err(RepositoryError::Conflict(format!(
                "user {user} changed during checkout"
            )))
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
