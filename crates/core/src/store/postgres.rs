use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::query_builder::Separated;
use sqlx::{Encode, PgPool, Postgres, QueryBuilder, Type};

use super::{ContentStore, StoreResult};
use crate::content::{
    CarouselSlide, ConfigPatch, FeaturesPatch, Investment, InvestmentKind, InvestmentPatch,
    NewInvestment, NewProperty, NewSlide, Property, PropertyPatch, SettingsPatch, SiteConfig,
    SiteSettings, SlidePatch, User, UserUpsert,
};

const SLIDE_COLUMNS: &str = "id, title, description, image_url, created_at, updated_at";

const FEATURE_COLUMNS: &str =
    "area_mt2, bedrooms, bathrooms, suites, garage, pool, gym, bbq, condominium, iptu, price";

const CONFIG_COLUMNS: &str =
    "id, about, primary_color, font_size, logo_url, banner_url, created_at, updated_at";

const SETTINGS_COLUMNS: &str = "id, whatsapp, facebook, instagram, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in";

fn investment_columns() -> String {
    format!("id, kind, title, description, image_url, address, {FEATURE_COLUMNS}, created_at, updated_at")
}

fn property_columns() -> String {
    format!("id, title, description, location, main_image, {FEATURE_COLUMNS}, created_at, updated_at")
}

/// Postgres-backed content store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and verify it answers.
    pub async fn connect(url: &str, max_connections: u32, min_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        tracing::info!(max_connections, "Connected to PostgreSQL");

        Ok(Self { pool })
    }

    /// Apply the migrations under `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `column = value` when the field was supplied.
fn set_value<'args, T>(set: &mut Separated<'_, 'args, Postgres, &'static str>, column: &str, value: Option<T>)
where
    T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
{
    if let Some(value) = value {
        set.push(format!("{column} = "));
        set.push_bind_unseparated(value);
    }
}

fn set_features(set: &mut Separated<'_, '_, Postgres, &'static str>, patch: &FeaturesPatch) {
    set_value(set, "area_mt2", patch.area_mt2);
    set_value(set, "bedrooms", patch.bedrooms);
    set_value(set, "bathrooms", patch.bathrooms);
    set_value(set, "suites", patch.suites);
    set_value(set, "garage", patch.garage);
    set_value(set, "pool", patch.pool);
    set_value(set, "gym", patch.gym);
    set_value(set, "bbq", patch.bbq);
    set_value(set, "condominium", patch.condominium);
    set_value(set, "iptu", patch.iptu);
    set_value(set, "price", patch.price);
}

async fn delete_by_id(pool: &PgPool, table: &str, id: i64) -> StoreResult<bool> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl ContentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_slides(&self) -> StoreResult<Vec<CarouselSlide>> {
        let slides = sqlx::query_as::<_, CarouselSlide>(&format!(
            "SELECT {SLIDE_COLUMNS} FROM carousel_slides ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(slides)
    }

    async fn create_slide(&self, input: &NewSlide) -> StoreResult<CarouselSlide> {
        let slide = sqlx::query_as::<_, CarouselSlide>(&format!(
            r#"
            INSERT INTO carousel_slides (title, description, image_url)
            VALUES ($1, $2, $3)
            RETURNING {SLIDE_COLUMNS}
            "#
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(slide)
    }

    async fn update_slide(&self, id: i64, patch: &SlidePatch) -> StoreResult<Option<CarouselSlide>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE carousel_slides SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = now()");
            set_value(&mut set, "title", patch.title.clone());
            set_value(&mut set, "description", patch.description.clone());
            set_value(&mut set, "image_url", patch.image_url.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(SLIDE_COLUMNS);

        let slide = qb
            .build_query_as::<CarouselSlide>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(slide)
    }

    async fn delete_slide(&self, id: i64) -> StoreResult<bool> {
        delete_by_id(&self.pool, "carousel_slides", id).await
    }

    async fn list_investments(&self, kind: Option<InvestmentKind>) -> StoreResult<Vec<Investment>> {
        let investments = sqlx::query_as::<_, Investment>(&format!(
            r#"
            SELECT {}
            FROM investments
            WHERE $1::investment_kind IS NULL OR kind = $1
            ORDER BY created_at, id
            "#,
            investment_columns()
        ))
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(investments)
    }

    async fn create_investment(&self, input: &NewInvestment) -> StoreResult<Investment> {
        let features = input.features();
        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            INSERT INTO investments (kind, title, description, image_url, address, {FEATURE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            investment_columns()
        ))
        .bind(input.kind)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(&input.address)
        .bind(features.area_mt2)
        .bind(features.bedrooms)
        .bind(features.bathrooms)
        .bind(features.suites)
        .bind(features.garage)
        .bind(features.pool)
        .bind(features.gym)
        .bind(features.bbq)
        .bind(features.condominium)
        .bind(features.iptu)
        .bind(features.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(investment)
    }

    async fn update_investment(
        &self,
        id: i64,
        patch: &InvestmentPatch,
    ) -> StoreResult<Option<Investment>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE investments SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = now()");
            set_value(&mut set, "kind", patch.kind);
            set_value(&mut set, "title", patch.title.clone());
            set_value(&mut set, "description", patch.description.clone());
            set_value(&mut set, "image_url", patch.image_url.clone());
            set_value(&mut set, "address", patch.address.clone());
            set_features(&mut set, &patch.features());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(investment_columns());

        let investment = qb
            .build_query_as::<Investment>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(investment)
    }

    async fn delete_investment(&self, id: i64) -> StoreResult<bool> {
        delete_by_id(&self.pool, "investments", id).await
    }

    async fn list_properties(&self) -> StoreResult<Vec<Property>> {
        let properties = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY created_at, id",
            property_columns()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(properties)
    }

    async fn get_property(&self, id: i64) -> StoreResult<Option<Property>> {
        let property = sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            property_columns()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    async fn create_property(&self, input: &NewProperty) -> StoreResult<Property> {
        let features = input.features();
        let property = sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties (title, description, location, main_image, {FEATURE_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            property_columns()
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.main_image)
        .bind(features.area_mt2)
        .bind(features.bedrooms)
        .bind(features.bathrooms)
        .bind(features.suites)
        .bind(features.garage)
        .bind(features.pool)
        .bind(features.gym)
        .bind(features.bbq)
        .bind(features.condominium)
        .bind(features.iptu)
        .bind(features.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(property)
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> StoreResult<Option<Property>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE properties SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = now()");
            set_value(&mut set, "title", patch.title.clone());
            set_value(&mut set, "description", patch.description.clone());
            set_value(&mut set, "location", patch.location.clone());
            set_value(&mut set, "main_image", patch.main_image.clone());
            set_features(&mut set, &patch.features());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(property_columns());

        let property = qb
            .build_query_as::<Property>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(property)
    }

    async fn delete_property(&self, id: i64) -> StoreResult<bool> {
        delete_by_id(&self.pool, "properties", id).await
    }

    async fn get_config(&self) -> StoreResult<Option<SiteConfig>> {
        let config = sqlx::query_as::<_, SiteConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM site_config ORDER BY id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(config)
    }

    async fn upsert_config(&self, patch: &ConfigPatch) -> StoreResult<SiteConfig> {
        // Existence is checked first; the table carries no uniqueness guard.
        let id = match self.get_config().await? {
            Some(existing) => existing.id,
            None => {
                sqlx::query_scalar::<_, i64>("INSERT INTO site_config DEFAULT VALUES RETURNING id")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE site_config SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = now()");
            set_value(&mut set, "about", patch.about.clone());
            set_value(&mut set, "primary_color", patch.primary_color.clone());
            set_value(&mut set, "font_size", patch.font_size);
            set_value(&mut set, "logo_url", patch.logo_url.clone());
            set_value(&mut set, "banner_url", patch.banner_url.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(CONFIG_COLUMNS);

        let config = qb.build_query_as::<SiteConfig>().fetch_one(&self.pool).await?;
        Ok(config)
    }

    async fn get_settings(&self) -> StoreResult<Option<SiteSettings>> {
        let settings = sqlx::query_as::<_, SiteSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM site_settings ORDER BY id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn upsert_settings(&self, patch: &SettingsPatch) -> StoreResult<SiteSettings> {
        let id = match self.get_settings().await? {
            Some(existing) => existing.id,
            None => {
                sqlx::query_scalar::<_, i64>("INSERT INTO site_settings DEFAULT VALUES RETURNING id")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE site_settings SET ");
        {
            let mut set = qb.separated(", ");
            set.push("updated_at = now()");
            set_value(&mut set, "whatsapp", patch.whatsapp.clone());
            set_value(&mut set, "facebook", patch.facebook.clone());
            set_value(&mut set, "instagram", patch.instagram.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(SETTINGS_COLUMNS);

        let settings = qb
            .build_query_as::<SiteSettings>()
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE open_id = $1"
        ))
        .bind(open_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upsert_user(&self, input: &UserUpsert) -> StoreResult<User> {
        let signed_in = input.last_signed_in.unwrap_or_else(Utc::now);
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (open_id, name, email, login_method, role, last_signed_in)
            VALUES ($1, $2, $3, $4, COALESCE($5::user_role, 'user'::user_role), $6)
            ON CONFLICT (open_id) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, users.name),
                email = COALESCE(EXCLUDED.email, users.email),
                login_method = COALESCE(EXCLUDED.login_method, users.login_method),
                role = COALESCE($5::user_role, users.role),
                last_signed_in = EXCLUDED.last_signed_in,
                updated_at = now()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.open_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.login_method)
        .bind(input.role)
        .bind(signed_in)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
