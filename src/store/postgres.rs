use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{BookingStore, IdentityStore, Page, SocialLogin, StoreError, StoreResult, UpdateOutcome};
use crate::models::{
    AdminBookingUpdate, Booking, BookingId, BookingStatus, NewBooking, NewUser, ProfileUpdate,
    Review, Role, User, UserId,
};

macro_rules! user_columns {
    () => {
        "id, name, email, role, image, phone, booking_count, total_payment, parcel_delivered, \
         average_review, reviews, created_at"
    };
}

macro_rules! booking_columns {
    () => {
        "id, name, email, phone, parcel_type, parcel_weight, receiver_name, receiver_phone, \
         delivery_address, requested_date, latitude, longitude, price, status, deliveryman_id, \
         aprx_delivery, review, booked_at"
    };
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    image: Option<String>,
    phone: Option<String>,
    booking_count: i64,
    total_payment: Option<f64>,
    parcel_delivered: Option<i64>,
    average_review: Option<f64>,
    reviews: Json<Vec<Review>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            name: row.name,
            email: row.email,
            image: row.image,
            phone: row.phone,
            booking_count: row.booking_count,
            total_payment: row.total_payment,
            parcel_delivered: row.parcel_delivered,
            average_review: row.average_review,
            reviews: row.reviews.0,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    parcel_type: String,
    parcel_weight: f64,
    receiver_name: String,
    receiver_phone: String,
    delivery_address: String,
    requested_date: NaiveDate,
    latitude: Option<f64>,
    longitude: Option<f64>,
    price: f64,
    status: String,
    deliveryman_id: Option<Uuid>,
    aprx_delivery: Option<NaiveDate>,
    review: Option<Json<Review>>,
    booked_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: BookingId(row.id),
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            name: row.name,
            email: row.email,
            phone: row.phone,
            parcel_type: row.parcel_type,
            parcel_weight: row.parcel_weight,
            receiver_name: row.receiver_name,
            receiver_phone: row.receiver_phone,
            delivery_address: row.delivery_address,
            requested_date: row.requested_date,
            latitude: row.latitude,
            longitude: row.longitude,
            price: row.price,
            deliveryman_id: row.deliveryman_id.map(UserId),
            aprx_delivery: row.aprx_delivery,
            review: row.review.map(|r| r.0),
            booked_at: row.booked_at,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn map_unique_violation(e: sqlx::Error, what: String) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Conflict(what);
        }
    }
    StoreError::Database(e)
}

#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let email = new.email.clone();
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, name, email, role, image, phone) VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            user_columns!()
        ))
        .bind(UserId::generate().0)
        .bind(new.name)
        .bind(new.email)
        .bind(new.role.as_str())
        .bind(new.image)
        .bind(new.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("email {email}")))?;
        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(concat!("SELECT ", user_columns!(), " FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn upsert_social_login(&self, new: NewUser) -> StoreResult<SocialLogin> {
        let inserted = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, name, email, role, image, phone) VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (email) DO NOTHING RETURNING ",
            user_columns!()
        ))
        .bind(UserId::generate().0)
        .bind(new.name)
        .bind(new.email)
        .bind(new.role.as_str())
        .bind(new.image)
        .bind(new.phone)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(SocialLogin::Created(row.try_into()?)),
            None => Ok(SocialLogin::AlreadyExists),
        }
    }

    async fn list_by_role(&self, role: Role, page: Page) -> StoreResult<Vec<User>> {
        // LIMIT NULL means no limit in Postgres
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(),
            " FROM users WHERE role = $1 ORDER BY created_at, id OFFSET $2 LIMIT $3"
        ))
        .bind(role.as_str())
        .bind(page.offset())
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn update_profile_fields(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query(
            r#"UPDATE users SET image = COALESCE($2, image),
                booking_count = COALESCE($3, booking_count),
                total_payment = COALESCE($4, total_payment),
                parcel_delivered = COALESCE($5, parcel_delivered)
                WHERE id = $1"#,
        )
        .bind(id.0)
        .bind(update.image.as_deref())
        .bind(update.booking_count)
        .bind(update.total_payment)
        .bind(update.parcel_delivered)
        .execute(&self.pool)
        .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn change_role(&self, id: UserId, role: Role) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id.0)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn init_deliveryman_stats(&self, id: UserId) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query("UPDATE users SET average_review = 0, parcel_delivered = 0 WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn increment_parcel_delivered(&self, id: UserId) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query(
            "UPDATE users SET parcel_delivered = COALESCE(parcel_delivered, 0) + 1 WHERE id = $1",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn append_review(&self, id: UserId, review: &Review) -> StoreResult<UpdateOutcome> {
        // Single statement: the row lock serialises concurrent appends and the
        // average is computed from the same list that gets stored.
        let res = sqlx::query(
            r#"UPDATE users SET
                reviews = reviews || jsonb_build_array($2::jsonb),
                average_review = (
                    SELECT AVG((r->>'rating')::float8)
                    FROM jsonb_array_elements(reviews || jsonb_build_array($2::jsonb)) AS r
                )
                WHERE id = $1"#,
        )
        .bind(id.0)
        .bind(Json(review))
        .execute(&self.pool)
        .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }
}

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BookingStore for PgBookingStore {
    async fn create_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(concat!(
            "INSERT INTO bookings (id, name, email, phone, parcel_type, parcel_weight, receiver_name, \
             receiver_phone, delivery_address, requested_date, latitude, longitude, price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING ",
            booking_columns!()
        ))
        .bind(BookingId::generate().0)
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.parcel_type)
        .bind(new.parcel_weight)
        .bind(new.receiver_name)
        .bind(new.receiver_phone)
        .bind(new.delivery_address)
        .bind(new.requested_date)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.price)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        sqlx::query_as::<_, BookingRow>(concat!("SELECT ", booking_columns!(), " FROM bookings WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_for_requester(&self, email: &str) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ", booking_columns!(), " FROM bookings WHERE email = $1 ORDER BY booked_at DESC, id"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn list_for_deliveryman(&self, deliveryman_id: UserId) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ", booking_columns!(), " FROM bookings WHERE deliveryman_id = $1 ORDER BY booked_at DESC, id"
        ))
        .bind(deliveryman_id.0)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(concat!(
            "SELECT ", booking_columns!(), " FROM bookings ORDER BY booked_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn update_by_admin(&self, id: BookingId, update: &AdminBookingUpdate) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query(
            r#"UPDATE bookings SET status = $2,
                aprx_delivery = COALESCE($3, aprx_delivery),
                deliveryman_id = COALESCE($4, deliveryman_id)
                WHERE id = $1"#,
        )
        .bind(id.0)
        .bind(update.status.as_str())
        .bind(update.aprx_delivery)
        .bind(update.deliveryman_id.map(|d| d.0))
        .execute(&self.pool)
        .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn transition_status(&self, id: BookingId, from: BookingStatus, to: BookingStatus) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query("UPDATE bookings SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id.0)
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(&self.pool)
            .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn attach_review(&self, id: BookingId, review: &Review) -> StoreResult<UpdateOutcome> {
        let res = sqlx::query("UPDATE bookings SET review = $2 WHERE id = $1")
            .bind(id.0)
            .bind(Json(review))
            .execute(&self.pool)
            .await?;
        Ok(UpdateOutcome::matched(res.rows_affected()))
    }

    async fn count_all(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: BookingStatus) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
