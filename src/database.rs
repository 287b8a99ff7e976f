//! Postgres pool setup and the idempotent schema bootstrap.

use sqlx::{postgres::PgPoolOptions, PgPool};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'deliveryman', 'admin')),
        image TEXT,
        phone TEXT,
        booking_count BIGINT NOT NULL DEFAULT 0,
        total_payment DOUBLE PRECISION,
        parcel_delivered BIGINT,
        average_review DOUBLE PRECISION,
        reviews JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS bookings (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        parcel_type TEXT NOT NULL,
        parcel_weight DOUBLE PRECISION NOT NULL,
        receiver_name TEXT NOT NULL,
        receiver_phone TEXT NOT NULL,
        delivery_address TEXT NOT NULL,
        requested_date DATE NOT NULL,
        latitude DOUBLE PRECISION,
        longitude DOUBLE PRECISION,
        price DOUBLE PRECISION NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'assigned', 'in-transit', 'delivered', 'cancelled')),
        deliveryman_id UUID REFERENCES users (id),
        aprx_delivery DATE,
        review JSONB,
        booked_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS users_role_idx ON users (role)",
    "CREATE INDEX IF NOT EXISTS bookings_email_idx ON bookings (email)",
    "CREATE INDEX IF NOT EXISTS bookings_deliveryman_idx ON bookings (deliveryman_id)",
];

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}
