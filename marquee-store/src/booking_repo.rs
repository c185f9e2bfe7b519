use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_engine::{Booking, BookingRepository};
use marquee_shared::{BookingId, SeatId, ShowId};
use sqlx::{PgPool, Row};
use std::error::Error;
use tracing::info;
use uuid::Uuid;

/// Postgres-backed booking ledger. One transaction per booking: the
/// booking row plus one row per seat commit or roll back together.
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn seats_for(&self, booking_id: Uuid) -> Result<Vec<SeatId>, sqlx::Error> {
        let rows = sqlx::query("SELECT seat_id FROM booking_seats WHERE booking_id = $1 ORDER BY seat_id")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| SeatId::from(r.get::<String, _>("seat_id")))
            .collect())
    }

    fn booking_from_row(row: &sqlx::postgres::PgRow, seats: Vec<SeatId>) -> Booking {
        Booking {
            id: BookingId::from(row.get::<Uuid, _>("id")),
            show_id: ShowId::from(row.get::<Uuid, _>("show_id")),
            seats,
            requester: row.get::<String, _>("requester").into(),
            total_price: row.get::<i32, _>("total_price_cents"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO bookings (id, show_id, requester, total_price_cents, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.show_id.as_uuid())
        .bind(booking.requester.as_str())
        .bind(booking.total_price)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await?;

        for seat in &booking.seats {
            sqlx::query("INSERT INTO booking_seats (booking_id, seat_id) VALUES ($1, $2)")
                .bind(booking.id.as_uuid())
                .bind(seat.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(booking = %booking.id, "booking persisted");
        Ok(())
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT id, show_id, requester, total_price_cents, created_at \
             FROM bookings WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let seats = self.seats_for(id.as_uuid()).await?;
                Ok(Some(Self::booking_from_row(&row, seats)))
            }
            None => Ok(None),
        }
    }

    async fn list_for_show(
        &self,
        show_id: ShowId,
    ) -> Result<Vec<Booking>, Box<dyn Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id, show_id, requester, total_price_cents, created_at \
             FROM bookings WHERE show_id = $1 ORDER BY created_at",
        )
        .bind(show_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let booking_id: Uuid = row.get("id");
            let seats = self.seats_for(booking_id).await?;
            bookings.push(Self::booking_from_row(&row, seats));
        }
        Ok(bookings)
    }
}
