use crate::models::{
    driver_phone, LoadRequest, LoadRequestStatus, NewTrip, ReliabilityMetrics, ReliabilityRecord, Trip,
    VehicleCandidate, MAX_RATING, MIN_RATING,
};
use crate::services::store::{DispatchStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

/// Direct PostgreSQL access to the dispatch schema
///
/// Used when the service runs next to its own database instead of the
/// hosted REST endpoint. Runs the bundled migrations on connect.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool (migrations are not run)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Ids are UUIDs in this schema; anything else cannot match a row
fn parse_id(id: &str, what: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound(format!("{} {}", what, id)))
}

const TRIP_COLUMNS: &str = r#"
    id::text AS id,
    load_request_id::text AS load_request_id,
    vehicle_id::text AS vehicle_id,
    owner_id::text AS owner_id,
    client_rate,
    owner_rate,
    margin_amount,
    created_at
"#;

const RELIABILITY_COLUMNS: &str = r#"
    vehicle_id::text AS vehicle_id,
    ontime_pickup_score,
    ontime_delivery_score,
    communication_score,
    behavior_score,
    vehicle_condition_score,
    trips_completed,
    last_trip_date
"#;

fn score(row: &PgRow, column: &str) -> Result<Option<u8>, StoreError> {
    let value: Option<i16> = row.try_get(column)?;
    Ok(value
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| (MIN_RATING..=MAX_RATING).contains(v)))
}

fn metrics_from_row(row: &PgRow) -> Result<ReliabilityMetrics, StoreError> {
    Ok(ReliabilityMetrics {
        ontime_pickup_score: score(row, "ontime_pickup_score")?,
        ontime_delivery_score: score(row, "ontime_delivery_score")?,
        communication_score: score(row, "communication_score")?,
        behavior_score: score(row, "behavior_score")?,
        vehicle_condition_score: score(row, "vehicle_condition_score")?,
    })
}

fn rating(score: Option<u8>) -> Option<i16> {
    score.map(i16::from)
}

fn candidate_from_row(row: &PgRow) -> Result<VehicleCandidate, StoreError> {
    let has_reliability: bool = row.try_get("has_reliability")?;
    let reliability = if has_reliability {
        Some(metrics_from_row(row)?)
    } else {
        None
    };

    Ok(VehicleCandidate {
        vehicle_id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        vehicle_type: row.try_get("vehicle_type")?,
        vehicle_model: row.try_get("vehicle_model")?,
        registration_number: row.try_get("registration_number")?,
        min_rate_per_km: row.try_get("min_rate_per_km")?,
        payload_tons: row.try_get("payload_tons")?,
        max_distance_km: row.try_get("max_distance_km")?,
        preferred_routes: row.try_get::<Option<Vec<String>>, _>("preferred_routes")?.unwrap_or_default(),
        avoid_routes: row.try_get::<Option<Vec<String>>, _>("avoid_routes")?.unwrap_or_default(),
        city_only: row.try_get("city_only")?,
        reliability,
        owner_name: row.try_get("owner_name")?,
        driver_phone: driver_phone(row.try_get("phone_primary")?, row.try_get("phone_alternate")?),
    })
}

fn trip_from_row(row: &PgRow) -> Result<Trip, StoreError> {
    Ok(Trip {
        id: row.try_get("id")?,
        load_request_id: row.try_get("load_request_id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        owner_id: row.try_get("owner_id")?,
        client_rate: row.try_get("client_rate")?,
        owner_rate: row.try_get("owner_rate")?,
        margin_amount: row.try_get("margin_amount")?,
        created_at: row.try_get("created_at")?,
    })
}

fn reliability_from_row(row: &PgRow) -> Result<ReliabilityRecord, StoreError> {
    Ok(ReliabilityRecord {
        vehicle_id: row.try_get("vehicle_id")?,
        metrics: metrics_from_row(row)?,
        trips_completed: row.try_get("trips_completed")?,
        last_trip_date: row.try_get("last_trip_date")?,
    })
}

#[async_trait]
impl DispatchStore for PostgresStore {
    async fn fetch_candidates(&self, vehicle_type: &str) -> Result<Vec<VehicleCandidate>, StoreError> {
        let query = r#"
            SELECT
                v.id::text AS id,
                v.owner_id::text AS owner_id,
                v.vehicle_type,
                v.vehicle_model,
                v.registration_number,
                v.min_rate_per_km,
                v.payload_tons,
                v.max_distance_km,
                v.preferred_routes,
                v.avoid_routes,
                v.city_only,
                o.owner_name,
                o.phone_primary,
                o.phone_alternate,
                r.vehicle_id IS NOT NULL AS has_reliability,
                r.ontime_pickup_score,
                r.ontime_delivery_score,
                r.communication_score,
                r.behavior_score,
                r.vehicle_condition_score
            FROM vehicles v
            LEFT JOIN owners o ON o.id = v.owner_id
            LEFT JOIN LATERAL (
                SELECT *
                FROM reliability_scores rs
                WHERE rs.vehicle_id = v.id
                ORDER BY rs.last_trip_date DESC NULLS LAST
                LIMIT 1
            ) r ON TRUE
            WHERE v.vehicle_type = $1 AND v.active = TRUE
            ORDER BY v.created_at, v.id
        "#;

        let rows = sqlx::query(query).bind(vehicle_type).fetch_all(&self.pool).await?;

        let candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} {} candidates", candidates.len(), vehicle_type);

        Ok(candidates)
    }

    async fn get_load_request(&self, id: &str) -> Result<LoadRequest, StoreError> {
        let query = r#"
            SELECT
                id::text AS id,
                provider_id::text AS provider_id,
                pickup_location,
                drop_location,
                material_type,
                weight_tons,
                distance_km,
                vehicle_type_needed,
                quoted_budget,
                status,
                required_date,
                notes,
                created_at
            FROM load_requests
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(parse_id(id, "Load request")?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Load request {}", id)))?;

        let status: String = row.try_get("status")?;

        Ok(LoadRequest {
            id: row.try_get("id")?,
            provider_id: row.try_get("provider_id")?,
            pickup_location: row.try_get("pickup_location")?,
            drop_location: row.try_get("drop_location")?,
            material_type: row.try_get("material_type")?,
            weight_tons: row.try_get("weight_tons")?,
            distance_km: row.try_get("distance_km")?,
            vehicle_type_needed: row.try_get("vehicle_type_needed")?,
            quoted_budget: row.try_get("quoted_budget")?,
            status: status.parse().map_err(StoreError::InvalidResponse)?,
            required_date: row.try_get("required_date")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn get_vehicle_owner(&self, vehicle_id: &str) -> Result<String, StoreError> {
        let row = sqlx::query("SELECT owner_id::text AS owner_id FROM vehicles WHERE id = $1")
            .bind(parse_id(vehicle_id, "Vehicle")?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Vehicle {}", vehicle_id)))?;

        Ok(row.try_get("owner_id")?)
    }

    async fn create_trip(&self, trip: &NewTrip) -> Result<Trip, StoreError> {
        // margin_amount is generated by the database
        let query = format!(
            "INSERT INTO trips (load_request_id, vehicle_id, owner_id, client_rate, owner_rate) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TRIP_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(parse_id(&trip.load_request_id, "Load request")?)
            .bind(parse_id(&trip.vehicle_id, "Vehicle")?)
            .bind(parse_id(&trip.owner_id, "Owner")?)
            .bind(trip.client_rate)
            .bind(trip.owner_rate)
            .fetch_one(&self.pool)
            .await?;

        let created = trip_from_row(&row)?;

        tracing::debug!("Created trip {} for load request {}", created.id, created.load_request_id);

        Ok(created)
    }

    async fn get_trip(&self, id: &str) -> Result<Trip, StoreError> {
        let query = format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS);

        let row = sqlx::query(&query)
            .bind(parse_id(id, "Trip")?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Trip {}", id)))?;

        trip_from_row(&row)
    }

    async fn record_reliability(
        &self,
        vehicle_id: &str,
        metrics: &ReliabilityMetrics,
    ) -> Result<ReliabilityRecord, StoreError> {
        let vehicle = parse_id(vehicle_id, "Vehicle")?;
        let today = chrono::Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let existing: Option<(Uuid, i32)> = sqlx::query_as(
            "SELECT id, trips_completed FROM reliability_scores \
             WHERE vehicle_id = $1 \
             ORDER BY last_trip_date DESC NULLS LAST \
             LIMIT 1 FOR UPDATE",
        )
        .bind(vehicle)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing {
            Some((row_id, trips_completed)) => {
                let query = format!(
                    "UPDATE reliability_scores SET \
                     ontime_pickup_score = $2, ontime_delivery_score = $3, communication_score = $4, \
                     behavior_score = $5, vehicle_condition_score = $6, \
                     trips_completed = $7, last_trip_date = $8 \
                     WHERE id = $1 RETURNING {}",
                    RELIABILITY_COLUMNS
                );
                sqlx::query(&query)
                    .bind(row_id)
                    .bind(rating(metrics.ontime_pickup_score))
                    .bind(rating(metrics.ontime_delivery_score))
                    .bind(rating(metrics.communication_score))
                    .bind(rating(metrics.behavior_score))
                    .bind(rating(metrics.vehicle_condition_score))
                    .bind(trips_completed + 1)
                    .bind(today)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO reliability_scores \
                     (vehicle_id, ontime_pickup_score, ontime_delivery_score, communication_score, \
                      behavior_score, vehicle_condition_score, trips_completed, last_trip_date) \
                     VALUES ($1, $2, $3, $4, $5, $6, 1, $7) RETURNING {}",
                    RELIABILITY_COLUMNS
                );
                sqlx::query(&query)
                    .bind(vehicle)
                    .bind(rating(metrics.ontime_pickup_score))
                    .bind(rating(metrics.ontime_delivery_score))
                    .bind(rating(metrics.communication_score))
                    .bind(rating(metrics.behavior_score))
                    .bind(rating(metrics.vehicle_condition_score))
                    .bind(today)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        let record = reliability_from_row(&row)?;

        tracing::debug!(
            "Recorded reliability for vehicle {} ({} trips)",
            vehicle_id,
            record.trips_completed
        );

        Ok(record)
    }

    async fn update_load_request_status(
        &self,
        id: &str,
        status: LoadRequestStatus,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE load_requests SET status = $2 WHERE id = $1")
            .bind(parse_id(id, "Load request")?)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Load request {}", id)));
        }

        tracing::debug!("Load request {} -> {}", id, status.as_str());

        Ok(())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_rejects_non_uuid() {
        assert!(matches!(parse_id("lr-1", "Load request"), Err(StoreError::NotFound(_))));
        assert!(parse_id("6f1c8a2e-1d4b-4e5f-9a3b-2c7d8e9f0a1b", "Load request").is_ok());
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_fetch_candidates_joins_latest_reliability() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let store = PostgresStore::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        let owner_id: Uuid = sqlx::query_scalar(
            "INSERT INTO owners (owner_name, phone_alternate) VALUES ('Test Owner', '9000000001') RETURNING id",
        )
        .fetch_one(&store.pool)
        .await
        .unwrap();

        let vehicle_type = format!("test-{}", Uuid::new_v4());
        let vehicle_id: Uuid = sqlx::query_scalar(
            "INSERT INTO vehicles (owner_id, vehicle_type, payload_tons, preferred_routes) \
             VALUES ($1, $2, 9.0, ARRAY['Mumbai - Pune']) RETURNING id",
        )
        .bind(owner_id)
        .bind(&vehicle_type)
        .fetch_one(&store.pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO reliability_scores (vehicle_id, ontime_pickup_score, last_trip_date) \
             VALUES ($1, 2, '2024-01-01'), ($1, 5, '2024-06-01')",
        )
        .bind(vehicle_id)
        .execute(&store.pool)
        .await
        .unwrap();

        let candidates = store.fetch_candidates(&vehicle_type).await.unwrap();

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.driver_phone.as_deref(), Some("9000000001"));
        assert_eq!(candidate.reliability.and_then(|r| r.ontime_pickup_score), Some(5));
        assert_eq!(candidate.preferred_routes, vec!["Mumbai - Pune".to_string()]);

        let first = store
            .record_reliability(&vehicle_id.to_string(), &ReliabilityMetrics::uniform(3))
            .await
            .unwrap();
        assert_eq!(first.trips_completed, 1);
        assert_eq!(first.last_trip_date, Some(chrono::Utc::now().date_naive()));

        let candidates = store.fetch_candidates(&vehicle_type).await.unwrap();
        assert_eq!(candidates[0].reliability.map(|r| r.average()), Some(3.0));

        sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(owner_id)
            .execute(&store.pool)
            .await
            .unwrap();
    }
}
