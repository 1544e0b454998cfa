use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::types::dto::place::{Spot, SpotList};
use crate::types::model::spot::{QuerySpot, RideSpot};

/// Spots of every imported ride
#[derive(Clone)]
pub struct SpotRepository {
    pool: SqlitePool,
}

impl SpotRepository {
    pub async fn connect(db_uri: &str) -> Result<Self> {
        info!("Connecting to db");
        let options = SqliteConnectOptions::from_str(db_uri)?.create_if_missing(true);
        // a single long lived connection keeps `sqlite::memory:` alive
        let pool = pool_options(db_uri).connect_with(options).await?;
        sqlx::query(
            r#"create table if not exists spots (
            ride text not null,
            seq integer not null,
            lat real not null,
            lng real not null,
            primary key (ride, seq)
            )"#,
        )
        .execute(&pool)
        .await?;
        info!("Connected");
        Ok(Self { pool })
    }

    /// Replaces everything stored for the ride
    pub async fn post_ride_spots(&self, ride: &str, spots: &[Spot]) -> Result<()> {
        let rows = spots.iter().enumerate().map(|(seq, spot)| RideSpot {
            ride: ride.to_string(),
            seq: seq as i64,
            lat: spot.lat,
            lng: spot.lng,
        });

        let mut tx = self.pool.begin().await?;
        sqlx::query("delete from spots where ride = ?")
            .bind(ride)
            .execute(&mut *tx)
            .await?;
        for row in rows {
            sqlx::query("insert into spots (ride, seq, lat, lng) values (?, ?, ?, ?)")
                .bind(row.ride)
                .bind(row.seq)
                .bind(row.lat)
                .bind(row.lng)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn all_spots(&self) -> Result<SpotList> {
        let spots = sqlx::query_as::<_, QuerySpot>("select lat, lng from spots order by ride, seq")
            .fetch_all(&self.pool)
            .await?;
        Ok(SpotList {
            data: spots.into_iter().map(Spot::from).collect(),
        })
    }

    /// Number of spots removed, zero when the ride is unknown
    pub async fn remove_ride(&self, ride: &str) -> Result<u64> {
        let result = sqlx::query("delete from spots where ride = ?")
            .bind(ride)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn pool_options(db_uri: &str) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new();
    if db_uri.contains(":memory:") {
        options
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        options.max_connections(5)
    }
}
