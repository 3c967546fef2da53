/*
This file is part of the GIS Address Server
Copyright (C) 2023 Novel-T

The GIS Address Server is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
// The http surface over the query engine. The store and the rtree indexes
// are opened once at startup and shared read only; requests are
// independent and never mutate anything.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use log::info;
use serde::Deserialize;
use structopt::StructOpt;

use gis_util::config;
use gis_util::paths::database_path;
use gis_util::query::{AddressOut, IndexKind, IntersectionOut, QueryEngine, QueryError};
use gis_util::store::RecordStore;

#[derive(StructOpt)]
pub struct ServeArgs {
    #[structopt(long, default_value = "0.0.0.0:8000")]
    pub bind: String,

    #[structopt(long, default_value = "rtree")]
    pub index: IndexKind,

    #[structopt(long, parse(from_os_str), default_value = "gis_data")]
    pub data_dir: PathBuf,
}

struct AppState {
    engine: QueryEngine,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct ProximityParams {
    region: String,
    lat: f64,
    lon: f64,
    token: Option<String>,
}

#[derive(Deserialize)]
struct IntersectParams {
    region: String,
    lat: f64,
    lon: f64,
    heading: f64,
    token: Option<String>,
}

type ApiError = (StatusCode, String);

fn check_token(state: &AppState, token: Option<&str>) -> Result<(), ApiError> {
    match &state.api_key {
        None => Ok(()),
        Some(key) if token == Some(key.as_str()) => Ok(()),
        Some(_) => Err((StatusCode::FORBIDDEN, "Token is invalid.".to_string())),
    }
}

fn map_query_error(err: QueryError) -> ApiError {
    match &err {
        QueryError::UnknownRegion(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        QueryError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn get_addresses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProximityParams>,
) -> Result<Json<AddressOut>, ApiError> {
    check_token(&state, params.token.as_deref())?;
    let out = state
        .engine
        .addresses_near(&params.region, params.lon, params.lat)
        .map_err(map_query_error)?;
    Ok(Json(out))
}

async fn get_buildings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProximityParams>,
) -> Result<Json<AddressOut>, ApiError> {
    check_token(&state, params.token.as_deref())?;
    let out = state
        .engine
        .buildings_near(&params.region, params.lon, params.lat)
        .map_err(map_query_error)?;
    Ok(Json(out))
}

async fn get_intersection(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IntersectParams>,
) -> Result<Json<IntersectionOut>, ApiError> {
    check_token(&state, params.token.as_deref())?;
    let out = state
        .engine
        .intersect(&params.region, params.lon, params.lat, params.heading)
        .map_err(map_query_error)?;
    Ok(Json(out))
}

pub fn serve(args: &ServeArgs) -> Result<()> {
    let store = RecordStore::open(&database_path(&args.data_dir))?;
    let engine = QueryEngine::open(store, &args.data_dir, args.index)?;

    let api_key = config::api_key();
    if api_key.is_none() {
        info!("No API_KEY configured, authentication is disabled");
    }

    let state = Arc::new(AppState { engine, api_key });

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = Router::new()
            .route("/addresses", get(get_addresses))
            .route("/buildings", get(get_buildings))
            .route("/intersect", get(get_intersection))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(&args.bind).await?;
        info!("Listening on {}", args.bind);
        axum::serve(listener, app).await?;
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
