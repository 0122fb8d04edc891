//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use relaypanel_hardware::{DeviceState, RelayState};
use relaypanel_protocol::RelayId;
use relaypanel_storage::LabelStore;
use relaypanel_tv::TvCommand;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, SharedState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub devices: Vec<DeviceState>,
    pub relays: Vec<RelayState>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetLabelRequest {
    pub label: String,
}

pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        devices: state.devices.device_states(),
        relays: state.devices.relay_states(),
    })
}

pub async fn relay_states(State(state): State<SharedState>) -> Json<Vec<RelayState>> {
    Json(state.devices.relay_states())
}

/// Toggle a relay and answer with the table as it stands.
///
/// The reported states lag until the board confirms the change.
pub async fn toggle_relay(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RelayState>>, ApiError> {
    state.devices.toggle_relay(&id).await?;
    Ok(Json(state.devices.relay_states()))
}

/// Rename a relay in memory, then persist it.
pub async fn set_label(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let relay = RelayId::parse(&id).map_err(|_| ApiError::bad_request("invalid relay id"))?;
    let request: SetLabelRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("invalid json"))?;

    state.devices.update_label(relay.index(), request.label.as_str())?;
    state
        .labels
        .update(i64::from(relay.number()), &request.label)
        .await?;

    info!(relay_index = relay.number(), label = %request.label, "relay label updated");
    Ok(StatusCode::OK)
}

pub async fn buzz_door(State(state): State<SharedState>) -> Result<StatusCode, ApiError> {
    state.devices.buzz_door().await?;
    Ok(StatusCode::OK)
}

pub async fn tv_command(
    State(state): State<SharedState>,
    Path(command): Path<String>,
) -> Result<StatusCode, ApiError> {
    let command: TvCommand = command.parse()?;
    let client = state.tv.as_ref().ok_or(ApiError::TvNotConfigured)?;
    client.send(command).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::AppState;
    use relaypanel_hardware::mock::{MockDeviceHandle, mock_connection};
    use relaypanel_hardware::{ConnectionStatus, DeviceManager, DeviceName, ManagerConfig};
    use relaypanel_storage::{Database, SqliteLabelStore};
    use relaypanel_tv::{AdbClient, AdbConfig};
    use std::path::PathBuf;
    use std::sync::Arc;

    async fn test_state(tv: Option<AdbClient>) -> (SharedState, Database) {
        let db = Database::in_memory().await.unwrap();
        let state = Arc::new(AppState {
            devices: DeviceManager::new(ManagerConfig::default()),
            labels: SqliteLabelStore::new(db.pool().clone()),
            tv,
            static_dir: PathBuf::from("static"),
        });
        (state, db)
    }

    fn attach(state: &SharedState, name: DeviceName) -> MockDeviceHandle {
        let (connection, handle) = mock_connection(name.as_str());
        state.devices.set_device(name, Some(connection));
        handle
    }

    #[tokio::test]
    async fn test_status_reports_devices_and_relays() {
        let (state, _db) = test_state(None).await;
        attach(&state, DeviceName::Relays);

        let Json(response) = status(State(state.clone())).await;
        assert_eq!(response.devices.len(), 2);
        assert_eq!(response.devices[0].name, DeviceName::Relays);
        assert_eq!(response.devices[0].state, ConnectionStatus::Connected);
        assert_eq!(response.devices[1].state, ConnectionStatus::Disconnected);
        assert_eq!(response.relays.len(), 8);
    }

    #[tokio::test]
    async fn test_toggle_writes_relay_digit() {
        let (state, _db) = test_state(None).await;
        let device = attach(&state, DeviceName::Relays);

        let Json(states) = toggle_relay(State(state.clone()), Path("3".to_string()))
            .await
            .unwrap();
        assert_eq!(states.len(), 8);
        assert_eq!(device.written(), b"3".to_vec());
    }

    #[tokio::test]
    async fn test_toggle_invalid_id_is_bad_request() {
        let (state, _db) = test_state(None).await;
        let device = attach(&state, DeviceName::Relays);

        let error = toggle_relay(State(state.clone()), Path("9".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(device.written().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_without_board_is_unavailable() {
        let (state, _db) = test_state(None).await;

        let error = toggle_relay(State(state), Path("1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_buzz() {
        let (state, _db) = test_state(None).await;
        assert_eq!(
            buzz_door(State(state.clone())).await.unwrap_err().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let device = attach(&state, DeviceName::Buzzer);
        assert_eq!(buzz_door(State(state)).await.unwrap(), StatusCode::OK);
        assert_eq!(device.written(), b"1".to_vec());
    }

    #[tokio::test]
    async fn test_set_label_updates_memory_and_store() {
        let (state, _db) = test_state(None).await;

        let body = Bytes::from_static(br#"{"label":"porch"}"#);
        let status = set_label(State(state.clone()), Path("2".to_string()), body)
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);

        assert_eq!(state.devices.relay_states()[1].label, "porch");
        let stored = state.labels.find_by_index(2).await.unwrap().unwrap();
        assert_eq!(stored.label, "porch");
    }

    #[rstest::rstest]
    #[case("0", r#"{"label":"x"}"#)]
    #[case("12", r#"{"label":"x"}"#)]
    #[case("2", "not json")]
    #[case("2", r#"{"name":"x"}"#)]
    #[tokio::test]
    async fn test_set_label_rejects_bad_input(#[case] id: &str, #[case] body: &'static str) {
        let (state, _db) = test_state(None).await;

        let error = set_label(
            State(state.clone()),
            Path(id.to_string()),
            Bytes::from_static(body.as_bytes()),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.devices.relay_states()[1].label, "");
    }

    #[tokio::test]
    async fn test_tv_unknown_command_is_not_found() {
        let (state, _db) = test_state(Some(AdbClient::new(AdbConfig::default()))).await;

        let error = tv_command(State(state), Path("eject".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tv_without_client_is_unavailable() {
        let (state, _db) = test_state(None).await;

        let error = tv_command(State(state), Path("power".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::TvNotConfigured));
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tv_command_runs_adb() {
        let client = AdbClient::new(AdbConfig::default().with_program("true"));
        let (state, _db) = test_state(Some(client)).await;

        let status = tv_command(State(state), Path("volume_up".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tv_adb_failure_is_unavailable() {
        let client = AdbClient::new(AdbConfig::default().with_program("false"));
        let (state, _db) = test_state(Some(client)).await;

        let error = tv_command(State(state), Path("power".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
