//! Conversion of client errors into place operation errors.

use wxboard_core::{NetworkError, PlaceError, ReqwestErrorExt};
use wxboard_weather::{LocationError, WeatherError};

pub trait PlaceErrorExt {
    fn into_place_error(self) -> PlaceError;
}

impl PlaceErrorExt for WeatherError {
    fn into_place_error(self) -> PlaceError {
        let network = match self {
            WeatherError::Network(e) => e.into_network_error(),
            WeatherError::Status(status) => NetworkError::ServerError {
                status,
                message: "request rejected".to_string(),
            },
            WeatherError::Parse(detail) => NetworkError::InvalidResponse(detail),
        };
        PlaceError::NetworkFailure(network.to_string())
    }
}

impl PlaceErrorExt for LocationError {
    fn into_place_error(self) -> PlaceError {
        match self {
            LocationError::PermissionDenied => PlaceError::PermissionDenied,
            LocationError::Timeout => PlaceError::PositionUnavailable("timed out".to_string()),
            LocationError::ServiceUnavailable(reason) => PlaceError::PositionUnavailable(reason),
        }
    }
}
