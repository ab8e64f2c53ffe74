//! Data returned by the telemetry API.
//!

use evdash_common::Coordinate;
use serde::{Deserialize, Serialize};

/// One vehicle's state at one timestamp.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VehicleData {
    pub vehicle_id: String,
    pub registration_number: String,
    /// As sent by the API, usually RFC 3339
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    /// km/h
    pub speed: f64,
    /// km
    pub odometer: f64,
    /// State of charge in %
    pub battery_soc: f64,
    #[serde(default)]
    pub ignition_status: bool,
    #[serde(default)]
    pub charging_status: i64,
    #[serde(default)]
    pub distance_to_empty: Option<f64>,
    pub vehicle_status: String,
    pub oem_provider: String,
}

impl VehicleData {
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_records: u64,
}

/// Full page from `/dashboard/data`
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VehicleDataResponse {
    pub data: Vec<VehicleData>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_response() {
        let body = r#"{
            "data": [{
                "vehicle_id": "V1",
                "registration_number": "DL01AB1234",
                "timestamp": "2024-03-15T10:20:30Z",
                "latitude": 28.6139,
                "longitude": 77.209,
                "speed": 42.5,
                "odometer": 1234.56,
                "battery_soc": 18,
                "ignition_status": true,
                "charging_status": 0,
                "distance_to_empty": null,
                "vehicle_status": "moving",
                "oem_provider": "Tata"
            }],
            "pagination": {"page": 1, "per_page": 10, "total_pages": 3, "total_records": 25}
        }"#;
        let r: VehicleDataResponse = serde_json::from_str(body).unwrap();
        assert_eq!(1, r.data.len());
        assert_eq!(18., r.data[0].battery_soc);
        assert_eq!(None, r.data[0].distance_to_empty);
        assert_eq!("28.6139,77.209", r.data[0].coordinate().key().as_str());
        assert_eq!(3, r.pagination.total_pages);
    }

    #[test]
    fn test_decode_missing_optional_fields() {
        let body = r#"{
            "vehicle_id": "V2",
            "registration_number": "MH02",
            "timestamp": "2024-03-15T10:20:30Z",
            "latitude": 19.076,
            "longitude": 72.8777,
            "speed": 0,
            "odometer": 10,
            "battery_soc": 80,
            "vehicle_status": "charging",
            "oem_provider": "Switch"
        }"#;
        let v: VehicleData = serde_json::from_str(body).unwrap();
        assert!(!v.ignition_status);
        assert_eq!(0, v.charging_status);
    }
}
