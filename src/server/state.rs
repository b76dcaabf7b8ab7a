use crate::geocode::{BatchGeocoder, NominatimOracle};
use std::sync::Mutex;

pub struct AppState {
    pub geocoder: Mutex<BatchGeocoder<NominatimOracle>>,
}
