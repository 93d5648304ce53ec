//! AQI arithmetic: breakpoint tables, concentration conversion, and the
//! display bands used to color wards and station markers.

pub mod breakpoints;
pub mod category;
pub mod convert;

pub use breakpoints::{Breakpoint, Pollutant};
pub use category::{AqiBand, aqi_color};
pub use convert::{
    MAX_AQI, PM10_TO_PM25_RATIO, clamp_aqi, composite_aqi, concentration_to_aqi,
    dominant_pollutant, estimate_pm10, estimate_pm25, parse_reading, pm25_to_aqi,
};
