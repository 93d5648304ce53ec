use serde::Serialize;

/// Display band for an AQI value.
///
/// | AQI       | Band         | Color     |
/// |-----------|--------------|-----------|
/// | <= 50     | Good         | green     |
/// | <= 100    | Satisfactory | yellow    |
/// | <= 200    | Moderate     | orange    |
/// | <= 300    | Poor         | red       |
/// | <= 400    | Very Poor    | dark red  |
/// | > 400     | Severe       | darkest   |
/// | no value  | No data      | gray      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiBand {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
    NoData,
}

impl AqiBand {
    pub fn from_aqi(aqi: Option<u16>) -> Self {
        match aqi {
            None => AqiBand::NoData,
            Some(a) if a <= 50 => AqiBand::Good,
            Some(a) if a <= 100 => AqiBand::Satisfactory,
            Some(a) if a <= 200 => AqiBand::Moderate,
            Some(a) if a <= 300 => AqiBand::Poor,
            Some(a) if a <= 400 => AqiBand::VeryPoor,
            Some(_) => AqiBand::Severe,
        }
    }

    /// Fill color used for ward polygons and station markers.
    pub fn color(self) -> &'static str {
        match self {
            AqiBand::Good => "#16a34a",
            AqiBand::Satisfactory => "#eab308",
            AqiBand::Moderate => "#f97316",
            AqiBand::Poor => "#ef4444",
            AqiBand::VeryPoor => "#7c2d12",
            AqiBand::Severe => "#5b0219",
            AqiBand::NoData => "#374151",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AqiBand::Good => "Good",
            AqiBand::Satisfactory => "Satisfactory",
            AqiBand::Moderate => "Moderate",
            AqiBand::Poor => "Poor",
            AqiBand::VeryPoor => "Very Poor",
            AqiBand::Severe => "Severe",
            AqiBand::NoData => "No data",
        }
    }

    /// Short health advisory for the general population.
    pub fn advisory(self) -> &'static str {
        match self {
            AqiBand::Good => "Low risk to health. All outdoor activities can be done normally.",
            AqiBand::Satisfactory => {
                "Vulnerable groups should reduce prolonged or strenuous outdoor exertion."
            }
            AqiBand::Moderate => {
                "General population should reduce prolonged outdoor exertion; vulnerable groups should avoid it."
            }
            AqiBand::Poor => {
                "Everyone should avoid outdoor exertion; vulnerable groups must avoid outdoor activity."
            }
            AqiBand::VeryPoor => {
                "Avoid outdoor activity, especially mornings and late evenings. Vulnerable groups stay indoors."
            }
            AqiBand::Severe => {
                "Avoid all outdoor activity. Vulnerable groups stay indoors with activity kept low."
            }
            AqiBand::NoData => "No AQI data available.",
        }
    }
}

/// Marker/fill color for an optional AQI value.
pub fn aqi_color(aqi: Option<u16>) -> &'static str {
    AqiBand::from_aqi(aqi).color()
}
