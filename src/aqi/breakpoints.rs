//! US EPA breakpoint tables.
//!
//! Each pollutant maps an ordered list of concentration brackets onto AQI
//! index ranges. Particulates are in µg/m³, CO in ppm, and the remaining
//! gases in ppb.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;

/// One segment of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: u16,
    pub i_high: u16,
}

const fn bp(c_low: f64, c_high: f64, i_low: u16, i_high: u16) -> Breakpoint {
    Breakpoint {
        c_low,
        c_high,
        i_low,
        i_high,
    }
}

static PM25: &[Breakpoint] = &[
    bp(0.0, 12.0, 0, 50),
    bp(12.1, 35.4, 51, 100),
    bp(35.5, 55.4, 101, 150),
    bp(55.5, 150.4, 151, 200),
    bp(150.5, 250.4, 201, 300),
    bp(250.5, 500.4, 301, 500),
];

static PM10: &[Breakpoint] = &[
    bp(0.0, 54.0, 0, 50),
    bp(55.0, 154.0, 51, 100),
    bp(155.0, 254.0, 101, 150),
    bp(255.0, 354.0, 151, 200),
    bp(355.0, 424.0, 201, 300),
    bp(425.0, 604.0, 301, 500),
];

static O3: &[Breakpoint] = &[
    bp(0.0, 54.0, 0, 50),
    bp(55.0, 70.0, 51, 100),
    bp(71.0, 85.0, 101, 150),
    bp(86.0, 105.0, 151, 200),
    bp(106.0, 200.0, 201, 300),
];

static NO2: &[Breakpoint] = &[
    bp(0.0, 53.0, 0, 50),
    bp(54.0, 100.0, 51, 100),
    bp(101.0, 360.0, 101, 150),
    bp(361.0, 649.0, 151, 200),
    bp(650.0, 1249.0, 201, 300),
    bp(1250.0, 2049.0, 301, 500),
];

static SO2: &[Breakpoint] = &[
    bp(0.0, 35.0, 0, 50),
    bp(36.0, 75.0, 51, 100),
    bp(76.0, 185.0, 101, 150),
    bp(186.0, 304.0, 151, 200),
    bp(305.0, 604.0, 201, 300),
    bp(605.0, 1004.0, 301, 500),
];

static CO: &[Breakpoint] = &[
    bp(0.0, 4.4, 0, 50),
    bp(4.5, 9.4, 51, 100),
    bp(9.5, 12.4, 101, 150),
    bp(12.5, 15.4, 151, 200),
    bp(15.5, 30.4, 201, 300),
    bp(30.5, 50.4, 301, 500),
];

/// Pollutants with a known breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pollutant {
    Pm25,
    Pm10,
    O3,
    No2,
    So2,
    Co,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
    ];

    /// Ordered breakpoint table for this pollutant.
    pub fn breakpoints(self) -> &'static [Breakpoint] {
        match self {
            Pollutant::Pm25 => PM25,
            Pollutant::Pm10 => PM10,
            Pollutant::O3 => O3,
            Pollutant::No2 => NO2,
            Pollutant::So2 => SO2,
            Pollutant::Co => CO,
        }
    }

    /// Canonical short name, as accepted by `FromStr`.
    pub fn key(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "pm25",
            Pollutant::Pm10 => "pm10",
            Pollutant::O3 => "o3",
            Pollutant::No2 => "no2",
            Pollutant::So2 => "so2",
            Pollutant::Co => "co",
        }
    }

    /// Human-readable pollutant name.
    pub fn display_name(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "Ozone",
            Pollutant::No2 => "Nitrogen Dioxide",
            Pollutant::So2 => "Sulfur Dioxide",
            Pollutant::Co => "Carbon Monoxide",
        }
    }

    /// Native measurement unit of the table.
    pub fn unit(self) -> &'static str {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => "µg/m³",
            Pollutant::Co => "ppm",
            Pollutant::O3 | Pollutant::No2 | Pollutant::So2 => "ppb",
        }
    }
}

impl FromStr for Pollutant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pm25" | "pm2.5" | "pm2_5" => Ok(Pollutant::Pm25),
            "pm10" => Ok(Pollutant::Pm10),
            "o3" => Ok(Pollutant::O3),
            "no2" => Ok(Pollutant::No2),
            "so2" => Ok(Pollutant::So2),
            "co" => Ok(Pollutant::Co),
            other => Err(anyhow!("unrecognized pollutant '{other}'")),
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_ordered() {
        for pollutant in Pollutant::ALL {
            let table = pollutant.breakpoints();
            for pair in table.windows(2) {
                assert!(pair[0].c_high < pair[1].c_low, "{pollutant:?}");
                assert!(pair[0].i_high < pair[1].i_low, "{pollutant:?}");
            }
            assert_eq!(table[0].c_low, 0.0);
            assert_eq!(table[0].i_low, 0);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("PM2.5".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert_eq!("pm2_5".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert_eq!(" NO2 ".parse::<Pollutant>().unwrap(), Pollutant::No2);
        for pollutant in Pollutant::ALL {
            assert_eq!(pollutant.key().parse::<Pollutant>().unwrap(), pollutant);
        }
        assert!("benzene".parse::<Pollutant>().is_err());
    }
}
