//! Built-in record types and the analyses run over them.
//!
//! - [`DailyWeather`]: one day of a monthly weather table; the analysis picks
//!   the day with the smallest temperature spread.
//! - [`Country`]: one row of a country table; the analysis picks the country
//!   with the highest population density.

use crate::{
    data::{INTEGER_SENTINEL, TEXT_SENTINEL},
    error::MapperResult,
    query::ExtremalQuery,
    record::{FromRecord, MappedRecord, Record},
    schema::{ColumnMeta, ColumnType, DerivedField, DerivedRule, Schema},
    store::RecordStore,
};

pub const WEATHER_DAY: &str = "Day";
pub const WEATHER_MAX_TEMP: &str = "MxT";
pub const WEATHER_MIN_TEMP: &str = "MnT";
pub const WEATHER_SPREAD: &str = "Spread";

pub const COUNTRY_NAME: &str = "Name";
pub const COUNTRY_POPULATION: &str = "Population";
pub const COUNTRY_AREA: &str = "Area (km²)";
pub const COUNTRY_DENSITY: &str = "Population density";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyWeather {
    pub day: i64,
    pub max_temp: i64,
    pub min_temp: i64,
    /// `max_temp - min_temp`, or the sentinel when unknown or inconsistent.
    pub temp_spread: i64,
}

impl Default for DailyWeather {
    fn default() -> Self {
        Self {
            day: INTEGER_SENTINEL,
            max_temp: INTEGER_SENTINEL,
            min_temp: INTEGER_SENTINEL,
            temp_spread: INTEGER_SENTINEL,
        }
    }
}

impl DailyWeather {
    pub fn new(day: i64, max_temp: i64, min_temp: i64) -> Self {
        let temp_spread = if max_temp == INTEGER_SENTINEL
            || min_temp == INTEGER_SENTINEL
            || max_temp < min_temp
        {
            INTEGER_SENTINEL
        } else {
            max_temp - min_temp
        };
        Self {
            day,
            max_temp,
            min_temp,
            temp_spread,
        }
    }

    pub fn has_spread(&self) -> bool {
        self.temp_spread != INTEGER_SENTINEL
    }
}

impl MappedRecord for DailyWeather {
    fn schema() -> Schema {
        Schema::new(
            vec![
                ColumnMeta::new(WEATHER_DAY, ColumnType::Integer),
                ColumnMeta::new(WEATHER_MAX_TEMP, ColumnType::Integer),
                ColumnMeta::new(WEATHER_MIN_TEMP, ColumnType::Integer),
            ],
            vec![DerivedField::new(
                WEATHER_SPREAD,
                DerivedRule::Spread {
                    high: WEATHER_MAX_TEMP.to_string(),
                    low: WEATHER_MIN_TEMP.to_string(),
                },
            )],
        )
        .expect("built-in weather schema is valid")
    }
}

impl FromRecord for DailyWeather {
    fn from_record(record: &Record) -> Self {
        Self {
            day: record.integer(WEATHER_DAY),
            max_temp: record.integer(WEATHER_MAX_TEMP),
            min_temp: record.integer(WEATHER_MIN_TEMP),
            temp_spread: record.integer(WEATHER_SPREAD),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub name: String,
    pub population: i64,
    pub area: i64,
    /// Inhabitants per km² (integer division), or the sentinel.
    pub population_density: i64,
}

impl Default for Country {
    fn default() -> Self {
        Self {
            name: TEXT_SENTINEL.to_string(),
            population: INTEGER_SENTINEL,
            area: INTEGER_SENTINEL,
            population_density: INTEGER_SENTINEL,
        }
    }
}

impl Country {
    pub fn new(name: impl Into<String>, population: i64, area: i64) -> Self {
        let population_density = if population == INTEGER_SENTINEL
            || area == INTEGER_SENTINEL
            || area == 0
        {
            INTEGER_SENTINEL
        } else {
            population / area
        };
        Self {
            name: name.into(),
            population,
            area,
            population_density,
        }
    }

    pub fn has_density(&self) -> bool {
        self.population_density != INTEGER_SENTINEL
    }
}

impl MappedRecord for Country {
    fn schema() -> Schema {
        Schema::new(
            vec![
                ColumnMeta::new(COUNTRY_NAME, ColumnType::Text),
                ColumnMeta::new(COUNTRY_POPULATION, ColumnType::Integer),
                ColumnMeta::new(COUNTRY_AREA, ColumnType::Integer),
            ],
            vec![DerivedField::new(
                COUNTRY_DENSITY,
                DerivedRule::Ratio {
                    numerator: COUNTRY_POPULATION.to_string(),
                    denominator: COUNTRY_AREA.to_string(),
                },
            )],
        )
        .and_then(|schema| schema.with_delimiter(';'))
        .expect("built-in country schema is valid")
    }
}

impl FromRecord for Country {
    fn from_record(record: &Record) -> Self {
        Self {
            name: record.text(COUNTRY_NAME).to_string(),
            population: record.integer(COUNTRY_POPULATION),
            area: record.integer(COUNTRY_AREA),
            population_density: record.integer(COUNTRY_DENSITY),
        }
    }
}

/// Day number with the smallest temperature spread, ignoring days without a
/// valid spread. `None` when no such day exists.
pub fn day_with_smallest_temperature_spread(
    store: &RecordStore<DailyWeather>,
) -> MapperResult<Option<i64>> {
    let query = ExtremalQuery::new()
        .compare_by_key(|w: &DailyWeather| w.temp_spread)
        .filter(DailyWeather::has_spread);
    Ok(query.lowest(store)?.map(|w| w.day))
}

/// Name of the country with the highest population density, ignoring
/// countries without a valid density. `None` when no such country exists.
pub fn country_with_highest_population_density(
    store: &RecordStore<Country>,
) -> MapperResult<Option<String>> {
    let query = ExtremalQuery::new()
        .compare_by_key(|c: &Country| c.population_density)
        .filter(Country::has_density);
    Ok(query.highest(store)?.map(|c| c.name.clone()))
}
