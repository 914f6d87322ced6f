//! The transit timetable messages (`types.proto`): `Data` holds routes, a route holds stops.
//!
//! [`TransitSchemas`] describes the three message types; [`Data`], [`Route`] and [`Stop`]
//! are typed views that convert to and from generic [`Record`]s.

use crate::codec::{decode, encode};
use crate::record::Record;
use crate::schema::{same_schema, FieldDescriptor, FieldDisplay, Schema, SchemaError};
use crate::timetable::TimetableError;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Field numbers of `types.Data`.
pub mod data {
    pub const ROUTES: u32 = 1;
}

/// Field numbers of `types.Data.Route`.
pub mod route {
    pub const ID: u32 = 1;
    pub const DAYS: u32 = 2;
    pub const FROM: u32 = 3;
    pub const TO: u32 = 4;
    pub const STOPS: u32 = 5;
}

/// Field numbers of `types.Data.Route.Stop`.
pub mod stop {
    pub const STATION_ID: u32 = 1;
    pub const ARRIVAL: u32 = 2;
    pub const DEPARTURE: u32 = 3;
    pub const PLATFORM: u32 = 4;
}

#[derive(Debug, Clone)]
pub struct TransitSchemas {
    pub data: Arc<Schema>,
    pub route: Arc<Schema>,
    pub stop: Arc<Schema>,
}

impl TransitSchemas {
    pub fn new() -> Result<Self, SchemaError> {
        let stop = Arc::new(Schema::new(
            "types.Data.Route.Stop",
            vec![
                FieldDescriptor::uint32(stop::STATION_ID, "stationId"),
                FieldDescriptor::uint32(stop::ARRIVAL, "arrival").with_display(FieldDisplay::TimeOfDay),
                FieldDescriptor::uint32(stop::DEPARTURE, "departure").with_display(FieldDisplay::TimeOfDay),
                FieldDescriptor::uint32(stop::PLATFORM, "platform"),
            ],
        )?);
        let route = Arc::new(Schema::new(
            "types.Data.Route",
            vec![
                FieldDescriptor::string(route::ID, "id"),
                FieldDescriptor::uint32(route::DAYS, "days").with_display(FieldDisplay::OperatingDays),
                FieldDescriptor::uint32(route::FROM, "from"),
                FieldDescriptor::uint32(route::TO, "to"),
                FieldDescriptor::repeated_message(route::STOPS, "stops", &stop),
            ],
        )?);
        let data = Arc::new(Schema::new(
            "types.Data",
            vec![FieldDescriptor::repeated_message(data::ROUTES, "routes", &route)],
        )?);
        Ok(TransitSchemas { data, route, stop })
    }
}

fn expect_schema(record: &Record, expected: &Schema) -> Result<(), TimetableError> {
    if !same_schema(record.schema(), expected) {
        return Err(TimetableError::WrongRecord {
            expected: expected.name().to_string(),
            found: record.schema().name().to_string(),
        });
    }
    Ok(())
}

/// A call at a station. Times are minutes after midnight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stop {
    pub station_id: u32,
    pub arrival: u32,
    pub departure: u32,
    pub platform: u32,
}

impl Stop {
    pub fn to_record(&self, schemas: &TransitSchemas) -> Result<Record, SchemaError> {
        let mut r = Record::new(Arc::clone(&schemas.stop));
        r.set_u32(stop::STATION_ID, self.station_id)?;
        r.set_u32(stop::ARRIVAL, self.arrival)?;
        r.set_u32(stop::DEPARTURE, self.departure)?;
        r.set_u32(stop::PLATFORM, self.platform)?;
        Ok(r)
    }

    pub fn from_record(record: &Record, schemas: &TransitSchemas) -> Result<Self, TimetableError> {
        expect_schema(record, &schemas.stop)?;
        Ok(Stop {
            station_id: record.u32(stop::STATION_ID)?,
            arrival: record.u32(stop::ARRIVAL)?,
            departure: record.u32(stop::DEPARTURE)?,
            platform: record.u32(stop::PLATFORM)?,
        })
    }
}

/// A scheduled service: its id, operating-day mask, end stations and calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub days: u32,
    pub from: u32,
    pub to: u32,
    pub stops: Vec<Stop>,
}

impl Route {
    pub fn to_record(&self, schemas: &TransitSchemas) -> Result<Record, SchemaError> {
        let mut r = Record::new(Arc::clone(&schemas.route));
        r.set_string(route::ID, self.id.as_str())?;
        r.set_u32(route::DAYS, self.days)?;
        r.set_u32(route::FROM, self.from)?;
        r.set_u32(route::TO, self.to)?;
        for s in &self.stops {
            r.push_message(route::STOPS, s.to_record(schemas)?)?;
        }
        Ok(r)
    }

    pub fn from_record(record: &Record, schemas: &TransitSchemas) -> Result<Self, TimetableError> {
        expect_schema(record, &schemas.route)?;
        let stops = record
            .messages(route::STOPS)?
            .iter()
            .map(|s| Stop::from_record(s, schemas))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Route {
            id: record.string(route::ID)?.to_string(),
            days: record.u32(route::DAYS)?,
            from: record.u32(route::FROM)?,
            to: record.u32(route::TO)?,
            stops,
        })
    }
}

/// The whole timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data {
    pub routes: Vec<Route>,
}

impl Data {
    pub fn to_record(&self, schemas: &TransitSchemas) -> Result<Record, SchemaError> {
        let mut r = Record::new(Arc::clone(&schemas.data));
        for route in &self.routes {
            r.push_message(data::ROUTES, route.to_record(schemas)?)?;
        }
        Ok(r)
    }

    pub fn from_record(record: &Record, schemas: &TransitSchemas) -> Result<Self, TimetableError> {
        expect_schema(record, &schemas.data)?;
        let routes = record
            .messages(data::ROUTES)?
            .iter()
            .map(|r| Route::from_record(r, schemas))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Data { routes })
    }

    pub fn encode(&self, schemas: &TransitSchemas) -> Result<Vec<u8>, TimetableError> {
        let record = self.to_record(schemas)?;
        Ok(encode(&record, &schemas.data)?)
    }

    pub fn decode(bytes: &[u8], schemas: &TransitSchemas) -> Result<Self, TimetableError> {
        let record = decode(bytes, &schemas.data)?;
        Data::from_record(&record, schemas)
    }

    pub fn stop_count(&self) -> usize {
        self.routes.iter().map(|r| r.stops.len()).sum()
    }
}

/// Write `data` as a single encoded `types.Data` message.
pub fn write_data_file(
    path: impl AsRef<Path>,
    data: &Data,
    schemas: &TransitSchemas,
) -> Result<(), TimetableError> {
    let path = path.as_ref();
    let bytes = data.encode(schemas)?;
    fs::write(path, &bytes)?;
    log::debug!(
        "wrote {} routes ({} bytes) to {}",
        data.routes.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

pub fn read_data_file(path: impl AsRef<Path>, schemas: &TransitSchemas) -> Result<Data, TimetableError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let data = Data::decode(&bytes, schemas)?;
    log::debug!(
        "read {} routes ({} bytes) from {}",
        data.routes.len(),
        bytes.len(),
        path.display()
    );
    Ok(data)
}
