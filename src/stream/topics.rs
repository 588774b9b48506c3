use crate::auth::Role;
use crate::models::search::SearchKey;
use crate::stream::error::StreamError;
use crate::stream::providers::SnapshotQuery;
use std::collections::HashMap;
use std::fmt;

/// A live feed a dashboard page can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SensorsLatest,
    SensorsFiltered,
    CoolersLatest,
    CoolersFiltered,
    CoolerDetail,
    CoolerChart,
    ProcessList,
    ProcessChart,
    MemoryChart,
    SystemLatest,
}

/// Path prefixes in match order. Longer legacy prefixes must precede the
/// shorter ones they extend (`/dataSensorLatest` before `/dataSensor`).
pub const ROUTES: &[(&str, Topic)] = &[
    ("/sensors-latest", Topic::SensorsLatest),
    ("/sensors-filtered", Topic::SensorsFiltered),
    ("/coolers-latest", Topic::CoolersLatest),
    ("/coolers-filtered", Topic::CoolersFiltered),
    ("/cooler-detail", Topic::CoolerDetail),
    ("/cooler-chart", Topic::CoolerChart),
    ("/process-list", Topic::ProcessList),
    ("/process-chart", Topic::ProcessChart),
    ("/memory-chart", Topic::MemoryChart),
    ("/system-latest", Topic::SystemLatest),
    // paths used by the first dashboard release
    ("/dataSensorLatest", Topic::SensorsLatest),
    ("/dataSensor", Topic::SensorsFiltered),
    ("/dataCoolerLatest", Topic::CoolersLatest),
    ("/dataCoolerChart", Topic::CoolerChart),
    ("/dataCooler", Topic::CoolersFiltered),
    ("/dataProcess", Topic::ProcessList),
    ("/dataMemoryChart", Topic::MemoryChart),
    ("/dataSystemLatest", Topic::SystemLatest),
];

/// First registered prefix the request path starts with.
pub fn route(path: &str) -> Result<Topic, StreamError> {
    ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, topic)| *topic)
        .ok_or_else(|| StreamError::UnknownTopic(path.to_string()))
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Topic::SensorsLatest => "sensors-latest",
            Topic::SensorsFiltered => "sensors-filtered",
            Topic::CoolersLatest => "coolers-latest",
            Topic::CoolersFiltered => "coolers-filtered",
            Topic::CoolerDetail => "cooler-detail",
            Topic::CoolerChart => "cooler-chart",
            Topic::ProcessList => "process-list",
            Topic::ProcessChart => "process-chart",
            Topic::MemoryChart => "memory-chart",
            Topic::SystemLatest => "system-latest",
        }
    }

    /// Role the token must carry; `None` means any valid token.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Topic::SystemLatest => None,
            _ => Some(Role::Admin),
        }
    }

    /// Builds the provider query from the connection's query string.
    /// Parameters a topic does not use are ignored.
    pub fn query(&self, params: &HashMap<String, String>) -> SnapshotQuery {
        let search = || SearchKey::parse(params.get("search").map(String::as_str));
        let id = || params.get("id").and_then(|v| v.trim().parse::<i32>().ok());

        match self {
            Topic::SensorsLatest => SnapshotQuery::LatestSensors { search: None },
            Topic::SensorsFiltered => SnapshotQuery::LatestSensors { search: search() },
            Topic::CoolersLatest => SnapshotQuery::LatestCoolers { search: None },
            Topic::CoolersFiltered => SnapshotQuery::LatestCoolers { search: search() },
            Topic::CoolerDetail => SnapshotQuery::CoolerById { id: id() },
            Topic::CoolerChart => SnapshotQuery::CoolerChart { id: id() },
            Topic::ProcessList => SnapshotQuery::Processes { search: search() },
            Topic::ProcessChart => SnapshotQuery::ProcessChart {
                name: params
                    .get("name")
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            },
            Topic::MemoryChart => SnapshotQuery::MemoryChart,
            Topic::SystemLatest => SnapshotQuery::SystemLatest,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
