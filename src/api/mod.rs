//! Typed endpoint registry.
//!
//! Each endpoint is a zero-sized type that fixes its path template, method,
//! backend and response type at compile time, so a binding built from it can
//! only ever decode the shape that endpoint returns. [`ENDPOINTS`] mirrors
//! the same information at runtime for the CLI.

pub mod models;

use crate::error::Error;
use crate::request::{url, ApiType, Json, Method, RequestDescriptor, ResponseBody};
use models::{Appeal, Dref, Event, FieldReport, ListResponse, PerOverview, Personnel};
use serde_json::Value;

pub trait Endpoint {
    /// Short name used on the command line
    const NAME: &'static str;
    /// Path template, `{name}` placeholders included
    const PATH: &'static str;
    const METHOD: Method;
    const API: ApiType = ApiType::Go;
    type Response: ResponseBody;

    /// Descriptor for this endpoint with no query, variables or body yet.
    fn descriptor() -> RequestDescriptor {
        RequestDescriptor::new(Self::METHOD, Self::PATH).with_api(Self::API)
    }
}

macro_rules! endpoint {
    ($ty:ident, $name:literal, $method:ident, $path:literal, $response:ty) => {
        endpoint!($ty, $name, $method, $path, $response, ApiType::Go);
    };
    ($ty:ident, $name:literal, $method:ident, $path:literal, $response:ty, $api:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl Endpoint for $ty {
            const NAME: &'static str = $name;
            const PATH: &'static str = $path;
            const METHOD: Method = Method::$method;
            const API: ApiType = $api;
            type Response = $response;
        }
    };
}

endpoint!(AppealList, "appeal", Get, "/api/v2/appeal/", Json<ListResponse<Appeal>>);
endpoint!(EventList, "event", Get, "/api/v2/event/", Json<ListResponse<Event>>);
endpoint!(
    FieldReportList,
    "field-report",
    Get,
    "/api/v2/field-report/",
    Json<ListResponse<FieldReport>>
);
endpoint!(
    FieldReportCreate,
    "field-report-create",
    Post,
    "/api/v2/field-report/",
    Json<FieldReport>
);
endpoint!(DrefDetail, "dref", Get, "/api/v2/dref/{id}/", Json<Dref>);
endpoint!(DrefUpdate, "dref-update", Patch, "/api/v2/dref/{id}/", Json<Dref>);
endpoint!(
    PerOverviewList,
    "per-overview",
    Get,
    "/api/v2/per-overview/",
    Json<ListResponse<PerOverview>>
);
endpoint!(
    PersonnelList,
    "deployments",
    Get,
    "/api/v2/personnel/",
    Json<ListResponse<Personnel>>
);
endpoint!(
    SeasonalRisk,
    "risk-seasonal",
    Get,
    "/api/v1/seasonal/",
    Value,
    ApiType::Risk
);

/// Runtime view of an [`Endpoint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointInfo {
    pub name: &'static str,
    pub path: &'static str,
    pub method: Method,
    pub api: ApiType,
    pub description: &'static str,
    /// Responds with a [`ListResponse`] and honors `limit`/`offset`
    pub paginated: bool,
}

const fn info<E: Endpoint>(description: &'static str, paginated: bool) -> EndpointInfo {
    EndpointInfo {
        name: E::NAME,
        path: E::PATH,
        method: E::METHOD,
        api: E::API,
        description,
        paginated,
    }
}

pub const ENDPOINTS: &[EndpointInfo] = &[
    info::<AppealList>("Emergency appeals and DREF operations", true),
    info::<EventList>("Emergencies", true),
    info::<FieldReportList>("Field reports", true),
    info::<FieldReportCreate>("Submit a field report", false),
    info::<DrefDetail>("One DREF application", false),
    info::<DrefUpdate>("Update a DREF application", false),
    info::<PerOverviewList>("PER assessment overviews", true),
    info::<PersonnelList>("Deployed personnel", true),
    info::<SeasonalRisk>("Seasonal risk scores (risk API)", false),
];

impl EndpointInfo {
    #[must_use]
    pub fn descriptor(&self) -> RequestDescriptor {
        RequestDescriptor::new(self.method, self.path).with_api(self.api)
    }

    /// Placeholder names in the path template, in order.
    #[must_use]
    pub fn placeholders(&self) -> Vec<&'static str> {
        url::placeholder_names(self.path).collect()
    }
}

/// Looks up an endpoint by short name.
///
/// # Errors
///
/// Returns [`Error::UnknownEndpoint`] if no endpoint has that name.
pub fn lookup(name: &str) -> Result<&'static EndpointInfo, Error> {
    ENDPOINTS
        .iter()
        .find(|info| info.name == name)
        .ok_or_else(|| Error::UnknownEndpoint {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_are_unique() {
        let mut names: Vec<_> = ENDPOINTS.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ENDPOINTS.len());
    }

    #[test]
    fn test_lookup() {
        let info = lookup("dref").unwrap();
        assert_eq!(info.path, "/api/v2/dref/{id}/");
        assert_eq!(info.placeholders(), vec!["id"]);
        assert!(matches!(lookup("nope"), Err(Error::UnknownEndpoint { .. })));
    }

    #[test]
    fn test_typed_descriptor_matches_registry() {
        let typed = SeasonalRisk::descriptor();
        let runtime = lookup("risk-seasonal").unwrap().descriptor();
        assert_eq!(typed, runtime);
        assert_eq!(typed.api_type, ApiType::Risk);
        assert_eq!(FieldReportCreate::descriptor().method, Method::Post);
    }
}
