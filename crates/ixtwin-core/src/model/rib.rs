use chrono::NaiveDate;
use serde::Serialize;
use strum::Display;

/// Server-reported outcome of a RIB comparison.
///
/// `differences_count` is authoritative for the summary and the two lists
/// for the detail view. They are not reconciled against each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub live_rib_lines: u64,
    pub uploaded_rib_lines: u64,
    pub differences_count: u64,
    pub only_in_live: Vec<String>,
    pub only_in_uploaded: Vec<String>,
    pub message: String,
}

impl ComparisonResult {
    pub fn is_match(&self) -> bool {
        self.differences_count == 0
    }
}

/// Routing daemon running inside an emulated route server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RouteServerKind {
    Bird,
    #[strum(serialize = "openbgpd")]
    #[serde(rename = "openbgpd")]
    OpenBgpd,
}

impl RouteServerKind {
    /// Map the topology config's `type` field. Anything that is not BIRD
    /// is driven with OpenBGPD's tooling.
    pub fn from_config_type(kind: &str) -> Self {
        if kind.trim().eq_ignore_ascii_case("bird") {
            Self::Bird
        } else {
            Self::OpenBgpd
        }
    }

    /// Shell command that prints the daemon's full RIB.
    pub fn rib_dump_command(self) -> &'static str {
        match self {
            Self::Bird => "birdc show route all",
            Self::OpenBgpd => "bgpctl show rib",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteServer {
    pub name: String,
    pub kind: RouteServerKind,
}

impl RouteServer {
    /// Extract route servers from the topology config's
    /// `route_servers: { name: { type } }` map, sorted by name.
    pub fn from_ixp_config(config: &serde_json::Value) -> Vec<Self> {
        let Some(servers) = config.get("route_servers").and_then(|v| v.as_object()) else {
            return Vec::new();
        };
        let mut out: Vec<Self> = servers
            .iter()
            .map(|(name, data)| Self {
                name: name.clone(),
                kind: RouteServerKind::from_config_type(
                    data.get("type").and_then(|t| t.as_str()).unwrap_or("unknown"),
                ),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

/// A live RIB captured from a route server, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveRibDump {
    pub file_name: String,
    pub contents: String,
}

impl LiveRibDump {
    /// `<target>-rib-<YYYY-MM-DD>.dump`
    pub fn file_name_for(target: &str, date: NaiveDate) -> String {
        format!("{target}-rib-{}.dump", date.format("%Y-%m-%d"))
    }
}
