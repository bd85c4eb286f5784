//! Container views parsed from docker's JSON output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Compose label holding the service name.
const SERVICE_LABEL: &str = "com.docker.compose.service";
/// Compose label holding the replica number.
const NUMBER_LABEL: &str = "com.docker.compose.container-number";

/// One row of `docker compose ps --format json`.
///
/// Accepts docker's capitalized keys and serializes in snake case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ContainerSummary {
    /// Container id.
    #[serde(alias = "ID")]
    pub id: String,
    /// Container name.
    #[serde(alias = "Name")]
    pub name: String,
    /// Compose service the container belongs to.
    #[serde(alias = "Service")]
    pub service: String,
    /// Machine-readable state, e.g. `running` or `exited`.
    #[serde(alias = "State")]
    pub state: String,
    /// Human-readable status, e.g. `Up 2 minutes`.
    #[serde(alias = "Status")]
    pub status: String,
    /// Image reference.
    #[serde(alias = "Image")]
    pub image: String,
    /// Command line.
    #[serde(alias = "Command")]
    pub command: String,
    /// Exit code of a stopped container.
    #[serde(alias = "ExitCode")]
    pub exit_code: i64,
}

/// Parses `docker compose ps --format json` output.
///
/// Older compose releases print one JSON array, newer ones one object per
/// line; both are accepted. Blank output means no containers.
///
/// # Errors
///
/// Returns the JSON error for malformed output.
pub fn parse_ps(output: &str) -> Result<Vec<ContainerSummary>, serde_json::Error> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}

/// Detailed view of a single container, derived from `docker inspect`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDetails {
    /// Full container id.
    pub id: String,
    /// First 12 characters of the id.
    pub short_id: String,
    /// Entrypoint and command joined with spaces.
    pub human_readable_command: String,
    /// Container name without the leading `/`.
    pub name: String,
    /// `<service>_<number>` for compose containers, otherwise the name.
    pub name_without_project: String,
    /// Compose replica number.
    pub number: Option<u32>,
    /// Port bindings as reported by docker.
    pub ports: Value,
    /// Address on the default bridge network.
    pub ip: Option<String>,
    /// Container labels.
    pub labels: BTreeMap<String, String>,
    /// Logging driver configuration.
    pub log_config: Value,
    /// Image id.
    pub image: String,
    /// Link aliases.
    pub links: Vec<String>,
    /// Environment variables.
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InspectRecord {
    id: String,
    name: String,
    image: String,
    config: InspectConfig,
    host_config: InspectHostConfig,
    network_settings: InspectNetwork,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InspectConfig {
    cmd: Option<Vec<String>>,
    entrypoint: Option<Vec<String>>,
    env: Option<Vec<String>>,
    labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InspectHostConfig {
    links: Option<Vec<String>>,
    log_config: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InspectNetwork {
    ports: Value,
    #[serde(rename = "IPAddress")]
    ip_address: Option<String>,
}

impl From<InspectRecord> for ContainerDetails {
    fn from(record: InspectRecord) -> Self {
        let labels = record.config.labels.unwrap_or_default();
        let name = record.name.trim_start_matches('/').to_owned();
        let number = labels.get(NUMBER_LABEL).and_then(|n| n.parse().ok());
        let name_without_project = match (labels.get(SERVICE_LABEL), number) {
            (Some(service), Some(number)) => format!("{service}_{number}"),
            _ => name.clone(),
        };

        let human_readable_command = record
            .config
            .entrypoint
            .unwrap_or_default()
            .into_iter()
            .chain(record.config.cmd.unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");

        let environment = record
            .config
            .env
            .unwrap_or_default()
            .into_iter()
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) => (key.to_owned(), value.to_owned()),
                None => (entry, String::new()),
            })
            .collect();

        // "/other:/this/alias" -> "alias"
        let links = record
            .host_config
            .links
            .unwrap_or_default()
            .iter()
            .filter_map(|link| link.split_once(':'))
            .filter_map(|(_, alias)| alias.rsplit('/').next())
            .map(str::to_owned)
            .collect();

        Self {
            short_id: record.id.chars().take(12).collect(),
            id: record.id,
            human_readable_command,
            name,
            name_without_project,
            number,
            ports: record.network_settings.ports,
            ip: record.network_settings.ip_address.filter(|ip| !ip.is_empty()),
            labels,
            log_config: record.host_config.log_config,
            image: record.image,
            links,
            environment,
        }
    }
}

/// Parses `docker inspect` output into details for each container.
///
/// # Errors
///
/// Returns the JSON error for malformed output.
pub fn parse_inspect(output: &str) -> Result<Vec<ContainerDetails>, serde_json::Error> {
    let records: Vec<InspectRecord> = serde_json::from_str(output.trim())?;
    Ok(records.into_iter().map(ContainerDetails::from).collect())
}

/// How many trailing log lines to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTail {
    /// The whole log.
    #[default]
    All,
    /// The last `n` lines.
    Lines(usize),
}

impl fmt::Display for LogTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Lines(n) => write!(f, "{n}"),
        }
    }
}

/// Merges `docker logs --timestamps` stdout and stderr into ordered lines.
///
/// Every line starts with an RFC 3339 timestamp, so a stable sort on that
/// prefix restores the interleaving docker split across the two streams.
pub fn merge_log_streams(stdout: &str, stderr: &str) -> Vec<String> {
    let mut lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    lines.sort_by_key(|&line| line.split_once(' ').map_or(line, |(ts, _)| ts));
    lines.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_ndjson() {
        let out = concat!(
            r#"{"ID":"abc","Name":"web-app-1","Service":"app","State":"running","Status":"Up 2 minutes","Image":"nginx"}"#,
            "\n",
            r#"{"ID":"def","Name":"web-db-1","Service":"db","State":"exited","ExitCode":137}"#,
            "\n"
        );
        let containers = parse_ps(out).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].name, "web-app-1");
        assert_eq!(containers[0].state, "running");
        assert_eq!(containers[1].exit_code, 137);
        assert!(containers[1].image.is_empty());
    }

    #[test]
    fn test_parse_ps_array_and_empty() {
        let containers = parse_ps(r#"[{"ID":"abc","Name":"x"}]"#).unwrap();
        assert_eq!(containers[0].id, "abc");
        assert!(parse_ps("  \n").unwrap().is_empty());
        assert!(parse_ps("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_ps_garbage() {
        assert!(parse_ps("not json").is_err());
    }

    #[test]
    fn test_summary_serializes_snake_case() {
        let summary = ContainerSummary {
            id: "abc".to_owned(),
            exit_code: 0,
            ..ContainerSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], "abc");
        assert!(json.get("exit_code").is_some());
        assert!(json.get("ID").is_none());
    }

    #[test]
    fn test_parse_inspect() {
        let out = r#"[{
            "Id": "0123456789abcdef0123",
            "Name": "/web-app-1",
            "Image": "sha256:feed",
            "Config": {
                "Cmd": ["nginx", "-g", "daemon off;"],
                "Entrypoint": ["/docker-entrypoint.sh"],
                "Env": ["PATH=/usr/bin", "EMPTY=", "FLAG"],
                "Labels": {
                    "com.docker.compose.service": "app",
                    "com.docker.compose.container-number": "1"
                }
            },
            "HostConfig": {
                "Links": ["/web-db-1:/web-app-1/db"],
                "LogConfig": {"Type": "json-file", "Config": {}}
            },
            "NetworkSettings": {
                "IPAddress": "",
                "Ports": {"80/tcp": [{"HostIp": "0.0.0.0", "HostPort": "8080"}]}
            }
        }]"#;

        let details = parse_inspect(out).unwrap();
        let d = &details[0];
        assert_eq!(d.short_id, "0123456789ab");
        assert_eq!(d.name, "web-app-1");
        assert_eq!(d.name_without_project, "app_1");
        assert_eq!(d.number, Some(1));
        assert_eq!(d.human_readable_command, "/docker-entrypoint.sh nginx -g daemon off;");
        assert_eq!(d.environment["PATH"], "/usr/bin");
        assert_eq!(d.environment["EMPTY"], "");
        assert_eq!(d.environment["FLAG"], "");
        assert_eq!(d.links, vec!["db"]);
        assert_eq!(d.ip, None);
        assert_eq!(d.log_config["Type"], "json-file");
        assert_eq!(d.ports["80/tcp"][0]["HostPort"], "8080");
    }

    #[test]
    fn test_parse_inspect_plain_container() {
        let details = parse_inspect(r#"[{"Id": "abc", "Name": "/solo", "Config": {"Cmd": null}}]"#)
            .unwrap();
        assert_eq!(details[0].name_without_project, "solo");
        assert_eq!(details[0].number, None);
        assert_eq!(details[0].human_readable_command, "");
        assert_eq!(details[0].short_id, "abc");
    }

    #[test]
    fn test_log_tail_display() {
        assert_eq!(LogTail::All.to_string(), "all");
        assert_eq!(LogTail::Lines(25).to_string(), "25");
    }

    #[test]
    fn test_merge_log_streams_orders_by_timestamp() {
        let stdout = "2024-01-01T00:00:01.000000000Z out one\n2024-01-01T00:00:03.000000000Z out two\n";
        let stderr = "2024-01-01T00:00:02.000000000Z err one\n";
        assert_eq!(
            merge_log_streams(stdout, stderr),
            vec![
                "2024-01-01T00:00:01.000000000Z out one",
                "2024-01-01T00:00:02.000000000Z err one",
                "2024-01-01T00:00:03.000000000Z out two",
            ]
        );
    }
}
