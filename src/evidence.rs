//! Polymorphic alert evidence.
//!
//! Each entry in an alert's `evidence` array is annotated with an
//! `@odata.type` discriminator (e.g. `#microsoft.graph.security.deviceEvidence`)
//! naming its concrete shape. [`AlertEvidence`] dispatches on that value when
//! deserializing and re-emits it when serializing. Discriminators this build
//! does not know map to [`AlertEvidence::Other`], which keeps the raw object
//! so nothing is lost across a round trip.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ODATA_TYPE: &str = "@odata.type";

const DEVICE_EVIDENCE: &str = "#microsoft.graph.security.deviceEvidence";
const FILE_EVIDENCE: &str = "#microsoft.graph.security.fileEvidence";
const IP_EVIDENCE: &str = "#microsoft.graph.security.ipEvidence";
const PROCESS_EVIDENCE: &str = "#microsoft.graph.security.processEvidence";
const USER_EVIDENCE: &str = "#microsoft.graph.security.userEvidence";

// ── Concrete evidence shapes ─────────────────────────────────────────────

/// Fields shared by every evidence entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_status_details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A device involved in an alert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvidence {
    #[serde(flatten)]
    pub base: EvidenceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_ad_device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defender_av_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_dns_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mde_device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_build: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbac_group_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbac_group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// Details of a file referenced by evidence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

/// A file involved in an alert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEvidence {
    #[serde(flatten)]
    pub base: EvidenceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_details: Option<FileDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mde_device_id: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// An IP address involved in an alert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpEvidence {
    #[serde(flatten)]
    pub base: EvidenceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_letter_code: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// A process involved in an alert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEvidence {
    #[serde(flatten)]
    pub base: EvidenceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<FileDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mde_device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_process_creation_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_process_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_command_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_creation_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<i64>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// A user account involved in an alert.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEvidence {
    #[serde(flatten)]
    pub base: EvidenceBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_account: Option<UserAccount>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// Identity details inside [`UserEvidence`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_ad_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_sid: Option<String>,
}

// ── Discriminated union ──────────────────────────────────────────────────

/// One entry of an alert's `evidence` array, dispatched on `@odata.type`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvidence {
    Device(DeviceEvidence),
    File(FileEvidence),
    Ip(IpEvidence),
    Process(ProcessEvidence),
    User(UserEvidence),
    /// Evidence with a discriminator this build does not know. The raw
    /// object (discriminator included) is kept verbatim.
    Other {
        odata_type: Option<String>,
        data: Map<String, Value>,
    },
}

impl AlertEvidence {
    /// Returns the `@odata.type` discriminator for this evidence entry,
    /// when known.
    pub fn odata_type(&self) -> Option<&str> {
        match self {
            AlertEvidence::Device(_) => Some(DEVICE_EVIDENCE),
            AlertEvidence::File(_) => Some(FILE_EVIDENCE),
            AlertEvidence::Ip(_) => Some(IP_EVIDENCE),
            AlertEvidence::Process(_) => Some(PROCESS_EVIDENCE),
            AlertEvidence::User(_) => Some(USER_EVIDENCE),
            AlertEvidence::Other { odata_type, .. } => odata_type.as_deref(),
        }
    }
}

impl<'de> Deserialize<'de> for AlertEvidence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = Map::deserialize(deserializer)?;
        let odata_type = map.get(ODATA_TYPE).and_then(Value::as_str).map(str::to_string);

        let known = matches!(
            odata_type.as_deref(),
            Some(DEVICE_EVIDENCE | FILE_EVIDENCE | IP_EVIDENCE | PROCESS_EVIDENCE | USER_EVIDENCE)
        );
        if !known {
            // Keep the raw object untouched so unknown evidence types
            // survive a round trip byte-for-byte.
            return Ok(AlertEvidence::Other {
                odata_type,
                data: map,
            });
        }

        // The discriminator is transport metadata, not a model field.
        map.remove(ODATA_TYPE);
        let value = Value::Object(map);
        let evidence = match odata_type.as_deref() {
            Some(DEVICE_EVIDENCE) => {
                AlertEvidence::Device(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            Some(FILE_EVIDENCE) => {
                AlertEvidence::File(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            Some(IP_EVIDENCE) => {
                AlertEvidence::Ip(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            Some(PROCESS_EVIDENCE) => {
                AlertEvidence::Process(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            Some(USER_EVIDENCE) => {
                AlertEvidence::User(serde_json::from_value(value).map_err(de::Error::custom)?)
            }
            _ => unreachable!("discriminator checked above"),
        };
        Ok(evidence)
    }
}

impl Serialize for AlertEvidence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error;

        let to_map = |value: Value| -> Result<Map<String, Value>, S::Error> {
            match value {
                Value::Object(map) => Ok(map),
                _ => Err(S::Error::custom("evidence must serialize to an object")),
            }
        };

        let mut map = match self {
            AlertEvidence::Device(e) => {
                to_map(serde_json::to_value(e).map_err(S::Error::custom)?)?
            }
            AlertEvidence::File(e) => to_map(serde_json::to_value(e).map_err(S::Error::custom)?)?,
            AlertEvidence::Ip(e) => to_map(serde_json::to_value(e).map_err(S::Error::custom)?)?,
            AlertEvidence::Process(e) => {
                to_map(serde_json::to_value(e).map_err(S::Error::custom)?)?
            }
            AlertEvidence::User(e) => to_map(serde_json::to_value(e).map_err(S::Error::custom)?)?,
            AlertEvidence::Other { data, .. } => {
                // `data` already carries the discriminator, if one was present.
                return data.serialize(serializer);
            }
        };

        if let Some(t) = self.odata_type() {
            map.insert(ODATA_TYPE.to_string(), Value::String(t.to_string()));
        }
        map.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_evidence_dispatches_on_discriminator() {
        let body = json!({
            "@odata.type": "#microsoft.graph.security.deviceEvidence",
            "verdict": "malicious",
            "remediationStatus": "remediated",
            "deviceDnsName": "tempest.contoso.com",
            "mdeDeviceId": "73e7e2de709dff64ef64b1d0c30e67fab63279db",
            "osPlatform": "Windows10",
            "osBuild": 22424,
            "rbacGroupId": 75,
            "riskScore": "medium"
        });
        let evidence: AlertEvidence = serde_json::from_value(body).unwrap();
        match evidence {
            AlertEvidence::Device(d) => {
                assert_eq!(d.device_dns_name.as_deref(), Some("tempest.contoso.com"));
                assert_eq!(d.os_build, Some(22424));
                assert_eq!(d.base.verdict.as_deref(), Some("malicious"));
                assert!(
                    !d.additional_data.contains_key("@odata.type"),
                    "discriminator must not leak into additional_data"
                );
            }
            other => panic!("expected Device, got {other:?}"),
        }
    }

    #[test]
    fn serialization_restores_discriminator() {
        let evidence = AlertEvidence::File(FileEvidence {
            file_details: Some(FileDetails {
                file_name: Some("propagate.exe".to_string()),
                sha256: Some("12345678abcdef".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let v = serde_json::to_value(&evidence).unwrap();
        assert_eq!(v["@odata.type"], "#microsoft.graph.security.fileEvidence");
        assert_eq!(v["fileDetails"]["fileName"], "propagate.exe");
    }

    #[test]
    fn unknown_discriminator_round_trips_verbatim() {
        let body = json!({
            "@odata.type": "#microsoft.graph.security.ioTDeviceEvidence",
            "deviceId": "iot-device-9",
            "manufacturer": "Contoso"
        });
        let evidence: AlertEvidence = serde_json::from_value(body.clone()).unwrap();
        match &evidence {
            AlertEvidence::Other { odata_type, data } => {
                assert_eq!(
                    odata_type.as_deref(),
                    Some("#microsoft.graph.security.ioTDeviceEvidence")
                );
                assert_eq!(data["deviceId"], "iot-device-9");
            }
            other => panic!("expected Other, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&evidence).unwrap(), body);
    }

    #[test]
    fn missing_discriminator_maps_to_other() {
        let body = json!({"verdict": "suspicious"});
        let evidence: AlertEvidence = serde_json::from_value(body.clone()).unwrap();
        match &evidence {
            AlertEvidence::Other { odata_type, .. } => assert!(odata_type.is_none()),
            other => panic!("expected Other, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&evidence).unwrap(), body);
    }

    #[test]
    fn user_evidence_round_trips() {
        let body = json!({
            "@odata.type": "#microsoft.graph.security.userEvidence",
            "verdict": "suspicious",
            "userAccount": {
                "accountName": "eranb",
                "domainName": "contoso",
                "userSid": "S-1-5-21-11111607-1111760036-109187956-75141",
                "userPrincipalName": "eranb@contoso.com"
            }
        });
        let evidence: AlertEvidence = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(serde_json::to_value(&evidence).unwrap(), body);
    }

    #[test]
    fn process_evidence_keeps_undeclared_properties() {
        let body = json!({
            "@odata.type": "#microsoft.graph.security.processEvidence",
            "processId": 4780,
            "processCommandLine": "\"MsSense.exe\"",
            "futureField": "kept"
        });
        let evidence: AlertEvidence = serde_json::from_value(body.clone()).unwrap();
        match &evidence {
            AlertEvidence::Process(p) => {
                assert_eq!(p.process_id, Some(4780));
                assert_eq!(p.additional_data["futureField"], "kept");
            }
            other => panic!("expected Process, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&evidence).unwrap(), body);
    }
}
