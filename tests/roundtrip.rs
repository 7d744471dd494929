//! Serialization round-trip guarantees: populated models survive a
//! serialize/deserialize cycle unchanged, and properties the models do not
//! declare are preserved through the additional-data maps in both directions.

use serde_json::{json, Value};

use msgraph_security::alerts::{
    Alert, AlertClassification, AlertComment, AlertSeverity, AlertStatus,
};
use msgraph_security::ediscovery::{CaseStatus, EdiscoveryCase, EdiscoveryCustodian, HoldStatus};
use msgraph_security::evidence::{
    AlertEvidence, DeviceEvidence, EvidenceBase, FileDetails, FileEvidence,
};
use msgraph_security::incidents::{Incident, IncidentStatus};
use msgraph_security::operations::{CaseOperation, OperationStatus};

fn sample_alert() -> Alert {
    Alert {
        id: Some("da637551227677560813_-961444813".to_string()),
        title: Some("Suspicious execution of hidden file".to_string()),
        severity: Some(AlertSeverity::High),
        status: Some(AlertStatus::New),
        classification: Some(AlertClassification::TruePositive),
        category: Some("DefenseEvasion".to_string()),
        service_source: Some("microsoftDefenderForEndpoint".to_string()),
        detection_source: Some("antivirus".to_string()),
        mitre_techniques: vec!["T1564.001".to_string()],
        created_date_time: Some("2021-04-27T12:19:27.7211305Z".to_string()),
        incident_id: Some("28282".to_string()),
        tenant_id: Some("b3c1b5fc-828c-45fa-a1e1-10d74f6d6e9c".to_string()),
        comments: vec![AlertComment {
            comment: Some("triaged".to_string()),
            created_by_display_name: Some("secAdmin@contoso.com".to_string()),
            created_date_time: Some("2022-10-13T07:08:45.4626766Z".to_string()),
            additional_data: Default::default(),
        }],
        evidence: vec![
            AlertEvidence::Device(DeviceEvidence {
                base: EvidenceBase {
                    verdict: Some("malicious".to_string()),
                    remediation_status: Some("remediated".to_string()),
                    roles: vec!["compromised".to_string()],
                    ..Default::default()
                },
                device_dns_name: Some("tempest.contoso.com".to_string()),
                os_platform: Some("Windows10".to_string()),
                os_build: Some(22424),
                ..Default::default()
            }),
            AlertEvidence::File(FileEvidence {
                file_details: Some(FileDetails {
                    file_name: Some("propagate.exe".to_string()),
                    sha256: Some("12345678abcdef".to_string()),
                    file_size: Some(7680),
                    ..Default::default()
                }),
                detection_status: Some("detected".to_string()),
                ..Default::default()
            }),
        ],
        ..Default::default()
    }
}

#[test]
fn alert_round_trips_through_json() {
    let alert = sample_alert();
    let text = serde_json::to_string(&alert).unwrap();
    let back: Alert = serde_json::from_str(&text).unwrap();
    assert_eq!(alert, back);
}

#[test]
fn alert_preserves_unknown_properties_both_directions() {
    // Deserialize a payload carrying properties this build does not declare,
    // then serialize and confirm nothing was dropped.
    let wire = json!({
        "id": "da123",
        "severity": "medium",
        "futureScalar": "kept",
        "futureObject": {"a": [1, 2]},
        "evidence": [
            {
                "@odata.type": "#microsoft.graph.security.ioTDeviceEvidence",
                "deviceId": "iot-9",
                "importance": "high"
            }
        ]
    });
    let alert: Alert = serde_json::from_value(wire.clone()).unwrap();
    assert_eq!(alert.additional_data["futureScalar"], "kept");

    let out = serde_json::to_value(&alert).unwrap();
    assert_eq!(out, wire);
}

#[test]
fn incident_round_trips_with_expanded_alerts() {
    let incident = Incident {
        id: Some("2972395".to_string()),
        display_name: Some("Multi-stage incident".to_string()),
        status: Some(IncidentStatus::Active),
        severity: Some(AlertSeverity::Medium),
        custom_tags: vec!["Demo".to_string()],
        alerts: vec![sample_alert()],
        ..Default::default()
    };
    let text = serde_json::to_string(&incident).unwrap();
    let back: Incident = serde_json::from_str(&text).unwrap();
    assert_eq!(incident, back);
}

#[test]
fn case_and_custodian_round_trip() {
    let case = EdiscoveryCase {
        id: Some("22aa2acd".to_string()),
        display_name: Some("Contoso litigation".to_string()),
        status: Some(CaseStatus::Active),
        external_id: Some("CASE-1138".to_string()),
        ..Default::default()
    };
    let back: EdiscoveryCase =
        serde_json::from_str(&serde_json::to_string(&case).unwrap()).unwrap();
    assert_eq!(case, back);

    let custodian = EdiscoveryCustodian {
        id: Some("c1".to_string()),
        email: Some("admin@contoso.com".to_string()),
        hold_status: Some(HoldStatus::Applied),
        ..Default::default()
    };
    let back: EdiscoveryCustodian =
        serde_json::from_str(&serde_json::to_string(&custodian).unwrap()).unwrap();
    assert_eq!(custodian, back);
}

#[test]
fn operation_round_trips() {
    let op = CaseOperation {
        id: Some("op-77".to_string()),
        action: Some("holdUpdate".to_string()),
        status: Some(OperationStatus::PartiallySucceeded),
        percent_progress: Some(100),
        ..Default::default()
    };
    let back: CaseOperation =
        serde_json::from_str(&serde_json::to_string(&op).unwrap()).unwrap();
    assert_eq!(op, back);
}

#[test]
fn wire_names_are_camel_case_with_discriminators() {
    let alert = sample_alert();
    let v = serde_json::to_value(&alert).unwrap();

    assert!(v.get("serviceSource").is_some());
    assert!(v.get("mitreTechniques").is_some());
    assert!(v.get("service_source").is_none(), "no snake_case on the wire");

    let evidence = v["evidence"].as_array().unwrap();
    assert_eq!(
        evidence[0]["@odata.type"],
        "#microsoft.graph.security.deviceEvidence"
    );
    assert_eq!(
        evidence[1]["@odata.type"],
        "#microsoft.graph.security.fileEvidence"
    );
}

#[test]
fn absent_fields_are_omitted_not_null() {
    let alert = Alert {
        id: Some("a1".to_string()),
        ..Default::default()
    };
    let v = serde_json::to_value(&alert).unwrap();
    let obj = v.as_object().unwrap();
    assert_eq!(obj.len(), 1, "only the id should be serialized: {obj:?}");
    assert_eq!(obj["id"], Value::String("a1".to_string()));
}
