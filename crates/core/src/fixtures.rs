//! Built-in demo data served by the simulated backend and the portal sign-in.

use crate::auth::UserRole;
use crate::doctor::{HealthRecord, Patient, Provider, RecordStatus};
use chrono::NaiveDate;

/// A demo account the portal and doctor login accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAccount {
    pub role: UserRole,
    pub username: &'static str,
    pub password: &'static str,
    pub license_number: Option<&'static str>,
    pub province: Option<&'static str>,
    pub health_card: Option<&'static str>,
}

pub fn test_account(role: UserRole) -> TestAccount {
    match role {
        UserRole::Doctor => TestAccount {
            role,
            username: "dr.smith",
            password: "test1234",
            license_number: Some("MD123456"),
            province: Some("Ontario"),
            health_card: None,
        },
        UserRole::Patient => TestAccount {
            role,
            username: "john.doe",
            password: "test1234",
            license_number: None,
            province: None,
            health_card: Some("ON1234567"),
        },
        UserRole::Admin => TestAccount {
            role,
            username: "admin",
            password: "admin1234",
            license_number: None,
            province: None,
            health_card: None,
        },
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn test_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: "1".into(),
            name: "John Doe".into(),
            health_card_number: "ON1234567".into(),
            date_of_birth: date(1980, 1, 1),
            home_province: "Ontario".into(),
            digital_health_id: "DHI123456".into(),
        },
        Patient {
            id: "2".into(),
            name: "Jane Smith".into(),
            health_card_number: "BC9876543".into(),
            date_of_birth: date(1975, 5, 15),
            home_province: "British Columbia".into(),
            digital_health_id: "DHI789012".into(),
        },
    ]
}

pub fn test_health_records() -> Vec<HealthRecord> {
    vec![
        HealthRecord {
            id: "1".into(),
            record_type: "lab_result".into(),
            title: "Complete Blood Count (CBC)".into(),
            date: date(2024, 2, 15),
            provider: Provider {
                name: "Dr. Sarah Smith".into(),
                organization: "City General Hospital".into(),
            },
            status: RecordStatus::Final,
            category: "Hematology".into(),
            description: "Routine blood work including RBC, WBC, and platelet counts.".into(),
        },
        HealthRecord {
            id: "2".into(),
            record_type: "imaging".into(),
            title: "Chest X-Ray".into(),
            date: date(2024, 2, 10),
            provider: Provider {
                name: "Dr. Michael Chen".into(),
                organization: "Radiology Partners".into(),
            },
            status: RecordStatus::Final,
            category: "Radiology".into(),
            description: "Routine chest X-ray examination, frontal and lateral views.".into(),
        },
    ]
}
