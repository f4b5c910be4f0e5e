//! Patient record as stored in the synthetic dataset.
//!
//! Field names mirror the dataset JSON (snake_case). The record is loaded
//! once at startup and never mutated; the age-update side channel is
//! advisory only and does not write back (see DESIGN.md).

use serde::{Deserialize, Serialize};

/// One synthetic patient, keyed by `patient_id` (e.g. "P001").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    /// Requester ids authorized to view this record (e.g. "U1001").
    /// Not enforced anywhere in this demo; carried for completeness.
    pub user_access: Vec<String>,
    pub demographics: Demographics,
    pub vitals: Vitals,
    pub risk_scores: RiskScores,
    pub medical_history: MedicalHistory,
    pub labs: Labs,
    pub medications_active: Vec<ActiveMedication>,
    pub provider_notes: Vec<ProviderNote>,
}

impl PatientRecord {
    /// Compact deterministic JSON form used as LLM context.
    ///
    /// Serialization cannot fail for this struct shape, but the caller
    /// absorbs errors into the answer channel anyway, so propagate.
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub dob: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vitals {
    pub blood_pressure: BloodPressure,
    pub heart_rate: u32,
    pub temperature_c: f64,
    pub respiratory_rate: u32,
    pub oxygen_saturation: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScores {
    pub cardiac_risk_score: f64,
    pub diabetes_risk_score: f64,
    pub hospital_readmission_probability_30d: f64,
    pub medication_noncompliance_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub diagnoses: Vec<String>,
    pub symptom_trend: String,
    pub lifestyle_factors: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labs {
    pub hba1c: f64,
    pub fasting_glucose_mg_dl: u32,
    pub creatinine_mg_dl: f64,
    pub cholesterol: CholesterolPanel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CholesterolPanel {
    pub ldl: u32,
    pub hdl: u32,
    pub triglycerides: u32,
}

/// Active medication. Doses appear in the dataset either as a numeric
/// `dose_mg` or a free-text `dose` ("2 puffs"), never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveMedication {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose_mg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    pub frequency: String,
    pub adherence_rating: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderNote {
    pub date: String,
    pub note_summary: String,
    pub qualitative_impression: String,
    pub severity_index: f64,
}

#[cfg(test)]
pub(crate) fn sample_record(patient_id: &str) -> PatientRecord {
    PatientRecord {
        patient_id: patient_id.to_string(),
        user_access: vec!["U1001".into(), "U1004".into()],
        demographics: Demographics {
            name: "John Carter".into(),
            age: 58,
            gender: "Male".into(),
            dob: "1967-03-12".into(),
        },
        vitals: Vitals {
            blood_pressure: BloodPressure {
                systolic: 142,
                diastolic: 88,
            },
            heart_rate: 76,
            temperature_c: 36.8,
            respiratory_rate: 18,
            oxygen_saturation: 97,
        },
        risk_scores: RiskScores {
            cardiac_risk_score: 0.62,
            diabetes_risk_score: 0.41,
            hospital_readmission_probability_30d: 0.18,
            medication_noncompliance_probability: 0.25,
        },
        medical_history: MedicalHistory {
            diagnoses: vec!["Type 2 Diabetes".into(), "Hypertension".into()],
            symptom_trend: "Symptoms stable over the last month".into(),
            lifestyle_factors: "Former smoker, moderate activity level".into(),
        },
        labs: Labs {
            hba1c: 7.4,
            fasting_glucose_mg_dl: 132,
            creatinine_mg_dl: 1.1,
            cholesterol: CholesterolPanel {
                ldl: 128,
                hdl: 44,
                triglycerides: 180,
            },
        },
        medications_active: vec![
            ActiveMedication {
                name: "Metformin".into(),
                dose_mg: Some(500),
                dose: None,
                frequency: "2x daily".into(),
                adherence_rating: "High".into(),
            },
            ActiveMedication {
                name: "Albuterol".into(),
                dose_mg: None,
                dose: Some("2 puffs".into()),
                frequency: "As needed".into(),
                adherence_rating: "Moderate".into(),
            },
        ],
        provider_notes: vec![ProviderNote {
            date: "2025-04-02".into(),
            note_summary: "Condition stable with current treatment.".into(),
            qualitative_impression: "Patient appears motivated to improve.".into(),
            severity_index: 0.35,
        }],
    }
}
