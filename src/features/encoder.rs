//! Feature encoding for churn model inference.
//!
//! Turns a client record into the numeric vector the trained model expects:
//! numeric fields pass through under their own name, categorical fields
//! expand into `<field>_<value>` indicators with the reference level left
//! out, and the result is reconciled against the schema column by column.

use crate::features::reconcile::{reconcile, Reconciliation};
use crate::features::schema::FeatureSchema;
use crate::features::EncodedVector;
use crate::types::client::{AttributeValue, ClientRecord};
use tracing::debug;

/// Encoder bound to the feature schema of a loaded model.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of features produced.
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Expand a record into (column, value) pairs before alignment.
    ///
    /// A categorical value equal to the field's reference level produces no
    /// column. When the schema carries no reference level for a field, the
    /// indicator is emitted and reconciliation drops it if the model was not
    /// trained on it.
    pub fn observe(&self, record: &ClientRecord) -> Vec<(String, f64)> {
        record
            .attributes()
            .into_iter()
            .filter_map(|(field, value)| match value {
                AttributeValue::Numeric(v) => Some((field.to_string(), v)),
                AttributeValue::Categorical(level) => {
                    if self.schema.reference_level(field) == Some(level) {
                        None
                    } else {
                        Some((format!("{}_{}", field, level), 1.0))
                    }
                }
            })
            .collect()
    }

    /// Observe and align a record, keeping the per-column outcomes.
    pub fn reconcile(&self, record: &ClientRecord) -> Reconciliation {
        reconcile(&self.observe(record), self.schema.columns())
    }

    /// Encode a record into a vector aligned with the schema.
    ///
    /// Category values the model never saw contribute nothing: their
    /// indicator is dropped rather than rejected.
    pub fn encode(&self, record: &ClientRecord) -> EncodedVector {
        let reconciliation = self.reconcile(record);

        let dropped: Vec<&str> = reconciliation.dropped().collect();
        if !dropped.is_empty() {
            debug!(columns = ?dropped, "Dropping columns unknown to the model");
        }

        reconciliation.into_vector()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::client::{AddOnService, Contract, InternetService, PaymentMethod, YesNo};
    use std::collections::BTreeMap;

    fn telco_schema() -> FeatureSchema {
        let columns = [
            "tenure",
            "MonthlyCharges",
            "TotalCharges",
            "SeniorCitizen",
            "Contract_One year",
            "Contract_Two year",
            "InternetService_Fiber optic",
            "InternetService_No",
            "PaymentMethod_Credit card (automatic)",
            "PaymentMethod_Electronic check",
            "PaymentMethod_Mailed check",
            "OnlineSecurity_No internet service",
            "OnlineSecurity_Yes",
            "TechSupport_No internet service",
            "TechSupport_Yes",
            "PaperlessBilling_Yes",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();

        let reference_levels: BTreeMap<String, String> = [
            ("Contract", "Month-to-month"),
            ("InternetService", "DSL"),
            ("PaymentMethod", "Bank transfer (automatic)"),
            ("OnlineSecurity", "No"),
            ("TechSupport", "No"),
            ("PaperlessBilling", "No"),
        ]
        .iter()
        .map(|(f, l)| (f.to_string(), l.to_string()))
        .collect();

        FeatureSchema::new(columns, reference_levels).unwrap()
    }

    fn high_risk_client() -> ClientRecord {
        ClientRecord {
            tenure: 2,
            monthly_charges: 89.99,
            total_charges: 179.98,
            contract: Contract::MonthToMonth,
            internet_service: InternetService::FiberOptic,
            payment_method: PaymentMethod::ElectronicCheck,
            online_security: AddOnService::No,
            tech_support: AddOnService::No,
            paperless_billing: YesNo::Yes,
            senior_citizen: 0,
        }
    }

    #[test]
    fn test_vector_matches_schema_length_and_order() {
        let encoder = FeatureEncoder::new(telco_schema());
        let vector = encoder.encode(&high_risk_client());

        assert_eq!(vector.len(), encoder.feature_count());
        assert_eq!(
            vector.as_slice(),
            &[
                2.0, 89.99, 179.98, 0.0, // numeric
                0.0, 0.0, // contract
                1.0, 0.0, // internet
                0.0, 1.0, 0.0, // payment
                0.0, 0.0, // online security
                0.0, 0.0, // tech support
                1.0, // paperless
            ]
        );
    }

    #[test]
    fn test_reference_levels_produce_no_column() {
        let encoder = FeatureEncoder::new(telco_schema());
        let observed = encoder.observe(&high_risk_client());
        let names: Vec<&str> = observed.iter().map(|(c, _)| c.as_str()).collect();

        assert!(!names.contains(&"Contract_Month-to-month"));
        assert!(!names.contains(&"OnlineSecurity_No"));
        assert!(names.contains(&"InternetService_Fiber optic"));
        assert!(names.contains(&"PaperlessBilling_Yes"));
    }

    #[test]
    fn test_encoding_is_bit_identical_across_calls() {
        let encoder = FeatureEncoder::new(telco_schema());
        let first = encoder.encode(&high_risk_client());
        let second = encoder.encode(&high_risk_client());

        let bits = |v: &EncodedVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_category_unseen_in_training_contributes_nothing() {
        // A model trained without any "No internet service" clients
        let columns: Vec<String> = telco_schema()
            .columns()
            .iter()
            .filter(|c| !c.ends_with("_No internet service"))
            .cloned()
            .collect();
        let schema =
            FeatureSchema::new(columns, telco_schema().reference_levels().clone()).unwrap();
        let encoder = FeatureEncoder::new(schema);

        let mut unseen = high_risk_client();
        unseen.online_security = AddOnService::NoInternetService;

        let reconciliation = encoder.reconcile(&unseen);
        let dropped: Vec<&str> = reconciliation.dropped().collect();
        assert_eq!(dropped, vec!["OnlineSecurity_No internet service"]);

        // Same vector as a record whose OnlineSecurity indicators are all zero
        assert_eq!(encoder.encode(&unseen), encoder.encode(&high_risk_client()));
    }

    #[test]
    fn test_schema_without_reference_levels_aligns_the_same() {
        let implicit =
            FeatureSchema::new(telco_schema().columns().to_vec(), BTreeMap::new()).unwrap();
        let explicit = FeatureEncoder::new(telco_schema());
        let implicit = FeatureEncoder::new(implicit);

        let record = high_risk_client();
        assert_eq!(implicit.encode(&record), explicit.encode(&record));
        assert!(implicit
            .reconcile(&record)
            .dropped()
            .any(|c| c == "Contract_Month-to-month"));
    }
}
