//! Client record data structures for churn prediction

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `tenure` (months)
pub const MAX_TENURE_MONTHS: u32 = 120;

/// Contract type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contract {
    #[serde(rename = "Month-to-month")]
    MonthToMonth,
    #[serde(rename = "One year")]
    OneYear,
    #[serde(rename = "Two year")]
    TwoYear,
}

impl Contract {
    pub fn as_str(&self) -> &'static str {
        match self {
            Contract::MonthToMonth => "Month-to-month",
            Contract::OneYear => "One year",
            Contract::TwoYear => "Two year",
        }
    }
}

/// Internet service type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternetService {
    #[serde(rename = "DSL")]
    Dsl,
    #[serde(rename = "Fiber optic")]
    FiberOptic,
    #[serde(rename = "No")]
    NoService,
}

impl InternetService {
    pub fn as_str(&self) -> &'static str {
        match self {
            InternetService::Dsl => "DSL",
            InternetService::FiberOptic => "Fiber optic",
            InternetService::NoService => "No",
        }
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Electronic check")]
    ElectronicCheck,
    #[serde(rename = "Mailed check")]
    MailedCheck,
    #[serde(rename = "Bank transfer (automatic)")]
    BankTransfer,
    #[serde(rename = "Credit card (automatic)")]
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::ElectronicCheck => "Electronic check",
            PaymentMethod::MailedCheck => "Mailed check",
            PaymentMethod::BankTransfer => "Bank transfer (automatic)",
            PaymentMethod::CreditCard => "Credit card (automatic)",
        }
    }
}

/// Add-on service flag (online security, tech support)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOnService {
    Yes,
    No,
    #[serde(rename = "No internet service")]
    NoInternetService,
}

impl AddOnService {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddOnService::Yes => "Yes",
            AddOnService::No => "No",
            AddOnService::NoInternetService => "No internet service",
        }
    }
}

/// Plain yes/no flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

/// A single attribute value as seen by the encoder
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Numeric(f64),
    Categorical(&'static str),
}

/// Client attributes submitted for churn scoring.
///
/// Field names follow the column names used at training time. Categorical
/// fields are closed enumerations, so an out-of-set literal never
/// deserializes; ranges are checked by [`ClientRecord::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientRecord {
    /// Months as a customer
    pub tenure: i64,

    /// Monthly charge amount
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,

    /// Total amount charged so far
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,

    #[serde(rename = "Contract")]
    pub contract: Contract,

    #[serde(rename = "InternetService")]
    pub internet_service: InternetService,

    #[serde(rename = "PaymentMethod")]
    pub payment_method: PaymentMethod,

    #[serde(rename = "OnlineSecurity")]
    pub online_security: AddOnService,

    #[serde(rename = "TechSupport")]
    pub tech_support: AddOnService,

    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,

    /// Senior citizen flag (0 or 1)
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: i64,
}

impl ClientRecord {
    /// Parse and validate a record from an untyped JSON value.
    ///
    /// Any type mismatch, missing field, unknown field, unknown category or
    /// range violation is reported as [`ChurnError::Validation`].
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let record: ClientRecord = serde_json::from_value(value)
            .map_err(|e| ChurnError::Validation(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Check numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if self.tenure < 0 || self.tenure > MAX_TENURE_MONTHS as i64 {
            return Err(ChurnError::Validation(format!(
                "tenure must be between 0 and {}, got {}",
                MAX_TENURE_MONTHS, self.tenure
            )));
        }
        check_amount("MonthlyCharges", self.monthly_charges)?;
        check_amount("TotalCharges", self.total_charges)?;
        if self.senior_citizen != 0 && self.senior_citizen != 1 {
            return Err(ChurnError::Validation(format!(
                "SeniorCitizen must be 0 or 1, got {}",
                self.senior_citizen
            )));
        }
        Ok(())
    }

    /// Attributes in wire order, as consumed by the encoder.
    pub fn attributes(&self) -> Vec<(&'static str, AttributeValue)> {
        use AttributeValue::{Categorical, Numeric};

        vec![
            ("tenure", Numeric(self.tenure as f64)),
            ("MonthlyCharges", Numeric(self.monthly_charges)),
            ("TotalCharges", Numeric(self.total_charges)),
            ("Contract", Categorical(self.contract.as_str())),
            ("InternetService", Categorical(self.internet_service.as_str())),
            ("PaymentMethod", Categorical(self.payment_method.as_str())),
            ("OnlineSecurity", Categorical(self.online_security.as_str())),
            ("TechSupport", Categorical(self.tech_support.as_str())),
            ("PaperlessBilling", Categorical(self.paperless_billing.as_str())),
            ("SeniorCitizen", Numeric(self.senior_citizen as f64)),
        ]
    }
}

fn check_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ChurnError::Validation(format!(
            "{} must be a non-negative amount, got {}",
            field, value
        )));
    }
    Ok(())
}
